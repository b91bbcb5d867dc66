//! Archive merging and OSGi bundle generation for fatbundle.
//!
//! This crate holds the stages of a fat-bundle build that touch the
//! filesystem: extracting nested archives into the source directory,
//! collecting the libraries that form the classpath, emitting the build
//! descriptor, generating the bundle JAR and moving it into place.
//!
//! # Source directory after unpacking
//!
//! ```text
//! fatbundle_build/
//! ├── commons-lang-2.6.jar       # copied dependency, on the classpath
//! ├── distribution.zip           # extracted flat into this directory
//! ├── lib/
//! │   └── guava-19.0.jar         # from distribution.zip, on the classpath
//! └── temp.bnd                   # build descriptor
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fatbundle_bundle::{BuildDescriptor, ClasspathOptions, descriptor, synthesize};
//!
//! let root = std::path::Path::new("fatbundle_build");
//! let classpath = synthesize(root, &ClasspathOptions::default())?;
//! let build_descriptor = BuildDescriptor::new("com.example.fat", &classpath);
//! descriptor::emit(&build_descriptor, &root.join(descriptor::DESCRIPTOR_FILE))?;
//! # Ok::<(), fatbundle_bundle::BundleError>(())
//! ```

mod error;

pub mod builder;
pub mod checksum;
pub mod classpath;
pub mod descriptor;
pub mod generator;
pub mod loader;
pub mod manifest;
pub mod placement;
pub mod unpack;
pub mod walker;

pub use builder::JarBuilder;
pub use checksum::{compute_sha256, file_sha256};
pub use classpath::{Classpath, ClasspathOptions, PathStyle, synthesize};
pub use descriptor::{BuildDescriptor, DescriptorProperties};
pub use error::BundleError;
pub use generator::{
    EmbeddedGenerator, ExternalConfig, ExternalGenerator, GenerateJob, Generator, GeneratorConfig,
};
pub use loader::JarReader;
pub use manifest::JarManifest;
pub use placement::place;
pub use unpack::{UnpackOutcome, UnpackReport, UnpackStatus, unpack_all};
pub use walker::{ClassificationSummary, FileClassification, FileKind, WalkOrder};

/// Result type for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Extension of the produced artifact.
pub const JAR_EXTENSION: &str = "jar";
