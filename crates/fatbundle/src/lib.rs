//! # fatbundle
//!
//! Assemble a set of dependency archives into a single OSGi bundle.
//!
//! A build runs these stages in order over an ephemeral source directory:
//! - extract nested archives flat into the directory
//! - synthesize a classpath from the libraries found there
//! - emit a build descriptor (`temp.bnd`)
//! - generate the bundle JAR
//! - move it into the target directory and remove the source directory
//!
//! ## Example
//!
//! ```no_run
//! use fatbundle::prelude::*;
//!
//! let request = BuildRequest::builder("com.example.fat", "1.0.0")
//!     .source_directory("fatbundle_build")
//!     .target_directory("target")
//!     .extensions_to_unarchive(["zip"])
//!     .build()?;
//!
//! let report = Pipeline::new(request).run()?;
//! println!("{}", report.artifact.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`fatbundle_core`] - Build request, state machine, placeholders
//! - [`fatbundle_bundle`] - Unpacking, classpath, descriptor, generators, placement
//! - [`fatbundle_logging`] - Tracing subscriber setup

mod pipeline;

pub use pipeline::{BuildReport, Pipeline};

// Re-export core types
pub use fatbundle_core::{BuildError, BuildRequest, BuildRequestBuilder, BuildState, LogLevel};

// Re-export bundle types
pub use fatbundle_bundle::{
    BundleError, BundleResult, ClassificationSummary, ClasspathOptions, EmbeddedGenerator,
    ExternalConfig, ExternalGenerator, Generator, GeneratorConfig, JarReader, UnpackReport,
    UnpackStatus, WalkOrder,
};

pub use fatbundle_logging::init_logging;

/// Prelude module for convenient imports.
///
/// Use `use fatbundle::prelude::*;` to import commonly used types.
pub mod prelude {
    pub use crate::{
        BuildReport, BuildRequest, BuildState, BundleError, BundleResult, Generator,
        GeneratorConfig, LogLevel, Pipeline, WalkOrder,
    };
}
