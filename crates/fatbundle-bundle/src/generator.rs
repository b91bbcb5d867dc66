//! Bundle metadata generators.
//!
//! A [`Generator`] turns the build descriptor and the libraries it lists into
//! a bundle JAR inside an output directory. Two strategies exist:
//!
//! - [`EmbeddedGenerator`] writes the JAR in-process.
//! - [`ExternalGenerator`] runs a configured program and collects the JAR it
//!   writes by naming convention.

mod embedded;
mod external;

pub use embedded::EmbeddedGenerator;
pub use external::{ExternalConfig, ExternalGenerator};

use crate::descriptor::DescriptorProperties;
use crate::manifest::headers;
use crate::BundleResult;
use fatbundle_core::BuildRequest;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inputs to one generator run.
#[derive(Debug, Clone, Copy)]
pub struct GenerateJob<'a> {
    pub request: &'a BuildRequest,
    /// Descriptor emitted into the source directory.
    pub descriptor: &'a Path,
    pub source_dir: &'a Path,
    /// Directory the generator writes into. Created if missing.
    pub output_dir: &'a Path,
}

/// Produces a bundle JAR from a [`GenerateJob`].
pub trait Generator {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Generate the bundle and return the path of the produced JAR.
    fn generate(&self, job: &GenerateJob<'_>) -> BundleResult<PathBuf>;
}

/// Descriptor entries plus defaults derived from the request.
///
/// Values already present in the descriptor are kept.
pub fn merged_properties(job: &GenerateJob<'_>) -> BundleResult<DescriptorProperties> {
    let mut props = DescriptorProperties::load(job.descriptor)?;
    let request = job.request;
    props.set_if_absent(headers::BUNDLE_SYMBOLIC_NAME, request.symbolic_name());
    props.set_if_absent(headers::BUNDLE_NAME, request.symbolic_name());
    props.set_if_absent(headers::BUNDLE_VERSION, request.version());
    Ok(props)
}

/// Generator selection as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum GeneratorConfig {
    #[default]
    Embedded,
    External(ExternalConfig),
}

impl GeneratorConfig {
    /// Instantiate the configured generator.
    #[must_use]
    pub fn build(&self) -> Box<dyn Generator> {
        match self {
            Self::Embedded => Box::new(EmbeddedGenerator::default()),
            Self::External(config) => Box::new(ExternalGenerator::new(config.clone())),
        }
    }
}
