//! Build orchestration.
//!
//! [`Pipeline`] drives one build through the [`BuildState`] machine:
//!
//! ```text
//! Init → Unpacking → ConfigEmitted → Generating → Placing → Done
//!                                          any stage → Failed
//! ```
//!
//! The source directory is removed only after a successful run. A failure
//! leaves it in place for inspection and the error of the failing stage is
//! returned.

use fatbundle_bundle::classpath::{self, ClasspathOptions};
use fatbundle_bundle::descriptor::{self, BuildDescriptor, DESCRIPTOR_FILE};
use fatbundle_bundle::generator::{EmbeddedGenerator, GenerateJob, Generator};
use fatbundle_bundle::walker::{self, ClassificationSummary};
use fatbundle_bundle::{
    BundleError, BundleResult, UnpackReport, WalkOrder, checksum, placement, unpack,
};
use fatbundle_core::{BuildError, BuildRequest, BuildState};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Summary of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Final location of the bundle.
    pub artifact: PathBuf,
    pub file_name: String,
    /// Hex SHA-256 of the artifact.
    pub sha256: String,
    /// Artifact size in bytes.
    pub size: u64,
    pub unpack: UnpackReport,
    /// Files found in the source directory after unpacking.
    pub files: ClassificationSummary,
    pub classpath: Vec<PathBuf>,
    /// Name of the generator that produced the artifact.
    pub generator: String,
    /// Whether the source directory was deleted.
    pub source_removed: bool,
}

/// Sequential build over one [`BuildRequest`].
pub struct Pipeline {
    request: BuildRequest,
    generator: Box<dyn Generator>,
    classpath_options: ClasspathOptions,
    keep_source: bool,
    state: BuildState,
    failed_stage: Option<BuildState>,
}

impl Pipeline {
    /// Create a pipeline using the embedded generator.
    pub fn new(request: BuildRequest) -> Self {
        Self {
            request,
            generator: Box::new(EmbeddedGenerator::default()),
            classpath_options: ClasspathOptions::default(),
            keep_source: false,
            state: BuildState::Init,
            failed_stage: None,
        }
    }

    pub fn with_generator(mut self, generator: Box<dyn Generator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_classpath_options(mut self, options: ClasspathOptions) -> Self {
        self.classpath_options = options;
        self
    }

    /// Order used by both the unpack and classpath walks.
    pub fn with_walk_order(mut self, order: WalkOrder) -> Self {
        self.classpath_options.order = order;
        self
    }

    /// Keep the source directory after a successful build.
    pub fn keep_source_directory(mut self, keep: bool) -> Self {
        self.keep_source = keep;
        self
    }

    pub fn request(&self) -> &BuildRequest {
        &self.request
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Stage that was active when the build failed.
    pub fn failed_stage(&self) -> Option<BuildState> {
        self.failed_stage
    }

    /// Run every stage. A pipeline runs at most once.
    pub fn run(&mut self) -> BundleResult<BuildReport> {
        if self.state.is_terminal() {
            return Err(BuildError::InvalidState {
                expected: BuildState::Init.to_string(),
                actual: self.state.to_string(),
            }
            .into());
        }

        match self.execute() {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::error!("Build failed during {}: {}", self.state, err);
                self.failed_stage = Some(self.state);
                if self.state.can_transition_to(BuildState::Failed) {
                    self.state = BuildState::Failed;
                }
                Err(err)
            }
        }
    }

    fn execute(&mut self) -> BundleResult<BuildReport> {
        // Preconditions first, before any filesystem access
        self.request.validate()?;

        let source = self.request.source_directory().to_path_buf();
        if !source.is_dir() {
            return Err(BundleError::SourceDirectoryMissing(source));
        }

        self.advance(BuildState::Unpacking)?;
        let unpacked = unpack::unpack_all(&source, &self.request, self.classpath_options.order)?;
        if unpacked.skipped_count() > 0 {
            tracing::warn!("{} archive(s) could not be extracted", unpacked.skipped_count());
        }

        self.advance(BuildState::ConfigEmitted)?;
        // One walk feeds both the classification and the classpath
        let files = walker::classify(
            &source,
            &self.request,
            &self.classpath_options.extensions,
            self.classpath_options.order,
        )?;
        let classpath = classpath::from_classification(&source, &files, &self.classpath_options);
        let descriptor_path = descriptor::emit(
            &BuildDescriptor::new(self.request.symbolic_name(), &classpath),
            &source.join(DESCRIPTOR_FILE),
        )?;

        self.advance(BuildState::Generating)?;
        let target = self.request.target_directory().to_path_buf();
        fs::create_dir_all(&target)?;
        let staging = tempfile::Builder::new()
            .prefix(".fatbundle-")
            .tempdir_in(&target)?;
        let job = GenerateJob {
            request: &self.request,
            descriptor: &descriptor_path,
            source_dir: &source,
            output_dir: staging.path(),
        };
        tracing::info!("Generating bundle with the {} generator", self.generator.name());
        let generated = self.generator.generate(&job)?;

        self.advance(BuildState::Placing)?;
        let file_name = self.request.file_name();
        let artifact = placement::place(&generated, &target, &file_name)?;
        if let Err(err) = staging.close() {
            tracing::debug!("Could not remove staging directory: {}", err);
        }
        let sha256 = checksum::file_sha256(&artifact)?;
        let size = fs::metadata(&artifact)?.len();

        let source_removed = !self.keep_source && remove_source(&source);
        self.advance(BuildState::Done)?;

        Ok(BuildReport {
            artifact,
            file_name,
            sha256,
            size,
            unpack: unpacked,
            files: ClassificationSummary::of(&files),
            classpath: classpath.into_entries(),
            generator: self.generator.name().to_string(),
            source_removed,
        })
    }

    fn advance(&mut self, target: BuildState) -> BundleResult<()> {
        if self.state.next() != Some(target) {
            return Err(BuildError::InvalidState {
                expected: format!("state followed by {target}"),
                actual: self.state.to_string(),
            }
            .into());
        }
        tracing::debug!("{} -> {}: {}", self.state, target, target.description());
        self.state = target;
        Ok(())
    }
}

fn remove_source(source: &std::path::Path) -> bool {
    match fs::remove_dir_all(source) {
        Ok(()) => {
            tracing::debug!("Removed source directory {}", source.display());
            true
        }
        Err(err) => {
            tracing::warn!(
                "Could not remove source directory {}: {}",
                source.display(),
                err
            );
            false
        }
    }
}
