//! Error types for bundle operations.

use fatbundle_core::BuildError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while merging archives and generating the bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Invalid request or configuration.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal error.
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The ephemeral source directory does not exist.
    #[error("Source directory not found: {}", .0.display())]
    SourceDirectoryMissing(PathBuf),

    /// Build descriptor could not be parsed or expanded.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// JAR manifest could not be parsed.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// External generator exited unsuccessfully.
    #[error("Generator {program} failed with exit code {code:?}: {stderr}")]
    GeneratorFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// External generator did not finish in time.
    #[error("Generator {program} timed out after {timeout_secs}s")]
    GeneratorTimedOut { program: String, timeout_secs: u64 },

    /// Generator finished but its conventional output is absent.
    #[error("Generator output not found: {}", .0.display())]
    GeneratorOutputMissing(PathBuf),

    /// The artifact handed to placement does not exist.
    #[error("Generated artifact not found: {}", .0.display())]
    GeneratedArtifactMissing(PathBuf),

    /// Missing required file in a JAR.
    #[error("Missing required file: {0}")]
    MissingFile(String),
}
