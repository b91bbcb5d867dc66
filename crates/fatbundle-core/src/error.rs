//! Error types for fatbundle builds

use thiserror::Error;

/// Result type alias for build request and configuration operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Error type for build request and configuration operations
#[derive(Error, Debug)]
pub enum BuildError {
    /// A required request value is missing or blank
    #[error("invalid build request: {0}")]
    InvalidRequest(String),

    /// The pipeline was asked to move between states it cannot connect
    #[error("invalid build state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// A `${name}` placeholder has no value
    #[error("unresolved property: ${{{0}}}")]
    UnresolvedProperty(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl BuildError {
    /// Whether this error was raised before any filesystem access
    pub fn is_precondition(&self) -> bool {
        matches!(self, BuildError::InvalidRequest(_))
    }
}
