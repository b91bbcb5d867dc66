//! fatbundle-core - Build request, lifecycle states, and error types
//!
//! This crate provides the foundational types shared by every fatbundle stage:
//! - [`BuildRequest`] the immutable description of one build run
//! - [`BuildState`] for tracking the pipeline state machine
//! - [`BuildError`] for error handling
//! - [`Properties`] and [`resolve_placeholders`] for `${name}` expansion

mod error;
mod lifecycle;
mod properties;
mod request;

pub use error::{BuildError, BuildResult};
pub use lifecycle::BuildState;
pub use properties::{
    BASEDIR_PROPERTY, Properties, PropertySource, USER_HOME_PROPERTY, resolve_location,
    resolve_placeholders,
};
pub use request::{BuildRequest, BuildRequestBuilder};

/// Log levels understood by the CLI and the logging crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl std::str::FromStr for LogLevel {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" => Ok(LogLevel::Off),
            other => Err(BuildError::ConfigError(format!("unknown log level: {other}"))),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BuildError, BuildRequest, BuildResult, BuildState, LogLevel, Properties, PropertySource,
    };
}
