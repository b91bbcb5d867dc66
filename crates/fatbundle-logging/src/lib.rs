//! fatbundle-logging - Tracing subscriber setup
//!
//! This crate provides:
//! - [`init_logging`] to install a stderr `fmt` subscriber once per process
//! - [`ReloadHandle`] to change the level after the project file has been read
//! - [`level_from_env`] for the `FATBUNDLE_LOG` override

mod layer;
mod reload;

pub use fatbundle_core::LogLevel;
pub use layer::{LOG_ENV_VAR, init_logging, level_from_env};
pub use reload::ReloadHandle;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{LogLevel, ReloadHandle, init_logging, level_from_env};
}
