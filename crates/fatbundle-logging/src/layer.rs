//! Global subscriber installation

use crate::reload::{ReloadHandle, convert_level_to_filter};
use fatbundle_core::LogLevel;
use tracing_subscriber::reload;

/// Environment variable that overrides the configured log level
pub const LOG_ENV_VAR: &str = "FATBUNDLE_LOG";

/// Initialize the logging system
///
/// Installs a registry with a reloadable level filter and a `fmt` layer
/// writing to stderr. Returns `false` when a global subscriber was already
/// set; the level of an earlier installation can still be changed through
/// [`ReloadHandle::global`].
pub fn init_logging(level: LogLevel) -> bool {
    use tracing_subscriber::prelude::*;

    let (filter, handle) = reload::Layer::new(convert_level_to_filter(level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    ReloadHandle::global().install(handle, level);
    true
}

/// Read the level override from [`LOG_ENV_VAR`], ignoring unparsable values
pub fn level_from_env() -> Option<LogLevel> {
    std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|value| parse_level(&value))
}

fn parse_level(value: &str) -> Option<LogLevel> {
    value.parse().ok()
}
