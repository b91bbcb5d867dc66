//! Level changes after the subscriber is installed
//!
//! The CLI has to start logging before the project file is read, so the level
//! from `[bundle] log_level` is applied afterwards through [`ReloadHandle`].

use fatbundle_core::LogLevel;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{Registry, reload};

type FilterHandle = reload::Handle<LevelFilter, Registry>;

/// Installed filter handle and the level it currently carries
struct ActiveFilter {
    handle: FilterHandle,
    level: LogLevel,
}

/// Process-wide switch for the stderr log level
#[derive(Default)]
pub struct ReloadHandle {
    active: Mutex<Option<ActiveFilter>>,
}

impl ReloadHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle shared by [`crate::init_logging`] and the CLI
    pub fn global() -> &'static ReloadHandle {
        static INSTANCE: OnceCell<ReloadHandle> = OnceCell::new();
        INSTANCE.get_or_init(ReloadHandle::new)
    }

    /// Register the filter of a freshly installed subscriber
    pub fn install(&self, handle: FilterHandle, level: LogLevel) {
        *self.active.lock() = Some(ActiveFilter { handle, level });
    }

    /// Level in effect, or `None` when no subscriber was installed
    pub fn current_level(&self) -> Option<LogLevel> {
        self.active.lock().as_ref().map(|active| active.level)
    }

    /// Switch to `level`
    ///
    /// Returns `Ok(false)` when nothing was installed or the level is already
    /// in effect, `Ok(true)` when the filter changed.
    pub fn apply(&self, level: LogLevel) -> Result<bool, reload::Error> {
        let mut guard = self.active.lock();
        let Some(active) = guard.as_mut() else {
            return Ok(false);
        };
        if active.level == level {
            return Ok(false);
        }
        active.handle.reload(convert_level_to_filter(level))?;
        active.level = level;
        Ok(true)
    }
}

pub(crate) fn convert_level_to_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}

#[cfg(test)]
#[path = "reload/reload_tests.rs"]
mod reload_tests;
