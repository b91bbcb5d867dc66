//! `${name}` placeholder expansion for configuration values

use crate::{BuildError, BuildResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Built-in property holding the current user's home directory
pub const USER_HOME_PROPERTY: &str = "user.home";

/// Built-in property holding the directory of the project file
pub const BASEDIR_PROPERTY: &str = "project.basedir";

const ENV_PREFIX: &str = "env.";
const MAX_DEPTH: usize = 16;

/// Something that can answer property lookups
pub trait PropertySource {
    /// Look up a property by name, `None` when it is not defined
    fn property(&self, name: &str) -> Option<String>;
}

impl PropertySource for BTreeMap<String, String> {
    fn property(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Property table plus the built-in properties
///
/// Lookup order: explicit values, then `user.home`, `project.basedir`,
/// and `env.NAME` for environment variables.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: BTreeMap<String, String>,
    user_home: Option<PathBuf>,
    base_dir: Option<PathBuf>,
}

impl Properties {
    /// Create an empty table without built-ins
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table whose `user.home` comes from the running system
    pub fn from_system() -> Self {
        Self {
            user_home: dirs::home_dir(),
            ..Self::default()
        }
    }

    /// Override the `user.home` built-in
    pub fn with_user_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.user_home = Some(home.into());
        self
    }

    /// Set the `project.basedir` built-in
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Insert an explicit property
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Insert every entry of an iterator
    pub fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in entries {
            self.insert(name, value);
        }
    }

    /// The `user.home` built-in, if known
    pub fn user_home(&self) -> Option<&Path> {
        self.user_home.as_deref()
    }

    /// The `project.basedir` built-in, if known
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Expand every placeholder in `value` against this table
    pub fn resolve(&self, value: &str) -> BuildResult<String> {
        resolve_placeholders(value, self)
    }
}

impl PropertySource for Properties {
    fn property(&self, name: &str) -> Option<String> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        match name {
            USER_HOME_PROPERTY => self
                .user_home
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            BASEDIR_PROPERTY => self
                .base_dir
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            _ => name
                .strip_prefix(ENV_PREFIX)
                .and_then(|var| std::env::var(var).ok()),
        }
    }
}

/// Expand every `${name}` placeholder in `value`
///
/// Values without a `$` are returned unchanged. Property values may contain
/// placeholders themselves. A placeholder without a value is an
/// [`BuildError::UnresolvedProperty`]; it is never passed through literally.
pub fn resolve_placeholders(value: &str, source: &dyn PropertySource) -> BuildResult<String> {
    expand(value, source, 0)
}

fn expand(value: &str, source: &dyn PropertySource, depth: usize) -> BuildResult<String> {
    if !value.contains('$') {
        return Ok(value.to_string());
    }
    if depth >= MAX_DEPTH {
        return Err(BuildError::ConfigError(format!(
            "placeholder nesting too deep while expanding: {value}"
        )));
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            BuildError::ConfigError(format!("unterminated placeholder in: {value}"))
        })?;
        let name = after[..end].trim();
        if name.is_empty() {
            return Err(BuildError::ConfigError(format!(
                "empty placeholder in: {value}"
            )));
        }
        let raw = source
            .property(name)
            .ok_or_else(|| BuildError::UnresolvedProperty(name.to_string()))?;
        out.push_str(&expand(&raw, source, depth + 1)?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Expand a location value and anchor it to `base_dir` when relative
pub fn resolve_location(
    value: &str,
    source: &dyn PropertySource,
    base_dir: &Path,
) -> BuildResult<PathBuf> {
    let expanded = resolve_placeholders(value, source)?;
    let trimmed = expanded.trim();
    if trimmed.is_empty() {
        return Err(BuildError::ConfigError(format!(
            "location resolves to an empty path: {value}"
        )));
    }
    let path = PathBuf::from(trimmed);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(base_dir.join(path))
    }
}
