//! Build descriptor handed to the metadata generator.
//!
//! The emitted descriptor always has the same four fields, separated by blank
//! lines:
//!
//! ```text
//! Bundle-SymbolicName: <name>
//!
//! ver: 1.0.0
//!
//! -classpath: <csv>
//!
//! Export-Package: *;version=${ver}
//! ```
//!
//! [`DescriptorProperties`] reads the same format back (`key: value` or
//! `key=value`, `#`/`!` comments, `\` line continuations) and expands `${name}`
//! macros against its own entries.

use crate::classpath::{CLASSPATH_DELIMITER, Classpath};
use crate::{BundleError, BundleResult};
use fatbundle_core::{BuildError, PropertySource, resolve_placeholders};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the descriptor inside the source directory.
pub const DESCRIPTOR_FILE: &str = "temp.bnd";

/// Name of the internal version variable.
pub const VERSION_VARIABLE: &str = "ver";

/// Fixed value of the internal version variable.
pub const DESCRIPTOR_VERSION: &str = "1.0.0";

/// Instruction listing the libraries the generator reads.
pub const CLASSPATH_INSTRUCTION: &str = "-classpath";

/// Export policy written into every descriptor.
pub const EXPORT_ALL_POLICY: &str = "*;version=${ver}";

/// The four-field descriptor written by the emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    symbolic_name: String,
    classpath: String,
}

impl BuildDescriptor {
    /// Describe a bundle with the given classpath.
    pub fn new(symbolic_name: impl Into<String>, classpath: &Classpath) -> Self {
        Self {
            symbolic_name: symbolic_name.into(),
            classpath: classpath.to_descriptor_value(),
        }
    }

    pub fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    pub fn classpath(&self) -> &str {
        &self.classpath
    }

    /// Descriptor text, fields in fixed order.
    pub fn render(&self) -> String {
        format!(
            "Bundle-SymbolicName: {}\n\n{}: {}\n\n{}: {}\n\nExport-Package: {}",
            self.symbolic_name,
            VERSION_VARIABLE,
            DESCRIPTOR_VERSION,
            CLASSPATH_INSTRUCTION,
            self.classpath,
            EXPORT_ALL_POLICY
        )
    }
}

/// Write `descriptor` to `path` as UTF-8, replacing any existing file.
///
/// I/O failures are returned as-is; they are fatal to the build.
pub fn emit(descriptor: &BuildDescriptor, path: &Path) -> BundleResult<PathBuf> {
    fs::write(path, descriptor.render())?;
    tracing::debug!("Wrote build descriptor {}", path.display());
    Ok(path.to_path_buf())
}

/// Ordered key/value view of a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorProperties {
    entries: Vec<(String, String)>,
}

impl DescriptorProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a descriptor file.
    pub fn load(path: &Path) -> BundleResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse descriptor text.
    pub fn parse(text: &str) -> BundleResult<Self> {
        let mut props = Self::new();
        let mut pending = String::new();

        for raw in text.lines() {
            let line = raw.trim_start();
            let is_comment = line.starts_with('#') || line.starts_with('!');

            if pending.is_empty() && (line.is_empty() || is_comment) {
                continue;
            }

            if let Some(stripped) = line.strip_suffix('\\') {
                pending.push_str(stripped);
                continue;
            }

            pending.push_str(line);
            let logical = std::mem::take(&mut pending);
            let (key, value) = split_key_value(&logical)?;
            props.set(key, value);
        }

        if !pending.is_empty() {
            let (key, value) = split_key_value(&pending)?;
            props.set(key, value);
        }

        Ok(props)
    }

    /// Raw (unexpanded) value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key`, replacing an existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Set `key` only when it is absent. Returns whether a value was added.
    pub fn set_if_absent(&mut self, key: &str, value: impl Into<String>) -> bool {
        if self.contains(key) {
            return false;
        }
        self.entries.push((key.to_string(), value.into()));
        true
    }

    /// Entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries that become manifest headers (name starts with an uppercase letter).
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(k, _)| k.chars().next().is_some_and(|c| c.is_ascii_uppercase()))
    }

    /// Expand every `${name}` macro in `value` against these entries.
    pub fn expand(&self, value: &str) -> BundleResult<String> {
        resolve_placeholders(value, self).map_err(|err| match err {
            BuildError::UnresolvedProperty(name) => {
                BundleError::InvalidDescriptor(format!("unresolved macro ${{{name}}}"))
            }
            other => BundleError::InvalidDescriptor(other.to_string()),
        })
    }

    /// Expanded value of `key`.
    pub fn expanded(&self, key: &str) -> BundleResult<Option<String>> {
        self.get(key).map(|value| self.expand(value)).transpose()
    }

    /// Expanded `-classpath` entries; relative entries are anchored to `base_dir`.
    pub fn classpath_entries(&self, base_dir: &Path) -> BundleResult<Vec<PathBuf>> {
        let Some(value) = self.expanded(CLASSPATH_INSTRUCTION)? else {
            return Ok(Vec::new());
        };
        Ok(value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let path = PathBuf::from(entry);
                if path.is_absolute() {
                    path
                } else {
                    base_dir.join(path)
                }
            })
            .collect())
    }

    /// Replace `-classpath` with absolute paths, for descriptors written elsewhere.
    pub fn absolutize_classpath(&mut self, base_dir: &Path) -> BundleResult<()> {
        if !self.contains(CLASSPATH_INSTRUCTION) {
            return Ok(());
        }
        let entries = self.classpath_entries(base_dir)?;
        let value = entries
            .iter()
            .map(|entry| entry.to_string_lossy())
            .collect::<Vec<_>>()
            .join(CLASSPATH_DELIMITER);
        self.set(CLASSPATH_INSTRUCTION, value);
        Ok(())
    }

    /// Descriptor text for these entries.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl PropertySource for DescriptorProperties {
    fn property(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }
}

fn split_key_value(line: &str) -> BundleResult<(String, String)> {
    let line = line.trim();
    let key_end = line
        .find(|c: char| c == ':' || c == '=' || c.is_whitespace())
        .unwrap_or(line.len());
    let key = &line[..key_end];
    if key.is_empty() {
        return Err(BundleError::InvalidDescriptor(format!(
            "missing key in line: {line}"
        )));
    }

    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(':').or_else(|| rest.strip_prefix('=')) {
        rest = stripped.trim_start();
    }
    Ok((key.to_string(), rest.trim_end().to_string()))
}

#[cfg(test)]
#[path = "descriptor/descriptor_tests.rs"]
mod descriptor_tests;
