//! JAR manifest (`META-INF/MANIFEST.MF`) main section.
//!
//! Lines are written as `Name: value`, wrapped at 72 bytes with single-space
//! continuation lines and CRLF line endings.

use crate::{BundleError, BundleResult};
use serde::Serialize;

/// Location of the manifest inside a JAR.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Header that must come first in every manifest.
pub const MANIFEST_VERSION: &str = "Manifest-Version";

/// OSGi header names written by the generators.
pub mod headers {
    pub const BUNDLE_MANIFEST_VERSION: &str = "Bundle-ManifestVersion";
    pub const BUNDLE_SYMBOLIC_NAME: &str = "Bundle-SymbolicName";
    pub const BUNDLE_NAME: &str = "Bundle-Name";
    pub const BUNDLE_VERSION: &str = "Bundle-Version";
    pub const EXPORT_PACKAGE: &str = "Export-Package";
    pub const CREATED_BY: &str = "Created-By";
}

const MAX_LINE_BYTES: usize = 72;

/// Main attributes of a JAR manifest, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JarManifest {
    attributes: Vec<(String, String)>,
}

impl Default for JarManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl JarManifest {
    /// Create a manifest holding only `Manifest-Version: 1.0`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attributes: vec![(MANIFEST_VERSION.to_string(), "1.0".to_string())],
        }
    }

    /// Look up an attribute; names compare case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Iterate over all attributes in order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the manifest has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// `Bundle-SymbolicName` without its directives.
    #[must_use]
    pub fn symbolic_name(&self) -> Option<&str> {
        self.get(headers::BUNDLE_SYMBOLIC_NAME)
            .map(|value| value.split(';').next().unwrap_or(value).trim())
    }

    /// Render the manifest text; `Manifest-Version` always comes first.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let version = self.get(MANIFEST_VERSION).unwrap_or("1.0");
        write_header(&mut out, MANIFEST_VERSION, version);
        for (name, value) in self.attributes() {
            if name.eq_ignore_ascii_case(MANIFEST_VERSION) {
                continue;
            }
            write_header(&mut out, name, value);
        }
        out.push_str("\r\n");
        out
    }

    /// Parse the main section of a manifest.
    pub fn parse(text: &str) -> BundleResult<Self> {
        let mut attributes: Vec<(String, String)> = Vec::new();

        for raw in text.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                // End of the main section
                break;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                let last = attributes.last_mut().ok_or_else(|| {
                    BundleError::InvalidManifest(
                        "continuation line before the first header".to_string(),
                    )
                })?;
                last.1.push_str(continuation);
                continue;
            }
            let (name, value) = line.split_once(": ").ok_or_else(|| {
                BundleError::InvalidManifest(format!("malformed header line: {line}"))
            })?;
            if !is_valid_header_name(name) {
                return Err(BundleError::InvalidManifest(format!(
                    "invalid header name: {name}"
                )));
            }
            attributes.push((name.to_string(), value.to_string()));
        }

        Ok(Self { attributes })
    }
}

fn write_header(out: &mut String, name: &str, value: &str) {
    let line = format!("{name}: {value}");
    let mut rest = line.as_str();
    let mut limit = MAX_LINE_BYTES;
    let mut continuation = false;

    loop {
        if continuation {
            out.push(' ');
        }
        if rest.len() <= limit {
            out.push_str(rest);
            out.push_str("\r\n");
            return;
        }
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        out.push_str(&rest[..cut]);
        out.push_str("\r\n");
        rest = &rest[cut..];
        continuation = true;
        limit = MAX_LINE_BYTES - 1;
    }
}

fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
