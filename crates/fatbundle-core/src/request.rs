//! The immutable description of one build run

use crate::{BuildError, BuildResult};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Everything the pipeline needs to know about a single build
///
/// A request is constructed once per invocation through [`BuildRequest::builder`]
/// and then shared by reference with every stage. It is never mutated after
/// [`BuildRequestBuilder::build`] has validated it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRequest {
    symbolic_name: String,
    version: String,
    source_directory: PathBuf,
    target_directory: PathBuf,
    target_file_name: Option<String>,
    extensions_to_unarchive: BTreeSet<String>,
    update_dependency_versions: bool,
}

impl BuildRequest {
    /// Start building a request for the given bundle identity
    pub fn builder(
        symbolic_name: impl Into<String>,
        version: impl Into<String>,
    ) -> BuildRequestBuilder {
        BuildRequestBuilder {
            symbolic_name: symbolic_name.into(),
            version: version.into(),
            source_directory: PathBuf::new(),
            target_directory: PathBuf::new(),
            target_file_name: None,
            extensions_to_unarchive: BTreeSet::new(),
            update_dependency_versions: true,
        }
    }

    /// Bundle symbolic name
    pub fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    /// Bundle version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Ephemeral working directory owned by this build
    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    /// Directory receiving the final artifact
    pub fn target_directory(&self) -> &Path {
        &self.target_directory
    }

    /// Explicit artifact file name, if one was configured
    pub fn target_file_name(&self) -> Option<&str> {
        self.target_file_name.as_deref()
    }

    /// Normalised extensions (no leading dot) of archives to extract
    pub fn extensions_to_unarchive(&self) -> &BTreeSet<String> {
        &self.extensions_to_unarchive
    }

    /// Whether the dependency resolver should look for newer versions
    pub fn update_dependency_versions(&self) -> bool {
        self.update_dependency_versions
    }

    /// Final artifact file name
    ///
    /// Falls back to `<symbolicName>-<version>.jar` when no non-blank name was set.
    pub fn file_name(&self) -> String {
        match self.target_file_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}-{}.jar", self.symbolic_name, self.version),
        }
    }

    /// Final artifact location
    pub fn artifact_path(&self) -> PathBuf {
        self.target_directory.join(self.file_name())
    }

    /// Check whether a dependency type or file extension is marked for extraction
    pub fn is_unarchive_type(&self, extension: &str) -> bool {
        self.extensions_to_unarchive
            .contains(normalize_extension(extension).as_str())
    }

    /// Check whether a file should be extracted, based on its name
    pub fn should_unarchive(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        self.extensions_to_unarchive
            .iter()
            .any(|ext| name.ends_with(&format!(".{ext}")))
    }

    /// Validate the request
    ///
    /// Runs before the pipeline touches the filesystem; every violation is a
    /// precondition failure.
    pub fn validate(&self) -> BuildResult<()> {
        if self.symbolic_name.trim().is_empty() {
            return Err(BuildError::InvalidRequest(
                "Bundle Symbolic Name cannot be empty".to_string(),
            ));
        }

        if self.version.trim().is_empty() {
            return Err(BuildError::InvalidRequest(
                "Bundle Version cannot be empty".to_string(),
            ));
        }

        if self.target_directory.as_os_str().is_empty()
            || self.target_directory.to_string_lossy().trim().is_empty()
        {
            return Err(BuildError::InvalidRequest(
                "Target Directory cannot be empty".to_string(),
            ));
        }

        if self.source_directory.as_os_str().is_empty() {
            return Err(BuildError::InvalidRequest(
                "Source Directory cannot be empty".to_string(),
            ));
        }

        if lexical_absolute(&self.target_directory)
            .starts_with(lexical_absolute(&self.source_directory))
        {
            return Err(BuildError::InvalidRequest(format!(
                "Target Directory {} must not be inside Source Directory {}",
                self.target_directory.display(),
                self.source_directory.display()
            )));
        }

        if let Some(name) = &self.target_file_name
            && (name.contains('/') || name.contains('\\'))
        {
            return Err(BuildError::InvalidRequest(format!(
                "Target File Name must not contain path separators: {name}"
            )));
        }

        Ok(())
    }
}

/// Builder for [`BuildRequest`]
#[derive(Debug, Clone)]
pub struct BuildRequestBuilder {
    symbolic_name: String,
    version: String,
    source_directory: PathBuf,
    target_directory: PathBuf,
    target_file_name: Option<String>,
    extensions_to_unarchive: BTreeSet<String>,
    update_dependency_versions: bool,
}

impl BuildRequestBuilder {
    /// Set the ephemeral source directory
    pub fn source_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_directory = path.into();
        self
    }

    /// Set the target directory
    pub fn target_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_directory = path.into();
        self
    }

    /// Set the artifact file name; blank names fall back to the default
    pub fn target_file_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.target_file_name = if name.trim().is_empty() {
            None
        } else {
            Some(name.trim().to_string())
        };
        self
    }

    /// Add extensions of archives that should be extracted
    pub fn extensions_to_unarchive<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions_to_unarchive.extend(
            extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty()),
        );
        self
    }

    /// Set whether dependency versions should be updated before copying
    pub fn update_dependency_versions(mut self, update: bool) -> Self {
        self.update_dependency_versions = update;
        self
    }

    /// Validate and build the request
    pub fn build(self) -> BuildResult<BuildRequest> {
        let request = BuildRequest {
            symbolic_name: self.symbolic_name.trim().to_string(),
            version: self.version.trim().to_string(),
            source_directory: self.source_directory,
            target_directory: self.target_directory,
            target_file_name: self.target_file_name,
            extensions_to_unarchive: self.extensions_to_unarchive,
            update_dependency_versions: self.update_dependency_versions,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Absolute form of `path` with `.` and `..` folded, without touching the filesystem.
fn lexical_absolute(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_string()
}
