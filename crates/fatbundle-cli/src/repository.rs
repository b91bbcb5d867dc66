//! Local artifact cache browser
//!
//! Copies cached dependency artifacts into the source directory before the
//! pipeline runs. Dependencies whose type is marked for extraction are
//! delivered by the resolver instead.

use crate::config::Dependency;
use anyhow::{Context, Result};
use fatbundle_core::BuildRequest;
use std::fs;
use std::path::{Path, PathBuf};

/// A Maven-layout artifact cache on disk
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<group as path>/<artifact>/<version>/<artifact>-<version>.<type>`
    pub fn artifact_path(&self, dep: &Dependency) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(dep.group.split('.').filter(|part| !part.is_empty()));
        path.push(&dep.artifact);
        path.push(&dep.version);
        path.push(format!("{}-{}.{}", dep.artifact, dep.version, dep.kind));
        path
    }

    /// Copy every non-extracted dependency into the request's source directory
    ///
    /// Returns the copied files. A dependency missing from the cache is fatal.
    pub fn copy_artifacts(
        &self,
        dependencies: &[Dependency],
        request: &BuildRequest,
    ) -> Result<Vec<PathBuf>> {
        let destination = request.source_directory();
        let mut copied = Vec::new();

        for dep in dependencies {
            if request.is_unarchive_type(&dep.kind) {
                continue;
            }
            let source = self.artifact_path(dep);
            if !source.is_file() {
                anyhow::bail!(
                    "Artifact {} not found in local repository: {}",
                    dep.coordinates(),
                    source.display()
                );
            }
            let file_name = source
                .file_name()
                .map(PathBuf::from)
                .with_context(|| format!("Invalid artifact path: {}", source.display()))?;
            let target = destination.join(file_name);
            fs::copy(&source, &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    source.display(),
                    target.display()
                )
            })?;
            tracing::debug!("Copied {} to {}", dep.coordinates(), target.display());
            copied.push(target);
        }

        tracing::info!("Copied {} artifact(s) from {}", copied.len(), self.root.display());
        Ok(copied)
    }
}
