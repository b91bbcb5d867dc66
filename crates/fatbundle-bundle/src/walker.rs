//! Source tree traversal and file classification.
//!
//! Every call performs a fresh traversal. The tree changes between stages
//! (extraction adds files), so results are never cached.

use crate::BundleResult;
use fatbundle_core::BuildRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Order in which sibling entries are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkOrder {
    /// Whatever order the filesystem enumerates directory entries in.
    Filesystem,
    /// Siblings sorted by file name, stable across filesystems.
    #[default]
    Sorted,
}

/// How a file in the source tree is treated by later stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Archive whose entries are merged into the source root.
    ToUnarchive,
    /// Library contributing to the classpath.
    Library,
    /// Any other resource.
    Plain,
}

/// A file path tagged with its [`FileKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileClassification {
    pub path: PathBuf,
    pub kind: FileKind,
}

/// Number of files of each [`FileKind`] in one classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub to_unarchive: usize,
    pub library: usize,
    pub plain: usize,
}

impl ClassificationSummary {
    pub fn of(files: &[FileClassification]) -> Self {
        files.iter().fold(Self::default(), |mut summary, file| {
            match file.kind {
                FileKind::ToUnarchive => summary.to_unarchive += 1,
                FileKind::Library => summary.library += 1,
                FileKind::Plain => summary.plain += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.to_unarchive + self.library + self.plain
    }
}

/// Collect every regular file below `root`, recursively.
///
/// Symbolic links are not followed and directories are not reported.
pub fn walk(root: &Path, order: WalkOrder) -> BundleResult<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root).follow_links(false);
    if order == WalkOrder::Sorted {
        walker = walker.sort_by_file_name();
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Collect the regular files below `root` accepted by `predicate`.
pub fn walk_filtered<F>(root: &Path, order: WalkOrder, mut predicate: F) -> BundleResult<Vec<PathBuf>>
where
    F: FnMut(&Path) -> bool,
{
    Ok(walk(root, order)?
        .into_iter()
        .filter(|path| predicate(path))
        .collect())
}

/// Whether `path` ends in one of the given extensions (without leading dot).
pub fn has_extension(path: &Path, extensions: &BTreeSet<String>) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    extensions
        .iter()
        .any(|ext| name.ends_with(&format!(".{ext}")))
}

/// Classify one path.
///
/// Extraction wins over the library role when an extension is in both sets.
pub fn classify_path(
    path: &Path,
    request: &BuildRequest,
    library_extensions: &BTreeSet<String>,
) -> FileKind {
    if request.should_unarchive(path) {
        FileKind::ToUnarchive
    } else if has_extension(path, library_extensions) {
        FileKind::Library
    } else {
        FileKind::Plain
    }
}

/// Walk `root` and classify every regular file.
pub fn classify(
    root: &Path,
    request: &BuildRequest,
    library_extensions: &BTreeSet<String>,
    order: WalkOrder,
) -> BundleResult<Vec<FileClassification>> {
    Ok(walk(root, order)?
        .into_iter()
        .map(|path| {
            let kind = classify_path(&path, request, library_extensions);
            FileClassification { path, kind }
        })
        .collect())
}
