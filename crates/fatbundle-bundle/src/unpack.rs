//! Flat extraction of nested archives into the source directory.
//!
//! A file that passes the extension filter but cannot be decoded is skipped
//! and recorded in the [`UnpackReport`]; it never aborts the batch. There is
//! no rollback of a partially extracted archive.

use crate::BundleResult;
use crate::walker::{self, WalkOrder};
use fatbundle_core::BuildRequest;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Result of extracting one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnpackStatus {
    /// All entries were written into the destination.
    Extracted { entries: usize },
    /// The file was left untouched (or partially extracted) because of `reason`.
    Skipped { reason: String },
}

/// Per-file unpack result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnpackOutcome {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: UnpackStatus,
}

impl UnpackOutcome {
    /// Whether the archive was extracted.
    #[must_use]
    pub fn is_extracted(&self) -> bool {
        matches!(self.status, UnpackStatus::Extracted { .. })
    }
}

/// Outcomes of one unpack stage, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnpackReport {
    pub outcomes: Vec<UnpackOutcome>,
}

impl UnpackReport {
    /// Number of archives extracted.
    #[must_use]
    pub fn extracted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_extracted()).count()
    }

    /// Archives that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &UnpackOutcome> {
        self.outcomes.iter().filter(|o| !o.is_extracted())
    }

    /// Number of archives skipped.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }
}

/// Extract every entry of `archive` into `destination`.
///
/// Never fails: decoding and write errors turn into [`UnpackStatus::Skipped`].
pub fn unpack(archive: &Path, destination: &Path) -> UnpackOutcome {
    let status = match extract(archive, destination) {
        Ok(entries) => {
            tracing::debug!(
                "Extracted {} entries from {}",
                entries,
                archive.display()
            );
            UnpackStatus::Extracted { entries }
        }
        Err(reason) => {
            tracing::warn!("Skipping {}: {}", archive.display(), reason);
            UnpackStatus::Skipped { reason }
        }
    };

    UnpackOutcome {
        path: archive.to_path_buf(),
        status,
    }
}

fn extract(archive: &Path, destination: &Path) -> Result<usize, String> {
    let file = File::open(archive).map_err(|e| format!("cannot open archive: {e}"))?;
    let mut zip = ZipArchive::new(file).map_err(|e| format!("not a valid archive: {e}"))?;
    let entries = zip.len();
    zip.extract(destination)
        .map_err(|e| format!("extraction aborted: {e}"))?;
    Ok(entries)
}

/// Extract every archive below `root` matching the request's extensions.
///
/// The archive list is taken from one walk that completes before the first
/// extraction, so archives produced by extraction are not unpacked again in
/// the same run. Contents land flat in `root`.
pub fn unpack_all(
    root: &Path,
    request: &BuildRequest,
    order: WalkOrder,
) -> BundleResult<UnpackReport> {
    if request.extensions_to_unarchive().is_empty() {
        tracing::debug!("No extensions to unarchive configured");
        return Ok(UnpackReport::default());
    }

    let archives = walker::walk_filtered(root, order, |path| request.should_unarchive(path))?;
    tracing::info!("Unpacking {} archive(s) into {}", archives.len(), root.display());

    let outcomes = archives
        .iter()
        .map(|archive| unpack(archive, root))
        .collect();

    Ok(UnpackReport { outcomes })
}
