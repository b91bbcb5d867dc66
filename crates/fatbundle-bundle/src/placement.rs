//! Moving the generated JAR to its final location.

use crate::{BundleError, BundleResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Move `generated` to `target_dir/file_name`.
///
/// The target directory is created when missing. An existing file at the
/// destination is replaced. A rename across filesystems falls back to a copy
/// into a sibling temporary file followed by a rename, so the destination
/// never holds a partial file.
pub fn place(generated: &Path, target_dir: &Path, file_name: &str) -> BundleResult<PathBuf> {
    if !generated.is_file() {
        return Err(BundleError::GeneratedArtifactMissing(generated.to_path_buf()));
    }

    fs::create_dir_all(target_dir)?;
    let destination = target_dir.join(file_name);

    if let Err(err) = fs::rename(generated, &destination) {
        tracing::debug!(
            "Rename of {} failed ({}), copying instead",
            generated.display(),
            err
        );
        let staging = target_dir.join(format!(".{file_name}.partial"));
        fs::copy(generated, &staging)?;
        if let Err(err) = fs::rename(&staging, &destination) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        fs::remove_file(generated)?;
    }

    tracing::info!("Placed bundle at {}", destination.display());
    Ok(destination)
}
