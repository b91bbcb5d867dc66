//! SHA-256 digests of generated artifacts.

use crate::BundleResult;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Compute SHA256 hash of data and return as hex string.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash a file without reading it into memory at once.
pub fn file_sha256(path: &Path) -> BundleResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Compare `data` against a digest, accepting a `sha256:` prefix.
pub fn verify_sha256(data: &[u8], expected: &str) -> bool {
    let expected_hex = expected.strip_prefix("sha256:").unwrap_or(expected);
    compute_sha256(data).eq_ignore_ascii_case(expected_hex)
}
