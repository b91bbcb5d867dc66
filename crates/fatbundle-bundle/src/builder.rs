//! JAR assembly.
//!
//! The [`JarBuilder`] collects entries from loose bytes, files and whole
//! archives, then writes a JAR whose first entries are `META-INF/` and the
//! manifest. Every entry carries the same fixed timestamp so identical inputs
//! produce identical bytes.

use crate::manifest::{JarManifest, MANIFEST_PATH};
use crate::BundleResult;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const META_INF_DIR: &str = "META-INF/";

/// Builder for JAR archives.
///
/// # Example
///
/// ```no_run
/// use fatbundle_bundle::{JarBuilder, JarManifest};
///
/// let mut builder = JarBuilder::new(JarManifest::new());
/// builder.merge_archive("lib/commons-1.2.jar".as_ref())?;
/// builder.add_bytes("config/defaults.properties", b"a=b".to_vec());
/// builder.write("out/fat.jar".as_ref())?;
/// # Ok::<(), fatbundle_bundle::BundleError>(())
/// ```
#[derive(Debug)]
pub struct JarBuilder {
    manifest: JarManifest,
    files: BTreeMap<String, Vec<u8>>,
}

impl JarBuilder {
    #[must_use]
    pub fn new(manifest: JarManifest) -> Self {
        Self {
            manifest,
            files: BTreeMap::new(),
        }
    }

    /// Add raw bytes. Returns `false` if the path is already taken.
    pub fn add_bytes(&mut self, archive_path: &str, contents: Vec<u8>) -> bool {
        let archive_path = archive_path.trim_start_matches('/');
        if self.files.contains_key(archive_path) || is_reserved(archive_path) {
            return false;
        }
        self.files.insert(archive_path.to_string(), contents);
        true
    }

    /// Copy every file entry of the archive at `path`.
    ///
    /// Directory entries, the manifest and signature files are skipped. When
    /// two archives carry the same entry the first one added wins. Returns the
    /// number of entries taken.
    pub fn merge_archive(&mut self, path: &Path) -> BundleResult<usize> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut added = 0;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            if is_reserved(&name) || is_signature_file(&name) || self.files.contains_key(&name) {
                continue;
            }
            let mut contents = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry.read_to_end(&mut contents)?;
            self.files.insert(name, contents);
            added += 1;
        }

        tracing::debug!("Merged {} entries from {}", added, path.display());
        Ok(added)
    }

    /// Java packages implied by the collected entries.
    ///
    /// A package is the parent directory of any file outside `META-INF/`, with
    /// `/` replaced by `.`. Root-level files contribute nothing.
    #[must_use]
    pub fn packages(&self) -> BTreeSet<String> {
        self.files
            .keys()
            .filter(|name| !name.starts_with(META_INF_DIR))
            .filter_map(|name| name.rsplit_once('/').map(|(dir, _)| dir))
            .filter(|dir| !dir.is_empty())
            .map(|dir| dir.replace('/', "."))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn manifest(&self) -> &JarManifest {
        &self.manifest
    }

    pub fn manifest_mut(&mut self) -> &mut JarManifest {
        &mut self.manifest
    }

    /// Write the JAR to `output_path`, replacing any existing file.
    pub fn write(self, output_path: &Path) -> BundleResult<()> {
        let file = File::create(output_path)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        zip.add_directory(META_INF_DIR, options)?;
        zip.start_file(MANIFEST_PATH, options)?;
        zip.write_all(self.manifest.render().as_bytes())?;

        for (archive_path, contents) in &self.files {
            zip.start_file(archive_path.as_str(), options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        tracing::debug!(
            "Wrote {} with {} entries",
            output_path.display(),
            self.files.len() + 2
        );
        Ok(())
    }
}

fn is_reserved(name: &str) -> bool {
    name == MANIFEST_PATH || name == META_INF_DIR || name == "META-INF/INDEX.LIST"
}

fn is_signature_file(name: &str) -> bool {
    let Some(file) = name.strip_prefix(META_INF_DIR) else {
        return false;
    };
    if file.contains('/') {
        return false;
    }
    let upper = file.to_ascii_uppercase();
    [".SF", ".RSA", ".DSA", ".EC"]
        .iter()
        .any(|ext| upper.ends_with(ext))
}
