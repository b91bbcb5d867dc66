//! Read access to generated JARs.
//!
//! The [`JarReader`] opens a JAR, parses its manifest and gives access to
//! individual entries.

use crate::manifest::{JarManifest, MANIFEST_PATH};
use crate::{BundleError, BundleResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Reader for JAR archives.
///
/// # Example
///
/// ```no_run
/// use fatbundle_bundle::JarReader;
///
/// let reader = JarReader::open("target/com.example.fat-1.0.0.jar")?;
/// println!("{:?}", reader.manifest().symbolic_name());
/// # Ok::<(), fatbundle_bundle::BundleError>(())
/// ```
#[derive(Debug)]
pub struct JarReader {
    archive: ZipArchive<File>,
    manifest: JarManifest,
}

impl JarReader {
    /// Open a JAR and parse its manifest.
    pub fn open<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        let file = File::open(path.as_ref())?;
        let mut archive = ZipArchive::new(file)?;

        let manifest = {
            let mut manifest_file = archive.by_name(MANIFEST_PATH).map_err(|_| {
                BundleError::MissingFile(format!("{MANIFEST_PATH} not found in jar"))
            })?;
            let mut text = String::new();
            manifest_file.read_to_string(&mut text)?;
            JarManifest::parse(&text)?
        };

        Ok(Self { archive, manifest })
    }

    #[must_use]
    pub fn manifest(&self) -> &JarManifest {
        &self.manifest
    }

    /// Read an entry as bytes.
    pub fn read_file(&mut self, path: &str) -> BundleResult<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| BundleError::MissingFile(format!("File not found in jar: {path}")))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Read an entry as UTF-8 text.
    pub fn read_file_string(&mut self, path: &str) -> BundleResult<String> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| BundleError::MissingFile(format!("File not found in jar: {path}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(contents)
    }

    /// Entry names in archive order.
    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i).map(String::from))
            .collect()
    }

    #[must_use]
    pub fn has_file(&self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }
}
