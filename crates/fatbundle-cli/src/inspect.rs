//! Inspect command implementation

use anyhow::{Context, Result};
use fatbundle::JarReader;
use fatbundle_bundle::checksum::file_sha256;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub(crate) struct Header {
    name: String,
    value: String,
}

/// What `fatbundle inspect` reports about a JAR
#[derive(Debug, Serialize)]
pub(crate) struct Inspection {
    path: PathBuf,
    sha256: String,
    size: u64,
    symbolic_name: Option<String>,
    headers: Vec<Header>,
    entries: Vec<String>,
}

pub(crate) fn inspect(path: &Path) -> Result<Inspection> {
    let reader =
        JarReader::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let manifest = reader.manifest();

    Ok(Inspection {
        path: path.to_path_buf(),
        sha256: file_sha256(path)?,
        size: std::fs::metadata(path)?.len(),
        symbolic_name: manifest.symbolic_name().map(str::to_string),
        headers: manifest
            .attributes()
            .map(|(name, value)| Header {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
        entries: reader.list_files(),
    })
}

/// Run the inspect command
pub fn run(jar: &Path, json: bool) -> Result<()> {
    let inspection = inspect(jar)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        return Ok(());
    }

    println!("Bundle: {}", inspection.path.display());
    println!("SHA-256: {}", inspection.sha256);
    println!("Size: {} bytes", inspection.size);
    println!("\nManifest:");
    for header in &inspection.headers {
        println!("  {}: {}", header.name, header.value);
    }
    println!("\nEntries ({}):", inspection.entries.len());
    for entry in &inspection.entries {
        println!("  {entry}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use fatbundle_bundle::manifest::headers;
    use fatbundle_bundle::{JarBuilder, JarManifest};
    use tempfile::TempDir;

    #[test]
    fn inspect___reports_headers_and_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bundle.jar");
        let mut manifest = JarManifest::new();
        manifest.set(headers::BUNDLE_SYMBOLIC_NAME, "com.example.fat;singleton:=true");
        let mut builder = JarBuilder::new(manifest);
        builder.add_bytes("a/A.class", b"A".to_vec());
        builder.write(&path).unwrap();

        let inspection = inspect(&path).unwrap();

        assert_eq!(inspection.symbolic_name.as_deref(), Some("com.example.fat"));
        assert_eq!(inspection.headers[0].name, "Manifest-Version");
        assert!(inspection.entries.contains(&"a/A.class".to_string()));
        assert_eq!(inspection.sha256.len(), 64);
    }

    #[test]
    fn inspect___not_a_jar___fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bundle.jar");
        std::fs::write(&path, b"nope").unwrap();

        assert!(inspect(&path).is_err());
    }
}
