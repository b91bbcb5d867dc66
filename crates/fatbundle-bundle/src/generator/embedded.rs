use super::{GenerateJob, Generator, merged_properties};
use crate::builder::JarBuilder;
use crate::manifest::{JarManifest, headers};
use crate::BundleResult;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::PathBuf;

/// Writes the bundle JAR in-process.
///
/// Every classpath library is merged into the output. Descriptor entries whose
/// name starts with an uppercase letter become manifest headers, with macros
/// expanded. A wildcard in `Export-Package` is replaced by the packages found
/// in the merged entries; when nothing matches, the expanded instruction is
/// written unchanged.
#[derive(Debug, Clone)]
pub struct EmbeddedGenerator {
    created_by: String,
}

impl Default for EmbeddedGenerator {
    fn default() -> Self {
        Self {
            created_by: format!("fatbundle {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Generator for EmbeddedGenerator {
    fn name(&self) -> &str {
        "embedded"
    }

    fn generate(&self, job: &GenerateJob<'_>) -> BundleResult<PathBuf> {
        let props = merged_properties(job)?;
        let base_dir = job.descriptor.parent().unwrap_or(job.source_dir);
        let libraries = props.classpath_entries(base_dir)?;

        let mut builder = JarBuilder::new(JarManifest::new());
        for library in &libraries {
            if let Err(err) = builder.merge_archive(library) {
                tracing::warn!("Skipping classpath entry {}: {}", library.display(), err);
            }
        }

        let packages = builder.packages();
        let manifest = builder.manifest_mut();
        manifest.set(headers::BUNDLE_MANIFEST_VERSION, "2");
        for (name, raw) in props.headers() {
            let value = props.expand(raw)?;
            let value = if name == headers::EXPORT_PACKAGE {
                expand_export_package(&value, &packages)
            } else {
                value
            };
            manifest.set(name, value);
        }
        manifest.set(headers::CREATED_BY, self.created_by.as_str());

        fs::create_dir_all(job.output_dir)?;
        let output = job.output_dir.join(job.request.file_name());
        tracing::info!(
            "Writing {} from {} classpath entries",
            output.display(),
            libraries.len()
        );
        builder.write(&output)?;
        Ok(output)
    }
}

/// Replace wildcard clauses of an `Export-Package` value with matching packages.
///
/// `*` matches every package and `com.foo.*` matches `com.foo` and its
/// subpackages. Attributes after the first `;` are carried over to each match.
pub(crate) fn expand_export_package(instruction: &str, packages: &BTreeSet<String>) -> String {
    let mut exported = Vec::new();
    let mut seen = HashSet::new();

    for clause in instruction.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let (pattern, attrs) = match clause.find(';') {
            Some(idx) => clause.split_at(idx),
            None => (clause, ""),
        };
        let pattern = pattern.trim();

        if let Some(prefix) = pattern.strip_suffix('*') {
            let exact = prefix.strip_suffix('.');
            for package in packages
                .iter()
                .filter(|p| p.starts_with(prefix) || exact == Some(p.as_str()))
            {
                if seen.insert(package.clone()) {
                    exported.push(format!("{package}{attrs}"));
                }
            }
        } else if seen.insert(pattern.to_string()) {
            exported.push(clause.to_string());
        }
    }

    if exported.is_empty() {
        instruction.to_string()
    } else {
        exported.join(",")
    }
}
