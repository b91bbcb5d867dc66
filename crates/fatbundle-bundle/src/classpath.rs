//! Classpath synthesis from the library files present after unpacking.

use crate::BundleResult;
use crate::walker::{self, FileClassification, WalkOrder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Separator between classpath entries in the build descriptor.
pub const CLASSPATH_DELIMITER: &str = ", ";

/// How classpath entries are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    /// Absolute paths as produced by the walk.
    #[default]
    Absolute,
    /// Paths relative to the source root.
    Relative,
}

/// Options for [`synthesize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClasspathOptions {
    /// Library file extensions, without leading dot.
    pub extensions: BTreeSet<String>,
    pub style: PathStyle,
    pub order: WalkOrder,
}

impl Default for ClasspathOptions {
    fn default() -> Self {
        Self {
            extensions: BTreeSet::from([crate::JAR_EXTENSION.to_string()]),
            style: PathStyle::default(),
            order: WalkOrder::default(),
        }
    }
}

/// Ordered, duplicate-free list of library locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

impl Classpath {
    /// Build from entries, dropping later duplicates.
    pub fn from_entries<I: IntoIterator<Item = PathBuf>>(entries: I) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.clone()))
            .collect();
        Self { entries }
    }

    /// Entries in classpath order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `-classpath` value: entries joined with [`CLASSPATH_DELIMITER`].
    pub fn to_descriptor_value(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.to_string_lossy())
            .collect::<Vec<_>>()
            .join(CLASSPATH_DELIMITER)
    }

    pub fn into_entries(self) -> Vec<PathBuf> {
        self.entries
    }
}

impl fmt::Display for Classpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_descriptor_value())
    }
}

/// Walk `root` and collect every library file into a [`Classpath`].
///
/// An empty result is legal. Two calls on an unchanged tree return the same
/// classpath.
pub fn synthesize(root: &Path, options: &ClasspathOptions) -> BundleResult<Classpath> {
    let libraries = walker::walk_filtered(root, options.order, |path| {
        walker::has_extension(path, &options.extensions)
    })?;
    Ok(collect(root, libraries, options))
}

/// Build the classpath from an existing classification of `root`.
///
/// Selection is by extension, so an archive that is also a library stays on
/// the classpath after extraction.
pub fn from_classification(
    root: &Path,
    files: &[FileClassification],
    options: &ClasspathOptions,
) -> Classpath {
    let libraries = files
        .iter()
        .filter(|file| walker::has_extension(&file.path, &options.extensions))
        .map(|file| file.path.clone())
        .collect();
    collect(root, libraries, options)
}

fn collect(root: &Path, libraries: Vec<PathBuf>, options: &ClasspathOptions) -> Classpath {
    let entries = libraries.into_iter().map(|path| match options.style {
        PathStyle::Absolute => path,
        PathStyle::Relative => path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or(path),
    });

    let classpath = Classpath::from_entries(entries);
    tracing::debug!("Classpath has {} entries", classpath.len());
    classpath
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("lib/b-2.0.jar"), b"b").unwrap();
        fs::write(root.join("a-1.0.jar"), b"a").unwrap();
        fs::write(root.join("readme.txt"), b"r").unwrap();
        fs::write(root.join("deps.zip"), b"z").unwrap();
    }

    #[test]
    fn synthesize___collects_only_library_files() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        let classpath = synthesize(temp.path(), &ClasspathOptions::default()).unwrap();

        assert_eq!(
            classpath.entries(),
            &[temp.path().join("a-1.0.jar"), temp.path().join("lib/b-2.0.jar")]
        );
    }

    #[test]
    fn synthesize___joins_with_comma_space() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());
        let options = ClasspathOptions {
            style: PathStyle::Relative,
            ..ClasspathOptions::default()
        };

        let classpath = synthesize(temp.path(), &options).unwrap();

        assert_eq!(classpath.to_descriptor_value(), "a-1.0.jar, lib/b-2.0.jar");
        assert_eq!(classpath.to_string(), "a-1.0.jar, lib/b-2.0.jar");
    }

    #[test]
    fn synthesize___empty_tree___yields_empty_string() {
        let temp = TempDir::new().unwrap();

        let classpath = synthesize(temp.path(), &ClasspathOptions::default()).unwrap();

        assert!(classpath.is_empty());
        assert_eq!(classpath.to_descriptor_value(), "");
    }

    #[test]
    fn synthesize___twice_on_unchanged_tree___is_identical() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        for order in [WalkOrder::Sorted, WalkOrder::Filesystem] {
            let options = ClasspathOptions {
                order,
                ..ClasspathOptions::default()
            };
            let first = synthesize(temp.path(), &options).unwrap();
            let second = synthesize(temp.path(), &options).unwrap();
            assert_eq!(first.to_descriptor_value(), second.to_descriptor_value());
        }
    }

    #[test]
    fn from_classification___matches_fresh_synthesis() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());
        let request = fatbundle_core::BuildRequest::builder("com.example", "1.0.0")
            .source_directory(temp.path())
            .target_directory("/out")
            .extensions_to_unarchive(["jar"])
            .build()
            .unwrap();
        let options = ClasspathOptions::default();
        let files =
            walker::classify(temp.path(), &request, &options.extensions, options.order).unwrap();

        let classpath = from_classification(temp.path(), &files, &options);

        assert_eq!(classpath, synthesize(temp.path(), &options).unwrap());
        assert_eq!(classpath.len(), 2);
    }

    #[test]
    fn synthesize___custom_extensions___are_honoured() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());
        let options = ClasspathOptions {
            extensions: BTreeSet::from(["zip".to_string()]),
            style: PathStyle::Relative,
            order: WalkOrder::Sorted,
        };

        let classpath = synthesize(temp.path(), &options).unwrap();

        assert_eq!(classpath.to_descriptor_value(), "deps.zip");
    }

    #[test]
    fn Classpath___from_entries___drops_duplicates_keeping_first() {
        let classpath = Classpath::from_entries(vec![
            PathBuf::from("b.jar"),
            PathBuf::from("a.jar"),
            PathBuf::from("b.jar"),
        ]);

        assert_eq!(classpath.to_descriptor_value(), "b.jar, a.jar");
    }

    proptest! {
        #[test]
        fn Classpath___from_entries___has_no_duplicates(names in proptest::collection::vec("[a-c]{1,2}\\.jar", 0..12)) {
            let classpath = Classpath::from_entries(names.iter().map(PathBuf::from));
            let unique: HashSet<&PathBuf> = classpath.entries().iter().collect();
            prop_assert_eq!(unique.len(), classpath.len());
        }
    }
}
