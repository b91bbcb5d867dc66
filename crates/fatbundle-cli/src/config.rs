//! Project file (`fatbundle.toml`) parsing and resolution

use anyhow::{Context, Result};
use fatbundle_bundle::{GeneratorConfig, WalkOrder};
use fatbundle_core::{BuildRequest, LogLevel, Properties, resolve_location};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default project file name
pub const PROJECT_FILE: &str = "fatbundle.toml";

/// Source directory created next to the project file when none is given
pub const DEFAULT_SOURCE_DIR: &str = "fatbundle_build";

/// Default local artifact cache
pub const DEFAULT_REPOSITORY: &str = "${user.home}/.m2/repository";

/// fatbundle.toml structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub bundle: BundleSection,

    /// User properties available as `${name}` placeholders
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    #[serde(default)]
    pub repository: RepositorySection,

    #[serde(default)]
    pub resolver: ResolverSection,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSection {
    pub symbolic_name: String,
    pub version: String,
    pub target_directory: String,

    #[serde(default)]
    pub target_file_name: Option<String>,

    #[serde(default)]
    pub extensions_to_unarchive: Vec<String>,

    #[serde(default = "default_true")]
    pub update_dependency_versions: bool,

    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub walk_order: WalkOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySection {
    #[serde(default = "default_repository")]
    pub local: String,
}

impl Default for RepositorySection {
    fn default() -> Self {
        Self {
            local: default_repository(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maven installation directory, used when no `M2_HOME`-style variable is set
    #[serde(default)]
    pub maven_location: Option<String>,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            enabled: true,
            maven_location: None,
        }
    }
}

/// One Maven coordinate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub group: String,
    pub artifact: String,
    pub version: String,

    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
}

impl Dependency {
    /// `group:artifact:version:type`
    pub fn coordinates(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.group, self.artifact, self.version, self.kind
        )
    }
}

fn default_true() -> bool {
    true
}

fn default_repository() -> String {
    DEFAULT_REPOSITORY.to_string()
}

fn default_type() -> String {
    "jar".to_string()
}

/// Command-line values that take precedence over the project file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source_dir: Option<PathBuf>,
    pub target_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    pub log_level: Option<LogLevel>,
    pub offline: bool,
}

/// Project with every placeholder expanded and every location made absolute
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub request: BuildRequest,
    pub generator: GeneratorConfig,
    pub dependencies: Vec<Dependency>,
    pub repository: PathBuf,
    /// `None` when resolution is disabled or offline
    pub resolver: Option<ResolverSettings>,
    pub log_level: LogLevel,
    pub walk_order: WalkOrder,
    /// Whether the source directory is the tool-owned default
    pub default_source: bool,
}

/// Resolver settings after placeholder expansion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverSettings {
    pub maven_location: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load project from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read project file: {:?}", path.as_ref()))?;

        Self::from_str(&content)
    }

    /// Parse project from string
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse project file")
    }

    /// Validate the project
    pub fn validate(&self) -> Result<()> {
        if self.bundle.symbolic_name.trim().is_empty() {
            anyhow::bail!("Bundle symbolic name cannot be empty");
        }

        if self.bundle.version.trim().is_empty() {
            anyhow::bail!("Bundle version cannot be empty");
        }

        if self.bundle.target_directory.trim().is_empty() {
            anyhow::bail!("Target directory cannot be empty");
        }

        if self.repository.local.trim().is_empty() {
            anyhow::bail!("Local repository location cannot be empty");
        }

        if let Some(level) = &self.bundle.log_level {
            level
                .parse::<LogLevel>()
                .with_context(|| format!("Invalid log level in [bundle]: {level}"))?;
        }

        if let GeneratorConfig::External(external) = &self.generator
            && external.program.trim().is_empty()
        {
            anyhow::bail!("External generator program cannot be empty");
        }

        for (index, dep) in self.dependencies.iter().enumerate() {
            for (field, value) in [
                ("group", &dep.group),
                ("artifact", &dep.artifact),
                ("version", &dep.version),
                ("type", &dep.kind),
            ] {
                if value.trim().is_empty() {
                    anyhow::bail!("Dependency #{} has an empty {}", index + 1, field);
                }
            }
        }

        Ok(())
    }

    /// Expand placeholders and build the [`BuildRequest`]
    ///
    /// Relative locations are anchored to `base_dir`, the directory holding
    /// the project file.
    pub fn resolve(&self, base_dir: &Path, overrides: &Overrides) -> Result<ResolvedProject> {
        self.validate()?;

        let mut properties = Properties::from_system().with_base_dir(base_dir);
        properties.extend(self.properties.clone());
        self.resolve_with(properties, base_dir, overrides)
    }

    pub(crate) fn resolve_with(
        &self,
        properties: Properties,
        base_dir: &Path,
        overrides: &Overrides,
    ) -> Result<ResolvedProject> {
        let expand = |value: &str| {
            properties
                .resolve(value)
                .with_context(|| format!("Failed to expand '{value}'"))
        };
        let locate = |value: &str| {
            resolve_location(value, &properties, base_dir)
                .with_context(|| format!("Failed to resolve location '{value}'"))
        };

        // Command-line paths are relative to the working directory
        let target = match &overrides.target_dir {
            Some(dir) => std::path::absolute(dir)?,
            None => locate(&self.bundle.target_directory)?,
        };
        let default_source = overrides.source_dir.is_none();
        let source = match &overrides.source_dir {
            Some(dir) => std::path::absolute(dir)?,
            None => base_dir.join(DEFAULT_SOURCE_DIR),
        };

        let mut builder = BuildRequest::builder(
            expand(&self.bundle.symbolic_name)?,
            expand(&self.bundle.version)?,
        )
        .source_directory(source)
        .target_directory(target)
        .extensions_to_unarchive(&self.bundle.extensions_to_unarchive)
        .update_dependency_versions(self.bundle.update_dependency_versions);

        let file_name = overrides
            .file_name
            .clone()
            .or_else(|| self.bundle.target_file_name.clone());
        if let Some(name) = file_name {
            builder = builder.target_file_name(expand(&name)?);
        }
        let request = builder.build()?;

        let dependencies = self
            .dependencies
            .iter()
            .map(|dep| {
                Ok(Dependency {
                    group: expand(&dep.group)?,
                    artifact: expand(&dep.artifact)?,
                    version: expand(&dep.version)?,
                    kind: expand(&dep.kind)?.trim_start_matches('.').to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let generator = match &self.generator {
            GeneratorConfig::External(external) => {
                let mut external = external.clone();
                external.program = expand(&external.program)?;
                external.args = external
                    .args
                    .iter()
                    .map(|arg| expand(arg.as_str()))
                    .collect::<Result<_>>()?;
                GeneratorConfig::External(external)
            }
            other => other.clone(),
        };

        let resolver = if self.resolver.enabled && !overrides.offline {
            Some(ResolverSettings {
                maven_location: self
                    .resolver
                    .maven_location
                    .as_deref()
                    .map(locate)
                    .transpose()?,
            })
        } else {
            None
        };

        let log_level = match (overrides.log_level, &self.bundle.log_level) {
            (Some(level), _) => level,
            (None, Some(level)) => level.parse()?,
            (None, None) => LogLevel::default(),
        };

        Ok(ResolvedProject {
            request,
            generator,
            dependencies,
            repository: locate(&self.repository.local)?,
            resolver,
            log_level,
            walk_order: self.bundle.walk_order,
            default_source,
        })
    }
}

/// Locate the project file and the directory it lives in
pub fn project_location(project: Option<PathBuf>) -> Result<(PathBuf, PathBuf)> {
    let path = project.unwrap_or_else(|| PathBuf::from(PROJECT_FILE));
    let path = if path.is_dir() {
        path.join(PROJECT_FILE)
    } else {
        path
    };
    let path = std::path::absolute(&path)
        .with_context(|| format!("Failed to resolve project path: {}", path.display()))?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((path, base_dir))
}

/// Check command implementation
pub fn check(project: Option<PathBuf>) -> Result<()> {
    let (path, base_dir) = project_location(project)?;

    println!("Checking project: {}", path.display());

    let config = ProjectConfig::from_file(&path)?;
    let resolved = config.resolve(&base_dir, &Overrides::default())?;
    let request = &resolved.request;

    println!(
        "✓ Bundle: {} v{}",
        request.symbolic_name(),
        request.version()
    );
    println!("✓ Artifact: {}", request.artifact_path().display());
    println!("✓ Dependencies: {}", resolved.dependencies.len());
    let extensions: Vec<&str> = request
        .extensions_to_unarchive()
        .iter()
        .map(String::as_str)
        .collect();
    println!("✓ Unarchive: {}", extensions.join(", "));
    let generator = match &resolved.generator {
        GeneratorConfig::Embedded => "embedded".to_string(),
        GeneratorConfig::External(external) => format!("external ({})", external.program),
    };
    println!("✓ Generator: {generator}");
    println!("\nProject is valid!");

    Ok(())
}
