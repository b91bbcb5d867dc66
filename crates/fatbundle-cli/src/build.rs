//! Build command implementation

use crate::config::{Overrides, ProjectConfig, ResolvedProject, project_location};
use crate::repository::LocalRepository;
use crate::resolver::{DependencyResolver, MavenResolver};
use anyhow::{Context, Result};
use fatbundle::{BuildReport, LogLevel, Pipeline};
use fatbundle_logging::ReloadHandle;
use std::fs;
use std::path::{Path, PathBuf};

/// Options of `fatbundle build`
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    pub project: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub target_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    pub offline: bool,
    pub keep_source: bool,
    pub json: bool,
    pub log_level: Option<LogLevel>,
}

/// Run the build command
pub fn run(args: BuildArgs) -> Result<()> {
    let (path, base_dir) = project_location(args.project.clone())?;
    let config = ProjectConfig::from_file(&path)?;
    let overrides = Overrides {
        source_dir: args.source_dir.clone(),
        target_dir: args.target_dir.clone(),
        file_name: args.file_name.clone(),
        log_level: args.log_level,
        offline: args.offline,
    };
    let resolved = config.resolve(&base_dir, &overrides)?;

    match ReloadHandle::global().apply(resolved.log_level) {
        Ok(true) => tracing::debug!("Log level set to {}", resolved.log_level),
        Ok(false) => {}
        Err(err) => tracing::warn!("Could not change log level: {}", err),
    }
    tracing::info!(
        "Building {} v{} from {}",
        resolved.request.symbolic_name(),
        resolved.request.version(),
        path.display()
    );

    let resolver = resolved
        .resolver
        .as_ref()
        .map(|settings| MavenResolver::locate(settings.maven_location.as_deref()));
    let report = execute(
        &resolved,
        resolver.as_ref().map(|r| r as &dyn DependencyResolver),
        args.keep_source,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("✓ Bundle: {}", report.artifact.display());
        println!("✓ SHA-256: {}", report.sha256);
        println!(
            "✓ Archives extracted: {} (skipped: {})",
            report.unpack.extracted_count(),
            report.unpack.skipped_count()
        );
        println!(
            "✓ Files: {} ({} libraries, {} archives, {} other)",
            report.files.total(),
            report.files.library,
            report.files.to_unarchive,
            report.files.plain
        );
        println!("✓ Classpath entries: {}", report.classpath.len());
        println!("\nBuild successful!");
    }

    Ok(())
}

/// Prepare the source directory, fetch dependencies and run the pipeline
pub(crate) fn execute(
    resolved: &ResolvedProject,
    resolver: Option<&dyn DependencyResolver>,
    keep_source: bool,
) -> Result<BuildReport> {
    let request = &resolved.request;
    prepare_source_directory(request.source_directory(), resolved.default_source)?;

    match resolver {
        Some(resolver) => resolver.resolve(&resolved.dependencies, request)?,
        None => tracing::info!("Dependency resolution skipped"),
    }
    LocalRepository::new(&resolved.repository).copy_artifacts(&resolved.dependencies, request)?;

    let mut pipeline = Pipeline::new(request.clone())
        .with_generator(resolved.generator.build())
        .with_walk_order(resolved.walk_order)
        .keep_source_directory(keep_source);

    match pipeline.run() {
        Ok(report) => Ok(report),
        Err(err) => {
            let stage = pipeline
                .failed_stage()
                .map(|stage| stage.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            Err(anyhow::Error::new(err).context(format!(
                "Build failed during {stage}; source kept at {}",
                request.source_directory().display()
            )))
        }
    }
}

/// Create the source directory, clearing it first when the tool owns it
pub(crate) fn prepare_source_directory(path: &Path, owned: bool) -> Result<()> {
    if owned && path.exists() {
        tracing::debug!("Clearing source directory {}", path.display());
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to clear {}", path.display()))?;
    }
    fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))
}
