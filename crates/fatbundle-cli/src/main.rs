//! fatbundle CLI - OSGi fat bundle builder
//!
//! Commands:
//! - `fatbundle build` - Resolve dependencies and build the bundle
//! - `fatbundle check` - Validate a fatbundle.toml project file
//! - `fatbundle inspect` - Show the manifest and entries of a built bundle

use clap::{Parser, Subcommand};
use fatbundle_core::LogLevel;
use std::path::PathBuf;

mod build;
mod config;
mod inspect;
mod repository;
mod resolver;

#[derive(Parser)]
#[command(name = "fatbundle")]
#[command(author, version, about = "Build OSGi fat bundles from dependency archives", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the bundle described by a project file
    Build {
        /// Path to fatbundle.toml or its directory (default: ./fatbundle.toml)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Source directory to use instead of <project>/fatbundle_build
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Target directory override
        #[arg(long)]
        target_dir: Option<PathBuf>,

        /// Artifact file name override
        #[arg(long)]
        file_name: Option<String>,

        /// Skip Maven and use only the local repository
        #[arg(long)]
        offline: bool,

        /// Keep the source directory after a successful build
        #[arg(long)]
        keep_source: bool,

        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a fatbundle.toml project file
    Check {
        /// Path to fatbundle.toml or its directory (default: ./fatbundle.toml)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Show manifest headers, checksum and entries of a JAR
    Inspect {
        /// Path to the JAR
        jar: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let override_level = cli.log_level.or_else(fatbundle_logging::level_from_env);
    fatbundle_logging::init_logging(override_level.unwrap_or_default());

    match cli.command {
        Commands::Build {
            project,
            source_dir,
            target_dir,
            file_name,
            offline,
            keep_source,
            json,
        } => {
            build::run(build::BuildArgs {
                project,
                source_dir,
                target_dir,
                file_name,
                offline,
                keep_source,
                json,
                log_level: override_level,
            })?;
        }
        Commands::Check { project } => {
            config::check(project)?;
        }
        Commands::Inspect { jar, json } => {
            inspect::run(&jar, json)?;
        }
    }

    Ok(())
}
