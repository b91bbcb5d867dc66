//! Dependency resolution through an installed Maven
//!
//! Resolution populates the local repository and delivers archives marked
//! for extraction straight into the source directory. Each Maven run is
//! awaited and a non-zero exit fails the build.

use crate::config::Dependency;
use anyhow::{Context, Result};
use fatbundle_core::BuildRequest;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variables consulted for the Maven installation, in order
pub const MAVEN_HOME_VARIABLES: [&str; 4] = ["M2_HOME", "MAVEN_HOME", "M3_HOME", "MVN_HOME"];

/// Fetches dependencies before the pipeline runs
pub trait DependencyResolver {
    fn resolve(&self, dependencies: &[Dependency], request: &BuildRequest) -> Result<()>;
}

/// Resolver invoking the `mvn` executable
#[derive(Debug, Clone)]
pub struct MavenResolver {
    executable: PathBuf,
}

impl MavenResolver {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Find Maven from the environment, then `maven_location`, then `PATH`
    pub fn locate(maven_location: Option<&Path>) -> Self {
        Self::locate_with(|name| std::env::var(name).ok(), maven_location)
    }

    pub(crate) fn locate_with<F>(env: F, maven_location: Option<&Path>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = MAVEN_HOME_VARIABLES
            .iter()
            .filter_map(|name| env(name))
            .find(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| maven_location.map(Path::to_path_buf));

        let executable = match home {
            Some(home) => home.join("bin").join(mvn_binary()),
            None => PathBuf::from(mvn_binary()),
        };
        tracing::debug!("Using Maven at {}", executable.display());
        Self { executable }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn base_command(&self, request: &BuildRequest) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("--batch-mode");
        if request.update_dependency_versions() {
            cmd.arg("-U");
        }
        cmd
    }

    /// `dependency:get` for one dependency
    pub fn get_command(&self, dep: &Dependency, request: &BuildRequest) -> Command {
        let mut cmd = self.base_command(request);
        cmd.arg("dependency:get")
            .arg(format!("-Dartifact={}", dep.coordinates()));
        cmd
    }

    /// `dependency:copy` of one dependency into the source directory
    pub fn copy_command(&self, dep: &Dependency, request: &BuildRequest) -> Command {
        let mut cmd = self.base_command(request);
        cmd.arg("dependency:copy")
            .arg(format!("-Dartifact={}", dep.coordinates()))
            .arg(format!(
                "-DoutputDirectory={}",
                request.source_directory().display()
            ))
            .arg("-Dmdep.overWrite=true");
        cmd
    }

    fn run(&self, mut cmd: Command, what: &str) -> Result<()> {
        tracing::debug!("Running {:?}", cmd);
        let status = cmd
            .status()
            .with_context(|| format!("Failed to execute {}", self.executable.display()))?;
        if !status.success() {
            anyhow::bail!("Maven {} failed with exit code: {:?}", what, status.code());
        }
        Ok(())
    }
}

impl DependencyResolver for MavenResolver {
    fn resolve(&self, dependencies: &[Dependency], request: &BuildRequest) -> Result<()> {
        tracing::info!("Resolving {} dependencies with Maven", dependencies.len());

        for dep in dependencies {
            self.run(
                self.get_command(dep, request),
                &format!("dependency:get of {}", dep.coordinates()),
            )?;
            if request.is_unarchive_type(&dep.kind) {
                self.run(
                    self.copy_command(dep, request),
                    &format!("dependency:copy of {}", dep.coordinates()),
                )?;
            }
        }
        Ok(())
    }
}

fn mvn_binary() -> &'static str {
    if cfg!(windows) { "mvn.cmd" } else { "mvn" }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use std::collections::HashMap;

    fn dep(kind: &str) -> Dependency {
        Dependency {
            group: "org.example".to_string(),
            artifact: "dist".to_string(),
            version: "2.0".to_string(),
            kind: kind.to_string(),
        }
    }

    fn request(update: bool) -> BuildRequest {
        BuildRequest::builder("com.example.fat", "1.0.0")
            .source_directory("/work/src")
            .target_directory("/work/target")
            .extensions_to_unarchive(["zip"])
            .update_dependency_versions(update)
            .build()
            .unwrap()
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn MavenResolver___locate___prefers_m2_home() {
        let resolver = MavenResolver::locate_with(
            env(&[("MAVEN_HOME", "/opt/maven3"), ("M2_HOME", "/opt/m2")]),
            Some(Path::new("/configured")),
        );

        assert_eq!(
            resolver.executable(),
            Path::new("/opt/m2").join("bin").join(mvn_binary())
        );
    }

    #[test]
    fn MavenResolver___locate___falls_back_to_configured_location() {
        let resolver = MavenResolver::locate_with(env(&[]), Some(Path::new("/configured")));

        assert_eq!(
            resolver.executable(),
            Path::new("/configured").join("bin").join(mvn_binary())
        );
    }

    #[test]
    fn MavenResolver___locate___uses_path_lookup_last() {
        let resolver = MavenResolver::locate_with(env(&[("MVN_HOME", "  ")]), None);

        assert_eq!(resolver.executable(), Path::new(mvn_binary()));
    }

    #[test]
    fn MavenResolver___get_command___forces_updates_when_requested() {
        let resolver = MavenResolver::new("mvn");

        let with_update = args(&resolver.get_command(&dep("jar"), &request(true)));
        let without = args(&resolver.get_command(&dep("jar"), &request(false)));

        assert_eq!(
            with_update,
            vec![
                "--batch-mode",
                "-U",
                "dependency:get",
                "-Dartifact=org.example:dist:2.0:jar"
            ]
        );
        assert!(!without.contains(&"-U".to_string()));
    }

    #[test]
    fn MavenResolver___copy_command___targets_source_directory() {
        let resolver = MavenResolver::new("mvn");

        let args = args(&resolver.copy_command(&dep("zip"), &request(false)));

        assert!(args.contains(&"dependency:copy".to_string()));
        assert!(args.contains(&"-DoutputDirectory=/work/src".to_string()));
        assert!(args.contains(&"-Dmdep.overWrite=true".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn MavenResolver___resolve___non_zero_exit___fails() {
        let resolver = MavenResolver::new("false");

        let result = resolver.resolve(&[dep("jar")], &request(false));

        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn MavenResolver___resolve___no_dependencies___runs_nothing() {
        let resolver = MavenResolver::new("/nonexistent/mvn");

        assert!(resolver.resolve(&[], &request(false)).is_ok());
    }
}
