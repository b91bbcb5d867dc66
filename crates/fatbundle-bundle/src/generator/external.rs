use super::{GenerateJob, Generator, merged_properties};
use crate::manifest::headers;
use crate::{BundleError, BundleResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const DESCRIPTOR_TOKEN: &str = "{descriptor}";
const SOURCE_TOKEN: &str = "{source}";
const OUTPUT_TOKEN: &str = "{output}";
const STDERR_LIMIT: usize = 4096;

/// Minimum time given to the stderr reader once the program has exited.
const STDERR_GRACE: Duration = Duration::from_millis(250);

fn default_output_version() -> String {
    "0.0.0".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

/// Settings for [`ExternalGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalConfig {
    /// Program to run, looked up on `PATH` when not a path.
    pub program: String,
    /// Arguments; `{descriptor}`, `{source}` and `{output}` are substituted.
    /// Without a `{descriptor}` token the descriptor path is appended.
    #[serde(default)]
    pub args: Vec<String>,
    /// Version part of the JAR name the program writes.
    #[serde(default = "default_output_version")]
    pub output_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ExternalConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output_version: default_output_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Runs an external program to produce the bundle.
///
/// The merged descriptor is written to `<output>/<symbolic-name>.bnd` and the
/// program runs with the output directory as its working directory. It must
/// leave `<symbolic-name>-<output_version>.jar` there.
#[derive(Debug, Clone)]
pub struct ExternalGenerator {
    config: ExternalConfig,
}

impl ExternalGenerator {
    #[must_use]
    pub fn new(config: ExternalConfig) -> Self {
        Self { config }
    }

    /// Arguments with tokens replaced.
    pub(crate) fn arguments(&self, descriptor: &Path, source: &Path, output: &Path) -> Vec<String> {
        let descriptor = descriptor.to_string_lossy();
        let source = source.to_string_lossy();
        let output = output.to_string_lossy();

        let mut args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|arg| {
                arg.replace(DESCRIPTOR_TOKEN, &descriptor)
                    .replace(SOURCE_TOKEN, &source)
                    .replace(OUTPUT_TOKEN, &output)
            })
            .collect();
        if !self.config.args.iter().any(|arg| arg.contains(DESCRIPTOR_TOKEN)) {
            args.push(descriptor.into_owned());
        }
        args
    }

    fn failure(&self, code: Option<i32>, stderr: String) -> BundleError {
        BundleError::GeneratorFailed {
            program: self.config.program.clone(),
            code,
            stderr,
        }
    }
}

impl Generator for ExternalGenerator {
    fn name(&self) -> &str {
        "external"
    }

    fn generate(&self, job: &GenerateJob<'_>) -> BundleResult<PathBuf> {
        let mut props = merged_properties(job)?;
        let base_dir = job.descriptor.parent().unwrap_or(job.source_dir);
        props.absolutize_classpath(base_dir)?;

        let symbolic_name = props
            .get(headers::BUNDLE_SYMBOLIC_NAME)
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .unwrap_or_else(|| job.request.symbolic_name().to_string());

        fs::create_dir_all(job.output_dir)?;
        let descriptor = job.output_dir.join(format!("{symbolic_name}.bnd"));
        fs::write(&descriptor, props.render())?;

        let args = self.arguments(&descriptor, job.source_dir, job.output_dir);
        tracing::info!("Running {} {}", self.config.program, args.join(" "));

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .current_dir(job.output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failure(None, format!("failed to start: {e}")))?;

        // A helper the program leaves running can keep the pipe open, so the
        // reader reports through a channel and is never joined.
        let (stderr_tx, stderr_rx) = mpsc::channel();
        if let Some(mut pipe) = child.stderr.take() {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                let _ = stderr_tx.send(buf);
            });
        }

        let started = Instant::now();
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BundleError::GeneratorTimedOut {
                    program: self.config.program.clone(),
                    timeout_secs: self.config.timeout_secs,
                });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        };

        let budget = timeout.saturating_sub(started.elapsed()).max(STDERR_GRACE);
        let mut stderr = match stderr_rx.recv_timeout(budget) {
            Ok(text) => text,
            Err(_) => {
                tracing::debug!(
                    "{} left its stderr open after exiting; output not collected",
                    self.config.program
                );
                String::new()
            }
        };
        truncate_at_boundary(&mut stderr, STDERR_LIMIT);

        if !status.success() {
            return Err(self.failure(status.code(), stderr));
        }
        if !stderr.is_empty() {
            tracing::debug!("{} stderr: {}", self.config.program, stderr.trim_end());
        }

        let output = job.output_dir.join(format!(
            "{symbolic_name}-{}.jar",
            self.config.output_version
        ));
        if !output.is_file() {
            return Err(BundleError::GeneratorOutputMissing(output));
        }
        Ok(output)
    }
}

fn truncate_at_boundary(text: &mut String, limit: usize) {
    if text.len() <= limit {
        return;
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

/// Extension trait to add `wait_timeout` to `Child`.
trait ChildExt {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>>;
}

impl ChildExt for Child {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
        let start = Instant::now();
        let poll_interval = Duration::from_millis(50);

        loop {
            match self.try_wait()? {
                Some(status) => return Ok(Some(status)),
                None => {
                    if start.elapsed() >= timeout {
                        return Ok(None);
                    }
                    thread::sleep(poll_interval);
                }
            }
        }
    }
}
