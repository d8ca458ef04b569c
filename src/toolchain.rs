//! The external build/run toolchain.
//!
//! The toolchain is an opaque pair of subprocess invocations against a
//! materialized test directory: a build step, then a run step. Both block
//! until process exit with no timeout, so a hung toolchain stalls the whole
//! harness — a known limitation.

use std::{path::Path, process::Command};

use bon::Builder;
use color_eyre::{Result, eyre::Context};
use serde::Deserialize;

/// Build and run commands for generated code. Defaults to the `dotnet` CLI.
#[derive(Debug, Clone, Deserialize, Builder)]
#[serde(default)]
#[non_exhaustive]
pub struct Toolchain {
    /// The toolchain binary, resolved via `$PATH`.
    #[builder(into)]
    pub binary: String,

    /// Arguments for the build step.
    #[builder(into)]
    pub build_args: Vec<String>,

    /// Arguments for the run step. The default asks `dotnet` not to rebuild
    /// or restore, so the run reflects exactly what the build produced.
    #[builder(into)]
    pub run_args: Vec<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            binary: "dotnet".to_string(),
            build_args: vec!["build".to_string()],
            run_args: vec![
                "run".to_string(),
                "--no-build".to_string(),
                "--no-restore".to_string(),
            ],
        }
    }
}

/// The build step's captured output and exit status.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Whether the build exited successfully.
    pub success: bool,

    /// Combined stdout and stderr, for the build log.
    pub log: String,
}

impl Toolchain {
    /// Run the build step in `dir`, blocking until exit.
    #[tracing::instrument(skip(self), fields(binary = %self.binary))]
    pub fn build(&self, dir: &Path) -> Result<BuildOutput> {
        let output = Command::new(&self.binary)
            .args(&self.build_args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("run build command {:?} in {dir:?}", self.binary))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut log = stdout.into_owned();
        if !stderr.is_empty() {
            log.push_str("\n--- stderr ---\n");
            log.push_str(&stderr);
        }

        Ok(BuildOutput {
            success: output.status.success(),
            log,
        })
    }

    /// Run the run step in `dir`, blocking until exit, and return its stdout
    /// with a single trailing newline stripped.
    ///
    /// The exit code is not inspected: whatever the program printed is the
    /// test's observable output.
    #[tracing::instrument(skip(self), fields(binary = %self.binary))]
    pub fn run(&self, dir: &Path) -> Result<String> {
        let output = Command::new(&self.binary)
            .args(&self.run_args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("run command {:?} in {dir:?}", self.binary))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.strip_suffix('\n').unwrap_or(&stdout).to_string())
    }
}
