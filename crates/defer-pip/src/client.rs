//! pip-backed [`PackageManager`] implementation.
//!
//! The dry-run path wraps
//! `pip install --quiet --dry-run --no-deps --report <tmp> -r <file>`
//! and parses the JSON report; the install path runs
//! `pip install --quiet -r <file>`. Requirement files are forwarded
//! verbatim, so the full requirement-specifier syntax (version
//! constraints, markers, URL and VCS references, hashes) is available.

use std::path::Path;
use std::process::{Command, Output};

use defer_core::{InstallError, InstallReport, PackageManager};

use crate::config::PipConfig;
use crate::report::parse_report;

/// Invokes pip as a subprocess.
pub struct PipManager {
    config: PipConfig,
}

impl PipManager {
    /// A manager using the default `pip` invocation.
    pub fn new() -> Self {
        Self::with_config(PipConfig::default())
    }

    pub fn with_config(config: PipConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipConfig {
        &self.config
    }

    fn install_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg("install");
        cmd.args(&self.config.extra_args);
        cmd
    }

    fn run(&self, cmd: &mut Command) -> Result<Output, InstallError> {
        let output = cmd.output().map_err(|source| InstallError::Spawn {
            program: self.config.program.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(InstallError::Failed {
                program: self.config.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(output)
    }
}

impl Default for PipManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager for PipManager {
    fn dry_run(&self, requirements: &Path) -> Result<InstallReport, InstallError> {
        let report_file = tempfile::Builder::new()
            .prefix("pip-report-")
            .suffix(".json")
            .tempfile()
            .map_err(|source| InstallError::ReportFile { source })?;

        let mut cmd = self.install_command();
        cmd.args(["--dry-run", "--no-deps", "--report"])
            .arg(report_file.path())
            .arg("-r")
            .arg(requirements);
        tracing::debug!(requirements = %requirements.display(), "querying pending installs");
        self.run(&mut cmd)?;

        let content =
            std::fs::read_to_string(report_file.path()).map_err(|source| InstallError::ReportFile {
                source,
            })?;
        parse_report(&content).map_err(|err| InstallError::Report {
            path: report_file.path().to_path_buf(),
            message: err.to_string(),
        })
    }

    fn install(&self, requirements: &Path) -> Result<(), InstallError> {
        let mut cmd = self.install_command();
        cmd.arg("-r").arg(requirements);
        tracing::debug!(requirements = %requirements.display(), "installing requirements");
        self.run(&mut cmd)?;
        Ok(())
    }
}
