use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use crate::config::ScanConfig;
use crate::error::{ActionError, Result};
use crate::target::ScanTarget;

pub const DEFAULT_SCANNER: &str = "grype";

/// Handle to the external scanner executable.
#[derive(Debug, Clone)]
pub struct Scanner {
    program: PathBuf,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(DEFAULT_SCANNER)
    }
}

impl Scanner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Uses `config.scanner`, falling back to `grype` on PATH.
    pub fn from_config(config: &ScanConfig) -> Self {
        if config.scanner.as_os_str().is_empty() {
            Self::default()
        } else {
            Self::new(&config.scanner)
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `<target> -o json --file <output> [--only-fixed]`
    pub fn build_args(target: &ScanTarget, output: &Path, only_fixed: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            target.to_arg().into(),
            "-o".into(),
            "json".into(),
            "--file".into(),
            output.as_os_str().to_owned(),
        ];

        if only_fixed {
            args.push("--only-fixed".into());
        }

        args
    }

    /// Refresh the vulnerability database (`db update`).
    pub fn update_db(&self) -> Result<()> {
        info!("Updating vulnerability database...");

        let status = Command::new(&self.program)
            .args(["db", "update"])
            .stdin(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if !status.success() {
            return Err(ActionError::ScanFailed(format!(
                "database update failed: {status}"
            )));
        }

        info!("Database update complete");
        Ok(())
    }

    /// Run a scan writing JSON to `output`.
    ///
    /// Success means `output` exists afterwards. The scanner exits non-zero
    /// when it finds vulnerabilities, so the exit status alone decides
    /// nothing.
    pub fn run(&self, config: &ScanConfig, target: &ScanTarget, output: &Path) -> Result<()> {
        info!("Running scan...");

        let status = Command::new(&self.program)
            .args(Self::build_args(target, output, config.only_fixed))
            .stdin(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if !output.exists() {
            return Err(ActionError::ScanFailed(format!(
                "{} exited with {status} and wrote no report to {}",
                self.program.display(),
                output.display()
            )));
        }

        if status.success() {
            info!("Scan completed");
        } else {
            info!("Scan completed (vulnerabilities found)");
        }
        Ok(())
    }

    fn spawn_error(&self, e: std::io::Error) -> ActionError {
        ActionError::ScanFailed(format!(
            "could not start {}: {e}",
            self.program.display()
        ))
    }
}
