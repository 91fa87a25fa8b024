//! Git plumbing for repository scans.
//!
//! All git access goes through [`Git`], which shells out to the `git` binary
//! inside a fixed repository directory. Every ref that reaches a command has
//! passed [`refname::validate_ref_name`] first.

pub mod refname;
pub mod release;
pub mod worktree;

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::{debug, warn};

use crate::error::{ActionError, Result};

#[derive(Debug, Clone)]
pub struct Git {
    repo: PathBuf,
}

impl Git {
    /// Operate on the repository containing `repo`.
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    /// Operate on the repository of the current working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.repo);
        cmd
    }

    /// Run git and capture its output. Non-zero exit is an error carrying stderr.
    pub(crate) fn output(&self, args: &[&str]) -> Result<Output> {
        debug!("git {}", args.join(" "));

        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| git_error(args, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(git_error(
                args,
                format!("{} ({})", stderr.trim(), output.status),
            ));
        }

        Ok(output)
    }

    /// Run git with stdout/stderr streamed to the job log.
    pub(crate) fn run_inherited(&self, args: &[&str]) -> Result<()> {
        debug!("git {}", args.join(" "));

        let status = self
            .command(args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| git_error(args, e.to_string()))?;

        if !status.success() {
            return Err(git_error(args, status.to_string()));
        }
        Ok(())
    }

    /// Mark the working directory (and the CI workspace, if different) as a
    /// git `safe.directory`.
    ///
    /// Needed inside containers where the checkout belongs to another user.
    /// Callers treat failure as a warning.
    pub fn configure_safe_directory(&self, workspace: &Path) -> Result<()> {
        let cwd = std::fs::canonicalize(&self.repo)?;
        let cwd_str = cwd.to_string_lossy().into_owned();

        self.output(&["config", "--global", "--add", "safe.directory", &cwd_str])?;

        if workspace != cwd.as_path() {
            let ws = workspace.to_string_lossy().into_owned();
            if let Err(e) = self.output(&["config", "--global", "--add", "safe.directory", &ws]) {
                warn!("could not add workspace to safe.directory: {e}");
            }
        }

        Ok(())
    }
}

fn git_error(args: &[&str], reason: String) -> ActionError {
    ActionError::Git {
        command: args.first().copied().unwrap_or_default().to_string(),
        reason,
    }
}
