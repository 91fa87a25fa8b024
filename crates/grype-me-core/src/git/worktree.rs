use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};

use super::Git;
use super::refname::validate_ref_name;
use crate::error::Result;

/// A detached worktree checked out into a private temporary directory.
///
/// The caller's checkout is never touched. [`Worktree::cleanup`] deregisters
/// the worktree and deletes the directory; if the value is dropped without
/// an explicit cleanup, the same steps run with failures logged.
#[derive(Debug)]
pub struct Worktree {
    git: Git,
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Worktree {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort removal. Safe to call more than once.
    ///
    /// Directory removal is attempted even when `git worktree remove` fails.
    /// The first failure is returned so the caller can log it.
    pub fn cleanup(&mut self) -> Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };

        info!("Cleaning up temporary worktree at {}", self.path.display());

        let path = self.path.to_string_lossy().into_owned();
        let deregister = self
            .git
            .output(&["worktree", "remove", "--force", &path])
            .map(|_| ());

        // `git worktree remove` usually deletes the directory already.
        let remove_dir = if dir.path().exists() {
            dir.close()
        } else {
            Ok(())
        };

        match (deregister, remove_dir) {
            (Err(git_err), Err(io_err)) => {
                warn!("git worktree remove failed: {git_err}");
                Err(io_err.into())
            }
            (Err(git_err), Ok(())) => Err(git_err),
            (Ok(()), Err(io_err)) => Err(io_err.into()),
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}

impl Drop for Worktree {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!("failed to clean up worktree {}: {e}", self.path.display());
        }
    }
}

impl Git {
    /// Check `ref_name` out into a fresh detached worktree.
    pub fn checkout_worktree(&self, ref_name: &str) -> Result<Worktree> {
        validate_ref_name(ref_name)?;

        let dir = tempfile::Builder::new().prefix("grype-scan-").tempdir()?;
        let path = dir.path().to_path_buf();
        let path_str = path.to_string_lossy().into_owned();

        info!(
            "Creating temporary worktree at {} for ref {ref_name}",
            path.display()
        );

        // On failure `dir` drops here and takes the directory with it.
        self.run_inherited(&["worktree", "add", "--detach", &path_str, ref_name])?;

        Ok(Worktree {
            git: self.clone(),
            path,
            dir: Some(dir),
        })
    }
}
