//! Placement of the user-requested JSON copy inside the CI workspace.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::CiEnvironment;
use crate::error::{ActionError, Result};

/// Where a destination ended up and which workspace it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    pub path: PathBuf,
    /// `None` for absolute inputs and current-directory fallbacks; such
    /// paths are not confined.
    pub workspace: Option<PathBuf>,
}

/// Resolve `dest` against the container workspace, then `GITHUB_WORKSPACE`,
/// then the current directory.
pub fn resolve_destination_path(dest: &Path, env: &CiEnvironment) -> Result<ResolvedDestination> {
    if dest.is_absolute() {
        return Ok(ResolvedDestination {
            path: dest.to_path_buf(),
            workspace: None,
        });
    }

    let container = env.container_workspace();
    if container.exists() {
        return Ok(ResolvedDestination {
            path: container.join(dest),
            workspace: Some(container),
        });
    }

    if let Some(workspace) = &env.workspace {
        return Ok(ResolvedDestination {
            path: workspace.join(dest),
            workspace: Some(workspace.clone()),
        });
    }

    Ok(ResolvedDestination {
        path: std::env::current_dir()?.join(dest),
        workspace: None,
    })
}

/// Reject `dest` if, after lexical normalization, it leaves `workspace`.
///
/// Symlinks are not followed.
pub fn validate_within_workspace(dest: &Path, workspace: &Path) -> Result<()> {
    let dest_abs = normalize(&absolutize(dest)?);
    let workspace_abs = normalize(&absolutize(workspace)?);

    if dest_abs.strip_prefix(&workspace_abs).is_err() {
        return Err(ActionError::PathTraversal {
            path: dest.to_path_buf(),
            workspace: workspace.to_path_buf(),
        });
    }
    Ok(())
}

/// Copy the scanner output to `dest`, creating parent directories.
///
/// Returns the final absolute destination.
pub fn copy_output_file(src: &Path, dest: &Path, env: &CiEnvironment) -> Result<PathBuf> {
    let resolved = resolve_destination_path(dest, env)?;

    if let Some(workspace) = &resolved.workspace {
        validate_within_workspace(&resolved.path, workspace)?;
    }

    if let Some(parent) = resolved.path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = fs::read(src)?;
    fs::write(&resolved.path, data)?;

    debug!("copied {} to {}", src.display(), resolved.path.display());
    Ok(resolved.path)
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut out, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    out.pop();
                }
                other => out.push(other.as_os_str()),
            }
            out
        })
}
