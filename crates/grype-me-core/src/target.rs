//! Scan target resolution.
//!
//! Turns the mutually exclusive `image` / `path` / `sbom` / `scan` inputs
//! into exactly one [`ScanTarget`]. Repository scans of a tag or branch also
//! yield the [`Worktree`] that holds the checkout; dropping it cleans up.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{DEFAULT_SCAN, ScanConfig};
use crate::error::{ActionError, Result};
use crate::git::Git;
use crate::git::worktree::Worktree;

/// What the scanner is pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    /// Container image reference, passed verbatim.
    Image(String),
    Directory(PathBuf),
    File(PathBuf),
    Sbom(PathBuf),
}

impl ScanTarget {
    /// The single positional argument the scanner expects.
    pub fn to_arg(&self) -> String {
        match self {
            Self::Image(image) => image.clone(),
            Self::Directory(dir) => format!("dir:{}", dir.display()),
            Self::File(file) => format!("file:{}", file.display()),
            Self::Sbom(sbom) => format!("sbom:{}", sbom.display()),
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_arg())
    }
}

/// Resolution result. `worktree` is set only for tag/branch scans.
#[derive(Debug)]
pub struct ResolvedTarget {
    pub target: ScanTarget,
    pub worktree: Option<Worktree>,
}

impl ResolvedTarget {
    fn plain(target: ScanTarget) -> Self {
        Self {
            target,
            worktree: None,
        }
    }
}

/// Resolve the scan target for `config`.
///
/// `git` is only used in repository mode. When running under CI
/// (`workspace` is set) the repository and workspace are registered as git
/// `safe.directory` entries first.
pub fn resolve(config: &ScanConfig, git: &Git, workspace: Option<&Path>) -> Result<ResolvedTarget> {
    validate_artifact_modes(config)?;

    if let Some(target) = artifact_target(config)? {
        return Ok(ResolvedTarget::plain(target));
    }

    let scan = match config.scan.trim() {
        "" => DEFAULT_SCAN,
        scan => scan,
    };

    resolve_repository(scan, git, workspace)
}

/// At most one artifact mode, and never together with `scan`.
pub fn validate_artifact_modes(config: &ScanConfig) -> Result<()> {
    let set = [&config.image, &config.path, &config.sbom]
        .iter()
        .filter(|v| !v.trim().is_empty())
        .count();

    if set > 1 {
        return Err(ActionError::ConflictingModes(
            "only one of image, path, or sbom can be specified".into(),
        ));
    }

    if set > 0 && !config.scan.trim().is_empty() {
        return Err(ActionError::ConflictingModes(
            "scan cannot be used together with image, path, or sbom".into(),
        ));
    }

    Ok(())
}

fn artifact_target(config: &ScanConfig) -> Result<Option<ScanTarget>> {
    if !config.image.trim().is_empty() {
        return Ok(Some(ScanTarget::Image(config.image.clone())));
    }

    let path = config.path.trim();
    if !path.is_empty() {
        return path_target(Path::new(path)).map(Some);
    }

    // SBOM paths are handed to the scanner without an existence check.
    let sbom = config.sbom.trim();
    if !sbom.is_empty() {
        return Ok(Some(ScanTarget::Sbom(PathBuf::from(sbom))));
    }

    Ok(None)
}

fn path_target(path: &Path) -> Result<ScanTarget> {
    let meta = std::fs::metadata(path).map_err(|source| ActionError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    if meta.is_dir() {
        Ok(ScanTarget::Directory(path.to_path_buf()))
    } else {
        Ok(ScanTarget::File(path.to_path_buf()))
    }
}

fn resolve_repository(scan: &str, git: &Git, workspace: Option<&Path>) -> Result<ResolvedTarget> {
    if let Some(workspace) = workspace {
        if let Err(e) = git.configure_safe_directory(workspace) {
            warn!("{e}");
        }
    }

    info!("Repository scan mode: {scan}");

    if scan.eq_ignore_ascii_case("head") {
        info!("Scanning current working directory (head mode)");
        return Ok(ResolvedTarget::plain(ScanTarget::Directory(PathBuf::from(
            ".",
        ))));
    }

    let ref_name = if scan.eq_ignore_ascii_case(DEFAULT_SCAN) {
        let tag = git.latest_release_tag()?;
        info!("Found latest release: {tag}");
        tag
    } else {
        info!("Checking out ref: {scan}");
        scan.to_string()
    };

    let worktree = git.checkout_worktree(&ref_name)?;

    Ok(ResolvedTarget {
        target: ScanTarget::Directory(worktree.path().to_path_buf()),
        worktree: Some(worktree),
    })
}
