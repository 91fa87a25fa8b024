//! Latest-release discovery.
//!
//! Tags are ordered by git's version sort (`--sort=-v:refname`), so the
//! first stable entry is the newest release. Pre-releases are skipped unless
//! nothing else exists.

use tracing::{info, warn};

use super::Git;
use crate::error::{ActionError, Result};

/// Whether `tag` looks like a pre-release, e.g. `v1.0.0-alpha` or `1.2.3-rc.1`.
///
/// Only tags whose part before the first `-` is made of digits and dots
/// count. `release-1.0` is not a pre-release because `release` is not a
/// version number.
pub fn is_pre_release(tag: &str) -> bool {
    let normalized = tag
        .strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag);

    let Some((version, suffix)) = normalized.split_once('-') else {
        return false;
    };

    !version.is_empty()
        && !suffix.is_empty()
        && version.chars().all(|c| c == '.' || c.is_ascii_digit())
}

/// Pick the release tag from a list already sorted newest first.
pub fn select_release_tag(tags: &[String]) -> Result<String> {
    let Some(highest) = tags.first() else {
        return Err(ActionError::NoTags);
    };

    if let Some(stable) = tags.iter().find(|t| !is_pre_release(t)) {
        return Ok(stable.clone());
    }

    warn!("All tags appear to be pre-release. Using: {highest}");
    Ok(highest.clone())
}

impl Git {
    /// `git fetch --tags --force`. Callers downgrade failure to a warning.
    pub fn fetch_tags(&self) -> Result<()> {
        self.run_inherited(&["fetch", "--tags", "--force"])
    }

    /// All tags, highest version first.
    pub fn list_tags_by_version(&self) -> Result<Vec<String>> {
        let output = self.output(&["tag", "--sort=-v:refname"])?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Resolve the newest stable release tag, fetching tags first.
    pub fn latest_release_tag(&self) -> Result<String> {
        info!("Fetching tags...");
        if let Err(e) = self.fetch_tags() {
            warn!("Could not fetch tags: {e}");
        }

        let tags = self.list_tags_by_version()?;
        select_release_tag(&tags)
    }
}
