//! Error taxonomy for the action.
//!
//! Every failure a component can raise maps to one variant of [`ActionError`].
//! Best-effort operations (tag fetch, worktree cleanup, gist update) still
//! return these errors; their callers log and discard them.

use std::path::PathBuf;

pub type Result<T, E = ActionError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// Mutually exclusive inputs were set together.
    #[error("{0}")]
    ConflictingModes(String),

    /// An input path does not exist.
    #[error("path {} not found: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A ref failed validation before reaching git.
    #[error("invalid ref {ref_name:?}: {reason}")]
    InvalidRef { ref_name: String, reason: String },

    #[error(
        "no release tags found in repository. Use 'scan: head' to scan the current checkout, \
         or create a semver tag (e.g., v1.0.0)"
    )]
    NoTags,

    /// A git invocation exited unsuccessfully.
    #[error("git {command} failed: {reason}")]
    Git { command: String, reason: String },

    /// The scanner did not leave an output artifact behind.
    #[error("scanner failed: {0}")]
    ScanFailed(String),

    #[error("failed to parse scanner output {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("path traversal detected: {} is outside workspace {}", path.display(), workspace.display())]
    PathTraversal { path: PathBuf, workspace: PathBuf },

    /// Non-2xx answer from the gist API.
    #[error("gist API returned {status}: {body}")]
    GistApi { status: u16, body: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Fail-build policy triggered.
    #[error("vulnerabilities found at or above {cutoff} severity")]
    ThresholdExceeded { cutoff: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_modes_message_is_verbatim() {
        let err = ActionError::ConflictingModes(
            "only one of image, path, or sbom can be specified".into(),
        );
        assert_eq!(
            err.to_string(),
            "only one of image, path, or sbom can be specified"
        );
    }

    #[test]
    fn gist_error_embeds_status_and_body() {
        let err = ActionError::GistApi {
            status: 401,
            body: "Bad credentials".into(),
        };
        assert_eq!(err.to_string(), "gist API returned 401: Bad credentials");
    }

    #[test]
    fn not_found_mentions_path() {
        let err = ActionError::NotFound {
            path: PathBuf::from("/nonexistent/path"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/path"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn no_tags_suggests_head_mode() {
        assert!(ActionError::NoTags.to_string().contains("scan: head"));
    }
}
