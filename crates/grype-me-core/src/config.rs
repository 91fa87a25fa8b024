//! Run configuration.
//!
//! [`ScanConfig`] is built once by the binary and passed by reference through
//! the pipeline. The core never reads the process environment; CI-provided
//! locations arrive through [`CiEnvironment`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ActionError;

/// Repository scan mode used when `scan` is left blank.
pub const DEFAULT_SCAN: &str = "latest_release";

/// Container mount point of the workspace in Docker-based actions.
pub const CONTAINER_WORKSPACE: &str = "/github/workspace";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub const DEFAULT_VARIABLE_PREFIX: &str = "GRYPE_";

/// All inputs of a single action run.
///
/// Blank strings are treated as unset by the target resolver, matching how
/// the Actions runner passes omitted inputs.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// `latest_release`, `head`, or an explicit tag/branch.
    pub scan: String,
    pub image: String,
    pub path: String,
    pub sbom: String,

    pub fail_build: bool,
    pub severity_cutoff: SeverityCutoff,
    pub output_file: String,
    pub only_fixed: bool,
    pub db_update: bool,
    pub debug: bool,
    /// Free text copied verbatim into the Markdown report.
    pub description: String,

    pub gist: GistSettings,
    pub variable_prefix: String,

    /// Scanner executable, `grype` unless overridden.
    pub scanner: PathBuf,
}

#[derive(Clone, Default)]
pub struct GistSettings {
    pub token: String,
    pub id: String,
    /// Base filename; derived from the scan mode when empty.
    pub filename: String,
}

// Keeps the token out of debug logs.
impl fmt::Debug for GistSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { "***" };
        f.debug_struct("GistSettings")
            .field("token", &token)
            .field("id", &self.id)
            .field("filename", &self.filename)
            .finish()
    }
}

impl GistSettings {
    /// Gist updates run only with both credentials present.
    pub fn is_enabled(&self) -> bool {
        !self.token.trim().is_empty() && !self.id.trim().is_empty()
    }
}

/// Locations handed to the action by the CI runner.
#[derive(Debug, Clone, Default)]
pub struct CiEnvironment {
    /// `GITHUB_OUTPUT`
    pub output_file: Option<PathBuf>,
    /// `GITHUB_ENV`
    pub env_file: Option<PathBuf>,
    /// `GITHUB_WORKSPACE`
    pub workspace: Option<PathBuf>,
    /// Overrides [`CONTAINER_WORKSPACE`]; tests point this at a temp dir.
    pub container_workspace: Option<PathBuf>,
    /// `GITHUB_API_URL`
    pub api_url: Option<String>,
}

impl CiEnvironment {
    pub fn container_workspace(&self) -> PathBuf {
        self.container_workspace
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONTAINER_WORKSPACE))
    }

    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }
}

/// Minimum severity that makes `fail-build` abort the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeverityCutoff {
    Critical,
    High,
    #[default]
    Medium,
    Low,
    Negligible,
}

impl SeverityCutoff {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Negligible => "negligible",
        }
    }
}

impl fmt::Display for SeverityCutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityCutoff {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "" | "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "negligible" => Ok(Self::Negligible),
            other => Err(ActionError::InvalidConfig(format!(
                "severity-cutoff must be one of critical, high, medium, low, negligible (got {other:?})"
            ))),
        }
    }
}

/// What was scanned, as shown in badges, gist filenames and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Image,
    Path,
    Sbom,
    Release,
    Head,
    Ref,
}

impl ScanMode {
    pub fn from_config(config: &ScanConfig) -> Self {
        if !config.image.trim().is_empty() {
            return Self::Image;
        }
        if !config.path.trim().is_empty() {
            return Self::Path;
        }
        if !config.sbom.trim().is_empty() {
            return Self::Sbom;
        }

        let scan = config.scan.trim();
        if scan.is_empty() || scan.eq_ignore_ascii_case(DEFAULT_SCAN) {
            Self::Release
        } else if scan.eq_ignore_ascii_case("head") {
            Self::Head
        } else {
            Self::Ref
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Path => "path",
            Self::Sbom => "sbom",
            Self::Release => "release",
            Self::Head => "head",
            Self::Ref => "ref",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScanConfig {
        ScanConfig::default()
    }

    #[test]
    fn scan_mode_follows_artifact_inputs_first() {
        let mut c = config();
        c.image = "alpine:latest".into();
        assert_eq!(ScanMode::from_config(&c), ScanMode::Image);

        let mut c = config();
        c.path = "./src".into();
        assert_eq!(ScanMode::from_config(&c), ScanMode::Path);

        let mut c = config();
        c.sbom = "sbom.json".into();
        assert_eq!(ScanMode::from_config(&c), ScanMode::Sbom);
    }

    #[test]
    fn scan_mode_for_repository_inputs() {
        let mut c = config();
        assert_eq!(ScanMode::from_config(&c), ScanMode::Release);

        c.scan = "latest_release".into();
        assert_eq!(ScanMode::from_config(&c), ScanMode::Release);

        c.scan = "HEAD".into();
        assert_eq!(ScanMode::from_config(&c), ScanMode::Head);

        c.scan = "v1.2.3".into();
        assert_eq!(ScanMode::from_config(&c), ScanMode::Ref);
        assert_eq!(ScanMode::Ref.to_string(), "ref");
    }

    #[test]
    fn severity_cutoff_parses_case_insensitively() {
        assert_eq!(
            "CRITICAL".parse::<SeverityCutoff>().unwrap(),
            SeverityCutoff::Critical
        );
        assert_eq!(
            " negligible ".parse::<SeverityCutoff>().unwrap(),
            SeverityCutoff::Negligible
        );
        assert_eq!(
            "".parse::<SeverityCutoff>().unwrap(),
            SeverityCutoff::Medium
        );
    }

    #[test]
    fn severity_cutoff_rejects_unknown_values() {
        let err = "severe".parse::<SeverityCutoff>().unwrap_err();
        assert!(matches!(err, ActionError::InvalidConfig(_)));
        assert!(err.to_string().contains("severe"));
    }

    #[test]
    fn gist_requires_token_and_id() {
        let mut gist = GistSettings::default();
        assert!(!gist.is_enabled());
        gist.token = "t".into();
        assert!(!gist.is_enabled());
        gist.id = "abc".into();
        assert!(gist.is_enabled());
    }

    #[test]
    fn debug_output_hides_gist_token() {
        let gist = GistSettings {
            token: "ghp_secret".into(),
            id: "abc".into(),
            filename: String::new(),
        };
        let rendered = format!("{gist:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("abc"));
    }

    #[test]
    fn ci_environment_defaults() {
        let env = CiEnvironment::default();
        assert_eq!(env.container_workspace(), PathBuf::from("/github/workspace"));
        assert_eq!(env.api_url(), "https://api.github.com");

        let env = CiEnvironment {
            api_url: Some("https://ghe.example.com/api/v3".into()),
            ..Default::default()
        };
        assert_eq!(env.api_url(), "https://ghe.example.com/api/v3");
    }
}
