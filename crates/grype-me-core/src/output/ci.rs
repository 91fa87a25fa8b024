//! GitHub Actions step outputs and exported environment variables.
//!
//! Both are plain `key=value` lines appended to files named by the runner.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::{CiEnvironment, DEFAULT_VARIABLE_PREFIX};
use crate::error::Result;
use crate::scanner::stats::VulnerabilityStats;

/// Values published after a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutputs {
    pub scanner_version: String,
    pub db_built: String,
    pub stats: VulnerabilityStats,
    /// Gist endpoint badge when available, otherwise the static badge.
    pub badge_url: String,
    pub json_output: Option<PathBuf>,
    pub report_url: Option<String>,
}

impl ScanOutputs {
    /// Step outputs in publication order.
    pub fn step_outputs(&self) -> Vec<(&'static str, String)> {
        let mut outputs = vec![
            ("grype-version", self.scanner_version.clone()),
            ("db-version", self.db_built.clone()),
            ("cve-count", self.stats.total.to_string()),
            ("critical", self.stats.critical.to_string()),
            ("high", self.stats.high.to_string()),
            ("medium", self.stats.medium.to_string()),
            ("low", self.stats.low.to_string()),
            ("badge-url", self.badge_url.clone()),
        ];

        if let Some(path) = &self.json_output {
            outputs.push(("json-output", path.display().to_string()));
        }
        if let Some(url) = self.report_url.as_ref().filter(|u| !u.is_empty()) {
            outputs.push(("report-url", url.clone()));
        }
        outputs
    }

    /// Environment variables, un-prefixed.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("VERSION", self.scanner_version.clone()),
            ("DB_VERSION", self.db_built.clone()),
            ("CVE_COUNT", self.stats.total.to_string()),
            ("CRITICAL", self.stats.critical.to_string()),
            ("HIGH", self.stats.high.to_string()),
            ("MEDIUM", self.stats.medium.to_string()),
            ("LOW", self.stats.low.to_string()),
            ("BADGE_URL", self.badge_url.clone()),
        ]
    }
}

/// Append step outputs to `GITHUB_OUTPUT`. Without it, warn and do nothing.
pub fn write_ci_outputs(env: &CiEnvironment, outputs: &ScanOutputs) -> Result<()> {
    let Some(path) = &env.output_file else {
        warn!("GITHUB_OUTPUT not set, skipping output generation");
        return Ok(());
    };

    let lines = outputs
        .step_outputs()
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"));
    append_lines(path, lines)
}

/// Append `<prefix><NAME>=value` lines to `GITHUB_ENV`. Silently skipped
/// when the runner did not provide one.
pub fn write_env_vars(env: &CiEnvironment, prefix: &str, outputs: &ScanOutputs) -> Result<()> {
    let Some(path) = &env.env_file else {
        return Ok(());
    };

    let prefix = if prefix.is_empty() {
        DEFAULT_VARIABLE_PREFIX
    } else {
        prefix
    };

    let lines = outputs
        .env_vars()
        .into_iter()
        .map(|(key, value)| format!("{prefix}{key}={value}"));
    append_lines(path, lines)
}

fn append_lines(path: &Path, lines: impl Iterator<Item = String>) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    Ok(())
}
