//! End-to-end action run: resolve, scan, parse, publish, enforce.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::{CiEnvironment, ScanConfig, ScanMode};
use crate::error::ActionError;
use crate::git::Git;
use crate::output::gist::{GistClient, GistResult, gist_filenames};
use crate::output::{ScanOutputs, copy_output_file, write_ci_outputs, write_env_vars};
use crate::report::{badge_json, badge_label, badge_url, render_report, render_summary};
use crate::scanner::Scanner;
use crate::scanner::model::ScanReport;
use crate::scanner::parse::parse_report_bytes;
use crate::scanner::stats::{VulnerabilityStats, aggregate};
use crate::target;

const SCRATCH_REPORT: &str = "grype-output.json";

/// What a completed run produced. Returned only when the fail-build policy
/// did not trigger.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub stats: VulnerabilityStats,
    pub badge_url: String,
    pub json_output: Option<PathBuf>,
    pub gist: Option<GistResult>,
}

/// Execute one action run.
///
/// Outputs are published before the fail-build check, so a failing run
/// still reports its counts.
pub fn run(config: &ScanConfig, env: &CiEnvironment) -> Result<RunOutcome> {
    debug!("configuration: {config:?}");
    debug!("ci environment: {env:?}");

    let git = Git::current_dir();
    let mut resolved = target::resolve(config, &git, env.workspace.as_deref())
        .context("failed to determine scan target")?;
    info!("Scan target: {}", resolved.target);

    let scanner = Scanner::from_config(config);
    if config.db_update {
        scanner
            .update_db()
            .context("failed to update vulnerability database")?;
    }

    // Removed on every exit path when `scratch` drops.
    let scratch = tempfile::Builder::new()
        .prefix("grype-me-")
        .tempdir()
        .context("failed to create scratch directory")?;
    let raw_path = scratch.path().join(SCRATCH_REPORT);

    scanner
        .run(config, &resolved.target, &raw_path)
        .context("scan failed")?;

    let raw = fs::read(&raw_path)
        .with_context(|| format!("failed to read scanner output {}", raw_path.display()))?;
    let report = parse_report_bytes(&raw_path, &raw).context("failed to parse scanner output")?;

    let json_output = match config.output_file.trim() {
        "" => None,
        dest => {
            let written = copy_output_file(&raw_path, Path::new(dest), env)
                .context("failed to copy output file")?;
            info!("Scan results saved to: {}", written.display());
            Some(written)
        }
    };

    let stats = aggregate(&report);
    let scan_mode = ScanMode::from_config(config);

    let gist = if config.gist.is_enabled() {
        match publish_gist(config, env, &report, &raw, &stats, scan_mode) {
            Ok(result) => {
                info!("Gist updated: {}", result.gist_url);
                Some(result)
            }
            Err(e) => {
                warn!("failed to update gist: {e:#}");
                None
            }
        }
    } else {
        None
    };

    let published_badge = gist
        .as_ref()
        .and_then(|g| g.badge_url.clone())
        .unwrap_or_else(|| {
            badge_url(
                &stats,
                &badge_label(report.scanner_version()),
                report.db_built(),
                scan_mode.as_str(),
            )
        });

    let outputs = ScanOutputs {
        scanner_version: report.scanner_version().to_string(),
        db_built: report.db_built().to_string(),
        stats,
        badge_url: published_badge.clone(),
        json_output: json_output.clone(),
        report_url: gist.as_ref().and_then(|g| g.report_url.clone()),
    };
    write_ci_outputs(env, &outputs).context("failed to set outputs")?;
    write_env_vars(env, &config.variable_prefix, &outputs)
        .context("failed to write environment variables")?;

    info!("{}", render_summary(&stats, &report));

    if let Some(mut worktree) = resolved.worktree.take() {
        if let Err(e) = worktree.cleanup() {
            warn!("failed to clean up worktree {}: {e}", worktree.path().display());
        }
    }

    if config.fail_build && stats.exceeds(config.severity_cutoff) {
        return Err(ActionError::ThresholdExceeded {
            cutoff: config.severity_cutoff.to_string(),
        }
        .into());
    }

    Ok(RunOutcome {
        stats,
        badge_url: published_badge,
        json_output,
        gist,
    })
}

fn publish_gist(
    config: &ScanConfig,
    env: &CiEnvironment,
    report: &ScanReport,
    raw: &[u8],
    stats: &VulnerabilityStats,
    scan_mode: ScanMode,
) -> Result<GistResult> {
    let names = gist_filenames(&config.gist.filename, scan_mode.as_str());

    let badge = badge_json(
        stats,
        report.scanner_version(),
        report.db_built(),
        scan_mode.as_str(),
    )
    .context("failed to encode badge JSON")?;
    let description = Some(config.description.as_str()).filter(|d| !d.trim().is_empty());
    let markdown = render_report(report, stats, scan_mode.as_str(), description, Utc::now());

    let mut files = BTreeMap::new();
    files.insert(names.badge.clone(), badge);
    files.insert(names.report.clone(), markdown);
    if !raw.is_empty() {
        files.insert(names.raw.clone(), String::from_utf8_lossy(raw).into_owned());
    }

    let client = GistClient::new(config.gist.token.trim(), env.api_url())?;
    Ok(client.update_gist(config.gist.id.trim(), &names, &files)?)
}
