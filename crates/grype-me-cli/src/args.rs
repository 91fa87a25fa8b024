use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use grype_me_core::config::{CiEnvironment, GistSettings, ScanConfig, SeverityCutoff};
use grype_me_core::scanner::runner::DEFAULT_SCANNER;

/// Action inputs. Every flag can also be supplied through the
/// `INPUT_<NAME>` variable the Actions runner sets for `with:` entries.
#[derive(Debug, Parser)]
#[command(
    name = "grype-me",
    version,
    about = "Scan images, paths, SBOMs or git refs with grype and publish the results"
)]
pub struct Args {
    /// Repository scan: `latest_release`, `head`, or a tag/branch name
    #[arg(long, env = "INPUT_SCAN", default_value = "")]
    pub scan: String,

    /// Container image to scan
    #[arg(long, env = "INPUT_IMAGE", default_value = "")]
    pub image: String,

    /// Local directory or file to scan
    #[arg(long, env = "INPUT_PATH", default_value = "")]
    pub path: String,

    /// SBOM file to scan
    #[arg(long, env = "INPUT_SBOM", default_value = "")]
    pub sbom: String,

    /// Fail when findings reach the severity cutoff
    #[arg(
        long,
        env = "INPUT_FAIL-BUILD",
        action = ArgAction::Set,
        value_parser = parse_flag,
        default_value = "false"
    )]
    pub fail_build: bool,

    /// critical, high, medium, low or negligible
    #[arg(long, env = "INPUT_SEVERITY-CUTOFF", default_value = "medium")]
    pub severity_cutoff: String,

    /// Copy the raw scanner JSON here (relative to the workspace)
    #[arg(long, env = "INPUT_OUTPUT-FILE", default_value = "")]
    pub output_file: String,

    /// Only report findings that have a fix
    #[arg(
        long,
        env = "INPUT_ONLY-FIXED",
        action = ArgAction::Set,
        value_parser = parse_flag,
        default_value = "false"
    )]
    pub only_fixed: bool,

    /// Update the vulnerability database before scanning
    #[arg(
        long,
        env = "INPUT_DB-UPDATE",
        action = ArgAction::Set,
        value_parser = parse_flag,
        default_value = "false"
    )]
    pub db_update: bool,

    /// Verbose logging
    #[arg(
        long,
        env = "INPUT_DEBUG",
        action = ArgAction::Set,
        value_parser = parse_flag,
        default_value = "false"
    )]
    pub debug: bool,

    /// Free text added to the Markdown report
    #[arg(long, env = "INPUT_DESCRIPTION", default_value = "")]
    pub description: String,

    /// Token with gist scope
    #[arg(long, env = "INPUT_GIST-TOKEN", default_value = "", hide_env_values = true)]
    pub gist_token: String,

    /// ID of an existing gist to update
    #[arg(long, env = "INPUT_GIST-ID", default_value = "")]
    pub gist_id: String,

    /// Base filename for gist files (default `grype-<mode>`)
    #[arg(long, env = "INPUT_GIST-FILENAME", default_value = "")]
    pub gist_filename: String,

    /// Prefix of exported environment variables
    #[arg(long, env = "INPUT_VARIABLE-PREFIX", default_value = "")]
    pub variable_prefix: String,

    /// Scanner executable
    #[arg(long, env = "GRYPE_ME_SCANNER", default_value = DEFAULT_SCANNER)]
    pub scanner: String,

    #[arg(long, env = "GITHUB_OUTPUT", hide = true)]
    pub github_output: Option<String>,

    #[arg(long, env = "GITHUB_ENV", hide = true)]
    pub github_env: Option<String>,

    #[arg(long, env = "GITHUB_WORKSPACE", hide = true)]
    pub github_workspace: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", hide = true)]
    pub github_api_url: Option<String>,
}

/// Actions booleans: `true` in any case is true, everything else false.
fn parse_flag(value: &str) -> Result<bool, std::convert::Infallible> {
    Ok(value.trim().eq_ignore_ascii_case("true"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Args {
    pub fn into_config(self) -> Result<(ScanConfig, CiEnvironment)> {
        let severity_cutoff: SeverityCutoff = self
            .severity_cutoff
            .parse()
            .context("invalid severity-cutoff input")?;

        let config = ScanConfig {
            scan: self.scan,
            image: self.image,
            path: self.path,
            sbom: self.sbom,
            fail_build: self.fail_build,
            severity_cutoff,
            output_file: self.output_file,
            only_fixed: self.only_fixed,
            db_update: self.db_update,
            debug: self.debug,
            description: self.description,
            gist: GistSettings {
                token: self.gist_token,
                id: self.gist_id,
                filename: self.gist_filename,
            },
            variable_prefix: self.variable_prefix,
            scanner: PathBuf::from(self.scanner.trim()),
        };

        let env = CiEnvironment {
            output_file: non_blank(self.github_output).map(PathBuf::from),
            env_file: non_blank(self.github_env).map(PathBuf::from),
            workspace: non_blank(self.github_workspace).map(PathBuf::from),
            container_workspace: None,
            api_url: non_blank(self.github_api_url),
        };

        Ok((config, env))
    }
}
