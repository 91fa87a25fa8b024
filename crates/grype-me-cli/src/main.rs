use anyhow::Result;
use clap::Parser;
use tracing::debug;

use grype_me_core::TOOL_NAME;

mod args;
mod logging;

/// Inputs that must never reach the log.
const SECRET_VARS: &[&str] = &["INPUT_GIST-TOKEN"];

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = args::Args::parse();
    logging::init(args.debug);

    debug!("{TOOL_NAME} {}", env!("CARGO_PKG_VERSION"));
    if args.debug {
        log_action_environment();
    }

    let (config, env) = args.into_config()?;
    grype_me_core::run(&config, &env)?;
    Ok(())
}

/// Sorted `INPUT_*` and `GITHUB_*` variables, secrets masked.
fn log_action_environment() {
    let mut vars: Vec<(String, String)> = std::env::vars_os()
        .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
        .filter(|(k, _)| k.starts_with("INPUT_") || k.starts_with("GITHUB_"))
        .collect();
    vars.sort();

    for (key, value) in vars {
        if SECRET_VARS.contains(&key.as_str()) && !value.is_empty() {
            debug!("{key}=***");
        } else {
            debug!("{key}={value}");
        }
    }
}
