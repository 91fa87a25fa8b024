pub mod config;
pub mod error;
pub mod git;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod target;
pub mod util;

pub use pipeline::{RunOutcome, run};

pub const TOOL_NAME: &str = "grype-me";

/// Name of the scanner as it appears in badges and reports.
pub const SCANNER_NAME: &str = "grype";
