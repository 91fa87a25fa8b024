//! External scanner invocation and report handling.

pub mod model;
pub mod parse;
pub mod runner;
pub mod stats;

pub use model::{ScanReport, VulnerabilityMatch};
pub use parse::parse_report;
pub use runner::Scanner;
pub use stats::{SeverityBucket, VulnerabilityStats, aggregate};
