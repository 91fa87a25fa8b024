use crate::SCANNER_NAME;
use crate::report::badge::{extract_db_date, format_message};
use crate::scanner::model::ScanReport;
use crate::scanner::stats::VulnerabilityStats;

/// One-line console summary, e.g. `✊ grype 0.87.0 | db 2026-01-30 | 2 high CVEs`.
pub fn render_summary(stats: &VulnerabilityStats, report: &ScanReport) -> String {
    format!(
        "✊ {} {} | db {} | {} CVEs",
        SCANNER_NAME,
        report.scanner_version(),
        extract_db_date(report.db_built()),
        format_message(stats)
    )
}
