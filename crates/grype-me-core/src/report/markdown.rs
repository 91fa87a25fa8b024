//! Markdown vulnerability report.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::report::badge::extract_db_date;
use crate::scanner::model::{ScanReport, VulnerabilityMatch};
use crate::scanner::stats::VulnerabilityStats;
use crate::util::deterministic::sort_matches;

const DESCRIPTION_WIDTH: usize = 80;
const FOOTER: &str = "\n---\n*Generated by [grype_me](https://github.com/TomTonic/grype_me)*\n";

/// Render the full report. `now` is the scan timestamp shown in the header.
pub fn render_report(
    report: &ScanReport,
    stats: &VulnerabilityStats,
    scan_mode: &str,
    description: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = write_header(&mut out, report, stats, scan_mode, now);

    if let Some(text) = description.filter(|d| !d.trim().is_empty()) {
        out.push_str(text);
        out.push_str("\n\n");
    }

    let _ = write_summary_table(&mut out, stats);

    if stats.total > 0 {
        let _ = write_findings_table(&mut out, &report.matches);
    } else {
        out.push_str("\n✅ No vulnerabilities found.\n");
    }

    out.push_str(FOOTER);
    out
}

fn write_header(
    out: &mut String,
    report: &ScanReport,
    stats: &VulnerabilityStats,
    scan_mode: &str,
    now: DateTime<Utc>,
) -> std::fmt::Result {
    writeln!(
        out,
        "# ✊ grype {} — Vulnerability Scan Report\n",
        report.scanner_version()
    )?;
    writeln!(out, "**Scan mode:** {scan_mode}  ")?;
    writeln!(out, "**DB version:** {}  ", extract_db_date(report.db_built()))?;
    writeln!(out, "**Scanned:** {}  ", now.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out, "**Total CVEs:** {}\n", stats.total)
}

fn write_summary_table(out: &mut String, stats: &VulnerabilityStats) -> std::fmt::Result {
    out.push_str("## Summary\n\n| Severity | Count |\n|----------|------:|\n");
    writeln!(out, "| Critical | {} |", stats.critical)?;
    writeln!(out, "| High | {} |", stats.high)?;
    writeln!(out, "| Medium | {} |", stats.medium)?;
    writeln!(out, "| Low | {} |", stats.low)?;
    if stats.other > 0 {
        writeln!(out, "| Other | {} |", stats.other)?;
    }
    writeln!(out, "| **Total** | **{}** |", stats.total)
}

fn write_findings_table(out: &mut String, matches: &[VulnerabilityMatch]) -> std::fmt::Result {
    out.push_str("\n## Vulnerabilities\n\n");
    out.push_str("| CVE | Severity | Package | Installed | Fixed | Description | Source |\n");
    out.push_str("|-----|----------|---------|-----------|-------|-------------|--------|\n");

    for m in sort_matches(matches) {
        let vuln = &m.vulnerability;
        let fixed = if vuln.fix.versions.is_empty() {
            "—".to_string()
        } else {
            vuln.fix.versions.join(", ")
        };
        let source = if vuln.data_source.is_empty() {
            String::new()
        } else {
            format!("[link]({})", vuln.data_source)
        };

        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            vuln.id,
            vuln.severity,
            m.artifact.name,
            m.artifact.version,
            fixed,
            truncate(&vuln.description, DESCRIPTION_WIDTH),
            source
        )?;
    }
    Ok(())
}

/// Shorten `s` to at most `max` characters, ending in `…` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    let mut cut: String = s.chars().take(max - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn finding(id: &str, severity: &str, package: &str, fixed: &[&str]) -> VulnerabilityMatch {
        let mut m = VulnerabilityMatch::default();
        m.vulnerability.id = id.to_string();
        m.vulnerability.severity = severity.to_string();
        m.vulnerability.fix.versions = fixed.iter().map(|v| v.to_string()).collect();
        m.artifact.name = package.to_string();
        m.artifact.version = "1.0.0".to_string();
        m
    }

    fn scanned_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap()
    }

    fn base_report(matches: Vec<VulnerabilityMatch>) -> ScanReport {
        let mut report = ScanReport {
            matches,
            ..Default::default()
        };
        report.descriptor.version = "0.87.0".into();
        report.descriptor.db.status.built = "2026-01-30T12:34:56Z".into();
        report
    }

    #[test]
    fn clean_report_has_header_summary_and_footer() {
        let report = base_report(vec![]);
        let md = render_report(
            &report,
            &VulnerabilityStats::default(),
            "release",
            None,
            scanned_at(),
        );

        assert!(md.starts_with("# ✊ grype 0.87.0 — Vulnerability Scan Report\n\n"));
        assert!(md.contains("**Scan mode:** release  \n"));
        assert!(md.contains("**DB version:** 2026-01-30  \n"));
        assert!(md.contains("**Scanned:** 2026-02-03 04:05 UTC  \n"));
        assert!(md.contains("**Total CVEs:** 0\n"));
        assert!(md.contains("| **Total** | **0** |"));
        assert!(!md.contains("| Other |"));
        assert!(md.contains("✅ No vulnerabilities found."));
        assert!(!md.contains("## Vulnerabilities"));
        assert!(md.ends_with(FOOTER));
    }

    #[test]
    fn findings_are_sorted_and_formatted() {
        let mut with_link = finding("CVE-2", "Critical", "openssl", &["1.1.2", "3.0.1"]);
        with_link.vulnerability.data_source = "https://nvd.example/CVE-2".into();
        let report = base_report(vec![
            finding("CVE-9", "Low", "zlib", &[]),
            with_link,
            finding("CVE-1", "Critical", "curl", &[]),
        ]);
        let stats = VulnerabilityStats {
            total: 3,
            critical: 2,
            low: 1,
            ..Default::default()
        };

        let md = render_report(&report, &stats, "image", None, scanned_at());

        let rows: Vec<&str> = md.lines().filter(|l| l.starts_with("| CVE-")).collect();
        assert_eq!(
            rows,
            vec![
                "| CVE-1 | Critical | curl | 1.0.0 | — |  |  |",
                "| CVE-2 | Critical | openssl | 1.0.0 | 1.1.2, 3.0.1 |  | [link](https://nvd.example/CVE-2) |",
                "| CVE-9 | Low | zlib | 1.0.0 | — |  |  |",
            ]
        );
        // caller's order is untouched
        assert_eq!(report.matches[0].vulnerability.id, "CVE-9");
    }

    #[test]
    fn other_row_only_when_present() {
        let report = base_report(vec![finding("GHSA-1", "Negligible", "pkg", &[])]);
        let stats = VulnerabilityStats {
            total: 1,
            other: 1,
            ..Default::default()
        };
        let md = render_report(&report, &stats, "path", None, scanned_at());
        assert!(md.contains("| Other | 1 |"));
    }

    #[test]
    fn description_is_included_verbatim() {
        let report = base_report(vec![]);
        let md = render_report(
            &report,
            &VulnerabilityStats::default(),
            "head",
            Some("Nightly scan of **main**."),
            scanned_at(),
        );
        assert!(md.contains("**Total CVEs:** 0\n\nNightly scan of **main**.\n\n## Summary"));
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let mut long = finding("CVE-3", "High", "pkg", &[]);
        long.vulnerability.description = "x".repeat(120);
        let report = base_report(vec![long]);
        let stats = VulnerabilityStats {
            total: 1,
            high: 1,
            ..Default::default()
        };

        let md = render_report(&report, &stats, "sbom", None, scanned_at());
        let expected = format!("{}…", "x".repeat(79));
        assert!(md.contains(&format!("| {expected} |")));
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 80), "short");
        assert_eq!(truncate("äöüäöü", 4), "äöü…");
        assert_eq!(truncate("abc", 1), "…");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
