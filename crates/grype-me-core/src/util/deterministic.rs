//! Deterministic ordering helpers.
//!
//! Report tables list findings in a fixed order so identical scans render
//! identical Markdown, whatever order the scanner emitted them in.

use crate::scanner::model::VulnerabilityMatch;
use crate::scanner::stats::SeverityBucket;

/// Rank used for table ordering: Critical 0 .. Low 3, everything else 4.
pub fn severity_rank(severity: &str) -> u8 {
    match SeverityBucket::classify(severity) {
        SeverityBucket::Critical => 0,
        SeverityBucket::High => 1,
        SeverityBucket::Medium => 2,
        SeverityBucket::Low => 3,
        SeverityBucket::Other => 4,
    }
}

/// Sorted copy of `matches`, by `(severity rank, id)`.
///
/// The sort is stable and the input is left untouched.
pub fn sort_matches(matches: &[VulnerabilityMatch]) -> Vec<VulnerabilityMatch> {
    let mut sorted = matches.to_vec();
    sorted.sort_by(|a, b| {
        (
            severity_rank(&a.vulnerability.severity),
            a.vulnerability.id.as_str(),
        )
            .cmp(&(
                severity_rank(&b.vulnerability.severity),
                b.vulnerability.id.as_str(),
            ))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(id: &str, severity: &str, package: &str) -> VulnerabilityMatch {
        let mut m = VulnerabilityMatch::default();
        m.vulnerability.id = id.to_string();
        m.vulnerability.severity = severity.to_string();
        m.artifact.name = package.to_string();
        m
    }

    fn ids(matches: &[VulnerabilityMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.vulnerability.id.as_str()).collect()
    }

    #[test]
    fn ranks_are_case_insensitive() {
        assert_eq!(severity_rank("CRITICAL"), 0);
        assert_eq!(severity_rank("high"), 1);
        assert_eq!(severity_rank("Medium"), 2);
        assert_eq!(severity_rank("low"), 3);
        assert_eq!(severity_rank("Negligible"), 4);
        assert_eq!(severity_rank(""), 4);
    }

    #[test]
    fn sort_matches_orders_by_severity_then_id() {
        let matches = vec![
            finding("CVE-3", "Low", "a"),
            finding("CVE-2", "Critical", "b"),
            finding("CVE-9", "Unknown", "c"),
            finding("CVE-1", "Critical", "d"),
            finding("CVE-5", "high", "e"),
        ];

        let sorted = sort_matches(&matches);

        assert_eq!(ids(&sorted), vec!["CVE-1", "CVE-2", "CVE-5", "CVE-3", "CVE-9"]);
    }

    #[test]
    fn sort_matches_leaves_input_untouched() {
        let matches = vec![finding("CVE-2", "Low", "a"), finding("CVE-1", "High", "b")];

        let _ = sort_matches(&matches);

        assert_eq!(ids(&matches), vec!["CVE-2", "CVE-1"]);
    }

    #[test]
    fn sort_matches_is_stable_for_identical_keys() {
        let matches = vec![
            finding("CVE-7", "High", "first"),
            finding("CVE-7", "HIGH", "second"),
        ];

        let sorted = sort_matches(&matches);

        assert_eq!(sorted[0].artifact.name, "first");
        assert_eq!(sorted[1].artifact.name, "second");
    }

    #[test]
    fn sort_matches_is_deterministic_across_input_orders() {
        let forward = vec![
            finding("CVE-4", "Medium", "a"),
            finding("CVE-1", "Low", "b"),
            finding("CVE-2", "Critical", "c"),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(ids(&sort_matches(&forward)), ids(&sort_matches(&backward)));
    }
}
