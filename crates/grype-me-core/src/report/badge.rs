//! shields.io badge rendering.

use serde::Serialize;
use url::Url;

use crate::SCANNER_NAME;
use crate::scanner::stats::VulnerabilityStats;

const STATIC_BADGE_BASE: &str = "https://img.shields.io/badge";

/// `"0"` for a clean scan, otherwise e.g. `"2 critical | 3 high"`.
///
/// `other` findings are only mentioned when nothing ranked was found.
pub fn format_message(stats: &VulnerabilityStats) -> String {
    if stats.total == 0 {
        return "0".to_string();
    }

    let mut parts: Vec<String> = [
        (stats.critical, "critical"),
        (stats.high, "high"),
        (stats.medium, "medium"),
        (stats.low, "low"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, name)| format!("{n} {name}"))
    .collect();

    if parts.is_empty() && stats.other > 0 {
        parts.push(format!("{} other", stats.other));
    }

    parts.join(" | ")
}

/// Color of the most severe non-empty bucket.
pub fn determine_color(stats: &VulnerabilityStats) -> &'static str {
    if stats.critical > 0 {
        "critical"
    } else if stats.high > 0 {
        "orange"
    } else if stats.medium > 0 {
        "yellow"
    } else if stats.low > 0 || stats.other > 0 {
        "yellowgreen"
    } else {
        "brightgreen"
    }
}

pub fn badge_label(scanner_version: &str) -> String {
    format!("✊ {SCANNER_NAME} {scanner_version}")
}

/// `YYYY-MM-DD` from an RFC3339 timestamp. Shorter input is returned whole.
pub fn extract_db_date(timestamp: &str) -> &str {
    match timestamp.char_indices().nth(10) {
        Some((idx, _)) => &timestamp[..idx],
        None => timestamp,
    }
}

fn badge_message(stats: &VulnerabilityStats, db_date: &str, scan_mode: &str) -> String {
    let message = format!("{} CVEs in {scan_mode}", format_message(stats));
    if db_date.is_empty() {
        message
    } else {
        format!("db {db_date}: {message}")
    }
}

/// Static badge URL: `https://img.shields.io/badge/<label>-<message>-<color>`.
///
/// shields.io reads `-` as a field separator, so dashes in the DB date are
/// doubled.
pub fn badge_url(
    stats: &VulnerabilityStats,
    label: &str,
    db_built: &str,
    scan_mode: &str,
) -> String {
    let db_date = extract_db_date(db_built).replace('-', "--");
    let message = badge_message(stats, &db_date, scan_mode);
    let color = determine_color(stats);

    let mut url = Url::parse(STATIC_BADGE_BASE).expect("static badge base is a valid URL");
    url.path_segments_mut()
        .expect("https URLs have path segments")
        .pop_if_empty()
        .push(&format!("{label}-{message}-{color}"));
    url.into()
}

/// Payload served to `https://img.shields.io/endpoint`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointBadge {
    pub schema_version: u8,
    pub label: String,
    pub message: String,
    pub color: String,
}

impl EndpointBadge {
    pub fn new(
        stats: &VulnerabilityStats,
        scanner_version: &str,
        db_built: &str,
        scan_mode: &str,
    ) -> Self {
        Self {
            schema_version: 1,
            label: badge_label(scanner_version),
            message: badge_message(stats, extract_db_date(db_built), scan_mode),
            color: determine_color(stats).to_string(),
        }
    }
}

/// Compact endpoint badge JSON. Unlike [`badge_url`], the date keeps single
/// dashes.
pub fn badge_json(
    stats: &VulnerabilityStats,
    scanner_version: &str,
    db_built: &str,
    scan_mode: &str,
) -> serde_json::Result<String> {
    serde_json::to_string(&EndpointBadge::new(stats, scanner_version, db_built, scan_mode))
}
