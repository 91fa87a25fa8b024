use crate::config::SeverityCutoff;
use crate::scanner::model::ScanReport;

/// The five buckets a finding is counted in, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeverityBucket {
    Critical,
    High,
    Medium,
    Low,
    Other,
}

impl SeverityBucket {
    /// Case-insensitive; anything unrecognized (including "Negligible" and
    /// "Unknown") lands in `Other`.
    pub fn classify(severity: &str) -> Self {
        match severity.to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Other,
        }
    }
}

/// Per-severity finding counts.
///
/// `total` always equals the sum of the five buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VulnerabilityStats {
    pub total: u64,
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub other: u64,
}

impl VulnerabilityStats {
    pub fn count(&self, bucket: SeverityBucket) -> u64 {
        match bucket {
            SeverityBucket::Critical => self.critical,
            SeverityBucket::High => self.high,
            SeverityBucket::Medium => self.medium,
            SeverityBucket::Low => self.low,
            SeverityBucket::Other => self.other,
        }
    }

    fn record(&mut self, bucket: SeverityBucket) {
        self.total += 1;
        match bucket {
            SeverityBucket::Critical => self.critical += 1,
            SeverityBucket::High => self.high += 1,
            SeverityBucket::Medium => self.medium += 1,
            SeverityBucket::Low => self.low += 1,
            SeverityBucket::Other => self.other += 1,
        }
    }

    /// Whether findings at or above `cutoff` exist.
    ///
    /// `Negligible` fails on any finding at all, including `other`.
    pub fn exceeds(&self, cutoff: SeverityCutoff) -> bool {
        match cutoff {
            SeverityCutoff::Critical => self.critical > 0,
            SeverityCutoff::High => self.critical + self.high > 0,
            SeverityCutoff::Medium => self.critical + self.high + self.medium > 0,
            SeverityCutoff::Low => self.critical + self.high + self.medium + self.low > 0,
            SeverityCutoff::Negligible => self.total > 0,
        }
    }
}

/// Count every match of `report` exactly once. Match order is irrelevant.
pub fn aggregate(report: &ScanReport) -> VulnerabilityStats {
    report
        .matches
        .iter()
        .map(|m| SeverityBucket::classify(&m.vulnerability.severity))
        .fold(VulnerabilityStats::default(), |mut stats, bucket| {
            stats.record(bucket);
            stats
        })
}
