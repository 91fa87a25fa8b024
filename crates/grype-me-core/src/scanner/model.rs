use serde::Deserialize;

/// Scanner JSON report, reduced to the fields the action consumes.
///
/// Every field defaults when absent so older and newer scanner releases
/// decode alike.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanReport {
    pub matches: Vec<VulnerabilityMatch>,
    pub descriptor: Descriptor,
}

impl ScanReport {
    /// Database build timestamp (RFC3339), or `""` when unknown.
    ///
    /// Newer scanners report it under `db.status.built`, older ones under
    /// `db.built`; the newer location wins.
    pub fn db_built(&self) -> &str {
        let db = &self.descriptor.db;
        if !db.status.built.is_empty() {
            &db.status.built
        } else {
            &db.built
        }
    }

    pub fn scanner_version(&self) -> &str {
        &self.descriptor.version
    }
}

/// One finding: a vulnerability matched against an installed package.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VulnerabilityMatch {
    pub vulnerability: Vulnerability,
    pub artifact: Artifact,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Vulnerability {
    /// CVE/GHSA identifier.
    pub id: String,
    /// Free text; bucketed case-insensitively.
    pub severity: String,
    pub description: String,
    #[serde(rename = "dataSource")]
    pub data_source: String,
    pub fix: Fix,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fix {
    pub versions: Vec<String>,
    /// "fixed", "not-fixed", "wont-fix" or "unknown".
    pub state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Artifact {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    pub version: String,
    pub db: DbInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DbInfo {
    pub built: String,
    pub status: DbStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DbStatus {
    pub built: String,
}
