use std::{fs, path::Path};

use crate::error::{ActionError, Result};
use crate::scanner::model::ScanReport;

/// Read and decode a scanner JSON report.
///
/// An unreadable file and malformed JSON are both reported as
/// [`ActionError::Parse`].
pub fn parse_report(path: &Path) -> Result<ScanReport> {
    let bytes = fs::read(path).map_err(|e| ActionError::Parse {
        path: path.to_path_buf(),
        reason: format!("failed to read output file: {e}"),
    })?;

    parse_report_bytes(path, &bytes)
}

/// Decode an already-loaded report. `path` is only used in errors.
pub fn parse_report_bytes(path: &Path, bytes: &[u8]) -> Result<ScanReport> {
    serde_json::from_slice(bytes).map_err(|e| ActionError::Parse {
        path: path.to_path_buf(),
        reason: format!("failed to parse JSON: {e}"),
    })
}
