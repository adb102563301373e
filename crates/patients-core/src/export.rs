//! JSON export/import of the full record collection.
//!
//! The export document is the same pretty-printed array that is mirrored to
//! the remote, so a downloaded file can be imported back verbatim.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::PatientRecord;

/// Render records as pretty-printed (two-space indented) JSON.
pub fn render_json_export(records: &[PatientRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Parse an import document: a JSON array of patient records.
///
/// Codes are taken verbatim; duplicates are not rejected.
pub fn parse_json_import(document: &str) -> Result<Vec<PatientRecord>> {
    let document = document.trim_start_matches('\u{feff}');
    serde_json::from_str(document).map_err(|error| Error::ImportParse(error.to_string()))
}

/// Default export file name for a given day, e.g. `patients-2024-05-06.json`.
#[must_use]
pub fn suggested_export_file_name(date: NaiveDate) -> String {
    format!("patients-{}.json", date.format("%Y-%m-%d"))
}
