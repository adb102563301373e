//! Patient record model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{iso_timestamp_now, normalize_text_option};

/// Treatment status of a patient.
///
/// `Active` and `Completed` are the well-known values; anything else is kept
/// verbatim so imported data round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatientStatus {
    #[default]
    Active,
    Completed,
    Other(String),
}

impl PatientStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for PatientStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Active" => Self::Active,
            "Completed" => Self::Completed,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for PatientStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<PatientStatus> for String {
    fn from(value: PatientStatus) -> Self {
        match value {
            PatientStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A patient entry, keyed by its code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Unique patient code (primary key, immutable)
    pub code: String,
    pub given_name: String,
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    pub treatment: String,
    #[serde(default)]
    pub status: PatientStatus,
    /// Creation timestamp (ISO-8601), set once
    pub created_at: String,
}

impl PatientRecord {
    /// Full display name, "given family"
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// Input for creating or editing a patient.
///
/// Text fields are trimmed; blank optional fields become `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPatient {
    pub code: String,
    pub given_name: String,
    pub family_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: String,
    pub status: PatientStatus,
}

impl NewPatient {
    /// Validate the input and stamp a creation time.
    pub fn into_record(self) -> Result<PatientRecord> {
        self.into_record_created_at(iso_timestamp_now())
    }

    /// Validate the input using an explicit creation timestamp.
    pub fn into_record_created_at(self, created_at: String) -> Result<PatientRecord> {
        let code = required(self.code, "code")?;
        let given_name = required(self.given_name, "given name")?;
        let family_name = required(self.family_name, "family name")?;

        Ok(PatientRecord {
            code,
            given_name,
            family_name,
            email: normalize_text_option(self.email),
            phone: normalize_text_option(self.phone),
            diagnosis: normalize_text_option(self.diagnosis),
            treatment: self.treatment.trim().to_string(),
            status: self.status,
            created_at,
        })
    }
}

/// Per-status counts over a record collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatientStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl PatientStats {
    #[must_use]
    pub fn from_records(records: &[PatientRecord]) -> Self {
        records.iter().fold(
            Self {
                total: records.len(),
                ..Self::default()
            },
            |mut stats, record| {
                match record.status {
                    PatientStatus::Active => stats.active += 1,
                    PatientStatus::Completed => stats.completed += 1,
                    PatientStatus::Other(_) => {}
                }
                stats
            },
        )
    }
}

fn required(value: String, field: &str) -> Result<String> {
    normalize_text_option(Some(value))
        .ok_or_else(|| Error::InvalidInput(format!("{field} must not be empty")))
}
