//! Data models for patients

mod patient;

pub use patient::{NewPatient, PatientRecord, PatientStats, PatientStatus};
