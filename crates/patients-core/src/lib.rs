//! patients-core - Core library for the patient record manager
//!
//! This crate contains the record model, the in-memory store, local
//! persistence, and the remote snapshot mirror used by every front-end.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod remote;
pub mod search;
pub mod services;
pub mod state;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{NewPatient, PatientRecord, PatientStats, PatientStatus};
pub use services::{Mutation, PatientService};
pub use state::SyncState;
