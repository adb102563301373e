//! Local persistence for patients

mod config_repository;
mod connection;
mod kv;
mod migrations;
mod repository;

pub use config_repository::{ConfigRepository, KvConfigRepository};
pub use connection::Database;
pub use kv::{KeyValueStore, MemoryKeyValueStore};
pub use repository::{KvPatientRepository, PatientRepository, PATIENTS_KEY};
