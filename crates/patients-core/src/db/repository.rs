//! Patient collection persistence

use crate::db::KeyValueStore;
use crate::error::{Error, Result};
use crate::models::PatientRecord;

/// Storage slot holding the JSON array of records
pub const PATIENTS_KEY: &str = "patients";

/// Whole-collection save/load
pub trait PatientRepository {
    /// Overwrite the stored collection
    fn save(&self, records: &[PatientRecord]) -> Result<()>;

    /// Load the stored collection, empty when nothing was saved yet
    fn load(&self) -> Result<Vec<PatientRecord>>;
}

/// `PatientRepository` over any key-value slot store
pub struct KvPatientRepository<S> {
    store: S,
}

impl<S: KeyValueStore> KvPatientRepository<S> {
    /// Create a new repository with the given store
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> PatientRepository for KvPatientRepository<S> {
    fn save(&self, records: &[PatientRecord]) -> Result<()> {
        let payload = serde_json::to_string(records)?;
        self.store.set(PATIENTS_KEY, &payload)?;
        tracing::debug!("Saved {} patient records locally", records.len());
        Ok(())
    }

    fn load(&self) -> Result<Vec<PatientRecord>> {
        let Some(payload) = self.store.get(PATIENTS_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&payload)
            .map_err(|error| Error::Deserialization(format!("{PATIENTS_KEY}: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::{Database, MemoryKeyValueStore};
    use crate::models::PatientStatus;

    fn record(code: &str, status: PatientStatus) -> PatientRecord {
        PatientRecord {
            code: code.to_string(),
            given_name: "María".to_string(),
            family_name: "Núñez".to_string(),
            email: Some("maria@example.com".to_string()),
            phone: None,
            diagnosis: Some("Sprained ankle".to_string()),
            treatment: "Ice, rest".to_string(),
            status,
            created_at: "2024-03-04T05:06:07.000Z".to_string(),
        }
    }

    #[test]
    fn load_without_save_returns_empty() {
        let store = MemoryKeyValueStore::new();
        let repo = KvPatientRepository::new(&store);
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_roundtrips_collection() {
        let db = Database::open_in_memory().unwrap();
        let repo = KvPatientRepository::new(&db);
        let records = vec![
            record("P1", PatientStatus::Active),
            record("P2", PatientStatus::Completed),
            record("P3", PatientStatus::from("Referred")),
        ];

        repo.save(&records).unwrap();
        assert_eq!(repo.load().unwrap(), records);
    }

    #[test]
    fn blank_optional_fields_survive_save_and_load() {
        let store = MemoryKeyValueStore::new();
        let repo = KvPatientRepository::new(&store);
        let records = vec![PatientRecord {
            email: Some(String::new()),
            phone: Some(String::new()),
            diagnosis: None,
            ..record("P1", PatientStatus::Active)
        }];

        repo.save(&records).unwrap();
        assert_eq!(repo.load().unwrap(), records);
    }

    #[test]
    fn save_empty_overwrites_previous_content() {
        let store = MemoryKeyValueStore::new();
        let repo = KvPatientRepository::new(&store);
        repo.save(&[record("P1", PatientStatus::Active)]).unwrap();

        repo.save(&[]).unwrap();
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_payload_is_reported_not_panicked() {
        let store = MemoryKeyValueStore::new();
        store.set(PATIENTS_KEY, "{not json").unwrap();
        let repo = KvPatientRepository::new(&store);

        assert!(matches!(repo.load(), Err(Error::Deserialization(_))));
    }
}
