//! In-memory record store
//!
//! Ordered collection of patient records for the current session. Mutations
//! only touch memory; callers persist and sync afterwards.

use crate::error::{Error, Result};
use crate::models::PatientRecord;

/// Insertion-ordered set of patient records keyed by code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<PatientRecord>,
}

impl RecordStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Build a store from previously persisted records, verbatim.
    #[must_use]
    pub const fn from_records(records: Vec<PatientRecord>) -> Self {
        Self { records }
    }

    /// Append a record; fails when the code is taken.
    pub fn add(&mut self, record: PatientRecord) -> Result<()> {
        if self.position(&record.code).is_some() {
            return Err(Error::DuplicateKey(record.code));
        }
        self.records.push(record);
        Ok(())
    }

    /// Replace the record with the same code, keeping position and `created_at`.
    pub fn update(&mut self, mut record: PatientRecord) -> Result<PatientRecord> {
        let index = self
            .position(&record.code)
            .ok_or_else(|| Error::NotFound(record.code.clone()))?;
        record.created_at = self.records[index].created_at.clone();
        Ok(std::mem::replace(&mut self.records[index], record))
    }

    /// Remove and return the record with `code`.
    pub fn remove(&mut self, code: &str) -> Result<PatientRecord> {
        let index = self
            .position(code)
            .ok_or_else(|| Error::NotFound(code.to_string()))?;
        Ok(self.records.remove(index))
    }

    /// Swap in a whole new collection. Codes are not checked for uniqueness.
    pub fn replace_all(&mut self, records: Vec<PatientRecord>) -> Vec<PatientRecord> {
        std::mem::replace(&mut self.records, records)
    }

    pub fn find(&self, code: &str) -> Result<&PatientRecord> {
        self.records
            .iter()
            .find(|record| record.code == code)
            .ok_or_else(|| Error::NotFound(code.to_string()))
    }

    pub fn list(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.records.iter().position(|record| record.code == code)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::PatientStatus;

    fn record(code: &str) -> PatientRecord {
        PatientRecord {
            code: code.to_string(),
            given_name: "Ana".to_string(),
            family_name: "Lopez".to_string(),
            email: None,
            phone: None,
            diagnosis: None,
            treatment: "Rest".to_string(),
            status: PatientStatus::Active,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn codes(store: &RecordStore) -> Vec<&str> {
        store.list().iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut store = RecordStore::new();
        store.add(record("P2")).unwrap();
        store.add(record("P1")).unwrap();
        store.add(record("P3")).unwrap();
        assert_eq!(codes(&store), vec!["P2", "P1", "P3"]);
    }

    #[test]
    fn add_duplicate_fails_and_leaves_store_unchanged() {
        let mut store = RecordStore::new();
        store.add(record("P1")).unwrap();
        let before = store.clone();

        let mut duplicate = record("P1");
        duplicate.given_name = "Other".to_string();
        let error = store.add(duplicate).unwrap_err();

        assert!(matches!(error, Error::DuplicateKey(code) if code == "P1"));
        assert_eq!(store, before);
    }

    #[test]
    fn remove_last_record_empties_store() {
        let mut store = RecordStore::new();
        store.add(record("P1")).unwrap();
        let removed = store.remove("P1").unwrap();
        assert_eq!(removed.code, "P1");
        assert!(store.is_empty());
    }

    #[test]
    fn remove_missing_code_reports_not_found() {
        let mut store = RecordStore::new();
        store.add(record("P1")).unwrap();
        assert!(matches!(store.remove("P9"), Err(Error::NotFound(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_keeps_position_and_creation_time() {
        let mut store = RecordStore::new();
        store.add(record("P1")).unwrap();
        store.add(record("P2")).unwrap();

        let mut edited = record("P1");
        edited.treatment = "Surgery".to_string();
        edited.created_at = "2030-01-01T00:00:00.000Z".to_string();
        let previous = store.update(edited).unwrap();

        assert_eq!(previous.treatment, "Rest");
        assert_eq!(codes(&store), vec!["P1", "P2"]);
        let updated = store.find("P1").unwrap();
        assert_eq!(updated.treatment, "Surgery");
        assert_eq!(updated.created_at, "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn update_missing_code_reports_not_found() {
        let mut store = RecordStore::new();
        assert!(matches!(store.update(record("P1")), Err(Error::NotFound(_))));
    }

    #[test]
    fn replace_all_accepts_duplicate_codes_verbatim() {
        let mut store = RecordStore::new();
        store.add(record("OLD")).unwrap();

        let incoming = vec![record("P1"), record("P1"), record("P2")];
        let previous = store.replace_all(incoming.clone());

        assert_eq!(codes(&RecordStore::from_records(previous)), vec!["OLD"]);
        assert_eq!(store.list(), incoming.as_slice());
    }

    #[test]
    fn find_returns_not_found_for_unknown_code() {
        let store = RecordStore::new();
        assert!(matches!(store.find("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn add_remove_sequences_never_duplicate_codes() {
        let mut store = RecordStore::new();
        let script = [
            ("add", "A"),
            ("add", "B"),
            ("add", "A"),
            ("remove", "A"),
            ("add", "A"),
            ("add", "B"),
            ("remove", "C"),
            ("add", "C"),
            ("add", "C"),
        ];

        for (op, code) in script {
            let _ = match op {
                "add" => store.add(record(code)),
                _ => store.remove(code).map(|_| ()),
            };
            let unique = store.list().iter().map(|r| &r.code).collect::<HashSet<_>>();
            assert_eq!(unique.len(), store.len());
        }
        assert_eq!(codes(&store), vec!["B", "A", "C"]);
    }
}
