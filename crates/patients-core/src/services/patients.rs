//! Application state shared by all front-ends.

use std::path::PathBuf;

use crate::config::RemoteCredentials;
use crate::db::{
    ConfigRepository, Database, KeyValueStore, KvConfigRepository, KvPatientRepository,
    PatientRepository,
};
use crate::export::{parse_json_import, render_json_export};
use crate::models::{NewPatient, PatientRecord, PatientStats};
use crate::search::{search_records, SearchField};
use crate::store::RecordStore;
use crate::sync::{SyncHandle, SyncOrchestrator};
use crate::Result;

/// Result of a committed mutation plus the sync task it started.
///
/// The mutation is complete once local persistence succeeded; the sync task
/// only reports how the remote mirror fared.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    pub sync: SyncHandle,
}

/// Record store, local persistence and remote mirror for one session.
pub struct PatientService<S> {
    kv: S,
    store: RecordStore,
    sync: SyncOrchestrator,
}

impl PatientService<Database> {
    /// Open the on-disk database at `db_path`, creating parent directories.
    pub fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(Database::open(&db_path)?)
    }
}

impl<S: KeyValueStore> PatientService<S> {
    /// Load records and remote configuration from `kv`.
    ///
    /// `PATIENTS_REMOTE_TOKEN` overrides the stored auth token when set.
    pub fn open(kv: S) -> Result<Self> {
        let credentials = KvConfigRepository::new(&kv).load()?.with_env_override();
        let sync = SyncOrchestrator::new(credentials)?;
        Self::with_orchestrator(kv, sync)
    }

    /// Load records from `kv` and mirror through an existing orchestrator.
    pub fn with_orchestrator(kv: S, sync: SyncOrchestrator) -> Result<Self> {
        let records = KvPatientRepository::new(&kv).load()?;
        tracing::debug!("Loaded {} patient records", records.len());
        Ok(Self {
            kv,
            store: RecordStore::from_records(records),
            sync,
        })
    }

    pub fn list(&self) -> &[PatientRecord] {
        self.store.list()
    }

    pub fn find(&self, code: &str) -> Result<&PatientRecord> {
        self.store.find(code.trim())
    }

    pub fn search(&self, query: &str, field: SearchField) -> Vec<&PatientRecord> {
        search_records(self.store.list(), query, field)
    }

    pub fn stats(&self) -> PatientStats {
        PatientStats::from_records(self.store.list())
    }

    pub const fn sync_orchestrator(&self) -> &SyncOrchestrator {
        &self.sync
    }

    /// Add a new patient; fails on a duplicate code.
    pub fn create(&mut self, input: NewPatient) -> Result<Mutation<PatientRecord>> {
        let record = input.into_record()?;
        self.mutate(|store| {
            store.add(record.clone())?;
            Ok(record)
        })
    }

    /// Replace every editable field of an existing patient.
    pub fn update(&mut self, input: NewPatient) -> Result<Mutation<PatientRecord>> {
        let created_at = self.store.find(input.code.trim())?.created_at.clone();
        let record = input.into_record_created_at(created_at)?;
        self.mutate(|store| {
            store.update(record.clone())?;
            Ok(record)
        })
    }

    pub fn delete(&mut self, code: &str) -> Result<Mutation<PatientRecord>> {
        let code = code.trim();
        self.mutate(|store| store.remove(code))
    }

    /// Swap in a whole collection; returns the new record count.
    pub fn replace_all(&mut self, records: Vec<PatientRecord>) -> Result<Mutation<usize>> {
        self.mutate(|store| {
            store.replace_all(records);
            Ok(store.len())
        })
    }

    /// Parse an export document and replace the collection with it.
    pub fn import_json(&mut self, document: &str) -> Result<Mutation<usize>> {
        let records = parse_json_import(document)?;
        self.replace_all(records)
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(render_json_export(self.store.list())?)
    }

    /// Mirror the current collection without a local change.
    pub fn resync(&self) -> SyncHandle {
        self.sync.spawn_sync(self.store.list())
    }

    /// Replace the local collection with the remote snapshot.
    ///
    /// Returns `None` (and leaves local data alone) when no remote file exists.
    pub async fn pull(&mut self) -> Result<Option<usize>> {
        let Some(records) = self.sync.pull().await? else {
            return Ok(None);
        };
        let previous = self.store.replace_all(records);
        if let Err(error) = self.persist() {
            self.store.replace_all(previous);
            return Err(error);
        }
        Ok(Some(self.store.len()))
    }

    /// Persist new remote configuration and retarget the mirror.
    pub async fn configure_remote(&self, credentials: RemoteCredentials) -> Result<()> {
        let credentials = credentials.normalized();
        KvConfigRepository::new(&self.kv).save(&credentials)?;
        self.sync.set_credentials(credentials).await;
        Ok(())
    }

    /// Credentials currently in effect, including any env token override.
    pub fn remote_credentials(&self) -> RemoteCredentials {
        self.sync.credentials()
    }

    /// Credentials as saved locally, without the env token override.
    pub fn stored_remote_credentials(&self) -> Result<RemoteCredentials> {
        KvConfigRepository::new(&self.kv).load()
    }

    /// Apply `change`, persist the whole collection, then start a sync.
    ///
    /// A failed save rolls the in-memory store back so memory and disk agree.
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut RecordStore) -> Result<T>,
    ) -> Result<Mutation<T>> {
        let snapshot = self.store.clone();
        let value = change(&mut self.store)?;

        if let Err(error) = self.persist() {
            tracing::warn!("Local save failed, reverting change: {error}");
            self.store = snapshot;
            return Err(error);
        }

        let sync = self.sync.spawn_sync(self.store.list());
        Ok(Mutation { value, sync })
    }

    fn persist(&self) -> Result<()> {
        KvPatientRepository::new(&self.kv).save(self.store.list())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::MemoryKeyValueStore;
    use crate::models::PatientStatus;
    use crate::Error;

    /// Store whose writes can be switched off to simulate a full disk.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKeyValueStore,
        writes_fail: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.writes_fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(Error::StorageUnavailable("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    fn input(code: &str) -> NewPatient {
        NewPatient {
            code: code.to_string(),
            given_name: "Ana".to_string(),
            family_name: "Lopez".to_string(),
            treatment: "Rest".to_string(),
            ..NewPatient::default()
        }
    }

    fn reload(kv: &MemoryKeyValueStore) -> Vec<PatientRecord> {
        KvPatientRepository::new(kv).load().unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_persists_and_rejects_duplicates() {
        let kv = MemoryKeyValueStore::new();
        let mut service = PatientService::open(&kv).unwrap();

        let created = service.create(input("P1")).unwrap();
        assert_eq!(created.value.code, "P1");
        assert!(matches!(
            created.sync.await.unwrap(),
            Err(Error::MissingCredentials)
        ));

        let duplicate = service.create(input("P1")).unwrap_err();
        assert!(matches!(duplicate, Error::DuplicateKey(_)));
        assert_eq!(service.list().len(), 1);
        assert_eq!(reload(&kv).len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_last_record_persists_empty_collection() {
        let kv = MemoryKeyValueStore::new();
        let mut service = PatientService::open(&kv).unwrap();
        service.create(input("P1")).unwrap();

        let removed = service.delete("P1").unwrap();
        assert_eq!(removed.value.code, "P1");
        assert!(service.list().is_empty());
        assert!(reload(&kv).is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_keeps_creation_time() {
        let kv = MemoryKeyValueStore::new();
        let mut service = PatientService::open(&kv).unwrap();
        let created = service.create(input("P1")).unwrap().value;

        let edited = service
            .update(NewPatient {
                treatment: "Surgery".to_string(),
                status: PatientStatus::Completed,
                ..input("P1")
            })
            .unwrap()
            .value;

        assert_eq!(edited.created_at, created.created_at);
        assert_eq!(reload(&kv), vec![edited]);
        assert_eq!(service.stats().completed, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn import_replaces_collection_verbatim() {
        let kv = MemoryKeyValueStore::new();
        let mut service = PatientService::open(&kv).unwrap();
        service.create(input("OLD")).unwrap();

        let document = r#"[
            {"code": "P1", "givenName": "A", "familyName": "B", "treatment": "x", "status": "Active", "createdAt": "t1"},
            {"code": "P1", "givenName": "C", "familyName": "D", "treatment": "y", "status": "Active", "createdAt": "t2"}
        ]"#;
        let imported = service.import_json(document).unwrap();

        assert_eq!(imported.value, 2);
        let given = service
            .list()
            .iter()
            .map(|r| r.given_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(given, vec!["A", "C"]);
        assert_eq!(reload(&kv).len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_import_leaves_store_untouched() {
        let kv = MemoryKeyValueStore::new();
        let mut service = PatientService::open(&kv).unwrap();
        service.create(input("P1")).unwrap();

        assert!(matches!(
            service.import_json("[{]"),
            Err(Error::ImportParse(_))
        ));
        assert_eq!(service.list().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_save_rolls_back_in_memory_change() {
        let kv = FlakyStore::default();
        let mut service = PatientService::open(&kv).unwrap();
        service.create(input("P1")).unwrap();

        kv.writes_fail.store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(matches!(
            service.create(input("P2")),
            Err(Error::StorageUnavailable(_))
        ));
        assert!(matches!(
            service.delete("P1"),
            Err(Error::StorageUnavailable(_))
        ));

        let codes = service
            .list()
            .iter()
            .map(|r| r.code.as_str())
            .collect::<Vec<_>>();
        assert_eq!(codes, vec!["P1"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reopen_restores_records_and_configuration() {
        let kv = MemoryKeyValueStore::new();
        {
            let mut service = PatientService::open(&kv).unwrap();
            service.create(input("P1")).unwrap();
            service
                .configure_remote(RemoteCredentials {
                    auth_token: Some("stored-token".to_string()),
                    owner: Some("clinic".to_string()),
                    repo: Some("records".to_string()),
                    ..RemoteCredentials::default()
                })
                .await
                .unwrap();
        }

        let reopened = PatientService::open(&kv).unwrap();
        assert_eq!(reopened.find(" P1 ").unwrap().code, "P1");
        assert_eq!(
            reopened.remote_credentials().owner.as_deref(),
            Some("clinic")
        );
        assert!(reopened.remote_credentials().has_auth_token());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn corrupt_local_data_fails_open() {
        let kv = MemoryKeyValueStore::new();
        kv.set(crate::db::PATIENTS_KEY, "[{\"code\":").unwrap();
        assert!(matches!(
            PatientService::open(&kv),
            Err(Error::Deserialization(_))
        ));
    }
}
