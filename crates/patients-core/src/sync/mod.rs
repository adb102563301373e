//! Remote mirror orchestration.
//!
//! Every local mutation publishes a full snapshot of the collection and spawns
//! a sync task. Tasks are serialized by a single-flight guard held across the
//! whole read-token-then-write round trip, so two syncs never race on the
//! version token. A task that reaches the guard after its snapshot was already
//! replaced by a newer one writes the newest snapshot instead. A task that
//! finds nothing pending reports the outcome of the write that carried its
//! snapshot: `Superseded` when that write landed, its error when it failed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::config::RemoteCredentials;
use crate::error::{Error, Result};
use crate::export::render_json_export;
use crate::models::PatientRecord;
use crate::remote::{build_http_client, ContentsClient, VersionToken};
use crate::state::SyncState;

/// How long `Synced` stays visible before reverting to `Idle`.
pub const STATUS_DISPLAY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote now holds the latest snapshot at this version.
    Synced(VersionToken),
    /// A concurrent task already wrote a snapshot at least as new.
    Superseded,
}

/// Handle to a spawned sync task
pub type SyncHandle = JoinHandle<Result<SyncOutcome>>;

#[derive(Clone)]
pub struct SyncOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    credentials: RwLock<RemoteCredentials>,
    http: reqwest::Client,
    flight: AsyncMutex<Flight>,
    pending: Mutex<Option<Pending>>,
    next_generation: AtomicU64,
    epoch: AtomicU64,
    state: watch::Sender<SyncState>,
    status_timeout: Duration,
}

#[derive(Default)]
struct Flight {
    token: Option<VersionToken>,
    last_written: Option<Written>,
}

/// Outcome of the most recent round trip, keyed by the generation it carried.
struct Written {
    generation: u64,
    result: std::result::Result<VersionToken, String>,
}

impl Flight {
    /// Outcome for a task whose snapshot was taken by another task.
    fn outcome_for(&self, generation: u64) -> Result<SyncOutcome> {
        match &self.last_written {
            Some(Written {
                generation: written,
                result: Err(message),
            }) if *written >= generation => Err(Error::RemoteWrite(message.clone())),
            _ => Ok(SyncOutcome::Superseded),
        }
    }
}

struct Pending {
    generation: u64,
    content: String,
}

impl SyncOrchestrator {
    pub fn new(credentials: RemoteCredentials) -> Result<Self> {
        Self::with_status_timeout(credentials, STATUS_DISPLAY_TIMEOUT)
    }

    pub fn with_status_timeout(
        credentials: RemoteCredentials,
        status_timeout: Duration,
    ) -> Result<Self> {
        let (state, _) = watch::channel(SyncState::Idle);
        Ok(Self {
            inner: Arc::new(Inner {
                credentials: RwLock::new(credentials.normalized()),
                http: build_http_client()?,
                flight: AsyncMutex::new(Flight::default()),
                pending: Mutex::new(None),
                next_generation: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
                state,
                status_timeout,
            }),
        })
    }

    pub fn credentials(&self) -> RemoteCredentials {
        self.inner
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point the mirror at a new target. The cached version token is dropped.
    pub async fn set_credentials(&self, credentials: RemoteCredentials) {
        let mut flight = self.inner.flight.lock().await;
        *self
            .inner
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credentials.normalized();
        flight.token = None;
    }

    /// Token returned by the last successful round trip, if any.
    pub async fn version_token(&self) -> Option<VersionToken> {
        self.inner.flight.lock().await.token.clone()
    }

    pub fn state(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Mirror `records` to the remote and wait for the result.
    pub async fn sync(&self, records: &[PatientRecord]) -> Result<SyncOutcome> {
        let (credentials, generation) = self.prepare(records)?;
        self.run(credentials, generation).await
    }

    /// Mirror `records` from a background task.
    ///
    /// The snapshot is captured before returning, so later mutations never
    /// leak into this task's payload. Must be called within a Tokio runtime.
    pub fn spawn_sync(&self, records: &[PatientRecord]) -> SyncHandle {
        let prepared = self.prepare(records);
        let this = self.clone();
        tokio::spawn(async move {
            let (credentials, generation) = prepared?;
            this.run(credentials, generation).await
        })
    }

    /// Fetch the remote collection, remembering its version token.
    ///
    /// Returns `None` when no remote file exists yet.
    pub async fn pull(&self) -> Result<Option<Vec<PatientRecord>>> {
        let credentials = self.ready_credentials()?;
        let mut flight = self.inner.flight.lock().await;
        let client = ContentsClient::with_http_client(&credentials, self.inner.http.clone())?;
        let snapshot = client.fetch_snapshot().await?;
        flight.token = snapshot.as_ref().map(|snapshot| snapshot.token.clone());
        Ok(snapshot.map(|snapshot| snapshot.records))
    }

    fn prepare(&self, records: &[PatientRecord]) -> Result<(RemoteCredentials, u64)> {
        let credentials = self.ready_credentials()?;
        let content = render_json_export(records)?;
        let generation = self.publish(content);
        Ok((credentials, generation))
    }

    fn ready_credentials(&self) -> Result<RemoteCredentials> {
        let credentials = self.credentials();
        if credentials.has_auth_token() {
            Ok(credentials)
        } else {
            Err(Error::MissingCredentials)
        }
    }

    fn publish(&self, content: String) -> u64 {
        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        *pending = Some(Pending {
            generation,
            content,
        });
        generation
    }

    fn take_pending(&self) -> Option<Pending> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    async fn run(&self, credentials: RemoteCredentials, generation: u64) -> Result<SyncOutcome> {
        let mut flight = self.inner.flight.lock().await;
        let Some(pending) = self.take_pending() else {
            tracing::debug!("Snapshot {generation} already carried by another sync");
            return flight.outcome_for(generation);
        };

        let epoch = self.begin_syncing();
        match self.round_trip(&credentials, &pending.content).await {
            Ok(token) => {
                tracing::info!(
                    "Remote snapshot {} synced at version {}",
                    pending.generation,
                    token
                );
                flight.token = Some(token.clone());
                flight.last_written = Some(Written {
                    generation: pending.generation,
                    result: Ok(token.clone()),
                });
                self.finish_synced(epoch);
                Ok(SyncOutcome::Synced(token))
            }
            Err(error) => {
                tracing::warn!("Remote sync failed: {error}");
                let message = match &error {
                    Error::RemoteWrite(message) => message.clone(),
                    other => other.to_string(),
                };
                flight.last_written = Some(Written {
                    generation: pending.generation,
                    result: Err(message),
                });
                self.inner
                    .state
                    .send_replace(SyncState::Failed(error.to_string()));
                Err(error)
            }
        }
    }

    async fn round_trip(
        &self,
        credentials: &RemoteCredentials,
        content: &str,
    ) -> Result<VersionToken> {
        let client = ContentsClient::with_http_client(credentials, self.inner.http.clone())?;

        // A failed read is treated like "no file yet": the write then goes out
        // without a precondition.
        let token = match client.fetch_version_token().await {
            Ok(version) => version.into_token(),
            Err(error) => {
                tracing::warn!(
                    "Could not read remote version of {}: {error}. Writing without a version precondition; an existing remote file may be overwritten",
                    client.url()
                );
                None
            }
        };

        let message = commit_message(&Local::now());
        client
            .write_snapshot(content, token.as_ref(), &message)
            .await
    }

    fn begin_syncing(&self) -> u64 {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_replace(SyncState::Syncing);
        epoch
    }

    fn finish_synced(&self, epoch: u64) {
        self.inner.state.send_replace(SyncState::Synced);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.status_timeout).await;
            if inner.epoch.load(Ordering::SeqCst) != epoch {
                return;
            }
            inner.state.send_if_modified(|state| {
                if *state == SyncState::Synced {
                    *state = SyncState::Idle;
                    true
                } else {
                    false
                }
            });
        });
    }
}

/// Human-readable commit message stamped with the local time.
pub fn commit_message<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("Patient data update - {}", now.format("%Y-%m-%d %H:%M:%S"))
}
