//! Remote configuration repository implementation

use crate::config::RemoteCredentials;
use crate::db::KeyValueStore;
use crate::error::Result;

const HOST_KEY: &str = "remoteHost";
const AUTH_TOKEN_KEY: &str = "remoteAuthToken";
const OWNER_KEY: &str = "remoteUser";
const REPO_KEY: &str = "remoteRepo";
const BRANCH_KEY: &str = "remoteBranch";
const PATH_KEY: &str = "remotePath";

/// Trait for remote configuration storage operations
pub trait ConfigRepository {
    /// Load configuration, defaults for anything never saved
    fn load(&self) -> Result<RemoteCredentials>;

    /// Save configuration
    fn save(&self, credentials: &RemoteCredentials) -> Result<()>;
}

/// `ConfigRepository` over any key-value slot store
pub struct KvConfigRepository<S> {
    store: S,
}

impl<S: KeyValueStore> KvConfigRepository<S> {
    /// Create a new repository with the given store
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    fn set_optional(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.store.set(key, value),
            None => self.store.remove(key),
        }
    }
}

impl<S: KeyValueStore> ConfigRepository for KvConfigRepository<S> {
    fn load(&self) -> Result<RemoteCredentials> {
        let mut credentials = RemoteCredentials::default();

        if let Some(value) = self.store.get(HOST_KEY)? {
            credentials.host = value;
        }
        credentials.auth_token = self.store.get(AUTH_TOKEN_KEY)?;
        credentials.owner = self.store.get(OWNER_KEY)?;
        credentials.repo = self.store.get(REPO_KEY)?;
        if let Some(value) = self.store.get(BRANCH_KEY)? {
            credentials.branch = value;
        }
        if let Some(value) = self.store.get(PATH_KEY)? {
            credentials.file_path = value;
        }

        Ok(credentials.normalized())
    }

    fn save(&self, credentials: &RemoteCredentials) -> Result<()> {
        let credentials = credentials.clone().normalized();
        self.store.set(HOST_KEY, &credentials.host)?;
        self.set_optional(AUTH_TOKEN_KEY, credentials.auth_token.as_deref())?;
        self.set_optional(OWNER_KEY, credentials.owner.as_deref())?;
        self.set_optional(REPO_KEY, credentials.repo.as_deref())?;
        self.store.set(BRANCH_KEY, &credentials.branch)?;
        self.store.set(PATH_KEY, &credentials.file_path)?;
        tracing::info!("Saved remote configuration");
        Ok(())
    }
}
