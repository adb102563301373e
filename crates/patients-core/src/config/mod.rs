//! Remote mirror configuration.
//!
//! `RemoteCredentials` identifies the versioned file that mirrors the record
//! collection: API host, bearer token, and the owner/repo/branch/path
//! coordinates. Values are persisted in the local key-value store by
//! `ConfigRepository` and are never embedded in records.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_REMOTE_HOST: &str = "https://api.github.com";
pub const DEFAULT_REMOTE_BRANCH: &str = "main";
pub const DEFAULT_REMOTE_PATH: &str = "patients.json";

/// Environment variable overriding the stored auth token for one session.
pub const REMOTE_TOKEN_ENV: &str = "PATIENTS_REMOTE_TOKEN";

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub host: String,
    pub auth_token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: String,
    pub file_path: String,
}

impl std::fmt::Debug for RemoteCredentials {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RemoteCredentials")
            .field("host", &self.host)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("file_path", &self.file_path)
            .finish()
    }
}

impl Default for RemoteCredentials {
    fn default() -> Self {
        Self {
            host: DEFAULT_REMOTE_HOST.to_string(),
            auth_token: None,
            owner: None,
            repo: None,
            branch: DEFAULT_REMOTE_BRANCH.to_string(),
            file_path: DEFAULT_REMOTE_PATH.to_string(),
        }
    }
}

impl RemoteCredentials {
    /// Whether a bearer token is available; sync refuses to run without one.
    pub fn has_auth_token(&self) -> bool {
        self.auth_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    /// Replace the token with `PATIENTS_REMOTE_TOKEN` when that is set.
    #[must_use]
    pub fn with_env_override(self) -> Self {
        self.with_token_override(std::env::var(REMOTE_TOKEN_ENV).ok())
    }

    #[must_use]
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = normalize_text_option(token) {
            self.auth_token = Some(token);
        }
        self
    }

    /// Trim every field, drop blanks, and fall back to defaults.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            host: normalize_text_option(Some(self.host)).map_or_else(
                || DEFAULT_REMOTE_HOST.to_string(),
                |host| host.trim_end_matches('/').to_string(),
            ),
            auth_token: normalize_text_option(self.auth_token),
            owner: normalize_text_option(self.owner),
            repo: normalize_text_option(self.repo),
            branch: normalize_text_option(Some(self.branch))
                .unwrap_or_else(|| DEFAULT_REMOTE_BRANCH.to_string()),
            file_path: normalize_text_option(Some(self.file_path))
                .map(|path| path.trim_matches('/').to_string())
                .filter(|path| !path.is_empty())
                .unwrap_or_else(|| DEFAULT_REMOTE_PATH.to_string()),
        }
    }

    /// Apply explicit overrides; fields left as `None` keep their value.
    #[must_use]
    pub fn apply(self, patch: RemoteCredentialsPatch) -> Self {
        Self {
            host: patch.host.unwrap_or(self.host),
            auth_token: patch.auth_token.or(self.auth_token),
            owner: patch.owner.or(self.owner),
            repo: patch.repo.or(self.repo),
            branch: patch.branch.unwrap_or(self.branch),
            file_path: patch.file_path.unwrap_or(self.file_path),
        }
        .normalized()
    }

    /// Check the target coordinates, returning the contents API URL.
    ///
    /// The auth token is checked first so callers can prompt for it.
    pub fn contents_url(&self) -> Result<String> {
        if !self.has_auth_token() {
            return Err(Error::MissingCredentials);
        }
        if !is_http_url(&self.host) {
            return Err(Error::InvalidConfiguration(
                "host must include http:// or https://".to_string(),
            ));
        }
        let owner = required(self.owner.as_deref(), "owner")?;
        let repo = required(self.repo.as_deref(), "repo")?;

        Ok(format!(
            "{}/repos/{owner}/{repo}/contents/{}",
            self.host.trim_end_matches('/'),
            self.file_path.trim_matches('/')
        ))
    }
}

/// Partial update for `RemoteCredentials`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteCredentialsPatch {
    pub host: Option<String>,
    pub auth_token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub file_path: Option<String>,
}

impl RemoteCredentialsPatch {
    pub const fn is_empty(&self) -> bool {
        self.host.is_none()
            && self.auth_token.is_none()
            && self.owner.is_none()
            && self.repo.is_none()
            && self.branch.is_none()
            && self.file_path.is_none()
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::InvalidConfiguration(format!("{field} must not be empty")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn configured() -> RemoteCredentials {
        RemoteCredentials {
            auth_token: Some("secret".to_string()),
            owner: Some("clinic".to_string()),
            repo: Some("records".to_string()),
            ..RemoteCredentials::default()
        }
    }

    #[test]
    fn debug_redacts_token() {
        let debug = format!("{:?}", configured());
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn contents_url_joins_coordinates() {
        assert_eq!(
            configured().contents_url().unwrap(),
            "https://api.github.com/repos/clinic/records/contents/patients.json"
        );
    }

    #[test]
    fn contents_url_requires_token_before_anything_else() {
        let credentials = RemoteCredentials::default();
        assert!(matches!(
            credentials.contents_url(),
            Err(Error::MissingCredentials)
        ));
    }

    #[test]
    fn contents_url_rejects_missing_owner_and_bad_host() {
        let missing_owner = RemoteCredentials {
            owner: None,
            ..configured()
        };
        assert!(matches!(
            missing_owner.contents_url(),
            Err(Error::InvalidConfiguration(_))
        ));

        let bad_host = RemoteCredentials {
            host: "api.github.com".to_string(),
            ..configured()
        };
        assert!(matches!(
            bad_host.contents_url(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn normalized_restores_defaults_and_trims() {
        let credentials = RemoteCredentials {
            host: " https://ghe.example.com/api/v3/ ".to_string(),
            auth_token: Some("  ".to_string()),
            owner: Some(" clinic ".to_string()),
            repo: None,
            branch: String::new(),
            file_path: "/data/patients.json/".to_string(),
        }
        .normalized();

        assert_eq!(credentials.host, "https://ghe.example.com/api/v3");
        assert_eq!(credentials.auth_token, None);
        assert_eq!(credentials.owner.as_deref(), Some("clinic"));
        assert_eq!(credentials.branch, DEFAULT_REMOTE_BRANCH);
        assert_eq!(credentials.file_path, "data/patients.json");
    }

    #[test]
    fn apply_keeps_unpatched_fields() {
        let patched = configured().apply(RemoteCredentialsPatch {
            branch: Some("records".to_string()),
            ..RemoteCredentialsPatch::default()
        });
        assert_eq!(patched.branch, "records");
        assert_eq!(patched.owner.as_deref(), Some("clinic"));
        assert!(patched.has_auth_token());
    }

    #[test]
    fn token_override_ignores_blank_values() {
        let credentials = configured().with_token_override(Some("   ".to_string()));
        assert_eq!(credentials.auth_token.as_deref(), Some("secret"));

        let credentials = configured().with_token_override(Some("fresh".to_string()));
        assert_eq!(credentials.auth_token.as_deref(), Some("fresh"));
    }
}
