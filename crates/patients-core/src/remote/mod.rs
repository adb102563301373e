//! Versioned-file HTTP client for the remote snapshot.
//!
//! Talks to a GitHub-style contents API: `GET` returns the file's `sha` and
//! base64 content, `PUT` overwrites it, optionally conditioned on a previous
//! `sha`. The `sha` is carried around as an opaque `VersionToken`.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::RemoteCredentials;
use crate::error::{Error, Result};
use crate::models::PatientRecord;
use crate::util::compact_text;

const ACCEPT_CONTENTS: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("patients/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Opaque identifier of a remote content revision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the remote currently holds at the target path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteVersion {
    Existing(VersionToken),
    Missing,
}

impl RemoteVersion {
    pub fn into_token(self) -> Option<VersionToken> {
        match self {
            Self::Existing(token) => Some(token),
            Self::Missing => None,
        }
    }
}

/// Decoded remote file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub token: VersionToken,
    pub records: Vec<PatientRecord>,
}

/// Build the shared HTTP client used for every contents request.
pub fn build_http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

#[derive(Clone)]
pub struct ContentsClient {
    url: String,
    branch: String,
    auth_token: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for ContentsClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ContentsClient")
            .field("url", &self.url)
            .field("branch", &self.branch)
            .field("auth_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ContentsClient {
    pub fn new(credentials: &RemoteCredentials) -> Result<Self> {
        Self::with_http_client(credentials, build_http_client()?)
    }

    /// Reuse an existing HTTP client (connection pool) for this target.
    pub fn with_http_client(
        credentials: &RemoteCredentials,
        client: reqwest::Client,
    ) -> Result<Self> {
        let url = credentials.contents_url()?;
        let auth_token = credentials
            .auth_token
            .as_deref()
            .map(str::trim)
            .ok_or(Error::MissingCredentials)?
            .to_string();

        Ok(Self {
            url,
            branch: credentials.branch.clone(),
            auth_token,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Read the current version token; a 404 means the file does not exist yet.
    pub async fn fetch_version_token(&self) -> Result<RemoteVersion> {
        Ok(self
            .fetch_file()
            .await?
            .map_or(RemoteVersion::Missing, |file| {
                RemoteVersion::Existing(VersionToken(file.sha))
            }))
    }

    /// Download and decode the remote record collection.
    pub async fn fetch_snapshot(&self) -> Result<Option<RemoteSnapshot>> {
        let Some(file) = self.fetch_file().await? else {
            return Ok(None);
        };
        let encoded = file.content.ok_or_else(|| {
            Error::RemoteRead("response did not include file content".to_string())
        })?;
        let text = decode_content(&encoded)?;
        let records = serde_json::from_str(&text)
            .map_err(|error| Error::Deserialization(format!("remote snapshot: {error}")))?;

        Ok(Some(RemoteSnapshot {
            token: VersionToken(file.sha),
            records,
        }))
    }

    /// Overwrite the remote file with `content`.
    ///
    /// When `token` is given it is sent as the `sha` precondition and the
    /// remote rejects the write if the file changed since. Returns the token
    /// of the newly written revision.
    pub async fn write_snapshot(
        &self,
        content: &str,
        token: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken> {
        let body = WriteFileRequest {
            message,
            content: encode_content(content),
            branch: &self.branch,
            sha: token.map(VersionToken::as_str),
        };

        let response = self
            .client
            .put(&self.url)
            .bearer_auth(&self.auth_token)
            .header(header::ACCEPT, ACCEPT_CONTENTS)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::RemoteWrite(parse_api_error(status, &text)));
        }

        let payload = serde_json::from_str::<WriteFileResponse>(&text).map_err(|error| {
            Error::RemoteWrite(format!("unexpected write response: {error}"))
        })?;
        tracing::debug!("Remote snapshot written at {}", self.url);
        Ok(VersionToken(payload.content.sha))
    }

    async fn fetch_file(&self) -> Result<Option<FileResponse>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("ref", self.branch.as_str())])
            .bearer_auth(&self.auth_token)
            .header(header::ACCEPT, ACCEPT_CONTENTS)
            .send()
            .await
            .map_err(|error| Error::RemoteRead(error.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|error| Error::RemoteRead(error.to_string()))?;
        if !status.is_success() {
            return Err(Error::RemoteRead(parse_api_error(status, &text)));
        }

        serde_json::from_str::<FileResponse>(&text)
            .map(Some)
            .map_err(|error| Error::RemoteRead(format!("unexpected file metadata: {error}")))
    }
}

/// Base64 transport encoding of UTF-8 JSON text, as the contents API expects.
pub fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

/// Inverse of `encode_content`; tolerates the line breaks the API inserts.
pub fn decode_content(encoded: &str) -> Result<String> {
    let compact = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|error| Error::Deserialization(format!("remote content is not base64: {error}")))?;
    String::from_utf8(bytes)
        .map_err(|error| Error::Deserialization(format!("remote content is not UTF-8: {error}")))
}

#[derive(Debug, Serialize)]
struct WriteFileRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    sha: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WriteFileResponse {
    content: WrittenFile,
}

#[derive(Debug, Deserialize)]
struct WrittenFile {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
