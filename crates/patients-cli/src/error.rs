use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] patients_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Sync task did not finish: {0}")]
    SyncTask(#[from] tokio::task::JoinError),
    #[error("Patient code cannot be empty")]
    EmptyCode,
    #[error("Deletion cancelled")]
    DeleteCancelled,
    #[error("Refusing to delete without confirmation; pass --yes when stdin is not a terminal")]
    ConfirmationUnavailable,
    #[error("Nothing to configure; pass at least one of --token, --owner, --repo, --branch, --path, --host")]
    NothingToConfigure,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Remote sync is not configured. Run `patients config set --token <TOKEN> --owner <OWNER> --repo <REPO>` or set PATIENTS_REMOTE_TOKEN."
    )]
    SyncNotConfigured,
}
