//! Shared sync status types.

use std::fmt;

/// Status of the remote mirror, as shown to the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
    /// Last write succeeded; reverts to `Idle` after a short display timeout.
    Synced,
    /// Last attempt failed; stays until the next attempt starts.
    Failed(String),
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => Ok(()),
            Self::Syncing => f.write_str("Syncing..."),
            Self::Synced => f.write_str("Synced"),
            Self::Failed(message) => write!(f, "Error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_status_text() {
        assert_eq!(SyncState::Idle.to_string(), "");
        assert_eq!(SyncState::Synced.to_string(), "Synced");
        assert_eq!(
            SyncState::Failed("Bad credentials (401)".to_string()).to_string(),
            "Error: Bad credentials (401)"
        );
        assert_eq!(SyncState::Syncing.to_string(), "Syncing...");
    }
}
