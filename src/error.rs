// ⚠️ Error Taxonomy
// One enum for everything a check cycle can fail with

use std::path::PathBuf;

/// WatchError - Failures surfaced by the pipeline
///
/// "No table found" is deliberately absent: an empty snapshot is a valid
/// result, not an error.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Network failure while fetching or notifying
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered, but not with a 2xx
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Snapshot or change log could not be written/read
    #[error("persistence error at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured snapshot file could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Notifier rejected the message (never fatal to a cycle)
    #[error("notification failed: {0}")]
    Notification(String),
}

impl WatchError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WatchError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// True for errors that come from talking to the source site
    pub fn is_transport(&self) -> bool {
        matches!(self, WatchError::Transport(_) | WatchError::Status { .. })
    }
}
