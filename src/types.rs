//! Core types and events for envirocar-client

use serde::{Deserialize, Serialize};

/// Raw outcome of one fetch in a batch
///
/// `None` marks an item whose fetch failed; the failure has already been
/// logged. A `Vec<RawResult>` is always aligned with the request list.
pub type RawResult = Option<String>;

/// Event emitted while a batch of requests is downloaded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// A batch started
    BatchStarted {
        /// Number of requests in the batch
        total: usize,
    },

    /// One request of the batch finished
    ItemCompleted {
        /// Position of the request in the batch
        index: usize,
        /// Whether a body was obtained
        success: bool,
    },

    /// All requests of the batch finished
    BatchFinished {
        /// Requests that produced a body
        succeeded: usize,
        /// Requests that ended as absent placeholders
        failed: usize,
    },

    /// The batch itself broke down and was replaced by an empty result
    ///
    /// Distinguishes a broken batch from one that legitimately matched nothing.
    BatchAborted {
        /// Description of the failure
        error: String,
    },
}

/// Identifier of a track on the service
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    /// Create a new TrackId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
