// Error types for redbox-rs

use thiserror::Error;

/// Result type alias for redbox-rs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying or opening an error overlay.
///
/// Extraction-level failures (`ElementNotFound`, `EvaluationFailed`) are
/// recovered inside the harness into per-field absence sentinels or presence
/// outcomes; they never fail a test on their own. Snapshot mismatches are not
/// errors at all: they surface as [`TestOutcome::Fail`](crate::TestOutcome).
#[derive(Debug, Error)]
pub enum Error {
    /// A DOM region the accessor depends on does not exist
    ///
    /// Contains the selector that was used to locate the region.
    #[error("Element not found: selector '{0}'")]
    ElementNotFound(String),

    /// The UI action to expand a collapsed overlay could not be performed
    ///
    /// Typically there is no toast element to click because no overlay is
    /// collapsed (or none exists at all).
    #[error("Failed to open collapsed overlay: {0}")]
    OpenFailed(String),

    /// In-page script evaluation failed or returned an unexpected payload
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    /// Timeout waiting for an overlay condition
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A snapshot key was empty or otherwise unusable as a store key
    #[error("Invalid snapshot key: {0}")]
    InvalidSnapshotKey(String),

    /// I/O error (snapshot store persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }
}
