//! Error types for job supervision.
//!
//! Supervisors never surface per-candidate failures; these errors travel
//! between the service layer and its stores, and get logged at the sweep.

use thiserror::Error;

/// Job supervision errors.
#[derive(Error, Debug)]
pub enum JobError {
    /// No job row with this id.
    #[error("Job not found: {0}")]
    NotFound(u64),

    /// Compare-and-swap lost against a concurrent writer.
    #[error("Stale record: job {id} changed concurrently (expected lock_version {expected})")]
    StaleRecord {
        /// Job row id.
        id: u64,
        /// Version the writer read before mutating.
        expected: u64,
    },

    /// Work queue backend failure.
    #[error("Queue error: {0}")]
    Queue(String),

    /// Record store failure.
    #[error("Store error: {0}")]
    Store(String),

    /// Target entity could not be resolved.
    #[error("Target lookup error: {0}")]
    Target(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Message arguments or options could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for JobError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Result type for job supervision operations.
pub type Result<T> = std::result::Result<T, JobError>;
