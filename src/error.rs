//! # Error Types
//!
//! Three layers of failure exist in a reprocessing batch:
//!
//! - [`StoreError`] is raised by the storage collaborator.
//! - [`ItemError`] is a per-record failure. It is absorbed by the batch and only
//!   surfaces through the batch report.
//! - [`ReprocessorError`] is what callers of the batch operation see. Only an
//!   identifier listing failure aborts a batch.

use crate::config::ConfigurationError;
use crate::models::RecordId;
use thiserror::Error;

/// Failures reported by a [`RecordStore`](crate::store::RecordStore)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Write failed: {0}")]
    Write(String),
}

/// Failure of a single record within a batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("Lookup of record {record_id} failed: {source}")]
    Lookup {
        record_id: RecordId,
        #[source]
        source: StoreError,
    },

    #[error("Persisting record {record_id} failed: {source}")]
    Persist {
        record_id: RecordId,
        #[source]
        source: StoreError,
    },

    #[error("Record {record_id} timed out after {timeout_ms}ms")]
    Timeout { record_id: RecordId, timeout_ms: u64 },

    #[error("Worker for record {record_id} panicked: {reason}")]
    Panicked { record_id: RecordId, reason: String },

    #[error("No worker available for record {record_id}: pool closed")]
    WorkerUnavailable { record_id: RecordId },
}

impl ItemError {
    pub fn record_id(&self) -> RecordId {
        match self {
            ItemError::Lookup { record_id, .. }
            | ItemError::Persist { record_id, .. }
            | ItemError::Timeout { record_id, .. }
            | ItemError::Panicked { record_id, .. }
            | ItemError::WorkerUnavailable { record_id } => *record_id,
        }
    }

    /// Short machine-readable code for logs and reports
    pub fn code(&self) -> &'static str {
        match self {
            ItemError::Lookup { .. } => "LOOKUP_ERROR",
            ItemError::Persist { .. } => "PERSIST_ERROR",
            ItemError::Timeout { .. } => "ITEM_TIMEOUT",
            ItemError::Panicked { .. } => "WORKER_PANIC",
            ItemError::WorkerUnavailable { .. } => "WORKER_UNAVAILABLE",
        }
    }
}

/// Errors surfaced to callers of the batch reprocessor
#[derive(Debug, Error)]
pub enum ReprocessorError {
    /// Identifier listing failed, nothing was processed
    #[error("Batch aborted: listing record identifiers failed: {source}")]
    BatchAborted {
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Worker pool closed")]
    WorkerPoolClosed,
}

pub type Result<T> = std::result::Result<T, ReprocessorError>;
