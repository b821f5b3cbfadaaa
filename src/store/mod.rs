//! # Record Store
//!
//! The storage collaborator consumed by the batch reprocessor.
//!
//! Persistence itself lives outside this crate. [`RecordStore`] is the seam the
//! reprocessor depends on, and [`InMemoryRecordStore`] is a DashMap-backed
//! implementation used by tests and the `reprocess` binary.

pub mod memory;

use crate::error::StoreError;
use crate::models::{Record, RecordId};
use async_trait::async_trait;

pub use memory::{FaultPlan, InMemoryRecordStore};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage operations required by the batch reprocessor.
///
/// Implementations must be safe to call concurrently from every worker of a
/// batch.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record identifier currently in the store
    async fn list_all_identifiers(&self) -> StoreResult<Vec<RecordId>>;

    /// Look up a record. A missing record is `Ok(None)`, not an error.
    async fn get_by_identifier(&self, id: RecordId) -> StoreResult<Option<Record>>;

    /// Write a record back, assigning an identifier when it has none.
    ///
    /// A record that carries an identifier updates the existing row. If that
    /// row no longer exists the write fails with [`StoreError::Write`].
    async fn persist(&self, record: Record) -> StoreResult<Record>;
}
