//! # Orchestration
//!
//! Batch fan-out over a bounded worker pool and fan-in of per-record outcomes.
//!
//! - [`batch_reprocessor`] drives one batch from identifier listing to the
//!   joined report.
//! - [`worker_pool`] caps how many records are in flight at once.
//! - [`types`] holds per-record outcomes and the batch report.

pub mod batch_reprocessor;
pub mod types;
pub mod worker_pool;

pub use batch_reprocessor::BatchReprocessor;
pub use types::{BatchReport, FailedRecord, SkipReason, SkippedRecord, TaskOutcome};
pub use worker_pool::{WorkerPermit, WorkerPool};
