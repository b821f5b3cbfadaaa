#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Reprocessor Core
//!
//! Concurrent batch reprocessing of persisted records.
//!
//! ## Overview
//!
//! The [`BatchReprocessor`] lists every record identifier in a
//! [`RecordStore`], fans out one task per identifier over a bounded
//! [`WorkerPool`], marks each record `PROCESSED`, persists it, and resolves
//! only after every task reached a terminal outcome.
//!
//! ## Failure Model
//!
//! - A failure to list identifiers aborts the batch with
//!   [`ReprocessorError::BatchAborted`].
//! - A record that disappears between listing and lookup is skipped.
//! - A lookup or persist failure, timeout or panic for one record fails that
//!   record only. The [`BatchReport`] lists it; siblings are unaffected.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Batch fan-out/fan-in and the worker pool
//! - [`store`] - Storage collaborator trait and in-memory implementation
//! - [`models`] - The [`Record`] entity
//! - [`config`] - Layered configuration loading
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup and helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reprocessor_core::{BatchReprocessor, InMemoryRecordStore, Record, ReprocessorConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryRecordStore::new());
//! store.insert(Record::new("Unu", "first", "unu@mail.com"));
//!
//! let reprocessor = BatchReprocessor::from_config(store, ReprocessorConfig::default())?;
//! let report = reprocessor.reprocess_all_with_report().await?;
//! println!("processed {} of {}", report.processed_count(), report.total_identifiers);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod store;

pub use crate::config::{ConfigManager, ConfigurationError, LogFormat, ReprocessorConfig};
pub use crate::error::{ItemError, ReprocessorError, Result, StoreError};
pub use crate::models::{Record, RecordId};
pub use crate::orchestration::{
    BatchReport, BatchReprocessor, FailedRecord, SkipReason, SkippedRecord, TaskOutcome,
    WorkerPool,
};
pub use crate::store::{FaultPlan, InMemoryRecordStore, RecordStore};
