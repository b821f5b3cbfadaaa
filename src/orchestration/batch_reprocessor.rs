//! # Batch Reprocessor
//!
//! Reprocesses every record in the store and resolves only once each record
//! has reached a terminal outcome.
//!
//! ## Flow
//!
//! 1. List all identifiers. A listing failure aborts the batch with
//!    [`ReprocessorError::BatchAborted`]; nothing else does.
//! 2. Spawn one task per identifier. Each task waits for a worker permit,
//!    applies the processing delay, looks the record up, marks it `PROCESSED`
//!    and persists it. Lookup and persist failures, timeouts and panics are
//!    converted into a failed outcome for that record only.
//! 3. Successful records are inserted into a [`DashMap`] keyed by record id,
//!    which is the only state shared between tasks.
//! 4. All task handles are joined with `join_all` before the report is built,
//!    so a caller never observes a partially filled result.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reprocessor_core::orchestration::BatchReprocessor;
//! use reprocessor_core::store::InMemoryRecordStore;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(InMemoryRecordStore::new());
//! let reprocessor = BatchReprocessor::with_defaults(store);
//! let records = reprocessor.reprocess_all().await.unwrap();
//! assert!(records.iter().all(|record| record.is_processed()));
//! # });
//! ```

use super::types::{BatchReport, FailedRecord, SkipReason, SkippedRecord, TaskOutcome};
use super::worker_pool::WorkerPool;
use crate::config::ReprocessorConfig;
use crate::constants::events;
use crate::error::{ItemError, ReprocessorError, Result};
use crate::logging::{log_batch_operation, log_item_failure};
use crate::models::{Record, RecordId};
use crate::store::RecordStore;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info_span, instrument, warn, Instrument};
use uuid::Uuid;

/// Reprocesses all records of a store over a bounded worker pool
pub struct BatchReprocessor {
    store: Arc<dyn RecordStore>,
    pool: WorkerPool,
    config: ReprocessorConfig,
}

impl std::fmt::Debug for BatchReprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchReprocessor")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BatchReprocessor {
    pub fn new(store: Arc<dyn RecordStore>, pool: WorkerPool, config: ReprocessorConfig) -> Self {
        Self {
            store,
            pool,
            config,
        }
    }

    /// Default configuration on the process-wide shared pool
    pub fn with_defaults(store: Arc<dyn RecordStore>) -> Self {
        Self::new(store, WorkerPool::shared(), ReprocessorConfig::default())
    }

    /// Validate `config` and create a dedicated pool sized from it
    pub fn from_config(store: Arc<dyn RecordStore>, config: ReprocessorConfig) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.worker_pool_size);
        Ok(Self::new(store, pool, config))
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn config(&self) -> &ReprocessorConfig {
        &self.config
    }

    /// Reprocess every record and return those that were processed
    pub async fn reprocess_all(&self) -> Result<Vec<Record>> {
        self.reprocess_all_with_report()
            .await
            .map(BatchReport::into_records)
    }

    /// Reprocess every record and return the full per-record report
    pub async fn reprocess_all_with_report(&self) -> Result<BatchReport> {
        self.run_batch(Uuid::new_v4(), CancellationToken::new())
            .await
    }

    /// Reprocess every record until `cancel` fires.
    ///
    /// After cancellation no further record tasks are started and records still
    /// waiting for a worker are reported as skipped. Records already holding a
    /// worker run to completion.
    pub async fn reprocess_all_with_cancellation(
        &self,
        cancel: CancellationToken,
    ) -> Result<BatchReport> {
        self.run_batch(Uuid::new_v4(), cancel).await
    }

    /// Start a batch in the background and return a handle to its result
    pub fn spawn_reprocess_all(self: &Arc<Self>) -> JoinHandle<Result<Vec<Record>>> {
        let reprocessor = Arc::clone(self);
        tokio::spawn(async move { reprocessor.reprocess_all().await })
    }

    #[instrument(skip(self, cancel))]
    async fn run_batch(&self, batch_id: Uuid, cancel: CancellationToken) -> Result<BatchReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        let mut ids = match self.store.list_all_identifiers().await {
            Ok(ids) => ids,
            Err(source) => {
                error!(
                    operation = events::BATCH_ABORTED,
                    batch_id = %batch_id,
                    error = %source,
                    "Failed to list record identifiers"
                );
                return Err(ReprocessorError::BatchAborted { source });
            }
        };

        // One task per distinct id, whatever the store's listing contains
        let listed = ids.len();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != listed {
            warn!(
                batch_id = %batch_id,
                listed = listed,
                distinct = ids.len(),
                "Store listed duplicate record identifiers"
            );
        }

        let total = ids.len();
        log_batch_operation(events::BATCH_STARTED, batch_id, total, 0, 0, 0, None);

        let processed: Arc<DashMap<RecordId, Record>> = Arc::new(DashMap::with_capacity(total));
        let task = RecordTask {
            store: self.store.clone(),
            pool: self.pool.clone(),
            processed: processed.clone(),
            cancel: cancel.clone(),
            processing_delay: self.config.processing_delay(),
            item_timeout: self.config.item_timeout(),
            batch_id,
        };

        let mut skipped = Vec::new();
        let mut launched = Vec::with_capacity(total);
        let mut handles = Vec::with_capacity(total);

        for id in ids {
            if cancel.is_cancelled() {
                skipped.push(SkippedRecord {
                    record_id: id,
                    reason: SkipReason::Cancelled,
                });
                continue;
            }

            let span = info_span!("reprocess_record", batch_id = %batch_id, record_id = id);
            handles.push(tokio::spawn(task.clone().run(id).instrument(span)));
            launched.push(id);
        }

        // Fan-in: nothing below runs until every launched task is terminal
        let joined = futures::future::join_all(handles).await;

        let outcomes: Vec<TaskOutcome> = launched
            .into_iter()
            .zip(joined)
            .map(|(id, result)| {
                result.unwrap_or_else(|join_error| {
                    let error = ItemError::Panicked {
                        record_id: id,
                        reason: join_error.to_string(),
                    };
                    log_item_failure(batch_id, &error);
                    TaskOutcome::Failed(error)
                })
            })
            .collect();
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();

        let mut failed = Vec::new();
        for outcome in outcomes {
            match outcome {
                TaskOutcome::Success(_) => {}
                TaskOutcome::Skipped { record_id, reason } => {
                    skipped.push(SkippedRecord { record_id, reason })
                }
                TaskOutcome::Failed(error) => failed.push(FailedRecord::from(&error)),
            }
        }

        let mut records: Vec<Record> = processed
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.id);
        debug_assert_eq!(records.len(), succeeded);

        skipped.sort_by_key(|skip| skip.record_id);
        failed.sort_by_key(|failure| failure.record_id);

        let duration_ms = start.elapsed().as_millis() as u64;
        log_batch_operation(
            events::BATCH_COMPLETED,
            batch_id,
            total,
            records.len(),
            skipped.len(),
            failed.len(),
            Some(duration_ms),
        );

        Ok(BatchReport {
            batch_id,
            started_at,
            completed_at: Utc::now(),
            duration_ms,
            total_identifiers: total,
            processed: records,
            skipped,
            failed,
        })
    }
}

/// Everything one per-record task needs, cloned into each spawned task
#[derive(Clone)]
struct RecordTask {
    store: Arc<dyn RecordStore>,
    pool: WorkerPool,
    processed: Arc<DashMap<RecordId, Record>>,
    cancel: CancellationToken,
    processing_delay: Duration,
    item_timeout: Option<Duration>,
    batch_id: Uuid,
}

impl RecordTask {
    async fn run(self, id: RecordId) -> TaskOutcome {
        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return TaskOutcome::Skipped {
                    record_id: id,
                    reason: SkipReason::Cancelled,
                };
            }
            permit = self.pool.acquire() => permit,
        };

        let _permit = match permit {
            Ok(permit) => permit,
            Err(_) => return self.fail(ItemError::WorkerUnavailable { record_id: id }),
        };

        let result = match self.item_timeout {
            Some(limit) => tokio::time::timeout(limit, self.process(id))
                .await
                .unwrap_or_else(|_| {
                    Err(ItemError::Timeout {
                        record_id: id,
                        timeout_ms: limit.as_millis() as u64,
                    })
                }),
            None => self.process(id).await,
        };

        match result {
            Ok(Some(record)) => {
                self.processed.insert(id, record.clone());
                TaskOutcome::Success(record)
            }
            Ok(None) => {
                debug!(record_id = id, "Record no longer exists, skipping");
                TaskOutcome::Skipped {
                    record_id: id,
                    reason: SkipReason::NotFound,
                }
            }
            Err(error) => self.fail(error),
        }
    }

    async fn process(&self, id: RecordId) -> std::result::Result<Option<Record>, ItemError> {
        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        let record = self
            .store
            .get_by_identifier(id)
            .await
            .map_err(|source| ItemError::Lookup {
                record_id: id,
                source,
            })?;

        let Some(mut record) = record else {
            return Ok(None);
        };

        record.mark_processed();
        let saved = self
            .store
            .persist(record)
            .await
            .map_err(|source| ItemError::Persist {
                record_id: id,
                source,
            })?;

        Ok(Some(saved))
    }

    fn fail(&self, error: ItemError) -> TaskOutcome {
        log_item_failure(self.batch_id, &error);
        TaskOutcome::Failed(error)
    }
}
