//! In-memory record store with latency simulation and fault injection.

use super::{RecordStore, StoreResult};
use crate::error::StoreError;
use crate::models::{Record, RecordId};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Failures the store should simulate
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    /// Fail `list_all_identifiers`
    pub fail_listing: bool,
    /// Fail `get_by_identifier` for these ids
    pub failing_lookups: HashSet<RecordId>,
    /// Fail `persist` for these ids
    pub failing_persists: HashSet<RecordId>,
    /// Include these ids in listings but report them missing on lookup, as if
    /// they were deleted right after the listing
    pub vanishing: HashSet<RecordId>,
}

/// Concurrent in-memory store.
///
/// Rows live in a [`DashMap`] so lookups and writes from different workers
/// never contend on a single lock. Identifiers are assigned from an atomic
/// sequence starting at 1.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    records: DashMap<RecordId, Record>,
    next_id: AtomicI64,
    latency: RwLock<Duration>,
    faults: RwLock<FaultPlan>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicI64::new(1),
            latency: RwLock::new(Duration::ZERO),
            faults: RwLock::new(FaultPlan::default()),
        }
    }

    /// Simulated latency applied to every store call
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.write() = latency;
        self
    }

    pub fn with_faults(self, faults: FaultPlan) -> Self {
        *self.faults.write() = faults;
        self
    }

    pub fn set_faults(&self, faults: FaultPlan) {
        *self.faults.write() = faults;
    }

    /// Insert a record directly, assigning an id when it has none
    pub fn insert(&self, record: Record) -> Record {
        let record = self.assign_id(record);
        if let Some(id) = record.id {
            self.records.insert(id, record.clone());
        }
        record
    }

    pub fn get(&self, id: RecordId) -> Option<Record> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: RecordId) -> Option<Record> {
        self.records.remove(&id).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of all rows ordered by id
    pub fn snapshot(&self) -> Vec<Record> {
        let mut rows: Vec<Record> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|record| record.id);
        rows
    }

    fn assign_id(&self, mut record: Record) -> Record {
        match record.id {
            Some(id) => {
                // Keep the sequence ahead of explicitly seeded ids
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
            }
            None => {
                record.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
            }
        }
        record
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.read();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_all_identifiers(&self) -> StoreResult<Vec<RecordId>> {
        self.simulate_latency().await;

        if self.faults.read().fail_listing {
            return Err(StoreError::Unavailable(
                "simulated listing failure".to_string(),
            ));
        }

        let mut ids: Vec<RecordId> = self.records.iter().map(|entry| *entry.key()).collect();
        ids.extend(self.faults.read().vanishing.iter().copied());
        ids.sort_unstable();
        ids.dedup();
        debug!(count = ids.len(), "Listed record identifiers");
        Ok(ids)
    }

    async fn get_by_identifier(&self, id: RecordId) -> StoreResult<Option<Record>> {
        self.simulate_latency().await;

        {
            let faults = self.faults.read();
            if faults.failing_lookups.contains(&id) {
                return Err(StoreError::Query(format!(
                    "simulated lookup failure for record {id}"
                )));
            }
            if faults.vanishing.contains(&id) {
                return Ok(None);
            }
        }

        Ok(self.get(id))
    }

    async fn persist(&self, record: Record) -> StoreResult<Record> {
        self.simulate_latency().await;

        let Some(id) = record.id else {
            return Ok(self.insert(record));
        };

        if self.faults.read().failing_persists.contains(&id) {
            return Err(StoreError::Write(format!(
                "simulated write failure for record {id}"
            )));
        }

        // Update in place under the row lock; a removed row is not recreated
        match self.records.get_mut(&id) {
            Some(mut row) => {
                *row = record.clone();
                Ok(record)
            }
            None => Err(StoreError::Write(format!("record {id} does not exist"))),
        }
    }
}
