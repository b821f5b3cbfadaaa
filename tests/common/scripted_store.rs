//! Scripted store stub for driving the batch reprocessor in tests.
//!
//! Tracks how many calls are in flight, how many lookups and persists have
//! finished, and when each record reached its last store interaction.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use reprocessor_core::store::{RecordStore, StoreResult};
use reprocessor_core::{Record, RecordId, StoreError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct ScriptedStore {
    records: DashMap<RecordId, Record>,
    listed_extra: HashSet<RecordId>,
    listed_twice: Vec<RecordId>,
    failing_lookups: HashSet<RecordId>,
    failing_persists: HashSet<RecordId>,
    panicking: HashSet<RecordId>,
    fail_listing: AtomicBool,
    delay: Duration,
    random_delay_ms: Option<u64>,

    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    lookups_finished: AtomicUsize,
    persists_finished: AtomicUsize,
    persist_calls: AtomicUsize,
    finished_at: Mutex<Vec<(RecordId, Instant)>>,
}

impl ScriptedStore {
    /// Store holding records 1..=count, all `NEW`
    pub fn with_records(count: i64) -> Self {
        let store = Self::default();
        for id in 1..=count {
            store.records.insert(
                id,
                Record::new(format!("record-{id}"), "desc", format!("r{id}@mail.com"))
                    .with_id(id),
            );
        }
        store
    }

    pub fn with_status(self, tag: &str) -> Self {
        for mut entry in self.records.iter_mut() {
            entry.value_mut().status = tag.to_string();
        }
        self
    }

    /// Ids that appear in the listing but have no row
    pub fn with_missing(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        for id in ids {
            self.records.remove(&id);
            self.listed_extra.insert(id);
        }
        self
    }

    /// Ids the listing reports a second time
    pub fn with_duplicate_listing(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.listed_twice.extend(ids);
        self
    }

    pub fn with_failing_lookups(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.failing_lookups.extend(ids);
        self
    }

    pub fn with_failing_persists(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.failing_persists.extend(ids);
        self
    }

    pub fn with_panicking(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.panicking.extend(ids);
        self
    }

    pub fn with_failing_listing(self) -> Self {
        self.fail_listing.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Uniform random delay in `0..=max_ms` per call
    pub fn with_random_delay(mut self, max_ms: u64) -> Self {
        self.random_delay_ms = Some(max_ms);
        self
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn lookups_finished(&self) -> usize {
        self.lookups_finished.load(Ordering::SeqCst)
    }

    pub fn persists_finished(&self) -> usize {
        self.persists_finished.load(Ordering::SeqCst)
    }

    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    pub fn finished_at(&self) -> Vec<(RecordId, Instant)> {
        self.finished_at.lock().clone()
    }

    pub fn row(&self, id: RecordId) -> Option<Record> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    async fn simulate_io(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = match self.random_delay_ms {
            Some(max) => Duration::from_millis(fastrand::u64(0..=max)),
            None => self.delay,
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn mark_finished(&self, id: RecordId) {
        self.finished_at.lock().push((id, Instant::now()));
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn list_all_identifiers(&self) -> StoreResult<Vec<RecordId>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("listing refused".to_string()));
        }
        let mut ids: Vec<RecordId> = self.records.iter().map(|entry| *entry.key()).collect();
        ids.extend(self.listed_extra.iter().copied());
        ids.extend(self.listed_twice.iter().copied());
        ids.sort_unstable();
        Ok(ids)
    }

    async fn get_by_identifier(&self, id: RecordId) -> StoreResult<Option<Record>> {
        self.simulate_io().await;
        self.lookups_finished.fetch_add(1, Ordering::SeqCst);

        if self.panicking.contains(&id) {
            panic!("scripted panic for record {id}");
        }
        if self.failing_lookups.contains(&id) {
            self.mark_finished(id);
            return Err(StoreError::Query(format!("lookup refused for {id}")));
        }

        let row = self.row(id);
        if row.is_none() {
            self.mark_finished(id);
        }
        Ok(row)
    }

    async fn persist(&self, record: Record) -> StoreResult<Record> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_io().await;

        let id = record.id.expect("reprocessed records always carry an id");
        if self.failing_persists.contains(&id) {
            self.persists_finished.fetch_add(1, Ordering::SeqCst);
            self.mark_finished(id);
            return Err(StoreError::Write(format!("write refused for {id}")));
        }

        self.records.insert(id, record.clone());
        self.persists_finished.fetch_add(1, Ordering::SeqCst);
        self.mark_finished(id);
        Ok(record)
    }
}
