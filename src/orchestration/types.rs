//! Per-record outcomes and the aggregated batch report.

use crate::error::ItemError;
use crate::models::{Record, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a record contributed nothing to a batch without failing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The record vanished between listing and lookup
    NotFound,
    /// The batch was cancelled before this record got a worker
    Cancelled,
}

/// Terminal outcome of one per-record task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Success(Record),
    Skipped {
        record_id: RecordId,
        reason: SkipReason,
    },
    Failed(ItemError),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub record_id: RecordId,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRecord {
    pub record_id: RecordId,
    pub error_code: String,
    pub message: String,
}

impl From<&ItemError> for FailedRecord {
    fn from(error: &ItemError) -> Self {
        Self {
            record_id: error.record_id(),
            error_code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Result of one completed batch.
///
/// Built only after every per-record task reached a terminal outcome, so
/// `processed.len() + skipped.len() + failed.len() == total_identifiers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub total_identifiers: usize,
    /// Successfully reprocessed records, ordered by id
    pub processed: Vec<Record>,
    pub skipped: Vec<SkippedRecord>,
    pub failed: Vec<FailedRecord>,
}

impl BatchReport {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<RecordId> {
        self.failed.iter().map(|failure| failure.record_id).collect()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_failed_record_from_item_error() {
        let error = ItemError::Lookup {
            record_id: 2,
            source: StoreError::Query("boom".to_string()),
        };
        let failed = FailedRecord::from(&error);
        assert_eq!(failed.record_id, 2);
        assert_eq!(failed.error_code, "LOOKUP_ERROR");
        assert!(failed.message.contains("boom"));
    }

    #[test]
    fn test_only_success_counts_as_success() {
        let outcomes = [
            TaskOutcome::Success(Record::new("a", "d", "a@b.com").with_id(1)),
            TaskOutcome::Skipped {
                record_id: 2,
                reason: SkipReason::NotFound,
            },
            TaskOutcome::Failed(ItemError::WorkerUnavailable { record_id: 3 }),
        ];
        let succeeded: Vec<bool> = outcomes.iter().map(TaskOutcome::is_success).collect();
        assert_eq!(succeeded, vec![true, false, false]);
    }

    #[test]
    fn test_skip_reason_serializes_snake_case() {
        let skipped = SkippedRecord {
            record_id: 4,
            reason: SkipReason::NotFound,
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["reason"], "not_found");
    }
}
