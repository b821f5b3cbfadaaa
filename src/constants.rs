//! # System Constants
//!
//! Status tags and operational defaults for the batch reprocessor.
//!
//! Record statuses are an open-ended set of string tags owned by the store, so
//! they are modelled as string constants rather than a closed enum. The
//! reprocessor only ever writes [`status::PROCESSED`].

/// Record status tags
pub mod status {
    /// Freshly created record that has not been reprocessed yet
    pub const NEW: &str = "NEW";

    /// Terminal tag written by the batch reprocessor
    pub const PROCESSED: &str = "PROCESSED";

    /// Returns true when the tag marks a record as already reprocessed
    pub fn is_processed(tag: &str) -> bool {
        tag == PROCESSED
    }
}

/// System-wide defaults
pub mod system {
    /// Default number of concurrent per-record workers
    pub const DEFAULT_WORKER_POOL_SIZE: usize = 10;

    /// Upper bound accepted for a configured worker pool
    pub const MAX_WORKER_POOL_SIZE: usize = 1024;

    /// Default artificial processing delay applied to each record
    pub const DEFAULT_PROCESSING_DELAY_MS: u64 = 100;

    /// Environment variable prefix for configuration overrides
    pub const ENV_PREFIX: &str = "REPROCESSOR";

    /// Default configuration file, relative to the working directory
    pub const DEFAULT_CONFIG_PATH: &str = "config/reprocessor.yaml";
}

/// Structured log operation names
pub mod events {
    pub const BATCH_STARTED: &str = "batch.started";
    pub const BATCH_COMPLETED: &str = "batch.completed";
    pub const BATCH_ABORTED: &str = "batch.aborted";
    pub const ITEM_FAILED: &str = "item.failed";
}
