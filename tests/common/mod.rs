#![allow(dead_code)]

pub mod scripted_store;
pub mod strategies;

pub use scripted_store::*;
pub use strategies::*;

use reprocessor_core::ReprocessorConfig;
use std::time::Duration;

/// Configuration with no artificial delay and a dedicated pool size
pub fn fast_config(workers: usize) -> ReprocessorConfig {
    ReprocessorConfig::default()
        .with_worker_pool_size(workers)
        .with_processing_delay(Duration::ZERO)
}
