//! # Reprocessor Configuration
//!
//! Configuration is layered by [`ConfigManager`]: built-in defaults, then an
//! optional YAML file, then `REPROCESSOR_*` environment variables.
//!
//! ```yaml
//! worker_pool_size: 10
//! processing_delay_ms: 100
//! item_timeout_ms: 5000
//! log_format: json
//! ```
//!
//! ```rust,no_run
//! use reprocessor_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let pool_size = manager.config().worker_pool_size;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::system;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::{detect_environment, ConfigManager};

/// Console output format for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings for the batch reprocessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReprocessorConfig {
    /// Maximum number of records processed concurrently
    pub worker_pool_size: usize,

    /// Artificial delay applied to each record before it is looked up
    pub processing_delay_ms: u64,

    /// Upper bound on a single record's processing time
    pub item_timeout_ms: Option<u64>,

    pub log_format: LogFormat,
}

impl Default for ReprocessorConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: system::DEFAULT_WORKER_POOL_SIZE,
            processing_delay_ms: system::DEFAULT_PROCESSING_DELAY_MS,
            item_timeout_ms: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ReprocessorConfig {
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn item_timeout(&self) -> Option<Duration> {
        self.item_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_worker_pool_size(mut self, size: usize) -> Self {
        self.worker_pool_size = size;
        self
    }

    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_item_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_pool_size == 0 || self.worker_pool_size > system::MAX_WORKER_POOL_SIZE {
            return Err(ConfigurationError::invalid_value(
                "worker_pool_size",
                self.worker_pool_size,
                format!("must be between 1 and {}", system::MAX_WORKER_POOL_SIZE),
            ));
        }

        if self.item_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "item_timeout_ms",
                0,
                "must be greater than zero when set",
            ));
        }

        Ok(())
    }
}
