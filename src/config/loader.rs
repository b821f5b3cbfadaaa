//! Configuration Loader
//!
//! Merges built-in defaults, an optional YAML file and `REPROCESSOR_*`
//! environment variables into a validated [`ReprocessorConfig`].

use super::error::{ConfigResult, ConfigurationError};
use super::ReprocessorConfig;
use crate::constants::system;
use ::config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Detect the runtime environment from the usual environment variables
pub fn detect_environment() -> String {
    env::var("REPROCESSOR_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: ReprocessorConfig,
    environment: String,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from `REPROCESSOR_CONFIG_PATH` or the default path.
    ///
    /// The default file is optional; an explicitly configured path must exist.
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        match env::var("REPROCESSOR_CONFIG_PATH") {
            Ok(path) => Self::load_from_file(path),
            Err(_) => {
                Self::load_with_sources(Some(Path::new(system::DEFAULT_CONFIG_PATH)), false, None)
            }
        }
    }

    /// Load configuration from a specific YAML file plus environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_sources(Some(path.as_ref()), true, None)
    }

    /// Load configuration with an explicit environment map instead of the
    /// process environment. Useful in tests that must not touch global state.
    pub fn load_with_env(
        path: Option<&Path>,
        env_vars: std::collections::HashMap<String, String>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_sources(path, path.is_some(), Some(env_vars))
    }

    fn load_with_sources(
        path: Option<&Path>,
        required: bool,
        env_vars: Option<std::collections::HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let environment = detect_environment();
        let defaults = ReprocessorConfig::default();

        let mut builder = Config::builder()
            .set_default("worker_pool_size", defaults.worker_pool_size as i64)?
            .set_default("processing_delay_ms", defaults.processing_delay_ms as i64)?
            .set_default("log_format", "pretty")?;

        let mut config_path = None;
        if let Some(path) = path {
            if path.exists() {
                builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
                config_path = Some(path.to_path_buf());
            } else if required {
                return Err(ConfigurationError::ConfigFileNotFound {
                    path: path.display().to_string(),
                });
            }
        }

        let env_source = Environment::with_prefix(system::ENV_PREFIX)
            .try_parsing(true)
            .source(env_vars.map(|vars| vars.into_iter().collect()));
        builder = builder.add_source(env_source);

        let config: ReprocessorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            environment = %environment,
            config_path = ?config_path,
            worker_pool_size = config.worker_pool_size,
            processing_delay_ms = config.processing_delay_ms,
            item_timeout_ms = ?config.item_timeout_ms,
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment,
            config_path,
        }))
    }

    pub fn config(&self) -> &ReprocessorConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// The YAML file that contributed to this configuration, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
