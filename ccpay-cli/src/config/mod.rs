//! Configuration module for the ccpay CLI.
//!
//! Handles loading configuration from the TOML file and applying
//! command-line overrides.

pub mod file;

use crate::config::file::FileConfig;
use ccpay_core::navigation::normalize_api_base;
use ccpay_sdk::config::ChainConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        source: url::ParseError,
    },

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Values given on the command line, taking precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub session_file: Option<PathBuf>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub chain: Arc<ChainConfig>,
    /// Normalized API base, if one was configured.
    pub api_base: Option<String>,
    pub landing_url: Url,
    pub checkout_url: Url,
    pub poll_interval: Duration,
    pub redirect_delay: Duration,
    pub min_credit: i64,
    pub session_file: PathBuf,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    overrides: Overrides,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    /// Read the TOML file (a missing file means all defaults), apply
    /// overrides and validate.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str::<FileConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?self.config_path, "Config file not found, using defaults");
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(api_base) = &self.overrides.api_base {
            file_config.checkout.api_base = Some(api_base.clone());
        }
        if let Some(session_file) = &self.overrides.session_file {
            file_config.checkout.session_file = session_file.clone();
        }

        self.validate(&file_config)?;
        self.build_loaded_config(file_config)
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        config
            .chain
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("chain: {e}")))?;
        if config.checkout.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "checkout.poll_interval_ms must be positive".to_string(),
            ));
        }
        if config.checkout.min_credit <= 0 {
            return Err(ConfigError::ValidationError(
                "checkout.min_credit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn build_loaded_config(&self, file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        let checkout = file_config.checkout;

        let api_base = checkout
            .api_base
            .as_deref()
            .map(normalize_api_base)
            .filter(|base| !base.is_empty());
        if let Some(base) = &api_base {
            parse_url("checkout.api_base", base)?;
        }

        Ok(LoadedConfig {
            chain: Arc::new(file_config.chain),
            api_base,
            landing_url: parse_url("checkout.landing_url", &checkout.landing_url)?,
            checkout_url: parse_url("checkout.checkout_url", &checkout.checkout_url)?,
            poll_interval: Duration::from_millis(checkout.poll_interval_ms),
            redirect_delay: Duration::from_millis(checkout.redirect_delay_ms),
            min_credit: checkout.min_credit,
            session_file: checkout.session_file,
        })
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { field, source })
}
