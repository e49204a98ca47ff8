//! # Configuration Management
//!
//! Settings for the translation helpers. The conversions themselves are pure
//! and take everything they need as arguments; this module only carries the
//! knobs a host process may want to tune (metadata key, logging).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Filter-metadata key used when no override is configured.
pub const DEFAULT_METADATA_KEY: &str = "flowplane";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Wire translation settings
    #[validate(nested)]
    pub translation: TranslationConfig,

    /// Logging settings
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

/// Settings that shape produced wire objects
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TranslationConfig {
    /// Key under which config identity is stored in `filter_metadata`
    #[validate(length(min = 1, message = "Metadata key cannot be empty"))]
    pub metadata_key: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self { metadata_key: DEFAULT_METADATA_KEY.to_string() }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let metadata_key = std::env::var("FLOWPLANE_XDS_METADATA_KEY")
            .unwrap_or_else(|_| DEFAULT_METADATA_KEY.to_string());

        let log_level =
            std::env::var("FLOWPLANE_XDS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let json_logging = match std::env::var("FLOWPLANE_XDS_JSON_LOGGING") {
            Ok(value) => parse_bool(&value).ok_or_else(|| {
                Error::config(format!("Invalid FLOWPLANE_XDS_JSON_LOGGING value: {}", value))
            })?,
            Err(_) => false,
        };

        let config = Self {
            translation: TranslationConfig { metadata_key },
            observability: ObservabilityConfig { log_level, json_logging },
        };
        config.validate_config()?;

        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_config(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
