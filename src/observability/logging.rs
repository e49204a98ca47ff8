//! # Structured Logging
//!
//! Provides the span macro used around wire-message operations and the
//! subscriber setup for host processes that do not install their own.

use crate::config::ObservabilityConfig;
use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Create a tracing span for an operation on a type-tagged wire message
#[macro_export]
macro_rules! xds_span {
    ($operation:expr, $type_url:expr) => {
        tracing::debug_span!(
            "xds_operation",
            operation = %$operation,
            type_url = %$type_url
        )
    };
    ($operation:expr, $type_url:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "xds_operation",
            operation = %$operation,
            type_url = %$type_url,
            $($field)*
        )
    };
}

/// Install a global fmt subscriber.
///
/// `RUST_LOG` directives take precedence over `config.log_level`. If a global
/// subscriber is already installed (an embedding control plane, a test
/// harness) this leaves it in place and returns `Ok(())`.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), &config.log_level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        // Subscriber already set elsewhere; keep it.
        tracing::debug!("global tracing subscriber already installed");
    }

    Ok(())
}

/// Environment directives if they parse, otherwise the configured level.
fn log_filter(env_directives: Option<String>, log_level: &str) -> Result<EnvFilter> {
    env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .map_or_else(|| EnvFilter::try_new(log_level), Ok)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", log_level, e)))
}
