//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, StorefrontConfig};
use crate::error::{AppError, Result};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "shopfront_storefront=info";

/// Install the global tracing subscriber.
///
/// Defaults to info level for this crate if `RUST_LOG` is not set.
///
/// # Errors
///
/// Returns `AppError::Telemetry` if a global subscriber is already installed.
pub fn init(config: &StorefrontConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };
    installed.map_err(|e| AppError::Telemetry(e.to_string()))?;

    tracing::debug!(format = ?config.log_format, "Tracing initialized");
    Ok(())
}
