//! Storefront configuration loaded from environment variables.
//!
//! Every setting has a default, so [`StorefrontConfig::default`] is a
//! complete configuration and the environment only overrides it.
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_STORAGE_DIR` - Directory for the file-backed store
//! - `SHOPFRONT_NOTIFY_ENTER_MS` - Delay before a notification slides in (default: 100)
//! - `SHOPFRONT_NOTIFY_VISIBLE_MS` - Time from mount until slide-out starts (default: 4000)
//! - `SHOPFRONT_NOTIFY_EXIT_MS` - Slide-out duration before removal (default: 300)
//! - `SHOPFRONT_ADD_ACK_MS` - How long the add button shows "Added!" (default: 2000)
//! - `SHOPFRONT_SUBSCRIBE_DELAY_MS` - Simulated subscription latency (default: 2000)
//! - `SHOPFRONT_MAX_NOTIFICATIONS` - Cap on concurrently mounted notifications (default: unbounded)
//! - `SHOPFRONT_PRODUCT_DETAILS_URL` - Product-details navigation target (default: product-details.html)
//! - `SHOPFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Notification animation timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTiming {
    /// Delay between mounting off-screen and sliding into view.
    pub enter_delay: Duration,
    /// Time from mount until the slide-out starts.
    pub visible_for: Duration,
    /// Slide-out duration; the element is removed afterwards.
    pub exit_duration: Duration,
}

impl Default for NotificationTiming {
    fn default() -> Self {
        Self {
            enter_delay: Duration::from_millis(100),
            visible_for: Duration::from_millis(4000),
            exit_duration: Duration::from_millis(300),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Storefront controller configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory for the file-backed store, if one is used
    pub storage_dir: Option<PathBuf>,
    /// Notification animation timing
    pub notifications: NotificationTiming,
    /// How long the add-to-cart acknowledgment stays up
    pub add_acknowledgment: Duration,
    /// Simulated latency of a newsletter subscription
    pub subscribe_delay: Duration,
    /// Cap on concurrently mounted notifications
    pub max_notifications: Option<NonZeroUsize>,
    /// Relative URL of the product-details page
    pub product_details_url: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            notifications: NotificationTiming::default(),
            add_acknowledgment: Duration::from_millis(2000),
            subscribe_delay: Duration::from_millis(2000),
            max_notifications: None,
            product_details_url: "product-details.html".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let notifications = NotificationTiming {
            enter_delay: get_millis(&lookup, "SHOPFRONT_NOTIFY_ENTER_MS")?
                .unwrap_or(defaults.notifications.enter_delay),
            visible_for: get_millis(&lookup, "SHOPFRONT_NOTIFY_VISIBLE_MS")?
                .unwrap_or(defaults.notifications.visible_for),
            exit_duration: get_millis(&lookup, "SHOPFRONT_NOTIFY_EXIT_MS")?
                .unwrap_or(defaults.notifications.exit_duration),
        };
        if notifications.enter_delay > notifications.visible_for {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_NOTIFY_ENTER_MS".to_string(),
                "must not exceed SHOPFRONT_NOTIFY_VISIBLE_MS".to_string(),
            ));
        }

        Ok(Self {
            storage_dir: lookup("SHOPFRONT_STORAGE_DIR").map(PathBuf::from),
            notifications,
            add_acknowledgment: get_millis(&lookup, "SHOPFRONT_ADD_ACK_MS")?
                .unwrap_or(defaults.add_acknowledgment),
            subscribe_delay: get_millis(&lookup, "SHOPFRONT_SUBSCRIBE_DELAY_MS")?
                .unwrap_or(defaults.subscribe_delay),
            max_notifications: get_parsed(&lookup, "SHOPFRONT_MAX_NOTIFICATIONS")?,
            product_details_url: lookup("SHOPFRONT_PRODUCT_DETAILS_URL")
                .unwrap_or(defaults.product_details_url),
            log_format: get_parsed(&lookup, "SHOPFRONT_LOG_FORMAT")?
                .unwrap_or(defaults.log_format),
        })
    }

    /// Directory for the file-backed store.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no directory is configured.
    pub fn require_storage_dir(&self) -> Result<&PathBuf, ConfigError> {
        self.storage_dir
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPFRONT_STORAGE_DIR".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable with `FromStr`.
fn get_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Parse an optional millisecond duration.
fn get_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, ConfigError> {
    Ok(get_parsed::<u64>(lookup, key)?.map(Duration::from_millis))
}
