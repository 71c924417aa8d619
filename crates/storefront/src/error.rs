//! Unified error handling.
//!
//! Failures never reach the shopper as errors. Handlers convert them into an
//! `AppError`, log it, and show [`AppError::user_message`] as a notification.

use shopfront_core::{EmailError, PriceError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Reading or writing persisted state failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Markup rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// A price string did not parse.
    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    /// An email address was rejected.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// The tracing subscriber could not be installed.
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl AppError {
    /// Message shown to the shopper.
    ///
    /// Internal details are never exposed.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Storage(_) => "Could not save your changes.",
            Self::Price(_) => "This product has an invalid price.",
            Self::Email(_) => "Please enter a valid email address!",
            Self::Config(_) | Self::Render(_) | Self::Telemetry(_) => "Something went wrong.",
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Telemetry("subscriber already set".to_string());
        assert_eq!(err.to_string(), "Telemetry error: subscriber already set");

        let err = AppError::from(PriceError::Empty);
        assert!(err.to_string().starts_with("Price error: "));
    }

    #[test]
    fn test_user_messages_hide_details() {
        let err = AppError::from(StorageError::InvalidKey("../etc".to_string()));
        assert_eq!(err.user_message(), "Could not save your changes.");
        assert!(!err.user_message().contains("etc"));

        let err = AppError::from(EmailError::Empty);
        assert_eq!(err.user_message(), "Please enter a valid email address!");

        let err = AppError::from(ConfigError::MissingEnvVar("X".to_string()));
        assert_eq!(err.user_message(), "Something went wrong.");
    }
}
