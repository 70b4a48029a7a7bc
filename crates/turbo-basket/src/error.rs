//! Basket error types.

use thiserror::Error;

/// Errors that can occur in basket operations.
///
/// Lookups that find nothing are not errors; they return `None` or `false`.
#[derive(Error, Debug)]
pub enum BasketError {
    /// A required field was absent from an inserted item.
    #[error("The '{0}' field is required")]
    MissingField(&'static str),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A cookie could not be rendered as a header value.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl From<turbo_cache::CacheError> for BasketError {
    fn from(e: turbo_cache::CacheError) -> Self {
        BasketError::Cache(e.to_string())
    }
}

impl From<serde_json::Error> for BasketError {
    fn from(e: serde_json::Error) -> Self {
        BasketError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for BasketError {
    fn from(e: toml::de::Error) -> Self {
        BasketError::Config(e.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for BasketError {
    fn from(e: http::header::InvalidHeaderValue) -> Self {
        BasketError::InvalidHeader(e.to_string())
    }
}
