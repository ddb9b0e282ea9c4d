// src/error.rs

//! Unified error handling for the digest application.

use std::fmt;

use thiserror::Error;

/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Posting store is unavailable or corrupt
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Email could not be assembled
    #[error("Email build error: {0}")]
    MailBuild(#[from] lettre::error::Error),

    /// Email address could not be parsed
    #[error("Email address error: {0}")]
    MailAddress(#[from] lettre::address::AddressError),

    /// SMTP transport failed
    #[error("SMTP error: {0}")]
    Mail(#[from] lettre::transport::smtp::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A collection adapter failed for one source
    #[error("Adapter error for {source_name}: {message}")]
    Adapter {
        source_name: String,
        message: String,
    },

    /// A scraped record cannot be ingested
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an adapter error with the failing source.
    pub fn adapter(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Adapter {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord(message.into())
    }
}
