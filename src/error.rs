// src/error.rs

//! Unified error handling for the sitemap tool.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for sitemap operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Config directory or file could not be read or written
    #[error("Config error at {}: {message}", path.display())]
    ConfigIo { path: PathBuf, message: String },

    /// Sitemap database unreadable, corrupt, or unwritable
    #[error("Database error at {}: {message}", path.display())]
    StoreIo { path: PathBuf, message: String },

    /// URL excluded by a robots.txt rule
    #[error("URL disallowed by robots.txt rule '{rule}': {url}")]
    PolicyRejected { url: String, rule: String },

    /// URL hash already recorded
    #[error("URL already exists in sitemap: {0}")]
    DuplicateUrl(String),

    /// Sitemap file unreadable or unwritable
    #[error("Sitemap error at {}: {message}", path.display())]
    PartitionIo { path: PathBuf, message: String },

    /// Serialized sitemap would exceed the byte-size cap
    #[error("Sitemap {name} would grow to {size} bytes (limit {limit})")]
    PartitionFull {
        name: String,
        size: usize,
        limit: usize,
    },

    /// Version check or ping failure
    #[error("Network error: {0}")]
    Network(String),

    /// `config <key> <value>` with a key that has no setter
    #[error("Unknown config key '{0}'")]
    UnknownConfigKey(String),

    /// `config <key> <value>` with a value the key's parser refused
    #[error("Invalid value '{value}' for config key '{key}': {message}")]
    InvalidConfigValue {
        key: String,
        value: String,
        message: String,
    },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Create a config I/O error for the given file.
    pub fn config(path: impl AsRef<Path>, message: impl fmt::Display) -> Self {
        Self::ConfigIo {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Create a database I/O error for the given file.
    pub fn store(path: impl AsRef<Path>, message: impl fmt::Display) -> Self {
        Self::StoreIo {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Create a sitemap file I/O error for the given file.
    pub fn partition(path: impl AsRef<Path>, message: impl fmt::Display) -> Self {
        Self::PartitionIo {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl fmt::Display) -> Self {
        Self::Network(message.to_string())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid config value error.
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::InvalidConfigValue {
            key: key.into(),
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error is a policy or duplicate rejection rather than a failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::PolicyRejected { .. } | Self::DuplicateUrl(_))
    }
}
