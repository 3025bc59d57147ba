//! Error types and handling for Wattson
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Wattson operations
pub type Result<T> = std::result::Result<T, WattsonError>;

/// Main error type for Wattson
#[derive(Debug, Error)]
pub enum WattsonError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP/Web server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Network-related errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Upstream API errors (Home Assistant, rate feeds)
    #[error("API error: {message}")]
    Api { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl WattsonError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        WattsonError::Config {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        WattsonError::Web {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        WattsonError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        WattsonError::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        WattsonError::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        WattsonError::Api {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        WattsonError::Generic {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for WattsonError {
    fn from(err: std::io::Error) -> Self {
        WattsonError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for WattsonError {
    fn from(err: serde_yaml::Error) -> Self {
        WattsonError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for WattsonError {
    fn from(err: serde_json::Error) -> Self {
        WattsonError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for WattsonError {
    fn from(err: reqwest::Error) -> Self {
        WattsonError::network(err.to_string())
    }
}

impl From<chrono::ParseError> for WattsonError {
    fn from(err: chrono::ParseError) -> Self {
        WattsonError::validation("datetime", &err.to_string())
    }
}
