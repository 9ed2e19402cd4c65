// src/error.rs

//! Unified error handling for the sniffer.

use std::fmt;

use thiserror::Error;

/// Result type alias for sniffer operations.
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

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The page asked for a login instead of rendering content
    #[error("Login wall at {url}")]
    LoginWall { url: String },

    /// Navigation did not complete
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// Browser binding failure (launch, protocol, evaluation)
    #[error("Browser error: {0}")]
    Browser(String),

    /// Connections export could not be interpreted
    #[error("Export error in {context}: {message}")]
    Export { context: String, message: String },
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

    /// Create a login wall error for the given URL.
    pub fn login_wall(url: impl Into<String>) -> Self {
        Self::LoginWall { url: url.into() }
    }

    /// Create a navigation error with context.
    pub fn navigation(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a browser binding error.
    pub fn browser(message: impl fmt::Display) -> Self {
        Self::Browser(message.to_string())
    }

    /// Create an export parsing error with context.
    pub fn export(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Export {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error is a login wall (unit-level, never batch-fatal).
    pub fn is_login_wall(&self) -> bool {
        matches!(self, Self::LoginWall { .. })
    }
}
