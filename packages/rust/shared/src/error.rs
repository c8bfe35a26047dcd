//! Error types for quotelane.
//!
//! Library crates use [`QuotelaneError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

/// Top-level error type for all quotelane operations.
#[derive(Debug, thiserror::Error)]
pub enum QuotelaneError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/transport error talking to the content API.
    #[error("network error: {0}")]
    Network(String),

    /// The content API returned a non-success status.
    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// A detail lookup came back 404.
    #[error("{resource} not found: {slug}")]
    NotFound { resource: String, slug: String },

    /// Response body could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Input validation error (bad slug, invalid page type, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuotelaneError>;

impl QuotelaneError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a not-found error for a detail resource.
    pub fn not_found(resource: impl Into<String>, slug: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            slug: slug.into(),
        }
    }

    /// True if this error is a 404-style lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
