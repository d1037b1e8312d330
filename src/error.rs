//! Error types for LogicMonitor API operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the LogicMonitor API or writing
/// exported files.
#[derive(Debug, Error)]
pub enum LmError {
    /// Configuration is missing or incomplete.
    #[error("LogicMonitor configuration required: {0}")]
    ConfigMissing(String),

    /// A caller-supplied argument is invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// API request failed.
    #[error("LogicMonitor API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Writing an output file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LmError {
    /// Whether a retry of the same request may succeed.
    ///
    /// Rate limiting, server-side (5xx) failures and transport errors
    /// (connect, timeout) are transient. Everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            LmError::RateLimited { .. } => true,
            LmError::ApiError {
                status_code: Some(code),
                ..
            } => (500..600).contains(code),
            LmError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LmError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for LogicMonitor operations.
pub type Result<T> = core::result::Result<T, LmError>;
