//! Error types for envirocar-client
//!
//! This module provides the error taxonomy of the fetch-and-decode pipeline:
//! - Transport failures (non-2xx responses, connection problems)
//! - Decode failures (malformed JSON, unexpected GeoJSON, failed coercions)
//! - Configuration and query validation errors

use thiserror::Error;

/// Result type alias for envirocar-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for envirocar-client
///
/// Transport errors ([`Error::HttpFailed`], [`Error::Network`]) are isolated per
/// item inside a concurrent batch and only propagate from single requests such
/// as the page-count probe. Every other variant propagates to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// The server answered with a non-success status
    #[error("HTTP request failed with status {status}: {url}")]
    HttpFailed {
        /// HTTP status code returned by the server
        status: u16,
        /// Fully resolved request URL
        url: String,
    },

    /// Network error (connection refused, timeout, TLS, ...)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request path could not be resolved against the base URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Payload is not valid JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Payload is valid JSON but does not have the expected shape
    #[error("decode error: {0}")]
    Decode(String),

    /// A cell could not be converted to the type required by a projection
    #[error("cannot coerce {value} in column '{column}' to {expected}")]
    Coercion {
        /// Column being coerced
        column: String,
        /// Offending value, rendered for display
        value: String,
        /// Target type name (e.g., "numeric", "datetime")
        expected: &'static str,
    },

    /// Pagination links could not be interpreted
    #[error("pagination error: {0}")]
    Pagination(String),

    /// Query parameters are inconsistent (e.g., zero page size)
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status carried by a [`Error::HttpFailed`] error, or reported by reqwest
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::HttpFailed { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
