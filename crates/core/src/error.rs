//! Error types for the CO-PRESENCE domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Malformed think-step output is deliberately absent: it is recovered into a
//! fallback artifact and never surfaces as an error.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all CO-PRESENCE operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Storage errors (fatal for a cycle) ---
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Read-request errors ---
    #[error("Read-request error: {0}")]
    Request(#[from] RequestError),
}

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode record for {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Record already exists: {0}")]
    DuplicateId(String),
}

impl StoreError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("Invalid read-request: {0}")]
    Invalid(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid cycle range: {min} > {max}")]
    InvalidRange { min: u64, max: u64 },
}
