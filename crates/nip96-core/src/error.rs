//! Error types module
//!
//! Errors raised by configuration loading and by signing collaborators.
//! Protocol errors live in the client crate, next to the transport they wrap.

use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Invalid proxy URL: {0}")]
    InvalidProxyUrl(String),
}

/// Errors reported by an [`crate::nip98`] event signer
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Signer rejected the event: {0}")]
    Rejected(String),

    #[error("Signer unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
}
