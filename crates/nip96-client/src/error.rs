//! Error types for NIP-96 operations.
//!
//! Every operation fails with exactly one [`Nip96Error`]. Nothing is retried
//! internally; [`Nip96Error::is_retryable`] tells the caller whether repeating the
//! whole operation can help.

use std::time::Duration;

use nip96_core::SignerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Nip96Error {
    #[error("Discovery failed for {server}: {reason}")]
    Discovery { server: String, reason: String },

    #[error("Upload rejected: {message}")]
    UploadRejected { message: String },

    #[error("Processing ended without a final asset{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    ProcessingIncomplete { message: Option<String> },

    #[error("Processing did not finish after {attempts} polls ({elapsed:?})")]
    ProcessingTimeout { attempts: u32, elapsed: Duration },

    #[error("Upload succeeded but the server returned no asset URL")]
    MissingUrl,

    #[error("Delete failed: {message}")]
    Deletion { message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Signing failed: {0}")]
    Signer(#[from] SignerError),

    #[error("Host {host} must be routed through a proxy but no proxied client is configured")]
    RoutingUnavailable { host: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl Nip96Error {
    /// Whether retrying the whole operation might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Nip96Error::Transport(_) | Nip96Error::ProcessingTimeout { .. }
        )
    }
}

pub type Nip96Result<T> = Result<T, Nip96Error>;
