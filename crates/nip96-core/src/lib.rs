//! NIP-96 Core Library
//!
//! This crate provides the domain models, NIP-98 event templates, lookup tables,
//! configuration and error types shared by the NIP-96 client and CLI.
//! Nothing here performs network I/O.

pub mod config;
pub mod error;
pub mod mime;
pub mod models;
pub mod nip98;
pub mod status_table;

// Re-export commonly used types
pub use config::{ClientConfig, PollSettings};
pub use error::{ConfigError, SignerError};
pub use mime::extension_for;
pub use models::{
    DeleteOutcome, Dimension, MediaUploadResult, PartialEvent, ProcessingStatus, ServerDescriptor,
    ServerInfo, StatusKind, StatusMessage, DISCOVERY_PATH,
};
pub use nip98::{payload_digest, SignedEvent, UnsignedEvent, HTTP_AUTH_KIND};
pub use status_table::StatusExplanations;
