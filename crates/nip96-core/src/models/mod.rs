//! Domain models exchanged with NIP-96 servers.

pub mod event;
pub mod result;
pub mod server;
pub mod status;

pub use event::PartialEvent;
pub use result::{DeleteOutcome, Dimension, MediaUploadResult};
pub use server::{ServerDescriptor, ServerInfo, DISCOVERY_PATH};
pub use status::{ProcessingStatus, StatusKind, StatusMessage};

/// Treats empty and whitespace-only strings as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
