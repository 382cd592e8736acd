//! NIP-96 media upload client.
//!
//! Uploads files to NIP-96 servers and deletes them again. An upload discovers
//! the server's API endpoint, signs a NIP-98 authorization for the request,
//! streams a multipart body, then either returns the final asset right away or
//! polls the server's processing URL until it is ready.
//!
//! The HTTP transport, the signing identity and the routing strategy are passed
//! in explicitly, so tests can point the client at a mock server.

pub mod auth;
pub mod classify;
pub mod client;
pub mod delete;
pub mod discovery;
pub mod error;
pub mod normalize;
pub mod poller;
pub mod transport;
pub mod upload;

// Re-export commonly used types
pub use auth::{AuthHeaderGenerator, Clock, EventSigner, NoSigner, SystemClock, AUTH_SCHEME};
pub use classify::UploadOutcome;
pub use client::{CallContext, Nip96Client};
pub use error::{Nip96Error, Nip96Result};
pub use poller::{NoProgress, ProgressReporter};
pub use transport::{DirectRouting, HostRouting, HttpReply, HttpTransport, RoutingPolicy};
pub use upload::{ByteSource, UploadRequest};

pub use nip96_core;
pub use tokio_util::sync::CancellationToken;
