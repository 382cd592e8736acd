//! NIP-98 `Authorization` header generation.
//!
//! A header is produced fresh for every outbound request: the signed event binds
//! the method, the URL, an optional body digest and the current time, so a value
//! generated for one request is never valid for another.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use base64::Engine;
use nip96_core::{payload_digest, SignedEvent, SignerError, UnsignedEvent};

/// Scheme prefix of the `Authorization` header value.
pub const AUTH_SCHEME: &str = "Nostr";

/// Signing collaborator holding the user's identity.
///
/// Signing is synchronous: an attempt either completes or fails as a whole and
/// never spans an await point.
pub trait EventSigner: Send + Sync {
    /// Hex public key, or `None` when no identity is configured.
    fn public_key(&self) -> Option<String>;

    fn sign(&self, event: UnsignedEvent) -> Result<SignedEvent, SignerError>;
}

/// Signer for anonymous use; requests go out without authorization.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSigner;

impl EventSigner for NoSigner {
    fn public_key(&self) -> Option<String> {
        None
    }

    fn sign(&self, _event: UnsignedEvent) -> Result<SignedEvent, SignerError> {
        Err(SignerError::Unavailable("no identity configured".to_string()))
    }
}

/// Source of the `created_at` timestamp (unix seconds).
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Produces single-use `Authorization` header values.
#[derive(Clone)]
pub struct AuthHeaderGenerator {
    signer: Arc<dyn EventSigner>,
    clock: Arc<dyn Clock>,
}

impl Debug for AuthHeaderGenerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AuthHeaderGenerator")
            .field("pubkey", &self.signer.public_key())
            .finish()
    }
}

impl Default for AuthHeaderGenerator {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

impl AuthHeaderGenerator {
    pub fn new(signer: Arc<dyn EventSigner>, clock: Arc<dyn Clock>) -> Self {
        Self { signer, clock }
    }

    pub fn with_signer(signer: Arc<dyn EventSigner>) -> Self {
        Self::new(signer, Arc::new(SystemClock))
    }

    pub fn unauthenticated() -> Self {
        Self::with_signer(Arc::new(NoSigner))
    }

    /// Header value for `method url`, or `None` when no identity is configured.
    ///
    /// `body` is hashed into a `payload` tag when given. Uploads pass `None`:
    /// the multipart body is streamed and only method, URL and time are signed.
    pub fn header(
        &self,
        url: &str,
        method: &str,
        body: Option<&[u8]>,
    ) -> Result<Option<String>, SignerError> {
        let Some(pubkey) = self.signer.public_key() else {
            return Ok(None);
        };

        let digest = body.map(payload_digest);
        let template =
            UnsignedEvent::http_auth(pubkey, url, method, digest.as_deref(), self.clock.now());
        let signed = self.signer.sign(template)?;
        let json = serde_json::to_string(&signed)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(json);

        Ok(Some(format!("{} {}", AUTH_SCHEME, encoded)))
    }
}
