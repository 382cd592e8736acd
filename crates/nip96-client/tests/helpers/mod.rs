//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nip96_client::nip96_core::{
    PollSettings, ServerDescriptor, SignedEvent, SignerError, UnsignedEvent,
};
use nip96_client::{AuthHeaderGenerator, Clock, EventSigner, HttpTransport, Nip96Client};

pub const USER_AGENT: &str = "nip96-test/1.0";

/// Signs with a fixed fake key; the signature is derived from the event id.
pub struct FixedKeySigner;

impl EventSigner for FixedKeySigner {
    fn public_key(&self) -> Option<String> {
        Some("a".repeat(64))
    }

    fn sign(&self, event: UnsignedEvent) -> Result<SignedEvent, SignerError> {
        let sig = format!("{}{}", event.id()?, event.id()?);
        Ok(event.into_signed(sig)?)
    }
}

/// Advances one second per reading.
pub struct SteppingClock(AtomicI64);

impl Clock for SteppingClock {
    fn now(&self) -> i64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

pub fn signed_auth() -> AuthHeaderGenerator {
    AuthHeaderGenerator::new(
        Arc::new(FixedKeySigner),
        Arc::new(SteppingClock(AtomicI64::new(1_700_000_000))),
    )
}

pub fn fast_polling() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        ..Default::default()
    }
}

pub fn client(auth: AuthHeaderGenerator) -> Nip96Client {
    Nip96Client::new(HttpTransport::new(reqwest::Client::new()), auth)
        .with_user_agent(USER_AGENT)
        .with_poll_settings(fast_polling())
}

pub fn descriptor(server: &mockito::ServerGuard) -> ServerDescriptor {
    ServerDescriptor::new(format!("{}/api/v2/media", server.url()), server.url())
}

/// Final-event JSON with the given tags.
pub fn nip94_event(tags: &[(&str, &str)]) -> serde_json::Value {
    let tags: Vec<Vec<String>> = tags
        .iter()
        .map(|(name, value)| vec![name.to_string(), value.to_string()])
        .collect();
    serde_json::json!({ "tags": tags, "content": "" })
}
