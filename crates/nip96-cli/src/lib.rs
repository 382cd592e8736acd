//! Support code for the `nip96` binary.

use std::process::Command;

use nip96_core::{SignedEvent, SignerError, UnsignedEvent};
use nip96_client::EventSigner;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Delegates signing to an external program.
///
/// The program is run as `<program> [args..] <event id hex>` and must print the
/// 64-byte Schnorr signature as hex on stdout.
#[derive(Debug, Clone)]
pub struct CommandSigner {
    pubkey: String,
    program: String,
    args: Vec<String>,
}

impl CommandSigner {
    /// `command` is split on whitespace; the first word is the program.
    pub fn new(pubkey: impl Into<String>, command: &str) -> Result<Self, SignerError> {
        let pubkey = pubkey.into();
        if !is_hex(&pubkey, 64) {
            return Err(SignerError::Unavailable(
                "public key must be 64 hex characters".to_string(),
            ));
        }

        let mut words = command.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| SignerError::Unavailable("empty signing command".to_string()))?;

        Ok(Self {
            pubkey: pubkey.to_ascii_lowercase(),
            program,
            args: words.collect(),
        })
    }
}

impl EventSigner for CommandSigner {
    fn public_key(&self) -> Option<String> {
        Some(self.pubkey.clone())
    }

    fn sign(&self, event: UnsignedEvent) -> Result<SignedEvent, SignerError> {
        let id = event.id()?;
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&id)
            .output()
            .map_err(|e| SignerError::Unavailable(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SignerError::Rejected(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let sig = String::from_utf8_lossy(&output.stdout).trim().to_ascii_lowercase();
        if !is_hex(&sig, 128) {
            return Err(SignerError::Rejected(
                "signing command did not print a hex signature".to_string(),
            ));
        }

        Ok(event.into_signed(sig)?)
    }
}

fn is_hex(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Content type for `path`, guessed from its extension.
pub fn guess_content_type(path: &std::path::Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
