//! NIP-98 HTTP auth events.
//!
//! An auth event binds a public key to one request: the target URL, the method,
//! an optional sha256 of the body and the time it was created. The event id is
//! sha256 over the canonical array `[0, pubkey, created_at, kind, tags, content]`.

use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

/// Event kind reserved for HTTP auth.
pub const HTTP_AUTH_KIND: u16 = 27235;

/// Lowercase hex sha256 of a request body, used as the `payload` tag.
pub fn payload_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Event template handed to a signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedEvent {
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u16,
    pub tags: Vec<Vec<String>>,
    pub content: String,
}

impl UnsignedEvent {
    /// Build the auth template for `method url` at `created_at` (unix seconds).
    pub fn http_auth(
        pubkey: impl Into<String>,
        url: &str,
        method: &str,
        payload_sha256: Option<&str>,
        created_at: i64,
    ) -> Self {
        let mut tags = vec![
            vec!["u".to_string(), url.to_string()],
            vec!["method".to_string(), method.to_ascii_uppercase()],
        ];
        if let Some(digest) = payload_sha256 {
            tags.push(vec!["payload".to_string(), digest.to_string()]);
        }

        Self {
            pubkey: pubkey.into(),
            created_at,
            kind: HTTP_AUTH_KIND,
            tags,
            content: String::new(),
        }
    }

    /// Canonical serialization that the event id commits to.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&json!([
            0,
            self.pubkey,
            self.created_at,
            self.kind,
            self.tags,
            self.content
        ]))
    }

    /// Hex sha256 of [`Self::canonical_json`].
    pub fn id(&self) -> Result<String, serde_json::Error> {
        Ok(hex::encode(Sha256::digest(self.canonical_json()?.as_bytes())))
    }

    /// Attach a signature over [`Self::id`].
    pub fn into_signed(self, sig: impl Into<String>) -> Result<SignedEvent, serde_json::Error> {
        let id = self.id()?;
        Ok(SignedEvent {
            id,
            pubkey: self.pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig: sig.into(),
        })
    }
}

/// A signed event, serialized into the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEvent {
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u16,
    pub tags: Vec<Vec<String>>,
    pub content: String,
    pub sig: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_auth_tags() {
        let event = UnsignedEvent::http_auth("pk", "https://x.test/api", "post", None, 10);
        assert_eq!(event.kind, HTTP_AUTH_KIND);
        assert_eq!(
            event.tags,
            vec![
                vec!["u".to_string(), "https://x.test/api".to_string()],
                vec!["method".to_string(), "POST".to_string()],
            ]
        );
        assert!(event.content.is_empty());
    }

    #[test]
    fn payload_tag_is_optional() {
        let digest = payload_digest(b"hello");
        let event = UnsignedEvent::http_auth("pk", "https://x", "PUT", Some(&digest), 10);
        assert_eq!(
            event.tags[2],
            vec!["payload".to_string(), digest.clone()]
        );
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn canonical_form_has_no_whitespace() {
        let event = UnsignedEvent::http_auth("pk", "https://x", "GET", None, 7);
        assert_eq!(
            event.canonical_json().unwrap(),
            r#"[0,"pk",7,27235,[["u","https://x"],["method","GET"]],""]"#
        );
    }

    #[test]
    fn id_changes_with_method() {
        let get = UnsignedEvent::http_auth("pk", "https://x", "GET", None, 7);
        let delete = UnsignedEvent::http_auth("pk", "https://x", "DELETE", None, 7);
        assert_ne!(get.id().unwrap(), delete.id().unwrap());
        assert_eq!(get.id().unwrap().len(), 64);
    }

    #[test]
    fn signed_event_keeps_template_fields() {
        let event = UnsignedEvent::http_auth("pk", "https://x", "GET", None, 7);
        let id = event.id().unwrap();
        let signed = event.into_signed("sig").unwrap();
        assert_eq!(signed.id, id);
        assert_eq!(signed.sig, "sig");
        assert_eq!(signed.created_at, 7);
    }
}
