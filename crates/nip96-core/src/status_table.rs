//! HTTP status explanations surfaced when a server rejects a request without a
//! structured error body.

use std::collections::HashMap;

/// Mapping from HTTP status code to a human-readable explanation.
///
/// The default table covers the statuses NIP-96 servers commonly return. Callers
/// that localize or reword messages build their own with [`StatusExplanations::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusExplanations {
    entries: HashMap<u16, String>,
}

impl StatusExplanations {
    pub fn new(entries: HashMap<u16, String>) -> Self {
        Self { entries }
    }

    /// A table with no entries; every rejection falls back to the raw code.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace one entry.
    pub fn with(mut self, code: u16, explanation: impl Into<String>) -> Self {
        self.entries.insert(code, explanation.into());
        self
    }

    pub fn explain(&self, code: u16) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }
}

impl Default for StatusExplanations {
    fn default() -> Self {
        let entries = [
            (400, "Bad request: the server could not understand the upload"),
            (401, "Unauthorized: the server requires a signed authorization"),
            (402, "Payment required: the server requires a paid plan for this upload"),
            (403, "Forbidden: this account is not allowed to upload to the server"),
            (404, "Not found: the server does not know this endpoint or file"),
            (405, "Method not allowed by the server"),
            (408, "The server timed out waiting for the upload"),
            (409, "Conflict: the file already exists on the server"),
            (413, "Payload too large: the file exceeds the server's size limit"),
            (415, "Unsupported media type: the server does not accept this file type"),
            (429, "Too many requests: the server is rate limiting uploads"),
            (500, "Internal server error"),
            (502, "Bad gateway: the server is unreachable behind its proxy"),
            (503, "Service unavailable: the server is temporarily down"),
            (504, "Gateway timeout: the server took too long to respond"),
        ]
        .into_iter()
        .map(|(code, text)| (code, text.to_string()))
        .collect();

        Self { entries }
    }
}
