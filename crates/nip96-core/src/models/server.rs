use serde::{Deserialize, Serialize};

/// Path of the capability document relative to the server root.
pub const DISCOVERY_PATH: &str = "/.well-known/nostr/nip96.json";

/// Capability document served at [`DISCOVERY_PATH`]. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    /// Another server that answers uploads on this one's behalf.
    #[serde(default)]
    pub delegated_to_url: Option<String>,
    #[serde(default)]
    pub supported_nips: Option<Vec<u32>>,
    #[serde(default)]
    pub tos_url: Option<String>,
    #[serde(default)]
    pub content_types: Option<Vec<String>>,
}

impl ServerInfo {
    pub fn api_url(&self) -> Option<&str> {
        super::non_blank(self.api_url.as_deref())
    }

    pub fn delegated_to_url(&self) -> Option<&str> {
        super::non_blank(self.delegated_to_url.as_deref())
    }

    /// Whether the server declares support for `content_type`. Servers that
    /// publish no list accept anything; `image/*` style wildcards are honored.
    pub fn accepts(&self, content_type: &str) -> bool {
        let Some(types) = self.content_types.as_ref().filter(|t| !t.is_empty()) else {
            return true;
        };
        types.iter().any(|allowed| match allowed.strip_suffix("/*") {
            Some(prefix) => content_type
                .split('/')
                .next()
                .is_some_and(|major| major.eq_ignore_ascii_case(prefix)),
            None => allowed.eq_ignore_ascii_case(content_type),
        })
    }
}

/// Resolved upload endpoint of a server, valid for the call it was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub api_url: String,
    pub base_url: String,
}

impl ServerDescriptor {
    pub fn new(api_url: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            base_url: base_url.into(),
        }
    }

    /// `<api_url>/<hash>.<extension>`, without the dot when the extension is unknown.
    pub fn delete_url(&self, hash: &str, extension: &str) -> String {
        let api = self.api_url.trim_end_matches('/');
        if extension.is_empty() {
            format!("{}/{}", api, hash)
        } else {
            format!("{}/{}.{}", api, hash, extension)
        }
    }
}
