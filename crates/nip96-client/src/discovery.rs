//! Capability discovery at `/.well-known/nostr/nip96.json`.

use nip96_core::{ServerDescriptor, ServerInfo, DISCOVERY_PATH};
use reqwest::header::USER_AGENT;
use reqwest::Url;
use tokio_util::sync::CancellationToken;

use crate::error::{Nip96Error, Nip96Result};
use crate::transport::{HttpTransport, RoutingPolicy};

/// URL of the capability document for `server_url`.
pub fn discovery_url(server_url: &str) -> String {
    format!("{}{}", server_url.trim_end_matches('/'), DISCOVERY_PATH)
}

pub struct CapabilityRetriever<'a> {
    transport: &'a HttpTransport,
    user_agent: &'a str,
}

impl<'a> CapabilityRetriever<'a> {
    pub fn new(transport: &'a HttpTransport, user_agent: &'a str) -> Self {
        Self {
            transport,
            user_agent,
        }
    }

    /// Fetch and parse the capability document. No retry.
    pub async fn fetch_info(
        &self,
        server_url: &str,
        routing: &dyn RoutingPolicy,
        cancel: &CancellationToken,
    ) -> Nip96Result<ServerInfo> {
        let url = discovery_url(server_url);
        let discovery_error = |reason: String| Nip96Error::Discovery {
            server: server_url.to_string(),
            reason,
        };

        let client = match self.transport.client_for(&url, routing) {
            Ok(client) => client,
            Err(Nip96Error::InvalidRequest(reason)) => return Err(discovery_error(reason)),
            Err(e) => return Err(e),
        };
        let request = client.get(&url).header(USER_AGENT, self.user_agent);
        let reply = match self.transport.send(request, cancel).await {
            Ok(reply) => reply,
            Err(Nip96Error::Transport(e)) => return Err(discovery_error(e.to_string())),
            Err(e) => return Err(e),
        };

        if !reply.status.is_success() {
            return Err(discovery_error(format!(
                "capability document returned HTTP {}",
                reply.status
            )));
        }

        serde_json::from_str(&reply.body)
            .map_err(|e| discovery_error(format!("malformed capability document: {}", e)))
    }

    /// Resolve the upload endpoint of `server_url`, following one delegation hop.
    pub async fn retrieve(
        &self,
        server_url: &str,
        routing: &dyn RoutingPolicy,
        cancel: &CancellationToken,
    ) -> Nip96Result<ServerDescriptor> {
        let info = self.fetch_info(server_url, routing, cancel).await?;
        if let Some(api_url) = info.api_url() {
            return descriptor(server_url, api_url);
        }

        let Some(delegate) = info.delegated_to_url() else {
            return Err(Nip96Error::Discovery {
                server: server_url.to_string(),
                reason: "capability document has no api_url".to_string(),
            });
        };

        tracing::debug!(server = %server_url, delegate = %delegate, "Following upload delegation");
        let delegated = self.fetch_info(delegate, routing, cancel).await?;
        match delegated.api_url() {
            Some(api_url) => descriptor(delegate, api_url),
            None => Err(Nip96Error::Discovery {
                server: server_url.to_string(),
                reason: format!("delegated server {} has no api_url", delegate),
            }),
        }
    }
}

/// Resolve a possibly relative `api_url` against the server it came from.
fn descriptor(base_url: &str, api_url: &str) -> Nip96Result<ServerDescriptor> {
    let invalid = |reason: String| Nip96Error::Discovery {
        server: base_url.to_string(),
        reason,
    };
    let base = Url::parse(base_url).map_err(|e| invalid(format!("invalid server URL: {}", e)))?;
    let resolved = base
        .join(api_url)
        .map_err(|e| invalid(format!("invalid api_url {}: {}", api_url, e)))?;

    Ok(ServerDescriptor::new(
        resolved.to_string(),
        base_url.trim_end_matches('/'),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_url_ignores_trailing_slash() {
        assert_eq!(
            discovery_url("https://files.example.com/"),
            "https://files.example.com/.well-known/nostr/nip96.json"
        );
    }

    #[test]
    fn absolute_api_url_is_kept() {
        let server = descriptor("https://a.test", "https://api.a.test/upload").unwrap();
        assert_eq!(server.api_url, "https://api.a.test/upload");
        assert_eq!(server.base_url, "https://a.test");
    }

    #[test]
    fn relative_api_url_is_resolved() {
        let server = descriptor("https://a.test/", "/api/v2/media").unwrap();
        assert_eq!(server.api_url, "https://a.test/api/v2/media");
    }

    #[test]
    fn invalid_base_is_a_discovery_error() {
        assert!(matches!(
            descriptor("not a url", "/api"),
            Err(Nip96Error::Discovery { .. })
        ));
    }
}
