//! HTTP transport handle and per-host routing.
//!
//! The transport owns a direct client and, optionally, a client that goes through
//! a proxy (typically Tor). Which one serves a request is decided per call by a
//! [`RoutingPolicy`] keyed on the request's host, so a processing URL on another
//! host than the API is routed on its own merits.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use nip96_core::ClientConfig;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tokio_util::sync::CancellationToken;

use crate::error::{Nip96Error, Nip96Result};

/// Decides whether requests to a host go through the proxy.
pub trait RoutingPolicy: Send + Sync {
    fn should_route(&self, host: &str) -> bool;
}

impl<F> RoutingPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn should_route(&self, host: &str) -> bool {
        self(host)
    }
}

/// Never routes; every request goes direct.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectRouting;

impl RoutingPolicy for DirectRouting {
    fn should_route(&self, _host: &str) -> bool {
        false
    }
}

/// Routes `.onion` hosts (optionally) and an explicit host list.
#[derive(Debug, Clone, Default)]
pub struct HostRouting {
    hosts: Vec<String>,
    onion: bool,
}

impl HostRouting {
    pub fn new(hosts: Vec<String>, onion: bool) -> Self {
        let hosts = hosts.into_iter().map(|h| h.to_lowercase()).collect();
        Self { hosts, onion }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.proxy_hosts.clone(), config.proxy_onion)
    }
}

impl RoutingPolicy for HostRouting {
    fn should_route(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        (self.onion && host.ends_with(".onion")) || self.hosts.iter().any(|h| *h == host)
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

/// Explicit transport handle passed to every operation.
#[derive(Clone)]
pub struct HttpTransport {
    direct: Client,
    proxied: Option<Client>,
}

impl Debug for HttpTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HttpTransport")
            .field("proxied", &self.proxied.is_some())
            .finish()
    }
}

impl HttpTransport {
    pub fn new(direct: Client) -> Self {
        Self {
            direct,
            proxied: None,
        }
    }

    pub fn with_proxied(mut self, proxied: Client) -> Self {
        self.proxied = Some(proxied);
        self
    }

    /// Build both clients from configuration. The proxied client exists only
    /// when `proxy_url` is set.
    pub fn from_config(config: &ClientConfig) -> Nip96Result<Self> {
        let builder = || {
            Client::builder()
                .timeout(config.request_timeout)
                .connect_timeout(config.connect_timeout)
        };

        let direct = builder().build()?;
        let mut transport = Self::new(direct);

        if let Some(proxy_url) = &config.proxy_url {
            let proxied = builder().proxy(reqwest::Proxy::all(proxy_url)?).build()?;
            transport = transport.with_proxied(proxied);
        }

        Ok(transport)
    }

    /// Pick the client for `url` according to `routing`.
    pub fn client_for(&self, url: &str, routing: &dyn RoutingPolicy) -> Nip96Result<&Client> {
        let host = host_of(url)?;
        if !routing.should_route(&host) {
            return Ok(&self.direct);
        }

        tracing::debug!(host = %host, "Routing request through proxy");
        self.proxied
            .as_ref()
            .ok_or(Nip96Error::RoutingUnavailable { host })
    }

    /// Send a request and read its body, aborting both if `cancel` fires.
    pub async fn send(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Nip96Result<HttpReply> {
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(HttpReply { status, body })
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Nip96Error::Cancelled),
            reply = exchange => reply.map_err(Nip96Error::from),
        }
    }
}

fn host_of(url: &str) -> Nip96Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| Nip96Error::InvalidRequest(format!("{}: {}", url, e)))?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| Nip96Error::InvalidRequest(format!("{}: URL has no host", url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_routing_matches_onion_and_listed_hosts() {
        let routing = HostRouting::new(vec!["Files.Example.com".to_string()], true);
        assert!(routing.should_route("abcdef.onion"));
        assert!(routing.should_route("files.example.com"));
        assert!(!routing.should_route("other.example.com"));

        let no_onion = HostRouting::new(Vec::new(), false);
        assert!(!no_onion.should_route("abcdef.onion"));
    }

    #[test]
    fn closures_are_policies() {
        let policy = |host: &str| host == "routed.test";
        assert!(policy.should_route("routed.test"));
        assert!(!DirectRouting.should_route("routed.test"));
    }

    #[test]
    fn routing_without_proxied_client_fails() {
        let transport = HttpTransport::new(Client::new());
        let err = transport
            .client_for("http://routed.test/api", &|_: &str| true)
            .unwrap_err();
        assert!(matches!(err, Nip96Error::RoutingUnavailable { host } if host == "routed.test"));
    }

    #[test]
    fn direct_hosts_use_direct_client() {
        let transport = HttpTransport::new(Client::new()).with_proxied(Client::new());
        assert!(transport
            .client_for("https://direct.test/upload", &DirectRouting)
            .is_ok());
        assert!(matches!(
            transport.client_for("not a url", &DirectRouting),
            Err(Nip96Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn from_config_builds_proxied_client_on_demand() {
        let direct_only = HttpTransport::from_config(&ClientConfig::default()).unwrap();
        assert!(direct_only.proxied.is_none());

        let config = ClientConfig {
            proxy_url: Some("socks5h://127.0.0.1:9050".to_string()),
            ..Default::default()
        };
        let routed = HttpTransport::from_config(&config).unwrap();
        assert!(routed.proxied.is_some());
    }
}
