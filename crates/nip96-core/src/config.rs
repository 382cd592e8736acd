//! Configuration module
//!
//! Client settings loaded from `NIP96_*` environment variables. Every variable is
//! optional; unset variables fall back to the defaults below.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

// Common constants
const REQUEST_TIMEOUT_SECS: u64 = 300;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const POLL_INTERVAL_MS: u64 = 500;

/// Bounds on the processing poll loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between two polls.
    pub interval: Duration,
    /// Give up after this many polls. `None` polls until the server finishes.
    pub max_attempts: Option<u32>,
    /// Give up once this much time has passed since polling started.
    pub max_wait: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            max_attempts: None,
            max_wait: None,
        }
    }
}

/// Client configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub user_agent: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Proxy for routed hosts, e.g. `socks5h://127.0.0.1:9050`.
    pub proxy_url: Option<String>,
    /// Hosts always sent through the proxy.
    pub proxy_hosts: Vec<String>,
    /// Route `.onion` hosts through the proxy.
    pub proxy_onion: bool,
    pub poll: PollSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            proxy_url: None,
            proxy_hosts: Vec::new(),
            proxy_onion: true,
            poll: PollSettings::default(),
        }
    }
}

fn default_user_agent() -> String {
    format!("nip96-client/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let user_agent = get("NIP96_USER_AGENT").unwrap_or(defaults.user_agent);

        let request_timeout = parse_number::<u64>(&get, "NIP96_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let connect_timeout = parse_number::<u64>(&get, "NIP96_CONNECT_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);

        let proxy_hosts = get("NIP96_PROXY_HOSTS")
            .map(|hosts| {
                hosts
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let proxy_onion = match get("NIP96_PROXY_ONION") {
            None => defaults.proxy_onion,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                key: "NIP96_PROXY_ONION",
                reason: format!("expected true or false, got {}", raw),
            })?,
        };

        let poll = PollSettings {
            interval: parse_number::<u64>(&get, "NIP96_POLL_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll.interval),
            max_attempts: parse_number::<u32>(&get, "NIP96_POLL_MAX_ATTEMPTS")?,
            max_wait: parse_number::<u64>(&get, "NIP96_POLL_MAX_WAIT_SECS")?
                .map(Duration::from_secs),
        };

        let config = Self {
            user_agent,
            request_timeout,
            connect_timeout,
            proxy_url: get("NIP96_PROXY_URL"),
            proxy_hosts,
            proxy_onion,
            poll,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "NIP96_REQUEST_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "NIP96_CONNECT_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.poll.interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "NIP96_POLL_INTERVAL_MS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(proxy) = &self.proxy_url {
            let scheme = proxy.split_once("://").map(|(scheme, _)| scheme);
            if !matches!(scheme, Some("http" | "https" | "socks5" | "socks5h")) {
                return Err(ConfigError::InvalidProxyUrl(proxy.clone()));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key,
                reason: format!("expected a non-negative integer, got {}", raw),
            }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll.interval, Duration::from_millis(500));
        assert!(config.poll.max_attempts.is_none());
        assert!(config.user_agent.starts_with("nip96-client/"));
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("NIP96_USER_AGENT", "test-agent"),
            ("NIP96_PROXY_URL", "socks5h://127.0.0.1:9050"),
            ("NIP96_PROXY_HOSTS", "Files.Example.com, ,cdn.example.com"),
            ("NIP96_PROXY_ONION", "false"),
            ("NIP96_POLL_INTERVAL_MS", "50"),
            ("NIP96_POLL_MAX_ATTEMPTS", "10"),
            ("NIP96_POLL_MAX_WAIT_SECS", "60"),
        ])
        .unwrap();
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(
            config.proxy_hosts,
            vec!["files.example.com".to_string(), "cdn.example.com".to_string()]
        );
        assert!(!config.proxy_onion);
        assert_eq!(config.poll.interval, Duration::from_millis(50));
        assert_eq!(config.poll.max_attempts, Some(10));
        assert_eq!(config.poll.max_wait, Some(Duration::from_secs(60)));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("NIP96_PROXY_URL", "  ")]).unwrap();
        assert!(config.proxy_url.is_none());
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = load(&[("NIP96_POLL_MAX_ATTEMPTS", "lots")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "NIP96_POLL_MAX_ATTEMPTS",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(load(&[("NIP96_POLL_INTERVAL_MS", "0")]).is_err());
    }

    #[test]
    fn rejects_unknown_proxy_scheme() {
        let err = load(&[("NIP96_PROXY_URL", "ftp://proxy")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProxyUrl(_)));
    }
}
