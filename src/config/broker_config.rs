//! Exchange configuration parsing from environment variables.
//!
//! Credentials are mandatory; everything else falls back to testnet defaults.

use anyhow::{Result, bail};
use std::fmt;
use std::time::Duration;

pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";
pub const MAINNET_BASE_URL: &str = "https://fapi.binance.com";

pub const DEFAULT_RECV_WINDOW_MS: u32 = 60_000;
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(1);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Local clocks tend to run ahead of the exchange; signed timestamps are pulled back by this much
pub const TIMESTAMP_OFFSET_MS: i64 = 2_000;

/// API key pair. `Debug` never prints either half.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Binance USDT-M futures configuration
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub credentials: Credentials,
    pub testnet: bool,
    pub base_url: String,
}

impl BinanceConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("BINANCE_API_KEY").unwrap_or_default();
        let api_secret = lookup("BINANCE_API_SECRET").unwrap_or_default();
        if api_key.trim().is_empty() || api_secret.trim().is_empty() {
            bail!("BINANCE_API_KEY and BINANCE_API_SECRET must be set (environment or .env file)");
        }

        let testnet = lookup("USE_TESTNET")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let base_url = lookup("BINANCE_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| {
                if testnet {
                    TESTNET_BASE_URL.to_string()
                } else {
                    MAINNET_BASE_URL.to_string()
                }
            });

        Ok(Self {
            credentials: Credentials::new(api_key, api_secret),
            testnet,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Request pipeline tuning. Built once and never mutated.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub recv_window_ms: u32,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub timestamp_offset_ms: i64,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            max_retries: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
            request_timeout: REQUEST_TIMEOUT,
            timestamp_offset_ms: TIMESTAMP_OFFSET_MS,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::new(TESTNET_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_binance_config_defaults_to_testnet() {
        let config = BinanceConfig::from_lookup(lookup_from(&[
            ("BINANCE_API_KEY", "key"),
            ("BINANCE_API_SECRET", "secret"),
        ]))
        .unwrap();

        assert!(config.testnet);
        assert_eq!(config.base_url, TESTNET_BASE_URL);
        assert_eq!(config.credentials.api_key(), "key");
    }

    #[test]
    fn test_binance_config_production_and_override() {
        let production = BinanceConfig::from_lookup(lookup_from(&[
            ("BINANCE_API_KEY", "key"),
            ("BINANCE_API_SECRET", "secret"),
            ("USE_TESTNET", "False"),
        ]))
        .unwrap();
        assert!(!production.testnet);
        assert_eq!(production.base_url, MAINNET_BASE_URL);

        let custom = BinanceConfig::from_lookup(lookup_from(&[
            ("BINANCE_API_KEY", "key"),
            ("BINANCE_API_SECRET", "secret"),
            ("BINANCE_BASE_URL", "http://127.0.0.1:8080/"),
        ]))
        .unwrap();
        assert_eq!(custom.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_missing_credentials_are_fatal() {
        assert!(BinanceConfig::from_lookup(lookup_from(&[("BINANCE_API_KEY", "key")])).is_err());
        assert!(
            BinanceConfig::from_lookup(lookup_from(&[
                ("BINANCE_API_KEY", ""),
                ("BINANCE_API_SECRET", "secret"),
            ]))
            .is_err()
        );
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::new("my-key-123", "my-secret-456");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("my-key-123"));
        assert!(!printed.contains("my-secret-456"));
    }

    #[test]
    fn test_client_settings_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.recv_window_ms, 60_000);
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.retry_delay, Duration::from_secs(1));
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.timestamp_offset_ms, 2_000);
    }
}
