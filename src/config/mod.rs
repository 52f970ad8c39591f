//! Configuration module for fapi-trader.
//!
//! Configuration is read once at startup from the process environment
//! (after `.env` has been loaded) and handed to the pipeline as an immutable value.

mod broker_config;
mod observability_config;

pub use broker_config::{
    BinanceConfig, ClientSettings, Credentials, DEFAULT_RECV_WINDOW_MS, MAINNET_BASE_URL,
    MAX_RETRIES, REQUEST_TIMEOUT, RETRY_DELAY, TESTNET_BASE_URL, TIMESTAMP_OFFSET_MS,
};
pub use observability_config::ObservabilityEnvConfig;

use anyhow::{Context, Result};
use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub binance: BinanceConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let binance =
            BinanceConfig::from_lookup(&lookup).context("Failed to load exchange credentials")?;
        let observability = ObservabilityEnvConfig::from_lookup(&lookup);

        Ok(Self {
            binance,
            observability,
        })
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::new(self.binance.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_lookup() {
        let config = Config::from_lookup(|key| match key {
            "BINANCE_API_KEY" => Some("key".to_string()),
            "BINANCE_API_SECRET" => Some("secret".to_string()),
            "LOG_FILE" => Some("/tmp/trader.log".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.observability.log_file, "/tmp/trader.log");
        assert_eq!(config.client_settings().base_url, TESTNET_BASE_URL);
        assert_eq!(config.client_settings().max_retries, MAX_RETRIES);
    }

    #[test]
    fn test_config_error_mentions_credentials() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert!(format!("{:#}", err).contains("BINANCE_API_KEY"));
    }
}
