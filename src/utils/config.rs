//! Wallet Configuration
//!
//! Runtime settings for derivation and the transaction source:
//! - Network (mainnet or testnet)
//! - Esplora REST endpoint, validated with `url`
//! - Request timeout
//! - HD gap limit (addresses derived per chain)
//! - Minimum log level
//!
//! Loaded from defaults, a JSON document, or `GOLD_WALLET_*` environment
//! variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{WalletError, WalletResult};
use crate::types::Chain;
use crate::utils::logging::LogLevel;

pub const ENV_NETWORK: &str = "GOLD_WALLET_NETWORK";
pub const ENV_ESPLORA_URL: &str = "GOLD_WALLET_ESPLORA_URL";
pub const ENV_TIMEOUT_SECS: &str = "GOLD_WALLET_TIMEOUT_SECS";
pub const ENV_GAP_LIMIT: &str = "GOLD_WALLET_GAP_LIMIT";
pub const ENV_LOG_LEVEL: &str = "GOLD_WALLET_LOG_LEVEL";

const MAX_GAP_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub chain: Chain,
    /// Overrides the chain's default endpoint when set
    pub esplora_url: Option<String>,
    pub request_timeout_secs: u64,
    pub gap_limit: u32,
    pub log_level: LogLevel,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            chain: Chain::Bitcoin,
            esplora_url: None,
            request_timeout_secs: 30,
            gap_limit: 10,
            log_level: LogLevel::Info,
        }
    }
}

impl WalletConfig {
    pub fn from_json(json: &str) -> WalletResult<Self> {
        let config: WalletConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with any `GOLD_WALLET_*` variables that are set.
    pub fn from_env() -> WalletResult<Self> {
        let mut config = Self::default();

        if let Ok(value) = env::var(ENV_NETWORK) {
            config.chain = value.parse().map_err(WalletError::config)?;
        }
        if let Ok(value) = env::var(ENV_ESPLORA_URL) {
            config.esplora_url = Some(value);
        }
        if let Ok(value) = env::var(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = value.trim().parse().map_err(|_| {
                WalletError::config(format!("{} must be a number of seconds", ENV_TIMEOUT_SECS))
            })?;
        }
        if let Ok(value) = env::var(ENV_GAP_LIMIT) {
            config.gap_limit = value.trim().parse().map_err(|_| {
                WalletError::config(format!("{} must be a positive integer", ENV_GAP_LIMIT))
            })?;
        }
        if let Ok(value) = env::var(ENV_LOG_LEVEL) {
            config.log_level = value.parse().map_err(WalletError::config)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WalletResult<()> {
        if self.gap_limit == 0 || self.gap_limit > MAX_GAP_LIMIT {
            return Err(WalletError::config(format!(
                "gap limit must be between 1 and {}",
                MAX_GAP_LIMIT
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(WalletError::config("request timeout must be positive"));
        }
        if let Some(url) = &self.esplora_url {
            validate_endpoint(url)?;
        }
        Ok(())
    }

    pub fn network(&self) -> bitcoin::Network {
        self.chain.network()
    }

    /// Endpoint with any trailing slash removed.
    pub fn esplora_url(&self) -> String {
        self.esplora_url
            .as_deref()
            .unwrap_or_else(|| self.chain.default_esplora_url())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// HTTPS is required for remote hosts; plain HTTP only for local nodes.
fn validate_endpoint(raw: &str) -> WalletResult<()> {
    let parsed = Url::parse(raw)
        .map_err(|e| WalletError::config(format!("Invalid URL format: {}", e)))?;

    match parsed.scheme() {
        "https" => Ok(()),
        "http" => match parsed.host_str() {
            Some("localhost") | Some("127.0.0.1") => Ok(()),
            Some(host) if host.starts_with("192.168.") => Ok(()),
            _ => Err(WalletError::config("HTTPS required for remote endpoints")),
        },
        other => Err(WalletError::config(format!("Unsupported URL scheme: {}", other))),
    }
}
