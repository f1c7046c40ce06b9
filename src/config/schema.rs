//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the daemon.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the price requester.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Chain ID of the target chain.
    pub chain_id: String,

    /// RPC URI of the node to connect to (e.g., "tcp://localhost:26657").
    pub node: String,

    /// Requester address this daemon submits on behalf of.
    pub requester: String,

    /// Bech32 human-readable prefix of account addresses.
    pub bech32_prefix: String,

    /// Oracle script to request.
    pub oracle_script_id: u64,

    /// Number of validators asked to report.
    pub ask_count: u64,

    /// Minimum number of reports needed to resolve.
    pub min_count: u64,

    /// Symbols to price.
    pub symbols: Vec<String>,

    /// Gas prices (e.g., "0.0025uband"); empty means no fee.
    pub gas_prices: String,

    /// Gas budget for the oracle script's prepare phase.
    pub prepare_gas: u64,

    /// Gas budget for the oracle script's execute phase.
    pub execute_gas: u64,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// How long to wait for a broadcast transaction to be committed.
    #[serde(with = "duration_str")]
    pub broadcast_timeout: Duration,

    /// Delay before retrying a failed submission.
    #[serde(with = "duration_str")]
    pub rpc_poll_interval: Duration,

    /// Delay between successful requests.
    #[serde(with = "duration_str")]
    pub request_interval: Duration,

    /// Maximum number of tries to submit a request transaction.
    pub max_try: u64,

    /// Address for the Prometheus metrics endpoint; empty disables metrics.
    pub metrics_listen_addr: String,

    /// Signing keys, first one is used for requests.
    pub keys: Vec<KeyConfig>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            chain_id: String::new(),
            node: "tcp://localhost:26657".to_string(),
            requester: String::new(),
            bech32_prefix: "band".to_string(),
            oracle_script_id: 37,
            ask_count: 4,
            min_count: 3,
            symbols: vec!["BTC".to_string(), "ETH".to_string()],
            gas_prices: String::new(),
            prepare_gas: 50_000,
            execute_gas: 300_000,
            log_level: "info".to_string(),
            broadcast_timeout: Duration::from_secs(5 * 60),
            rpc_poll_interval: Duration::from_secs(1),
            request_interval: Duration::from_secs(30),
            max_try: 5,
            metrics_listen_addr: String::new(),
            keys: Vec::new(),
        }
    }
}

impl DaemonConfig {
    /// Whether the metrics endpoint should be started.
    pub fn metrics_enabled(&self) -> bool {
        !self.metrics_listen_addr.is_empty()
    }

    /// Address to bind the metrics listener on. A bare `:port` listens on all interfaces.
    pub fn metrics_bind_addr(&self) -> String {
        match self.metrics_listen_addr.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port),
            None => self.metrics_listen_addr.clone(),
        }
    }
}

/// A signing key whose secret lives in an environment variable.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct KeyConfig {
    /// Local key name.
    pub name: String,

    /// Bech32 account address of the key.
    pub address: String,

    /// Environment variable holding the hex private key.
    pub private_key_env: String,
}

/// Durations as human-readable strings ("1s", "5m", "1h 30m").
mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
