//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (counts > 0, min ≤ ask, intervals > 0)
//! - Parse derived values (gas prices, node URI, metrics address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DaemonConfig → Result<(), Vec<ValidationError>>
//! - Runs after CLI overrides, before anything connects

use std::collections::HashSet;

use thiserror::Error;

use crate::blockchain::address::parse_address;
use crate::blockchain::client::rpc_endpoint;
use crate::blockchain::coins::GasPrices;
use crate::config::schema::DaemonConfig;

/// Accepted levels; `none` and `off` silence logging.
const LOG_LEVELS: [&str; 7] = ["trace", "debug", "info", "warn", "error", "none", "off"];

/// A single semantic problem with the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chain_id must not be empty")]
    EmptyChainId,

    #[error("invalid node URI: {0}")]
    InvalidNode(String),

    #[error("invalid requester address '{address}': {reason}")]
    InvalidRequester { address: String, reason: String },

    #[error("symbols must contain at least one non-empty symbol")]
    NoSymbols,

    #[error("ask_count must be positive")]
    ZeroAskCount,

    #[error("min_count must be between 1 and ask_count ({ask_count}), got {min_count}")]
    InvalidMinCount { min_count: u64, ask_count: u64 },

    #[error("invalid gas_prices: {0}")]
    InvalidGasPrices(String),

    #[error("unknown log_level '{0}'")]
    InvalidLogLevel(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("invalid metrics_listen_addr '{0}'")]
    InvalidMetricsAddr(String),

    #[error("duplicate key name '{0}'")]
    DuplicateKey(String),

    #[error("invalid address '{address}' for key '{name}': {reason}")]
    InvalidKeyAddress { name: String, address: String, reason: String },
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &DaemonConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.chain_id.trim().is_empty() {
        errors.push(ValidationError::EmptyChainId);
    }

    if let Err(e) = rpc_endpoint(&config.node) {
        errors.push(ValidationError::InvalidNode(e.to_string()));
    }

    if let Err(e) = parse_address(&config.requester, &config.bech32_prefix) {
        errors.push(ValidationError::InvalidRequester {
            address: config.requester.clone(),
            reason: e.to_string(),
        });
    }

    if config.symbols.is_empty() || config.symbols.iter().any(|s| s.trim().is_empty()) {
        errors.push(ValidationError::NoSymbols);
    }

    if config.ask_count == 0 {
        errors.push(ValidationError::ZeroAskCount);
    }
    if config.min_count == 0 || config.min_count > config.ask_count {
        errors.push(ValidationError::InvalidMinCount {
            min_count: config.min_count,
            ask_count: config.ask_count,
        });
    }

    if let Err(e) = GasPrices::parse(&config.gas_prices) {
        errors.push(ValidationError::InvalidGasPrices(e.to_string()));
    }

    if !LOG_LEVELS.contains(&config.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(config.log_level.clone()));
    }

    for (name, value) in [
        ("broadcast_timeout", config.broadcast_timeout),
        ("rpc_poll_interval", config.rpc_poll_interval),
        ("request_interval", config.request_interval),
    ] {
        if value.is_zero() {
            errors.push(ValidationError::ZeroDuration(name));
        }
    }

    if config.metrics_enabled() && !is_listen_addr(&config.metrics_bind_addr()) {
        errors.push(ValidationError::InvalidMetricsAddr(
            config.metrics_listen_addr.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for key in &config.keys {
        if !seen.insert(key.name.as_str()) {
            errors.push(ValidationError::DuplicateKey(key.name.clone()));
        }
        if let Err(e) = parse_address(&key.address, &config.bech32_prefix) {
            errors.push(ValidationError::InvalidKeyAddress {
                name: key.name.clone(),
                address: key.address.clone(),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a non-empty host and a numeric port. Names are resolved at bind time.
fn is_listen_addr(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
