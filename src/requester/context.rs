//! Daemon context shared by the request loop.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::blockchain::client::NodeClient;
use crate::blockchain::coins::{CoinParseError, GasPrices};
use crate::blockchain::types::KeyInfo;
use crate::config::schema::DaemonConfig;
use crate::filecache::FileCache;
use crate::observability::metrics::MetricsSink;

/// Errors assembling the context from configuration.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("no key available")]
    NoKeys,

    #[error("invalid gas prices: {0}")]
    GasPrices(#[from] CoinParseError),
}

/// Everything the request loop reads, built once at startup.
pub struct DaemonContext {
    pub client: Arc<dyn NodeClient>,
    pub requester: String,
    pub oracle_script_id: u64,
    pub ask_count: u64,
    pub min_count: u64,
    pub symbols: Vec<String>,
    pub prepare_gas: u64,
    pub execute_gas: u64,
    pub gas_prices: GasPrices,
    /// Signing keys; the first one submits requests.
    pub keys: Vec<KeyInfo>,
    pub file_cache: FileCache,
    pub broadcast_timeout: Duration,
    pub rpc_poll_interval: Duration,
    pub request_interval: Duration,
    /// Read from config but not enforced: failed submissions retry indefinitely.
    pub max_try: u64,
    pub metrics: Arc<dyn MetricsSink>,
}

impl DaemonContext {
    /// Assemble the context from a validated configuration.
    pub fn from_config(
        config: &DaemonConfig,
        client: Arc<dyn NodeClient>,
        keys: Vec<KeyInfo>,
        file_cache: FileCache,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self, ContextError> {
        if keys.is_empty() {
            return Err(ContextError::NoKeys);
        }

        Ok(Self {
            client,
            requester: config.requester.clone(),
            oracle_script_id: config.oracle_script_id,
            ask_count: config.ask_count,
            min_count: config.min_count,
            symbols: config.symbols.clone(),
            prepare_gas: config.prepare_gas,
            execute_gas: config.execute_gas,
            gas_prices: GasPrices::parse(&config.gas_prices)?,
            keys,
            file_cache,
            broadcast_timeout: config.broadcast_timeout,
            rpc_poll_interval: config.rpc_poll_interval,
            request_interval: config.request_interval,
            max_try: config.max_try,
            metrics,
        })
    }
}

impl std::fmt::Debug for DaemonContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonContext")
            .field("requester", &self.requester)
            .field("oracle_script_id", &self.oracle_script_id)
            .field("ask_count", &self.ask_count)
            .field("min_count", &self.min_count)
            .field("symbols", &self.symbols)
            .field("gas_prices", &self.gas_prices.to_string())
            .field("keys", &self.keys.len())
            .finish()
    }
}
