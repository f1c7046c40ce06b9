//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Initialize subsystems in dependency order (keys, node, cache, metrics)
//! - Run the request loop next to the metrics endpoint until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The metrics listener is bound before the loop starts, so a taken port stops the daemon
//! - Either long-running task failing stops the other

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinError;

use crate::blockchain::client::{HttpNodeClient, NodeClient};
use crate::blockchain::transaction::{Submitter, TxSubmitter};
use crate::blockchain::types::ChainError;
use crate::blockchain::wallet::{EnvKeyring, Keyring};
use crate::config::{check_config, ConfigError, DaemonConfig};
use crate::filecache::FileCache;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::trigger_on_signal;
use crate::observability::exporter::MetricsExporter;
use crate::observability::metrics::{DaemonCounters, MetricsSink, NoopMetrics};
use crate::requester::{ContextError, DaemonContext, RequestError, RequestLoop};

/// Errors that stop the daemon.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load keys: {0}")]
    Keyring(#[source] ChainError),

    #[error("failed to connect to node: {0}")]
    Node(#[source] ChainError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("failed to open file cache at {path}: {source}")]
    FileCache { path: PathBuf, source: io::Error },

    #[error("failed to bind metrics listener on {addr}: {source}")]
    MetricsBind { addr: String, source: io::Error },

    #[error("metrics endpoint failed: {0}")]
    MetricsServe(#[source] io::Error),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("task failed: {0}")]
    Task(#[from] JoinError),
}

/// Build every subsystem from `config` and run until shutdown.
pub async fn run_daemon(config: &DaemonConfig, home: &Path) -> Result<(), StartupError> {
    check_config(config)?;

    let keyring = Arc::new(
        EnvKeyring::load(&config.keys, &config.bech32_prefix).map_err(StartupError::Keyring)?,
    );

    tracing::info!(node = %config.node, "Creating HTTP client");
    let client: Arc<dyn NodeClient> = Arc::new(
        HttpNodeClient::new(&config.node, config.broadcast_timeout).map_err(StartupError::Node)?,
    );
    let status = client.start().await.map_err(StartupError::Node)?;
    if status.network != config.chain_id {
        tracing::warn!(
            expected = %config.chain_id,
            actual = %status.network,
            "Node reports a different chain ID"
        );
    } else {
        tracing::info!(
            chain_id = %status.network,
            height = status.latest_block_height,
            "Connected to node"
        );
    }

    let files_dir = home.join("files");
    let file_cache = FileCache::open(&files_dir).map_err(|source| StartupError::FileCache {
        path: files_dir.clone(),
        source,
    })?;

    let counters = Arc::new(DaemonCounters::new());
    let metrics: Arc<dyn MetricsSink> = if config.metrics_enabled() {
        counters.clone()
    } else {
        Arc::new(NoopMetrics)
    };

    let ctx = Arc::new(DaemonContext::from_config(
        config,
        client.clone(),
        keyring.list_keys(),
        file_cache,
        metrics,
    )?);

    tracing::info!(
        max_try = ctx.max_try,
        rpc_poll_interval = ?ctx.rpc_poll_interval,
        request_interval = ?ctx.request_interval,
        "Retry policy: failed submissions are retried indefinitely; max_try is reserved"
    );

    let exporter = if config.metrics_enabled() {
        let addr = config.metrics_bind_addr();
        tracing::info!(address = %addr, "Starting Prometheus listener");
        let exporter = MetricsExporter::bind(&addr, counters)
            .await
            .map_err(|source| StartupError::MetricsBind {
                addr: addr.clone(),
                source,
            })?;
        Some(exporter)
    } else {
        None
    };

    let submitter = Arc::new(TxSubmitter::new(
        client,
        keyring,
        config.chain_id.clone(),
        ctx.gas_prices.clone(),
    ));

    let shutdown = Shutdown::new();
    let signals = tokio::spawn(trigger_on_signal(shutdown.clone()));
    let result = run_tasks(ctx, submitter, exporter, shutdown).await;
    signals.abort();
    result
}

enum Exit {
    Loop(Result<Result<(), RequestError>, JoinError>),
    Exporter(Result<io::Result<()>, JoinError>),
}

/// Run the request loop and the optional exporter until one stops, then stop the other.
pub async fn run_tasks<S>(
    ctx: Arc<DaemonContext>,
    submitter: Arc<S>,
    exporter: Option<MetricsExporter>,
    shutdown: Shutdown,
) -> Result<(), StartupError>
where
    S: Submitter + ?Sized + 'static,
{
    let mut exporter_task = exporter.map(|e| tokio::spawn(e.serve(shutdown.subscribe())));

    let request_loop = RequestLoop::new(ctx, submitter);
    let loop_shutdown = shutdown.subscribe();
    let mut loop_task = tokio::spawn(async move { request_loop.run(loop_shutdown).await });

    let exit = match exporter_task.as_mut() {
        Some(exporter) => tokio::select! {
            joined = &mut loop_task => Exit::Loop(joined),
            joined = exporter => Exit::Exporter(joined),
        },
        None => Exit::Loop((&mut loop_task).await),
    };
    shutdown.trigger();

    match exit {
        Exit::Loop(joined) => {
            if let Some(task) = exporter_task {
                match task.await {
                    Ok(Err(e)) => tracing::warn!(error = %e, "Metrics endpoint stopped with error"),
                    Err(e) => tracing::warn!(error = %e, "Metrics task failed"),
                    Ok(Ok(())) => {}
                }
            }
            joined??;
        }
        Exit::Exporter(joined) => {
            let served = joined?;
            let looped = loop_task.await?;
            served.map_err(StartupError::MetricsServe)?;
            looped?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
