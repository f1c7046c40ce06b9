//! The request loop: build → estimate → submit → sleep or retry.
//!
//! # Suspension Points
//! - waiting on the submitter (account lookup, broadcast commit)
//! - the sleep after each attempt
//!
//! Both race the shutdown signal, so a shutdown never waits for a full interval.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::blockchain::gas::estimate_gas;
use crate::blockchain::msg::{Msg, MsgRequestData};
use crate::blockchain::transaction::Submitter;
use crate::obi::{self, ObiError, PriceInput};
use crate::requester::client_id::next_client_id;
use crate::requester::context::DaemonContext;
use crate::requester::RequestError;

/// Drives one submission at a time for the lifetime of the daemon.
pub struct RequestLoop<S: ?Sized> {
    ctx: Arc<DaemonContext>,
    submitter: Arc<S>,
}

impl<S: Submitter + ?Sized> RequestLoop<S> {
    pub fn new(ctx: Arc<DaemonContext>, submitter: Arc<S>) -> Self {
        Self { ctx, submitter }
    }

    /// Build this iteration's oracle request.
    pub fn build_message(&self) -> Result<Msg, ObiError> {
        let input = PriceInput::new(self.ctx.symbols.clone());
        let calldata = obi::encode(&input)?;

        Ok(Msg::RequestData(MsgRequestData {
            oracle_script_id: self.ctx.oracle_script_id,
            calldata,
            ask_count: self.ctx.ask_count,
            min_count: self.ctx.min_count,
            client_id: next_client_id(),
            fee_limit: Vec::new(),
            prepare_gas: self.ctx.prepare_gas,
            execute_gas: self.ctx.execute_gas,
            sender: self.ctx.requester.clone(),
        }))
    }

    /// Run until shutdown. Transient failures are retried forever; only a
    /// calldata bug or a signing failure ends the loop with an error.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RequestError> {
        let key = self.ctx.keys.first().cloned().ok_or(RequestError::NoKeys)?;
        let metrics = self.ctx.metrics.clone();

        tracing::info!(
            key = %key.name,
            oracle_script_id = self.ctx.oracle_script_id,
            symbols = ?self.ctx.symbols,
            "Request loop starting"
        );

        loop {
            let msgs = [self.build_message()?];
            let gas_limit = estimate_gas(&self.ctx.gas_prices, &msgs);

            metrics.set_pending(1);
            metrics.set_handling(1);
            let result = tokio::select! {
                result = self.submitter.sign_and_broadcast(&key, &msgs, gas_limit, "") => result,
                _ = shutdown.recv() => {
                    metrics.set_handling(0);
                    tracing::info!("Request loop received shutdown signal during submission");
                    return Ok(());
                }
            };
            metrics.set_handling(0);

            let delay = match result {
                Ok(tx_hash) => {
                    metrics.record_submitted();
                    metrics.set_pending(0);
                    tracing::info!(tx_hash = %tx_hash, gas_limit = gas_limit, "Request submitted");
                    self.ctx.request_interval
                }
                Err(e) if e.is_retryable() => {
                    metrics.record_error();
                    // Expected to heal on retry, so not logged as an error.
                    tracing::info!(error = %e, retry_in = ?self.ctx.rpc_poll_interval, "Submission failed");
                    self.ctx.rpc_poll_interval
                }
                Err(e) => {
                    metrics.record_error();
                    tracing::error!(error = %e, key = %key.name, "Submission failed permanently");
                    return Err(RequestError::Fatal(e));
                }
            };

            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Request loop received shutdown signal, exiting loop");
                    return Ok(());
                }
            }
        }
    }
}
