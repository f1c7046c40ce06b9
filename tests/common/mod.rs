//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::State, routing::post, Json, Router};
use base64::Engine;
use prost::Message;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use price_requester::blockchain::client::NodeClient;
use price_requester::blockchain::msg::Msg;
use price_requester::blockchain::proto::{
    Any, BaseAccount, QueryAccountResponse, BASE_ACCOUNT_TYPE_URL,
};
use price_requester::blockchain::transaction::Submitter;
use price_requester::blockchain::types::{AccountInfo, ChainError, ChainResult, KeyInfo, NodeStatus};
use price_requester::config::DaemonConfig;
use price_requester::filecache::FileCache;
use price_requester::observability::metrics::MetricsSink;
use price_requester::requester::DaemonContext;

pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn test_key() -> KeyInfo {
    KeyInfo {
        name: "requester".into(),
        address: "band15428vq2uzwhm3taey9sr9x5vm6tk78ewqm4ak3".into(),
    }
}

/// Node that is never reached; submitters in these tests stand in for it.
pub struct UnusedNode;

#[async_trait]
impl NodeClient for UnusedNode {
    async fn start(&self) -> ChainResult<NodeStatus> {
        Err(ChainError::Rpc("unused".into()))
    }
    async fn get_account(&self, _address: &str) -> ChainResult<AccountInfo> {
        Err(ChainError::Rpc("unused".into()))
    }
    async fn broadcast_tx_commit(&self, _tx_bytes: Vec<u8>) -> ChainResult<String> {
        Err(ChainError::Rpc("unused".into()))
    }
}

/// Build a context with fast test intervals.
pub fn context(dir: &Path, metrics: Arc<dyn MetricsSink>) -> DaemonContext {
    let config = DaemonConfig {
        chain_id: "band-test".into(),
        requester: test_key().address,
        rpc_poll_interval: Duration::from_secs(1),
        request_interval: Duration::from_secs(30),
        ..Default::default()
    };
    DaemonContext::from_config(
        &config,
        Arc::new(UnusedNode),
        vec![test_key()],
        FileCache::open(dir).unwrap(),
        metrics,
    )
    .unwrap()
}

/// How a [`ScriptedSubmitter`] answers every call.
#[derive(Clone, Copy)]
pub enum Outcome {
    Commit,
    BroadcastFails,
    SigningFails,
}

/// Submitter that answers with a fixed outcome and counts calls.
pub struct ScriptedSubmitter {
    outcome: Outcome,
    calls: AtomicU64,
    gas_limits: Mutex<Vec<u64>>,
}

impl ScriptedSubmitter {
    pub fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicU64::new(0),
            gas_limits: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn gas_limits(&self) -> Vec<u64> {
        self.gas_limits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    async fn sign_and_broadcast(
        &self,
        _key: &KeyInfo,
        msgs: &[Msg],
        gas_limit: u64,
        _memo: &str,
    ) -> ChainResult<String> {
        assert_eq!(msgs.len(), 1);
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.gas_limits.lock().unwrap().push(gas_limit);
        match self.outcome {
            Outcome::Commit => Ok(format!("TX{:04}", n)),
            Outcome::BroadcastFails => Err(ChainError::Broadcast("mempool is full".into())),
            Outcome::SigningFails => Err(ChainError::Signing("key is locked".into())),
        }
    }
}

/// What the mock node saw and how it answers.
#[derive(Default)]
pub struct MockNodeState {
    pub network: String,
    pub account: Option<AccountInfo>,
    pub deliver_code: u32,
    pub broadcasts: Mutex<Vec<Vec<u8>>>,
}

/// Start a mock Tendermint JSON-RPC node on an ephemeral port.
pub async fn start_mock_node(state: Arc<MockNodeState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/", post(rpc)).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn rpc(State(state): State<Arc<MockNodeState>>, Json(body): Json<Value>) -> Json<Value> {
    let id = body["id"].clone();
    let b64 = base64::engine::general_purpose::STANDARD;

    let result = match body["method"].as_str().unwrap_or_default() {
        "status" => json!({
            "node_info": { "network": state.network },
            "sync_info": { "latest_block_height": "1200" },
        }),
        "abci_query" => match state.account {
            Some(account) => {
                let base = BaseAccount {
                    address: test_key().address,
                    pub_key: None,
                    account_number: account.account_number,
                    sequence: account.sequence,
                };
                let response = QueryAccountResponse {
                    account: Some(Any {
                        type_url: BASE_ACCOUNT_TYPE_URL.into(),
                        value: base.encode_to_vec(),
                    }),
                };
                json!({ "response": { "code": 0, "value": b64.encode(response.encode_to_vec()) } })
            }
            None => json!({ "response": { "code": 22, "log": "account not found" } }),
        },
        "broadcast_tx_commit" => {
            let tx = b64.decode(body["params"]["tx"].as_str().unwrap_or_default()).unwrap();
            state.broadcasts.lock().unwrap().push(tx);
            json!({
                "check_tx": { "code": 0 },
                "tx_result": { "code": state.deliver_code, "log": "out of gas" },
                "hash": "5F1B0C",
                "height": "1201",
            })
        }
        other => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("method {} not found", other) },
            }))
        }
    };

    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}
