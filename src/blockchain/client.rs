//! Node RPC client.
//!
//! # Responsibilities
//! - Check the node at startup (`status`)
//! - Resolve account number and sequence (`abci_query` on the auth module)
//! - Broadcast a signed transaction and wait for commit (`broadcast_tx_commit`)
//! - Keep account errors and broadcast errors distinguishable

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use prost::Message;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::timeout;

use crate::blockchain::proto::{
    BaseAccount, QueryAccountRequest, QueryAccountResponse, ACCOUNT_QUERY_PATH,
    BASE_ACCOUNT_TYPE_URL,
};
use crate::blockchain::types::{AccountInfo, ChainError, ChainResult, NodeStatus};

/// Operations the daemon needs from a chain node.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Check the node is reachable and report what it is running.
    async fn start(&self) -> ChainResult<NodeStatus>;

    /// Resolve the account number and sequence of `address`.
    async fn get_account(&self, address: &str) -> ChainResult<AccountInfo>;

    /// Broadcast raw transaction bytes and wait until they are committed.
    ///
    /// Returns the transaction hash.
    async fn broadcast_tx_commit(&self, tx_bytes: Vec<u8>) -> ChainResult<String>;
}

/// Tendermint JSON-RPC client over HTTP.
pub struct HttpNodeClient {
    http: reqwest::Client,
    endpoint: url::Url,
    /// Deadline for queries.
    query_timeout: Duration,
    /// Deadline for a broadcast to be committed.
    broadcast_timeout: Duration,
    next_id: AtomicU64,
}

impl HttpNodeClient {
    /// Create a client for a node URI such as `tcp://localhost:26657`.
    pub fn new(node_uri: &str, broadcast_timeout: Duration) -> ChainResult<Self> {
        let endpoint = rpc_endpoint(node_uri)?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ChainError::Rpc(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            query_timeout: Duration::from_secs(10),
            broadcast_timeout,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> ChainResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Rpc(format!("{} request failed: {}", method, e)))?;

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(format!("{} response: {}", method, e)))?;

        match (envelope.result, envelope.error) {
            (_, Some(err)) => Err(ChainError::Rpc(format!(
                "{} returned error {}: {} {}",
                method,
                err.code,
                err.message,
                err.data.unwrap_or_default()
            ))),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ChainError::Decode(format!("{} returned no result", method))),
        }
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn start(&self) -> ChainResult<NodeStatus> {
        let fut = self.call::<StatusResult>("status", serde_json::json!({}));
        let status = match timeout(self.query_timeout, fut).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ChainError::Rpc(format!(
                    "status timed out after {:?}",
                    self.query_timeout
                )))
            }
        };

        let latest_block_height = status
            .sync_info
            .latest_block_height
            .parse()
            .map_err(|e| ChainError::Decode(format!("latest_block_height: {}", e)))?;

        Ok(NodeStatus {
            network: status.node_info.network,
            latest_block_height,
        })
    }

    async fn get_account(&self, address: &str) -> ChainResult<AccountInfo> {
        let request = QueryAccountRequest {
            address: address.to_string(),
        };
        let params = serde_json::json!({
            "path": ACCOUNT_QUERY_PATH,
            "data": hex::encode(request.encode_to_vec()),
            "prove": false,
        });

        let fut = self.call::<AbciQueryResult>("abci_query", params);
        let query = match timeout(self.query_timeout, fut).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(address = %address, "Account query timed out");
                return Err(ChainError::Rpc(format!(
                    "abci_query timed out after {:?}",
                    self.query_timeout
                )));
            }
        };

        let response = query.response;
        if response.code != 0 {
            return Err(ChainError::AccountResolution(format!(
                "account {} query failed with code {}: {}",
                address, response.code, response.log
            )));
        }

        let value = base64::engine::general_purpose::STANDARD
            .decode(response.value.unwrap_or_default())
            .map_err(|e| ChainError::Decode(format!("abci_query value: {}", e)))?;
        decode_account(address, &value)
    }

    async fn broadcast_tx_commit(&self, tx_bytes: Vec<u8>) -> ChainResult<String> {
        let params = serde_json::json!({
            "tx": base64::engine::general_purpose::STANDARD.encode(&tx_bytes),
        });

        let fut = self.call::<BroadcastCommitResult>("broadcast_tx_commit", params);
        let result = match timeout(self.broadcast_timeout, fut).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return Err(ChainError::Broadcast(e.to_string())),
            Err(_) => {
                return Err(ChainError::Broadcast(format!(
                    "not committed within {:?}",
                    self.broadcast_timeout
                )))
            }
        };

        result.into_hash()
    }
}

impl std::fmt::Debug for HttpNodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNodeClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("broadcast_timeout", &self.broadcast_timeout)
            .finish()
    }
}

/// Map a Tendermint node URI onto an HTTP endpoint; `tcp://` means plain HTTP.
pub fn rpc_endpoint(node_uri: &str) -> ChainResult<url::Url> {
    let normalized = match node_uri.strip_prefix("tcp://") {
        Some(rest) => format!("http://{}", rest),
        None => node_uri.to_string(),
    };
    let url: url::Url = normalized
        .parse()
        .map_err(|e| ChainError::Rpc(format!("Invalid node URI '{}': {}", node_uri, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ChainError::Rpc(format!(
            "Unsupported node URI scheme '{}' in '{}'",
            other, node_uri
        ))),
    }
}

fn decode_account(address: &str, value: &[u8]) -> ChainResult<AccountInfo> {
    let response = QueryAccountResponse::decode(value)
        .map_err(|e| ChainError::Decode(format!("QueryAccountResponse: {}", e)))?;
    let any = response.account.ok_or_else(|| {
        ChainError::AccountResolution(format!("account {} not found", address))
    })?;

    if any.type_url != BASE_ACCOUNT_TYPE_URL {
        return Err(ChainError::AccountResolution(format!(
            "account {} has unsupported type {}",
            address, any.type_url
        )));
    }

    let account = BaseAccount::decode(any.value.as_slice())
        .map_err(|e| ChainError::Decode(format!("BaseAccount: {}", e)))?;
    Ok(AccountInfo {
        account_number: account.account_number,
        sequence: account.sequence,
    })
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Deserialize)]
struct StatusResult {
    node_info: NodeInfo,
    sync_info: SyncInfo,
}

#[derive(Deserialize)]
struct NodeInfo {
    network: String,
}

#[derive(Deserialize)]
struct SyncInfo {
    latest_block_height: String,
}

#[derive(Deserialize)]
struct AbciQueryResult {
    response: AbciQueryResponse,
}

#[derive(Deserialize)]
struct AbciQueryResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Deserialize)]
struct BroadcastCommitResult {
    check_tx: TxResult,
    /// `deliver_tx` before Tendermint 0.37, `tx_result` after.
    #[serde(alias = "tx_result")]
    deliver_tx: TxResult,
    hash: String,
}

#[derive(Deserialize)]
struct TxResult {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
}

impl BroadcastCommitResult {
    fn into_hash(self) -> ChainResult<String> {
        if self.check_tx.code != 0 {
            return Err(ChainError::Broadcast(format!(
                "check_tx failed with code {}: {}",
                self.check_tx.code, self.check_tx.log
            )));
        }
        if self.deliver_tx.code != 0 {
            return Err(ChainError::Broadcast(format!(
                "deliver_tx failed with code {}: {}",
                self.deliver_tx.code, self.deliver_tx.log
            )));
        }
        Ok(self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::proto::Any;

    #[test]
    fn test_tcp_uri_maps_to_http() {
        let url = rpc_endpoint("tcp://localhost:26657").unwrap();
        assert_eq!(url.as_str(), "http://localhost:26657/");

        let url = rpc_endpoint("https://rpc.example.org").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let err = rpc_endpoint("ws://localhost:26657").unwrap_err();
        assert!(err.to_string().contains("Unsupported node URI scheme"));
    }

    #[test]
    fn test_decode_base_account() {
        let account = BaseAccount {
            address: "band1abc".into(),
            pub_key: None,
            account_number: 12,
            sequence: 7,
        };
        let response = QueryAccountResponse {
            account: Some(Any {
                type_url: BASE_ACCOUNT_TYPE_URL.into(),
                value: account.encode_to_vec(),
            }),
        };

        let info = decode_account("band1abc", &response.encode_to_vec()).unwrap();
        assert_eq!(info, AccountInfo { account_number: 12, sequence: 7 });
    }

    #[test]
    fn test_missing_account_is_account_error() {
        let response = QueryAccountResponse { account: None };
        let err = decode_account("band1abc", &response.encode_to_vec()).unwrap_err();
        assert!(matches!(err, ChainError::AccountResolution(_)));
    }

    #[test]
    fn test_broadcast_result_codes() {
        let ok: BroadcastCommitResult = serde_json::from_value(serde_json::json!({
            "check_tx": { "code": 0 },
            "tx_result": { "log": "[]" },
            "hash": "ABCDEF",
            "height": "42",
        }))
        .unwrap();
        assert_eq!(ok.into_hash().unwrap(), "ABCDEF");

        let failed: BroadcastCommitResult = serde_json::from_value(serde_json::json!({
            "check_tx": { "code": 32, "log": "account sequence mismatch" },
            "deliver_tx": {},
            "hash": "ABCDEF",
        }))
        .unwrap();
        let err = failed.into_hash().unwrap_err();
        assert!(matches!(err, ChainError::Broadcast(_)));
        assert!(err.to_string().contains("sequence mismatch"));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_rpc_error() {
        // Port 9 (discard) on localhost is not a Tendermint node.
        let client = HttpNodeClient::new("tcp://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client.start().await.unwrap_err();
        assert!(err.is_retryable());
    }
}
