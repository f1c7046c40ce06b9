//! Chain-specific types and error definitions.

use thiserror::Error;

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The signer's account could not be resolved on-chain.
    #[error("Failed to retrieve account: {0}")]
    AccountResolution(String),

    /// Building or signing the transaction failed locally.
    #[error("Failed to sign tx: {0}")]
    Signing(String),

    /// Broadcasting or committing the transaction failed.
    #[error("Failed to broadcast tx: {0}")]
    Broadcast(String),

    /// Invalid key material or keyring configuration.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// A node response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ChainError {
    /// Whether retrying the same operation can succeed.
    ///
    /// Signing failures come from local key material and will fail again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ChainError::Signing(_) | ChainError::Keyring(_))
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// On-chain account state needed to sign a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    pub account_number: u64,
    pub sequence: u64,
}

/// Summary of the node's `status` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    /// Chain ID the node is running (`node_info.network`).
    pub network: String,
    /// Latest committed block height.
    pub latest_block_height: u64,
}

/// A key available for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Local key name.
    pub name: String,
    /// Bech32 account address of the key.
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(ChainError::AccountResolution("not found".into()).is_retryable());
        assert!(ChainError::Broadcast("sequence mismatch".into()).is_retryable());
        assert!(ChainError::Rpc("connection refused".into()).is_retryable());
        assert!(!ChainError::Signing("bad key".into()).is_retryable());
        assert!(!ChainError::Keyring("missing".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ChainError::AccountResolution("account band1xyz not found".into());
        assert_eq!(
            err.to_string(),
            "Failed to retrieve account: account band1xyz not found"
        );

        let err = ChainError::Broadcast("timed out after 5s".into());
        assert!(err.to_string().starts_with("Failed to broadcast tx"));
    }
}
