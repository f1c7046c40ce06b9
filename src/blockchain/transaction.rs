//! Transaction building, signing and broadcasting.
//!
//! # Responsibilities
//! - Resolve the signer's account number and sequence
//! - Build a `SIGN_MODE_DIRECT` envelope with the requested gas limit
//! - Sign and broadcast, waiting for commit
//!
//! # Error Classes
//! - `AccountResolution`: key not on-chain yet or node unreachable (retryable)
//! - `Signing`: local key problem (fatal for this key)
//! - `Broadcast`: sequence race, mempool, node trouble (retryable)

use std::sync::Arc;

use async_trait::async_trait;
use prost::Message;

use crate::blockchain::client::NodeClient;
use crate::blockchain::coins::GasPrices;
use crate::blockchain::msg::Msg;
use crate::blockchain::proto::{
    self, Any, AuthInfo, Fee, ModeInfo, ModeInfoSingle, Secp256k1PubKey, SignDoc, SignerInfo,
    TxBody, TxRaw, SECP256K1_PUBKEY_TYPE_URL, SIGN_MODE_DIRECT,
};
use crate::blockchain::types::{AccountInfo, ChainError, ChainResult, KeyInfo};
use crate::blockchain::wallet::Keyring;

/// Signs and broadcasts a set of messages.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Returns the committed transaction hash.
    async fn sign_and_broadcast(
        &self,
        key: &KeyInfo,
        msgs: &[Msg],
        gas_limit: u64,
        memo: &str,
    ) -> ChainResult<String>;
}

/// Unsigned transaction parts ready for signing.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedTx {
    pub body_bytes: Vec<u8>,
    pub auth_info_bytes: Vec<u8>,
    pub sign_doc_bytes: Vec<u8>,
}

impl UnsignedTx {
    /// Encode the body, auth info and sign doc for one signer.
    pub fn build(
        chain_id: &str,
        account: AccountInfo,
        public_key: Vec<u8>,
        msgs: &[Msg],
        gas_limit: u64,
        gas_prices: &GasPrices,
        memo: &str,
    ) -> Self {
        let body = TxBody {
            messages: msgs.iter().map(Msg::to_any).collect(),
            memo: memo.to_string(),
            timeout_height: 0,
        };

        let auth_info = AuthInfo {
            signer_infos: vec![SignerInfo {
                public_key: Some(Any {
                    type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
                    value: Secp256k1PubKey { key: public_key }.encode_to_vec(),
                }),
                mode_info: Some(ModeInfo {
                    single: Some(ModeInfoSingle {
                        mode: SIGN_MODE_DIRECT,
                    }),
                }),
                sequence: account.sequence,
            }],
            fee: Some(Fee {
                amount: gas_prices
                    .fee_for(gas_limit)
                    .iter()
                    .map(proto::Coin::from)
                    .collect(),
                gas_limit,
                payer: String::new(),
                granter: String::new(),
            }),
        };

        let body_bytes = body.encode_to_vec();
        let auth_info_bytes = auth_info.encode_to_vec();
        let sign_doc_bytes = SignDoc {
            body_bytes: body_bytes.clone(),
            auth_info_bytes: auth_info_bytes.clone(),
            chain_id: chain_id.to_string(),
            account_number: account.account_number,
        }
        .encode_to_vec();

        Self {
            body_bytes,
            auth_info_bytes,
            sign_doc_bytes,
        }
    }

    /// Attach the signature and encode the broadcastable `TxRaw`.
    pub fn into_signed(self, signature: Vec<u8>) -> Vec<u8> {
        TxRaw {
            body_bytes: self.body_bytes,
            auth_info_bytes: self.auth_info_bytes,
            signatures: vec![signature],
        }
        .encode_to_vec()
    }
}

/// Submitter that talks to a node and signs with a keyring.
#[derive(Clone)]
pub struct TxSubmitter {
    client: Arc<dyn NodeClient>,
    keyring: Arc<dyn Keyring>,
    chain_id: String,
    gas_prices: GasPrices,
}

impl TxSubmitter {
    pub fn new(
        client: Arc<dyn NodeClient>,
        keyring: Arc<dyn Keyring>,
        chain_id: String,
        gas_prices: GasPrices,
    ) -> Self {
        Self {
            client,
            keyring,
            chain_id,
            gas_prices,
        }
    }
}

#[async_trait]
impl Submitter for TxSubmitter {
    async fn sign_and_broadcast(
        &self,
        key: &KeyInfo,
        msgs: &[Msg],
        gas_limit: u64,
        memo: &str,
    ) -> ChainResult<String> {
        let account = self
            .client
            .get_account(&key.address)
            .await
            .map_err(|e| match e {
                ChainError::AccountResolution(_) => e,
                other => ChainError::AccountResolution(other.to_string()),
            })?;

        let public_key = self
            .keyring
            .public_key(key)
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        let unsigned = UnsignedTx::build(
            &self.chain_id,
            account,
            public_key,
            msgs,
            gas_limit,
            &self.gas_prices,
            memo,
        );

        let signature = self
            .keyring
            .sign(key, &unsigned.sign_doc_bytes)
            .await
            .map_err(|e| match e {
                ChainError::Signing(_) => e,
                other => ChainError::Signing(other.to_string()),
            })?;

        tracing::debug!(
            key = %key.name,
            account_number = account.account_number,
            sequence = account.sequence,
            gas_limit = gas_limit,
            "Broadcasting transaction"
        );

        self.client
            .broadcast_tx_commit(unsigned.into_signed(signature))
            .await
            .map_err(|e| match e {
                ChainError::Broadcast(_) => e,
                other => ChainError::Broadcast(other.to_string()),
            })
    }
}
