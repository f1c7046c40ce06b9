//! Signing keys and the keyring interface.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - Each key's configured address must match the address derived from the key

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::blockchain::address::account_address;
use crate::blockchain::types::{ChainError, ChainResult, KeyInfo};
use crate::config::schema::KeyConfig;

/// Source of signing keys.
#[async_trait]
pub trait Keyring: Send + Sync {
    /// Keys available for signing, in configuration order.
    fn list_keys(&self) -> Vec<KeyInfo>;

    /// Compressed secp256k1 public key (33 bytes) of `key`.
    fn public_key(&self, key: &KeyInfo) -> ChainResult<Vec<u8>>;

    /// Sign `sign_bytes`, returning the 64-byte `r ‖ s` signature over their SHA-256.
    async fn sign(&self, key: &KeyInfo, sign_bytes: &[u8]) -> ChainResult<Vec<u8>>;
}

/// A single secp256k1 signing key.
#[derive(Debug, Clone)]
pub struct Wallet {
    info: KeyInfo,
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Security
    /// The private key is parsed and stored securely. It is never logged.
    pub fn from_private_key(info: KeyInfo, private_key_hex: &str) -> ChainResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex.parse().map_err(|e| {
            ChainError::Keyring(format!("Invalid private key format for '{}': {}", info.name, e))
        })?;

        tracing::info!(name = %info.name, address = %info.address, "Signing key loaded");

        Ok(Self { info, signer })
    }

    /// Load the key named in `config` from its environment variable and check
    /// it owns the configured address.
    pub fn from_env(config: &KeyConfig, prefix: &str) -> ChainResult<Self> {
        let private_key = std::env::var(&config.private_key_env).map_err(|_| {
            ChainError::Keyring(format!(
                "Environment variable {} for key '{}' not set",
                config.private_key_env, config.name
            ))
        })?;

        let wallet = Self::from_private_key(
            KeyInfo {
                name: config.name.clone(),
                address: config.address.clone(),
            },
            &private_key,
        )?;

        let derived = wallet.account_address(prefix)?;
        if !derived.eq_ignore_ascii_case(&config.address) {
            return Err(ChainError::Keyring(format!(
                "Key '{}' signs for {}, not the configured address {}",
                config.name, derived, config.address
            )));
        }
        Ok(wallet)
    }

    pub fn info(&self) -> &KeyInfo {
        &self.info
    }

    /// Compressed SEC1 public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.signer
            .credential()
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    /// Account address of this key under `prefix`.
    pub fn account_address(&self, prefix: &str) -> ChainResult<String> {
        account_address(&self.public_key(), prefix).map_err(|e| ChainError::Keyring(e.to_string()))
    }

    /// Sign SHA-256 of `message` and return the 64-byte `r ‖ s` signature.
    pub async fn sign(&self, message: &[u8]) -> ChainResult<Vec<u8>> {
        let hash = B256::from_slice(&Sha256::digest(message));
        let signature = self
            .signer
            .sign_hash(&hash)
            .await
            .map_err(|e| ChainError::Signing(format!("Signing failed: {}", e)))?;

        let mut out = Vec::with_capacity(64);
        out.extend_from_slice(&signature.r().to_be_bytes::<32>());
        out.extend_from_slice(&signature.s().to_be_bytes::<32>());
        Ok(out)
    }
}

/// Keyring backed by keys read from environment variables at startup.
#[derive(Debug, Clone, Default)]
pub struct EnvKeyring {
    wallets: Vec<Wallet>,
}

impl EnvKeyring {
    /// Load every configured key. A missing, malformed or mismatched key is an error.
    pub fn load(keys: &[KeyConfig], prefix: &str) -> ChainResult<Self> {
        let wallets = keys
            .iter()
            .map(|key| Wallet::from_env(key, prefix))
            .collect::<ChainResult<Vec<_>>>()?;
        Ok(Self { wallets })
    }

    pub fn from_wallets(wallets: Vec<Wallet>) -> Self {
        Self { wallets }
    }

    fn wallet(&self, key: &KeyInfo) -> ChainResult<&Wallet> {
        self.wallets
            .iter()
            .find(|w| w.info.name == key.name)
            .ok_or_else(|| ChainError::Signing(format!("Key '{}' not in keyring", key.name)))
    }
}

#[async_trait]
impl Keyring for EnvKeyring {
    fn list_keys(&self) -> Vec<KeyInfo> {
        self.wallets.iter().map(|w| w.info.clone()).collect()
    }

    fn public_key(&self, key: &KeyInfo) -> ChainResult<Vec<u8>> {
        Ok(self.wallet(key)?.public_key())
    }

    async fn sign(&self, key: &KeyInfo, sign_bytes: &[u8]) -> ChainResult<Vec<u8>> {
        self.wallet(key)?.sign(sign_bytes).await
    }
}
