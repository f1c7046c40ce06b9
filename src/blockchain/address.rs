//! Bech32 account addresses.
//!
//! An account address is `bech32(prefix, ripemd160(sha256(compressed_pubkey)))`.

use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Longest address payload the chain accepts.
const MAX_ADDRESS_LEN: usize = 255;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid bech32 prefix '{0}'")]
    InvalidPrefix(String),

    #[error("malformed bech32 address: {0}")]
    Malformed(String),

    #[error("expected prefix '{expected}', got '{actual}'")]
    WrongPrefix { expected: String, actual: String },

    #[error("address payload of {0} bytes is out of range")]
    BadLength(usize),
}

/// Account address of a compressed secp256k1 public key.
pub fn account_address(public_key: &[u8], prefix: &str) -> Result<String, AddressError> {
    let hrp = Hrp::parse(prefix).map_err(|e| AddressError::InvalidPrefix(format!("{}: {}", prefix, e)))?;
    let hash = Ripemd160::digest(Sha256::digest(public_key));
    bech32::encode::<Bech32>(hrp, hash.as_slice()).map_err(|e| AddressError::Malformed(e.to_string()))
}

/// Decode `address`, checking its checksum and prefix. Returns the payload bytes.
pub fn parse_address(address: &str, prefix: &str) -> Result<Vec<u8>, AddressError> {
    let (hrp, data) = bech32::decode(address).map_err(|e| AddressError::Malformed(e.to_string()))?;

    if !hrp.as_str().eq_ignore_ascii_case(prefix) {
        return Err(AddressError::WrongPrefix {
            expected: prefix.to_string(),
            actual: hrp.as_str().to_string(),
        });
    }
    if data.is_empty() || data.len() > MAX_ADDRESS_LEN {
        return Err(AddressError::BadLength(data.len()));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compressed public key of Anvil's first account.
    const PUBKEY: &str = "038318535b54105d4a7aae60c08fc45f9687181b4fdfc625bd1a753fa7397fed75";

    #[test]
    fn test_derive_from_public_key() {
        let pk = hex::decode(PUBKEY).unwrap();
        assert_eq!(
            account_address(&pk, "band").unwrap(),
            "band15428vq2uzwhm3taey9sr9x5vm6tk78ewqm4ak3"
        );
    }

    #[test]
    fn test_parse_valid_address() {
        let data = parse_address("band15428vq2uzwhm3taey9sr9x5vm6tk78ewqm4ak3", "band").unwrap();
        assert_eq!(hex::encode(data), "a55476015c13afb8afb92160329a8cde976f1f2e");
    }

    #[test]
    fn test_bad_checksum_is_rejected() {
        let err = parse_address("band1p40yh3zkmhcv0ecqp3mcazy83sa57rgjp07duq", "band").unwrap_err();
        assert!(matches!(err, AddressError::Malformed(_)));
        assert!(parse_address("band1p40yh3zkmhcv0ecqp3mcazy83sa57rgjp07dun", "band").is_ok());
    }

    #[test]
    fn test_wrong_prefix_and_garbage() {
        let err = parse_address("band15428vq2uzwhm3taey9sr9x5vm6tk78ewqm4ak3", "cosmos").unwrap_err();
        assert!(matches!(err, AddressError::WrongPrefix { .. }));

        assert!(parse_address("band1qqqqqq", "band").is_err());
        assert!(parse_address("", "band").is_err());
    }
}
