//! Signer derivation and input parsing for addresses and hashes.

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;

use crate::error::{PolygonError, Result};

/// Derives a signer from a hex private key, with or without `0x`.
///
/// Called on every signing operation; the client never keeps a signer.
pub fn signer_from_private_key(private_key: &str) -> Result<PrivateKeySigner> {
    let key = private_key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    let bytes = hex::decode(key).map_err(|e| PolygonError::InvalidPrivateKey(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(PolygonError::InvalidPrivateKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    PrivateKeySigner::from_slice(&bytes).map_err(|e| PolygonError::InvalidPrivateKey(e.to_string()))
}

/// Parses a 0x-prefixed 20-byte address. Mixed-case input must carry a
/// valid EIP-55 checksum.
pub fn parse_address(address: &str) -> Result<Address> {
    let trimmed = address.trim();
    if !trimmed.starts_with("0x") {
        return Err(PolygonError::invalid_address(address, "missing 0x prefix"));
    }
    let digits = &trimmed[2..];
    let mixed_case = digits.chars().any(|c| c.is_ascii_uppercase())
        && digits.chars().any(|c| c.is_ascii_lowercase());
    if mixed_case {
        Address::parse_checksummed(trimmed, None)
            .map_err(|e| PolygonError::invalid_address(address, e))
    } else {
        Address::from_str(trimmed).map_err(|e| PolygonError::invalid_address(address, e))
    }
}

/// Parses a 0x-prefixed 32-byte transaction hash.
pub fn parse_tx_hash(hash: &str) -> Result<B256> {
    B256::from_str(hash.trim()).map_err(|e| PolygonError::InvalidHash {
        hash: hash.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key (account #0 of the default test mnemonic)
    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_signer_with_prefix() {
        let signer = signer_from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(signer.address(), parse_address(TEST_ADDRESS).unwrap());
    }

    #[test]
    fn test_signer_without_prefix() {
        let signer = signer_from_private_key(&TEST_PRIVATE_KEY[2..]).unwrap();
        assert_eq!(signer.address(), parse_address(TEST_ADDRESS).unwrap());
    }

    #[test]
    fn test_signer_invalid_hex() {
        let err = signer_from_private_key("not-valid").unwrap_err();
        assert!(matches!(err, PolygonError::InvalidPrivateKey(_)));
    }

    #[test]
    fn test_signer_wrong_length() {
        assert!(signer_from_private_key("0x1234").is_err());
        let long_key = format!("0x{}", "a".repeat(128));
        assert!(signer_from_private_key(&long_key).is_err());
    }

    #[test]
    fn test_signer_zero_key_rejected() {
        let zero = format!("0x{}", "0".repeat(64));
        assert!(signer_from_private_key(&zero).is_err());
    }

    #[test]
    fn test_parse_address_lowercase() {
        let addr = parse_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
        assert_eq!(addr, parse_address(TEST_ADDRESS).unwrap());
    }

    #[test]
    fn test_parse_address_bad_checksum() {
        // Flip the case of one letter in a checksummed address
        let bad = "0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
        assert!(parse_address(bad).is_err());
    }

    #[test]
    fn test_parse_address_checksum_against_derived_signer() {
        // Account #1 of the default test mnemonic
        let signer = signer_from_private_key(
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        )
        .unwrap();
        let checksummed = signer.address().to_checksum(None);
        assert_eq!(checksummed, "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        assert_eq!(parse_address(&checksummed).unwrap(), signer.address());

        // Plausible-looking mixed case that is not the EIP-55 form
        let err = parse_address("0x742d35Cc6634C0532925a3b844Bc9e7595f5fFb9").unwrap_err();
        assert!(matches!(err, PolygonError::InvalidAddress { .. }));
        assert!(parse_address("0x742d35cc6634c0532925a3b844bc9e7595f5ffb9").is_ok());
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(parse_address("0xYourWalletAddress").is_err());
        assert!(parse_address("f39fd6e51aad88f6f4ce6ab8827279cfffb92266").is_err());
        assert!(parse_address("0x1234").is_err());
    }

    #[test]
    fn test_parse_tx_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert!(parse_tx_hash(&hash).is_ok());
        assert!(matches!(parse_tx_hash("0xabc"), Err(PolygonError::InvalidHash { .. })));
    }
}
