//! Ethereum Personal Message Hashing (EIP-191)
//!
//! Reference: https://eips.ethereum.org/EIPS/eip-191
//!
//! Format: "\x19Ethereum Signed Message:\n" + len(message) + message
//!
//! The length is the decimal byte length of the raw message with no padding.
//! Wallets compute exactly this digest for `personal_sign`, so any deviation
//! makes every real signature fail to verify.

use crate::recovery::{self, RecoverableSignature, SignatureError};
use crate::types::Address;
use crate::utils::crypto::keccak256_concat;

/// Ethereum message prefix for personal_sign
pub const ETH_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Hash a message with the Ethereum personal sign prefix
pub fn personal_sign_hash(message: &[u8]) -> [u8; 32] {
    let length = message.len().to_string();
    keccak256_concat(&[ETH_MESSAGE_PREFIX.as_bytes(), length.as_bytes(), message])
}

/// Sign a message the way a wallet's `personal_sign` does
///
/// Intended for tests and tooling; the service itself never holds keys.
pub fn personal_sign(
    message: &[u8],
    private_key: &[u8],
) -> Result<RecoverableSignature, SignatureError> {
    recovery::sign_digest(&personal_sign_hash(message), private_key)
}

/// Recover the signer's address from a personal_sign signature
pub fn recover_personal(message: &[u8], signature: &[u8]) -> Result<Address, SignatureError> {
    recovery::recover(&personal_sign_hash(message), signature)
}

/// Check that `signature` over `message` was produced by `expected`
pub fn verify_personal_sign(
    message: &[u8],
    signature: &[u8],
    expected: &Address,
) -> Result<bool, SignatureError> {
    Ok(recover_personal(message, signature)? == *expected)
}
