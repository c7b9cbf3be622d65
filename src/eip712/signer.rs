//! EIP-712 Signing
//!
//! Signing and verification helpers for typed data. The authority never
//! signs payloads itself; signing is here for tests and tooling.

use super::hasher::hash_typed_data;
use super::types::*;
use crate::recovery::{self, RecoverableSignature};
use crate::types::Address;

/// Errors from signing or verifying typed data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypedSignError {
    #[error(transparent)]
    Encoding(#[from] Eip712Error),

    #[error(transparent)]
    Signature(#[from] recovery::SignatureError),
}

/// Sign EIP-712 typed data
pub fn sign_typed_data(
    typed_data: &TypedData,
    private_key: &[u8],
) -> Result<RecoverableSignature, TypedSignError> {
    let hash = hash_typed_data(typed_data)?;
    Ok(recovery::sign_digest(&hash, private_key)?)
}

/// Recover the signer of typed data
pub fn recover_typed_signer(
    typed_data: &TypedData,
    signature: &[u8],
) -> Result<Address, TypedSignError> {
    let hash = hash_typed_data(typed_data)?;
    Ok(recovery::recover(&hash, signature)?)
}

/// Verify an EIP-712 signature against an expected signer
pub fn verify_typed_data(
    typed_data: &TypedData,
    signature: &[u8],
    expected: &Address,
) -> Result<bool, TypedSignError> {
    Ok(recover_typed_signer(typed_data, signature)? == *expected)
}

#[cfg(test)]
mod signer_tests {
    use super::*;
    use crate::recovery::address_from_private_key;

    fn create_test_typed_data() -> TypedData {
        let json = r#"{
            "types": {
                "EIP712Domain": [
                    {"name": "name", "type": "string"},
                    {"name": "version", "type": "string"},
                    {"name": "chainId", "type": "uint256"},
                    {"name": "verifyingContract", "type": "address"}
                ],
                "ItemInfo": [
                    {"name": "tokenId", "type": "uint256"},
                    {"name": "itemType", "type": "uint256"},
                    {"name": "strength", "type": "uint256"},
                    {"name": "level", "type": "uint256"},
                    {"name": "expireTime", "type": "uint256"}
                ]
            },
            "primaryType": "ItemInfo",
            "domain": {
                "name": "GameItem",
                "version": "1",
                "chainId": 4,
                "verifyingContract": "0xb48366c616c7ce992981cfb354301da161687855"
            },
            "message": {
                "tokenId": "7",
                "itemType": 1,
                "strength": 10,
                "level": 15,
                "expireTime": 0
            }
        }"#;

        TypedData::from_json(json).unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        let typed_data = create_test_typed_data();

        // Known test private key (DO NOT USE IN PRODUCTION)
        let private_key = hex::decode(
            "6e97855fb478f18012146750022a417cb46dddc9814f6c46a22b34b71a2d0074"
        ).unwrap();
        let signer = address_from_private_key(&private_key).unwrap();

        let signature = sign_typed_data(&typed_data, &private_key).unwrap();
        let bytes = signature.to_bytes();

        assert_eq!(recover_typed_signer(&typed_data, &bytes).unwrap(), signer);
        assert!(verify_typed_data(&typed_data, &bytes, &signer).unwrap());
        assert!(!verify_typed_data(&typed_data, &bytes, &Address::ZERO).unwrap());
    }

    #[test]
    fn test_tampered_message_changes_signer() {
        let typed_data = create_test_typed_data();
        let private_key = hex::decode(
            "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
        ).unwrap();
        let signer = address_from_private_key(&private_key).unwrap();
        let signature = sign_typed_data(&typed_data, &private_key).unwrap();

        let mut tampered = typed_data.clone();
        tampered.message.insert("level".to_string(), serde_json::json!(99));

        let verified = verify_typed_data(&tampered, &signature.to_bytes(), &signer);
        assert!(!verified.unwrap_or(false));
    }

    #[test]
    fn test_invalid_signature_propagates() {
        let typed_data = create_test_typed_data();
        let result = recover_typed_signer(&typed_data, &[0u8; 64]);
        assert!(matches!(
            result,
            Err(TypedSignError::Signature(recovery::SignatureError::MalformedSignature { len: 64 }))
        ));
    }
}
