//! EIP-712 Hashing
//!
//! Domain separator and final signing digest.

use super::encoder::{hash_struct, hash_struct_fields};
use super::types::*;
use crate::utils::crypto::keccak256_concat;
use serde_json::{Map, Value};

/// Magic prefix for EIP-712 encoding
const EIP712_PREFIX: &[u8] = b"\x19\x01";

/// Calculate the domain separator hash
///
/// domainSeparator = hashStruct(eip712Domain), encoded with the
/// `EIP712Domain` fields declared in `types`
pub fn domain_separator(domain: &Eip712Domain, types: &TypeSchema) -> Result<[u8; 32], Eip712Error> {
    hash_struct(DOMAIN_TYPE, &domain.to_value()?, types)
}

/// Digest of structured data
///
/// hash = keccak256("\x19\x01" || domainSeparator || hashStruct(message))
pub fn hash_typed_message(
    domain: &Eip712Domain,
    types: &TypeSchema,
    primary_type: &str,
    message: &Map<String, Value>,
) -> Result<[u8; 32], Eip712Error> {
    Ok(pre_image(domain, types, primary_type, message)?.final_hash)
}

/// Calculate the final EIP-712 hash for a bundled payload
pub fn hash_typed_data(typed_data: &TypedData) -> Result<[u8; 32], Eip712Error> {
    typed_data.validate()?;

    hash_typed_message(
        &typed_data.domain,
        &typed_data.types,
        &typed_data.primary_type,
        &typed_data.message,
    )
}

/// The pre-image components, for clients that sign the parts themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eip712PreImage {
    pub domain_separator: [u8; 32],
    pub struct_hash: [u8; 32],
    pub final_hash: [u8; 32],
}

/// Calculate the pre-image components for EIP-712
pub fn get_pre_image(typed_data: &TypedData) -> Result<Eip712PreImage, Eip712Error> {
    typed_data.validate()?;

    pre_image(
        &typed_data.domain,
        &typed_data.types,
        &typed_data.primary_type,
        &typed_data.message,
    )
}

fn pre_image(
    domain: &Eip712Domain,
    types: &TypeSchema,
    primary_type: &str,
    message: &Map<String, Value>,
) -> Result<Eip712PreImage, Eip712Error> {
    let domain_separator = domain_separator(domain, types)?;
    let struct_hash = hash_struct_fields(primary_type, message, types)?;
    let final_hash = keccak256_concat(&[EIP712_PREFIX, &domain_separator, &struct_hash]);

    Ok(Eip712PreImage {
        domain_separator,
        struct_hash,
        final_hash,
    })
}
