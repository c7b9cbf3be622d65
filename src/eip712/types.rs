//! EIP-712 Type Definitions
//!
//! Core data structures for EIP-712 typed data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the domain struct type
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// Struct type name -> ordered field list. Field order drives the encoding.
pub type TypeSchema = BTreeMap<String, Vec<TypedDataField>>;

/// A field in a struct type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint256", "bytes32")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// The EIP-712 signing domain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    /// The human-readable name of the signing domain
    pub name: String,

    /// The current major version of the signing domain
    pub version: String,

    /// The EIP-155 chain ID
    pub chain_id: u64,

    /// Contract that will verify the signature, lowercase hex with `0x`
    pub verifying_contract: String,
}

impl Eip712Domain {
    /// The standard four-field domain type
    pub fn default_fields() -> Vec<TypedDataField> {
        vec![
            TypedDataField::new("name", "string"),
            TypedDataField::new("version", "string"),
            TypedDataField::new("chainId", "uint256"),
            TypedDataField::new("verifyingContract", "address"),
        ]
    }

    /// Domain values keyed by field name, for struct hashing
    pub fn to_value(&self) -> Result<serde_json::Value, Eip712Error> {
        serde_json::to_value(self).map_err(|e| Eip712Error::InvalidJson(e.to_string()))
    }
}

/// Complete EIP-712 typed data structure, as passed to `eth_signTypedData_v4`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    /// Type definitions (struct name -> fields)
    pub types: TypeSchema,

    /// The name of the primary type being signed
    pub primary_type: String,

    /// The EIP-712 domain
    pub domain: Eip712Domain,

    /// Field values of the primary type
    pub message: serde_json::Map<String, serde_json::Value>,
}

/// The payload handed to a client for signing
pub type TypedPayload = TypedData;

impl TypedData {
    /// Parse typed data from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Eip712Error> {
        serde_json::from_str(json).map_err(|e| Eip712Error::InvalidJson(e.to_string()))
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, Eip712Error> {
        serde_json::to_string(self).map_err(|e| Eip712Error::InvalidJson(e.to_string()))
    }

    /// Validate the typed data structure
    pub fn validate(&self) -> Result<(), Eip712Error> {
        validate_schema(&self.types, &self.primary_type)
    }
}

/// Check that the primary and domain types exist and every field type resolves
pub fn validate_schema(types: &TypeSchema, primary_type: &str) -> Result<(), Eip712Error> {
    if !types.contains_key(primary_type) {
        return Err(Eip712Error::InvalidPrimaryType(primary_type.to_string()));
    }

    if !types.contains_key(DOMAIN_TYPE) {
        return Err(Eip712Error::InvalidType(format!("{} is not declared", DOMAIN_TYPE)));
    }

    for fields in types.values() {
        for field in fields {
            validate_type(&field.type_name, types)?;
        }
    }

    Ok(())
}

/// Check if a type is valid (either a built-in type or defined in types)
fn validate_type(type_name: &str, types: &TypeSchema) -> Result<(), Eip712Error> {
    let base_type = if let Some(bracket_pos) = type_name.find('[') {
        let suffix = &type_name[bracket_pos..];
        if !suffix.ends_with(']') {
            return Err(Eip712Error::InvalidType(type_name.to_string()));
        }
        &type_name[..bracket_pos]
    } else {
        type_name
    };

    if is_atomic_type(base_type) || is_dynamic_type(base_type) || types.contains_key(base_type) {
        return Ok(());
    }

    Err(Eip712Error::InvalidType(type_name.to_string()))
}

/// Errors that can occur during EIP-712 operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Eip712Error {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Invalid primary type: {0}")]
    InvalidPrimaryType(String),

    #[error("Schema field missing from message: {0}")]
    SchemaFieldMissing(String),

    #[error("Invalid value for type {type_name}: {value}")]
    InvalidValue { type_name: String, value: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Check if a type is an atomic (fixed-size) type
pub fn is_atomic_type(type_name: &str) -> bool {
    if type_name == "address" || type_name == "bool" {
        return true;
    }

    // uintN and intN
    let bits = type_name
        .strip_prefix("uint")
        .or_else(|| type_name.strip_prefix("int"));
    if let Some(bits) = bits {
        if let Ok(n) = bits.parse::<u32>() {
            return n > 0 && n <= 256 && n % 8 == 0;
        }
        return false;
    }

    // bytesN (fixed-size bytes)
    if let Some(size) = type_name.strip_prefix("bytes") {
        if let Ok(n) = size.parse::<u32>() {
            return n > 0 && n <= 32;
        }
    }

    false
}

/// Check if a type is a dynamic type
pub fn is_dynamic_type(type_name: &str) -> bool {
    type_name == "bytes" || type_name == "string"
}
