//! Shared value types
//!
//! Addresses, item messages and the JSON response envelope used by the
//! FFI and CLI surfaces.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::utils::crypto::to_checksum_address;

/// A 20-byte account address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case form, e.g. `0xf39Fd6e5...`
    pub fn to_checksum(&self) -> String {
        to_checksum_address(&self.0)
    }

    /// Canonical lowercase form with `0x` prefix
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

/// Error returned when parsing an address string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address: {0}")]
pub struct ParseAddressError(pub String);

impl FromStr for Address {
    type Err = ParseAddressError;

    /// Accepts 40 hex chars with or without `0x`. Checksum casing is not enforced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if hex_part.len() != 40 {
            return Err(ParseAddressError(format!(
                "expected 40 hex chars, got {}",
                hex_part.len()
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|e| ParseAddressError(format!("invalid hex: {}", e)))?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Current state of an item, as supplied by whatever owns item storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemState {
    pub item_type: u64,
    pub strength: u64,
    pub level: u64,
    pub expire_time: u64,
}

/// The item state a client is asked to co-sign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInfo {
    /// Decimal token id, encoded as uint256
    pub token_id: String,
    pub item_type: u64,
    pub strength: u64,
    pub level: u64,
    pub expire_time: u64,
}

impl ItemInfo {
    pub fn from_state(token_id: impl Into<String>, state: ItemState) -> Self {
        Self {
            token_id: token_id.into(),
            item_type: state.item_type,
            strength: state.strength,
            level: state.level,
            expire_time: state.expire_time,
        }
    }
}

/// Result of a successful address-binding verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBinding {
    pub address: Address,
}

/// JSON envelope shared by the FFI and CLI surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<crate::error::AuthorityError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: crate::error::AuthorityError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_and_display() {
        let addr: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap();
        assert_eq!(addr.to_string(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(addr.to_lower_hex(), "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");

        let unprefixed: Address = "f39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(addr, unprefixed);
    }

    #[test]
    fn test_address_parse_rejects_bad_input() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz9fd6e51aad88f6f4ce6ab8827279cfffb92266".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_serde_uses_checksum() {
        let binding = AddressBinding {
            address: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap(),
        };
        let json = serde_json::to_string(&binding).unwrap();
        assert_eq!(json, r#"{"address":"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"}"#);

        let back: AddressBinding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, binding);
    }

    #[test]
    fn test_item_info_json_shape() {
        let info = ItemInfo::from_state(
            "7",
            ItemState { item_type: 1, strength: 10, level: 15, expire_time: 0 },
        );
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["tokenId"], "7");
        assert_eq!(value["itemType"], 1);
        assert_eq!(value["expireTime"], 0);
    }

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::ok("test_data".to_string());
        let json = response.to_json();
        assert!(json.contains(r#""success":true"#));
        assert!(json.contains("test_data"));
    }
}
