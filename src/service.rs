//! Authorization Service
//!
//! The two operations the surrounding request layer calls: hand a client the
//! typed data to co-sign for an item, and recover which address signed a
//! binding message. Item state comes from an [`ItemStateSource`].

use crate::config::AuthorityConfig;
use crate::eip712::{TypedDataBuilder, TypedPayload};
use crate::error::{AuthorityError, AuthorityResult};
use crate::message_signer::personal_sign_hash;
use crate::recovery::RecoverableSignature;
use crate::types::{AddressBinding, ItemInfo, ItemState};
use crate::utils::crypto::digest_hex;
use crate::{log_debug, log_info, log_warn};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

const MODULE: &str = "service";

// =============================================================================
// Types
// =============================================================================

/// Typed data for the client to sign, plus the digest it must sign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationPayload {
    pub typed_data: TypedPayload,
    /// `0x`-prefixed EIP-712 digest of `typed_data`
    pub digest: String,
}

/// Supplies the current state of an item
pub trait ItemStateSource {
    fn item_state(&self, item_id: &str) -> AuthorityResult<ItemState>;
}

/// Fixed item state for every id, until a real datastore is wired in
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderItemSource;

impl PlaceholderItemSource {
    pub const STATE: ItemState = ItemState {
        item_type: 1,
        strength: 10,
        level: 15,
        expire_time: 0,
    };
}

impl ItemStateSource for PlaceholderItemSource {
    fn item_state(&self, _item_id: &str) -> AuthorityResult<ItemState> {
        Ok(Self::STATE)
    }
}

// =============================================================================
// Service
// =============================================================================

/// Builds authorization payloads and verifies address bindings
#[derive(Debug, Clone)]
pub struct AuthorizationService<S> {
    builder: TypedDataBuilder,
    source: S,
}

impl AuthorizationService<PlaceholderItemSource> {
    /// Service over the default configuration and placeholder item state
    pub fn with_defaults() -> AuthorityResult<Self> {
        Self::new(AuthorityConfig::default(), PlaceholderItemSource)
    }
}

impl<S: ItemStateSource> AuthorizationService<S> {
    pub fn new(config: AuthorityConfig, source: S) -> AuthorityResult<Self> {
        let config = config.validate()?;
        let builder = TypedDataBuilder::from_config(&config)?;
        Ok(Self { builder, source })
    }

    pub fn builder(&self) -> &TypedDataBuilder {
        &self.builder
    }

    /// Typed data binding the item's current state, for the client to sign
    pub fn get_authorization_payload(&self, item_id: &str) -> AuthorityResult<AuthorizationPayload> {
        let token_id = normalize_item_id(item_id)?;
        let state = self.source.item_state(&token_id)?;
        let item = ItemInfo::from_state(token_id, state);

        let (typed_data, digest) = self.builder.build_with_digest(&item)?;
        let digest = digest_hex(&digest);

        log_info!(MODULE, "Built authorization payload", item_id = item.token_id, digest = digest);

        Ok(AuthorizationPayload { typed_data, digest })
    }

    /// Recover the address that personal-signed `message`
    ///
    /// Whether that address may be bound is the caller's decision.
    pub fn verify_address_binding(
        &self,
        message: &str,
        signature_hex: &str,
    ) -> AuthorityResult<AddressBinding> {
        let result = RecoverableSignature::from_hex(signature_hex).and_then(|signature| {
            let digest = personal_sign_hash(message.as_bytes());
            log_debug!(MODULE, "Recovering binding signer", digest = digest_hex(&digest));
            signature.recover(&digest)
        });

        match result {
            Ok(address) => {
                log_info!(MODULE, "Recovered binding address", address = address);
                Ok(AddressBinding { address })
            }
            Err(e) => {
                log_warn!(MODULE, "Address binding rejected", reason = e, signature = signature_hex);
                Err(e.into())
            }
        }
    }
}

/// Item ids become the uint256 token id, so they must be decimal integers
fn normalize_item_id(item_id: &str) -> AuthorityResult<String> {
    let trimmed = item_id.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AuthorityError::invalid_input(format!(
            "item id must be a decimal integer: {:?}",
            item_id
        )));
    }

    let value = U256::from_dec_str(trimmed).map_err(|_| {
        AuthorityError::invalid_input(format!("item id out of uint256 range: {}", trimmed))
    })?;
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::message_signer::personal_sign;
    use crate::recovery::address_from_private_key;

    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    struct MissingItems;

    impl ItemStateSource for MissingItems {
        fn item_state(&self, item_id: &str) -> AuthorityResult<ItemState> {
            Err(AuthorityError::item_not_found(format!("no item {}", item_id)))
        }
    }

    fn service() -> AuthorizationService<PlaceholderItemSource> {
        AuthorizationService::with_defaults().unwrap()
    }

    #[test]
    fn test_payload_uses_item_state() {
        let payload = service().get_authorization_payload("7").unwrap();
        let message = &payload.typed_data.message;

        assert_eq!(message["tokenId"], "7");
        assert_eq!(message["itemType"], 1);
        assert_eq!(message["strength"], 10);
        assert_eq!(message["level"], 15);
        assert_eq!(message["expireTime"], 0);
        assert!(payload.digest.starts_with("0x"));
        assert_eq!(payload.digest.len(), 66);
    }

    #[test]
    fn test_payload_is_deterministic() {
        let first = service().get_authorization_payload("7").unwrap();
        let second = service().get_authorization_payload("7").unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = service().get_authorization_payload("42").unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["typedData"]["primaryType"], "ItemInfo");
        assert_eq!(value["typedData"]["message"]["tokenId"], "42");
        assert!(value["digest"].is_string());
    }

    #[test]
    fn test_item_id_normalized() {
        let payload = service().get_authorization_payload(" 0007 ").unwrap();
        assert_eq!(payload.typed_data.message["tokenId"], "7");
    }

    #[test]
    fn test_non_decimal_item_id_rejected() {
        for bad in ["", "abc", "-1", "0x07", "1.5"] {
            let err = service().get_authorization_payload(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidInput, "{:?}", bad);
        }
    }

    #[test]
    fn test_item_id_beyond_uint256_rejected() {
        let too_big = "1".repeat(80);
        let err = service().get_authorization_payload(&too_big).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_source_error_propagates() {
        let service = AuthorizationService::new(AuthorityConfig::default(), MissingItems).unwrap();
        let err = service.get_authorization_payload("9").unwrap_err();
        assert_eq!(err.code, ErrorCode::ItemNotFound);
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AuthorityConfig::default();
        config.primary_type = "Hero".to_string();
        assert!(AuthorizationService::new(config, PlaceholderItemSource).is_err());
    }

    #[test]
    fn test_verify_address_binding() {
        let key = hex::decode(TEST_KEY).unwrap();
        let signature = personal_sign(b"hello", &key).unwrap();

        let binding = service()
            .verify_address_binding("hello", &signature.to_hex())
            .unwrap();
        assert_eq!(binding.address, address_from_private_key(&key).unwrap());
        assert_eq!(
            binding.address.to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_verify_different_message_gives_different_address() {
        let key = hex::decode(TEST_KEY).unwrap();
        let signature = personal_sign(b"hello", &key).unwrap();

        let binding = service()
            .verify_address_binding("hello!", &signature.to_hex())
            .ok();
        assert_ne!(
            binding.map(|b| b.address),
            Some(address_from_private_key(&key).unwrap())
        );
    }

    #[test]
    fn test_verify_rejects_short_signature() {
        let err = service()
            .verify_address_binding("hello", &format!("0x{}", "11".repeat(64)))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedSignature);
    }

    #[test]
    fn test_verify_rejects_bad_v() {
        let key = hex::decode(TEST_KEY).unwrap();
        let mut signature = personal_sign(b"hello", &key).unwrap();
        signature.v = 1;

        let err = service()
            .verify_address_binding("hello", &signature.to_hex())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRecoveryId);
    }

    #[test]
    fn test_verify_rejects_bad_hex() {
        let err = service().verify_address_binding("hello", "0xzz").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidHex);
        assert!(err.is_client_error());
    }
}
