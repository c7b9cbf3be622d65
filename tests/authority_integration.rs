use ethers_core::types::{Signature as EthersSignature, H256};
use ethers_core::utils::hash_message;
use hero_auth::message_signer::{personal_sign, personal_sign_hash};
use hero_auth::recovery::{address_from_private_key, recover};
use hero_auth::{
    hash_typed_data, hero_auth_authorization_payload, hero_auth_free_string,
    hero_auth_verify_address, AuthorityConfig, AuthorizationService, ErrorCode,
    PlaceholderItemSource,
};
use serde_json::Value;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

// personal_sign("hello") under TEST_KEY, RFC 6979 nonce, low-s
const HELLO_SIGNATURE: &str = "0xf16ea9a3478698f695fd1401bfe27e9e4a7e8e3da94aa72b021125e31fa899cc573c48ea3fe1d4ab61a9db10c19032026e3ed2dbccba5a178235ac27f94504311c";

fn call_ffi(f: extern "C" fn(*const c_char) -> *mut c_char, input: &Value) -> Value {
    let input = CString::new(input.to_string()).unwrap();
    let out = f(input.as_ptr());
    let json = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_owned();
    hero_auth_free_string(out);
    serde_json::from_str(&json).unwrap()
}

#[test]
fn personal_digest_agrees_with_ethers() {
    for message in ["", "hello", "Bind wallet to hero #7", "世界!"] {
        let ours = personal_sign_hash(message.as_bytes());
        let theirs = hash_message(message);
        assert_eq!(ours, theirs.0, "digest mismatch for {:?}", message);
    }
}

#[test]
fn fixed_hello_signature_recovers_known_address() {
    let bytes = hex::decode(HELLO_SIGNATURE.trim_start_matches("0x")).unwrap();
    assert_eq!(bytes.len(), 65);

    let ours = recover(&personal_sign_hash(b"hello"), &bytes).unwrap();
    assert_eq!(ours.to_string(), TEST_ADDRESS);

    let ethers_sig = EthersSignature::try_from(&bytes[..]).unwrap();
    let theirs = ethers_sig.recover(H256(personal_sign_hash(b"hello"))).unwrap();
    assert_eq!(ours.0, theirs.0);

    let service = AuthorizationService::with_defaults().unwrap();
    let binding = service.verify_address_binding("hello", HELLO_SIGNATURE).unwrap();
    assert_eq!(binding.address.to_string(), TEST_ADDRESS);
}

#[test]
fn signing_hello_reproduces_fixed_signature() {
    let key = hex::decode(TEST_KEY).unwrap();
    assert_eq!(personal_sign(b"hello", &key).unwrap().to_hex(), HELLO_SIGNATURE);
}

#[test]
fn client_signs_payload_and_authority_recovers() {
    let service = AuthorizationService::new(AuthorityConfig::default(), PlaceholderItemSource).unwrap();
    let payload = service.get_authorization_payload("7").unwrap();

    let digest = hash_typed_data(&payload.typed_data).unwrap();
    assert_eq!(payload.digest, format!("0x{}", hex::encode(digest)));

    let key = hex::decode(TEST_KEY).unwrap();
    let signature = hero_auth::recovery::sign_digest(&digest, &key).unwrap();
    assert_eq!(
        recover(&digest, &signature.to_bytes()).unwrap(),
        address_from_private_key(&key).unwrap()
    );
}

#[test]
fn ffi_payload_matches_service() {
    let response = call_ffi(hero_auth_authorization_payload, &serde_json::json!({"itemId": "7"}));
    assert_eq!(response["success"], true);

    let service = AuthorizationService::with_defaults().unwrap();
    let expected = serde_json::to_value(service.get_authorization_payload("7").unwrap()).unwrap();

    // Environment overrides would change the domain, so compare the message only
    assert_eq!(response["data"]["typedData"]["message"], expected["typedData"]["message"]);
    assert_eq!(response["data"]["typedData"]["primaryType"], "ItemInfo");
}

#[test]
fn ffi_payload_rejects_bad_item_id() {
    let response = call_ffi(hero_auth_authorization_payload, &serde_json::json!({"itemId": "abc"}));
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "invalid_input");
}

#[test]
fn ffi_payload_requires_item_id() {
    let response = call_ffi(hero_auth_authorization_payload, &serde_json::json!({}));
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "json_error");
}

#[test]
fn ffi_verify_address_recovers_signer() {
    let key = hex::decode(TEST_KEY).unwrap();
    let signature = personal_sign(b"hello", &key).unwrap().to_hex();

    let response = call_ffi(
        hero_auth_verify_address,
        &serde_json::json!({"message": "hello", "signature": signature}),
    );
    assert_eq!(response["success"], true);
    assert_eq!(response["data"]["address"], "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
}

#[test]
fn ffi_verify_address_rejects_bad_v() {
    let key = hex::decode(TEST_KEY).unwrap();
    let mut signature = personal_sign(b"hello", &key).unwrap();
    signature.v = 29;

    let response = call_ffi(
        hero_auth_verify_address,
        &serde_json::json!({"message": "hello", "signature": signature.to_hex()}),
    );
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "invalid_recovery_id");
}

#[test]
fn service_errors_map_to_client_status() {
    let service = AuthorizationService::with_defaults().unwrap();
    let err = service.verify_address_binding("hello", "0x00").unwrap_err();
    assert_eq!(err.code, ErrorCode::MalformedSignature);
    assert_eq!(err.http_status(), 400);
}
