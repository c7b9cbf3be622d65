//! FFI Layer for the Hero Authority
//!
//! All C-ABI exports are defined here. Every function follows the same
//! pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `hero_auth_free_string`)
//!
//! Error handling: every function returns JSON with a `success` field.
//! On error, `success: false` and the `error` object is populated.
//!
//! Configuration is read from the environment on each call
//! (see [`AuthorityConfig::from_env`]).

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use serde::{Deserialize, Serialize};

use crate::config::AuthorityConfig;
use crate::error::{AuthorityError, AuthorityResult};
use crate::message_signer::personal_sign_hash;
use crate::service::{AuthorizationService, PlaceholderItemSource};
use crate::types::ApiResponse;
use crate::utils::crypto::digest_hex;
use crate::log_error;

const MODULE: &str = "ffi";

const FALLBACK_ERROR: &CStr =
    c"{\"success\":false,\"error\":{\"code\":\"internal\",\"message\":\"String conversion failed\"}}";

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any hero_auth_* function
///
/// # Safety
/// The pointer must have been returned by a hero_auth_* function and not
/// freed before.
#[unsafe(no_mangle)]
pub extern "C" fn hero_auth_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(s));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Copy a C string into an owned Rust string, or build the error JSON
fn parse_input(input: *const c_char) -> Result<String, *mut c_char> {
    if input.is_null() {
        return Err(error_response(AuthorityError::invalid_input("Null input pointer")));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    match c_str.to_str() {
        Ok(s) => Ok(s.to_owned()),
        Err(_) => Err(error_response(AuthorityError::invalid_input("Invalid UTF-8 string"))),
    }
}

/// Decode the request body for one call
fn parse_request<T: for<'de> Deserialize<'de>>(input: *const c_char) -> Result<T, *mut c_char> {
    let json_str = parse_input(input)?;
    serde_json::from_str(&json_str).map_err(|e| {
        error_response(AuthorityError::from(e).with_details("request body"))
    })
}

fn service() -> AuthorityResult<AuthorizationService<PlaceholderItemSource>> {
    AuthorizationService::new(AuthorityConfig::from_env()?, PlaceholderItemSource)
}

fn respond<T: Serialize>(result: AuthorityResult<T>) -> *mut c_char {
    match result {
        Ok(data) => success_response(data),
        Err(e) => {
            if !e.is_client_error() {
                log_error!(MODULE, "Request failed", code = format!("{:?}", e.code), error = e.message);
            }
            error_response(e)
        }
    }
}

/// Create a success response JSON string
fn success_response<T: Serialize>(data: T) -> *mut c_char {
    string_to_ptr(ApiResponse::ok(data).to_json())
}

/// Create an error response JSON string
fn error_response(error: AuthorityError) -> *mut c_char {
    let response: ApiResponse<()> = ApiResponse::err(error);
    string_to_ptr(response.to_json())
}

/// Convert Rust string to C string pointer
fn string_to_ptr(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => FALLBACK_ERROR.to_owned().into_raw(),
    }
}

// =============================================================================
// Authority Operations
// =============================================================================

/// Typed data the client signs to authorize an item's current state
///
/// # Input
/// ```json
/// { "itemId": "7" }
/// ```
///
/// # Output
/// ```json
/// {
///   "success": true,
///   "data": { "typedData": { ... }, "digest": "0x..." }
/// }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hero_auth_authorization_payload(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct PayloadRequest {
        item_id: String,
    }

    let request: PayloadRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    respond(service().and_then(|s| s.get_authorization_payload(&request.item_id)))
}

/// Recover the address that personal-signed a binding message
///
/// # Input
/// ```json
/// { "message": "...", "signature": "0x..." }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "address": "0x..." } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hero_auth_verify_address(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct VerifyRequest {
        message: String,
        signature: String,
    }

    let request: VerifyRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    respond(service().and_then(|s| s.verify_address_binding(&request.message, &request.signature)))
}

/// EIP-191 personal digest of a message
///
/// # Input
/// ```json
/// { "message": "hello" }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "digest": "0x..." } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn hero_auth_personal_digest(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct DigestRequest {
        message: String,
    }

    #[derive(Serialize)]
    struct DigestResponse {
        digest: String,
    }

    let request: DigestRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let digest = digest_hex(&personal_sign_hash(request.message.as_bytes()));
    respond(Ok(DigestResponse { digest }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::ptr;

    fn call(f: extern "C" fn(*const c_char) -> *mut c_char, input: &str) -> Value {
        let input = CString::new(input).unwrap();
        let out = f(input.as_ptr());
        let json = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_owned();
        hero_auth_free_string(out);
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_personal_digest() {
        let response = call(hero_auth_personal_digest, r#"{"message":"hello"}"#);
        assert_eq!(response["success"], true);
        assert_eq!(
            response["data"]["digest"],
            "0x50b2c43fd39106bafbba0da34fc430e1f91e3c96ea2acee2bc34119f92b37750"
        );
    }

    #[test]
    fn test_null_input() {
        let out = hero_auth_personal_digest(ptr::null());
        let json = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_owned();
        hero_auth_free_string(out);

        let response: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "invalid_input");
    }

    #[test]
    fn test_bad_json() {
        let response = call(hero_auth_verify_address, "{not json");
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "json_error");
    }

    #[test]
    fn test_malformed_signature() {
        let response = call(
            hero_auth_verify_address,
            r#"{"message":"hello","signature":"0x1234"}"#,
        );
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "malformed_signature");
    }

    #[test]
    fn test_free_null_is_noop() {
        hero_auth_free_string(ptr::null_mut());
    }
}
