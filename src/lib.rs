//! Hero Authority Library
//!
//! Signature authority for game item state. The authority never holds a
//! client's key: it hands the client an EIP-712 payload describing an item
//! and later recovers which address signed a message.
//!
//! # Architecture
//!
//! This crate provides:
//! - **eip712**: Typed-data hashing and the authorization payload builder
//! - **message_signer**: EIP-191 `personal_sign` digests
//! - **recovery**: secp256k1 public-key recovery and address derivation
//! - **service**: The two authority operations over an item state source
//! - **config**: Signing domain and schema configuration
//! - **ffi**: C-ABI exports
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `hero_auth_free_string`)
//!
//! # Concurrency
//!
//! Hashing, building and recovery are pure functions over immutable
//! configuration. An [`AuthorizationService`] can be shared across threads
//! whenever its item source can.
//!
//! # Example
//!
//! ```rust,ignore
//! use hero_auth::AuthorizationService;
//!
//! let service = AuthorizationService::with_defaults()?;
//! let payload = service.get_authorization_payload("7")?;
//! let binding = service.verify_address_binding("hello", &signature_hex)?;
//! println!("{} signed {}", binding.address, payload.digest);
//! ```

pub mod utils;
pub mod error;
pub mod types;
pub mod config;
pub mod recovery;
pub mod message_signer;
pub mod eip712;
pub mod service;
pub mod ffi;

// Re-export key types for convenience
pub use error::{AuthorityError, AuthorityResult, ErrorCode};
pub use types::*;
pub use config::AuthorityConfig;
pub use recovery::{recover, RecoverableSignature, SignatureError};
pub use message_signer::{personal_sign_hash as digest_personal, recover_personal};
pub use eip712::{hash_typed_data, Eip712Error, TypedData, TypedDataBuilder, TypedPayload};
pub use service::{AuthorizationPayload, AuthorizationService, ItemStateSource, PlaceholderItemSource};

// Re-export crypto utilities for binaries
pub use utils::crypto::{keccak256, to_checksum_address};

// Re-export FFI functions at crate root
pub use ffi::{
    hero_auth_authorization_payload,
    hero_auth_free_string,
    hero_auth_personal_digest,
    hero_auth_verify_address,
};
