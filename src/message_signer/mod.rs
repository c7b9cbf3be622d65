//! Message Signing Module
//!
//! Personal (free-form) message hashing and recovery. Only the Ethereum
//! `personal_sign` scheme is supported.

pub mod ethereum;

pub use ethereum::{
    personal_sign, personal_sign_hash, recover_personal, verify_personal_sign,
    ETH_MESSAGE_PREFIX,
};
