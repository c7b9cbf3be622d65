//! Unified error type for the authority surfaces
//!
//! The hashing, building and recovery modules each return their own
//! `thiserror` enum. Everything that crosses the service, FFI or CLI boundary
//! is converted into [`AuthorityError`], which serializes to the client-facing
//! JSON error object and maps onto an HTTP-style status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::eip712::Eip712Error;
use crate::recovery::SignatureError;

/// Main error type for authority operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorityError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AuthorityError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, msg)
    }

    pub fn item_not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ItemNotFound, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// True when the caller sent bad input and should not retry unchanged
    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }

    /// Status code the surrounding HTTP layer should answer with
    pub fn http_status(&self) -> u16 {
        match self.code {
            ErrorCode::ItemNotFound => 404,
            ErrorCode::ConfigError | ErrorCode::Internal => 500,
            ErrorCode::InvalidSchema | ErrorCode::EncodingError => 500,
            _ => 400,
        }
    }
}

impl fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for AuthorityError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Signature errors
    MalformedSignature,
    InvalidRecoveryId,
    RecoveryFailed,
    InvalidHex,

    // Typed data errors
    SchemaFieldMissing,
    InvalidSchema,
    EncodingError,

    // Input errors
    InvalidInput,
    JsonError,
    ItemNotFound,

    // Internal
    ConfigError,
    Internal,
}

/// Result type alias for authority operations
pub type AuthorityResult<T> = Result<T, AuthorityError>;

// Conversions from subsystem errors

impl From<SignatureError> for AuthorityError {
    fn from(e: SignatureError) -> Self {
        let code = match e {
            SignatureError::MalformedSignature { .. } => ErrorCode::MalformedSignature,
            SignatureError::InvalidRecoveryId(_) => ErrorCode::InvalidRecoveryId,
            SignatureError::RecoveryFailed(_) => ErrorCode::RecoveryFailed,
            SignatureError::InvalidHex(_) => ErrorCode::InvalidHex,
            SignatureError::InvalidPrivateKey(_) => ErrorCode::InvalidInput,
        };
        AuthorityError::new(code, e.to_string())
    }
}

impl From<Eip712Error> for AuthorityError {
    fn from(e: Eip712Error) -> Self {
        let code = match e {
            Eip712Error::SchemaFieldMissing(_) => ErrorCode::SchemaFieldMissing,
            Eip712Error::InvalidType(_) | Eip712Error::InvalidPrimaryType(_) => {
                ErrorCode::InvalidSchema
            }
            Eip712Error::InvalidValue { .. } | Eip712Error::InvalidAddress(_) => {
                ErrorCode::InvalidInput
            }
            Eip712Error::InvalidJson(_) => ErrorCode::JsonError,
            Eip712Error::EncodingError(_) => ErrorCode::EncodingError,
        };
        AuthorityError::new(code, e.to_string())
    }
}

impl From<serde_json::Error> for AuthorityError {
    fn from(e: serde_json::Error) -> Self {
        AuthorityError::new(ErrorCode::JsonError, e.to_string())
    }
}
