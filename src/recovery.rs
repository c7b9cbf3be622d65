//! Signature Recovery
//!
//! Recovers the signing address from a 32-byte digest and a 65-byte
//! recoverable secp256k1 signature (`r || s || v`).
//!
//! Only the legacy wire form `v ∈ {27, 28}` is accepted. It is normalized to
//! recovery id `{0, 1}` before the curve operation; every other `v` is
//! rejected, including the raw `{0, 1}` form.

use secp256k1::ecdsa::{RecoverableSignature as SecpRecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use crate::types::Address;
use crate::utils::crypto::keccak256;

/// Length of `r || s || v`
pub const SIGNATURE_LENGTH: usize = 65;

/// Offset added to the recovery id on the wire
const V_OFFSET: u8 = 27;

/// Errors raised while parsing or recovering a signature
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("malformed signature: expected 65 bytes, got {len}")]
    MalformedSignature { len: usize },

    #[error("invalid recovery id: v = {0}, expected 27 or 28")]
    InvalidRecoveryId(u8),

    #[error("signature recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("invalid signature hex: {0}")]
    InvalidHex(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// A recoverable ECDSA signature as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// v component, 27 or 28 for a well-formed signature
    pub v: u8,
}

impl RecoverableSignature {
    /// Create from raw components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Split a 65-byte `r || s || v` buffer. Only the length is checked here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::MalformedSignature { len: bytes.len() });
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);

        Ok(Self { r, s, v: bytes[64] })
    }

    /// Parse hex (`0x` prefix optional) into a signature
    pub fn from_hex(sig_hex: &str) -> Result<Self, SignatureError> {
        let trimmed = sig_hex.trim();
        let stripped = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = hex::decode(stripped).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Convert to 65-byte representation (r || s || v)
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// `0x`-prefixed lowercase hex of the 65 wire bytes
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Normalized recovery id (0 or 1)
    pub fn recovery_id(&self) -> Result<u8, SignatureError> {
        match self.v {
            27 | 28 => Ok(self.v - V_OFFSET),
            other => Err(SignatureError::InvalidRecoveryId(other)),
        }
    }

    /// Recover the signer of `digest`
    pub fn recover(&self, digest: &[u8; 32]) -> Result<Address, SignatureError> {
        let recovery_id = self.recovery_id()?;
        let public_key = recover_public_key(digest, &self.r, &self.s, recovery_id)?;
        Ok(public_key_to_address(&public_key))
    }
}

/// Recover the address that produced `signature` over `digest`
///
/// Length and `v` are validated before any curve arithmetic runs.
pub fn recover(digest: &[u8; 32], signature: &[u8]) -> Result<Address, SignatureError> {
    RecoverableSignature::from_bytes(signature)?.recover(digest)
}

/// Recover from a hex-encoded signature
pub fn recover_hex(digest: &[u8; 32], signature_hex: &str) -> Result<Address, SignatureError> {
    RecoverableSignature::from_hex(signature_hex)?.recover(digest)
}

fn recover_public_key(
    digest: &[u8; 32],
    r: &[u8; 32],
    s: &[u8; 32],
    recovery_id: u8,
) -> Result<PublicKey, SignatureError> {
    let secp = Secp256k1::verification_only();

    let rec_id = RecoveryId::from_i32(i32::from(recovery_id))
        .map_err(|_| SignatureError::InvalidRecoveryId(recovery_id + V_OFFSET))?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(r);
    compact[32..].copy_from_slice(s);

    // Rejects r or s at or above the curve order.
    let signature = SecpRecoverableSignature::from_compact(&compact, rec_id)
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;

    let message = Message::from_digest(*digest);

    secp.recover_ecdsa(&message, &signature)
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))
}

/// Derive the account address: last 20 bytes of keccak256(X || Y)
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    // Uncompressed encoding is 0x04 || X || Y
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address(address)
}

/// Address controlled by a raw 32-byte private key
pub fn address_from_private_key(private_key: &[u8]) -> Result<Address, SignatureError> {
    let secret_key = SecretKey::from_slice(private_key)
        .map_err(|e| SignatureError::InvalidPrivateKey(e.to_string()))?;
    let secp = Secp256k1::signing_only();
    Ok(public_key_to_address(&PublicKey::from_secret_key(&secp, &secret_key)))
}

/// Sign a digest, producing `v ∈ {27, 28}`. Nonces follow RFC 6979.
pub fn sign_digest(
    digest: &[u8; 32],
    private_key: &[u8],
) -> Result<RecoverableSignature, SignatureError> {
    if private_key.len() != 32 {
        return Err(SignatureError::InvalidPrivateKey(format!(
            "expected 32 bytes, got {}",
            private_key.len()
        )));
    }

    let secp = Secp256k1::signing_only();
    let secret_key = SecretKey::from_slice(private_key)
        .map_err(|e| SignatureError::InvalidPrivateKey(e.to_string()))?;

    let message = Message::from_digest(*digest);
    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&message, &secret_key)
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[..32]);
    s.copy_from_slice(&compact[32..]);

    Ok(RecoverableSignature::new(r, s, recovery_id.to_i32() as u8 + V_OFFSET))
}
