//! EIP-712 Typed Data
//!
//! Typed structured data hashing plus the builder that produces item
//! authorization payloads.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use hero_auth::eip712::{TypedDataBuilder, hash_typed_data};
//!
//! let builder = TypedDataBuilder::from_config(&config)?;
//! let payload = builder.build(&item)?;
//! let digest = hash_typed_data(&payload)?;
//! ```

pub mod types;
pub mod encoder;
pub mod hasher;
pub mod builder;
pub mod signer;

pub use types::*;
pub use encoder::*;
pub use hasher::*;
pub use builder::*;
pub use signer::*;
