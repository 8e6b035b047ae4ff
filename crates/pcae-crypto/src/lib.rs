//! # pcae-crypto: Signing Keys for the Audit Chain
//!
//! Every audit event carries a SHA-256 `hash` (computed in `pcae-core`) and
//! an Ed25519 `signature` over that hash. This crate owns the key material:
//!
//! - [`Ed25519KeyPair`] generation, seed import/export as hex.
//! - Signing and verification that only accept `CanonicalBytes`.
//!
//! ## Crate Policy
//!
//! - Depends only on `pcae-core` internally.
//! - Tests use real Ed25519, never mocks.

pub mod ed25519;

pub use ed25519::{
    verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
};
