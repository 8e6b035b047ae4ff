//! # Hash Chain
//!
//! Hashing, signing and verification for [`AuditEvent`]s.
//!
//! The hashed body is the event serialized to JSON with `status`, `hash`
//! and `signature` removed, passed through `CanonicalBytes`. It therefore
//! covers the type, timestamp, nonce, `previous_hash`, signer and the full
//! business, compliance and security payload. `status` is excluded so that
//! review-state updates never invalidate the chain.
//!
//! The signature is Ed25519 over the canonical bytes of the hex hash string.

use pcae_core::{sha256_hex, CanonicalBytes};
use pcae_crypto::{verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use serde::Serialize;
use serde_json::Value;

use crate::error::AuditError;
use crate::event::AuditEvent;

const UNHASHED_FIELDS: [&str; 3] = ["status", "hash", "signature"];

/// SHA-256 (hex) of the event's hashed body.
pub fn compute_hash(event: &AuditEvent) -> Result<String, AuditError> {
    let mut body = serde_json::to_value(event)?;
    if let Value::Object(map) = &mut body {
        for field in UNHASHED_FIELDS {
            map.remove(field);
        }
    }
    let canonical = CanonicalBytes::new(&body)?;
    Ok(sha256_hex(&canonical))
}

pub fn sign_hash(hash: &str, key: &Ed25519KeyPair) -> Result<Ed25519Signature, AuditError> {
    let canonical = CanonicalBytes::new(&hash)?;
    Ok(key.sign(&canonical))
}

/// Why a chain failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainBreak {
    /// The stored hash does not match the recomputed body hash.
    HashMismatch,
    /// The signature does not verify under the event's signer.
    InvalidSignature,
    /// `previous_hash` does not equal the preceding event's hash.
    LinkMismatch,
    /// The signer is not the log's trusted key.
    UntrustedSigner,
    /// The body could not be re-hashed.
    Unhashable(String),
}

impl std::fmt::Display for ChainBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashMismatch => f.write_str("hash does not match event body"),
            Self::InvalidSignature => f.write_str("signature does not verify"),
            Self::LinkMismatch => f.write_str("previous_hash does not link to the preceding event"),
            Self::UntrustedSigner => f.write_str("event signed by an untrusted key"),
            Self::Unhashable(e) => write!(f, "event body could not be hashed: {e}"),
        }
    }
}

/// Result of walking a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainVerification {
    pub valid: bool,
    pub events_checked: usize,
    /// Index of the first event that failed.
    pub first_broken_at: Option<usize>,
    pub reason: Option<ChainBreak>,
}

impl ChainVerification {
    fn intact(events_checked: usize) -> Self {
        Self {
            valid: true,
            events_checked,
            first_broken_at: None,
            reason: None,
        }
    }

    fn broken(at: usize, reason: ChainBreak) -> Self {
        Self {
            valid: false,
            events_checked: at + 1,
            first_broken_at: Some(at),
            reason: Some(reason),
        }
    }
}

/// Check one event's hash, signature and signer in isolation.
pub fn verify_event(
    event: &AuditEvent,
    trusted: Option<&Ed25519PublicKey>,
) -> Result<(), ChainBreak> {
    if trusted.is_some_and(|key| *key != event.signer) {
        return Err(ChainBreak::UntrustedSigner);
    }
    let recomputed = compute_hash(event).map_err(|e| ChainBreak::Unhashable(e.to_string()))?;
    if recomputed != event.hash {
        return Err(ChainBreak::HashMismatch);
    }
    let canonical =
        CanonicalBytes::new(&event.hash).map_err(|e| ChainBreak::Unhashable(e.to_string()))?;
    verify_with_public_key(&canonical, &event.signature, &event.signer)
        .map_err(|_| ChainBreak::InvalidSignature)
}

/// Walk `events` in order. The first event must have no predecessor; every
/// later event must link to the hash of the one before it.
pub fn verify_chain(events: &[AuditEvent], trusted: Option<&Ed25519PublicKey>) -> ChainVerification {
    let mut previous: Option<&str> = None;
    for (i, event) in events.iter().enumerate() {
        if event.previous_hash.as_deref() != previous {
            return ChainVerification::broken(i, ChainBreak::LinkMismatch);
        }
        if let Err(reason) = verify_event(event, trusted) {
            return ChainVerification::broken(i, reason);
        }
        previous = Some(event.hash.as_str());
    }
    ChainVerification::intact(events.len())
}
