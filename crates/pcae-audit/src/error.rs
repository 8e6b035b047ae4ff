//! Error types for the audit trail.

use pcae_core::CanonicalizationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// The event's `previous_hash` does not point at the current tail.
    #[error("chain link mismatch: log tail is {expected:?}, event links to {found:?}")]
    ChainLinkMismatch {
        expected: Option<String>,
        found: Option<String>,
    },

    /// No event with this id exists in the log.
    #[error("audit event not found: {0}")]
    EventNotFound(String),

    /// The requested mutation would rewrite history.
    #[error("audit trail is append-only: {0}")]
    ImmutableTrail(String),

    /// The event body could not be canonicalized for hashing.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// JSON encoding or decoding failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
