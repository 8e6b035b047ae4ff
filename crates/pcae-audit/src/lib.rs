//! # pcae-audit: Hash-Chained Audit Trail
//!
//! Compliance-annotated audit events, each linked to its predecessor by a
//! SHA-256 content hash and signed with Ed25519.
//!
//! ## Architecture
//!
//! ```text
//! AuditLog::record(factory, type, level, details)
//!   ├─ tail_hash()                            ── previous_hash
//!   ├─ AuditEventFactory::create_audit_event
//!   │    ├─ regulators from the configuration snapshot
//!   │    ├─ ComplianceCheck (default: RecordOnlyCheck)
//!   │    └─ chain::compute_hash + chain::sign_hash
//!   └─ push
//! ```
//!
//! ## Crate Policy
//!
//! - Hashes are only ever computed over `CanonicalBytes`.
//! - Events are never removed; only `status` may change after creation.

pub mod chain;
pub mod compliance;
pub mod error;
pub mod event;
pub mod factory;
pub mod log;

pub use chain::{compute_hash, verify_chain, verify_event, ChainBreak, ChainVerification};
pub use compliance::{ComplianceCheck, RecordOnlyCheck};
pub use error::AuditError;
pub use event::{
    action_for_type, ActorContext, AuditChange, AuditDetails, AuditEvent, AuditEventType,
    AuditLevel, AuditStatus, ChangeKind, RequirementStatus,
};
pub use factory::{AuditEventFactory, SecurityPosture};
pub use log::{AuditEventUpdate, AuditFilter, AuditLog, AuditStatistics};
