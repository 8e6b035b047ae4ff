//! # Audit Log
//!
//! Append-only, ordered sequence of [`AuditEvent`]s.
//!
//! ## Invariants
//!
//! - `events[0].previous_hash` is `None`; for every later event,
//!   `events[i].previous_hash == Some(events[i - 1].hash)`.
//! - [`AuditLog::append`] enforces the link on insert.
//! - The only permitted mutation is a review-status change through
//!   [`AuditLog::update_event`]. `status` is outside the hashed body, so
//!   status changes never break the chain. Removal is refused.
//!
//! The log is not internally synchronized. Share it as
//! `Arc<parking_lot::Mutex<AuditLog>>` so the tail read in
//! [`AuditLog::record`] and the push are serialized.

use chrono::{DateTime, Utc};
use pcae_crypto::Ed25519PublicKey;
use serde::{Deserialize, Serialize};

use crate::chain::{verify_chain, ChainVerification};
use crate::error::AuditError;
use crate::event::{AuditDetails, AuditEvent, AuditEventType, AuditLevel, AuditStatus};
use crate::factory::AuditEventFactory;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Conjunctive event filter. Unset or blank criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditFilter {
    #[serde(rename = "type")]
    pub event_type: Option<AuditEventType>,
    pub level: Option<AuditLevel>,
    pub status: Option<AuditStatus>,
    /// Case-insensitive substring of the actor's user name.
    pub user: Option<String>,
    /// Case-insensitive substring of the resource.
    pub resource: Option<String>,
    /// Inclusive lower bound on the timestamp.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the timestamp.
    pub to: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the description, user name or resource.
    pub query: Option<String>,
}

impl AuditFilter {
    pub fn level(level: AuditLevel) -> Self {
        Self {
            level: Some(level),
            ..Self::default()
        }
    }

    pub fn matches(&self, event: &AuditEvent) -> bool {
        if self.event_type.is_some_and(|t| t != event.event_type) {
            return false;
        }
        if self.level.is_some_and(|l| l != event.level) {
            return false;
        }
        if self.status.is_some_and(|s| s != event.status) {
            return false;
        }
        if self.from.is_some_and(|from| event.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| event.timestamp > to) {
            return false;
        }
        if let Some(user) = needle(&self.user) {
            if !contains_ci(&event.actor.user_name, &user) {
                return false;
            }
        }
        if let Some(resource) = needle(&self.resource) {
            if !contains_ci(&event.resource, &resource) {
                return false;
            }
        }
        if let Some(query) = needle(&self.query) {
            let hit = contains_ci(&event.details.description, &query)
                || contains_ci(&event.actor.user_name, &query)
                || contains_ci(&event.resource, &query);
            if !hit {
                return false;
            }
        }
        true
    }
}

fn needle(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

// ---------------------------------------------------------------------------
// Statistics / updates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStatistics {
    pub total: usize,
    pub critical: usize,
    pub resolved: usize,
    pub flagged: usize,
}

/// Administrative change to an existing event. Only the review status may
/// change; every other field is sealed by the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventUpdate {
    pub status: AuditStatus,
}

// ---------------------------------------------------------------------------
// AuditLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    events: Vec<AuditEvent>,
    trusted_key: Option<Ed25519PublicKey>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose verification also requires every event to be signed by
    /// `key`.
    pub fn with_trusted_key(key: Ed25519PublicKey) -> Self {
        Self {
            events: Vec::new(),
            trusted_key: Some(key),
        }
    }

    /// Adopt events loaded from an export without checking them. Call
    /// [`verify_chain_integrity`](Self::verify_chain_integrity) afterwards.
    pub fn from_events(events: Vec<AuditEvent>, trusted_key: Option<Ed25519PublicKey>) -> Self {
        Self {
            events,
            trusted_key,
        }
    }

    /// Append a pre-built event. Its `previous_hash` must be the current tail.
    pub fn append(&mut self, event: AuditEvent) -> Result<(), AuditError> {
        let tail = self.tail_hash().map(str::to_string);
        if event.previous_hash != tail {
            tracing::warn!(
                id = %event.id,
                expected = ?tail,
                found = ?event.previous_hash,
                "rejected audit event with broken chain link"
            );
            return Err(AuditError::ChainLinkMismatch {
                expected: tail,
                found: event.previous_hash,
            });
        }
        self.events.push(event);
        Ok(())
    }

    /// Create an event linked to the current tail and append it.
    pub fn record(
        &mut self,
        factory: &AuditEventFactory,
        event_type: AuditEventType,
        level: AuditLevel,
        details: AuditDetails,
    ) -> Result<&AuditEvent, AuditError> {
        let previous = self.tail_hash().map(str::to_string);
        let event = factory.create_audit_event(event_type, level, details, previous)?;
        tracing::info!(
            id = %event.id,
            event_type = %event.event_type,
            level = %event.level,
            position = self.events.len(),
            "audit event recorded"
        );
        self.events.push(event);
        let last = self.events.len() - 1;
        Ok(&self.events[last])
    }

    pub fn verify_chain_integrity(&self) -> ChainVerification {
        let result = verify_chain(&self.events, self.trusted_key.as_ref());
        if !result.valid {
            tracing::error!(
                at = ?result.first_broken_at,
                reason = ?result.reason,
                "audit chain integrity violated"
            );
        }
        result
    }

    /// Events matching `filter`, in log order.
    pub fn filter(&self, filter: &AuditFilter) -> Vec<&AuditEvent> {
        self.events.iter().filter(|e| filter.matches(e)).collect()
    }

    pub fn statistics(&self) -> AuditStatistics {
        let count = |pred: &dyn Fn(&AuditEvent) -> bool| self.events.iter().filter(|e| pred(e)).count();
        AuditStatistics {
            total: self.events.len(),
            critical: count(&|e| e.level == AuditLevel::Critical),
            resolved: count(&|e| e.status == AuditStatus::Resolved),
            flagged: count(&|e| e.status == AuditStatus::Flagged),
        }
    }

    /// Pretty-printed JSON array of the given events, every field included.
    pub fn export<'a>(events: impl IntoIterator<Item = &'a AuditEvent>) -> Result<String, AuditError> {
        let events: Vec<&AuditEvent> = events.into_iter().collect();
        Ok(serde_json::to_string_pretty(&events)?)
    }

    /// Parse a document produced by [`export`](Self::export).
    pub fn import(json: &str) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn update_event(&mut self, id: &str, update: AuditEventUpdate) -> Result<&AuditEvent, AuditError> {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AuditError::EventNotFound(id.to_string()))?;
        tracing::info!(id, from = %event.status, to = %update.status, "audit event status changed");
        event.status = update.status;
        Ok(event)
    }

    /// Always refused: removing an event would break the chain.
    pub fn remove_event(&mut self, id: &str) -> Result<(), AuditError> {
        if self.get(id).is_none() {
            return Err(AuditError::EventNotFound(id.to_string()));
        }
        tracing::warn!(id, "refused to remove audit event");
        Err(AuditError::ImmutableTrail(format!("event {id} cannot be removed")))
    }

    pub fn get(&self, id: &str) -> Option<&AuditEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn tail_hash(&self) -> Option<&str> {
        self.events.last().map(|e| e.hash.as_str())
    }
}
