//! # Audit Event Factory
//!
//! Builds fully populated, hashed and signed [`AuditEvent`]s from a type, a
//! level and caller-supplied [`AuditDetails`].
//!
//! The factory holds everything an event snapshots besides its details:
//! the active tenant [`Configuration`], the acting [`ActorContext`], the
//! caller's [`SecurityPosture`], the signing key and a clock. The security
//! posture is recorded as supplied; the factory does not verify it.
//!
//! Linking is the caller's job: pass the current tail hash as
//! `previous_hash`, or use [`AuditLog::record`](crate::AuditLog::record),
//! which reads the tail and appends under one `&mut` borrow.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use pcae_config::model::SecurityPolicy;
use pcae_config::Configuration;
use pcae_core::{sha256_hex, CanonicalBytes, Clock, SystemClock};
use pcae_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use serde::{Deserialize, Serialize};

use crate::chain::{compute_hash, sign_hash};
use crate::compliance::{apply_check, ComplianceCheck, RecordOnlyCheck};
use crate::error::AuditError;
use crate::event::{
    ActorContext, AuditDetails, AuditEvent, AuditEventType, AuditLevel, AuditMetadata,
    AuditStatus, AuditTrailData, AuthStrength, AuthenticationData, AuthorizationData,
    AvailabilityData, Certification, ComplianceData, ComplianceRequirement, EncryptionData,
    IntegrityData, PerformanceData, RequirementStatus, SecurityData, SystemData,
};

const DEFAULT_IMPACT: &str = "Standard audit event";
const DEFAULT_RISK: &str = "Low risk";
const UNKNOWN: &str = "Unknown";

/// The caller's security context at the time of the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityPosture {
    pub auth_method: String,
    pub strength: AuthStrength,
    pub multi_factor: bool,
    pub session_valid: bool,
    pub permissions: Vec<String>,
    pub roles: Vec<String>,
    pub scope: String,
    pub encrypted_in_transit: bool,
    pub encrypted_at_rest: bool,
    pub backed_up: bool,
    pub uptime_basis_points: u32,
    pub response_time_ms: u32,
    pub error_rate_ppm: u32,
}

impl Default for SecurityPosture {
    fn default() -> Self {
        Self {
            auth_method: "service_key".to_string(),
            strength: AuthStrength::Strong,
            multi_factor: false,
            session_valid: true,
            permissions: Vec::new(),
            roles: Vec::new(),
            scope: "tenant".to_string(),
            encrypted_in_transit: true,
            encrypted_at_rest: true,
            backed_up: false,
            uptime_basis_points: 10_000,
            response_time_ms: 0,
            error_rate_ppm: 0,
        }
    }
}

pub struct AuditEventFactory {
    configuration: Arc<Configuration>,
    configuration_digest: Option<String>,
    actor: ActorContext,
    posture: SecurityPosture,
    key: Arc<Ed25519KeyPair>,
    clock: Arc<dyn Clock>,
    check: Arc<dyn ComplianceCheck>,
    certifications: Vec<Certification>,
    resource: String,
    environment: String,
    hostname: String,
    started_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuditEventFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditEventFactory")
            .field("tenant", &(self.configuration.country_code(), self.configuration.industry_code()))
            .field("actor", &self.actor.user_id)
            .field("signer", &self.key.public_key())
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl AuditEventFactory {
    pub fn new(configuration: Arc<Configuration>, key: Arc<Ed25519KeyPair>) -> Self {
        Self::with_clock(configuration, key, Arc::new(SystemClock))
    }

    pub fn with_clock(
        configuration: Arc<Configuration>,
        key: Arc<Ed25519KeyPair>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let configuration_digest = digest_configuration(&configuration);
        let started_at = clock.now();
        Self {
            configuration,
            configuration_digest,
            actor: ActorContext::system(),
            posture: SecurityPosture::default(),
            key,
            clock,
            check: Arc::new(RecordOnlyCheck),
            certifications: Vec::new(),
            resource: "system".to_string(),
            environment: "production".to_string(),
            hostname: std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string()),
            started_at,
        }
    }

    pub fn actor(mut self, actor: ActorContext) -> Self {
        self.actor = actor;
        self
    }

    pub fn posture(mut self, posture: SecurityPosture) -> Self {
        self.posture = posture;
        self
    }

    pub fn compliance_check(mut self, check: Arc<dyn ComplianceCheck>) -> Self {
        self.check = check;
        self
    }

    pub fn certifications(mut self, certifications: Vec<Certification>) -> Self {
        self.certifications = certifications;
        self
    }

    /// The resource events are recorded against, e.g. a case id.
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    /// Build, hash and sign one event linked to `previous_hash`.
    pub fn create_audit_event(
        &self,
        event_type: AuditEventType,
        level: AuditLevel,
        details: AuditDetails,
        previous_hash: Option<String>,
    ) -> Result<AuditEvent, AuditError> {
        let started = Instant::now();
        let timestamp = self.clock.now();
        let details = fill_defaults(event_type, details);

        let mut compliance = self.compliance_data(&details, timestamp);
        compliance.verified = apply_check(self.check.as_ref(), &mut compliance.requirements, &details);
        let security = self.security_data(timestamp);

        let mut event = AuditEvent {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            level,
            status: AuditStatus::Active,
            timestamp,
            actor: self.actor.clone(),
            resource: self.resource.clone(),
            action: event_type.action().to_string(),
            details,
            metadata: self.metadata(timestamp),
            compliance,
            security,
            nonce: nonce(),
            previous_hash,
            signer: self.key.public_key(),
            hash: String::new(),
            signature: Ed25519Signature([0u8; 64]),
        };
        event.metadata.performance.execution_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        event.hash = compute_hash(&event)?;
        event.signature = sign_hash(&event.hash, &self.key)?;
        tracing::debug!(
            id = %event.id,
            event_type = %event.event_type,
            level = %event.level,
            "audit event created"
        );
        Ok(event)
    }

    fn compliance_data(&self, details: &AuditDetails, timestamp: DateTime<Utc>) -> ComplianceData {
        let regulators = self
            .configuration
            .applicable_regulators(details.context_str("case_type"), details.context_str("priority"));
        let requirements = regulators
            .iter()
            .map(|r| ComplianceRequirement {
                code: r.code.clone(),
                name: r.name.clone(),
                description: r.description.clone(),
                status: RequirementStatus::ClaimedCompliant,
                verification: RequirementStatus::Unverified,
                evidence: vec!["audit_trail_recorded".to_string()],
                last_checked: timestamp,
            })
            .collect();
        let policy = self.security_policy();
        ComplianceData {
            regulatory_codes: regulators.iter().map(|r| r.code.clone()).collect(),
            requirements,
            violations: Vec::new(),
            certifications: self.certifications.clone(),
            audit_trail: AuditTrailData {
                completeness: 100,
                integrity: true,
                retention: policy.audit.enabled && policy.audit.retention > 0,
                accessibility: true,
                encryption: self.posture.encrypted_at_rest,
                backup: self.posture.backed_up,
            },
            verified: false,
        }
    }

    fn security_data(&self, timestamp: DateTime<Utc>) -> SecurityData {
        let policy = self.security_policy();
        let encryption = &policy.encryption;
        let p = &self.posture;
        SecurityData {
            authentication: AuthenticationData {
                method: p.auth_method.clone(),
                strength: p.strength,
                multi_factor: p.multi_factor,
                session_valid: p.session_valid,
                last_validated: timestamp,
            },
            authorization: AuthorizationData {
                permissions: p.permissions.clone(),
                roles: p.roles.clone(),
                scope: p.scope.clone(),
                effective: p.session_valid,
                inherited: false,
            },
            encryption: EncryptionData {
                algorithm: encryption.algorithm.clone(),
                key_size: encryption.key_size,
                in_transit: p.encrypted_in_transit,
                at_rest: p.encrypted_at_rest,
                key_rotation_days: encryption.key_rotation,
            },
            integrity: IntegrityData {
                configuration_digest: self.configuration_digest.clone(),
                tamper_detected: false,
                last_verified: timestamp,
            },
            availability: AvailabilityData {
                uptime_basis_points: p.uptime_basis_points,
                response_time_ms: p.response_time_ms,
                error_rate_ppm: p.error_rate_ppm,
                last_check: timestamp,
            },
        }
    }

    fn metadata(&self, timestamp: DateTime<Utc>) -> AuditMetadata {
        let country = self
            .configuration
            .country
            .as_ref()
            .map(|c| c.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let industry = self
            .configuration
            .industry
            .as_ref()
            .map(|i| i.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let uptime_secs = u64::try_from((timestamp - self.started_at).num_seconds()).unwrap_or(0);
        AuditMetadata {
            country,
            industry,
            environment: self.environment.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            module: "pcae".to_string(),
            component: "audit".to_string(),
            performance: PerformanceData::default(),
            system: SystemData {
                hostname: self.hostname.clone(),
                process_id: std::process::id(),
                uptime_secs,
            },
        }
    }

    fn security_policy(&self) -> SecurityPolicy {
        self.configuration.security.clone().unwrap_or_default()
    }
}

fn fill_defaults(event_type: AuditEventType, mut details: AuditDetails) -> AuditDetails {
    if details.description.trim().is_empty() {
        details.description = format!("Audit event: {event_type}");
    }
    if details.impact.trim().is_empty() {
        details.impact = DEFAULT_IMPACT.to_string();
    }
    if details.risk.trim().is_empty() {
        details.risk = DEFAULT_RISK.to_string();
    }
    details
}

fn nonce() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// `None` when the configuration holds values that cannot be canonicalized.
fn digest_configuration(configuration: &Configuration) -> Option<String> {
    match CanonicalBytes::new(configuration) {
        Ok(canonical) => Some(sha256_hex(&canonical)),
        Err(e) => {
            tracing::warn!(error = %e, "configuration snapshot not digestable; recording none");
            None
        }
    }
}
