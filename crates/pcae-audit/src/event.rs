//! # Audit Event Model
//!
//! An [`AuditEvent`] records one system action together with the business
//! details, runtime telemetry, compliance evidence and security posture that
//! surrounded it. Events are linked by `previous_hash` into a chain.
//!
//! Telemetry fields are integers (ppm, microseconds). Caller-supplied values
//! in [`AuditDetails`] may hold any JSON, floats included; they are hashed
//! exactly as they serialize.

use chrono::{DateTime, Utc};
use pcae_crypto::{Ed25519PublicKey, Ed25519Signature};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// AuditEventType
// ---------------------------------------------------------------------------

/// The closed set of auditable event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    CaseCreated,
    CaseUpdated,
    CaseAssigned,
    CaseEscalated,
    CaseResolved,
    CaseClosed,
    DataAccessed,
    DataModified,
    UserLogin,
    UserLogout,
    PermissionChanged,
    ConfigurationChanged,
    ExportGenerated,
    ReportCreated,
    NotificationSent,
    IntegrationCalled,
    RegulatorySubmission,
    ComplianceCheck,
    SecurityEvent,
    SystemEvent,
}

impl AuditEventType {
    pub const ALL: [AuditEventType; 20] = [
        Self::CaseCreated,
        Self::CaseUpdated,
        Self::CaseAssigned,
        Self::CaseEscalated,
        Self::CaseResolved,
        Self::CaseClosed,
        Self::DataAccessed,
        Self::DataModified,
        Self::UserLogin,
        Self::UserLogout,
        Self::PermissionChanged,
        Self::ConfigurationChanged,
        Self::ExportGenerated,
        Self::ReportCreated,
        Self::NotificationSent,
        Self::IntegrationCalled,
        Self::RegulatorySubmission,
        Self::ComplianceCheck,
        Self::SecurityEvent,
        Self::SystemEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CaseCreated => "case_created",
            Self::CaseUpdated => "case_updated",
            Self::CaseAssigned => "case_assigned",
            Self::CaseEscalated => "case_escalated",
            Self::CaseResolved => "case_resolved",
            Self::CaseClosed => "case_closed",
            Self::DataAccessed => "data_accessed",
            Self::DataModified => "data_modified",
            Self::UserLogin => "user_login",
            Self::UserLogout => "user_logout",
            Self::PermissionChanged => "permission_changed",
            Self::ConfigurationChanged => "configuration_changed",
            Self::ExportGenerated => "export_generated",
            Self::ReportCreated => "report_created",
            Self::NotificationSent => "notification_sent",
            Self::IntegrationCalled => "integration_called",
            Self::RegulatorySubmission => "regulatory_submission",
            Self::ComplianceCheck => "compliance_check",
            Self::SecurityEvent => "security_event",
            Self::SystemEvent => "system_event",
        }
    }

    /// The action verb recorded on events of this type.
    pub fn action(&self) -> &'static str {
        match self {
            Self::CaseCreated => "CREATE",
            Self::CaseUpdated => "UPDATE",
            Self::CaseAssigned => "ASSIGN",
            Self::CaseEscalated => "ESCALATE",
            Self::CaseResolved => "RESOLVE",
            Self::CaseClosed => "CLOSE",
            Self::DataAccessed => "READ",
            Self::DataModified => "MODIFY",
            Self::UserLogin => "LOGIN",
            Self::UserLogout => "LOGOUT",
            Self::PermissionChanged => "PERMISSION_CHANGE",
            Self::ConfigurationChanged => "CONFIG_CHANGE",
            Self::ExportGenerated => "EXPORT",
            Self::ReportCreated => "REPORT",
            Self::NotificationSent => "NOTIFY",
            Self::IntegrationCalled => "INTEGRATE",
            Self::RegulatorySubmission => "SUBMIT",
            Self::ComplianceCheck => "COMPLIANCE_CHECK",
            Self::SecurityEvent => "SECURITY",
            Self::SystemEvent => "SYSTEM",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action verb for a type name; `"UNKNOWN"` when the name is not recognized.
pub fn action_for_type(type_name: &str) -> &'static str {
    AuditEventType::parse(type_name)
        .map(|t| t.action())
        .unwrap_or("UNKNOWN")
}

// ---------------------------------------------------------------------------
// Level / Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl AuditLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [Self::Low, Self::Medium, Self::High, Self::Critical]
            .into_iter()
            .find(|l| l.as_str() == s)
    }
}

impl std::fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review state of an event. The only field that may change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[default]
    Active,
    Archived,
    Investigation,
    Resolved,
    Flagged,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Investigation => "investigation",
            Self::Resolved => "resolved",
            Self::Flagged => "flagged",
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Who performed the action, and from where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: String,
    pub user_name: String,
    pub user_role: String,
    pub session_id: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl ActorContext {
    /// The engine acting on its own behalf.
    pub fn system() -> Self {
        Self {
            user_id: "system".to_string(),
            user_name: "System".to_string(),
            user_role: "SYSTEM".to_string(),
            session_id: String::new(),
            ip_address: String::new(),
            user_agent: String::new(),
        }
    }
}

impl Default for ActorContext {
    fn default() -> Self {
        Self::system()
    }
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// One field-level difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditChange {
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub sensitive: bool,
}

/// Business context of an event. Callers may leave any field empty; the
/// factory fills `description`, `impact` and `risk` with defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditDetails {
    pub description: String,
    pub before_state: Option<Value>,
    pub after_state: Option<Value>,
    pub changes: Vec<AuditChange>,
    /// Free-form context. `case_type` and `priority` narrow the regulators
    /// recorded on the event.
    pub context: serde_json::Map<String, Value>,
    pub related_events: Vec<String>,
    pub impact: String,
    pub risk: String,
}

impl AuditDetails {
    pub fn describe(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_change(mut self, change: AuditChange) -> Self {
        self.changes.push(change);
        self
    }

    pub(crate) fn context_str(&self, key: &str) -> Option<&str> {
        self.context
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceData {
    /// Time spent building the event, in microseconds.
    pub execution_time_us: u64,
    pub database_queries: u32,
    pub api_calls: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemData {
    pub hostname: String,
    pub process_id: u32,
    /// Seconds since the factory was created.
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditMetadata {
    /// Country name from the active configuration, or `"Unknown"`.
    pub country: String,
    /// Industry name from the active configuration, or `"Unknown"`.
    pub industry: String,
    pub environment: String,
    pub version: String,
    pub module: String,
    pub component: String,
    pub performance: PerformanceData,
    pub system: SystemData,
}

// ---------------------------------------------------------------------------
// Compliance
// ---------------------------------------------------------------------------

/// Status of one regulatory requirement on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    /// Recorded at creation. An assertion by the caller, not a determination.
    ClaimedCompliant,
    Compliant,
    NonCompliant,
    Partial,
    /// No checker has examined the requirement.
    Unverified,
}

impl RequirementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaimedCompliant => "claimed_compliant",
            Self::Compliant => "compliant",
            Self::NonCompliant => "non_compliant",
            Self::Partial => "partial",
            Self::Unverified => "unverified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRequirement {
    /// Regulator code.
    pub code: String,
    pub name: String,
    pub description: String,
    /// What the event claims. Always [`RequirementStatus::ClaimedCompliant`]
    /// at creation.
    pub status: RequirementStatus,
    /// What the configured [`ComplianceCheck`](crate::ComplianceCheck) determined.
    pub verification: RequirementStatus,
    pub evidence: Vec<String>,
    pub last_checked: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceViolation {
    pub code: String,
    pub severity: AuditLevel,
    pub description: String,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationStatus {
    Active,
    Expired,
    Revoked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: CertificationStatus,
    pub scope: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrailData {
    /// Percent.
    pub completeness: u8,
    pub integrity: bool,
    pub retention: bool,
    pub accessibility: bool,
    pub encryption: bool,
    pub backup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceData {
    pub regulatory_codes: Vec<String>,
    pub requirements: Vec<ComplianceRequirement>,
    pub violations: Vec<ComplianceViolation>,
    pub certifications: Vec<Certification>,
    pub audit_trail: AuditTrailData,
    /// True only when an authoritative checker examined the requirements.
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// Security
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStrength {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationData {
    pub method: String,
    pub strength: AuthStrength,
    pub multi_factor: bool,
    pub session_valid: bool,
    pub last_validated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationData {
    pub permissions: Vec<String>,
    pub roles: Vec<String>,
    pub scope: String,
    pub effective: bool,
    pub inherited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionData {
    pub algorithm: String,
    /// Bits.
    pub key_size: u32,
    pub in_transit: bool,
    pub at_rest: bool,
    pub key_rotation_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityData {
    /// SHA-256 of the configuration snapshot the event was created under.
    pub configuration_digest: Option<String>,
    pub tamper_detected: bool,
    pub last_verified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityData {
    /// Hundredths of a percent: 9990 is 99.90%.
    pub uptime_basis_points: u32,
    pub response_time_ms: u32,
    /// Errors per million requests.
    pub error_rate_ppm: u32,
    pub last_check: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityData {
    pub authentication: AuthenticationData,
    pub authorization: AuthorizationData,
    pub encryption: EncryptionData,
    pub integrity: IntegrityData,
    pub availability: AvailabilityData,
}

// ---------------------------------------------------------------------------
// AuditEvent
// ---------------------------------------------------------------------------

/// One link in the audit chain.
///
/// `hash` is SHA-256 over the canonical bytes of every field except
/// `status`, `hash` and `signature`. `signature` is Ed25519 by `signer` over
/// the hash. Serialization never skips a field: absent values appear as
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: AuditEventType,
    pub level: AuditLevel,
    pub status: AuditStatus,
    pub timestamp: DateTime<Utc>,
    pub actor: ActorContext,
    pub resource: String,
    pub action: String,
    pub details: AuditDetails,
    pub metadata: AuditMetadata,
    pub compliance: ComplianceData,
    pub security: SecurityData,
    /// Per-event randomness so identical events hash differently.
    pub nonce: String,
    pub previous_hash: Option<String>,
    pub signer: Ed25519PublicKey,
    pub hash: String,
    pub signature: Ed25519Signature,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn action_table_is_total_and_distinct() {
        let actions: HashSet<&str> = AuditEventType::ALL.iter().map(|t| t.action()).collect();
        assert_eq!(actions.len(), 20);
        assert!(!actions.contains("UNKNOWN"));
    }

    #[test]
    fn action_lookup_by_name() {
        assert_eq!(action_for_type("case_created"), "CREATE");
        assert_eq!(action_for_type("configuration_changed"), "CONFIG_CHANGE");
        assert_eq!(action_for_type("regulatory_submission"), "SUBMIT");
        assert_eq!(action_for_type("teleport"), "UNKNOWN");
        assert_eq!(action_for_type(""), "UNKNOWN");
    }

    #[test]
    fn type_names_round_trip_through_serde() {
        for t in AuditEventType::ALL {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, Value::String(t.as_str().to_string()));
            assert_eq!(AuditEventType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(AuditLevel::Critical > AuditLevel::High);
        assert!(AuditLevel::Low < AuditLevel::Medium);
        assert_eq!(AuditLevel::parse("critical"), Some(AuditLevel::Critical));
        assert_eq!(AuditLevel::parse("severe"), None);
    }

    #[test]
    fn change_kind_serializes_as_type() {
        let change = AuditChange {
            field: "sla_response_time".into(),
            old_value: Value::from(24),
            new_value: Value::from(48),
            kind: ChangeKind::Modified,
            sensitive: true,
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["type"], "modified");
    }

    #[test]
    fn details_context_lookup_ignores_blanks() {
        let d = AuditDetails::describe("x")
            .with_context("case_type", "reclamo")
            .with_context("priority", " ")
            .with_context("count", 3);
        assert_eq!(d.context_str("case_type"), Some("reclamo"));
        assert_eq!(d.context_str("priority"), None);
        assert_eq!(d.context_str("count"), None);
    }
}
