//! # Configuration Data Model
//!
//! Typed views of the upstream `parametric_*` tables. Top-level facets and
//! everything the engine reasons about (regulator applicability, workflow
//! steps, SLA time frames, validation applicability) are typed. Descriptive
//! detail records the engine only passes through (holidays, document types,
//! penalty schedules, ...) stay as raw [`Row`]s.
//!
//! Field names are snake_case on the wire, matching the upstream columns.

use serde::{Deserialize, Serialize};

use crate::source::Row;

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// The complete configuration for one tenant.
///
/// `country`, `industry`, `translations`, `security` and `integration` are
/// optional so that [`validate_configuration`](crate::validate_configuration)
/// can report their absence on hand-built or partially loaded configurations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub country: Option<Country>,
    pub industry: Option<Industry>,
    #[serde(default)]
    pub regulators: Vec<Regulator>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
    #[serde(default)]
    pub sla: Vec<Sla>,
    #[serde(default)]
    pub validations: Vec<ValidationConfig>,
    pub translations: Option<TranslationSettings>,
    pub security: Option<SecurityPolicy>,
    pub integration: Option<IntegrationPolicy>,
}

impl Configuration {
    pub fn country_code(&self) -> Option<&str> {
        self.country.as_ref().map(|c| c.code.as_str())
    }

    pub fn industry_code(&self) -> Option<&str> {
        self.industry.as_ref().map(|i| i.code.as_str())
    }

    /// The SLA defined for exactly this (case type, priority) pair.
    pub fn sla_for(&self, case_type: &str, priority: &str) -> Option<&Sla> {
        self.sla
            .iter()
            .find(|s| s.case_type == case_type && s.priority == priority)
    }

    /// First workflow named `"default"` or whose name contains the case type
    /// or the priority. Blank needles never match.
    pub fn workflow_for(&self, case_type: &str, priority: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| {
            w.name == "default"
                || (!case_type.is_empty() && w.name.contains(case_type))
                || (!priority.is_empty() && w.name.contains(priority))
        })
    }

    /// Regulators that apply to the given case type and priority. `None`
    /// means "don't filter on this dimension".
    pub fn applicable_regulators(
        &self,
        case_type: Option<&str>,
        priority: Option<&str>,
    ) -> Vec<&Regulator> {
        self.regulators
            .iter()
            .filter(|r| r.applies_to(case_type, priority))
            .collect()
    }

    /// Validation sets whose `applies_to` contains `"*"`, the case type, or
    /// the priority.
    pub fn applicable_validations(&self, case_type: &str, priority: &str) -> Vec<&ValidationConfig> {
        self.validations
            .iter()
            .filter(|v| v.applies(case_type, priority))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Country / Industry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub regulatory_authority: String,
    #[serde(default)]
    pub holidays: Vec<Row>,
    #[serde(default)]
    pub document_types: Vec<Row>,
    #[serde(default)]
    pub phone_formats: Vec<Row>,
    #[serde(default)]
    pub address_formats: Vec<Row>,
    #[serde(default)]
    pub legal_framework: Option<Row>,
    #[serde(default)]
    pub regulatory_bodies: Vec<Row>,
    #[serde(default)]
    pub compliance: Option<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub industry_type: String,
    #[serde(default)]
    pub regulations: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Row>,
    #[serde(default)]
    pub specific_fields: Vec<Row>,
    #[serde(default)]
    pub workflows: Vec<Row>,
    #[serde(default)]
    pub sla: Vec<Row>,
    #[serde(default)]
    pub validations: Vec<Row>,
    #[serde(default)]
    pub integrations: Vec<Row>,
    #[serde(default)]
    pub compliance: Option<Row>,
}

// ---------------------------------------------------------------------------
// Regulators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Regulator {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Case types this regulator covers. Empty means all.
    #[serde(default)]
    pub case_types: Vec<String>,
    /// Priorities this regulator covers. Empty means all.
    #[serde(default)]
    pub priorities: Vec<String>,
    #[serde(default)]
    pub reporting_requirements: Vec<Row>,
}

impl Regulator {
    pub fn applies_to(&self, case_type: Option<&str>, priority: Option<&str>) -> bool {
        let covers = |list: &[String], wanted: Option<&str>| match wanted {
            Some(v) if !list.is_empty() => list.iter().any(|x| x == v),
            _ => true,
        };
        covers(&self.case_types, case_type) && covers(&self.priorities, priority)
    }
}

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    BusinessDays,
    Weeks,
    Months,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::BusinessDays => "business_days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A duration target such as "30 days".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub value: u32,
    pub unit: TimeUnit,
}

impl TimeFrame {
    pub const fn new(value: u32, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    pub const fn days(value: u32) -> Self {
        Self::new(value, TimeUnit::Days)
    }

    pub const fn minutes(value: u32) -> Self {
        Self::new(value, TimeUnit::Minutes)
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub order: u32,
    pub name: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub timeframe: Option<TimeFrame>,
    #[serde(default)]
    pub automated: bool,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Sorted ascending by `order`.
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
    #[serde(default)]
    pub triggers: Vec<Row>,
    #[serde(default)]
    pub conditions: Vec<Row>,
    #[serde(default)]
    pub escalations: Vec<Row>,
}

impl Workflow {
    /// The empty `"default"` workflow used when nothing matches.
    pub fn fallback() -> Self {
        Self {
            name: "default".to_string(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// SLAs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationThreshold {
    /// Percentage of the time budget consumed, 0..=100.
    pub percentage: u32,
    pub action: String,
}

impl EscalationThreshold {
    pub fn new(percentage: u32, action: impl Into<String>) -> Self {
        Self {
            percentage,
            action: action.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sla {
    #[serde(default)]
    pub id: String,
    pub case_type: String,
    pub priority: String,
    pub response_time: TimeFrame,
    pub resolution_time: TimeFrame,
    /// Sorted ascending by `percentage`.
    #[serde(default)]
    pub escalation_thresholds: Vec<EscalationThreshold>,
    #[serde(default)]
    pub penalties: Vec<Row>,
    #[serde(default)]
    pub exceptions: Vec<Row>,
}

// ---------------------------------------------------------------------------
// Validations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `"*"`, case types, or priorities.
    #[serde(default)]
    pub applies_to: Vec<String>,
    #[serde(default)]
    pub rules: Vec<Row>,
}

impl ValidationConfig {
    pub fn applies(&self, case_type: &str, priority: &str) -> bool {
        self.applies_to
            .iter()
            .any(|a| a == "*" || (!a.is_empty() && (a == case_type || a == priority)))
    }
}

// ---------------------------------------------------------------------------
// Translations / Security / Integration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub fallback_language: String,
    pub translations: Vec<Row>,
    pub auto_translation: bool,
    pub quality_check: bool,
    pub context_aware: bool,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            default_language: "es".to_string(),
            supported_languages: vec!["es".to_string(), "en".to_string()],
            fallback_language: "en".to_string(),
            translations: Vec::new(),
            auto_translation: false,
            quality_check: false,
            context_aware: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionPolicy {
    pub algorithm: String,
    /// Bits.
    pub key_size: u32,
    /// Days between key rotations.
    pub key_rotation: u32,
}

impl Default for EncryptionPolicy {
    fn default() -> Self {
        Self {
            algorithm: "AES-256-GCM".to_string(),
            key_size: 256,
            key_rotation: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationPolicy {
    pub methods: Vec<String>,
    pub mfa: bool,
    /// Minutes.
    pub session_timeout: u32,
}

impl Default for AuthenticationPolicy {
    fn default() -> Self {
        Self {
            methods: vec!["password".to_string(), "mfa".to_string()],
            mfa: true,
            session_timeout: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationPolicy {
    pub rbac: bool,
    pub permissions: Vec<String>,
    pub roles: Vec<String>,
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self {
            rbac: true,
            permissions: Vec::new(),
            roles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditPolicy {
    pub enabled: bool,
    /// Years.
    pub retention: u32,
    pub real_time: bool,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            retention: 7,
            real_time: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompliancePolicy {
    pub gdpr: bool,
    pub hipaa: bool,
    pub sox: bool,
    pub pci: bool,
}

impl Default for CompliancePolicy {
    fn default() -> Self {
        Self {
            gdpr: true,
            hipaa: false,
            sox: false,
            pci: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityPolicy {
    pub encryption: EncryptionPolicy,
    pub authentication: AuthenticationPolicy,
    pub authorization: AuthorizationPolicy,
    pub audit: AuditPolicy,
    pub compliance: CompliancePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationPolicy {
    pub apis: Vec<Row>,
    pub webhooks: Vec<Row>,
    pub databases: Vec<Row>,
    pub message_queues: Vec<Row>,
    pub file_systems: Vec<Row>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regulator(code: &str, case_types: &[&str], priorities: &[&str]) -> Regulator {
        Regulator {
            id: format!("reg-{code}"),
            code: code.to_string(),
            case_types: case_types.iter().map(|s| s.to_string()).collect(),
            priorities: priorities.iter().map(|s| s.to_string()).collect(),
            ..Regulator::default()
        }
    }

    #[test]
    fn regulator_with_empty_lists_applies_everywhere() {
        let r = regulator("SIC", &[], &[]);
        assert!(r.applies_to(Some("queja"), Some("high")));
        assert!(r.applies_to(None, None));
    }

    #[test]
    fn regulator_filters_on_listed_dimensions_only() {
        let r = regulator("SUPERSALUD", &["queja", "reclamo"], &[]);
        assert!(r.applies_to(Some("queja"), Some("low")));
        assert!(!r.applies_to(Some("peticion"), None));
        assert!(r.applies_to(None, Some("critical")));
    }

    #[test]
    fn applicable_regulators_preserves_order() {
        let cfg = Configuration {
            regulators: vec![
                regulator("A", &["queja"], &[]),
                regulator("B", &["reclamo"], &[]),
                regulator("C", &[], &[]),
            ],
            ..Configuration::default()
        };
        let codes: Vec<&str> = cfg
            .applicable_regulators(Some("queja"), None)
            .iter()
            .map(|r| r.code.as_str())
            .collect();
        assert_eq!(codes, vec!["A", "C"]);
    }

    #[test]
    fn workflow_selection_prefers_first_match() {
        let cfg = Configuration {
            workflows: vec![
                Workflow { name: "queja_standard".into(), ..Workflow::default() },
                Workflow { name: "default".into(), ..Workflow::default() },
            ],
            ..Configuration::default()
        };
        assert_eq!(cfg.workflow_for("queja", "high").map(|w| w.name.as_str()), Some("queja_standard"));
        assert_eq!(cfg.workflow_for("peticion", "low").map(|w| w.name.as_str()), Some("default"));
    }

    #[test]
    fn blank_priority_does_not_match_every_workflow() {
        let cfg = Configuration {
            workflows: vec![Workflow { name: "reclamo_fast".into(), ..Workflow::default() }],
            ..Configuration::default()
        };
        assert!(cfg.workflow_for("queja", "").is_none());
    }

    #[test]
    fn validation_applicability() {
        let v = ValidationConfig {
            applies_to: vec!["reclamo".into(), "critical".into()],
            ..ValidationConfig::default()
        };
        assert!(v.applies("reclamo", "low"));
        assert!(v.applies("queja", "critical"));
        assert!(!v.applies("queja", "low"));
        let any = ValidationConfig { applies_to: vec!["*".into()], ..ValidationConfig::default() };
        assert!(any.applies("anything", ""));
    }

    #[test]
    fn security_defaults() {
        let s = SecurityPolicy::default();
        assert_eq!(s.encryption.algorithm, "AES-256-GCM");
        assert_eq!(s.encryption.key_rotation, 90);
        assert_eq!(s.authentication.methods, vec!["password", "mfa"]);
        assert_eq!(s.authentication.session_timeout, 480);
        assert!(s.authorization.rbac);
        assert_eq!(s.audit.retention, 7);
        assert!(s.compliance.gdpr && !s.compliance.hipaa && !s.compliance.sox && !s.compliance.pci);
    }

    #[test]
    fn partial_security_row_keeps_defaults_for_missing_sections() {
        let s: SecurityPolicy =
            serde_json::from_value(serde_json::json!({"compliance": {"hipaa": true}})).unwrap();
        assert!(s.compliance.hipaa);
        assert!(s.compliance.gdpr);
        assert_eq!(s.encryption.key_size, 256);
    }

    #[test]
    fn translation_defaults() {
        let t: TranslationSettings = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(t.default_language, "es");
        assert_eq!(t.supported_languages, vec!["es", "en"]);
        assert_eq!(t.fallback_language, "en");
        assert!(!t.auto_translation);
    }

    #[test]
    fn time_frame_display() {
        assert_eq!(TimeFrame::days(30).to_string(), "30 days");
        let tf: TimeFrame = serde_json::from_value(serde_json::json!({"value": 4, "unit": "business_days"})).unwrap();
        assert_eq!(tf.unit, TimeUnit::BusinessDays);
    }
}
