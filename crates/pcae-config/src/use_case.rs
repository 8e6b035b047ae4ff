//! # Use-Case Defaults
//!
//! Derives default case scaffolding (scenario, petitioner template, incident
//! shape, bootstrap workflow, SLA and expected outcome) from the tenant and
//! a case type. Pure: no I/O and no cache.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::model::{EscalationThreshold, TimeFrame, WorkflowStep};
use crate::source::Row;

const CRITICAL_CASE_TYPES: &[&str] = &["reclamo", "complaint", "critical"];
const HIGH_CASE_TYPES: &[&str] = &["queja", "high"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    Critical,
    High,
    Medium,
}

impl Criticality {
    /// Keyword lookup on the case type.
    pub fn for_case_type(case_type: &str) -> Self {
        match keyword_tier(case_type) {
            Tier::Top => Self::Critical,
            Tier::High => Self::High,
            Tier::Other => Self::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Immediate,
    High,
    Normal,
}

impl Urgency {
    pub fn for_case_type(case_type: &str) -> Self {
        match keyword_tier(case_type) {
            Tier::Top => Self::Immediate,
            Tier::High => Self::High,
            Tier::Other => Self::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::High => "high",
            Self::Normal => "normal",
        }
    }
}

enum Tier {
    Top,
    High,
    Other,
}

/// Exact, case-sensitive membership: `"Queja"` is not `"queja"`.
fn keyword_tier(case_type: &str) -> Tier {
    if CRITICAL_CASE_TYPES.contains(&case_type) {
        Tier::Top
    } else if HIGH_CASE_TYPES.contains(&case_type) {
        Tier::High
    } else {
        Tier::Other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub country: String,
    pub industry: String,
    pub case_type: String,
    pub criticality: Criticality,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetitionerTemplate {
    pub name: String,
    pub document_type: String,
    pub document_number: String,
    pub email: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaTemplate {
    pub response_time: TimeFrame,
    pub resolution_time: TimeFrame,
    pub escalation_thresholds: Vec<EscalationThreshold>,
}

impl SlaTemplate {
    /// 30 days to respond, 60 to resolve.
    pub fn standard() -> Self {
        Self {
            response_time: TimeFrame::days(30),
            resolution_time: TimeFrame::days(60),
            escalation_thresholds: vec![
                EscalationThreshold::new(80, "warning"),
                EscalationThreshold::new(90, "escalate"),
                EscalationThreshold::new(100, "breach_notification"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Minor units are not used; amounts are whole currency units.
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedOutcome {
    pub resolution: String,
    pub compensation: Money,
    pub corrective_actions: Vec<String>,
    pub regulatory_compliance: String,
    pub customer_satisfaction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseConfiguration {
    pub scenario: Scenario,
    pub petitioner: PetitionerTemplate,
    /// Industry-specific incident fields; empty for unknown industries.
    pub incident: Row,
    pub workflow: Vec<WorkflowStep>,
    pub sla: SlaTemplate,
    pub expected_outcome: ExpectedOutcome,
}

pub fn configure_use_case(country: &str, industry: &str, case_type: &str) -> UseCaseConfiguration {
    UseCaseConfiguration {
        scenario: Scenario {
            country: country.to_string(),
            industry: industry.to_string(),
            case_type: case_type.to_string(),
            criticality: Criticality::for_case_type(case_type),
            urgency: Urgency::for_case_type(case_type),
        },
        petitioner: petitioner_template(country),
        incident: incident_template(industry),
        workflow: bootstrap_workflow(),
        sla: SlaTemplate::standard(),
        expected_outcome: expected_outcome(),
    }
}

fn petitioner_template(country: &str) -> PetitionerTemplate {
    let document_type = if country == "CO" { "CC" } else { "SSN" };
    PetitionerTemplate {
        name: String::new(),
        document_type: document_type.to_string(),
        document_number: String::new(),
        email: String::new(),
        phone: String::new(),
        relationship: "customer".to_string(),
    }
}

fn incident_template(industry: &str) -> Row {
    let value = match industry {
        "healthcare" => json!({
            "patient_id": "",
            "medical_record_number": "",
            "insurance_provider": "",
            "insurance_policy_number": ""
        }),
        "financial" => json!({
            "account_number": "",
            "transaction_amount": {"amount": 0, "currency": "USD"},
            "fraud_type": ""
        }),
        "telecommunications" => json!({
            "service_id": "",
            "service_type": "",
            "service_plan": "",
            "outage_duration": {"value": 0, "unit": "hours"}
        }),
        "utilities" => json!({
            "service_id": "",
            "service_type": "",
            "meter_number": "",
            "outage_duration": {"value": 0, "unit": "hours"}
        }),
        _ => json!({}),
    };
    match value {
        serde_json::Value::Object(map) => map,
        _ => Row::new(),
    }
}

fn bootstrap_workflow() -> Vec<WorkflowStep> {
    vec![
        WorkflowStep {
            order: 1,
            name: "reception".to_string(),
            action: "automatic_reception".to_string(),
            recipients: vec!["system".to_string()],
            timeframe: Some(TimeFrame::minutes(1)),
            automated: true,
            required: true,
        },
        WorkflowStep {
            order: 2,
            name: "classification".to_string(),
            action: "automatic_classification".to_string(),
            recipients: vec!["ai_system".to_string()],
            timeframe: Some(TimeFrame::minutes(5)),
            automated: true,
            required: true,
        },
    ]
}

fn expected_outcome() -> ExpectedOutcome {
    ExpectedOutcome {
        resolution: "resolved".to_string(),
        compensation: Money {
            amount: 0,
            currency: "USD".to_string(),
        },
        corrective_actions: Vec::new(),
        regulatory_compliance: "full_compliance".to_string(),
        customer_satisfaction: "resolved".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeUnit;

    #[test]
    fn colombian_healthcare_queja() {
        let uc = configure_use_case("CO", "healthcare", "queja");
        assert_eq!(uc.petitioner.document_type, "CC");
        assert_eq!(uc.petitioner.relationship, "customer");
        assert_eq!(uc.sla.response_time, TimeFrame::new(30, TimeUnit::Days));
        assert_eq!(uc.sla.resolution_time, TimeFrame::new(60, TimeUnit::Days));
        assert_eq!(uc.scenario.criticality, Criticality::High);
        assert_eq!(uc.scenario.urgency, Urgency::High);
        assert!(uc.incident.contains_key("medical_record_number"));
    }

    #[test]
    fn non_colombian_petitioner_uses_ssn() {
        assert_eq!(configure_use_case("US", "financial", "x").petitioner.document_type, "SSN");
        assert_eq!(configure_use_case("MX", "financial", "x").petitioner.document_type, "SSN");
    }

    #[test]
    fn criticality_and_urgency_keywords() {
        for t in ["reclamo", "complaint", "critical"] {
            assert_eq!(Criticality::for_case_type(t), Criticality::Critical);
            assert_eq!(Urgency::for_case_type(t), Urgency::Immediate);
        }
        for t in ["queja", "high"] {
            assert_eq!(Criticality::for_case_type(t), Criticality::High);
            assert_eq!(Urgency::for_case_type(t), Urgency::High);
        }
        assert_eq!(Criticality::for_case_type("peticion"), Criticality::Medium);
        assert_eq!(Urgency::for_case_type("peticion"), Urgency::Normal);
    }

    #[test]
    fn keyword_match_is_exact() {
        assert_eq!(Criticality::for_case_type("Queja"), Criticality::Medium);
        assert_eq!(Urgency::for_case_type("Critical "), Urgency::Normal);
        assert_eq!(Criticality::for_case_type(" reclamo"), Criticality::Medium);
    }

    #[test]
    fn unknown_industry_has_empty_incident() {
        assert!(configure_use_case("CO", "mining", "queja").incident.is_empty());
    }

    #[test]
    fn each_known_industry_has_an_incident_shape() {
        for (industry, field) in [
            ("financial", "fraud_type"),
            ("telecommunications", "service_plan"),
            ("utilities", "meter_number"),
        ] {
            assert!(configure_use_case("CO", industry, "q").incident.contains_key(field));
        }
    }

    #[test]
    fn bootstrap_workflow_shape() {
        let steps = configure_use_case("CO", "healthcare", "queja").workflow;
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].name, "reception");
        assert_eq!(steps[0].timeframe, Some(TimeFrame::minutes(1)));
        assert_eq!(steps[1].recipients, vec!["ai_system"]);
        assert_eq!(steps[1].timeframe, Some(TimeFrame::minutes(5)));
        assert!(steps.iter().all(|s| s.automated && s.required));
    }

    #[test]
    fn sla_thresholds_and_outcome() {
        let uc = configure_use_case("CO", "healthcare", "queja");
        let t: Vec<(u32, &str)> = uc
            .sla
            .escalation_thresholds
            .iter()
            .map(|t| (t.percentage, t.action.as_str()))
            .collect();
        assert_eq!(t, vec![(80, "warning"), (90, "escalate"), (100, "breach_notification")]);
        assert_eq!(uc.expected_outcome.compensation.amount, 0);
        assert_eq!(uc.expected_outcome.regulatory_compliance, "full_compliance");
    }
}
