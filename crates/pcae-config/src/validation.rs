//! # Configuration Validation
//!
//! Scores an assembled [`Configuration`]. Pure and idempotent: the same input
//! always produces an identical [`ValidationResult`].
//!
//! | Condition | Severity |
//! |---|---|
//! | missing `country` / `industry` | error |
//! | empty `regulators` / `workflows` / `sla` / `validations` | warning |
//! | missing `translations` / `security` | warning |
//! | missing `integration` | info |
//!
//! `compliance_score` is 100 when there are no errors, otherwise
//! `max(0, 100 - 10 * errors)`. Warnings do not lower the score.

use serde::{Deserialize, Serialize};

use crate::model::Configuration;

pub const REC_FIX_ERRORS: &str = "Fix configuration errors before continuing";
pub const REC_REVIEW_WARNINGS: &str = "Review configuration warnings to optimize the system";
pub const REC_CONFIGURE_REGULATORS: &str = "Configure regulators for full regulatory compliance";
pub const REC_CONFIGURE_WORKFLOWS: &str = "Configure workflows for process automation";
pub const REC_CONFIGURE_SLAS: &str = "Configure SLAs to manage response times";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
    pub compliance_score: u8,
    pub recommendations: Vec<String>,
}

pub fn validate_configuration(config: &Configuration) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut info = Vec::new();

    if config.country.is_none() {
        errors.push(ValidationIssue::new("country", "Country configuration is required"));
    }
    if config.industry.is_none() {
        errors.push(ValidationIssue::new("industry", "Industry configuration is required"));
    }
    if config.regulators.is_empty() {
        warnings.push(ValidationIssue::new("regulators", "No regulators configured"));
    }
    if config.workflows.is_empty() {
        warnings.push(ValidationIssue::new("workflows", "No workflows configured"));
    }
    if config.sla.is_empty() {
        warnings.push(ValidationIssue::new("sla", "No SLAs configured"));
    }
    if config.validations.is_empty() {
        warnings.push(ValidationIssue::new("validations", "No validations configured"));
    }
    if config.translations.is_none() {
        warnings.push(ValidationIssue::new("translations", "Translation configuration not found"));
    }
    if config.security.is_none() {
        warnings.push(ValidationIssue::new("security", "Security configuration not found"));
    }
    if config.integration.is_none() {
        info.push(ValidationIssue::new("integration", "Integration configuration not found"));
    }

    let is_valid = errors.is_empty();
    let compliance_score = compliance_score(errors.len());
    let recommendations = recommendations(&errors, &warnings);

    ValidationResult {
        is_valid,
        errors,
        warnings,
        info,
        compliance_score,
        recommendations,
    }
}

/// `100` with no errors, else `max(0, 100 - 10 * errors)`.
pub fn compliance_score(error_count: usize) -> u8 {
    let penalty = error_count.saturating_mul(10);
    100usize.saturating_sub(penalty) as u8
}

fn recommendations(errors: &[ValidationIssue], warnings: &[ValidationIssue]) -> Vec<String> {
    let warned = |field: &str| warnings.iter().any(|w| w.field == field);
    let mut out = Vec::new();
    if !errors.is_empty() {
        out.push(REC_FIX_ERRORS.to_string());
    }
    if !warnings.is_empty() {
        out.push(REC_REVIEW_WARNINGS.to_string());
    }
    if warned("regulators") {
        out.push(REC_CONFIGURE_REGULATORS.to_string());
    }
    if warned("workflows") {
        out.push(REC_CONFIGURE_WORKFLOWS.to_string());
    }
    if warned("sla") {
        out.push(REC_CONFIGURE_SLAS.to_string());
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn score_matches_formula(errors in 0usize..50) {
            let expected = if errors == 0 { 100 } else { 100i64 - 10 * errors as i64 };
            prop_assert_eq!(compliance_score(errors) as i64, expected.max(0));
        }

        #[test]
        fn validity_tracks_errors(has_country: bool, has_industry: bool, has_security: bool) {
            let cfg = Configuration {
                country: has_country.then(crate::model::Country::default),
                industry: has_industry.then(crate::model::Industry::default),
                security: has_security.then(crate::model::SecurityPolicy::default),
                ..Configuration::default()
            };
            let r = validate_configuration(&cfg);
            prop_assert_eq!(r.is_valid, r.errors.is_empty());
            prop_assert_eq!(r.is_valid, has_country && has_industry);
        }
    }
}
