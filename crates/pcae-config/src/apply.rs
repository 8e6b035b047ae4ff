//! Stamping a case entity with the tenant configuration that governs it.

use serde::{Deserialize, Serialize};

use crate::model::{Configuration, EscalationThreshold, TimeFrame, TranslationSettings, ValidationConfig, Workflow};
use crate::source::Row;

/// A case as submitted by the caller. Fields the engine doesn't interpret
/// ride along in `extra` and come back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseEntity {
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(flatten)]
    pub extra: Row,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedSla {
    pub response_time: TimeFrame,
    pub resolution_time: TimeFrame,
    pub escalation_thresholds: Vec<EscalationThreshold>,
    pub penalties: Vec<Row>,
    pub exceptions: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedTranslations {
    pub language: String,
    pub fallback_language: String,
    pub supported_languages: Vec<String>,
    pub auto_translation: bool,
    pub quality_check: bool,
    pub context_aware: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredEntity {
    #[serde(flatten)]
    pub entity: CaseEntity,
    pub country_code: Option<String>,
    pub industry_code: Option<String>,
    pub regulator_codes: Vec<String>,
    pub sla: AppliedSla,
    pub workflow: Workflow,
    pub validations: Vec<ValidationConfig>,
    pub translations: AppliedTranslations,
}

/// Keys [`ConfiguredEntity`] writes itself. Caller copies in `extra` are
/// dropped so the stamped values win and no key is emitted twice.
const STAMPED_FIELDS: [&str; 7] = [
    "country_code",
    "industry_code",
    "regulator_codes",
    "sla",
    "workflow",
    "validations",
    "translations",
];

pub fn apply_configuration(mut entity: CaseEntity, config: &Configuration) -> ConfiguredEntity {
    for key in STAMPED_FIELDS {
        entity.extra.remove(key);
    }
    let sla = applied_sla(&entity, config);
    let workflow = config
        .workflow_for(&entity.case_type, &entity.priority)
        .cloned()
        .unwrap_or_else(Workflow::fallback);
    let validations = config
        .applicable_validations(&entity.case_type, &entity.priority)
        .into_iter()
        .cloned()
        .collect();
    let translations = applied_translations(&entity, config);

    ConfiguredEntity {
        country_code: config.country_code().map(str::to_string),
        industry_code: config.industry_code().map(str::to_string),
        regulator_codes: config.regulators.iter().map(|r| r.code.clone()).collect(),
        sla,
        workflow,
        validations,
        translations,
        entity,
    }
}

fn applied_sla(entity: &CaseEntity, config: &Configuration) -> AppliedSla {
    match config.sla_for(&entity.case_type, &entity.priority) {
        Some(sla) => AppliedSla {
            response_time: sla.response_time,
            resolution_time: sla.resolution_time,
            escalation_thresholds: sla.escalation_thresholds.clone(),
            penalties: sla.penalties.clone(),
            exceptions: sla.exceptions.clone(),
        },
        // No thresholds on the unmatched default.
        None => AppliedSla {
            response_time: TimeFrame::days(30),
            resolution_time: TimeFrame::days(60),
            escalation_thresholds: Vec::new(),
            penalties: Vec::new(),
            exceptions: Vec::new(),
        },
    }
}

fn applied_translations(entity: &CaseEntity, config: &Configuration) -> AppliedTranslations {
    let defaults = TranslationSettings::default();
    let settings = config.translations.as_ref().unwrap_or(&defaults);
    let language = entity
        .language
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(&settings.default_language)
        .to_string();
    AppliedTranslations {
        language,
        fallback_language: settings.fallback_language.clone(),
        supported_languages: settings.supported_languages.clone(),
        auto_translation: settings.auto_translation,
        quality_check: settings.quality_check,
        context_aware: settings.context_aware,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use serde_json::json;

    fn config() -> Configuration {
        Configuration {
            country: Some(Country { code: "CO".into(), ..Country::default() }),
            industry: Some(Industry { code: "healthcare".into(), ..Industry::default() }),
            regulators: vec![
                Regulator { id: "1".into(), code: "SUPERSALUD".into(), ..Regulator::default() },
                Regulator { id: "2".into(), code: "SIC".into(), ..Regulator::default() },
            ],
            workflows: vec![Workflow { id: "w".into(), name: "reclamo_priority".into(), ..Workflow::default() }],
            sla: vec![Sla {
                id: "s".into(),
                case_type: "reclamo".into(),
                priority: "high".into(),
                response_time: TimeFrame::days(5),
                resolution_time: TimeFrame::days(15),
                escalation_thresholds: vec![EscalationThreshold::new(50, "notify")],
                penalties: vec![],
                exceptions: vec![],
            }],
            validations: vec![
                ValidationConfig { id: "all".into(), applies_to: vec!["*".into()], ..ValidationConfig::default() },
                ValidationConfig { id: "peticion".into(), applies_to: vec!["peticion".into()], ..ValidationConfig::default() },
            ],
            translations: Some(TranslationSettings {
                default_language: "es".into(),
                ..TranslationSettings::default()
            }),
            security: None,
            integration: None,
        }
    }

    fn entity(case_type: &str, priority: &str) -> CaseEntity {
        CaseEntity {
            case_type: case_type.into(),
            priority: priority.into(),
            ..CaseEntity::default()
        }
    }

    #[test]
    fn matched_sla_workflow_and_validations() {
        let out = apply_configuration(entity("reclamo", "high"), &config());
        assert_eq!(out.country_code.as_deref(), Some("CO"));
        assert_eq!(out.industry_code.as_deref(), Some("healthcare"));
        assert_eq!(out.regulator_codes, vec!["SUPERSALUD", "SIC"]);
        assert_eq!(out.sla.response_time, TimeFrame::days(5));
        assert_eq!(out.workflow.name, "reclamo_priority");
        let ids: Vec<&str> = out.validations.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["all"]);
        assert_eq!(out.translations.language, "es");
    }

    #[test]
    fn unmatched_falls_back_to_defaults() {
        let out = apply_configuration(entity("peticion", "low"), &config());
        assert_eq!(out.sla.response_time, TimeFrame::days(30));
        assert_eq!(out.sla.resolution_time, TimeFrame::days(60));
        assert!(out.sla.escalation_thresholds.is_empty());
        assert_eq!(out.workflow, Workflow::fallback());
        assert_eq!(out.validations.len(), 2);
    }

    #[test]
    fn entity_language_wins() {
        let mut e = entity("queja", "low");
        e.language = Some("en".into());
        assert_eq!(apply_configuration(e, &config()).translations.language, "en");
    }

    #[test]
    fn missing_country_leaves_codes_empty() {
        let cfg = Configuration::default();
        let out = apply_configuration(entity("queja", "low"), &cfg);
        assert!(out.country_code.is_none());
        assert_eq!(out.translations.fallback_language, "en");
    }

    #[test]
    fn extra_fields_round_trip() {
        let e: CaseEntity = serde_json::from_value(json!({
            "case_type": "queja",
            "priority": "high",
            "radicado": "PQRS-2026-0001",
            "channel": "web"
        }))
        .unwrap();
        let out = serde_json::to_value(apply_configuration(e, &config())).unwrap();
        assert_eq!(out["radicado"], "PQRS-2026-0001");
        assert_eq!(out["channel"], "web");
        assert_eq!(out["country_code"], "CO");
    }

    #[test]
    fn stamped_keys_override_caller_copies() {
        let e: CaseEntity = serde_json::from_value(json!({
            "case_type": "reclamo",
            "priority": "high",
            "case_number": "X-1",
            "sla": "whatever",
            "country_code": "US"
        }))
        .unwrap();
        let out = apply_configuration(e, &config());
        assert!(out.entity.extra.get("sla").is_none());
        assert_eq!(out.entity.extra["case_number"], "X-1");

        let text = serde_json::to_string(&out).unwrap();
        assert_eq!(text.matches("\"country_code\"").count(), 1);
        assert_eq!(text.matches("\"sla\"").count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["country_code"], "CO");
        assert_eq!(value["sla"]["response_time"], json!(TimeFrame::days(5)));
    }
}
