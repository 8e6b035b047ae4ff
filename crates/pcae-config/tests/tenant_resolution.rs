//! # Tenant Resolution Against the Demo Fixture
//!
//! Loads `data/tenants.yaml` from the repository root and drives the engine
//! end to end: resolve, validate, apply, and degrade.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pcae_config::resolver::tables;
use pcae_config::{
    CacheStore, CaseEntity, ConfigurationEngine, DataSource, EngineConfig, EngineError,
    FailingSource, InMemorySource, ResolverOutcome,
};
use pcae_core::ManualClock;

fn fixture_path() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .join("..")
        .join("..")
        .join("data")
        .join("tenants.yaml")
}

fn fixture() -> InMemorySource {
    InMemorySource::from_path(&fixture_path()).expect("demo fixture should load")
}

fn engine(source: Arc<dyn DataSource>) -> ConfigurationEngine {
    let config = EngineConfig {
        cache_ttl: Duration::from_secs(300),
        resolver_timeout: Duration::from_millis(250),
    };
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let cache = Arc::new(CacheStore::new(clock, config.cache_ttl));
    ConfigurationEngine::new(source, cache, config)
}

#[tokio::test]
async fn colombian_healthcare_resolves_every_facet() {
    let engine = engine(Arc::new(fixture()));
    let resolution = engine.resolve("CO", "healthcare").await.unwrap();
    assert!(resolution.report.degraded().is_empty());
    assert!(resolution
        .report
        .outcomes
        .values()
        .all(|o| *o == ResolverOutcome::Fresh));

    let config = resolution.configuration;
    let country = config.country.as_ref().unwrap();
    assert_eq!(country.code, "CO");
    assert_eq!(country.holidays.len(), 2);
    assert!(country.legal_framework.is_some());
    assert_eq!(config.industry_code(), Some("healthcare"));
    assert_eq!(config.industry.as_ref().unwrap().categories.len(), 2);

    let codes: Vec<&str> = config.regulators.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["SUPERSALUD", "SIC", "MINSALUD"]);

    let default_wf = &config.workflows[0];
    let steps: Vec<&str> = default_wf.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(steps, vec!["reception", "classification", "resolution"]);

    assert!(config.translations.as_ref().unwrap().auto_translation);

    let result = engine.validate_configuration(&config);
    assert!(result.is_valid);
    assert_eq!(result.compliance_score, 100);
    assert!(result.recommendations.is_empty());
}

#[tokio::test]
async fn critical_regulator_filter_preserves_order() {
    let engine = engine(Arc::new(fixture()));
    let config = engine.get_configuration("CO", "healthcare").await.unwrap();
    let codes: Vec<&str> = config
        .applicable_regulators(Some("critical"), None)
        .into_iter()
        .map(|r| r.code.as_str())
        .collect();
    assert_eq!(codes, vec!["SUPERSALUD", "MINSALUD"]);
}

#[tokio::test]
async fn applying_a_queja_uses_the_tenant_sla() {
    let engine = engine(Arc::new(fixture()));
    let config = engine.get_configuration("CO", "healthcare").await.unwrap();
    let entity: CaseEntity = serde_json::from_value(serde_json::json!({
        "case_type": "queja",
        "priority": "high",
        "radicado": "PQRS-0001"
    }))
    .unwrap();
    let configured = engine.apply_configuration(entity, &config);
    assert_eq!(configured.sla.response_time.to_string(), "5 business_days");
    let pct: Vec<u32> = configured
        .sla
        .escalation_thresholds
        .iter()
        .map(|t| t.percentage)
        .collect();
    assert_eq!(pct, vec![80, 100]);
    assert_eq!(configured.workflow.name, "default");
    assert_eq!(configured.validations.len(), 1);
    assert_eq!(configured.translations.language, "es");
    assert_eq!(configured.entity.extra["radicado"], "PQRS-0001");
}

#[tokio::test]
async fn inactive_country_is_treated_as_missing() {
    let engine = engine(Arc::new(fixture()));
    let config = engine.get_configuration("MX", "healthcare").await.unwrap();
    assert!(config.country.is_none());
    let result = engine.validate_configuration(&config);
    assert_eq!(result.compliance_score, 90);
}

#[tokio::test]
async fn failing_regulator_table_degrades_gracefully() {
    let source = FailingSource::new(Arc::new(fixture())).fail_table(tables::REGULATORS);
    let engine = engine(Arc::new(source));
    let config = engine.get_configuration("CO", "healthcare").await.unwrap();
    assert!(config.regulators.is_empty());
    assert!(!config.workflows.is_empty());
    let result = engine.validate_configuration(&config);
    assert!(result.is_valid);
    assert!(result.warnings.iter().any(|w| w.field == "regulators"));
}

#[tokio::test]
async fn stalled_table_times_out() {
    let source = FailingSource::new(Arc::new(fixture()))
        .stall_table(tables::WORKFLOWS, Duration::from_secs(10));
    let engine = engine(Arc::new(source));
    let resolution = engine.resolve("CO", "healthcare").await.unwrap();
    assert!(resolution.configuration.workflows.is_empty());
    assert_eq!(
        resolution.report.outcomes[&pcae_config::Facet::Workflows],
        ResolverOutcome::Degraded
    );
}

#[tokio::test]
async fn total_outage_is_an_error() {
    let source = FailingSource::new(Arc::new(fixture())).fail_all();
    let engine = engine(Arc::new(source));
    let err = engine.get_configuration("CO", "healthcare").await.unwrap_err();
    assert!(matches!(err, EngineError::AllResolversFailed { .. }));
}
