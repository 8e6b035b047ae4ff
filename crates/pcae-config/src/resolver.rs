//! # Facet Resolvers
//!
//! One resolver per configuration facet. Each resolver:
//!
//! 1. Checks the cache under its key (`country_{c}`, `industry_{i}`,
//!    `translations_{c}`, or `{kind}_{country}_{industry}`).
//! 2. On a miss, queries the data source under `tokio::time::timeout`,
//!    decodes the rows, fills nested detail collections, and caches the
//!    result.
//! 3. On failure or timeout, logs a warning and returns the facet's safe
//!    default, flagged [`ResolverOutcome::Degraded`]. Degraded values are
//!    never cached.
//!
//! Nested per-entity lookups (`regulator_requirements_{id}`,
//! `workflow_steps_{id}`, ...) are cached independently. A failing nested
//! lookup yields an empty collection without degrading its parent.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use pcae_core::TenantKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStore;
use crate::error::SourceError;
use crate::model::{
    Country, EscalationThreshold, Industry, IntegrationPolicy, Regulator, SecurityPolicy, Sla,
    TranslationSettings, ValidationConfig, Workflow, WorkflowStep,
};
use crate::source::{is_active, DataSource, Filter, Row};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// The nine facets of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Country,
    Industry,
    Regulators,
    Workflows,
    Slas,
    Validations,
    Translations,
    Security,
    Integration,
}

impl Facet {
    pub const ALL: [Facet; 9] = [
        Facet::Country,
        Facet::Industry,
        Facet::Regulators,
        Facet::Workflows,
        Facet::Slas,
        Facet::Validations,
        Facet::Translations,
        Facet::Security,
        Facet::Integration,
    ];

    /// Cache key prefix for this facet.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Industry => "industry",
            Self::Regulators => "regulators",
            Self::Workflows => "workflows",
            Self::Slas => "slas",
            Self::Validations => "validations",
            Self::Translations => "translations",
            Self::Security => "security",
            Self::Integration => "integration",
        }
    }

    /// Cache key for this facet under `tenant`.
    pub fn cache_key(&self, tenant: &TenantKey) -> String {
        match self {
            Self::Country | Self::Translations => format!("{}_{}", self.as_str(), tenant.country),
            Self::Industry => format!("{}_{}", self.as_str(), tenant.industry),
            _ => tenant.scoped_key(self.as_str()),
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a facet value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverOutcome {
    /// Fetched from the source and cached.
    Fresh,
    /// Served from the cache.
    Cached,
    /// Fetch failed or timed out; the value is the facet default.
    Degraded,
}

#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub outcome: ResolverOutcome,
}

impl<T> Resolved<T> {
    pub fn is_degraded(&self) -> bool {
        self.outcome == ResolverOutcome::Degraded
    }
}

/// Per-facet outcomes of one configuration resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub outcomes: BTreeMap<Facet, ResolverOutcome>,
}

impl ResolutionReport {
    pub fn record(&mut self, facet: Facet, outcome: ResolverOutcome) {
        self.outcomes.insert(facet, outcome);
    }

    pub fn degraded(&self) -> Vec<Facet> {
        self.outcomes
            .iter()
            .filter(|(_, o)| **o == ResolverOutcome::Degraded)
            .map(|(f, _)| *f)
            .collect()
    }

    pub fn all_degraded(&self) -> bool {
        !self.outcomes.is_empty()
            && self.outcomes.values().all(|o| *o == ResolverOutcome::Degraded)
    }

    /// A report marking every facet as served from the aggregate cache.
    pub fn all_cached() -> Self {
        Self {
            outcomes: Facet::ALL.iter().map(|f| (*f, ResolverOutcome::Cached)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub mod tables {
    pub const COUNTRIES: &str = "parametric_countries";
    pub const INDUSTRIES: &str = "parametric_industries";
    pub const REGULATORS: &str = "parametric_regulators";
    pub const WORKFLOWS: &str = "parametric_workflows";
    pub const SLAS: &str = "parametric_slas";
    pub const VALIDATIONS: &str = "parametric_validations";
    pub const TRANSLATIONS: &str = "parametric_translations";
    pub const SECURITY: &str = "parametric_security";
    pub const INTEGRATIONS: &str = "parametric_integrations";

    pub const COUNTRY_HOLIDAYS: &str = "parametric_country_holidays";
    pub const COUNTRY_DOCUMENT_TYPES: &str = "parametric_country_document_types";
    pub const COUNTRY_PHONE_FORMATS: &str = "parametric_country_phone_formats";
    pub const COUNTRY_ADDRESS_FORMATS: &str = "parametric_country_address_formats";
    pub const COUNTRY_LEGAL_FRAMEWORKS: &str = "parametric_country_legal_frameworks";
    pub const COUNTRY_REGULATORY_BODIES: &str = "parametric_country_regulatory_bodies";
    pub const COUNTRY_COMPLIANCE: &str = "parametric_country_compliance";

    pub const INDUSTRY_CATEGORIES: &str = "parametric_industry_categories";
    pub const INDUSTRY_SPECIFIC_FIELDS: &str = "parametric_industry_specific_fields";
    pub const INDUSTRY_WORKFLOWS: &str = "parametric_industry_workflows";
    pub const INDUSTRY_SLAS: &str = "parametric_industry_slas";
    pub const INDUSTRY_VALIDATIONS: &str = "parametric_industry_validations";
    pub const INDUSTRY_INTEGRATIONS: &str = "parametric_industry_integrations";
    pub const INDUSTRY_COMPLIANCE: &str = "parametric_industry_compliance";

    pub const REGULATOR_REPORTING_REQUIREMENTS: &str = "parametric_regulator_reporting_requirements";
    pub const WORKFLOW_STEPS: &str = "parametric_workflow_steps";
    pub const WORKFLOW_TRIGGERS: &str = "parametric_workflow_triggers";
    pub const WORKFLOW_CONDITIONS: &str = "parametric_workflow_conditions";
    pub const WORKFLOW_ESCALATIONS: &str = "parametric_workflow_escalations";
    pub const SLA_ESCALATION_THRESHOLDS: &str = "parametric_sla_escalation_thresholds";
    pub const SLA_PENALTIES: &str = "parametric_sla_penalties";
    pub const SLA_EXCEPTIONS: &str = "parametric_sla_exceptions";
    pub const VALIDATION_RULES: &str = "parametric_validation_rules";
}

// ---------------------------------------------------------------------------
// Resolvers
// ---------------------------------------------------------------------------

/// Facet resolvers sharing one source, cache and timeout.
#[derive(Clone)]
pub struct Resolvers {
    source: Arc<dyn DataSource>,
    cache: Arc<CacheStore>,
    timeout: Duration,
}

impl std::fmt::Debug for Resolvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolvers")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Resolvers {
    pub fn new(source: Arc<dyn DataSource>, cache: Arc<CacheStore>, timeout: Duration) -> Self {
        Self {
            source,
            cache,
            timeout,
        }
    }

    pub async fn country(&self, tenant: &TenantKey) -> Resolved<Option<Country>> {
        let code = tenant.country.as_str();
        self.resolve(
            Facet::Country,
            Facet::Country.cache_key(tenant),
            async {
                let row = self
                    .single(tables::COUNTRIES, &[Filter::eq("code", code)])
                    .await?;
                let mut country: Country = decode(tables::COUNTRIES, row)?;
                let (holidays, document_types, phone_formats, address_formats, legal, bodies, compliance) = tokio::join!(
                    self.nested_rows(tables::COUNTRY_HOLIDAYS, "country_holidays", "country_code", code),
                    self.nested_rows(tables::COUNTRY_DOCUMENT_TYPES, "country_document_types", "country_code", code),
                    self.nested_rows(tables::COUNTRY_PHONE_FORMATS, "country_phone_formats", "country_code", code),
                    self.nested_rows(tables::COUNTRY_ADDRESS_FORMATS, "country_address_formats", "country_code", code),
                    self.nested_rows(tables::COUNTRY_LEGAL_FRAMEWORKS, "country_legal_framework", "country_code", code),
                    self.nested_rows(tables::COUNTRY_REGULATORY_BODIES, "country_regulatory_bodies", "country_code", code),
                    self.nested_rows(tables::COUNTRY_COMPLIANCE, "country_compliance", "country_code", code),
                );
                country.holidays = holidays;
                country.document_types = document_types;
                country.phone_formats = phone_formats;
                country.address_formats = address_formats;
                country.legal_framework = legal.into_iter().next();
                country.regulatory_bodies = bodies;
                country.compliance = compliance.into_iter().next();
                Ok(Some(country))
            },
            || None,
        )
        .await
    }

    pub async fn industry(&self, tenant: &TenantKey) -> Resolved<Option<Industry>> {
        let code = tenant.industry.as_str();
        self.resolve(
            Facet::Industry,
            Facet::Industry.cache_key(tenant),
            async {
                let row = self
                    .single(tables::INDUSTRIES, &[Filter::eq("code", code)])
                    .await?;
                let mut industry: Industry = decode(tables::INDUSTRIES, row)?;
                let (categories, specific_fields, workflows, sla, validations, integrations, compliance) = tokio::join!(
                    self.nested_rows(tables::INDUSTRY_CATEGORIES, "industry_categories", "industry_code", code),
                    self.nested_rows(tables::INDUSTRY_SPECIFIC_FIELDS, "industry_specific_fields", "industry_code", code),
                    self.nested_rows(tables::INDUSTRY_WORKFLOWS, "industry_workflows", "industry_code", code),
                    self.nested_rows(tables::INDUSTRY_SLAS, "industry_slas", "industry_code", code),
                    self.nested_rows(tables::INDUSTRY_VALIDATIONS, "industry_validations", "industry_code", code),
                    self.nested_rows(tables::INDUSTRY_INTEGRATIONS, "industry_integrations", "industry_code", code),
                    self.nested_rows(tables::INDUSTRY_COMPLIANCE, "industry_compliance", "industry_code", code),
                );
                industry.categories = categories;
                industry.specific_fields = specific_fields;
                industry.workflows = workflows;
                industry.sla = sla;
                industry.validations = validations;
                industry.integrations = integrations;
                industry.compliance = compliance.into_iter().next();
                Ok(Some(industry))
            },
            || None,
        )
        .await
    }

    pub async fn regulators(&self, tenant: &TenantKey) -> Resolved<Vec<Regulator>> {
        self.resolve(
            Facet::Regulators,
            Facet::Regulators.cache_key(tenant),
            async {
                let rows = self.tenant_rows(tables::REGULATORS, tenant).await?;
                let mut regulators = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut regulator: Regulator = decode(tables::REGULATORS, row)?;
                    regulator.reporting_requirements = self
                        .nested_rows(
                            tables::REGULATOR_REPORTING_REQUIREMENTS,
                            "regulator_requirements",
                            "regulator_id",
                            &regulator.id,
                        )
                        .await;
                    regulators.push(regulator);
                }
                Ok(regulators)
            },
            Vec::new,
        )
        .await
    }

    pub async fn workflows(&self, tenant: &TenantKey) -> Resolved<Vec<Workflow>> {
        self.resolve(
            Facet::Workflows,
            Facet::Workflows.cache_key(tenant),
            async {
                let rows = self.tenant_rows(tables::WORKFLOWS, tenant).await?;
                let mut workflows = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut workflow: Workflow = decode(tables::WORKFLOWS, row)?;
                    let id = workflow.id.clone();
                    let (steps, triggers, conditions, escalations) = tokio::join!(
                        self.nested_typed::<WorkflowStep>(tables::WORKFLOW_STEPS, "workflow_steps", "workflow_id", &id),
                        self.nested_rows(tables::WORKFLOW_TRIGGERS, "workflow_triggers", "workflow_id", &id),
                        self.nested_rows(tables::WORKFLOW_CONDITIONS, "workflow_conditions", "workflow_id", &id),
                        self.nested_rows(tables::WORKFLOW_ESCALATIONS, "workflow_escalations", "workflow_id", &id),
                    );
                    let mut steps = steps;
                    steps.sort_by_key(|s| s.order);
                    workflow.steps = steps;
                    workflow.triggers = triggers;
                    workflow.conditions = conditions;
                    workflow.escalations = escalations;
                    workflows.push(workflow);
                }
                Ok(workflows)
            },
            Vec::new,
        )
        .await
    }

    pub async fn slas(&self, tenant: &TenantKey) -> Resolved<Vec<Sla>> {
        self.resolve(
            Facet::Slas,
            Facet::Slas.cache_key(tenant),
            async {
                let rows = self.tenant_rows(tables::SLAS, tenant).await?;
                let mut slas = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut sla: Sla = decode(tables::SLAS, row)?;
                    let id = sla.id.clone();
                    let (thresholds, penalties, exceptions) = tokio::join!(
                        self.nested_typed::<EscalationThreshold>(
                            tables::SLA_ESCALATION_THRESHOLDS,
                            "sla_thresholds",
                            "sla_id",
                            &id
                        ),
                        self.nested_rows(tables::SLA_PENALTIES, "sla_penalties", "sla_id", &id),
                        self.nested_rows(tables::SLA_EXCEPTIONS, "sla_exceptions", "sla_id", &id),
                    );
                    let mut thresholds = thresholds;
                    thresholds.sort_by_key(|t| t.percentage);
                    sla.escalation_thresholds = thresholds;
                    sla.penalties = penalties;
                    sla.exceptions = exceptions;
                    slas.push(sla);
                }
                Ok(slas)
            },
            Vec::new,
        )
        .await
    }

    pub async fn validations(&self, tenant: &TenantKey) -> Resolved<Vec<ValidationConfig>> {
        self.resolve(
            Facet::Validations,
            Facet::Validations.cache_key(tenant),
            async {
                let rows = self.tenant_rows(tables::VALIDATIONS, tenant).await?;
                let mut validations = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut validation: ValidationConfig = decode(tables::VALIDATIONS, row)?;
                    validation.rules = self
                        .nested_rows(tables::VALIDATION_RULES, "validation_rules", "validation_id", &validation.id)
                        .await;
                    validations.push(validation);
                }
                Ok(validations)
            },
            Vec::new,
        )
        .await
    }

    /// No row for the country is not a failure; the defaults apply.
    pub async fn translations(&self, tenant: &TenantKey) -> Resolved<TranslationSettings> {
        self.resolve(
            Facet::Translations,
            Facet::Translations.cache_key(tenant),
            async {
                let rows = self
                    .active(
                        tables::TRANSLATIONS,
                        &[Filter::eq("country_code", tenant.country.as_str())],
                    )
                    .await?;
                match rows.into_iter().next() {
                    Some(row) => decode(tables::TRANSLATIONS, row),
                    None => Ok(TranslationSettings::default()),
                }
            },
            TranslationSettings::default,
        )
        .await
    }

    /// Exactly one active row is expected; none degrades to the default policy.
    pub async fn security(&self, tenant: &TenantKey) -> Resolved<SecurityPolicy> {
        self.resolve(
            Facet::Security,
            Facet::Security.cache_key(tenant),
            async {
                let row = self.single(tables::SECURITY, &tenant_filters(tenant)).await?;
                decode(tables::SECURITY, row)
            },
            SecurityPolicy::default,
        )
        .await
    }

    pub async fn integration(&self, tenant: &TenantKey) -> Resolved<IntegrationPolicy> {
        self.resolve(
            Facet::Integration,
            Facet::Integration.cache_key(tenant),
            async {
                let rows = self.tenant_rows(tables::INTEGRATIONS, tenant).await?;
                match rows.into_iter().next() {
                    Some(row) => decode(tables::INTEGRATIONS, row),
                    None => Ok(IntegrationPolicy::default()),
                }
            },
            IntegrationPolicy::default,
        )
        .await
    }

    // -- plumbing ---------------------------------------------------------

    async fn resolve<T, Fut>(
        &self,
        facet: Facet,
        key: String,
        fetch: Fut,
        fallback: impl FnOnce() -> T,
    ) -> Resolved<T>
    where
        T: Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            tracing::debug!(%facet, key = %key, "facet served from cache");
            return Resolved {
                value: (*hit).clone(),
                outcome: ResolverOutcome::Cached,
            };
        }

        match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(value)) => {
                self.cache.insert(key, Arc::new(value.clone()));
                Resolved {
                    value,
                    outcome: ResolverOutcome::Fresh,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(%facet, key = %key, error = %e, "facet fetch failed; using default");
                Resolved {
                    value: fallback(),
                    outcome: ResolverOutcome::Degraded,
                }
            }
            Err(_) => {
                tracing::warn!(
                    %facet,
                    key = %key,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "facet fetch timed out; using default"
                );
                Resolved {
                    value: fallback(),
                    outcome: ResolverOutcome::Degraded,
                }
            }
        }
    }

    async fn active(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, SourceError> {
        let rows = self.source.query(table, filters).await?;
        Ok(rows.into_iter().filter(is_active).collect())
    }

    async fn tenant_rows(&self, table: &str, tenant: &TenantKey) -> Result<Vec<Row>, SourceError> {
        self.active(table, &tenant_filters(tenant)).await
    }

    async fn single(&self, table: &str, filters: &[Filter]) -> Result<Row, SourceError> {
        self.active(table, filters)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound {
                table: table.to_string(),
                filter: filters
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            })
    }

    /// Detail rows keyed by a parent id, cached under `"{kind}_{id}"`.
    async fn nested_rows(&self, table: &str, kind: &str, column: &str, id: &str) -> Vec<Row> {
        self.nested_typed::<Row>(table, kind, column, id).await
    }

    async fn nested_typed<T>(&self, table: &str, kind: &str, column: &str, id: &str) -> Vec<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let key = format!("{kind}_{id}");
        if let Some(hit) = self.cache.get::<Vec<T>>(&key) {
            return (*hit).clone();
        }
        let fetched = async {
            let rows = self.active(table, &[Filter::eq(column, id)]).await?;
            rows.into_iter()
                .map(|row| decode::<T>(table, row))
                .collect::<Result<Vec<T>, _>>()
        };
        match fetched.await {
            Ok(values) => {
                self.cache.insert(key, Arc::new(values.clone()));
                values
            }
            Err(e) => {
                tracing::warn!(table, key = %key, error = %e, "nested lookup failed; using empty list");
                Vec::new()
            }
        }
    }
}

fn tenant_filters(tenant: &TenantKey) -> [Filter; 2] {
    [
        Filter::eq("country_code", tenant.country.as_str()),
        Filter::eq("industry_code", tenant.industry.as_str()),
    ]
}

fn decode<T: DeserializeOwned>(table: &str, row: Row) -> Result<T, SourceError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| SourceError::Decode {
        table: table.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FailingSource, InMemorySource};
    use pcae_core::ManualClock;
    use serde_json::json;

    fn tenant() -> TenantKey {
        TenantKey::parse("CO", "healthcare").unwrap()
    }

    fn fixture() -> InMemorySource {
        InMemorySource::from_document(json!({
            "parametric_countries": [
                {"code": "CO", "name": "Colombia", "language": "es", "currency": "COP", "timezone": "America/Bogota"}
            ],
            "parametric_country_holidays": [
                {"country_code": "CO", "date": "2026-07-20", "name": "Independence Day"},
                {"country_code": "MX", "date": "2026-09-16", "name": "Independence Day"}
            ],
            "parametric_regulators": [
                {"id": "r1", "code": "SUPERSALUD", "country_code": "CO", "industry_code": "healthcare"},
                {"id": "r2", "code": "RETIRED", "country_code": "CO", "industry_code": "healthcare", "is_active": false}
            ],
            "parametric_regulator_reporting_requirements": [
                {"regulator_id": "r1", "report": "monthly_pqrs"}
            ],
            "parametric_workflows": [
                {"id": "w1", "name": "default", "country_code": "CO", "industry_code": "healthcare"}
            ],
            "parametric_workflow_steps": [
                {"workflow_id": "w1", "order": 2, "name": "classification"},
                {"workflow_id": "w1", "order": 1, "name": "reception"}
            ],
            "parametric_slas": [
                {"id": "s1", "case_type": "queja", "priority": "high", "country_code": "CO", "industry_code": "healthcare",
                 "response_time": {"value": 15, "unit": "days"}, "resolution_time": {"value": 30, "unit": "days"}}
            ],
            "parametric_sla_escalation_thresholds": [
                {"sla_id": "s1", "percentage": 100, "action": "breach_notification"},
                {"sla_id": "s1", "percentage": 80, "action": "warning"}
            ],
            "parametric_security": [
                {"country_code": "CO", "industry_code": "healthcare", "compliance": {"hipaa": true}}
            ]
        }))
        .unwrap()
    }

    fn resolvers_over(source: Arc<dyn DataSource>) -> (Resolvers, Arc<CacheStore>) {
        let clock = ManualClock::new(chrono::Utc::now());
        let cache = Arc::new(CacheStore::new(Arc::new(clock), Duration::from_secs(300)));
        (Resolvers::new(source, cache.clone(), Duration::from_millis(200)), cache)
    }

    #[test]
    fn cache_keys_follow_kind_prefix_convention() {
        let t = tenant();
        assert_eq!(Facet::Country.cache_key(&t), "country_CO");
        assert_eq!(Facet::Industry.cache_key(&t), "industry_healthcare");
        assert_eq!(Facet::Translations.cache_key(&t), "translations_CO");
        assert_eq!(Facet::Regulators.cache_key(&t), "regulators_CO_healthcare");
        assert_eq!(Facet::Slas.cache_key(&t), "slas_CO_healthcare");
        assert_eq!(Facet::Integration.cache_key(&t), "integration_CO_healthcare");
    }

    #[tokio::test]
    async fn country_fills_nested_collections() {
        let (r, _) = resolvers_over(Arc::new(fixture()));
        let resolved = r.country(&tenant()).await;
        assert_eq!(resolved.outcome, ResolverOutcome::Fresh);
        let country = resolved.value.unwrap();
        assert_eq!(country.code, "CO");
        assert_eq!(country.holidays.len(), 1);
        assert!(country.legal_framework.is_none());
    }

    #[tokio::test]
    async fn missing_country_degrades_to_none() {
        let (r, cache) = resolvers_over(Arc::new(fixture()));
        let t = TenantKey::parse("ZZ", "healthcare").unwrap();
        let resolved = r.country(&t).await;
        assert!(resolved.is_degraded());
        assert!(resolved.value.is_none());
        assert!(cache.get::<Option<Country>>("country_ZZ").is_none());
    }

    #[tokio::test]
    async fn regulators_skip_inactive_and_load_requirements() {
        let (r, cache) = resolvers_over(Arc::new(fixture()));
        let resolved = r.regulators(&tenant()).await;
        assert_eq!(resolved.value.len(), 1);
        assert_eq!(resolved.value[0].reporting_requirements.len(), 1);
        assert!(cache.get::<Vec<Row>>("regulator_requirements_r1").is_some());
    }

    #[tokio::test]
    async fn second_read_is_cached() {
        let source = Arc::new(fixture());
        let (r, _) = resolvers_over(source.clone());
        let first = r.regulators(&tenant()).await;
        let queries = source.query_count();
        let second = r.regulators(&tenant()).await;
        assert_eq!(first.outcome, ResolverOutcome::Fresh);
        assert_eq!(second.outcome, ResolverOutcome::Cached);
        assert_eq!(source.query_count(), queries);
        assert_eq!(first.value, second.value);
    }

    #[tokio::test]
    async fn workflow_steps_and_sla_thresholds_are_sorted() {
        let (r, _) = resolvers_over(Arc::new(fixture()));
        let workflows = r.workflows(&tenant()).await.value;
        let names: Vec<&str> = workflows[0].steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["reception", "classification"]);

        let slas = r.slas(&tenant()).await.value;
        let pct: Vec<u32> = slas[0].escalation_thresholds.iter().map(|t| t.percentage).collect();
        assert_eq!(pct, vec![80, 100]);
    }

    #[tokio::test]
    async fn failing_table_degrades_and_is_not_cached() {
        let source = FailingSource::new(Arc::new(fixture())).fail_table(tables::REGULATORS);
        let (r, cache) = resolvers_over(Arc::new(source));
        let resolved = r.regulators(&tenant()).await;
        assert!(resolved.is_degraded());
        assert!(resolved.value.is_empty());
        assert!(cache.get::<Vec<Regulator>>("regulators_CO_healthcare").is_none());
    }

    #[tokio::test]
    async fn failing_nested_table_does_not_degrade_parent() {
        let source =
            FailingSource::new(Arc::new(fixture())).fail_table(tables::REGULATOR_REPORTING_REQUIREMENTS);
        let (r, _) = resolvers_over(Arc::new(source));
        let resolved = r.regulators(&tenant()).await;
        assert_eq!(resolved.outcome, ResolverOutcome::Fresh);
        assert!(resolved.value[0].reporting_requirements.is_empty());
    }

    #[tokio::test]
    async fn stalled_fetch_times_out_to_default() {
        let source = FailingSource::new(Arc::new(fixture()))
            .stall_table(tables::SECURITY, Duration::from_secs(5));
        let (r, _) = resolvers_over(Arc::new(source));
        let resolved = r.security(&tenant()).await;
        assert!(resolved.is_degraded());
        assert_eq!(resolved.value, SecurityPolicy::default());
    }

    #[tokio::test]
    async fn security_row_overrides_defaults() {
        let (r, _) = resolvers_over(Arc::new(fixture()));
        let resolved = r.security(&tenant()).await;
        assert_eq!(resolved.outcome, ResolverOutcome::Fresh);
        assert!(resolved.value.compliance.hipaa);
        assert!(resolved.value.compliance.gdpr);
    }

    #[tokio::test]
    async fn absent_translation_row_is_a_fresh_default() {
        let (r, _) = resolvers_over(Arc::new(fixture()));
        let resolved = r.translations(&tenant()).await;
        assert_eq!(resolved.outcome, ResolverOutcome::Fresh);
        assert_eq!(resolved.value.default_language, "es");
    }

    #[tokio::test]
    async fn undecodable_row_degrades() {
        let source = InMemorySource::new().with_table(
            tables::SLAS,
            vec![json!({"country_code": "CO", "industry_code": "healthcare", "case_type": "queja"})
                .as_object()
                .cloned()
                .unwrap()],
        );
        let (r, _) = resolvers_over(Arc::new(source));
        assert!(r.slas(&tenant()).await.is_degraded());
    }

    #[test]
    fn report_all_degraded() {
        let mut report = ResolutionReport::default();
        assert!(!report.all_degraded());
        for f in Facet::ALL {
            report.record(f, ResolverOutcome::Degraded);
        }
        assert!(report.all_degraded());
        report.record(Facet::Security, ResolverOutcome::Fresh);
        assert!(!report.all_degraded());
        assert_eq!(report.degraded().len(), 8);
    }
}
