//! # Configuration Engine
//!
//! Entry point for tenant configuration. [`ConfigurationEngine`] owns the
//! facet resolvers and the shared [`CacheStore`] and assembles a complete
//! [`Configuration`] for a `(country, industry)` pair.
//!
//! Aggregates are cached under `config_{country}_{industry}` only when every
//! facet resolved cleanly; a partially degraded configuration is returned
//! but recomputed on the next request so a recovered source is picked up.

use std::sync::Arc;

use pcae_core::TenantKey;
use serde::Serialize;

use crate::apply::{apply_configuration, CaseEntity, ConfiguredEntity};
use crate::cache::{CacheStats, CacheStore};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::Configuration;
use crate::resolver::{Facet, ResolutionReport, Resolvers};
use crate::source::DataSource;
use crate::use_case::{configure_use_case, UseCaseConfiguration};
use crate::validation::{validate_configuration, ValidationResult};

/// A resolved configuration together with how each facet was obtained.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub configuration: Arc<Configuration>,
    pub report: ResolutionReport,
}

#[derive(Debug, Clone)]
pub struct ConfigurationEngine {
    resolvers: Resolvers,
    cache: Arc<CacheStore>,
    config: EngineConfig,
}

impl ConfigurationEngine {
    pub fn new(source: Arc<dyn DataSource>, cache: Arc<CacheStore>, config: EngineConfig) -> Self {
        Self {
            resolvers: Resolvers::new(source, cache.clone(), config.resolver_timeout),
            cache,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Resolve the configuration for a tenant, serving the cached aggregate
    /// when one is live.
    pub async fn get_configuration(
        &self,
        country: &str,
        industry: &str,
    ) -> Result<Arc<Configuration>, EngineError> {
        Ok(self.resolve(country, industry).await?.configuration)
    }

    /// Like [`get_configuration`](Self::get_configuration) but also returns
    /// the per-facet outcomes.
    pub async fn resolve(&self, country: &str, industry: &str) -> Result<Resolution, EngineError> {
        let tenant = TenantKey::parse(country, industry)?;
        let key = aggregate_key(&tenant);
        if let Some(hit) = self.cache.get::<Configuration>(&key) {
            tracing::debug!(%tenant, "configuration served from cache");
            return Ok(Resolution {
                configuration: hit,
                report: ResolutionReport::all_cached(),
            });
        }
        self.assemble(&tenant, key).await
    }

    /// Drop the cached aggregate for a tenant and resolve it again.
    ///
    /// Facet-level entries are left in place; clear them with
    /// [`clear_cache`](Self::clear_cache) to force a full refetch.
    pub async fn refresh_configuration(
        &self,
        country: &str,
        industry: &str,
    ) -> Result<Arc<Configuration>, EngineError> {
        let tenant = TenantKey::parse(country, industry)?;
        let key = aggregate_key(&tenant);
        self.cache.clear_key(&key);
        Ok(self.assemble(&tenant, key).await?.configuration)
    }

    async fn assemble(&self, tenant: &TenantKey, key: String) -> Result<Resolution, EngineError> {
        let r = &self.resolvers;
        let (country, industry, regulators, workflows, sla, validations, translations, security, integration) = tokio::join!(
            r.country(tenant),
            r.industry(tenant),
            r.regulators(tenant),
            r.workflows(tenant),
            r.slas(tenant),
            r.validations(tenant),
            r.translations(tenant),
            r.security(tenant),
            r.integration(tenant),
        );

        let mut report = ResolutionReport::default();
        report.record(Facet::Country, country.outcome);
        report.record(Facet::Industry, industry.outcome);
        report.record(Facet::Regulators, regulators.outcome);
        report.record(Facet::Workflows, workflows.outcome);
        report.record(Facet::Slas, sla.outcome);
        report.record(Facet::Validations, validations.outcome);
        report.record(Facet::Translations, translations.outcome);
        report.record(Facet::Security, security.outcome);
        report.record(Facet::Integration, integration.outcome);

        if report.all_degraded() {
            tracing::error!(%tenant, "every configuration facet failed");
            return Err(EngineError::AllResolversFailed {
                tenant: tenant.to_string(),
            });
        }

        let configuration = Arc::new(Configuration {
            country: country.value,
            industry: industry.value,
            regulators: regulators.value,
            workflows: workflows.value,
            sla: sla.value,
            validations: validations.value,
            translations: Some(translations.value),
            security: Some(security.value),
            integration: Some(integration.value),
        });

        let degraded = report.degraded();
        if degraded.is_empty() {
            self.cache.set(key, configuration.clone(), self.config.cache_ttl);
            tracing::info!(%tenant, "configuration resolved");
        } else {
            let facets: Vec<&str> = degraded.iter().map(Facet::as_str).collect();
            tracing::warn!(%tenant, degraded = ?facets, "configuration resolved with defaults");
        }

        Ok(Resolution {
            configuration,
            report,
        })
    }

    pub fn validate_configuration(&self, configuration: &Configuration) -> ValidationResult {
        validate_configuration(configuration)
    }

    pub fn configure_use_case(
        &self,
        country: &str,
        industry: &str,
        case_type: &str,
    ) -> UseCaseConfiguration {
        configure_use_case(country, industry, case_type)
    }

    pub fn apply_configuration(
        &self,
        entity: CaseEntity,
        configuration: &Configuration,
    ) -> ConfiguredEntity {
        apply_configuration(entity, configuration)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("configuration cache cleared");
    }

    pub fn clear_cache_key(&self, key: &str) -> bool {
        self.cache.clear_key(key)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn aggregate_key(tenant: &TenantKey) -> String {
    tenant.scoped_key("config")
}
