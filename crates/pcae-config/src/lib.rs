//! # pcae-config: Parametric Configuration Engine
//!
//! Resolves the complete regulatory and operational configuration for a
//! (country, industry) tenant.
//!
//! ## Architecture
//!
//! ```text
//! ConfigurationEngine::get_configuration(country, industry)
//!   └─ tokio::join! over nine facet resolvers
//!        ├─ CacheStore (per-facet key, TTL, injected clock)
//!        └─ DataSource::query(table, filters)  ── timeout ──> degraded default
//! ```
//!
//! Downstream consumers are pure functions over the assembled
//! [`Configuration`]:
//!
//! - [`validate_configuration`] scores it.
//! - [`configure_use_case`] derives default case scaffolding.
//! - [`apply_configuration`] stamps a case entity with its SLA, workflow,
//!   validations and translation settings.

pub mod apply;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod resolver;
pub mod source;
pub mod use_case;
pub mod validation;

pub use apply::{apply_configuration, CaseEntity, ConfiguredEntity};
pub use cache::{CacheStats, CacheStore};
pub use config::EngineConfig;
pub use engine::{ConfigurationEngine, Resolution};
pub use error::{EngineError, SourceError};
pub use model::Configuration;
pub use resolver::{Facet, ResolutionReport, ResolverOutcome};
pub use source::{DataSource, FailingSource, Filter, InMemorySource, Row};
pub use use_case::{configure_use_case, Criticality, UseCaseConfiguration, Urgency};
pub use validation::{validate_configuration, ValidationIssue, ValidationResult};
