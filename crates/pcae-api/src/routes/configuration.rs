//! # Configuration Routes
//!
//! Tenant configuration resolution, scoring, use-case scaffolding, entity
//! application and cache control.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use pcae_config::{
    CacheStats, CaseEntity, Configuration, ConfiguredEntity, Resolution, UseCaseConfiguration, ValidationResult,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_tenant, Validate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UseCaseRequest {
    pub country_code: String,
    pub industry_code: String,
    pub case_type: String,
}

impl Validate for UseCaseRequest {
    fn validate(&self) -> Result<(), String> {
        require_tenant(&self.country_code, &self.industry_code)?;
        if self.case_type.trim().is_empty() {
            return Err("case_type must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub country_code: String,
    pub industry_code: String,
    pub entity: CaseEntity,
}

impl Validate for ApplyRequest {
    fn validate(&self) -> Result<(), String> {
        require_tenant(&self.country_code, &self.industry_code)
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/configuration/:country/:industry", get(get_configuration))
        .route(
            "/v1/configuration/:country/:industry/refresh",
            post(refresh_configuration),
        )
        .route(
            "/v1/configuration/:country/:industry/validate",
            get(validate_configuration),
        )
        .route("/v1/use-case", post(configure_use_case))
        .route("/v1/apply", post(apply_configuration))
        .route("/v1/cache", delete(clear_cache))
        .route("/v1/cache/stats", get(cache_stats))
        .route("/v1/cache/:key", delete(clear_cache_key))
}

/// GET /v1/configuration/:country/:industry: Resolved configuration with
/// per-facet outcomes.
async fn get_configuration(
    State(state): State<AppState>,
    Path((country, industry)): Path<(String, String)>,
) -> Result<Json<Resolution>, AppError> {
    Ok(Json(state.engine.resolve(&country, &industry).await?))
}

/// POST /v1/configuration/:country/:industry/refresh: Bypass the cached aggregate.
async fn refresh_configuration(
    State(state): State<AppState>,
    Path((country, industry)): Path<(String, String)>,
) -> Result<Json<Arc<Configuration>>, AppError> {
    Ok(Json(state.engine.refresh_configuration(&country, &industry).await?))
}

/// GET /v1/configuration/:country/:industry/validate: Score a tenant configuration.
async fn validate_configuration(
    State(state): State<AppState>,
    Path((country, industry)): Path<(String, String)>,
) -> Result<Json<ValidationResult>, AppError> {
    let configuration = state.engine.get_configuration(&country, &industry).await?;
    Ok(Json(state.engine.validate_configuration(&configuration)))
}

/// POST /v1/use-case: Default case scaffolding for a tenant and case type.
async fn configure_use_case(
    State(state): State<AppState>,
    body: Result<Json<UseCaseRequest>, JsonRejection>,
) -> Result<Json<UseCaseConfiguration>, AppError> {
    let req = extract_validated_json(body)?;
    Ok(Json(state.engine.configure_use_case(
        req.country_code.trim(),
        req.industry_code.trim(),
        req.case_type.trim(),
    )))
}

/// POST /v1/apply: Stamp a case entity with its tenant's configuration.
async fn apply_configuration(
    State(state): State<AppState>,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<Json<ConfiguredEntity>, AppError> {
    let req = extract_validated_json(body)?;
    let configuration = state
        .engine
        .get_configuration(&req.country_code, &req.industry_code)
        .await?;
    Ok(Json(state.engine.apply_configuration(req.entity, &configuration)))
}

/// DELETE /v1/cache: Drop every cached entry.
async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.engine.clear_cache();
    StatusCode::NO_CONTENT
}

/// DELETE /v1/cache/:key: Drop one cached entry.
async fn clear_cache_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.engine.clear_cache_key(&key) {
        tracing::info!(%key, "cache entry cleared");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("cache key {key}")))
    }
}

/// GET /v1/cache/stats: Entry count and hit/miss counters.
async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.engine.cache_stats())
}
