//! # Audit Trail Routes
//!
//! Recording, querying and verifying the signed audit chain. Events are
//! built against the configuration of the tenant named in the request, so
//! each one records that tenant's regulators and security policy.
//!
//! The log mutex is only taken after the configuration has been resolved
//! and is released before the response is built.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pcae_audit::{
    ActorContext, AuditDetails, AuditEvent, AuditEventFactory, AuditEventType, AuditEventUpdate,
    AuditFilter, AuditLevel, AuditLog, AuditStatistics, ChainVerification,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, require_tenant, Validate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAuditEventRequest {
    pub country_code: String,
    pub industry_code: String,
    #[serde(rename = "type")]
    pub event_type: AuditEventType,
    pub level: AuditLevel,
    #[serde(default)]
    pub details: AuditDetails,
    #[serde(default)]
    pub actor: Option<ActorContext>,
    #[serde(default)]
    pub resource: Option<String>,
}

impl Validate for CreateAuditEventRequest {
    fn validate(&self) -> Result<(), String> {
        require_tenant(&self.country_code, &self.industry_code)?;
        if self.resource.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err("resource must not be blank when given".to_string());
        }
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/audit/events", post(create_event).get(list_events))
        .route(
            "/v1/audit/events/:id",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/v1/audit/statistics", get(statistics))
        .route("/v1/audit/export", get(export_events))
        .route("/v1/audit/verify", get(verify_chain))
}

/// POST /v1/audit/events: Record a new event at the tail of the chain.
async fn create_event(
    State(state): State<AppState>,
    body: Result<Json<CreateAuditEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuditEvent>), AppError> {
    let req = extract_validated_json(body)?;
    let configuration = state
        .engine
        .get_configuration(&req.country_code, &req.industry_code)
        .await?;

    let mut factory = AuditEventFactory::new(configuration, state.signing_key.clone());
    if let Some(actor) = req.actor {
        factory = factory.actor(actor);
    }
    if let Some(resource) = req.resource {
        factory = factory.resource(resource);
    }

    let event = {
        let mut log = state.audit.lock();
        let recorded = log.record(&factory, req.event_type, req.level, req.details)?;
        recorded.clone()
    };
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /v1/audit/events: Events matching every given filter criterion.
async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<AuditFilter>,
) -> Json<Vec<AuditEvent>> {
    let events: Vec<AuditEvent> = {
        let log = state.audit.lock();
        log.filter(&filter).into_iter().cloned().collect()
    };
    Json(events)
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AuditEvent>, AppError> {
    let event = state.audit.lock().get(&id).cloned();
    event
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("audit event {id}")))
}

/// PATCH /v1/audit/events/:id: Change the review status. No other field
/// can be updated.
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AuditEventUpdate>, JsonRejection>,
) -> Result<Json<AuditEvent>, AppError> {
    let update = extract_json(body)?;
    let event = {
        let mut log = state.audit.lock();
        let updated = log.update_event(&id, update)?;
        updated.clone()
    };
    Ok(Json(event))
}

/// DELETE /v1/audit/events/:id: Always refused; the trail is append-only.
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.audit.lock().remove_event(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn statistics(State(state): State<AppState>) -> Json<AuditStatistics> {
    Json(state.audit.lock().statistics())
}

/// GET /v1/audit/export: JSON array of the matching events, in chain order.
async fn export_events(
    State(state): State<AppState>,
    Query(filter): Query<AuditFilter>,
) -> Result<impl IntoResponse, AppError> {
    let exported = {
        let log = state.audit.lock();
        let matching = log.filter(&filter);
        AuditLog::export(matching)
    }?;
    Ok(([(header::CONTENT_TYPE, "application/json")], exported))
}

/// GET /v1/audit/verify: Walk the whole chain.
async fn verify_chain(State(state): State<AppState>) -> Json<ChainVerification> {
    let verification = state.audit.lock().verify_chain_integrity();
    if !verification.valid {
        tracing::error!(
            first_broken_at = ?verification.first_broken_at,
            reason = ?verification.reason,
            "audit chain failed verification"
        );
    }
    Json(verification)
}
