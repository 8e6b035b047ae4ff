//! # pcae-api: HTTP Surface for the Configuration & Audit Engine
//!
//! ## API Surface
//!
//! | Prefix                  | Module                        | Domain                   |
//! |-------------------------|-------------------------------|--------------------------|
//! | `/v1/configuration/*`   | [`routes::configuration`]     | Tenant configuration     |
//! | `/v1/use-case`          | [`routes::configuration`]     | Case scaffolding         |
//! | `/v1/apply`             | [`routes::configuration`]     | Entity application       |
//! | `/v1/cache/*`           | [`routes::configuration`]     | Cache control            |
//! | `/v1/audit/*`           | [`routes::audit`]             | Signed audit trail       |
//! | `/health/*`             | this module                   | Probes (unauthenticated) |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
pub use crate::error::AppError;
pub use crate::state::{AppConfig, AppState};

/// Assemble the full application router.
///
/// Health probes are mounted outside the auth middleware so they remain
/// reachable without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::configuration::router())
        .merge(routes::audit::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

async fn liveness() -> &'static str {
    "ok"
}

async fn readiness() -> &'static str {
    "ready"
}
