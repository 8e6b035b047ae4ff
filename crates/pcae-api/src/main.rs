//! # pcae-api: Binary Entry Point
//!
//! Reads [`AppConfig`] from the environment, loads the fixture named by
//! `PCAE_DATA` and serves on `PORT` (default 8080).

use pcae_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!(?config, "starting pcae-api");

    let state = AppState::try_from_config(config.clone()).map_err(|e| {
        tracing::error!("startup failed: {e}");
        e
    })?;

    let app = pcae_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("PCAE API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
