//! # Application State
//!
//! Shared state handed to every handler: the configuration engine, the
//! audit log, and the key that signs new audit events.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use pcae_audit::AuditLog;
use pcae_config::{CacheStore, ConfigurationEngine, DataSource, EngineConfig, InMemorySource};
use pcae_crypto::Ed25519KeyPair;
use thiserror::Error;

/// Server settings read from the environment.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Fixture document backing the data source. If `None`, the source is empty.
    pub data_path: Option<PathBuf>,
    /// Hex seed of the audit signing key. If `None`, a key is generated.
    pub signing_key_hex: Option<String>,
    pub engine: EngineConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("data_path", &self.data_path)
            .field(
                "signing_key_hex",
                &self.signing_key_hex.as_ref().map(|_| "[REDACTED]"),
            )
            .field("engine", &self.engine)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            data_path: None,
            signing_key_hex: None,
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `AUTH_TOKEN`, `PCAE_DATA` and `PCAE_SIGNING_KEY_HEX`,
    /// plus the engine knobs read by [`EngineConfig::from_env`].
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            auth_token: non_empty("AUTH_TOKEN"),
            data_path: non_empty("PCAE_DATA").map(PathBuf::from),
            signing_key_hex: non_empty("PCAE_SIGNING_KEY_HEX"),
            engine: EngineConfig::from_env(),
        }
    }
}

/// Failure building [`AppState`] at startup.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("loading data source: {0}")]
    DataSource(#[from] pcae_config::SourceError),

    #[error("loading signing key from PCAE_SIGNING_KEY_HEX: {0}")]
    SigningKey(#[from] pcae_core::CryptoError),
}

#[derive(Clone)]
pub struct AppState {
    pub engine: ConfigurationEngine,
    /// Append-only trail. Never hold this lock across an `.await`.
    pub audit: Arc<Mutex<AuditLog>>,
    pub signing_key: Arc<Ed25519KeyPair>,
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .field("audit_events", &self.audit.lock().len())
            .field("signing_key", &self.signing_key)
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// Build state over an already constructed data source.
    pub fn with_source(
        config: AppConfig,
        source: Arc<dyn DataSource>,
        signing_key: Ed25519KeyPair,
    ) -> Self {
        let cache = Arc::new(CacheStore::with_ttl(config.engine.cache_ttl));
        let engine = ConfigurationEngine::new(source, cache, config.engine);
        let audit = AuditLog::with_trusted_key(signing_key.public_key());
        Self {
            engine,
            audit: Arc::new(Mutex::new(audit)),
            signing_key: Arc::new(signing_key),
            config,
        }
    }

    /// Load the data source and signing key named by `config`.
    pub fn try_from_config(config: AppConfig) -> Result<Self, StateError> {
        let source = match &config.data_path {
            Some(path) => InMemorySource::from_path(path)?,
            None => {
                tracing::warn!("PCAE_DATA not set; serving from an empty data source");
                InMemorySource::new()
            }
        };
        let signing_key = match &config.signing_key_hex {
            Some(hex) => Ed25519KeyPair::from_seed_hex(hex)?,
            None => {
                tracing::warn!(
                    "PCAE_SIGNING_KEY_HEX not set; generated an ephemeral audit signing key"
                );
                Ed25519KeyPair::generate()
            }
        };
        tracing::info!(
            signer = %signing_key.public_key().to_hex(),
            "audit signing key loaded"
        );
        Ok(Self::with_source(config, Arc::new(source), signing_key))
    }
}
