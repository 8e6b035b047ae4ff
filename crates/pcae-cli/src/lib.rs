//! # pcae-cli: Command-Line Front End
//!
//! ## Subcommands
//!
//! - `pcae config`: Resolve, score, scaffold and apply tenant configurations.
//! - `pcae audit`: Record into, query, export and verify audit trail files.
//! - `pcae keygen`: Generate an Ed25519 audit signing key.
//!
//! ```bash
//! pcae --data data/tenants.yaml config get CO healthcare
//! pcae --data data/tenants.yaml audit record --log trail.json --key pcae.key \
//!     --country CO --industry healthcare --type case_created --level high
//! pcae audit verify trail.json --pubkey pcae.pub
//! ```

pub mod audit;
pub mod config;
pub mod keygen;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use pcae_config::{CacheStore, ConfigurationEngine, EngineConfig, InMemorySource};
use pcae_crypto::{Ed25519KeyPair, Ed25519PublicKey};
use serde::Serialize;

/// Build an engine over the fixture at `data`.
pub fn load_engine(data: Option<&Path>) -> Result<ConfigurationEngine> {
    let path = data.context("no data source given; pass --data <file>")?;
    let source = InMemorySource::from_path(path)
        .with_context(|| format!("failed to load data source: {}", path.display()))?;
    let config = EngineConfig::from_env();
    let cache = Arc::new(CacheStore::with_ttl(config.cache_ttl));
    Ok(ConfigurationEngine::new(Arc::new(source), cache, config))
}

/// Drive an engine future to completion on a single-threaded runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}

/// Load a signing key from a file holding its 64-character hex seed.
pub fn read_signing_key(path: &Path) -> Result<Ed25519KeyPair> {
    let seed = zeroize::Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read signing key: {}", path.display()))?,
    );
    Ed25519KeyPair::from_seed_hex(seed.trim())
        .map_err(|e| anyhow::anyhow!("invalid signing key {}: {e}", path.display()))
}

pub fn read_public_key(path: &Path) -> Result<Ed25519PublicKey> {
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read public key: {}", path.display()))?;
    Ed25519PublicKey::from_hex(hex.trim())
        .map_err(|e| anyhow::anyhow!("invalid public key {}: {e}", path.display()))
}
