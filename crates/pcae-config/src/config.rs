//! Engine tuning read from the environment.

use std::time::Duration;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime knobs for [`ConfigurationEngine`](crate::ConfigurationEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long resolved facets and aggregates stay cached.
    pub cache_ttl: Duration,
    /// Upper bound on a single facet fetch, nested lookups included.
    pub resolver_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            resolver_timeout: DEFAULT_RESOLVER_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Read `PCAE_CACHE_TTL_SECS` and `PCAE_RESOLVER_TIMEOUT_MS`, keeping
    /// the default for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let cache_ttl = parse_u64(&lookup, "PCAE_CACHE_TTL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);
        let resolver_timeout = parse_u64(&lookup, "PCAE_RESOLVER_TIMEOUT_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.resolver_timeout);
        Self {
            cache_ttl,
            resolver_timeout,
        }
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(var = name, value = %raw, error = %e, "ignoring unparseable setting");
            None
        }
    }
}
