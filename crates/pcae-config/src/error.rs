//! Error types for configuration resolution.

use pcae_core::ValidationError;
use thiserror::Error;

/// Failure talking to the upstream data source.
///
/// Resolvers recover from every variant locally by falling back to a
/// default; these never reach a `get_configuration` caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The store could not serve the query.
    #[error("query on {table} failed: {reason}")]
    Unavailable { table: String, reason: String },

    /// A single-row lookup found no active row.
    #[error("no active row in {table} for {filter}")]
    NotFound { table: String, filter: String },

    /// A row did not have the expected shape.
    #[error("row in {table} could not be decoded: {reason}")]
    Decode { table: String, reason: String },

    /// The fixture document could not be loaded.
    #[error("fixture error: {0}")]
    Fixture(String),
}

/// Failure of a whole configuration request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// No usable country or industry code was supplied.
    #[error("tenant identity missing: {0}")]
    IdentityMissing(#[from] ValidationError),

    /// Every facet resolver degraded; nothing real was resolved.
    #[error("all resolvers failed for {tenant}")]
    AllResolversFailed { tenant: String },
}
