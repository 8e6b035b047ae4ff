//! # Upstream Data Source
//!
//! The engine reads every facet through [`DataSource::query`]: a table name
//! plus equality filters, returning JSON object rows. Row schemas are owned
//! by the upstream store; resolvers decode the columns they need.
//!
//! Implementations:
//!
//! - [`InMemorySource`]: tables loaded from a YAML or JSON fixture document.
//! - [`FailingSource`]: decorator that makes chosen tables error or stall.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SourceError;

/// One upstream row.
pub type Row = serde_json::Map<String, Value>;

/// Column equality filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.column, self.value)
    }
}

/// Rows with `is_active: false` are inactive. A missing flag counts as active.
pub fn is_active(row: &Row) -> bool {
    !matches!(row.get("is_active"), Some(Value::Bool(false)))
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Return rows of `table` matching every filter, in table order.
    async fn query(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, SourceError>;
}

// ---------------------------------------------------------------------------
// InMemorySource
// ---------------------------------------------------------------------------

/// Tables held in memory. A table absent from the fixture has no rows.
#[derive(Debug, Default)]
pub struct InMemorySource {
    tables: HashMap<String, Vec<Row>>,
    latency: Option<Duration>,
    queries: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a document of the form `{ "<table>": [ {row}, ... ], ... }`.
    pub fn from_document(doc: Value) -> Result<Self, SourceError> {
        let Value::Object(tables) = doc else {
            return Err(SourceError::Fixture(
                "fixture root must be a mapping of table name to rows".to_string(),
            ));
        };
        let mut source = Self::new();
        for (table, rows) in tables {
            let Value::Array(rows) = rows else {
                return Err(SourceError::Fixture(format!("table {table} must be a list of rows")));
            };
            let mut decoded = Vec::with_capacity(rows.len());
            for (i, row) in rows.into_iter().enumerate() {
                match row {
                    Value::Object(map) => decoded.push(map),
                    other => {
                        return Err(SourceError::Fixture(format!(
                            "row {i} of {table} is not an object: {other}"
                        )))
                    }
                }
            }
            source.tables.insert(table, decoded);
        }
        Ok(source)
    }

    /// Load a fixture file. `.json` is parsed as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Fixture(format!("reading {}: {e}", path.display())))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let doc: Value = if is_json {
            serde_json::from_str(&text)
                .map_err(|e| SourceError::Fixture(format!("parsing {}: {e}", path.display())))?
        } else {
            serde_yaml::from_str(&text)
                .map_err(|e| SourceError::Fixture(format!("parsing {}: {e}", path.display())))?
        };
        let source = Self::from_document(doc)?;
        tracing::info!(
            path = %path.display(),
            tables = source.tables.len(),
            "loaded configuration fixture"
        );
        Ok(source)
    }

    pub fn with_table(mut self, table: impl Into<String>, rows: Vec<Row>) -> Self {
        self.tables.insert(table.into(), rows);
        self
    }

    /// Delay every query by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl DataSource for InMemorySource {
    async fn query(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, SourceError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let rows = self
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// FailingSource
// ---------------------------------------------------------------------------

/// Wraps another source and injects failures per table.
pub struct FailingSource {
    inner: Arc<dyn DataSource>,
    failing: HashSet<String>,
    fail_all: bool,
    stalls: HashMap<String, Duration>,
}

impl std::fmt::Debug for FailingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailingSource")
            .field("failing", &self.failing)
            .field("fail_all", &self.fail_all)
            .field("stalls", &self.stalls)
            .finish_non_exhaustive()
    }
}

impl FailingSource {
    pub fn new(inner: Arc<dyn DataSource>) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
            fail_all: false,
            stalls: HashMap::new(),
        }
    }

    /// Every query on `table` returns [`SourceError::Unavailable`].
    pub fn fail_table(mut self, table: impl Into<String>) -> Self {
        self.failing.insert(table.into());
        self
    }

    /// Every query on every table fails.
    pub fn fail_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Queries on `table` sleep for `delay` before delegating.
    pub fn stall_table(mut self, table: impl Into<String>, delay: Duration) -> Self {
        self.stalls.insert(table.into(), delay);
        self
    }
}

#[async_trait]
impl DataSource for FailingSource {
    async fn query(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, SourceError> {
        if let Some(delay) = self.stalls.get(table) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_all || self.failing.contains(table) {
            return Err(SourceError::Unavailable {
                table: table.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        self.inner.query(table, filters).await
    }
}
