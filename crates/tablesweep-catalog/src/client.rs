//! Warehouse client trait for the audit pipeline

use std::fmt;
use tablesweep_core::{CatalogColumnEntry, CatalogTableEntry, QueryLogRecord};

/// Identifies a destination table for write-back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    /// Project that owns the destination dataset
    pub project_id: String,

    /// Destination dataset
    pub dataset_id: String,

    /// Destination table
    pub table_id: String,
}

impl TableReference {
    /// Create a new table reference
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// Column type of a destination table field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Float,
    Date,
}

/// One field of a destination table schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
}

impl FieldSpec {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type }
    }
}

/// Errors that can occur talking to the warehouse
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Trait for warehouse clients used by the audit pipeline
///
/// Read methods are scoped to one project or dataset so that a single
/// permission failure can be skipped without losing the rest of the run;
/// only connection setup is fatal.
#[async_trait::async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Get the client name (e.g., "BigQuery")
    fn name(&self) -> &'static str;

    /// Enumerate the projects reachable with the current credentials
    async fn list_projects(&self) -> Result<Vec<String>, FetchError>;

    /// Enumerate the datasets of a project
    async fn list_datasets(&self, project_id: &str) -> Result<Vec<String>, FetchError>;

    /// Fetch the job history of a project: one row per referenced table per
    /// query, already restricted to jobs with non-null query text
    async fn fetch_query_logs(&self, project_id: &str)
        -> Result<Vec<QueryLogRecord>, FetchError>;

    /// Fetch table metadata for a dataset
    async fn fetch_tables(
        &self,
        project_id: &str,
        dataset_id: &str,
    ) -> Result<Vec<CatalogTableEntry>, FetchError>;

    /// Fetch column metadata for a dataset
    async fn fetch_columns(
        &self,
        project_id: &str,
        dataset_id: &str,
    ) -> Result<Vec<CatalogColumnEntry>, FetchError>;

    /// Replace the destination table's contents with the given rows
    /// (full-replace semantics; prior results are dropped)
    async fn replace_rows(
        &self,
        destination: &TableReference,
        schema: &[FieldSpec],
        rows: &[serde_json::Value],
    ) -> Result<(), FetchError>;

    /// Test the connection before doing any work
    async fn test_connection(&self) -> Result<(), FetchError>;
}
