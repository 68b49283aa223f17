//! Usage records reconstructed from the warehouse job history

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a table within the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey {
    /// Project that owns the dataset
    pub project_id: String,

    /// Dataset that owns the table
    pub dataset_id: String,

    /// Table name
    pub table_id: String,
}

impl TableKey {
    /// Create a new table key
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

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// One job-history row tying a query to a referenced table
///
/// After normalization there is at most one record per
/// `(project_id, dataset_id, table_id)`, holding the latest run date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLogRecord {
    /// User that issued the query
    pub user_email: String,

    /// Job type reported by the warehouse (e.g. "QUERY")
    pub job_type: String,

    /// Date the query last ran
    pub last_run_date: NaiveDate,

    /// Project of the referenced table
    pub project_id: String,

    /// Dataset of the referenced table
    pub dataset_id: String,

    /// Referenced table name (raw, shard suffix intact)
    pub table_id: String,

    /// Query text (never null; null-query jobs are dropped at the source)
    pub query: String,
}

impl QueryLogRecord {
    /// Key identifying the referenced table
    pub fn table_key(&self) -> TableKey {
        TableKey::new(&self.project_id, &self.dataset_id, &self.table_id)
    }
}

/// Identity of a column within the warehouse, after table canonicalization
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    pub column_name: String,
}

/// Last observed use of a single column
///
/// Derived from a [`QueryLogRecord`] by column extraction; `table_id` is the
/// canonical name with any shard/partition suffix stripped. After
/// deduplication there is at most one record per [`ColumnKey`], holding the
/// maximum `last_run_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnUsageRecord {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    pub column_name: String,
    pub last_run_date: NaiveDate,
}

impl ColumnUsageRecord {
    /// Full dedup key for this record
    pub fn column_key(&self) -> ColumnKey {
        ColumnKey {
            project_id: self.project_id.clone(),
            dataset_id: self.dataset_id.clone(),
            table_id: self.table_id.clone(),
            column_name: self.column_name.clone(),
        }
    }

    /// Canonical fully qualified table name
    pub fn table_name(&self) -> String {
        format!("{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}
