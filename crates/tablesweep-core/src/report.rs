//! Report rows written back to the warehouse
//!
//! These schemas are consumed by downstream dashboards; field names match the
//! destination tables exactly.

use crate::catalog::ObjectType;
use crate::severity::{ColumnSeverity, TableSeverity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel written as `last_modified_date` for tables that never appear in
/// the logs.
pub fn missing_last_modified() -> NaiveDate {
    NaiveDate::from_ymd_opt(1980, 1, 11).expect("valid sentinel date")
}

/// One row of the unused-tables report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusedTableRow {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,

    /// User behind the most recent reference, when one exists
    pub last_called_by: Option<String>,

    /// `project.dataset.table`
    pub full_table: String,

    #[serde(rename = "type")]
    pub object_type: Option<ObjectType>,

    pub creation_date: NaiveDate,

    /// Last run date, or the [`missing_last_modified`] sentinel
    pub last_modified_date: NaiveDate,

    pub severity_groups: TableSeverity,

    pub size_gb: f64,
    pub monthly_cost: f64,
    pub annual_cost: f64,
}

/// One row of the unused-columns report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusedColumnRow {
    /// Canonical fully qualified table name (shard suffix stripped)
    pub table_name: String,

    pub column_name: String,

    /// Null when the column has no usage record at all
    pub last_run_date: Option<NaiveDate>,

    pub severity_group: ColumnSeverity,
}

/// Counters for the console summary at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Projects whose job history was read
    pub projects_scanned: usize,

    /// Projects skipped because their history could not be fetched
    pub projects_skipped: usize,

    /// Datasets skipped because their catalog could not be fetched
    pub datasets_skipped: usize,

    /// Consolidated log rows (one per table)
    pub log_rows: usize,

    /// Deduplicated column usage records
    pub usage_rows: usize,

    /// Tables flagged with a severity bucket
    pub unused_tables: usize,

    /// Columns flagged with a severity bucket
    pub unused_columns: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_date() {
        assert_eq!(missing_last_modified().to_string(), "1980-01-11");
    }

    #[test]
    fn unused_table_row_serializes_type_field() {
        let row = UnusedTableRow {
            project_id: "proj".to_string(),
            dataset_id: "ds".to_string(),
            table_id: "events".to_string(),
            last_called_by: None,
            full_table: "proj.ds.events".to_string(),
            object_type: Some(ObjectType::Table),
            creation_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            last_modified_date: missing_last_modified(),
            severity_groups: TableSeverity::SixMonthsUnused,
            size_gb: 50.0,
            monthly_cost: 1.0,
            annual_cost: 12.0,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "table");
        assert_eq!(json["severity_groups"], "6 months unused");
        assert_eq!(json["last_modified_date"], "1980-01-11");
        assert_eq!(json["last_called_by"], serde_json::Value::Null);
    }

    #[test]
    fn unused_column_row_serializes_null_date() {
        let row = UnusedColumnRow {
            table_name: "proj.ds.events".to_string(),
            column_name: "amount".to_string(),
            last_run_date: None,
            severity_group: ColumnSeverity::MoreThanSixMonths,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["last_run_date"], serde_json::Value::Null);
        assert_eq!(json["severity_group"], "more than 6");
    }
}
