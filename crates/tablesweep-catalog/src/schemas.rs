//! Destination table names and schemas
//!
//! Field order matches the report row types in `tablesweep-core`; dashboards
//! select these tables by name, so the names are stable.

use crate::client::{FieldSpec, FieldType};

pub const TOTAL_LOGS_TABLE: &str = "total_logs";
pub const USED_COLUMNS_TABLE: &str = "used_columns";
pub const UNUSED_TABLES_TABLE: &str = "unused_tables";
pub const UNUSED_COLUMNS_TABLE: &str = "unused_columns";

/// Consolidated query log: one row per referenced table
pub const TOTAL_LOGS_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("user_email", FieldType::String),
    FieldSpec::new("job_type", FieldType::String),
    FieldSpec::new("last_run_date", FieldType::Date),
    FieldSpec::new("project_id", FieldType::String),
    FieldSpec::new("dataset_id", FieldType::String),
    FieldSpec::new("table_id", FieldType::String),
    FieldSpec::new("query", FieldType::String),
];

/// Last observed use per column
pub const USED_COLUMNS_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("project_id", FieldType::String),
    FieldSpec::new("dataset_id", FieldType::String),
    FieldSpec::new("table_id", FieldType::String),
    FieldSpec::new("column_name", FieldType::String),
    FieldSpec::new("last_run_date", FieldType::Date),
];

/// Unused-tables report with cost attribution
pub const UNUSED_TABLES_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("project_id", FieldType::String),
    FieldSpec::new("dataset_id", FieldType::String),
    FieldSpec::new("table_id", FieldType::String),
    FieldSpec::new("last_called_by", FieldType::String),
    FieldSpec::new("full_table", FieldType::String),
    FieldSpec::new("type", FieldType::String),
    FieldSpec::new("creation_date", FieldType::Date),
    FieldSpec::new("last_modified_date", FieldType::Date),
    FieldSpec::new("severity_groups", FieldType::String),
    FieldSpec::new("size_gb", FieldType::Float),
    FieldSpec::new("monthly_cost", FieldType::Float),
    FieldSpec::new("annual_cost", FieldType::Float),
];

/// Unused-columns report
pub const UNUSED_COLUMNS_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("table_name", FieldType::String),
    FieldSpec::new("column_name", FieldType::String),
    FieldSpec::new("last_run_date", FieldType::Date),
    FieldSpec::new("severity_group", FieldType::String),
];
