//! Tablesweep Core
//!
//! Core domain model with stable types: usage records reconstructed from the
//! job history, catalog entries, staleness severity buckets, and the report
//! rows written back to the warehouse.

pub mod catalog;
pub mod config;
pub mod report;
pub mod severity;
pub mod usage;

pub use catalog::{CatalogColumnEntry, CatalogTableEntry, ObjectType};
pub use config::{Checks, Config, ConfigError};
pub use report::{missing_last_modified, AuditSummary, UnusedColumnRow, UnusedTableRow};
pub use severity::{ColumnSeverity, TableSeverity};
pub use usage::{ColumnKey, ColumnUsageRecord, QueryLogRecord, TableKey};
