//! Tablesweep engine - Core business logic
//!
//! This crate implements the audit pipeline over in-memory records:
//! - Query log consolidation (one row per table, most recent reference)
//! - Column usage extraction from logged query text
//! - Staleness classification against the catalog
//! - Storage cost attribution and report assembly
//!
//! Everything here is a pure function of its inputs plus an explicit audit
//! date; warehouse access lives in `tablesweep-catalog`.

pub mod classifier;
pub mod cost;
pub mod extractor;
pub mod normalizer;
pub mod report;

pub use classifier::{classify_column, classify_table};
pub use cost::{estimate_cost, CostEstimate};
pub use extractor::{extract_row_usage, extract_usage};
pub use normalizer::{consolidate, index_by_table};
pub use report::{unused_column_report, unused_table_report};
