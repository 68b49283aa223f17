//! Warehouse access for the usage audit
//!
//! This crate provides the [`WarehouseClient`] trait covering everything the
//! pipeline reads (project/dataset enumeration, job history, table and column
//! metadata) and writes (full-replace result tables), a BigQuery
//! implementation, and an in-memory mock for tests.
//!
//! ## Features
//!
//! - `bigquery` - Google BigQuery support via `gcp-bigquery-client`; without
//!   it the adapter compiles but every call reports a configuration error.

pub mod bigquery;
pub mod client;
pub mod collector;
pub mod mock;
pub mod schemas;

pub use bigquery::BigQueryWarehouse;
pub use client::{FetchError, FieldSpec, FieldType, TableReference, WarehouseClient};
pub use collector::{
    collect_column_entries, collect_query_logs, collect_table_entries, CollectedCatalog,
    CollectedLogs,
};
pub use mock::MockWarehouse;
