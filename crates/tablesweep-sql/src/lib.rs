//! SQL text processing
//!
//! This crate handles:
//! - Tolerant parsing of logged query text using datafusion-sqlparser-rs
//! - Extracting referenced column names from the AST
//! - Canonicalizing sharded/partitioned table names

pub mod columns;
pub mod parser;
pub mod shards;

pub use columns::{extract_columns, referenced_columns};
pub use parser::{ParseError, SqlParser};
pub use shards::strip_shard_suffix;
