//! Query log consolidation
//!
//! The consolidated log is the only usage ground truth downstream; nothing
//! re-reads the raw per-project history after this step.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tablesweep_core::{QueryLogRecord, TableKey};

/// Reduce job-history rows to one row per table, keeping the most recent
/// reference.
///
/// Ties on the date keep the row encountered first, so consolidating an
/// already consolidated set returns it unchanged. Output order is sorted by
/// table key for deterministic write-back.
pub fn consolidate(rows: Vec<QueryLogRecord>) -> Vec<QueryLogRecord> {
    let mut latest: HashMap<TableKey, QueryLogRecord> = HashMap::new();

    for row in rows {
        match latest.entry(row.table_key()) {
            Entry::Occupied(mut entry) => {
                if row.last_run_date > entry.get().last_run_date {
                    entry.insert(row);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(row);
            }
        }
    }

    let mut consolidated: Vec<QueryLogRecord> = latest.into_values().collect();
    consolidated.sort_by(|a, b| a.table_key().cmp(&b.table_key()));
    consolidated
}

/// Index consolidated rows by table for classification joins
pub fn index_by_table(rows: &[QueryLogRecord]) -> HashMap<TableKey, &QueryLogRecord> {
    rows.iter().map(|row| (row.table_key(), row)).collect()
}
