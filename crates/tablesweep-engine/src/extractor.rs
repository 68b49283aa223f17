//! Column usage extraction from logged query text

use tablesweep_core::{ColumnUsageRecord, QueryLogRecord};
use tablesweep_sql::{extract_columns, strip_shard_suffix};

/// Expand one consolidated log row into per-column usage records.
///
/// All records share the row's project, dataset, canonical table, and run
/// date. Query text that does not parse contributes nothing; the row itself
/// still counts for table-level accounting.
pub fn extract_row_usage(row: &QueryLogRecord) -> Vec<ColumnUsageRecord> {
    let Some(columns) = extract_columns(&row.query) else {
        tracing::debug!(table = %row.table_key(), "query text did not parse, no columns extracted");
        return Vec::new();
    };

    let table_id = strip_shard_suffix(&row.table_id);

    columns
        .into_iter()
        .map(|column_name| ColumnUsageRecord {
            project_id: row.project_id.clone(),
            dataset_id: row.dataset_id.clone(),
            table_id: table_id.clone(),
            column_name,
            last_run_date: row.last_run_date,
        })
        .collect()
}

/// Extract usage from every log row and deduplicate to the most recent
/// record per column.
pub fn extract_usage(rows: &[QueryLogRecord]) -> Vec<ColumnUsageRecord> {
    let mut records: Vec<ColumnUsageRecord> = rows.iter().flat_map(extract_row_usage).collect();
    dedupe_usage(&mut records);
    records
}

/// Keep the record with the maximum `last_run_date` per column key.
///
/// Ties keep the first record encountered in the descending sort, which is
/// deterministic for a fixed input order.
pub fn dedupe_usage(records: &mut Vec<ColumnUsageRecord>) {
    records.sort_by(|a, b| {
        a.column_key()
            .cmp(&b.column_key())
            .then(b.last_run_date.cmp(&a.last_run_date))
    });
    records.dedup_by(|next, kept| next.column_key() == kept.column_key());
}
