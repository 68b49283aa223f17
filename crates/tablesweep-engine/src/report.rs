//! Report assembly: join catalog entries against usage and keep the flagged
//! objects

use crate::classifier::{classify_column, classify_table};
use crate::cost::estimate_cost;
use crate::normalizer::index_by_table;
use chrono::NaiveDate;
use std::collections::HashMap;
use tablesweep_core::{
    missing_last_modified, CatalogColumnEntry, CatalogTableEntry, ColumnUsageRecord,
    QueryLogRecord, TableKey, UnusedColumnRow, UnusedTableRow,
};
use tablesweep_sql::strip_shard_suffix;

/// Build the unused-tables report.
///
/// The log join is on raw table ids - shard canonicalization applies only to
/// the column pipeline. Tables with no severity bucket are in active use and
/// do not appear.
pub fn unused_table_report(
    entries: &[CatalogTableEntry],
    logs: &[QueryLogRecord],
    as_of: NaiveDate,
    discount: f64,
) -> Vec<UnusedTableRow> {
    let index = index_by_table(logs);
    let mut rows = Vec::new();

    for entry in entries {
        let key = TableKey::new(&entry.project_id, &entry.dataset_id, &entry.table_id);
        let last_run = index.get(&key).copied();

        let Some(severity) = classify_table(entry, last_run, as_of) else {
            continue;
        };

        let cost = estimate_cost(entry.size_bytes, discount);

        rows.push(UnusedTableRow {
            project_id: entry.project_id.clone(),
            dataset_id: entry.dataset_id.clone(),
            table_id: entry.table_id.clone(),
            last_called_by: last_run.map(|log| log.user_email.clone()),
            full_table: entry.fqn(),
            object_type: entry.object_type,
            creation_date: entry.creation_date,
            last_modified_date: last_run
                .map(|log| log.last_run_date)
                .unwrap_or_else(missing_last_modified),
            severity_groups: severity,
            size_gb: cost.size_gb,
            monthly_cost: cost.monthly_cost,
            annual_cost: cost.annual_cost,
        });
    }

    rows
}

/// Build the unused-columns report.
///
/// Catalog table names are canonicalized with the same suffix rule the
/// extractor applies, then matched to usage by `(table_id, column_name)`
/// only. Rows are deduplicated per `(table_name, column_name)` keeping the
/// most recent use.
pub fn unused_column_report(
    catalog_columns: &[CatalogColumnEntry],
    usage: &[ColumnUsageRecord],
    as_of: NaiveDate,
) -> Vec<UnusedColumnRow> {
    // Most recent use per (canonical table, column), across all datasets.
    let mut last_use: HashMap<(&str, &str), NaiveDate> = HashMap::new();
    for record in usage {
        last_use
            .entry((record.table_id.as_str(), record.column_name.as_str()))
            .and_modify(|date| {
                if record.last_run_date > *date {
                    *date = record.last_run_date;
                }
            })
            .or_insert(record.last_run_date);
    }

    let mut rows = Vec::new();
    for entry in catalog_columns {
        let table_id = strip_shard_suffix(&entry.table_id);
        let last_run = last_use
            .get(&(table_id.as_str(), entry.column_name.as_str()))
            .copied();

        let Some(severity) = classify_column(last_run, as_of) else {
            continue;
        };

        rows.push(UnusedColumnRow {
            table_name: format!("{}.{}.{}", entry.project_id, entry.dataset_id, table_id),
            column_name: entry.column_name.clone(),
            last_run_date: last_run,
            severity_group: severity,
        });
    }

    // Shard siblings collapse onto one canonical row; keep the most recent.
    rows.sort_by(|a, b| {
        (a.table_name.as_str(), a.column_name.as_str())
            .cmp(&(b.table_name.as_str(), b.column_name.as_str()))
            .then(b.last_run_date.cmp(&a.last_run_date))
    });
    rows.dedup_by(|next, kept| {
        next.table_name == kept.table_name && next.column_name == kept.column_name
    });

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use tablesweep_core::{ColumnSeverity, ObjectType, TableSeverity};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn as_of() -> NaiveDate {
        date(2024, 7, 1)
    }

    fn table_entry(table: &str, created: NaiveDate, size_bytes: i64) -> CatalogTableEntry {
        CatalogTableEntry {
            project_id: "proj".to_string(),
            dataset_id: "ds".to_string(),
            table_id: table.to_string(),
            creation_date: created,
            size_bytes,
            object_type: Some(ObjectType::Table),
        }
    }

    fn column_entry(dataset: &str, table: &str, column: &str) -> CatalogColumnEntry {
        CatalogColumnEntry {
            project_id: "proj".to_string(),
            dataset_id: dataset.to_string(),
            table_id: table.to_string(),
            column_name: column.to_string(),
        }
    }

    fn log(table: &str, run: NaiveDate) -> QueryLogRecord {
        QueryLogRecord {
            user_email: "user@example.com".to_string(),
            job_type: "QUERY".to_string(),
            last_run_date: run,
            project_id: "proj".to_string(),
            dataset_id: "ds".to_string(),
            table_id: table.to_string(),
            query: "SELECT 1".to_string(),
        }
    }

    fn usage(table: &str, column: &str, run: NaiveDate) -> ColumnUsageRecord {
        ColumnUsageRecord {
            project_id: "proj".to_string(),
            dataset_id: "ds".to_string(),
            table_id: table.to_string(),
            column_name: column.to_string(),
            last_run_date: run,
        }
    }

    #[test]
    fn unreferenced_old_table_reports_with_cost_and_sentinel() {
        let entries = vec![table_entry(
            "events",
            as_of() - Duration::days(200),
            50_000_000_000,
        )];

        let rows = unused_table_report(&entries, &[], as_of(), 0.0);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.severity_groups, TableSeverity::SixMonthsUnused);
        assert_eq!(row.full_table, "proj.ds.events");
        assert_eq!(row.size_gb, 50.0);
        assert_eq!(row.monthly_cost, 1.0);
        assert_eq!(row.annual_cost, 12.0);
        assert_eq!(row.last_called_by, None);
        assert_eq!(row.last_modified_date, missing_last_modified());
    }

    #[test]
    fn active_tables_stay_out_of_the_report() {
        let entries = vec![table_entry(
            "events",
            as_of() - Duration::days(400),
            1_000_000_000,
        )];
        let logs = vec![log("events", as_of() - Duration::days(5))];

        assert!(unused_table_report(&entries, &logs, as_of(), 0.0).is_empty());
    }

    #[test]
    fn every_table_is_either_flagged_or_active() {
        // Classification completeness over a spread of cases.
        let entries = vec![
            table_entry("never_used", as_of() - Duration::days(60), 0),
            table_entry("gone", as_of() - Duration::days(300), 0),
            table_entry("stale", as_of() - Duration::days(300), 0),
            table_entry("active", as_of() - Duration::days(300), 0),
            table_entry("young", as_of() - Duration::days(5), 0),
        ];
        let logs = vec![
            log("never_used", as_of() - Duration::days(60)),
            log("stale", as_of() - Duration::days(120)),
            log("active", as_of() - Duration::days(2)),
        ];

        let rows = unused_table_report(&entries, &logs, as_of(), 0.0);
        let flagged: Vec<&str> = rows.iter().map(|r| r.table_id.as_str()).collect();

        assert_eq!(flagged, ["never_used", "gone", "stale"]);
    }

    #[test]
    fn table_join_uses_raw_sharded_ids() {
        // A sharded catalog table only matches a log row with the same raw id.
        let entries = vec![table_entry(
            "events_20230101",
            as_of() - Duration::days(300),
            0,
        )];
        let logs = vec![log("events", as_of() - Duration::days(5))];

        let rows = unused_table_report(&entries, &logs, as_of(), 0.0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].severity_groups, TableSeverity::SixMonthsUnused);
    }

    #[test]
    fn column_report_flags_and_excludes() {
        let catalog = vec![
            column_entry("ds", "orders", "amount"),
            column_entry("ds", "orders", "status"),
            column_entry("ds", "orders", "forgotten"),
        ];
        let usage = vec![
            usage("orders", "amount", as_of() - Duration::days(95)),
            usage("orders", "status", as_of() - Duration::days(10)),
        ];

        let rows = unused_column_report(&catalog, &usage, as_of());

        assert_eq!(rows.len(), 2);
        let amount = rows.iter().find(|r| r.column_name == "amount").unwrap();
        assert_eq!(
            amount.severity_group,
            ColumnSeverity::BetweenThreeAndSixMonths
        );
        assert_eq!(amount.last_run_date, Some(as_of() - Duration::days(95)));

        let forgotten = rows.iter().find(|r| r.column_name == "forgotten").unwrap();
        assert_eq!(forgotten.severity_group, ColumnSeverity::MoreThanSixMonths);
        assert_eq!(forgotten.last_run_date, None);
    }

    #[test]
    fn shard_siblings_collapse_to_one_canonical_row() {
        let catalog = vec![
            column_entry("ds", "events_20230101", "payload"),
            column_entry("ds", "events_20230102", "payload"),
        ];

        let rows = unused_column_report(&catalog, &[], as_of());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].table_name, "proj.ds.events");
    }

    #[test]
    fn column_match_ignores_dataset() {
        // Known limitation carried from the source system: usage recorded
        // against ds.orders also satisfies other_ds.orders, because the join
        // key is (table, column) only.
        let catalog = vec![column_entry("other_ds", "orders", "amount")];
        let usage = vec![usage("orders", "amount", as_of() - Duration::days(5))];

        assert!(unused_column_report(&catalog, &usage, as_of()).is_empty());
    }
}
