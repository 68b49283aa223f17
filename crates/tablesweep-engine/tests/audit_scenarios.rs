//! End-to-end scenarios over the in-memory pipeline: consolidate the log,
//! extract column usage, classify, and price.

use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use tablesweep_core::{
    CatalogColumnEntry, CatalogTableEntry, ColumnSeverity, ObjectType, QueryLogRecord,
    TableSeverity,
};
use tablesweep_engine::{consolidate, extract_usage, unused_column_report, unused_table_report};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn as_of() -> NaiveDate {
    date(2024, 7, 1)
}

fn log(table: &str, run: NaiveDate, query: &str) -> QueryLogRecord {
    QueryLogRecord {
        user_email: "analyst@example.com".to_string(),
        job_type: "QUERY".to_string(),
        last_run_date: run,
        project_id: "proj".to_string(),
        dataset_id: "ds".to_string(),
        table_id: table.to_string(),
        query: query.to_string(),
    }
}

fn table(table_id: &str, created: NaiveDate, size_bytes: i64) -> CatalogTableEntry {
    CatalogTableEntry {
        project_id: "proj".to_string(),
        dataset_id: "ds".to_string(),
        table_id: table_id.to_string(),
        creation_date: created,
        size_bytes,
        object_type: Some(ObjectType::Table),
    }
}

fn column(table_id: &str, name: &str) -> CatalogColumnEntry {
    CatalogColumnEntry {
        project_id: "proj".to_string(),
        dataset_id: "ds".to_string(),
        table_id: table_id.to_string(),
        column_name: name.to_string(),
    }
}

#[test]
fn sharded_select_yields_two_canonical_usage_records() {
    let run = date(2023, 6, 15);
    let logs = consolidate(vec![log(
        "events_20230101",
        run,
        "SELECT a, b FROM proj.ds.events_20230101",
    )]);

    let usage = extract_usage(&logs);

    assert_eq!(usage.len(), 2);
    for record in &usage {
        assert_eq!(record.table_id, "events");
        assert_eq!(record.last_run_date, run);
    }
    let names: Vec<&str> = usage.iter().map(|r| r.column_name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
}

#[test]
fn fifty_gb_table_created_200_days_ago_with_no_usage() {
    let entries = vec![table("events", as_of() - Duration::days(200), 50_000_000_000)];

    let rows = unused_table_report(&entries, &[], as_of(), 0.0);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].severity_groups, TableSeverity::SixMonthsUnused);
    assert_eq!(rows[0].size_gb, 50.0);
    assert_eq!(rows[0].monthly_cost, 1.0);
    assert_eq!(rows[0].annual_cost, 12.0);
}

#[test]
fn table_last_used_exactly_90_days_ago_is_three_months_unused() {
    let entries = vec![table("events", as_of() - Duration::days(400), 0)];
    let logs = vec![log("events", as_of() - Duration::days(90), "SELECT 1")];

    let rows = unused_table_report(&entries, &logs, as_of(), 0.0);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].severity_groups, TableSeverity::ThreeMonthsUnused);
}

#[test]
fn column_staleness_scenarios() {
    let catalog = vec![column("orders", "amount")];

    // Last used 95 days ago: flagged
    let stale = consolidate(vec![log(
        "orders",
        as_of() - Duration::days(95),
        "SELECT amount FROM proj.ds.orders",
    )]);
    let rows = unused_column_report(&catalog, &extract_usage(&stale), as_of());
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].severity_group,
        ColumnSeverity::BetweenThreeAndSixMonths
    );

    // Last used 10 days ago: actively used, excluded
    let fresh = consolidate(vec![log(
        "orders",
        as_of() - Duration::days(10),
        "SELECT amount FROM proj.ds.orders",
    )]);
    let rows = unused_column_report(&catalog, &extract_usage(&fresh), as_of());
    assert!(rows.is_empty());
}

#[test]
fn unparseable_queries_still_count_for_table_accounting() {
    let run = as_of() - Duration::days(10);
    let logs = consolidate(vec![log("events", run, "THIS IS NOT SQL (((")]);

    // No column usage comes out...
    assert!(extract_usage(&logs).is_empty());

    // ...but the table itself reads as recently used.
    let entries = vec![table("events", as_of() - Duration::days(400), 0)];
    assert!(unused_table_report(&entries, &logs, as_of(), 0.0).is_empty());
}

#[test]
fn full_pipeline_mixes_parseable_and_garbage_rows() {
    let logs = consolidate(vec![
        log(
            "events_20240101",
            as_of() - Duration::days(100),
            "SELECT user_id, amount FROM proj.ds.events_20240101 WHERE amount > 0",
        ),
        log("scratch", as_of() - Duration::days(100), "garbage (((("),
    ]);

    let usage = extract_usage(&logs);
    let catalog = vec![
        column("events_20240101", "user_id"),
        column("events_20240101", "amount"),
        column("events_20240101", "abandoned"),
        column("scratch", "anything"),
    ];

    let rows = unused_column_report(&catalog, &usage, as_of());

    // user_id and amount were seen 100 days ago -> flagged as stale;
    // abandoned and anything have no usage at all -> more than 6.
    assert_eq!(rows.len(), 4);
    let severity_of = |name: &str| {
        rows.iter()
            .find(|r| r.column_name == name)
            .map(|r| r.severity_group)
    };
    assert_eq!(
        severity_of("user_id"),
        Some(ColumnSeverity::BetweenThreeAndSixMonths)
    );
    assert_eq!(
        severity_of("amount"),
        Some(ColumnSeverity::BetweenThreeAndSixMonths)
    );
    assert_eq!(
        severity_of("abandoned"),
        Some(ColumnSeverity::MoreThanSixMonths)
    );
    assert_eq!(
        severity_of("anything"),
        Some(ColumnSeverity::MoreThanSixMonths)
    );
}
