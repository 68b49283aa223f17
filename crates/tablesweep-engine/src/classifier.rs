//! Staleness classification
//!
//! Every catalog object either gets a severity bucket or `None` (actively
//! used / too young); callers filter the `None`s out of the report. Nothing
//! is dropped silently.

use chrono::{Duration, NaiveDate};
use tablesweep_core::{CatalogTableEntry, ColumnSeverity, QueryLogRecord, TableSeverity};

/// Classify one catalog table against its most recent log reference.
///
/// Rules are evaluated in order; the first match wins:
/// 1. `never used` - only ever referenced on its creation day, and created
///    more than 30 days ago.
/// 2. `6 months unused` - absent from the logs and created at least 180 days
///    ago (the log retention window).
/// 3. `3 months unused` - last referenced between 90 and 180 days ago, both
///    boundaries inclusive.
///
/// Tables younger than the relevant window, or referenced within the last 90
/// days, return `None` and stay out of the report.
pub fn classify_table(
    entry: &CatalogTableEntry,
    last_run: Option<&QueryLogRecord>,
    as_of: NaiveDate,
) -> Option<TableSeverity> {
    match last_run {
        Some(log)
            if log.last_run_date == entry.creation_date
                && entry.creation_date < as_of - Duration::days(30) =>
        {
            Some(TableSeverity::NeverUsed)
        }
        None if entry.creation_date <= as_of - Duration::days(180) => {
            Some(TableSeverity::SixMonthsUnused)
        }
        Some(log)
            if log.last_run_date <= as_of - Duration::days(90)
                && log.last_run_date >= as_of - Duration::days(180) =>
        {
            Some(TableSeverity::ThreeMonthsUnused)
        }
        _ => None,
    }
}

/// Classify one catalog column from the date of its last observed use.
///
/// The caller resolves `last_run` by joining on `(canonical table, column
/// name)` only - project and dataset are not part of the key, so same-named
/// tables in different datasets can cross-match. That ambiguity comes from
/// the source system and is kept as-is.
pub fn classify_column(last_run: Option<NaiveDate>, as_of: NaiveDate) -> Option<ColumnSeverity> {
    match last_run {
        None => Some(ColumnSeverity::MoreThanSixMonths),
        Some(date) if date < as_of - Duration::days(90) => {
            Some(ColumnSeverity::BetweenThreeAndSixMonths)
        }
        _ => None,
    }
}
