//! Cross-project collection with skip-on-failure
//!
//! Project enumeration failing is fatal (nothing can be audited without it),
//! but any single project or dataset failing to serve history or metadata is
//! logged and skipped; the audit continues on whatever remains.

use crate::client::{FetchError, WarehouseClient};
use tablesweep_core::{CatalogColumnEntry, CatalogTableEntry, QueryLogRecord};

/// Job-history rows gathered across all reachable projects
#[derive(Debug, Clone, Default)]
pub struct CollectedLogs {
    pub rows: Vec<QueryLogRecord>,
    pub projects_scanned: usize,
    pub projects_skipped: usize,
}

/// Catalog entries gathered across all reachable datasets
#[derive(Debug, Clone)]
pub struct CollectedCatalog<T> {
    pub entries: Vec<T>,
    pub datasets_scanned: usize,
    pub datasets_skipped: usize,
}

impl<T> Default for CollectedCatalog<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            datasets_scanned: 0,
            datasets_skipped: 0,
        }
    }
}

/// Gather job history from every reachable project
pub async fn collect_query_logs(
    client: &dyn WarehouseClient,
) -> Result<CollectedLogs, FetchError> {
    let mut collected = CollectedLogs::default();

    for project in client.list_projects().await? {
        match client.fetch_query_logs(&project).await {
            Ok(rows) => {
                tracing::info!(project = %project, rows = rows.len(), "loaded job history");
                collected.rows.extend(rows);
                collected.projects_scanned += 1;
            }
            Err(e) => {
                tracing::warn!(project = %project, error = %e, "could not load project, skipping");
                collected.projects_skipped += 1;
            }
        }
    }

    Ok(collected)
}

/// Gather table metadata from every reachable dataset
pub async fn collect_table_entries(
    client: &dyn WarehouseClient,
) -> Result<CollectedCatalog<CatalogTableEntry>, FetchError> {
    collect_catalog(client, |project, dataset| {
        let project = project.to_string();
        let dataset = dataset.to_string();
        async move { client.fetch_tables(&project, &dataset).await }
    })
    .await
}

/// Gather column metadata from every reachable dataset
pub async fn collect_column_entries(
    client: &dyn WarehouseClient,
) -> Result<CollectedCatalog<CatalogColumnEntry>, FetchError> {
    collect_catalog(client, |project, dataset| {
        let project = project.to_string();
        let dataset = dataset.to_string();
        async move { client.fetch_columns(&project, &dataset).await }
    })
    .await
}

async fn collect_catalog<T, F, Fut>(
    client: &dyn WarehouseClient,
    fetch: F,
) -> Result<CollectedCatalog<T>, FetchError>
where
    F: Fn(&str, &str) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<T>, FetchError>>,
{
    let mut collected = CollectedCatalog::default();

    for project in client.list_projects().await? {
        let datasets = match client.list_datasets(&project).await {
            Ok(datasets) => datasets,
            Err(e) => {
                tracing::warn!(project = %project, error = %e, "could not list datasets, skipping project");
                collected.datasets_skipped += 1;
                continue;
            }
        };

        for dataset in datasets {
            match fetch(&project, &dataset).await {
                Ok(entries) => {
                    collected.entries.extend(entries);
                    collected.datasets_scanned += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        project = %project,
                        dataset = %dataset,
                        error = %e,
                        "could not load dataset catalog, skipping"
                    );
                    collected.datasets_skipped += 1;
                }
            }
        }
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWarehouse;
    use chrono::NaiveDate;
    use tablesweep_core::ObjectType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn log(project: &str, table: &str) -> QueryLogRecord {
        QueryLogRecord {
            user_email: "a@example.com".to_string(),
            job_type: "QUERY".to_string(),
            last_run_date: date(2024, 3, 1),
            project_id: project.to_string(),
            dataset_id: "ds".to_string(),
            table_id: table.to_string(),
            query: "SELECT 1".to_string(),
        }
    }

    #[tokio::test]
    async fn failed_project_is_skipped_not_fatal() {
        let warehouse = MockWarehouse::new();
        warehouse.add_log(log("ok_proj", "events")).await;
        warehouse
            .fail_query_logs("locked", FetchError::PermissionDenied("denied".to_string()))
            .await;

        let collected = collect_query_logs(&warehouse).await.unwrap();

        assert_eq!(collected.rows.len(), 1);
        assert_eq!(collected.projects_scanned, 1);
        assert_eq!(collected.projects_skipped, 1);
    }

    #[tokio::test]
    async fn failed_dataset_keeps_the_rest() {
        let warehouse = MockWarehouse::new();
        warehouse
            .add_table(CatalogTableEntry {
                project_id: "proj".to_string(),
                dataset_id: "good".to_string(),
                table_id: "events".to_string(),
                creation_date: date(2024, 1, 1),
                size_bytes: 10,
                object_type: Some(ObjectType::Table),
            })
            .await;
        warehouse
            .add_table(CatalogTableEntry {
                project_id: "proj".to_string(),
                dataset_id: "bad".to_string(),
                table_id: "orders".to_string(),
                creation_date: date(2024, 1, 1),
                size_bytes: 10,
                object_type: Some(ObjectType::Table),
            })
            .await;
        warehouse
            .fail_tables("proj", "bad", FetchError::QueryError("timeout".to_string()))
            .await;

        let collected = collect_table_entries(&warehouse).await.unwrap();

        assert_eq!(collected.entries.len(), 1);
        assert_eq!(collected.entries[0].dataset_id, "good");
        assert_eq!(collected.datasets_scanned, 1);
        assert_eq!(collected.datasets_skipped, 1);
    }

    #[tokio::test]
    async fn empty_warehouse_collects_nothing() {
        let warehouse = MockWarehouse::new();
        let collected = collect_query_logs(&warehouse).await.unwrap();
        assert!(collected.rows.is_empty());
        assert_eq!(collected.projects_scanned, 0);
    }
}
