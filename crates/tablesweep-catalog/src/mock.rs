//! Mock warehouse for testing
//!
//! Serves predefined projects, job history, and catalog metadata without a
//! network connection, captures every write-back, and can simulate failures
//! per project or dataset.
//!
//! ```rust,ignore
//! let warehouse = MockWarehouse::new();
//! warehouse.add_project("proj").await;
//! warehouse.add_log(log_record).await;
//! warehouse.add_table(table_entry).await;
//!
//! // Simulate a project whose history cannot be read
//! warehouse
//!     .fail_query_logs("locked-proj", FetchError::PermissionDenied("nope".into()))
//!     .await;
//! ```

use crate::client::{FetchError, FieldSpec, TableReference, WarehouseClient};
use std::collections::HashMap;
use std::sync::Arc;
use tablesweep_core::{CatalogColumnEntry, CatalogTableEntry, QueryLogRecord};
use tokio::sync::RwLock;

/// In-memory warehouse double
///
/// Thread-safe; clones share state, so a test can keep a handle for
/// assertions while the pipeline owns another.
pub struct MockWarehouse {
    /// Registered projects, in insertion order
    projects: Arc<RwLock<Vec<String>>>,

    /// Job-history rows by project
    logs: Arc<RwLock<HashMap<String, Vec<QueryLogRecord>>>>,

    /// Table metadata by (project, dataset)
    tables: Arc<RwLock<HashMap<(String, String), Vec<CatalogTableEntry>>>>,

    /// Column metadata by (project, dataset)
    columns: Arc<RwLock<HashMap<(String, String), Vec<CatalogColumnEntry>>>>,

    /// Injected failures
    log_errors: Arc<RwLock<HashMap<String, FetchError>>>,
    dataset_errors: Arc<RwLock<HashMap<String, FetchError>>>,
    table_errors: Arc<RwLock<HashMap<(String, String), FetchError>>>,
    column_errors: Arc<RwLock<HashMap<(String, String), FetchError>>>,

    /// Captured write-backs by destination FQN
    written: Arc<RwLock<HashMap<String, Vec<serde_json::Value>>>>,

    /// Simulate connection failure
    fail_connection: bool,
}

impl MockWarehouse {
    /// Create an empty mock warehouse
    pub fn new() -> Self {
        Self {
            projects: Arc::new(RwLock::new(Vec::new())),
            logs: Arc::new(RwLock::new(HashMap::new())),
            tables: Arc::new(RwLock::new(HashMap::new())),
            columns: Arc::new(RwLock::new(HashMap::new())),
            log_errors: Arc::new(RwLock::new(HashMap::new())),
            dataset_errors: Arc::new(RwLock::new(HashMap::new())),
            table_errors: Arc::new(RwLock::new(HashMap::new())),
            column_errors: Arc::new(RwLock::new(HashMap::new())),
            written: Arc::new(RwLock::new(HashMap::new())),
            fail_connection: false,
        }
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Register a project
    pub async fn add_project(&self, project_id: impl Into<String>) {
        let project_id = project_id.into();
        let mut projects = self.projects.write().await;
        if !projects.contains(&project_id) {
            projects.push(project_id);
        }
    }

    /// Add a job-history row (the row's project is registered implicitly)
    pub async fn add_log(&self, record: QueryLogRecord) {
        self.add_project(record.project_id.clone()).await;
        self.logs
            .write()
            .await
            .entry(record.project_id.clone())
            .or_default()
            .push(record);
    }

    /// Add a catalog table entry (project and dataset registered implicitly)
    pub async fn add_table(&self, entry: CatalogTableEntry) {
        self.add_project(entry.project_id.clone()).await;
        self.tables
            .write()
            .await
            .entry((entry.project_id.clone(), entry.dataset_id.clone()))
            .or_default()
            .push(entry);
    }

    /// Add a catalog column entry (project and dataset registered implicitly)
    pub async fn add_column(&self, entry: CatalogColumnEntry) {
        self.add_project(entry.project_id.clone()).await;
        self.columns
            .write()
            .await
            .entry((entry.project_id.clone(), entry.dataset_id.clone()))
            .or_default()
            .push(entry);
    }

    /// Fail job-history fetches for a project
    pub async fn fail_query_logs(&self, project_id: impl Into<String>, error: FetchError) {
        let project_id = project_id.into();
        self.add_project(project_id.clone()).await;
        self.log_errors.write().await.insert(project_id, error);
    }

    /// Fail dataset enumeration for a project
    pub async fn fail_datasets(&self, project_id: impl Into<String>, error: FetchError) {
        let project_id = project_id.into();
        self.add_project(project_id.clone()).await;
        self.dataset_errors.write().await.insert(project_id, error);
    }

    /// Fail table metadata fetches for a dataset
    pub async fn fail_tables(
        &self,
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        error: FetchError,
    ) {
        let key = (project_id.into(), dataset_id.into());
        self.add_project(key.0.clone()).await;
        self.table_errors.write().await.insert(key, error);
    }

    /// Fail column metadata fetches for a dataset
    pub async fn fail_columns(
        &self,
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        error: FetchError,
    ) {
        let key = (project_id.into(), dataset_id.into());
        self.add_project(key.0.clone()).await;
        self.column_errors.write().await.insert(key, error);
    }

    /// Rows last written to a destination, if any
    pub async fn written_rows(&self, destination: &TableReference) -> Option<Vec<serde_json::Value>> {
        self.written.read().await.get(&destination.fqn()).cloned()
    }

    /// Number of destinations written so far
    pub async fn written_table_count(&self) -> usize {
        self.written.read().await.len()
    }
}

impl Default for MockWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockWarehouse {
    fn clone(&self) -> Self {
        Self {
            projects: Arc::clone(&self.projects),
            logs: Arc::clone(&self.logs),
            tables: Arc::clone(&self.tables),
            columns: Arc::clone(&self.columns),
            log_errors: Arc::clone(&self.log_errors),
            dataset_errors: Arc::clone(&self.dataset_errors),
            table_errors: Arc::clone(&self.table_errors),
            column_errors: Arc::clone(&self.column_errors),
            written: Arc::clone(&self.written),
            fail_connection: self.fail_connection,
        }
    }
}

#[async_trait::async_trait]
impl WarehouseClient for MockWarehouse {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn list_projects(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.projects.read().await.clone())
    }

    async fn list_datasets(&self, project_id: &str) -> Result<Vec<String>, FetchError> {
        if let Some(error) = self.dataset_errors.read().await.get(project_id) {
            return Err(error.clone());
        }

        // Datasets are whatever the registered metadata mentions.
        let mut datasets: Vec<String> = Vec::new();
        for store in [
            self.tables.read().await.keys().cloned().collect::<Vec<_>>(),
            self.columns.read().await.keys().cloned().collect::<Vec<_>>(),
        ] {
            for (project, dataset) in store {
                if project == project_id && !datasets.contains(&dataset) {
                    datasets.push(dataset);
                }
            }
        }

        datasets.sort_unstable();
        Ok(datasets)
    }

    async fn fetch_query_logs(
        &self,
        project_id: &str,
    ) -> Result<Vec<QueryLogRecord>, FetchError> {
        if let Some(error) = self.log_errors.read().await.get(project_id) {
            return Err(error.clone());
        }

        Ok(self
            .logs
            .read()
            .await
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_tables(
        &self,
        project_id: &str,
        dataset_id: &str,
    ) -> Result<Vec<CatalogTableEntry>, FetchError> {
        let key = (project_id.to_string(), dataset_id.to_string());
        if let Some(error) = self.table_errors.read().await.get(&key) {
            return Err(error.clone());
        }

        Ok(self.tables.read().await.get(&key).cloned().unwrap_or_default())
    }

    async fn fetch_columns(
        &self,
        project_id: &str,
        dataset_id: &str,
    ) -> Result<Vec<CatalogColumnEntry>, FetchError> {
        let key = (project_id.to_string(), dataset_id.to_string());
        if let Some(error) = self.column_errors.read().await.get(&key) {
            return Err(error.clone());
        }

        Ok(self.columns.read().await.get(&key).cloned().unwrap_or_default())
    }

    async fn replace_rows(
        &self,
        destination: &TableReference,
        _schema: &[FieldSpec],
        rows: &[serde_json::Value],
    ) -> Result<(), FetchError> {
        self.written
            .write()
            .await
            .insert(destination.fqn(), rows.to_vec());
        Ok(())
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        if self.fail_connection {
            Err(FetchError::NetworkError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn log(project: &str, table: &str, date: NaiveDate) -> QueryLogRecord {
        QueryLogRecord {
            user_email: "a@example.com".to_string(),
            job_type: "QUERY".to_string(),
            last_run_date: date,
            project_id: project.to_string(),
            dataset_id: "ds".to_string(),
            table_id: table.to_string(),
            query: "SELECT 1".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn logs_round_trip() {
        let warehouse = MockWarehouse::new();
        warehouse.add_log(log("proj", "events", date(2024, 3, 1))).await;

        assert_eq!(warehouse.list_projects().await.unwrap(), ["proj"]);
        let rows = warehouse.fetch_query_logs("proj").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].table_id, "events");
    }

    #[tokio::test]
    async fn injected_log_failure() {
        let warehouse = MockWarehouse::new();
        warehouse
            .fail_query_logs("locked", FetchError::PermissionDenied("denied".to_string()))
            .await;

        let result = warehouse.fetch_query_logs("locked").await;
        assert!(matches!(result, Err(FetchError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn datasets_come_from_registered_metadata() {
        let warehouse = MockWarehouse::new();
        warehouse
            .add_column(CatalogColumnEntry {
                project_id: "proj".to_string(),
                dataset_id: "ds_b".to_string(),
                table_id: "t".to_string(),
                column_name: "c".to_string(),
            })
            .await;
        warehouse
            .add_table(CatalogTableEntry {
                project_id: "proj".to_string(),
                dataset_id: "ds_a".to_string(),
                table_id: "t".to_string(),
                creation_date: date(2024, 1, 1),
                size_bytes: 0,
                object_type: None,
            })
            .await;

        assert_eq!(
            warehouse.list_datasets("proj").await.unwrap(),
            ["ds_a", "ds_b"]
        );
    }

    #[tokio::test]
    async fn connection_failure_simulation() {
        let warehouse = MockWarehouse::new().with_connection_failure();
        assert!(matches!(
            warehouse.test_connection().await,
            Err(FetchError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn writes_are_captured() {
        let warehouse = MockWarehouse::new();
        let destination = TableReference::new("proj", "data_defender", "total_logs");

        warehouse
            .replace_rows(&destination, &[], &[serde_json::json!({"a": 1})])
            .await
            .unwrap();

        let rows = warehouse.written_rows(&destination).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(warehouse.written_table_count().await, 1);

        // Full-replace: a second write drops the first rows
        warehouse.replace_rows(&destination, &[], &[]).await.unwrap();
        assert_eq!(warehouse.written_rows(&destination).await.unwrap().len(), 0);
    }
}
