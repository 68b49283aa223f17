//! BigQuery warehouse client
//!
//! Reads the job history through the region-qualified
//! `INFORMATION_SCHEMA.JOBS` view, table metadata through `__TABLES__`, and
//! column metadata through `INFORMATION_SCHEMA.COLUMNS`. Result tables are
//! written back with full-replace semantics (delete, recreate, stream rows).
//!
//! Required IAM permissions:
//! - bigquery.jobs.create (to run metadata queries)
//! - bigquery.tables.get / bigquery.tables.getData
//! - bigquery.tables.create / bigquery.tables.delete (destination dataset)
//!
//! ## Authentication
//!
//! 1. Service account JSON file (explicit path)
//! 2. Application Default Credentials (ADC)

use crate::client::{FetchError, FieldSpec, TableReference, WarehouseClient};
use tablesweep_core::{CatalogColumnEntry, CatalogTableEntry, QueryLogRecord};

#[cfg(feature = "bigquery")]
use crate::client::FieldType;

#[cfg(feature = "bigquery")]
use chrono::NaiveDate;
#[cfg(feature = "bigquery")]
use tablesweep_core::ObjectType;
#[cfg(feature = "bigquery")]
use gcp_bigquery_client::{
    model::{
        query_request::QueryRequest, query_response::ResultSet, table::Table,
        table_data_insert_all_request::TableDataInsertAllRequest,
        table_field_schema::TableFieldSchema, table_schema::TableSchema,
    },
    project::GetOptions,
    Client as BigQueryClient,
};

/// Rows streamed per insert request
#[cfg(feature = "bigquery")]
const INSERT_BATCH_SIZE: usize = 500;

/// BigQuery warehouse client
pub struct BigQueryWarehouse {
    /// Billing/destination project
    project_id: String,

    /// Region qualifier for the job-history and schemata views (e.g. "region-us")
    region: String,

    /// BigQuery client (only available with the bigquery feature)
    #[cfg(feature = "bigquery")]
    client: BigQueryClient,

    /// Placeholder for when the feature is disabled
    #[cfg(not(feature = "bigquery"))]
    _phantom: std::marker::PhantomData<()>,
}

impl BigQueryWarehouse {
    /// Create a client using Application Default Credentials (ADC)
    ///
    /// ADC automatically detects credentials from:
    /// - GOOGLE_APPLICATION_CREDENTIALS environment variable
    /// - gcloud CLI default credentials
    /// - GCE/GKE metadata service
    #[cfg(feature = "bigquery")]
    pub async fn with_adc(
        project_id: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let client = BigQueryClient::from_application_default_credentials()
            .await
            .map_err(|e| {
                FetchError::AuthenticationError(format!(
                    "Failed to authenticate with ADC: {}. \
                     Ensure GOOGLE_APPLICATION_CREDENTIALS is set or run \
                     'gcloud auth application-default login'",
                    e
                ))
            })?;

        Ok(Self {
            project_id: project_id.into(),
            region: region.into(),
            client,
        })
    }

    /// Create a client without the bigquery feature (returns an error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn with_adc(
        project_id: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let _ = (project_id.into(), region.into());
        Err(FetchError::ConfigError(
            "BigQuery support not compiled. Rebuild with: cargo build --features bigquery"
                .to_string(),
        ))
    }

    /// Create a client using a service account key file
    #[cfg(feature = "bigquery")]
    pub async fn from_service_account_file(
        project_id: impl Into<String>,
        region: impl Into<String>,
        key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, FetchError> {
        let key_path_str = key_path.as_ref().to_string_lossy().to_string();

        let client = BigQueryClient::from_service_account_key_file(&key_path_str)
            .await
            .map_err(|e| {
                FetchError::AuthenticationError(format!(
                    "Failed to read service account key file '{}': {}",
                    key_path_str, e
                ))
            })?;

        Ok(Self {
            project_id: project_id.into(),
            region: region.into(),
            client,
        })
    }

    /// Create a client without the bigquery feature (returns an error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn from_service_account_file(
        project_id: impl Into<String>,
        region: impl Into<String>,
        _key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, FetchError> {
        let _ = (project_id.into(), region.into());
        Err(FetchError::ConfigError(
            "BigQuery support not compiled. Rebuild with: cargo build --features bigquery"
                .to_string(),
        ))
    }

    /// Map a client error onto the fetch taxonomy
    #[cfg(feature = "bigquery")]
    fn map_error(e: gcp_bigquery_client::error::BQError) -> FetchError {
        let err_str = e.to_string();
        if err_str.contains("Access Denied") || err_str.contains("Permission") {
            FetchError::PermissionDenied(err_str)
        } else {
            FetchError::QueryError(err_str)
        }
    }

    /// Run a query billed to the given project and return its rows
    #[cfg(feature = "bigquery")]
    async fn run_query(&self, billing_project: &str, sql: String) -> Result<ResultSet, FetchError> {
        let request = QueryRequest::new(sql);
        let response = self
            .client
            .job()
            .query(billing_project, request)
            .await
            .map_err(Self::map_error)?;

        Ok(ResultSet::new_from_query_response(response))
    }

    #[cfg(feature = "bigquery")]
    fn required_string(rs: &ResultSet, column: &str) -> Result<String, FetchError> {
        rs.get_string_by_name(column)
            .map_err(|e| FetchError::InvalidResponse(format!("Failed to get {}: {}", column, e)))?
            .ok_or_else(|| FetchError::InvalidResponse(format!("Null {} in response", column)))
    }

    #[cfg(feature = "bigquery")]
    fn parse_date(value: &str) -> Result<NaiveDate, FetchError> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|e| FetchError::InvalidResponse(format!("Bad date '{}': {}", value, e)))
    }
}

#[async_trait::async_trait]
impl WarehouseClient for BigQueryWarehouse {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    #[cfg(feature = "bigquery")]
    async fn list_projects(&self) -> Result<Vec<String>, FetchError> {
        let list = self
            .client
            .project()
            .list(GetOptions::default())
            .await
            .map_err(Self::map_error)?;

        let projects = list
            .projects
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.project_reference.map(|r| r.project_id))
            .collect();

        Ok(projects)
    }

    #[cfg(feature = "bigquery")]
    async fn list_datasets(&self, project_id: &str) -> Result<Vec<String>, FetchError> {
        let sql = format!(
            "SELECT schema_name FROM `{}`.`{}`.INFORMATION_SCHEMA.SCHEMATA",
            project_id, self.region
        );

        let mut rs = self.run_query(project_id, sql).await?;
        let mut datasets = Vec::new();
        while rs.next_row() {
            datasets.push(Self::required_string(&rs, "schema_name")?);
        }

        Ok(datasets)
    }

    #[cfg(feature = "bigquery")]
    async fn fetch_query_logs(
        &self,
        project_id: &str,
    ) -> Result<Vec<QueryLogRecord>, FetchError> {
        // One row per referenced table, already reduced to the most recent
        // reference per (project, dataset, table) within this project's logs.
        let sql = format!(
            r#"
            SELECT user_email, job_type, last_run_date, project_id, dataset_id, table_id, query
            FROM (
                SELECT user_email, job_type, last_run_date, project_id, dataset_id, table_id, query,
                       ROW_NUMBER() OVER (
                           PARTITION BY project_id, dataset_id, table_id
                           ORDER BY last_run_date DESC
                       ) AS last_call
                FROM (
                    SELECT user_email, job_type, DATE(start_time) AS last_run_date,
                           referenced_tables, query
                    FROM `{project}`.`{region}`.INFORMATION_SCHEMA.JOBS
                    WHERE query IS NOT NULL
                ), UNNEST(referenced_tables)
            )
            WHERE last_call = 1
            "#,
            project = project_id,
            region = self.region
        );

        let mut rs = self.run_query(project_id, sql).await?;
        let mut records = Vec::new();
        while rs.next_row() {
            let last_run_date = Self::required_string(&rs, "last_run_date")?;

            records.push(QueryLogRecord {
                user_email: rs
                    .get_string_by_name("user_email")
                    .map_err(|e| FetchError::InvalidResponse(e.to_string()))?
                    .unwrap_or_default(),
                job_type: rs
                    .get_string_by_name("job_type")
                    .map_err(|e| FetchError::InvalidResponse(e.to_string()))?
                    .unwrap_or_default(),
                last_run_date: Self::parse_date(&last_run_date)?,
                project_id: Self::required_string(&rs, "project_id")?,
                dataset_id: Self::required_string(&rs, "dataset_id")?,
                table_id: Self::required_string(&rs, "table_id")?,
                query: Self::required_string(&rs, "query")?,
            });
        }

        Ok(records)
    }

    #[cfg(feature = "bigquery")]
    async fn fetch_tables(
        &self,
        project_id: &str,
        dataset_id: &str,
    ) -> Result<Vec<CatalogTableEntry>, FetchError> {
        let sql = format!(
            "SELECT table_id, creation_time, size_bytes, type FROM `{}.{}.__TABLES__`",
            project_id, dataset_id
        );

        let mut rs = self.run_query(project_id, sql).await?;
        let mut entries = Vec::new();
        while rs.next_row() {
            let creation_millis = rs
                .get_i64_by_name("creation_time")
                .map_err(|e| FetchError::InvalidResponse(e.to_string()))?
                .ok_or_else(|| {
                    FetchError::InvalidResponse("Null creation_time in response".to_string())
                })?;

            let creation_date = chrono::DateTime::from_timestamp_millis(creation_millis)
                .ok_or_else(|| {
                    FetchError::InvalidResponse(format!(
                        "Bad creation_time {} in response",
                        creation_millis
                    ))
                })?
                .date_naive();

            let type_code = rs
                .get_i64_by_name("type")
                .map_err(|e| FetchError::InvalidResponse(e.to_string()))?
                .unwrap_or(0);

            entries.push(CatalogTableEntry {
                project_id: project_id.to_string(),
                dataset_id: dataset_id.to_string(),
                table_id: Self::required_string(&rs, "table_id")?,
                creation_date,
                size_bytes: rs
                    .get_i64_by_name("size_bytes")
                    .map_err(|e| FetchError::InvalidResponse(e.to_string()))?
                    .unwrap_or(0),
                object_type: ObjectType::from_code(type_code),
            });
        }

        Ok(entries)
    }

    #[cfg(feature = "bigquery")]
    async fn fetch_columns(
        &self,
        project_id: &str,
        dataset_id: &str,
    ) -> Result<Vec<CatalogColumnEntry>, FetchError> {
        let sql = format!(
            "SELECT table_name, column_name FROM `{}.{}`.INFORMATION_SCHEMA.COLUMNS",
            project_id, dataset_id
        );

        let mut rs = self.run_query(project_id, sql).await?;
        let mut entries = Vec::new();
        while rs.next_row() {
            entries.push(CatalogColumnEntry {
                project_id: project_id.to_string(),
                dataset_id: dataset_id.to_string(),
                table_id: Self::required_string(&rs, "table_name")?,
                column_name: Self::required_string(&rs, "column_name")?,
            });
        }

        Ok(entries)
    }

    #[cfg(feature = "bigquery")]
    async fn replace_rows(
        &self,
        destination: &TableReference,
        schema: &[FieldSpec],
        rows: &[serde_json::Value],
    ) -> Result<(), FetchError> {
        // Full replace: drop whatever a previous run left behind.
        let _ = self
            .client
            .table()
            .delete(
                &destination.project_id,
                &destination.dataset_id,
                &destination.table_id,
            )
            .await;

        let fields = schema
            .iter()
            .map(|f| match f.field_type {
                FieldType::String => TableFieldSchema::string(f.name),
                FieldType::Float => TableFieldSchema::float(f.name),
                FieldType::Date => TableFieldSchema::date(f.name),
            })
            .collect();

        self.client
            .table()
            .create(Table::new(
                &destination.project_id,
                &destination.dataset_id,
                &destination.table_id,
                TableSchema::new(fields),
            ))
            .await
            .map_err(Self::map_error)?;

        for batch in rows.chunks(INSERT_BATCH_SIZE) {
            let mut request = TableDataInsertAllRequest::new();
            for row in batch {
                request.add_row(None, row).map_err(|e| {
                    FetchError::InvalidResponse(format!("Unserializable row: {}", e))
                })?;
            }

            let response = self
                .client
                .tabledata()
                .insert_all(
                    &destination.project_id,
                    &destination.dataset_id,
                    &destination.table_id,
                    request,
                )
                .await
                .map_err(Self::map_error)?;

            if let Some(errors) = response.insert_errors {
                if !errors.is_empty() {
                    return Err(FetchError::InvalidResponse(format!(
                        "{} rows rejected writing {}",
                        errors.len(),
                        destination
                    )));
                }
            }
        }

        Ok(())
    }

    #[cfg(feature = "bigquery")]
    async fn test_connection(&self) -> Result<(), FetchError> {
        let request = QueryRequest::new("SELECT 1".to_string());

        self.client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| FetchError::QueryError(format!("Connection test failed: {}", e)))?;

        Ok(())
    }

    // Without the bigquery feature every operation reports the same
    // configuration error.

    #[cfg(not(feature = "bigquery"))]
    async fn list_projects(&self) -> Result<Vec<String>, FetchError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "bigquery"))]
    async fn list_datasets(&self, _project_id: &str) -> Result<Vec<String>, FetchError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "bigquery"))]
    async fn fetch_query_logs(
        &self,
        _project_id: &str,
    ) -> Result<Vec<QueryLogRecord>, FetchError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "bigquery"))]
    async fn fetch_tables(
        &self,
        _project_id: &str,
        _dataset_id: &str,
    ) -> Result<Vec<CatalogTableEntry>, FetchError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "bigquery"))]
    async fn fetch_columns(
        &self,
        _project_id: &str,
        _dataset_id: &str,
    ) -> Result<Vec<CatalogColumnEntry>, FetchError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "bigquery"))]
    async fn replace_rows(
        &self,
        _destination: &TableReference,
        _schema: &[FieldSpec],
        _rows: &[serde_json::Value],
    ) -> Result<(), FetchError> {
        Err(not_compiled())
    }

    #[cfg(not(feature = "bigquery"))]
    async fn test_connection(&self) -> Result<(), FetchError> {
        Err(not_compiled())
    }
}

#[cfg(not(feature = "bigquery"))]
fn not_compiled() -> FetchError {
    FetchError::ConfigError(
        "BigQuery support not compiled. Rebuild with: cargo build --features bigquery".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[cfg(not(feature = "bigquery"))]
    async fn constructors_error_without_feature() {
        let result = BigQueryWarehouse::with_adc("my-project", "region-us").await;
        assert!(matches!(result, Err(FetchError::ConfigError(_))));

        let result =
            BigQueryWarehouse::from_service_account_file("my-project", "region-us", "/tmp/k.json")
                .await;
        assert!(matches!(result, Err(FetchError::ConfigError(_))));
    }
}
