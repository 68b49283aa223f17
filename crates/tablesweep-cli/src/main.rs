use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tablesweep_catalog::{
    collect_column_entries, collect_query_logs, collect_table_entries, schemas, BigQueryWarehouse,
    FieldSpec, TableReference, WarehouseClient,
};
use tablesweep_core::{AuditSummary, Checks, Config};
use tablesweep_engine::{consolidate, extract_usage, unused_column_report, unused_table_report};

/// Tablesweep - audit warehouse tables and columns for staleness and cost
#[derive(Parser)]
#[command(name = "tablesweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: tablesweep.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project that owns the destination dataset
    #[arg(short, long)]
    project: Option<String>,

    /// Path to a service account key file (ADC is used when omitted)
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Which checks to run; repeat the flag to run several (default: both)
    #[arg(long = "check", value_enum)]
    checks: Vec<CheckKind>,

    /// Discount fraction in [0, 1) applied to the storage rate
    #[arg(long)]
    discount: Option<f64>,

    /// Destination dataset for the result tables
    #[arg(long)]
    dataset: Option<String>,

    /// Region qualifier for the job-history views (e.g. region-us)
    #[arg(long)]
    region: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CheckKind {
    Tables,
    Columns,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if cli.verbose {
        eprintln!(
            "{} project {}, destination dataset {}",
            "Auditing".cyan(),
            config.project_id,
            config.destination_dataset
        );
    }

    // Connection setup is the only fatal failure tier: without a working
    // connection no partial classification is meaningful.
    let client = connect(&config).await?;

    let as_of = Utc::now().date_naive();
    run_audit(&client, &config, as_of, cli.verbose).await
}

/// Merge the config file (when present) with command-line overrides
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("tablesweep.toml").exists() {
        Config::from_file(Path::new("tablesweep.toml"))?
    } else {
        Config::default()
    };

    if let Some(project) = &cli.project {
        config.project_id = project.clone();
    }
    if let Some(credentials) = &cli.credentials {
        config.credentials = Some(credentials.clone());
    }
    if let Some(discount) = cli.discount {
        config.discount = discount;
    }
    if let Some(dataset) = &cli.dataset {
        config.destination_dataset = dataset.clone();
    }
    if let Some(region) = &cli.region {
        config.region = region.clone();
    }
    if !cli.checks.is_empty() {
        config.checks = Checks {
            tables: cli.checks.contains(&CheckKind::Tables),
            columns: cli.checks.contains(&CheckKind::Columns),
        };
    }

    if config.project_id.is_empty() {
        return Err(anyhow!(
            "No project configured. Pass --project or set project_id in tablesweep.toml"
        ));
    }

    Ok(config)
}

/// Open the warehouse connection and verify it before any work begins
async fn connect(config: &Config) -> Result<BigQueryWarehouse> {
    let client = match &config.credentials {
        Some(key_path) => {
            BigQueryWarehouse::from_service_account_file(
                config.project_id.as_str(),
                config.region.as_str(),
                key_path,
            )
            .await
        }
        None => {
            BigQueryWarehouse::with_adc(config.project_id.as_str(), config.region.as_str()).await
        }
    }
    .map_err(|e| anyhow!("Could not set up credentials environment: {}", e))?;

    client
        .test_connection()
        .await
        .map_err(|e| anyhow!("Warehouse connection failed: {}", e))?;

    Ok(client)
}

/// Run the selected checks; the consolidated log always comes first and is
/// the only usage ground truth the checks see
async fn run_audit(
    client: &dyn WarehouseClient,
    config: &Config,
    as_of: NaiveDate,
    verbose: bool,
) -> Result<()> {
    let mut summary = AuditSummary::default();

    let collected = collect_query_logs(client)
        .await
        .map_err(|e| anyhow!("Could not enumerate projects: {}", e))?;
    summary.projects_scanned = collected.projects_scanned;
    summary.projects_skipped = collected.projects_skipped;

    let logs = consolidate(collected.rows);
    summary.log_rows = logs.len();

    write_report(
        client,
        config,
        schemas::TOTAL_LOGS_TABLE,
        schemas::TOTAL_LOGS_SCHEMA,
        &logs,
    )
    .await?;
    println!("Finished total logs");

    if config.checks.tables {
        println!(
            "{}",
            format!("Running unused tables check for {}", config.project_id).cyan()
        );

        let catalog = collect_table_entries(client)
            .await
            .map_err(|e| anyhow!("Could not enumerate projects: {}", e))?;
        summary.datasets_skipped += catalog.datasets_skipped;

        if verbose {
            eprintln!(
                "  {} {} tables across {} datasets",
                "Classifying".cyan(),
                catalog.entries.len(),
                catalog.datasets_scanned
            );
        }

        let rows = unused_table_report(&catalog.entries, &logs, as_of, config.discount);
        summary.unused_tables = rows.len();

        write_report(
            client,
            config,
            schemas::UNUSED_TABLES_TABLE,
            schemas::UNUSED_TABLES_SCHEMA,
            &rows,
        )
        .await?;
        println!("Finished unused tables");
    }

    if config.checks.columns {
        println!(
            "{}",
            format!("Running unused columns check for {}", config.project_id).cyan()
        );

        let usage = extract_usage(&logs);
        summary.usage_rows = usage.len();

        write_report(
            client,
            config,
            schemas::USED_COLUMNS_TABLE,
            schemas::USED_COLUMNS_SCHEMA,
            &usage,
        )
        .await?;
        println!("Finished used columns");

        let catalog = collect_column_entries(client)
            .await
            .map_err(|e| anyhow!("Could not enumerate projects: {}", e))?;
        summary.datasets_skipped += catalog.datasets_skipped;

        let rows = unused_column_report(&catalog.entries, &usage, as_of);
        summary.unused_columns = rows.len();

        write_report(
            client,
            config,
            schemas::UNUSED_COLUMNS_TABLE,
            schemas::UNUSED_COLUMNS_SCHEMA,
            &rows,
        )
        .await?;
        println!("Finished unused columns");
    }

    print_summary(&summary, config);

    Ok(())
}

/// Serialize rows and replace the destination table's contents
async fn write_report<T: serde::Serialize>(
    client: &dyn WarehouseClient,
    config: &Config,
    table: &str,
    schema: &[FieldSpec],
    rows: &[T],
) -> Result<()> {
    let destination = TableReference::new(
        config.project_id.as_str(),
        config.destination_dataset.as_str(),
        table,
    );

    let json_rows = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    client
        .replace_rows(&destination, schema, &json_rows)
        .await
        .map_err(|e| anyhow!("Failed writing {}: {}", destination, e))?;

    tracing::info!(destination = %destination, rows = json_rows.len(), "replaced result table");
    Ok(())
}

/// Print the end-of-run summary
fn print_summary(summary: &AuditSummary, config: &Config) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Warehouse Usage Audit".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!(
        "Projects scanned: {} ({} skipped)",
        summary.projects_scanned, summary.projects_skipped
    );
    if summary.datasets_skipped > 0 {
        println!(
            "Datasets skipped: {}",
            summary.datasets_skipped.to_string().yellow()
        );
    }
    println!("Consolidated log rows: {}", summary.log_rows);

    if config.checks.tables {
        let count = summary.unused_tables.to_string();
        let count = if summary.unused_tables > 0 {
            count.yellow().bold()
        } else {
            count.green()
        };
        println!("Unused tables flagged: {}", count);
    }

    if config.checks.columns {
        println!("Column usage records: {}", summary.usage_rows);
        let count = summary.unused_columns.to_string();
        let count = if summary.unused_columns > 0 {
            count.yellow().bold()
        } else {
            count.green()
        };
        println!("Unused columns flagged: {}", count);
    }

    println!();
    println!(
        "Results written to {}.{}",
        config.project_id, config.destination_dataset
    );
    println!("{}", "=".repeat(60).bright_blue());
}
