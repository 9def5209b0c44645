//! schema-inspector CLI - print database schema metadata as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use schema_inspector::{drivers, InspectConfig, InspectError, Inspector, SchemaInspector};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C, as shells report for SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "schema-inspector")]
#[command(about = "Inspect tables, columns and keys of a MySQL, PostgreSQL, CockroachDB, SQLite or SQL Server database")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "inspector.yaml")]
    config: PathBuf,

    /// Dialect to inspect with, overriding the connection's own
    #[arg(long)]
    dialect: Option<String>,

    /// Schema (or Oracle owner) to inspect instead of the default
    #[arg(long)]
    schema: Option<String>,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List table names
    Tables,

    /// Describe all tables, or one
    TableInfo {
        /// Table to describe
        table: Option<String>,
    },

    /// Check whether a table exists
    HasTable {
        /// Table to look up
        table: String,
    },

    /// List (table, column) pairs
    Columns {
        /// Restrict to this table
        table: Option<String>,
    },

    /// Describe columns in full
    ColumnInfo {
        /// Restrict to this table
        table: Option<String>,

        /// Describe only this column (requires TABLE)
        #[arg(requires = "table")]
        column: Option<String>,
    },

    /// Check whether a column exists
    HasColumn {
        /// Table to look up
        table: String,

        /// Column to look up
        column: String,
    },

    /// Print the primary key column of a table
    Primary {
        /// Table to look up
        table: String,
    },

    /// List foreign keys, of all tables or one
    ForeignKeys {
        /// Restrict to keys declared on this table
        table: Option<String>,
    },

    /// Every table with its primary key and columns
    Overview,

    /// Test the database connection
    HealthCheck,
}

#[derive(Serialize)]
struct HealthCheckResult {
    dialect: String,
    target: String,
    healthy: bool,
    tables: usize,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tokio::select! {
        result = run() => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e.format_detailed());
                ExitCode::from(e.exit_code())
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nReceived Ctrl-C. Aborting.");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run() -> Result<(), InspectError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let config = InspectConfig::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);
    let connection = &config.connection;

    if let Commands::HealthCheck = cli.command {
        return health_check(&cli, &config).await;
    }

    let conn = drivers::connect(connection).await?;
    let mut inspector = Inspector::resolve(conn.as_ref(), cli.dialect.as_deref())?;
    if let Some(schema) = cli.schema.as_deref().or(connection.schema.as_deref()) {
        inspector = inspector.with_schema(schema);
    }

    match &cli.command {
        Commands::Tables => print_json(&inspector.tables().await?, cli.pretty),
        Commands::TableInfo { table: Some(table) } => {
            print_json(&inspector.table_info_of(table).await?, cli.pretty)
        }
        Commands::TableInfo { table: None } => {
            print_json(&inspector.table_info().await?, cli.pretty)
        }
        Commands::HasTable { table } => print_json(&inspector.has_table(table).await?, cli.pretty),
        Commands::Columns { table } => {
            print_json(&inspector.columns(table.as_deref()).await?, cli.pretty)
        }
        Commands::ColumnInfo {
            table: Some(table),
            column: Some(column),
        } => print_json(&inspector.column_info_of(table, column).await?, cli.pretty),
        Commands::ColumnInfo { table, .. } => {
            print_json(&inspector.column_info(table.as_deref()).await?, cli.pretty)
        }
        Commands::HasColumn { table, column } => {
            print_json(&inspector.has_column(table, column).await?, cli.pretty)
        }
        Commands::Primary { table } => print_json(&inspector.primary(table).await?, cli.pretty),
        Commands::ForeignKeys { table } => {
            print_json(&inspector.foreign_keys(table.as_deref()).await?, cli.pretty)
        }
        Commands::Overview => print_json(&inspector.overview().await?, cli.pretty),
        Commands::HealthCheck => Ok(()), // Handled above
    }
}

/// Connect, list tables once and report how long it took.
async fn health_check(cli: &Cli, config: &InspectConfig) -> Result<(), InspectError> {
    let connection = &config.connection;
    let start = Instant::now();

    let outcome = async {
        let conn = drivers::connect(connection).await?;
        let inspector = Inspector::resolve(conn.as_ref(), cli.dialect.as_deref())?;
        let inspector = match cli.schema.as_deref().or(connection.schema.as_deref()) {
            Some(schema) => inspector.with_schema(schema),
            None => inspector,
        };
        inspector.tables().await
    }
    .await;

    let result = HealthCheckResult {
        dialect: connection.dialect.clone(),
        target: connection.display_target(),
        healthy: outcome.is_ok(),
        tables: outcome.as_ref().map(Vec::len).unwrap_or(0),
        latency_ms: start.elapsed().as_millis() as u64,
        error: outcome.as_ref().err().map(ToString::to_string),
    };
    print_json(&result, cli.pretty)?;

    outcome.map(|_| ())
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<(), InspectError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| InspectError::decode("output", e))?;
    println!("{}", json);
    Ok(())
}

/// Logs go to stderr so stdout carries nothing but the JSON result.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
