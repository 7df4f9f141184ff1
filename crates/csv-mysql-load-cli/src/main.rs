//! csv-mysql-load CLI - transactional CSV to MySQL batch loader.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use csv_mysql_load::{
    health_check, Config, Connector, LoadError, LoadResult, MysqlConnector, NoOpConnector,
    Orchestrator,
};
use tracing::instrument::WithSubscriber;
use tracing::{info, Dispatch, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

#[derive(Parser)]
#[command(name = "csv-mysql-load")]
#[command(about = "Transactional CSV to MySQL batch loader")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Also append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every table in the manifest
    Run {
        /// Override the folder CSV files are read from
        #[arg(long)]
        csv_folder: Option<String>,

        /// Override rows per flush-and-commit
        #[arg(long)]
        batch_size: Option<usize>,

        /// Load only these tables (manifest order is kept)
        #[arg(long, value_delimiter = ',')]
        tables: Vec<String>,

        /// Dry run: read and coerce every file without writing to the database
        #[arg(long)]
        dry_run: bool,
    },

    /// Test the database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let dispatch = match build_dispatch(&cli.verbosity, &cli.log_format, cli.log_file.as_deref()) {
        Ok(dispatch) => dispatch,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            return ExitCode::from(e.exit_code());
        }
    };

    match run(cli).with_subscriber(dispatch).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), LoadError> {
    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run {
            csv_folder,
            batch_size,
            tables,
            dry_run,
        } => {
            // Apply overrides
            if let Some(folder) = csv_folder {
                config.load.csv_folder = folder;
            }
            if let Some(size) = batch_size {
                config.load.batch_size = size;
            }
            if !tables.is_empty() {
                let unknown = config.retain_tables(&tables);
                if !unknown.is_empty() {
                    return Err(LoadError::Config(format!(
                        "Tables not in manifest: {}",
                        unknown.join(", ")
                    )));
                }
            }
            config.validate()?;

            let result = if dry_run {
                load(NoOpConnector::new(), &config).await?
            } else {
                info!("Target: {}", config.target.display_url());
                load(MysqlConnector::new(config.target.clone()), &config).await?
            };

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                print_summary(&result, dry_run);
            }
        }

        Commands::HealthCheck => {
            info!("Checking {}", config.target.display_url());
            let result = health_check(&MysqlConnector::new(config.target.clone())).await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Target (MySQL): {} ({}ms)",
                    if result.connected { "OK" } else { "FAILED" },
                    result.latency_ms
                );
                if let Some(ref err) = result.error {
                    println!("    Error: {}", err);
                }
            }

            if !result.healthy {
                return Err(LoadError::connection(
                    result.error.unwrap_or_default(),
                    "health check",
                ));
            }
        }
    }

    Ok(())
}

async fn load<K: Connector>(connector: K, config: &Config) -> Result<LoadResult, LoadError> {
    let mut orchestrator = Orchestrator::from_config(connector, config);
    orchestrator.run(&config.tables).await
}

fn print_summary(result: &LoadResult, dry_run: bool) {
    let status_msg = if dry_run { "Dry run completed!" } else { "Load completed!" };
    println!("\n{}", status_msg);
    println!("  Run ID: {}", result.run_id);
    println!("  Duration: {:.2}s", result.duration_seconds);
    println!("  Tables: {}", result.tables_total);
    println!("  Rows: {}", result.rows_loaded);
    println!("  Throughput: {} rows/sec", result.rows_per_second);
    for table in &result.tables {
        println!(
            "    {}: {} rows in {} batches ({:.2}s)",
            table.table, table.rows, table.batches, table.duration_seconds
        );
    }
}

/// Build the process logger. It is attached to the run future rather than
/// installed as the global default.
fn build_dispatch(
    verbosity: &str,
    format: &str,
    log_file: Option<&Path>,
) -> Result<Dispatch, LoadError> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file)))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_ansi(log_file.is_none())
        .with_writer(writer);

    let dispatch = if format == "json" {
        Dispatch::new(subscriber.json().finish())
    } else {
        Dispatch::new(subscriber.finish())
    };

    Ok(dispatch)
}
