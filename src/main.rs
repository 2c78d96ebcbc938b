use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use bwtest::config::{BwtestConfig, LoggingConfig};
use bwtest::storage::SqliteStore;
use bwtest::throughput::report::format_summary;

#[derive(Parser)]
#[command(
    name = "bwtest",
    about = "Bidirectional iperf3 bandwidth tests between host pairs",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the results database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a forward and reverse bandwidth test and record the result
    Run {
        /// Local address iperf3 binds to
        #[arg(long)]
        client: String,

        /// Address of the iperf3 server
        #[arg(long)]
        server: String,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// List recorded test results, newest first
    History {
        /// Number of results to show
        #[arg(long, default_value = "20")]
        limit: usize,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BwtestConfig::resolve(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.storage.db_path = db;
    }

    init_tracing(&config.logging);

    match cli.command {
        Commands::Run {
            client,
            server,
            json,
        } => {
            tracing::info!(%client, %server, "Running bandwidth test");
            let result = bwtest::run_test(&config, &client, &server).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", format_summary(&result));
            }
        }
        Commands::History { limit, json } => {
            let store = SqliteStore::open(&config.storage.db_path)?;
            let results = store.recent(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No test results found.");
            } else {
                for r in &results {
                    println!("{}", format_summary(r));
                }
            }
        }
    }

    Ok(())
}
