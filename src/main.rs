use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use user_event_join::app::{JoinUseCase, PipelineSummary};
use user_event_join::config::Config;
use user_event_join::infra::{CsvDatasetSink, CsvTableSource, TracingReporter};
use user_event_join::{logging, observability};

#[derive(Parser)]
#[command(name = "user_event_join")]
#[command(about = "Join a user registry with an event log by normalized email")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write all four datasets
    Run {
        #[command(flatten)]
        common: CommonArgs,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Only detect duplicate user emails
    Duplicates {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Config file (defaults to join.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Users table
    #[arg(long)]
    users: Option<PathBuf>,
    /// Events table
    #[arg(long)]
    events: Option<PathBuf>,
    /// Directory the datasets are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Field delimiter for input and output
    #[arg(long)]
    delimiter: Option<char>,
    /// Never treat users without an email as duplicates of each other
    #[arg(long)]
    exclude_null_duplicates: bool,
}

impl CommonArgs {
    /// File, then environment, then flags
    fn resolve(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;
        config.apply_env();
        if let Some(users) = &self.users {
            config.input.users = users.clone();
        }
        if let Some(events) = &self.events {
            config.input.events = events.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(delimiter) = self.delimiter {
            config.input.delimiter = delimiter;
        }
        if self.exclude_null_duplicates {
            config.duplicates.null_emails_are_duplicates = false;
        }
        Ok(config)
    }
}

fn build_use_case(config: &Config) -> Result<JoinUseCase> {
    let delimiter = config.delimiter()?;
    let source = CsvTableSource::new(&config.input.users, &config.input.events).with_delimiter(delimiter);
    let sink = CsvDatasetSink::new(&config.output.dir).with_delimiter(delimiter);
    Ok(JoinUseCase::new(Box::new(source), Box::new(sink), Arc::new(TracingReporter::new()))
        .with_policy(config.duplicates))
}

fn print_summary(summary: &PipelineSummary) {
    println!("\n📊 Pipeline Results (run {}):", summary.run_id);
    println!("   Users: {}", summary.stats.users);
    println!("   Events: {}", summary.stats.events);
    println!("   Duplicate user rows: {}", summary.stats.duplicate_rows);
    println!("   Matched events: {}", summary.stats.matched_rows);
    println!("   Unmatched events: {}", summary.stats.unmatched_rows);
    println!("   Users with events: {}", summary.stats.distinct_users);
    for dataset in &summary.datasets {
        println!("   {} -> {} ({} rows)", dataset.dataset, dataset.location, dataset.rows);
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let common = match &cli.command {
        Commands::Run { common, .. } | Commands::Duplicates { common } => common,
    };
    let config = common.resolve()?;

    // Initialize logging
    let _log_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    let metrics_handle = match &config.metrics.file {
        Some(_) => Some(observability::init()?),
        None => None,
    };

    let use_case = build_use_case(&config)?;

    match cli.command {
        Commands::Run { json, .. } => {
            let summary = use_case.execute().inspect_err(|e| error!("Pipeline run failed: {}", e))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
        Commands::Duplicates { .. } => {
            let report = use_case
                .execute_duplicates()
                .inspect_err(|e| error!("Duplicate detection failed: {}", e))?;
            println!("📄 {} duplicate user rows -> {}", report.rows, report.location);
        }
    }

    if let (Some(handle), Some(path)) = (&metrics_handle, &config.metrics.file) {
        observability::write_snapshot(handle, path)?;
    }
    Ok(())
}
