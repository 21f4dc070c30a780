//! Vacancy-Harvest main entry point
//!
//! This is the command-line interface for the job-board crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vacancy_harvest::config::{apply_overrides, load_config_with_hash, Config, Overrides};
use vacancy_harvest::crawler::harvest;
use vacancy_harvest::places::{resolve_targets, PlaceDirectory};

/// Vacancy-Harvest: collects job advertisements into a CSV file
///
/// TARGET is a site URL, a city name from the places file, a file with
/// one URL per line, or `all` for every known city.
#[derive(Parser, Debug)]
#[command(name = "vacancy-harvest")]
#[command(version)]
#[command(about = "Collects job advertisements into a CSV file", long_about = None)]
#[command(after_help = "Example: vacancy-harvest Пермь out_perm.csv")]
struct Cli {
    /// Site URL, city name, file of URLs, or `all`
    #[arg(value_name = "TARGET")]
    target: String,

    /// Output CSV file [default: parser_result.csv]
    #[arg(value_name = "OUTPUT")]
    output_path: Option<String>,

    /// Number of simultaneous advertisement downloads
    #[arg(long, allow_negative_numbers = true)]
    n_parallel: Option<i64>,

    /// Text encoding of the output file
    #[arg(long)]
    output_encoding: Option<String>,

    /// JSON file mapping city names to site URLs
    #[arg(long, value_name = "PATH")]
    places: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(&cli)?;

    tracing::info!("target = {}", cli.target);
    tracing::info!("output_path = {}", config.output.path);
    tracing::info!("output_encoding = {}", config.output.encoding);
    tracing::info!("n_parallel = {}", config.crawler.max_concurrent_downloads);

    let places = PlaceDirectory::load(Path::new(&config.places_path))
        .with_context(|| format!("Failed to load places from {}", config.places_path))?;

    let targets = resolve_targets(&cli.target, &places)?;
    tracing::info!("Harvesting {} site(s)", targets.len());

    let summaries = match harvest(&config, places, &targets).await {
        Ok(summaries) => summaries,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    let records: u64 = summaries.iter().map(|s| s.records).sum();
    tracing::info!(
        "Harvest completed: {} of {} site(s), {} records written to {}",
        summaries.len(),
        targets.len(),
        records,
        config.output.path
    );

    Ok(())
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    let base = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let overrides = Overrides {
        max_concurrent_downloads: cli.n_parallel,
        output_path: cli.output_path.clone(),
        output_encoding: cli.output_encoding.clone(),
        places_path: cli.places.clone(),
    };

    Ok(apply_overrides(base, overrides)?)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vacancy_harvest=info,warn"),
            1 => EnvFilter::new("vacancy_harvest=debug,info"),
            2 => EnvFilter::new("vacancy_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
