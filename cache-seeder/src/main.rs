use anyhow::Context;
use cache_seeder::utils::{keys, time};
use cache_seeder::{CacheSeeder, Environment, ResultSet, ResultStore, SeedConfig};
use chrono::Local;
use clap::Parser;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

/// Warms the query cache of an ARAGORN deployment, one disease at a time.
#[derive(Debug, Parser)]
#[command(name = "cache-seeder", version)]
struct Cli {
    /// Environment to fill the cache on
    #[arg(value_enum)]
    env: Environment,

    /// Use an existing results file to resume cache filling
    #[arg(long)]
    results_path: Option<PathBuf>,

    /// JSON files holding arrays of identifiers, processed in order
    #[arg(long = "keys", default_values = ["mondo_curies.json", "hpo_curies.json"])]
    key_files: Vec<PathBuf>,

    /// Where log and result files go (defaults to the environment name)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Query this endpoint instead of the environment's own
    #[arg(long)]
    url: Option<Url>,

    #[arg(long, default_value_t = 3600)]
    timeout_seconds: u64,

    #[arg(long, default_value_t = 300)]
    kp_timeout: u64,

    /// Extra seconds the client waits beyond --timeout-seconds
    #[arg(long, default_value_t = 300)]
    client_margin_seconds: u64,

    /// Save each successful response body into this directory
    #[arg(long)]
    save_responses: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stamp = time::run_stamp(&Local::now());

    let config = SeedConfig {
        timeout_seconds: cli.timeout_seconds,
        kp_timeout: cli.kp_timeout,
        client_margin: Duration::from_secs(cli.client_margin_seconds),
        response_dir: cli.save_responses.clone(),
        ..SeedConfig::default()
    };
    config.validate().context("invalid configuration")?;

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(cli.env.name()));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let log_path = time::log_file_path(&output_dir, &stamp);
    let log_file = File::create(&log_path)
        .with_context(|| format!("creating log file {}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .init();
    eprintln!("Logging to {}", log_path.display());

    let endpoint = match cli.url.clone() {
        Some(url) => url,
        None => cli.env.endpoint()?,
    };
    info!("Starting cache seeding on {} ({})", cli.env, endpoint);

    let input_keys = keys::load_keys(&cli.key_files).context("loading input keys")?;

    let prior = match &cli.results_path {
        Some(path) => ResultStore::load(path).context("loading prior results")?,
        None => ResultSet::new(),
    };

    let results_path = time::results_file_path(&output_dir, &stamp);
    let seeder = CacheSeeder::open(config, &results_path, &prior).context("preparing seeder")?;

    let report = seeder.run(&endpoint, &input_keys, prior).await.map_err(|e| {
        error!("Seeding stopped: {}", e);
        e
    })?;

    info!("Finished: {}", report.summary);
    println!("{}", report.summary);
    println!("Results written to {}", seeder.store().path().display());
    Ok(())
}
