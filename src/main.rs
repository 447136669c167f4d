//! Bucketscope server and CLI
//!
//! - `bucketscope serve` - run the API server
//! - `bucketscope record <bucket>` - record one sample now
//! - `bucketscope plot <bucket>` - query, render, and publish a chart
//! - `bucketscope config` - print a default config file
//!
//! # Configuration
//!
//! Environment variables override the config file:
//! - `BUCKETSCOPE_DB_PATH`: SQLite sample log path
//! - `BUCKETSCOPE_OBJECTS_ROOT`: root directory of the containers
//! - `BUCKETSCOPE_API_HOST` / `BUCKETSCOPE_API_PORT`: bind address
//! - `BUCKETSCOPE_BUCKET`: default container for plot requests
//! - `BUCKETSCOPE_WINDOW_SECONDS`: default plot window
//! - `RUST_LOG`: log filter (default: info)

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bucketscope::api::{serve, ApiConfig, AppState};
use bucketscope::artifact::ArtifactPublisher;
use bucketscope::config::{generate_default_config, Config};
use bucketscope::objects::{DirObjectStore, ObjectStore};
use bucketscope::query::WindowQuery;
use bucketscope::recorder::Recorder;
use bucketscope::storage::{SampleStore, SqliteSampleStore};

#[derive(Parser)]
#[command(name = "bucketscope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Object-store size tracking with windowed chart artifacts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file (default: standard locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve,

    /// Record one sample for a container now
    Record {
        /// Container to enumerate
        bucket: String,
        /// Event label stored with the sample
        #[arg(short, long, default_value = "manual")]
        event: String,
    },

    /// Query the trailing window, render the chart, and publish it
    Plot {
        /// Container to chart
        bucket: String,
        /// Window spec: seconds or Ns/Nm/Nh
        #[arg(short, long)]
        window: Option<String>,
        /// Also write the SVG to a local path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config);

    match cli.command {
        Commands::Serve => run_serve(&config).await,
        Commands::Record { bucket, event } => run_record(&config, &bucket, &event).await,
        Commands::Plot {
            bucket,
            window,
            out,
        } => run_plot(&config, &bucket, window.as_deref(), out).await,
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => std::fs::write(&path, content)
                    .with_context(|| format!("writing config to {}", path.display()))?,
                None => print!("{content}"),
            }
            Ok(())
        }
    }
}

/// Initialize the tracing subscriber from the logging section
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Construct the store handles shared by every subcommand
fn build_stores(config: &Config) -> anyhow::Result<(Arc<dyn SampleStore>, Arc<dyn ObjectStore>)> {
    let samples = SqliteSampleStore::open(&config.samples.db_path)
        .with_context(|| format!("opening sample log at {}", config.samples.db_path))?;
    let objects = DirObjectStore::new(&config.objects.root_dir)
        .with_context(|| format!("opening object root at {}", config.objects.root_dir))?;
    Ok((Arc::new(samples), Arc::new(objects)))
}

async fn run_serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Starting Bucketscope v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Sample log: {}", config.samples.db_path);
    tracing::info!("Object root: {}", config.objects.root_dir);

    let (samples, objects) = build_stores(config)?;

    let api_config = ApiConfig {
        host: config.api.host.clone(),
        port: config.api.port,
        default_bucket: config.api.default_bucket.clone(),
        default_window_seconds: config.api.default_window_seconds,
        ..Default::default()
    };

    let state = AppState::new(samples, objects, api_config.clone());
    serve(state, &api_config).await?;

    tracing::info!("Bucketscope stopped");
    Ok(())
}

async fn run_record(config: &Config, bucket: &str, event: &str) -> anyhow::Result<()> {
    let (samples, objects) = build_stores(config)?;
    let recorder = Recorder::new(objects, samples);

    let sample = recorder.record(bucket, event).await?;
    println!(
        "{}: {} bytes across {} objects at {}",
        sample.partition_key, sample.total_size, sample.object_count, sample.recorded_at
    );
    Ok(())
}

async fn run_plot(
    config: &Config,
    bucket: &str,
    window: Option<&str>,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (samples, objects) = build_stores(config)?;

    let window_seconds = match window {
        Some(spec) => bucketscope::query::parse_window(spec)
            .with_context(|| format!("cannot parse window: {spec}"))?,
        None => config.api.default_window_seconds,
    };

    let query = WindowQuery::new(samples);
    let result = query.query(bucket, window_seconds).await?;
    let image = bucketscope::chart::render(&result.points, result.historical_high);

    if let Some(path) = &out {
        std::fs::write(path, &image)
            .with_context(|| format!("writing chart to {}", path.display()))?;
    }

    let publisher = ArtifactPublisher::new(objects);
    publisher.publish(bucket, image).await?;

    println!(
        "{}: {} points in the last {}s, historical high {} bytes",
        bucket,
        result.points.len(),
        window_seconds,
        result.historical_high
    );
    Ok(())
}
