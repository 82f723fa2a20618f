use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use footprint_core::config::{DEFAULT_GEO_ENDPOINT, DEFAULT_IP_ECHO_ENDPOINT, DEFAULT_STORAGE_KEY, FORMAT_VERSION};
use footprint_core::{
    ExposureTracker, HostFacts, IpApiClient, SnapshotStore, Startup, StaticFactSource,
    TrackerConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod dashboard;
mod report;
#[cfg(test)]
mod report_tests;

#[derive(Debug, Parser)]
#[command(name = "footprint")]
#[command(about = "Shows what your network and machine expose about you")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long)]
    storage_dir: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_GEO_ENDPOINT)]
    geo_endpoint: String,

    #[arg(long, default_value = DEFAULT_IP_ECHO_ENDPOINT)]
    ip_echo_endpoint: String,

    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Identification string to parse, e.g. a browser's user agent.
    #[arg(long)]
    user_agent: Option<String>,

    /// JSON file with captured environment facts to replay instead of
    /// probing this machine.
    #[arg(long)]
    facts_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    Show {
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    Refresh {
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    Clear {
        #[arg(long)]
        refresh: bool,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    Ip,
    Stored,
    View,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = TrackerConfig {
        geo_endpoint: cli.geo_endpoint.clone(),
        ip_echo_endpoint: cli.ip_echo_endpoint.clone(),
        request_timeout: cli.timeout_ms.map(Duration::from_millis),
        storage_dir: cli
            .storage_dir
            .clone()
            .unwrap_or_else(TrackerConfig::default_storage_dir),
        storage_key: DEFAULT_STORAGE_KEY.to_string(),
        format_version: FORMAT_VERSION.to_string(),
        user_agent: cli.user_agent.clone(),
    };

    match cli.command {
        Command::Show { format } => {
            let tracker = build_tracker(&config, cli.facts_file.as_ref())?;
            if let Startup::Warm(background) = tracker.initialize().await {
                if matches!(format, OutputFormat::Human) {
                    report::print_view(&tracker.view(), format)?;
                    println!();
                }
                info!("revalidating stored snapshot");
                background.await.context("background refresh task")?;
            }
            finish(&tracker, format)?;
        }
        Command::Refresh { format } => {
            let tracker = build_tracker(&config, cli.facts_file.as_ref())?;
            tracker.refresh().await;
            finish(&tracker, format)?;
        }
        Command::Clear { refresh, format } => {
            let tracker = build_tracker(&config, cli.facts_file.as_ref())?;
            tracker.clear_data(refresh).await;
            finish(&tracker, format)?;
        }
        Command::Ip => {
            let client = IpApiClient::from_config(&config);
            match client.fetch_ip_only().await {
                Some(ip) => println!("{ip}"),
                None => bail!("could not determine public ip"),
            }
        }
        Command::Stored => {
            let store = SnapshotStore::from_config(&config);
            let stored = store.has_stored();
            let snapshot = store.load();
            if stored && snapshot.is_none() {
                warn!("stored entry was unreadable or from another version and has been discarded");
            }
            let out = serde_json::json!({
                "storageDir": config.storage_dir.display().to_string(),
                "key": store.key(),
                "version": store.version(),
                "stored": snapshot.is_some(),
                "timestamp": snapshot.as_ref().map(|s| s.timestamp),
                "capturedAt": snapshot.as_ref().and_then(|s| s.captured_at()).map(|ts| ts.to_rfc3339()),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::View => {
            let tracker = build_tracker(&config, cli.facts_file.as_ref())?;
            dashboard::run_dashboard(&tracker).await?;
        }
    }

    Ok(())
}

fn build_tracker(config: &TrackerConfig, facts_file: Option<&PathBuf>) -> Result<ExposureTracker> {
    let Some(path) = facts_file else {
        return Ok(ExposureTracker::from_config(config));
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read facts file {}", path.display()))?;
    let mut facts: HostFacts = serde_json::from_str(&raw)
        .with_context(|| format!("invalid facts file {}", path.display()))?;
    if config.user_agent.is_some() {
        facts.user_agent = config.user_agent.clone();
    }

    Ok(ExposureTracker::new(
        Arc::new(StaticFactSource::new(facts)),
        Arc::new(IpApiClient::from_config(config)),
        SnapshotStore::from_config(config),
    ))
}

fn finish(tracker: &ExposureTracker, format: OutputFormat) -> Result<()> {
    let view = tracker.view();
    report::print_view(&view, format)?;
    if view.has_error() {
        bail!(
            "collection failed: {}",
            view.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
