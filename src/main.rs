//! Ripple-Mirror main entry point
//!
//! This is the command-line interface for the Ripple-Mirror website mirror.

use anyhow::Context;
use clap::Parser;
use ripple_mirror::config::{load_config_with_hash, validate, Config, Overrides};
use ripple_mirror::crawler::crawl;
use ripple_mirror::output::print_summary;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Ripple-Mirror: a concurrent website mirror
///
/// Starting from a seed URL, Ripple-Mirror fetches every page below the seed's
/// path on the same host, up to a maximum link depth, and writes them under
/// `<output>/<host>/<path>`. Pages already present on disk are not fetched
/// again.
#[derive(Parser, Debug)]
#[command(name = "ripple-mirror")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent website mirror", long_about = None)]
struct Cli {
    /// URL to crawl, must start with http:// or https://
    #[arg(long)]
    url: String,

    /// Max depth of recursive URL crawl [default: 3]
    #[arg(long, alias = "max_depth")]
    max_depth: Option<u32>,

    /// Timeout for an individual crawl request in seconds, 0 disables it [default: 5]
    #[arg(long, alias = "req_timeout_sec")]
    req_timeout_sec: Option<u64>,

    /// Directory the mirror is written to [default: .]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum number of fetches in flight, 0 for no limit [default: 0]
    #[arg(long)]
    max_concurrent_fetches: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            max_depth: self.max_depth,
            request_timeout: self.req_timeout_sec,
            max_concurrent_fetches: self.max_concurrent_fetches,
            output_directory: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(&cli)?;

    let token = CancellationToken::new();
    catch_signals(token.clone());

    match crawl(&config, &token, &cli.url).await {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            println!("Failed to crawl: {}", e);
        }
    }

    println!("Finished.");
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_mirror=info,warn"),
            1 => EnvFilter::new("ripple_mirror=debug,info"),
            2 => EnvFilter::new("ripple_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if one was given and applies command-line overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    let base = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("can't load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let config = base.with_overrides(cli.overrides());
    validate(&config).context("invalid configuration")?;

    tracing::debug!(
        "Max depth {}, request timeout {}s, output {}",
        config.crawler.max_depth,
        config.crawler.request_timeout,
        config.output.directory.display()
    );

    Ok(config)
}

/// Cancels `token` on Ctrl-C or SIGTERM
fn catch_signals(token: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Received shutdown signal, cancelling crawl");
        token.cancel();
    });
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("Can't listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
