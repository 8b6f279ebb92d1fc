//! Newswatch main entry point
//!
//! Command-line interface for the newswatch front-page crawler.

use clap::Parser;
use newswatch::config::{load_config_with_hash, validate, Config, MIN_CRAWL_INTERVAL};
use newswatch::crawler::Crawler;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Newswatch: archive a news site's front page
///
/// Newswatch polls the configured site's front page, extracts the external
/// links from each story's discussion thread, and stores stories and links
/// in SQLite.
#[derive(Parser, Debug)]
#[command(name = "newswatch")]
#[command(version)]
#[command(about = "Crawl a news front page and archive stories and comment links", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Run a single crawl cycle and exit
    #[arg(long)]
    once: bool,

    /// Crawl interval in seconds (minimum 5)
    #[arg(long, value_name = "SECONDS")]
    interval: Option<u64>,

    /// Show the N most recent stored items and exit
    #[arg(long, value_name = "N", conflicts_with_all = ["once", "interval"])]
    show: Option<u32>,

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

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(interval) = cli.interval {
        if interval < MIN_CRAWL_INTERVAL {
            anyhow::bail!("Interval must be >= {} seconds", MIN_CRAWL_INTERVAL);
        }
        config.crawler.interval = interval;
    }
    validate(&config)?;

    let mut crawler = Crawler::new(config)?;

    if let Some(limit) = cli.show {
        crawler.show_recent(limit)?;
    } else {
        crawler.run(cli.once).await?;
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("newswatch=info,warn"),
            1 => EnvFilter::new("newswatch=debug,info"),
            2 => EnvFilter::new("newswatch=trace,debug"),
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
