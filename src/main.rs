//! depth-crawler main entry point
//!
//! This is the command-line interface for the depth-bounded web crawler.

use anyhow::Context;
use clap::Parser;
use depth_crawler::config::{load_config_with_hash, validate, Config};
use depth_crawler::crawler::crawl;
use depth_crawler::ConsoleReporter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// depth-crawler: a depth-bounded concurrent web crawler
///
/// Starting from a seed URL, every absolute link found on a fetched page is
/// followed once until the depth limit is reached. Each fetched page is
/// printed as it arrives.
#[derive(Parser, Debug)]
#[command(name = "depth-crawler")]
#[command(version)]
#[command(about = "A depth-bounded concurrent web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL to start from (overrides the config file)
    #[arg(long)]
    seed: Option<String>,

    /// Maximum link-depth (overrides the config file)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Number of concurrent crawl workers (overrides the config file)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print at most this many characters of each page body (0 prints everything)
    #[arg(long)]
    preview: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let reporter = Arc::new(ConsoleReporter::with_preview(config.output.body_preview));
    crawl(&config, reporter).await.context("crawl failed")?;

    Ok(())
}

/// Applies command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seed) = &cli.seed {
        config.crawler.seed = seed.clone();
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(preview) = cli.preview {
        config.output.body_preview = preview;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("depth_crawler=info,warn"),
            1 => EnvFilter::new("depth_crawler=debug,info"),
            2 => EnvFilter::new("depth_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_dry_run(config: &Config) {
    println!("=== depth-crawler Dry Run ===\n");
    println!("Seed: {}", config.crawler.seed);
    println!("Max depth: {}", config.crawler.max_depth);
    println!("Workers: {}", config.crawler.workers);
    println!("User agent: {}", config.user_agent.header_value());
    match config.http.timeout_secs {
        Some(secs) => println!("Request timeout: {}s", secs),
        None => println!("Request timeout: none"),
    }
    if config.output.body_preview > 0 {
        println!("Body preview: {} chars", config.output.body_preview);
    }
    println!("\n✓ Configuration is valid");
}
