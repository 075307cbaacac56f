//! Runnel main entry point
//!
//! This is the command-line interface for the Runnel web crawler.

use anyhow::Context;
use clap::Parser;
use runnel::config::{load_config, validate, Config};
use runnel::output::{print_report, print_statistics, CrawlStatistics};
use runnel::{HttpFetcher, WebCrawler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runnel: a concurrent, depth-bounded web crawler
///
/// Fetches URL, follows links up to DEPTH levels and reports the pages that
/// were fetched and the ones that failed. Positional values override the ones
/// from the configuration file.
#[derive(Parser, Debug)]
#[command(name = "runnel")]
#[command(version)]
#[command(about = "A concurrent, depth-bounded web crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum crawl depth (1 fetches only URL)
    #[arg(value_name = "DEPTH")]
    depth: Option<u32>,

    /// Number of fetch workers
    #[arg(value_name = "DOWNLOADERS")]
    downloaders: Option<usize>,

    /// Number of link extraction workers
    #[arg(value_name = "EXTRACTORS")]
    extractors: Option<usize>,

    /// Maximum concurrent fetches per host
    #[arg(value_name = "PER_HOST")]
    per_host: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Loads the configuration file (if any) and applies positional overrides
    fn effective_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                load_config(path)
                    .with_context(|| format!("failed to load {}", path.display()))?
            }
            None => Config::default(),
        };

        if let Some(depth) = self.depth {
            config.crawler.max_depth = depth;
        }
        if let Some(downloaders) = self.downloaders {
            config.crawler.downloaders = downloaders;
        }
        if let Some(extractors) = self.extractors {
            config.crawler.extractors = extractors;
        }
        if let Some(per_host) = self.per_host {
            config.crawler.per_host = per_host;
        }

        validate(&config).context("invalid crawler settings")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = cli.effective_config()?;

    if cli.dry_run {
        handle_dry_run(&cli.url, &config);
        return Ok(());
    }

    handle_crawl(&cli.url, &config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("runnel=info,warn"),
            1 => EnvFilter::new("runnel=debug,info"),
            2 => EnvFilter::new("runnel=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(url: &str, config: &Config) {
    println!("=== Runnel Dry Run ===\n");

    println!("Root URL: {}", url);

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Downloaders: {}", config.crawler.downloaders);
    println!("  Extractors: {}", config.crawler.extractors);
    println!("  Per host: {}", config.crawler.per_host);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nHTTP:");
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);

    match runnel::host_of(url) {
        Ok(host) => println!("\n✓ Would start crawling host {}", host),
        Err(e) => println!("\n✗ Root URL is invalid: {}", e),
    }
}

/// Handles the main crawl operation
async fn handle_crawl(url: &str, config: &Config, quiet: bool) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.user_agent, &config.http)
        .context("failed to build HTTP client")?;
    let crawler = WebCrawler::from_config(fetcher, &config.crawler)?;

    let outcome = crawler.crawl(url, config.crawler.max_depth).await;
    crawler.close().await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !quiet {
        print_report(&result);
        print_statistics(&CrawlStatistics::from_result(&result));
    }

    Ok(())
}
