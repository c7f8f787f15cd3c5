//! Douban Top250 main entry point
//!
//! This is the command-line interface for the Top250 catalog crawler.

use anyhow::Context;
use clap::Parser;
use douban_top250::config::{load_config_with_hash, validate, Config};
use douban_top250::crawler::spawn_pipeline;
use douban_top250::output::{format_summary, log_event, SinkMode};
use douban_top250::state::PAGE_COUNT;
use douban_top250::url::catalog_page_url;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Douban Top250: a throttled, resumable catalog crawler
///
/// Crawls the ten pages of the Top250 listing into a CSV file. An interrupted
/// run can be continued with --resume, which appends to the existing file.
#[derive(Parser, Debug)]
#[command(name = "douban-top250")]
#[command(version)]
#[command(about = "A throttled, resumable Top250 crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output CSV file
    #[arg(short, long, value_name = "PATH")]
    path: Option<String>,

    /// Seconds to pause between requests
    #[arg(short, long, value_name = "SECONDS")]
    sleep: Option<u64>,

    /// Page to start from; pages after 1 append to the existing file
    #[arg(short, long, value_name = "PAGE", value_parser = clap::value_parser!(u32).range(1..=10))]
    resume: Option<u32>,

    /// Skip detail pages and keep the catalog's truncated credits
    #[arg(short, long)]
    fast: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the pages that would be crawled without sending any request
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("douban_top250=info,warn"),
            1 => EnvFilter::new("douban_top250=debug,info"),
            2 => EnvFilter::new("douban_top250=trace,debug"),
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

/// Command-line values win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(path) = &cli.path {
        config.output.csv_path = path.clone();
    }
    if let Some(seconds) = cli.sleep {
        config.crawler.pause_millis = seconds.saturating_mul(1000);
    }
    if let Some(page) = cli.resume {
        config.crawler.resume_page = page;
    }
    if cli.fast {
        config.crawler.fast_mode = true;
    }
}

/// Handles the --dry-run mode: shows the resolved plan
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let base = Url::parse(&config.crawler.base_url)?;
    let start = config.crawler.resume_page;
    let mode = SinkMode::for_resume_page(start);

    println!("=== Douban Top250 Dry Run ===\n");

    println!("Output:");
    println!("  File: {}", config.output.csv_path);
    println!("  Mode: {}", mode.as_str());
    println!("  Header: {:?}", config.output.header);

    println!("\nCrawler:");
    println!("  Pause: {}ms", config.crawler.pause_millis);
    println!(
        "  Detail pages: {}",
        if config.crawler.fast_mode { "skipped" } else { "fetched" }
    );
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  User agent: {}", config.user_agent.value);

    println!("\nPages ({}):", PAGE_COUNT + 1 - start);
    for page in start..=PAGE_COUNT {
        println!("  {:>2}. {}", page, catalog_page_url(&base, page));
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
///
/// The first Ctrl-C stops the run after the current page; a second one exits
/// immediately.
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let mut handle = spawn_pipeline(config)?;
    let cancel = handle.cancellation_token();
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = handle.events.recv() => match event {
                Some(event) => log_event(&event),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                if interrupted {
                    eprintln!("Interrupted again, exiting now");
                    std::process::exit(130);
                }
                interrupted = true;
                tracing::warn!(
                    "Interrupt received, stopping after the current page (Ctrl-C again to quit now)"
                );
                cancel.cancel();
            }
        }
    }

    let result = tokio::task::spawn_blocking(move || handle.join()).await?;

    match result {
        Ok(summary) => {
            println!("\n{}", format_summary(&summary));
            Ok(())
        }
        Err(e) => {
            if let Some(hint) = e.resume_hint() {
                eprintln!("{}", hint);
            }
            Err(e.into())
        }
    }
}
