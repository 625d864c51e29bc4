//! site-posture main entry point
//!
//! This is the command-line interface for the site-posture crawler.

use anyhow::{bail, Context};
use clap::Parser;
use site_posture::config::{load_config_with_hash, validate, Config};
use site_posture::crawler::run_crawl;
use site_posture::output::{print_summary, JsonlSink};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// site-posture: a polite security-posture crawler
///
/// Crawls a capped number of pages per configured site, respecting
/// robots.txt and a per-site request interval, and writes a raw and an
/// analyzed JSON lines record for every page fetched.
#[derive(Parser, Debug)]
#[command(name = "site-posture")]
#[command(version)]
#[command(about = "A polite security-posture crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Only crawl the named site (repeatable)
    #[arg(long = "site", value_name = "NAME")]
    sites: Vec<String>,

    /// Override the output directory from the config file
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    apply_overrides(&mut config, &cli)?;
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_posture=info,warn"),
            1 => EnvFilter::new("site_posture=debug,info"),
            2 => EnvFilter::new("site_posture=trace,debug"),
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

/// Applies `--output-dir` and `--site` to the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.to_string_lossy().into_owned();
    }

    if !cli.sites.is_empty() {
        for name in &cli.sites {
            if !config.sites.iter().any(|site| &site.name == name) {
                bail!("No site named '{}' in {}", name, cli.config.display());
            }
        }
        config.sites.retain(|site| cli.sites.contains(&site.name));
    }

    Ok(())
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== site-posture Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Pages per site: {}", config.crawler.pages_per_site);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Max redirects: {}", config.crawler.max_redirects);
    if config.crawler.discover_endpoints {
        println!(
            "  Endpoint discovery: on (cap {}, {})",
            config.crawler.endpoint_cap,
            if config.crawler.same_host_endpoints_only {
                "same host only"
            } else {
                "any host"
            }
        );
    } else {
        println!("  Endpoint discovery: off");
    }
    println!(
        "  Concurrent sites: {}",
        config.crawler.max_concurrent_sites
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    let sink = JsonlSink::from_config(&config.output);
    println!("\nOutput:");
    println!("  Directory: {}", sink.root().display());
    if let Some(site) = config.sites.first() {
        println!("  Example: {}", sink.items_path("clean", &site.name).display());
    }

    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        println!("  - {} [{}] ({} seeds)", site.name, site.category, site.seeds.len());
        for seed in &site.seeds {
            println!("    * {}", seed);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} pages from {} seed URLs",
        config.crawler.pages_per_site as usize * config.sites.len(),
        config.sites.iter().map(|s| s.seeds.len()).sum::<usize>()
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let seed_count: usize = config.sites.iter().map(|s| s.seeds.len()).sum();
    tracing::info!(
        "Sites: {}, seed URLs: {}",
        config.sites.len(),
        seed_count
    );

    let sink = Arc::new(JsonlSink::from_config(&config.output));
    let summary = run_crawl(Arc::new(config), sink)
        .await
        .context("Crawl failed")?;

    print_summary(&summary);

    if summary.sink_failures() > 0 {
        tracing::error!(
            "{} site(s) could not be written; see the summary above",
            summary.sink_failures()
        );
    } else {
        tracing::info!("Crawl completed successfully");
    }

    Ok(())
}
