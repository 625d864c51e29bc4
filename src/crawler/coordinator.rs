//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the per-site crawl loop and the run driver:
//! - Loading robots.txt once per site and honoring it for every URL
//! - Spacing requests by the site's politeness interval
//! - Fetching, analyzing, and discovering links and endpoints
//! - Running sites concurrently (bounded) and handing batches to the sink

use crate::analyzer::{analyze, SecuritySignals};
use crate::config::{validate_output, Config, CrawlTarget, CrawlerConfig};
use crate::crawler::discover::{discover_endpoints, discover_links};
use crate::crawler::fetcher::{build_http_client, fetch};
use crate::crawler::frontier::Frontier;
use crate::crawler::FetchRecord;
use crate::output::{CleanRow, RawRow, RecordSink, RunSummary, SiteReport};
use crate::robots;
use crate::state::{Politeness, UrlState};
use crate::url::{parse_http_url, same_host};
use crate::PostureError;
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;
use url::Url;

/// Everything a finished site crawl produced
#[derive(Debug, Default)]
pub struct SiteCrawl {
    pub report: SiteReport,
    pub raw: Vec<RawRow>,
    pub clean: Vec<CleanRow>,
}

/// Crawls one site
///
/// Strictly sequential: one request in flight, each request (robots.txt
/// included) preceded by the politeness wait. The loop ends when the queue is
/// exhausted or `pages-per-site` pages have been fetched. Per-URL failures
/// are recorded and never abort the site.
pub struct SiteCrawler<'a> {
    client: &'a Client,
    config: &'a Config,
    target: &'a CrawlTarget,
}

impl<'a> SiteCrawler<'a> {
    pub fn new(client: &'a Client, config: &'a Config, target: &'a CrawlTarget) -> Self {
        Self {
            client,
            config,
            target,
        }
    }

    pub async fn run(&self) -> SiteCrawl {
        let span = tracing::info_span!("site", name = %self.target.name);
        self.crawl().instrument(span).await
    }

    async fn crawl(&self) -> SiteCrawl {
        let crawler = &self.config.crawler;
        let agent = self.config.user_agent.crawler_name.as_str();
        let mut result = SiteCrawl {
            report: SiteReport::new(self.target),
            ..SiteCrawl::default()
        };

        let seeds: Vec<Url> = self
            .target
            .seeds
            .iter()
            .filter_map(|seed| match parse_http_url(seed) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Skipping seed {}: {}", seed, e);
                    None
                }
            })
            .collect();

        let Some(site_root) = seeds.first().cloned() else {
            tracing::warn!("No usable seeds, nothing to crawl");
            return result;
        };

        let mut politeness = Politeness::new(Duration::from_millis(crawler.politeness_delay_ms));
        politeness.wait().await;
        let policy = robots::load_policy(self.client, &site_root, crawler.max_redirects).await;
        if policy.is_permissive() {
            tracing::debug!("No robots.txt rules apply; all paths allowed");
        }
        politeness.apply_crawl_delay(policy.crawl_delay(agent));
        if politeness.delay() > Duration::from_millis(crawler.politeness_delay_ms) {
            tracing::info!("Using robots.txt crawl delay of {:?}", politeness.delay());
        }

        let cap = crawler.pages_per_site as usize;
        let mut frontier = Frontier::new(seeds);
        let mut fetched = 0usize;
        let started = Instant::now();

        tracing::info!("Starting crawl from {} (cap {} pages)", site_root, cap);

        while fetched < cap {
            let Some(url) = frontier.next_unvisited() else {
                break;
            };

            if !robots::can_fetch(&policy, agent, &url) {
                tracing::info!("Blocked by robots.txt: {}", url);
                frontier.record(&url, UrlState::Blocked);
                continue;
            }

            politeness.wait().await;
            tracing::debug!("Fetching {}", url);

            let record = match fetch(self.client, &url, crawler.max_redirects).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Fetch failed for {}: {}", url, e);
                    frontier.record(&url, UrlState::Failed);
                    continue;
                }
            };
            frontier.record(&url, UrlState::Fetched);
            fetched += 1;

            let (signals, discovered) = process_page(&record, &site_root, crawler);
            tracing::debug!(
                "{} -> HTTP {}, {} flags, {} URLs discovered",
                url,
                record.http_status,
                signals.risk_flags.len(),
                discovered.len()
            );

            result.report.record_signals(&signals);
            frontier.extend(discovered);

            let raw = RawRow::new(self.target, &record);
            result.clean.push(CleanRow::new(raw.clone(), signals));
            result.raw.push(raw);
        }

        result.report.fetched = frontier.count(UrlState::Fetched);
        result.report.blocked = frontier.count(UrlState::Blocked);
        result.report.failed = frontier.count(UrlState::Failed);
        result.report.duplicates_skipped = frontier.duplicates_skipped();

        tracing::info!(
            "Finished: {} fetched, {} blocked, {} failed, {} still queued, {} requests in {:?}",
            result.report.fetched,
            result.report.blocked,
            result.report.failed,
            frontier.pending(),
            politeness.request_count(),
            started.elapsed()
        );

        result
    }
}

/// Analyzes a fetched page and collects the URLs it leads to
///
/// Links and endpoints resolve against the final URL; every discovered URL
/// is then kept only when it shares the site root's host.
fn process_page(
    record: &FetchRecord,
    site_root: &Url,
    crawler: &CrawlerConfig,
) -> (SecuritySignals, Vec<Url>) {
    let signals = analyze(record);

    let base = match Url::parse(&record.final_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::debug!("Unparsable final URL {}: {}", record.final_url, e);
            return (signals, Vec::new());
        }
    };

    let document = Html::parse_document(&record.body);
    let mut discovered = discover_links(&document, &base);
    if crawler.discover_endpoints {
        discovered.extend(discover_endpoints(
            &record.body,
            &base,
            crawler.same_host_endpoints_only,
            crawler.endpoint_cap,
        ));
    }
    discovered.retain(|url| same_host(site_root, url));

    (signals, discovered)
}

/// Crawls one site with its own span and writes its batch
pub async fn crawl_site(
    client: &Client,
    config: &Config,
    target: &CrawlTarget,
    sink: &dyn RecordSink,
) -> SiteReport {
    let SiteCrawl {
        mut report,
        raw,
        clean,
    } = SiteCrawler::new(client, config, target).run().await;

    match sink.write_site(&target.name, &raw, &clean) {
        Ok(receipt) => {
            report.rows_written = receipt.rows;
            tracing::info!(
                "Wrote {} rows for {} to {}",
                receipt.rows,
                target.name,
                receipt.clean_path.display()
            );
        }
        Err(e) => {
            tracing::error!("Failed to write records for {}: {}", target.name, e);
            report.sink_error = Some(e.to_string());
        }
    }

    report
}

/// Runs the crawl for every configured site
///
/// The sink target is checked before any request is made; without one the
/// run is refused with [`crate::ConfigError::MissingOutput`]. At most
/// `max-concurrent-sites` sites are crawled at once. Reports come back in
/// configuration order.
///
/// # Example
///
/// ```no_run
/// use site_posture::config::load_config;
/// use site_posture::crawler::run_crawl;
/// use site_posture::output::JsonlSink;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("posture.toml"))?;
/// let sink = Arc::new(JsonlSink::from_config(&config.output));
/// let summary = run_crawl(Arc::new(config), sink).await?;
/// println!("{} pages fetched", summary.total_fetched());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Arc<Config>,
    sink: Arc<dyn RecordSink>,
) -> Result<RunSummary, PostureError> {
    validate_output(&config.output)?;

    let client = build_http_client(&config.user_agent, &config.crawler)?;
    let started = Instant::now();
    let limit = Arc::new(Semaphore::new(config.crawler.max_concurrent_sites as usize));
    let mut tasks = JoinSet::new();

    tracing::info!(
        "Crawling {} site(s), up to {} at a time",
        config.sites.len(),
        config.crawler.max_concurrent_sites
    );

    for (index, target) in config.sites.iter().cloned().enumerate() {
        let client = client.clone();
        let config = Arc::clone(&config);
        let sink = Arc::clone(&sink);
        let limit = Arc::clone(&limit);

        tasks.spawn(async move {
            let _permit = limit.acquire_owned().await.ok();
            let report = crawl_site(&client, &config, &target, sink.as_ref()).await;
            (index, report)
        });
    }

    let mut reports: Vec<Option<SiteReport>> = vec![None; config.sites.len()];
    let mut task_error = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, report)) => reports[index] = Some(report),
            Err(e) => {
                tracing::error!("Site crawl task failed: {}", e);
                task_error = Some(e.to_string());
            }
        }
    }

    let mut sites = Vec::with_capacity(reports.len());
    for (target, report) in config.sites.iter().zip(reports) {
        match report {
            Some(report) => sites.push(report),
            None => {
                return Err(PostureError::Task {
                    site: target.name.clone(),
                    message: task_error
                        .clone()
                        .unwrap_or_else(|| "task ended without a report".to_string()),
                })
            }
        }
    }

    Ok(RunSummary {
        sites,
        elapsed: started.elapsed(),
    })
}
