//! Per-site reports and the end-of-run summary

use crate::analyzer::SecuritySignals;
use crate::config::CrawlTarget;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Outcome counters for one site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub site: String,
    pub category: String,

    /// Pages that produced a fetch record, whatever their status
    pub fetched: usize,

    /// URLs disallowed by robots.txt
    pub blocked: usize,

    /// URLs whose fetch failed (transport, timeout, redirect errors)
    pub failed: usize,

    /// Queue entries dropped because the URL was already visited
    pub duplicates_skipped: usize,

    pub pages_with_flags: usize,

    /// Number of pages raising each risk flag
    pub flag_counts: BTreeMap<String, usize>,

    pub rows_written: usize,

    /// Set when the batch could not be written
    pub sink_error: Option<String>,
}

impl SiteReport {
    pub fn new(target: &CrawlTarget) -> Self {
        Self {
            site: target.name.clone(),
            category: target.category.clone(),
            ..Self::default()
        }
    }

    /// Folds one analyzed page into the flag counters
    pub fn record_signals(&mut self, signals: &SecuritySignals) {
        if signals.has_flags() {
            self.pages_with_flags += 1;
        }
        for flag in &signals.risk_flags {
            *self.flag_counts.entry(flag.clone()).or_insert(0) += 1;
        }
    }

    pub fn is_ok(&self) -> bool {
        self.sink_error.is_none()
    }
}

/// Reports for every site in a run, in configuration order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub sites: Vec<SiteReport>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total_fetched(&self) -> usize {
        self.sites.iter().map(|s| s.fetched).sum()
    }

    pub fn total_blocked(&self) -> usize {
        self.sites.iter().map(|s| s.blocked).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.sites.iter().map(|s| s.failed).sum()
    }

    pub fn total_rows(&self) -> usize {
        self.sites.iter().map(|s| s.rows_written).sum()
    }

    pub fn sink_failures(&self) -> usize {
        self.sites.iter().filter(|s| !s.is_ok()).count()
    }

    /// Most frequent flags across all sites, ties broken by flag text
    pub fn top_flags(&self, limit: usize) -> Vec<(String, usize)> {
        let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
        for site in &self.sites {
            for (flag, count) in &site.flag_counts {
                *totals.entry(flag.as_str()).or_insert(0) += count;
            }
        }

        let mut ranked: Vec<(String, usize)> = totals
            .into_iter()
            .map(|(flag, count)| (flag.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}

/// Prints the run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ===\n");

    for site in &summary.sites {
        println!("{} ({}):", site.site, site.category);
        println!(
            "  fetched: {}, blocked: {}, failed: {}, duplicates skipped: {}",
            site.fetched, site.blocked, site.failed, site.duplicates_skipped
        );
        println!(
            "  pages with flags: {} / {}",
            site.pages_with_flags, site.fetched
        );
        match &site.sink_error {
            Some(error) => println!("  output: FAILED ({})", error),
            None => println!("  rows written: {}", site.rows_written),
        }
        println!();
    }

    let top = summary.top_flags(10);
    if !top.is_empty() {
        println!("Top Risk Flags:");
        for (flag, count) in top {
            println!("  {:>4}  {}", count, flag);
        }
        println!();
    }

    println!(
        "Totals: {} fetched, {} blocked, {} failed, {} rows written in {:.1}s",
        summary.total_fetched(),
        summary.total_blocked(),
        summary.total_failed(),
        summary.total_rows(),
        summary.elapsed.as_secs_f64()
    );
    if summary.sink_failures() > 0 {
        println!("{} site(s) could not be written", summary.sink_failures());
    }
}
