//! Crawler module for page fetching and site traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with manually followed redirects
//! - Link and endpoint discovery
//! - The per-site frontier
//! - Overall crawl coordination

mod coordinator;
pub mod discover;
mod fetcher;
mod frontier;
mod record;

pub use coordinator::{crawl_site, run_crawl, SiteCrawl, SiteCrawler};
pub use discover::{discover_endpoints, discover_links, MAX_LINKS_PER_PAGE};
pub use fetcher::{build_http_client, content_hash, fetch, FetchError};
pub use frontier::Frontier;
pub use record::{FetchRecord, Headers, RedirectHop};
