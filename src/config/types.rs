use serde::Deserialize;

/// Main configuration structure for site-posture
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<CrawlTarget>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages fetched per site
    #[serde(rename = "pages-per-site")]
    pub pages_per_site: u32,

    /// Per-request timeout (seconds), robots.txt included
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Minimum time between two requests to the same site (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Maximum number of redirect hops followed per fetch
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Whether API-like endpoints found in markup are queued too
    #[serde(rename = "discover-endpoints", default = "default_true")]
    pub discover_endpoints: bool,

    /// Maximum number of endpoints taken from a single page
    #[serde(rename = "endpoint-cap", default = "default_endpoint_cap")]
    pub endpoint_cap: usize,

    /// Drop discovered endpoints that live on another host
    #[serde(rename = "same-host-endpoints-only", default = "default_true")]
    pub same_host_endpoints_only: bool,

    /// Number of sites crawled at the same time
    #[serde(rename = "max-concurrent-sites", default = "default_concurrent_sites")]
    pub max_concurrent_sites: u32,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the robots.txt product token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the full user agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory of the JSON lines sink
    #[serde(default)]
    pub directory: String,

    /// Stable path segment under each site (overwritten every run)
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: String::new(),
            prefix: default_prefix(),
        }
    }
}

/// One site to crawl
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Site name, used as the output key
    pub name: String,

    /// Free-form category copied into every row
    pub category: String,

    /// Seed URLs, crawled first and in order
    pub seeds: Vec<String>,
}

fn default_max_redirects() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_endpoint_cap() -> usize {
    20
}

fn default_concurrent_sites() -> u32 {
    1
}

fn default_prefix() -> String {
    "latest".to_string()
}
