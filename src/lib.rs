//! site-posture: a polite security-posture crawler
//!
//! This crate crawls a small, capped set of pages per configured site, respecting
//! robots.txt and a per-site politeness interval, and derives a security-posture
//! record (HSTS, CSP, CORS, cookies, forms, libraries, risk flags) for every page
//! it fetches. Raw and clean records are written as JSON lines per site.

pub mod analyzer;
pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for site-posture operations
#[derive(Debug, Error)]
pub enum PostureError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl task for site '{site}' failed: {message}")]
    Task { site: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No output directory configured; refusing to crawl without a sink")]
    MissingOutput,
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for site-posture operations
pub type Result<T> = std::result::Result<T, PostureError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analyzer::{analyze, SecuritySignals};
pub use config::{Config, CrawlTarget};
pub use crawler::{FetchRecord, RedirectHop};
pub use state::UrlState;
