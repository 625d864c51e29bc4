//! Configuration module for site-posture
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_posture::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("posture.toml")).unwrap();
//! println!("Pages per site: {}", config.crawler.pages_per_site);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlTarget, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_output};
