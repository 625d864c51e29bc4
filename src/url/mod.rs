//! URL handling module for site-posture
//!
//! This module provides host extraction, same-host checks and resolution of
//! hrefs, form actions and script literals against a page URL.

mod domain;
mod resolve;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use resolve::{parse_http_url, resolve_href};
