//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlState`: Where a single URL stands in a site's frontier
//! - `Politeness`: Per-site request spacing

mod politeness;
mod url_state;

// Re-export main types
pub use politeness::Politeness;
pub use url_state::UrlState;
