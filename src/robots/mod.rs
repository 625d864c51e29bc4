//! Robots.txt handling module
//!
//! This module fetches and parses a site's robots.txt once per crawl and
//! answers allow/deny questions for individual URLs. Any failure to obtain
//! the file degrades to the permissive "allow everything" policy.

mod parser;

pub use parser::RobotsPolicy;

use crate::crawler::fetch;
use reqwest::Client;
use url::Url;

/// Loads the robots policy for the host of `base_url`
///
/// Fetches `<scheme>://<host>/robots.txt` with the client's timeout,
/// following up to `max_redirects` redirects (http to https, apex to www).
/// Only a final HTTP 200 response is parsed; any other status, a transport
/// failure, or a broken redirect chain yields [`RobotsPolicy::AllowAll`].
/// There is no retry.
///
/// # Arguments
///
/// * `client` - The HTTP client (carries the user agent and timeout)
/// * `base_url` - Any URL on the site
/// * `max_redirects` - Redirect hops followed before giving up
pub async fn load_policy(client: &Client, base_url: &Url, max_redirects: u32) -> RobotsPolicy {
    let robots_url = match base_url.join("/robots.txt") {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Cannot build robots.txt URL from {}: {}", base_url, e);
            return RobotsPolicy::allow_all();
        }
    };

    let record = match fetch(client, &robots_url, max_redirects).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}; allowing all", robots_url, e);
            return RobotsPolicy::allow_all();
        }
    };

    if record.http_status != 200 {
        tracing::info!(
            "{} returned HTTP {}; allowing all",
            record.final_url,
            record.http_status
        );
        return RobotsPolicy::allow_all();
    }

    if !record.redirect_chain.is_empty() {
        tracing::debug!("{} redirected to {}", robots_url, record.final_url);
    }
    tracing::debug!("Loaded robots.txt from {}", record.final_url);
    RobotsPolicy::from_content(&record.body)
}

/// Checks if a URL may be fetched under a policy
///
/// # Arguments
///
/// * `policy` - The site's robots policy
/// * `user_agent` - The robots product token of the crawler
/// * `url` - The URL to check
pub fn can_fetch(policy: &RobotsPolicy, user_agent: &str, url: &Url) -> bool {
    policy.can_fetch(user_agent, url.as_str())
}
