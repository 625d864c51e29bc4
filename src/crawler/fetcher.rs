//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler:
//! - Building the HTTP client with the identifying user agent and timeout
//! - GET requests with redirects followed here, one hop at a time, so the
//!   full chain can be recorded
//! - Content hashing over the raw bytes
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::record::{FetchRecord, Headers, RedirectHop};
use chrono::Utc;
use reqwest::header::LOCATION;
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Transport-level failures of a single fetch
///
/// The crawl loop treats every variant the same way: the URL is marked
/// failed and the crawl moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("Invalid redirect from {url} to '{location}'")]
    InvalidRedirect { url: String, location: String },
}

impl FetchError {
    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are disabled on the client; [`fetch`] follows them itself.
///
/// # Example
///
/// ```no_run
/// use site_posture::config::{CrawlerConfig, UserAgentConfig};
/// use site_posture::crawler::build_http_client;
///
/// # fn example(crawler: &CrawlerConfig) {
/// let agent = UserAgentConfig {
///     crawler_name: "PostureBot".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
///     contact_email: "bot@example.com".to_string(),
/// };
///
/// let client = build_http_client(&agent, crawler).unwrap();
/// # }
/// ```
pub fn build_http_client(
    agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(crawler.request_timeout_secs);

    Client::builder()
        .user_agent(agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, following up to `max_redirects` redirects
///
/// # Request Flow
///
/// 1. GET the current URL
/// 2. On 301/302/303/307/308 with a `Location` header, record the hop
///    (status, URL that answered) and continue with the resolved location
/// 3. Any other response is final: read the raw bytes, hash them, decode
///    them lossily as UTF-8
///
/// | Condition | Result |
/// |-----------|--------|
/// | Any final status (2xx, 4xx, 5xx) | `Ok(FetchRecord)` |
/// | Timeout | `FetchError::Timeout` |
/// | DNS, connect, reset, body read | `FetchError::Transport` |
/// | More than `max_redirects` hops | `FetchError::RedirectLimit` |
/// | Hop back to a URL already in the chain | `FetchError::RedirectLoop` |
/// | Unresolvable `Location` | `FetchError::InvalidRedirect` |
pub async fn fetch(
    client: &Client,
    url: &Url,
    max_redirects: u32,
) -> Result<FetchRecord, FetchError> {
    let mut current = url.clone();
    let mut chain: Vec<RedirectHop> = Vec::new();

    loop {
        let response = client
            .get(current.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&current, e))?;

        let status = response.status();
        let Some(location) = redirect_location(&response) else {
            return finish(url, current, chain, response).await;
        };

        let next = current
            .join(&location)
            .map_err(|_| FetchError::InvalidRedirect {
                url: current.to_string(),
                location: location.clone(),
            })?;

        chain.push(RedirectHop {
            status: status.as_u16(),
            url: current.to_string(),
        });
        tracing::trace!("{} redirected ({}) to {}", current, status.as_u16(), next);

        if chain.len() > max_redirects as usize {
            return Err(FetchError::RedirectLimit {
                url: url.to_string(),
            });
        }

        if chain.iter().any(|hop| hop.url == next.as_str()) {
            return Err(FetchError::RedirectLoop {
                url: next.to_string(),
            });
        }

        current = next;
    }
}

/// Returns the `Location` of a redirect response, if it is one we follow
fn redirect_location(response: &Response) -> Option<String> {
    let status = response.status();
    let follows = matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    if !follows {
        return None;
    }

    response
        .headers()
        .get(LOCATION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).trim().to_string())
        .filter(|location| !location.is_empty())
}

/// Builds the record from the final response
async fn finish(
    requested: &Url,
    final_url: Url,
    redirect_chain: Vec<RedirectHop>,
    response: Response,
) -> Result<FetchRecord, FetchError> {
    let http_status = response.status().as_u16();
    let headers = Headers::from(response.headers());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::from_reqwest(&final_url, e))?;

    Ok(FetchRecord {
        url: requested.to_string(),
        final_url: final_url.to_string(),
        redirect_chain,
        timestamp: Utc::now(),
        http_status,
        headers,
        sha256: content_hash(&bytes),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Hex SHA-256 of raw bytes
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_agent() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn create_test_crawler() -> CrawlerConfig {
        CrawlerConfig {
            pages_per_site: 10,
            request_timeout_secs: 15,
            politeness_delay_ms: 100,
            max_redirects: 10,
            discover_endpoints: true,
            endpoint_cap: 20,
            same_host_endpoints_only: true,
            max_concurrent_sites: 1,
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_agent(), &create_test_crawler());
        assert!(client.is_ok());
    }

    #[test]
    fn test_content_hash_known_value() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_hash(b"abc").len(), 64);
    }

    #[test]
    fn test_fetch_error_messages() {
        let err = FetchError::RedirectLimit {
            url: "https://example.com/".to_string(),
        };
        assert_eq!(err.to_string(), "Too many redirects from https://example.com/");
    }

    // Redirect handling and body decoding are exercised against wiremock
    // servers in tests/fetch_tests.rs
}
