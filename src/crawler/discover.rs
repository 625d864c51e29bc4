//! Link and endpoint discovery
//!
//! Links come from parsed markup; endpoints come from a small set of regular
//! expressions run over the raw page text. Both are capped so a single page
//! cannot flood the frontier. Endpoint discovery is a best-effort heuristic,
//! not a parser.

use crate::url::{resolve_href, same_host};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Number of anchors inspected per document
pub const MAX_LINKS_PER_PAGE: usize = 20;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Endpoint patterns, tried in order. Capture group 1 is the candidate URL.
static ENDPOINT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // String literals starting with /api/
        r#"["'`](/api/[^"'`\s<>]*)["'`]"#,
        // Absolute URLs ending in .json
        r#"(https?://[^\s"'`<>()]+?\.json)(?:[^A-Za-z0-9_]|$)"#,
        // First argument of common async request helpers
        r#"(?:\bfetch|\baxios(?:\.(?:get|post|put|patch|delete|head|request))?|\$\.(?:get|post|getJSON|ajax))\s*\(\s*["'`]([^"'`\s]+)["'`]"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static endpoint pattern"))
    .collect()
});

/// Extracts same-host links from a parsed document
///
/// Only the first [`MAX_LINKS_PER_PAGE`] anchors (document order) are
/// inspected. Each href is resolved against `base_url`; only absolute
/// http(s) URLs on the base's host are kept, fragments removed.
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use site_posture::crawler::discover_links;
/// use url::Url;
///
/// let html = Html::parse_document(r#"<a href="/a">A</a><a href="https://other.example/">B</a>"#);
/// let base = Url::parse("https://example.com/").unwrap();
/// let links = discover_links(&html, &base);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/a");
/// ```
pub fn discover_links(document: &Html, base_url: &Url) -> Vec<Url> {
    document
        .select(&ANCHOR_SELECTOR)
        .take(MAX_LINKS_PER_PAGE)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_href(href, base_url))
        .filter(|url| same_host(base_url, url))
        .collect()
}

/// Scans raw page text for API-like endpoints
///
/// Matches are resolved against `base_url`, optionally restricted to the
/// base's host, deduplicated, and returned in discovery order. Scanning stops
/// as soon as `cap` endpoints have been collected.
pub fn discover_endpoints(
    raw_html: &str,
    base_url: &Url,
    same_host_only: bool,
    cap: usize,
) -> Vec<Url> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut endpoints = Vec::new();

    if cap == 0 {
        return endpoints;
    }

    for pattern in ENDPOINT_PATTERNS.iter() {
        for captures in pattern.captures_iter(raw_html) {
            let Some(candidate) = captures.get(1) else {
                continue;
            };
            let Some(url) = resolve_href(candidate.as_str(), base_url) else {
                continue;
            };
            if same_host_only && !same_host(base_url, &url) {
                continue;
            }
            if seen.insert(url.as_str().to_string()) {
                endpoints.push(url);
                if endpoints.len() >= cap {
                    return endpoints;
                }
            }
        }
    }

    endpoints
}
