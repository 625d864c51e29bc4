use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute HTTP(S) URL with a host
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - Malformed URL, non-HTTP(S) scheme, or missing host
pub fn parse_http_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Resolves an href (or any URL-like literal) against a base URL
///
/// Returns None if the value should be excluded:
/// - empty or fragment-only values
/// - javascript:, mailto:, tel: and data: schemes
/// - values that fail to resolve
/// - non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is removed.
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut resolved = base_url.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);

    Some(resolved)
}
