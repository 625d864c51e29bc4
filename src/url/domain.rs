use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_posture::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether two URLs share the same network location
///
/// Both the host and the effective port must match, so `https://a.example/`
/// and `https://a.example:8443/` are different sites.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_posture::url::same_host;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// assert!(same_host(&base, &Url::parse("https://example.com/about").unwrap()));
/// assert!(!same_host(&base, &Url::parse("https://cdn.example.com/").unwrap()));
/// ```
pub fn same_host(base: &Url, candidate: &Url) -> bool {
    match (extract_domain(base), extract_domain(candidate)) {
        (Some(a), Some(b)) => {
            a == b && base.port_or_known_default() == candidate.port_or_known_default()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_same_host_ignores_path_and_case() {
        let a = Url::parse("https://Example.com/a").unwrap();
        let b = Url::parse("https://example.COM/b?c=d").unwrap();
        assert!(same_host(&a, &b));
    }

    #[test]
    fn test_same_host_default_port() {
        let a = Url::parse("https://example.com/").unwrap();
        let b = Url::parse("https://example.com:443/").unwrap();
        assert!(same_host(&a, &b));
    }

    #[test]
    fn test_different_port_is_different_host() {
        let a = Url::parse("http://127.0.0.1:8080/").unwrap();
        let b = Url::parse("http://127.0.0.1:9090/").unwrap();
        assert!(!same_host(&a, &b));
    }

    #[test]
    fn test_subdomain_is_different_host() {
        let a = Url::parse("https://example.com/").unwrap();
        let b = Url::parse("https://www.example.com/").unwrap();
        assert!(!same_host(&a, &b));
    }
}
