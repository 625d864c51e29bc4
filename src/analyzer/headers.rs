//! Header presence and miscellaneous header checks

use crate::crawler::Headers;
use std::collections::BTreeMap;

/// Security headers whose presence is reported for every page
pub const SECURITY_HEADERS: &[&str] = &[
    "strict-transport-security",
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
    "referrer-policy",
    "permissions-policy",
    "cross-origin-opener-policy",
    "cross-origin-embedder-policy",
    "cross-origin-resource-policy",
];

/// Referrer policies that leak more than the origin cross-site
const WEAK_REFERRER_POLICIES: &[&str] = &[
    "unsafe-url",
    "no-referrer-when-downgrade",
    "origin",
    "origin-when-cross-origin",
];

/// Path fragments that mark a page as carrying account data
const SENSITIVE_PATH_HINTS: &[&str] = &["login", "account", "settings"];

/// Headers suggested when absent, paired with the suggestion text
const SUGGESTED_HEADERS: &[(&str, &str)] = &[
    ("permissions-policy", "Add Permissions-Policy"),
    ("cross-origin-opener-policy", "Add Cross-Origin-Opener-Policy"),
    ("cross-origin-embedder-policy", "Add Cross-Origin-Embedder-Policy"),
    ("cross-origin-resource-policy", "Add Cross-Origin-Resource-Policy"),
];

pub fn header_presence(headers: &Headers) -> BTreeMap<String, bool> {
    SECURITY_HEADERS
        .iter()
        .map(|name| (name.to_string(), headers.contains(name)))
        .collect()
}

/// Flags a missing or weak `Referrer-Policy`
///
/// A header may list fallbacks separated by commas; the last recognised
/// token is the one a browser applies, so only that token is judged. A
/// header with no tokens at all counts as missing.
pub fn referrer_policy_flags(headers: &Headers) -> Vec<String> {
    let effective = headers.get("referrer-policy").and_then(|value| {
        value
            .split(',')
            .map(|token| token.trim().to_ascii_lowercase())
            .filter(|token| !token.is_empty())
            .last()
    });

    match effective {
        None => vec!["Referrer-Policy missing".to_string()],
        Some(policy) if WEAK_REFERRER_POLICIES.contains(&policy.as_str()) => {
            vec![format!("Referrer-Policy weak ({})", policy)]
        }
        Some(_) => Vec::new(),
    }
}

/// Flags account-like pages that may be stored by shared caches
pub fn cache_control_flags(path: &str, headers: &Headers) -> Vec<String> {
    let path = path.to_ascii_lowercase();
    if !SENSITIVE_PATH_HINTS.iter().any(|hint| path.contains(hint)) {
        return Vec::new();
    }

    let no_store = headers
        .get_all("cache-control")
        .iter()
        .flat_map(|value| value.split(','))
        .any(|directive| directive.trim().eq_ignore_ascii_case("no-store"));

    if no_store {
        Vec::new()
    } else {
        vec!["Sensitive page without Cache-Control: no-store".to_string()]
    }
}

/// Hardening suggestions for absent isolation headers; never risk flags
pub fn header_suggestions(headers: &Headers) -> Vec<String> {
    SUGGESTED_HEADERS
        .iter()
        .filter(|(name, _)| !headers.contains(name))
        .map(|(_, suggestion)| suggestion.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_presence_map_lists_every_header() {
        let presence = header_presence(&headers(&[("X-Frame-Options", "DENY")]));
        assert_eq!(presence.len(), SECURITY_HEADERS.len());
        assert_eq!(presence.get("x-frame-options"), Some(&true));
        assert_eq!(presence.get("content-security-policy"), Some(&false));
    }

    #[test]
    fn test_referrer_policy_missing() {
        assert_eq!(
            referrer_policy_flags(&headers(&[])),
            vec!["Referrer-Policy missing"]
        );
    }

    #[test]
    fn test_referrer_policy_empty_is_missing() {
        for value in ["", "   ", " , "] {
            assert_eq!(
                referrer_policy_flags(&headers(&[("Referrer-Policy", value)])),
                vec!["Referrer-Policy missing"],
                "{:?}",
                value
            );
        }
    }

    #[test]
    fn test_referrer_policy_weak() {
        let flags = referrer_policy_flags(&headers(&[("Referrer-Policy", "Unsafe-URL")]));
        assert_eq!(flags, vec!["Referrer-Policy weak (unsafe-url)"]);
    }

    #[test]
    fn test_referrer_policy_last_token_wins() {
        let strict = headers(&[("Referrer-Policy", "unsafe-url, strict-origin-when-cross-origin")]);
        assert!(referrer_policy_flags(&strict).is_empty());

        let weak = headers(&[("Referrer-Policy", "no-referrer, origin")]);
        assert_eq!(referrer_policy_flags(&weak), vec!["Referrer-Policy weak (origin)"]);
    }

    #[test]
    fn test_cache_control_on_sensitive_path() {
        let none = headers(&[]);
        assert_eq!(
            cache_control_flags("/Account/profile", &none),
            vec!["Sensitive page without Cache-Control: no-store"]
        );

        let private = headers(&[("Cache-Control", "private, No-Store")]);
        assert!(cache_control_flags("/login", &private).is_empty());
    }

    #[test]
    fn test_cache_control_ignored_elsewhere() {
        assert!(cache_control_flags("/about", &headers(&[])).is_empty());
    }

    #[test]
    fn test_suggestions() {
        let suggestions = header_suggestions(&headers(&[("Permissions-Policy", "camera=()")]));
        assert_eq!(
            suggestions,
            vec![
                "Add Cross-Origin-Opener-Policy",
                "Add Cross-Origin-Embedder-Policy",
                "Add Cross-Origin-Resource-Policy",
            ]
        );
    }
}
