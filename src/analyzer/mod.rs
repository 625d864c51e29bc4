//! Security signal analysis
//!
//! [`analyze`] turns one [`FetchRecord`] into a [`SecuritySignals`] value. It
//! never fails and never performs I/O: every submodule parses one concern
//! (a header, the forms, the script tags) into a structured value plus a list
//! of human-readable risk flags, and this module folds those flags into one
//! sorted, deduplicated set.

pub mod cookies;
pub mod cors;
pub mod csp;
pub mod document;
pub mod forms;
pub mod headers;
pub mod hsts;
pub mod libraries;

pub use cookies::{CookieAttribute, CookieRecord};
pub use csp::CspDirectives;
pub use forms::FormRecord;
pub use hsts::HstsFindings;
pub use libraries::LibraryMatch;

use crate::crawler::{FetchRecord, RedirectHop};
use scraper::Html;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Security posture of a single fetched page
#[derive(Debug, Clone, Serialize)]
pub struct SecuritySignals {
    pub title: Option<String>,
    pub text_excerpt: String,
    pub http_security_headers: BTreeMap<String, bool>,
    pub hsts: HstsFindings,
    /// None when the page sent no Content-Security-Policy
    pub csp: Option<CspDirectives>,
    pub cors: BTreeMap<String, String>,
    pub cookies: Vec<CookieRecord>,
    pub libraries: Vec<LibraryMatch>,
    pub forms: Vec<FormRecord>,
    pub header_suggestions: Vec<String>,
    pub mixed_content: bool,
    pub accessibility_flags: Vec<String>,

    // Carried for callers; the fetch record already serializes both.
    #[serde(skip)]
    pub final_url: String,
    #[serde(skip)]
    pub redirect_chain: Vec<RedirectHop>,

    pub risk_flags: BTreeSet<String>,
}

impl SecuritySignals {
    pub fn has_flags(&self) -> bool {
        !self.risk_flags.is_empty()
    }
}

/// Derives the security signals for a fetched page
///
/// Relative URLs in the page (form actions) resolve against the final URL
/// after redirects.
pub fn analyze(record: &FetchRecord) -> SecuritySignals {
    let headers = &record.headers;
    let final_url = Url::parse(&record.final_url)
        .or_else(|_| Url::parse(&record.url))
        .ok();
    let document = Html::parse_document(&record.body);

    let mut risk_flags = BTreeSet::new();

    let hsts = hsts::parse_hsts(headers.get("strict-transport-security"));
    risk_flags.extend(hsts::hsts_flags(&hsts));

    let csp = headers.get("content-security-policy").map(csp::parse_csp);
    risk_flags.extend(csp::csp_flags(csp.as_ref()));

    let cors = cors::collect_cors(headers);
    risk_flags.extend(cors::cors_flags(&cors));

    let (cookies, cookie_flags) = cookies::analyze_cookies(headers.get_all("set-cookie"));
    risk_flags.extend(cookie_flags);

    let mixed_content = document::has_mixed_content(final_url.as_ref(), &record.body);
    if mixed_content {
        risk_flags.insert("Mixed content on HTTPS page".to_string());
    }

    let (libraries, library_flags) = libraries::detect_libraries(&document);
    risk_flags.extend(library_flags);

    let (forms, form_flags) = forms::analyze_forms(&document, final_url.as_ref());
    risk_flags.extend(form_flags);

    risk_flags.extend(headers::referrer_policy_flags(headers));
    let path = final_url.as_ref().map_or("", Url::path);
    risk_flags.extend(headers::cache_control_flags(path, headers));
    risk_flags.extend(document::blank_target_flags(&document));

    SecuritySignals {
        title: document::extract_title(&document),
        text_excerpt: document::text_excerpt(&document),
        http_security_headers: headers::header_presence(headers),
        hsts,
        csp,
        cors,
        cookies,
        libraries,
        forms,
        header_suggestions: headers::header_suggestions(headers),
        mixed_content,
        accessibility_flags: document::accessibility_flags(&document),
        final_url: record.final_url.clone(),
        redirect_chain: record.redirect_chain.clone(),
        risk_flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Headers;
    use chrono::Utc;

    fn record(url: &str, headers: &[(&str, &str)], body: &str) -> FetchRecord {
        FetchRecord {
            url: url.to_string(),
            final_url: url.to_string(),
            redirect_chain: vec![],
            timestamp: Utc::now(),
            http_status: 200,
            headers: headers.iter().copied().collect::<Headers>(),
            sha256: String::new(),
            body: body.to_string(),
        }
    }

    const HARDENED_HEADERS: &[(&str, &str)] = &[
        ("Strict-Transport-Security", "max-age=63072000; includeSubDomains; preload"),
        (
            "Content-Security-Policy",
            "default-src 'self'; object-src 'none'; base-uri 'none'; frame-ancestors 'none'; report-to csp",
        ),
        ("Referrer-Policy", "strict-origin-when-cross-origin"),
        ("X-Frame-Options", "DENY"),
        ("X-Content-Type-Options", "nosniff"),
        ("Permissions-Policy", "camera=()"),
        ("Cross-Origin-Opener-Policy", "same-origin"),
        ("Cross-Origin-Embedder-Policy", "require-corp"),
        ("Cross-Origin-Resource-Policy", "same-origin"),
    ];

    #[test]
    fn test_hardened_page_has_no_flags() {
        let signals = analyze(&record(
            "https://example.com/",
            HARDENED_HEADERS,
            r#"<html lang="en"><head><title>Example</title></head><body><p>Hello</p></body></html>"#,
        ));

        assert!(!signals.has_flags(), "unexpected: {:?}", signals.risk_flags);
        assert!(signals.header_suggestions.is_empty());
        assert!(signals.accessibility_flags.is_empty());
        assert_eq!(signals.title.as_deref(), Some("Example"));
        assert_eq!(signals.text_excerpt, "Example Hello");
        assert!(signals.http_security_headers.values().all(|present| *present));
    }

    #[test]
    fn test_bare_page_collects_flags_from_every_analysis() {
        let signals = analyze(&record(
            "https://example.com/login",
            &[("Set-Cookie", "sid=1")],
            r#"<html><body>
                <script src="/js/jquery-1.11.0.min.js"></script>
                <img src="http://cdn.example.com/logo.png">
                <a href="/x" target="_blank">x</a>
            </body></html>"#,
        ));

        let expected = [
            "1 target=_blank link(s) without rel=noopener",
            "CSP missing",
            "Cookie sid missing HttpOnly",
            "HSTS missing",
            "Mixed content on HTTPS page",
            "Outdated jQuery 1.11.0 (1.x)",
            "Referrer-Policy missing",
            "Sensitive page without Cache-Control: no-store",
        ];
        for flag in expected {
            assert!(signals.risk_flags.contains(flag), "missing {}", flag);
        }
        assert!(signals.mixed_content);
        assert_eq!(signals.csp, None);
        assert_eq!(signals.header_suggestions.len(), 4);
        assert_eq!(
            signals.accessibility_flags,
            vec!["img without alt (1)", "html element missing lang"]
        );
    }

    #[test]
    fn test_flags_are_sorted_and_deduplicated() {
        let signals = analyze(&record(
            "https://example.com/",
            &[("Set-Cookie", "a=1"), ("Set-Cookie", "a=2")],
            "",
        ));

        let flags: Vec<&String> = signals.risk_flags.iter().collect();
        let mut sorted = flags.clone();
        sorted.sort();
        assert_eq!(flags, sorted);
        assert_eq!(
            signals
                .risk_flags
                .iter()
                .filter(|f| *f == "Cookie a missing Secure")
                .count(),
            1
        );
        assert_eq!(signals.cookies.len(), 2);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let page = record(
            "https://example.com/account",
            &[("Content-Security-Policy", "script-src * 'unsafe-eval'")],
            r#"<form action="/reset"><input name="token"></form>"#,
        );
        let first = serde_json::to_string(&analyze(&page)).unwrap();
        let second = serde_json::to_string(&analyze(&page)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_forms_resolve_against_final_url() {
        let mut page = record("https://example.com/start", &[], r#"<form action="submit"></form>"#);
        page.final_url = "https://example.com/app/home".to_string();

        let signals = analyze(&page);
        assert_eq!(signals.forms[0].action, "https://example.com/app/submit");
        assert_eq!(signals.final_url, "https://example.com/app/home");
    }

    #[test]
    fn test_skipped_fields_not_serialized() {
        let signals = analyze(&record("https://example.com/", &[], ""));
        let json = serde_json::to_value(&signals).unwrap();
        assert!(json.get("final_url").is_none());
        assert!(json.get("redirect_chain").is_none());
        assert!(json.get("risk_flags").unwrap().is_array());
    }
}
