//! Content-Security-Policy parsing

use std::collections::BTreeMap;

/// Directive name (lowercased) to its raw value
pub type CspDirectives = BTreeMap<String, String>;

/// Directives where a wildcard source is tolerated
const WILDCARD_TOLERANT: &[&str] = &["img-src", "media-src", "font-src"];

/// Parses a policy into its directives
///
/// Directives are split on `;`, then name and value on the first space.
/// A repeated directive keeps its first value, as browsers do.
pub fn parse_csp(value: &str) -> CspDirectives {
    let mut directives = CspDirectives::new();

    for directive in value.split(';') {
        let directive = directive.trim();
        if directive.is_empty() {
            continue;
        }
        let (name, value) = directive.split_once(' ').unwrap_or((directive, ""));
        directives
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.trim().to_string());
    }

    directives
}

/// Risk flags for a parsed policy; `None` means the header was absent
pub fn csp_flags(directives: Option<&CspDirectives>) -> Vec<String> {
    let Some(directives) = directives else {
        return vec!["CSP missing".to_string()];
    };

    let mut flags = Vec::new();

    for name in ["script-src", "style-src"] {
        let Some(value) = directives.get(name) else {
            continue;
        };
        let lower = value.to_ascii_lowercase();
        for keyword in ["'unsafe-inline'", "'unsafe-eval'"] {
            if lower.contains(keyword) {
                flags.push(format!("CSP: {} allows {}", name, keyword));
            }
        }
    }

    if !is_none(directives.get("object-src")) {
        flags.push("CSP: object-src not 'none'".to_string());
    }
    if !is_none(directives.get("base-uri")) {
        flags.push("CSP: base-uri not 'none'".to_string());
    }

    for (name, value) in directives {
        if !WILDCARD_TOLERANT.contains(&name.as_str()) && value.contains('*') {
            flags.push(format!("CSP: wildcard in {}", name));
        }
    }

    if !directives.contains_key("report-to") && !directives.contains_key("report-uri") {
        flags.push("CSP: no report-to/report-uri".to_string());
    }
    if !directives.contains_key("frame-ancestors") {
        flags.push("CSP: missing frame-ancestors".to_string());
    }

    flags
}

fn is_none(value: Option<&String>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("'none'"))
}
