//! Strict-Transport-Security parsing

use serde::Serialize;

/// Minimum acceptable max-age: 180 days in seconds
pub const HSTS_MIN_MAX_AGE: u64 = 180 * 24 * 60 * 60;

/// Parsed HSTS header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HstsFindings {
    pub present: bool,
    /// None when the directive is missing or not a number
    pub max_age: Option<u64>,
    pub include_subdomains: bool,
    pub preload: bool,
}

/// Parses a `Strict-Transport-Security` value
///
/// Directive names are case-insensitive and the first `max-age` wins. An
/// unparsable max-age is recorded as `None`.
pub fn parse_hsts(value: Option<&str>) -> HstsFindings {
    let Some(value) = value else {
        return HstsFindings::default();
    };

    let mut findings = HstsFindings {
        present: true,
        ..HstsFindings::default()
    };
    let mut max_age_seen = false;

    for directive in value.split(';') {
        let directive = directive.trim();
        let (name, arg) = match directive.split_once('=') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (directive, None),
        };

        match name.to_ascii_lowercase().as_str() {
            "max-age" if !max_age_seen => {
                max_age_seen = true;
                findings.max_age = arg.and_then(|a| a.trim_matches('"').parse::<u64>().ok());
            }
            "includesubdomains" => findings.include_subdomains = true,
            "preload" => findings.preload = true,
            _ => {}
        }
    }

    findings
}

/// Risk flags for parsed HSTS findings
pub fn hsts_flags(findings: &HstsFindings) -> Vec<String> {
    if !findings.present {
        return vec!["HSTS missing".to_string()];
    }

    let mut flags = Vec::new();
    if findings.max_age.map_or(true, |age| age < HSTS_MIN_MAX_AGE) {
        flags.push("HSTS max-age too low".to_string());
    }
    if !findings.include_subdomains {
        flags.push("HSTS missing includeSubDomains".to_string());
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_year_without_subdomains() {
        let findings = parse_hsts(Some("max-age=31536000"));
        assert_eq!(findings.max_age, Some(31_536_000));
        assert_eq!(hsts_flags(&findings), vec!["HSTS missing includeSubDomains"]);
    }

    #[test]
    fn test_strong_header_has_no_flags() {
        let findings = parse_hsts(Some("max-age=63072000; includeSubDomains; preload"));
        assert!(findings.include_subdomains);
        assert!(findings.preload);
        assert!(hsts_flags(&findings).is_empty());
    }

    #[test]
    fn test_missing_header() {
        let findings = parse_hsts(None);
        assert!(!findings.present);
        assert_eq!(hsts_flags(&findings), vec!["HSTS missing"]);
    }

    #[test]
    fn test_short_max_age() {
        let findings = parse_hsts(Some("max-age=86400; includeSubDomains"));
        assert_eq!(hsts_flags(&findings), vec!["HSTS max-age too low"]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let value = format!("max-age={}; includeSubDomains", HSTS_MIN_MAX_AGE);
        assert!(hsts_flags(&parse_hsts(Some(&value))).is_empty());
    }

    #[test]
    fn test_unparsable_max_age_is_too_low() {
        let findings = parse_hsts(Some("max-age=forever; includeSubDomains"));
        assert!(findings.present);
        assert_eq!(findings.max_age, None);
        assert_eq!(hsts_flags(&findings), vec!["HSTS max-age too low"]);
    }

    #[test]
    fn test_quoted_and_mixed_case() {
        let findings = parse_hsts(Some("Max-Age=\"31536000\" ; INCLUDESUBDOMAINS"));
        assert_eq!(findings.max_age, Some(31_536_000));
        assert!(findings.include_subdomains);
    }

    #[test]
    fn test_missing_max_age_directive() {
        let findings = parse_hsts(Some("includeSubDomains"));
        assert_eq!(findings.max_age, None);
        assert_eq!(hsts_flags(&findings), vec!["HSTS max-age too low"]);
    }
}
