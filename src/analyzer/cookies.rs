//! Set-Cookie parsing

use serde::Serialize;
use std::collections::BTreeMap;

/// Value of a cookie attribute: `Domain=x` or a bare flag like `Secure`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CookieAttribute {
    Flag(bool),
    Value(String),
}

impl CookieAttribute {
    fn as_value(&self) -> &str {
        match self {
            Self::Flag(_) => "",
            Self::Value(value) => value,
        }
    }
}

/// One parsed `Set-Cookie` header
///
/// The cookie's value is not kept; only its name and attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieRecord {
    pub raw: String,
    pub name: String,
    /// Attribute names are lowercased; a repeated attribute keeps the last value
    pub attributes: BTreeMap<String, CookieAttribute>,
}

impl CookieRecord {
    pub fn attribute(&self, name: &str) -> Option<&CookieAttribute> {
        self.attributes.get(&name.to_ascii_lowercase())
    }

    pub fn has(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// Parses a single `Set-Cookie` header value
pub fn parse_set_cookie(raw: &str) -> CookieRecord {
    let mut segments = raw.split(';');
    let pair = segments.next().unwrap_or("").trim();
    let name = pair.split_once('=').map_or(pair, |(name, _)| name).trim();

    let mut attributes = BTreeMap::new();
    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.split_once('=') {
            Some((key, value)) => (key.trim(), CookieAttribute::Value(value.trim().to_string())),
            None => (segment, CookieAttribute::Flag(true)),
        };
        attributes.insert(key.to_ascii_lowercase(), value);
    }

    CookieRecord {
        raw: raw.to_string(),
        name: name.to_string(),
        attributes,
    }
}

/// Risk flags for one cookie
pub fn cookie_flags(cookie: &CookieRecord) -> Vec<String> {
    let name = &cookie.name;
    let mut flags = Vec::new();

    if !cookie.has("secure") {
        flags.push(format!("Cookie {} missing Secure", name));
    }
    if !cookie.has("httponly") {
        flags.push(format!("Cookie {} missing HttpOnly", name));
    }

    match cookie.attribute("samesite") {
        None => flags.push(format!("Cookie {} missing SameSite", name)),
        Some(attr) => {
            let value = attr.as_value();
            if !value.eq_ignore_ascii_case("strict") && !value.eq_ignore_ascii_case("lax") {
                flags.push(format!("Cookie {} SameSite={} (not Strict/Lax)", name, value));
            }
        }
    }

    if let Some(CookieAttribute::Value(domain)) = cookie.attribute("domain") {
        if domain.starts_with('.') {
            flags.push(format!("Cookie {} wildcard Domain {}", name, domain));
        }
    }

    let broad_path = match cookie.attribute("path") {
        None => true,
        Some(attr) => attr.as_value() == "/",
    };
    if broad_path {
        flags.push(format!("Cookie {} overly broad Path", name));
    }

    flags
}

/// Parses every `Set-Cookie` occurrence and returns the records with their flags
pub fn analyze_cookies(values: &[String]) -> (Vec<CookieRecord>, Vec<String>) {
    let cookies: Vec<CookieRecord> = values.iter().map(|v| parse_set_cookie(v)).collect();
    let flags = cookies.iter().flat_map(cookie_flags).collect();
    (cookies, flags)
}
