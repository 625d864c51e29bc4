//! CORS response header checks

use crate::crawler::Headers;
use std::collections::BTreeMap;

/// Collects every `access-control-*` header; repeated values are joined with ", "
pub fn collect_cors(headers: &Headers) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter(|(name, _)| name.starts_with("access-control-"))
        .map(|(name, values)| (name.to_string(), values.join(", ")))
        .collect()
}

/// Risk flags for the collected CORS headers
pub fn cors_flags(cors: &BTreeMap<String, String>) -> Vec<String> {
    let mut flags = Vec::new();

    let Some(origin) = cors.get("access-control-allow-origin").map(|v| v.trim()) else {
        return flags;
    };
    let credentials = cors
        .get("access-control-allow-credentials")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

    if origin == "*" && credentials {
        flags.push("CORS: ACAO '*' with credentials=true".to_string());
    }
    if origin != "*" && !origin.eq_ignore_ascii_case("null") && origin.contains(',') {
        flags.push("CORS: multiple origins in ACAO".to_string());
    }

    flags
}
