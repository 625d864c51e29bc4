//! Rows written to the sink

use crate::analyzer::SecuritySignals;
use crate::config::CrawlTarget;
use crate::crawler::{FetchRecord, Headers, RedirectHop};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One fetched page as it came off the wire, minus the body
#[derive(Debug, Clone, Serialize)]
pub struct RawRow {
    pub site: String,
    pub category: String,
    pub url: String,
    pub final_url: String,
    pub redirect_chain: Vec<RedirectHop>,
    pub timestamp: DateTime<Utc>,
    pub http_status: u16,
    pub headers: Headers,
    pub sha256: String,
}

impl RawRow {
    pub fn new(target: &CrawlTarget, record: &FetchRecord) -> Self {
        Self {
            site: target.name.clone(),
            category: target.category.clone(),
            url: record.url.clone(),
            final_url: record.final_url.clone(),
            redirect_chain: record.redirect_chain.clone(),
            timestamp: record.timestamp,
            http_status: record.http_status,
            headers: record.headers.clone(),
            sha256: record.sha256.clone(),
        }
    }
}

/// A raw row with the page's security signals merged in
///
/// Both halves are flattened into one JSON object. The signals never
/// serialize their own copy of the final URL or redirect chain, so each key
/// appears once.
#[derive(Debug, Clone, Serialize)]
pub struct CleanRow {
    #[serde(flatten)]
    pub raw: RawRow,

    #[serde(flatten)]
    pub signals: SecuritySignals,
}

impl CleanRow {
    pub fn new(raw: RawRow, signals: SecuritySignals) -> Self {
        Self { raw, signals }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;

    fn fixture() -> (CrawlTarget, FetchRecord) {
        let target = CrawlTarget {
            name: "example".to_string(),
            category: "news".to_string(),
            seeds: vec!["https://example.com/".to_string()],
        };
        let record = FetchRecord {
            url: "http://example.com/".to_string(),
            final_url: "https://example.com/".to_string(),
            redirect_chain: vec![RedirectHop {
                status: 301,
                url: "http://example.com/".to_string(),
            }],
            timestamp: Utc::now(),
            http_status: 200,
            headers: [("X-Frame-Options", "DENY")].into_iter().collect(),
            sha256: "ab".repeat(32),
            body: "<title>Front page</title>".to_string(),
        };
        (target, record)
    }

    #[test]
    fn test_raw_row_fields() {
        let (target, record) = fixture();
        let json = serde_json::to_value(RawRow::new(&target, &record)).unwrap();

        assert_eq!(json["site"], "example");
        assert_eq!(json["category"], "news");
        assert_eq!(json["redirect_chain"][0]["status"], 301);
        assert_eq!(json["headers"]["x-frame-options"], "DENY");
        assert!(json.get("body").is_none());
    }

    #[test]
    fn test_clean_row_merges_without_duplicate_keys() {
        let (target, record) = fixture();
        let row = CleanRow::new(RawRow::new(&target, &record), analyze(&record));
        let line = serde_json::to_string(&row).unwrap();

        assert_eq!(line.matches("\"final_url\"").count(), 1);
        assert_eq!(line.matches("\"redirect_chain\"").count(), 1);

        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["title"], "Front page");
        assert_eq!(json["site"], "example");
        assert!(json["risk_flags"].is_array());
    }
}
