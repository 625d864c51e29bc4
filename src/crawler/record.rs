//! Fetch records
//!
//! A [`FetchRecord`] is created once per successful fetch and never mutated.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// One redirect hop: the status returned and the URL that returned it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectHop {
    pub status: u16,
    pub url: String,
}

/// Response headers keyed by lowercased name
///
/// Repeated headers (`Set-Cookie` above all) keep every value in arrival
/// order. Serialized as a JSON object whose values are a string for
/// single-valued headers and an array of strings otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, Vec<String>>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, keeping any earlier values for the same name
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// First value for a header, case-insensitive
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value for a header, in arrival order
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Iterates `(name, values)` in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name.as_ref(), value);
        }
        headers
    }
}

impl From<&reqwest::header::HeaderMap> for Headers {
    fn from(map: &reqwest::header::HeaderMap) -> Self {
        map.iter()
            .map(|(name, value)| {
                (
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            match values.as_slice() {
                [single] => map.serialize_entry(name, single)?,
                many => map.serialize_entry(name, many)?,
            }
        }
        map.end()
    }
}

/// Normalized result of a single page fetch
#[derive(Debug, Clone, Serialize)]
pub struct FetchRecord {
    /// URL that was requested
    pub url: String,

    /// URL after following redirects
    pub final_url: String,

    /// Redirect hops in the order they were followed
    pub redirect_chain: Vec<RedirectHop>,

    /// When the response was received
    pub timestamp: DateTime<Utc>,

    /// Status of the final response
    pub http_status: u16,

    pub headers: Headers,

    /// Hex SHA-256 of the raw body bytes
    pub sha256: String,

    /// Body decoded as UTF-8, invalid sequences replaced
    #[serde(skip)]
    pub body: String,
}
