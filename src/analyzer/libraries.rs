//! Third-party script detection

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[src]").expect("static selector"));

/// Library name and the pattern for its name in a file or CDN path
const KNOWN_LIBRARIES: &[(&str, &str)] = &[
    ("jquery", "jquery"),
    ("bootstrap", "bootstrap"),
    ("angular", "angular(?:js)?"),
    ("react", "react(?:-dom)?"),
    ("vue", "vue"),
    ("lodash", "lodash"),
    ("moment", "moment"),
];

struct LibraryPattern {
    name: &'static str,
    file: Regex,
    version: Regex,
}

static LIBRARY_PATTERNS: LazyLock<Vec<LibraryPattern>> = LazyLock::new(|| {
    KNOWN_LIBRARIES
        .iter()
        .map(|&(name, token)| LibraryPattern {
            name,
            // token inside the final path segment of a .js file
            file: Regex::new(&format!(r"(?i){}[^/?#]*\.js(?:$|[?#])", token))
                .expect("static library pattern"),
            // jquery-1.12.4.min.js, jquery/3.6.0/..., jquery@3.6.0, lodash.js/4.17.21/...
            version: Regex::new(&format!(r"(?i){}(?:\.js)?[-.@/]v?(\d+(?:\.\d+)+)", token))
                .expect("static library pattern"),
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryMatch {
    pub name: String,
    pub version: Option<String>,
    pub src: String,
}

/// Matches a script URL against the known library table
pub fn match_library(src: &str) -> Option<LibraryMatch> {
    let pattern = LIBRARY_PATTERNS.iter().find(|p| p.file.is_match(src))?;
    let version = pattern
        .version
        .captures(src)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    Some(LibraryMatch {
        name: pattern.name.to_string(),
        version,
        src: src.to_string(),
    })
}

/// Detects known libraries from `<script src>` tags in document order
pub fn detect_libraries(document: &Html) -> (Vec<LibraryMatch>, Vec<String>) {
    let libraries: Vec<LibraryMatch> = document
        .select(&SCRIPT_SELECTOR)
        .filter_map(|script| script.value().attr("src"))
        .filter_map(match_library)
        .collect();

    let flags = libraries
        .iter()
        .filter(|lib| lib.name == "jquery")
        .filter_map(|lib| lib.version.as_deref())
        .filter(|version| version.starts_with("1."))
        .map(|version| format!("Outdated jQuery {} (1.x)", version))
        .collect();

    (libraries, flags)
}
