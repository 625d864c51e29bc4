//! Checks over the page body and markup

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Characters kept in the text excerpt
pub const TEXT_EXCERPT_CHARS: usize = 800;

/// Elements whose text is never shown to a reader
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("static selector"));
static HTML_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("html").expect("static selector"));
static BLANK_TARGET_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[target]").expect("static selector"));

/// Trimmed text of the first `<title>`, if it has any
pub fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Visible text with whitespace collapsed, cut at [`TEXT_EXCERPT_CHARS`]
pub fn text_excerpt(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TEXT_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ").chars().take(TEXT_EXCERPT_CHARS).collect()
}

/// True when an HTTPS page references plain-HTTP resources anywhere in its body
pub fn has_mixed_content(final_url: Option<&Url>, body: &str) -> bool {
    final_url.is_some_and(|url| url.scheme() == "https") && body.contains("http://")
}

pub fn accessibility_flags(document: &Html) -> Vec<String> {
    let mut flags = Vec::new();

    let missing_alt = document
        .select(&IMG_SELECTOR)
        .filter(|img| img.value().attr("alt").map_or(true, |alt| alt.trim().is_empty()))
        .count();
    if missing_alt > 0 {
        flags.push(format!("img without alt ({})", missing_alt));
    }

    let has_lang = document
        .select(&HTML_SELECTOR)
        .next()
        .and_then(|html| html.value().attr("lang"))
        .is_some_and(|lang| !lang.trim().is_empty());
    if !has_lang {
        flags.push("html element missing lang".to_string());
    }

    flags
}

/// Flags `target=_blank` anchors that can reach `window.opener`
pub fn blank_target_flags(document: &Html) -> Vec<String> {
    let unsafe_links = document
        .select(&BLANK_TARGET_SELECTOR)
        .filter(|a| {
            a.value()
                .attr("target")
                .is_some_and(|target| target.trim().eq_ignore_ascii_case("_blank"))
        })
        .filter(|a| {
            let rel = a.value().attr("rel").unwrap_or("").to_ascii_lowercase();
            !rel
                .split_whitespace()
                .any(|token| token == "noopener" || token == "noreferrer")
        })
        .count();

    if unsafe_links == 0 {
        Vec::new()
    } else {
        vec![format!(
            "{} target=_blank link(s) without rel=noopener",
            unsafe_links
        )]
    }
}
