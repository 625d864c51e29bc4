//! Form checks

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use url::Url;

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("static selector"));
static FIELD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input, textarea, select").expect("static selector"));

/// Field or action name fragments that mark a form as carrying secrets
const SENSITIVE_HINTS: &[&str] = &[
    "login", "signin", "password", "passwd", "token", "reset", "2fa", "mfa",
];

/// Field name fragments that suggest an anti-forgery token
const CSRF_HINTS: &[&str] = &[
    "csrf",
    "xsrf",
    "authenticity_token",
    "_token",
    "requestverificationtoken",
];

/// Field types that carry credentials
const CREDENTIAL_TYPES: &[&str] = &["password", "email", "text"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormRecord {
    /// Lowercased method, `get` when absent
    pub method: String,
    /// Action resolved against the page URL
    pub action: String,
    pub has_password: bool,
    pub has_csrf_hint: bool,
}

struct Field {
    name: String,
    kind: String,
    autocomplete: Option<String>,
}

fn lower_attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(|value| value.trim().to_ascii_lowercase())
}

fn resolve_action(raw: &str, base_url: Option<&Url>) -> String {
    let Some(base) = base_url else {
        return raw.to_string();
    };
    match base.join(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.to_string(),
    }
}

fn fields_of(form: &ElementRef<'_>) -> Vec<Field> {
    form.select(&FIELD_SELECTOR)
        .map(|field| {
            let kind = match field.value().name() {
                "input" => lower_attr(&field, "type")
                    .filter(|kind| !kind.is_empty())
                    .unwrap_or_else(|| "text".to_string()),
                other => other.to_string(),
            };
            Field {
                name: lower_attr(&field, "name").unwrap_or_default(),
                kind,
                autocomplete: lower_attr(&field, "autocomplete"),
            }
        })
        .collect()
}

/// Extracts every form and the risk flags it raises
///
/// Flags name the form by its resolved action so findings stay attributable
/// when a page carries several forms.
pub fn analyze_forms(document: &Html, base_url: Option<&Url>) -> (Vec<FormRecord>, Vec<String>) {
    let mut records = Vec::new();
    let mut flags = Vec::new();

    for form in document.select(&FORM_SELECTOR) {
        let method = lower_attr(&form, "method")
            .filter(|method| !method.is_empty())
            .unwrap_or_else(|| "get".to_string());
        let raw_action = form.value().attr("action").map(str::trim).unwrap_or("");
        let action = resolve_action(raw_action, base_url);
        let form_autocomplete = lower_attr(&form, "autocomplete");

        let fields = fields_of(&form);
        let has_password = fields.iter().any(|f| f.kind == "password");
        let has_csrf_hint = fields
            .iter()
            .any(|f| CSRF_HINTS.iter().any(|hint| f.name.contains(hint)));

        let action_lower = action.to_ascii_lowercase();
        let sensitive = SENSITIVE_HINTS.iter().any(|hint| {
            action_lower.contains(hint) || fields.iter().any(|f| f.name.contains(hint))
        });

        if method == "get" && sensitive {
            flags.push(format!("Form {}: sensitive fields submitted via GET", action));
        }

        let https_action = Url::parse(&action).is_ok_and(|url| url.scheme() == "https");
        if !https_action {
            flags.push(format!("Form {}: action not HTTPS", action));
        }

        if has_password && !has_csrf_hint {
            flags.push(format!(
                "Form {}: password form without CSRF token field",
                action
            ));
        }

        if has_password {
            let permissive = fields
                .iter()
                .filter(|f| CREDENTIAL_TYPES.contains(&f.kind.as_str()))
                .any(|f| {
                    let effective = f.autocomplete.as_deref().or(form_autocomplete.as_deref());
                    matches!(effective, None | Some("on"))
                });
            if permissive {
                flags.push(format!(
                    "Form {}: autocomplete enabled on credential fields",
                    action
                ));
            }
        }

        records.push(FormRecord {
            method,
            action,
            has_password,
            has_csrf_hint,
        });
    }

    (records, flags)
}
