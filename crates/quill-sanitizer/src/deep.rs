//! Post-parse text cleanup applied to every string leaf
//!
//! The transformations run in a fixed order; later patterns assume the
//! earlier ones have already been applied (link stripping must run before
//! heading stripping, or line boundaries change under it). Tests pin
//! the order.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static BOLD_RE: OnceLock<Regex> = OnceLock::new();
static ITALIC_RE: OnceLock<Regex> = OnceLock::new();
static UNDERLINE_RE: OnceLock<Regex> = OnceLock::new();
static EMPHASIS_RE: OnceLock<Regex> = OnceLock::new();
static LINK_RE: OnceLock<Regex> = OnceLock::new();
static HEADING_RE: OnceLock<Regex> = OnceLock::new();
static CONTROL_RE: OnceLock<Regex> = OnceLock::new();

fn bold_re() -> &'static Regex {
    BOLD_RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"))
}

fn italic_re() -> &'static Regex {
    ITALIC_RE.get_or_init(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"))
}

fn underline_re() -> &'static Regex {
    UNDERLINE_RE.get_or_init(|| Regex::new(r"__([^_]+)__").expect("valid regex"))
}

fn emphasis_re() -> &'static Regex {
    EMPHASIS_RE.get_or_init(|| Regex::new(r"_([^_]+)_").expect("valid regex"))
}

fn link_re() -> &'static Regex {
    LINK_RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"))
}

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"(?m)^#+\s+").expect("valid regex"))
}

fn control_re() -> &'static Regex {
    CONTROL_RE.get_or_init(|| Regex::new(r"[\x00-\x1F\x7F]").expect("valid regex"))
}

/// Strip markdown formatting and control characters from one string
///
/// Order matters and is part of the contract:
/// bold, italic, `__bold__`, `_italic_`, links, headings, control chars.
pub fn sanitize_text(input: &str) -> String {
    let s = bold_re().replace_all(input, "${1}");
    let s = italic_re().replace_all(&s, "${1}");
    let s = underline_re().replace_all(&s, "${1}");
    let s = emphasis_re().replace_all(&s, "${1}");
    let s = link_re().replace_all(&s, "${1}");
    let s = heading_re().replace_all(&s, "");
    let s = control_re().replace_all(&s, "");
    s.trim().to_string()
}

/// Recursively sanitize every string leaf in a parsed value
pub fn deep_sanitize(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(deep_sanitize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, deep_sanitize(v)))
                .collect(),
        ),
        other => other,
    }
}
