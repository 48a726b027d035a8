//! Four-tier sanitize-and-parse pipeline
//!
//! Provider output that should be structured often arrives wrapped in
//! markdown fences, surrounded by prose, or syntactically broken. The
//! tiers escalate from strict to permissive; the first one to produce a
//! parse wins, and exactly one tier succeeds or the whole pipeline fails.

use crate::deep::deep_sanitize;
use crate::tolerant;
use quill_core::{QuillError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const SNIPPET_LEN: usize = 500;

/// Which fallback strategy produced the parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Input parsed exactly as given
    Direct,
    /// Fence-stripped, extracted, and syntactically repaired
    Extracted,
    /// Extraction plus lenient key/quote normalization
    Lenient,
    /// Hand-rolled tolerant grammar over a JSON superset
    Tolerant,
}

impl Tier {
    /// 1-based tier index
    pub fn index(&self) -> u8 {
        match self {
            Self::Direct => 1,
            Self::Extracted => 2,
            Self::Lenient => 3,
            Self::Tolerant => 4,
        }
    }
}

/// Result of a successful sanitization, with diagnostic snippets
#[derive(Debug, Clone)]
pub struct SanitizationOutcome {
    /// The tier that succeeded
    pub tier: Tier,
    /// The parsed (and, unless opted out, deep-sanitized) value
    pub value: Value,
    /// First 500 chars of the raw input
    pub original_snippet: String,
    /// First 500 chars of the last cleaned candidate
    pub cleaned_snippet: String,
}

/// Parse noisy generated text into a value, deep-sanitizing string leaves
pub fn sanitize_and_parse(raw: &str) -> Result<Value> {
    sanitize_and_parse_with(raw, true).map(|outcome| outcome.value)
}

/// Parse noisy generated text, optionally skipping the deep sanitize pass
pub fn sanitize_and_parse_with(raw: &str, deep: bool) -> Result<SanitizationOutcome> {
    if raw.trim().is_empty() {
        return Err(QuillError::Unparsable {
            last_error: "content is empty".to_string(),
            original_snippet: snippet(raw),
            cleaned_snippet: String::new(),
        });
    }

    // Tier 1: direct parse
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Ok(outcome(Tier::Direct, value, deep, raw, raw));
    }
    tracing::debug!("direct parse failed, extracting and repairing");

    // Tier 2: extract and syntactically repair
    let extracted = extract_and_repair(raw);
    let tier2_error = match serde_json::from_str::<Value>(&extracted) {
        Ok(value) => return Ok(outcome(Tier::Extracted, value, deep, raw, &extracted)),
        Err(e) => e,
    };
    tracing::debug!(error = %tier2_error, "repaired parse failed, normalizing");

    // Tier 3: lenient normalization on top of the extraction
    let lenient = normalize_lenient(&extracted);
    let tier3_error = match serde_json::from_str::<Value>(&lenient) {
        Ok(value) => return Ok(outcome(Tier::Lenient, value, deep, raw, &lenient)),
        Err(e) => e,
    };
    tracing::debug!(error = %tier3_error, "lenient parse failed, trying tolerant grammar");

    // Tier 4: permissive reconstruction via the tolerant grammar.
    // The parser emits serde_json values directly, so the canonical
    // round-trip the permissive tier promises holds by construction.
    match tolerant::parse(&extracted) {
        Ok(value) => {
            // String leaves are always sanitized at this tier; the raw
            // text was loose enough that markdown residue is expected
            let value = deep_sanitize(value);
            Ok(SanitizationOutcome {
                tier: Tier::Tolerant,
                value,
                original_snippet: snippet(raw),
                cleaned_snippet: snippet(&extracted),
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, "all sanitization tiers failed");
            Err(QuillError::Unparsable {
                last_error: e.to_string(),
                original_snippet: snippet(raw),
                cleaned_snippet: snippet(&extracted),
            })
        }
    }
}

fn outcome(tier: Tier, value: Value, deep: bool, raw: &str, cleaned: &str) -> SanitizationOutcome {
    let value = if deep { deep_sanitize(value) } else { value };
    SanitizationOutcome {
        tier,
        value,
        original_snippet: snippet(raw),
        cleaned_snippet: snippet(cleaned),
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}

static FENCE_JSON_RE: OnceLock<Regex> = OnceLock::new();
static FENCE_RE: OnceLock<Regex> = OnceLock::new();
static TRAILING_COMMA_OBJ_RE: OnceLock<Regex> = OnceLock::new();
static TRAILING_COMMA_ARR_RE: OnceLock<Regex> = OnceLock::new();
static ADJACENT_OBJ_RE: OnceLock<Regex> = OnceLock::new();
static ADJACENT_ARR_RE: OnceLock<Regex> = OnceLock::new();
static DUP_COMMA_RE: OnceLock<Regex> = OnceLock::new();
static EMPTY_VALUE_RE: OnceLock<Regex> = OnceLock::new();
static EMPTY_VALUE_END_RE: OnceLock<Regex> = OnceLock::new();
static STRING_GAP_RE: OnceLock<Regex> = OnceLock::new();
static BARE_KEY_RE: OnceLock<Regex> = OnceLock::new();
static SINGLE_QUOTED_RE: OnceLock<Regex> = OnceLock::new();
static CONTROL_RUN_RE: OnceLock<Regex> = OnceLock::new();

fn re(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

/// Tier 2 cleanup: strip fences, extract the top-level structure, and
/// apply the fixed-order syntactic repairs
fn extract_and_repair(raw: &str) -> String {
    let text = re(&FENCE_JSON_RE, r"(?i)```json\s*").replace_all(raw, "");
    let text = re(&FENCE_RE, r"```\s*").replace_all(&text, "");
    let text = text.trim();

    let candidate = extract_top_level(text).unwrap_or(text);

    // Repair order is fixed; each pass assumes the previous ones ran
    let s = re(&TRAILING_COMMA_OBJ_RE, r",\s*\}").replace_all(candidate, "}");
    let s = re(&TRAILING_COMMA_ARR_RE, r",\s*\]").replace_all(&s, "]");
    let s = re(&ADJACENT_OBJ_RE, r"\}\s*\{").replace_all(&s, "},{");
    let s = re(&ADJACENT_ARR_RE, r"\]\s*\[").replace_all(&s, "],[");
    let s = re(&DUP_COMMA_RE, r",(\s*,)+").replace_all(&s, ",");
    let s = re(&EMPTY_VALUE_RE, r":\s*,").replace_all(&s, ": null,");
    let s = re(&EMPTY_VALUE_END_RE, r":\s*\}").replace_all(&s, ": null}");
    let s = re(&STRING_GAP_RE, "\"[ \\t]*\\n\\s*\"").replace_all(&s, "\",\n\"");
    s.into_owned()
}

/// Extract the first top-level brace- or bracket-delimited span
///
/// Prefers the span that runs to the end of the text (ignoring trailing
/// whitespace); otherwise takes the widest span from the first opener.
/// With multiple independent blocks in one response the result is
/// whichever alternative wins here, not a promised "first block" or
/// "last block" contract.
fn extract_top_level(text: &str) -> Option<&str> {
    let brace = text.find('{');
    let bracket = text.find('[');
    let (start, close) = match (brace, bracket) {
        (Some(b), Some(k)) if b < k => (b, '}'),
        (Some(b), None) => (b, '}'),
        (_, Some(k)) => (k, ']'),
        (None, None) => return None,
    };

    let anchored_end = text.trim_end().len();
    if anchored_end > start && text[..anchored_end].ends_with(close) {
        return Some(&text[start..anchored_end]);
    }

    text.rfind(close)
        .filter(|&p| p > start)
        .map(|p| &text[start..=p])
}

/// Tier 3 cleanup: quote bare keys, convert single-quoted values, and
/// strip control characters
fn normalize_lenient(extracted: &str) -> String {
    let s = re(&BARE_KEY_RE, r#"['"]?([a-zA-Z0-9_]+)['"]?:"#).replace_all(extracted, "\"${1}\":");
    let s = re(&SINGLE_QUOTED_RE, r":\s*'([^']*)'").replace_all(&s, ": \"${1}\"");
    let s = s.replace("\\'", "'");
    let s = re(&CONTROL_RUN_RE, r"[\x00-\x19]+").replace_all(&s, "");
    s.into_owned()
}
