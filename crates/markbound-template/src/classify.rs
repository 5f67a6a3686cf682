//! Classification rules for the text between template braces.
//!
//! A token is either rendering control syntax (skipped), a sample row under a
//! loop (skipped), or a mark in one of the three bindable namespaces:
//! `d.*` spreadsheet data, `c.*` complements, `v.*` runtime parameters.

use once_cell::sync::Lazy;
use regex::Regex;

use markbound_common::{MarkItem, MarkKind, is_complement_mark, is_data_mark, is_parameter_mark};

/// Matches `{{ ... }}` before `{ ... }` so double braces never split into two
/// tokens.
pub static MARK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{.*?\}\}|\{.*?\}").expect("mark pattern must compile"));

/// `[i+1]`, `[i - 2]` and friends: sample rows laid out beneath a loop head.
static SAMPLE_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[i\s*[+-]\s*\d+[^\]]*\]").expect("sample row pattern must compile")
});

/// Any `[i...]` subscript; the capture separates pinned `[i=N]` rows from
/// open loop subscripts.
static LOOP_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[i([^\]]*)\]").expect("loop index pattern must compile"));

/// `[]` (inner whitespace allowed): the wildcard list subscript.
static WILDCARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*\]").expect("wildcard pattern must compile"));

/// Outcome of classifying one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A bindable mark, canonicalized (whitespace stripped, filters removed).
    Mark(MarkItem),
    /// Rendering control syntax: `t(...)`, `#` sections, `/` closers, `o.*`.
    Control,
    /// Sample-row content under a loop; only the loop head is reported.
    SampleRow,
    /// Nothing but whitespace between the braces.
    Empty,
    /// Text that belongs to no namespace this engine knows.
    Unsupported,
}

/// Classify the inner text of one `{...}` token (braces already stripped).
pub fn classify_token(raw: &str) -> Classification {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Classification::Empty;
    }
    if trimmed.starts_with("t(") {
        return Classification::Control;
    }

    let normalized: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    if normalized.starts_with('#') || normalized.starts_with('/') || normalized.starts_with("o.") {
        return Classification::Control;
    }

    // Filters and formatters live after the first colon and never change
    // which cell or range the mark binds to.
    let base = match normalized.split_once(':') {
        Some((head, _)) => head,
        None => normalized.as_str(),
    };

    if SAMPLE_ROW.is_match(base) {
        return Classification::SampleRow;
    }

    if is_parameter_mark(base) {
        return Classification::Mark(MarkItem::new(base, MarkKind::Parameter));
    }
    if is_data_mark(base) || is_complement_mark(base) {
        let kind = if WILDCARD.is_match(base) || has_open_subscript(base) {
            MarkKind::List
        } else {
            MarkKind::Single
        };
        return Classification::Mark(MarkItem::new(base, kind));
    }

    Classification::Unsupported
}

/// True when a subscript uses the loop variable without pinning it to one
/// row (`[i]`, `[i*2]`), which makes the mark a list.
fn has_open_subscript(base: &str) -> bool {
    LOOP_INDEX.captures_iter(base).any(|caps| {
        let tail = caps.get(1).map_or("", |m| m.as_str());
        !tail.trim_start().starts_with('=')
    })
}
