//! The dot/bracket data-path mini-language.
//!
//! Every mark maps to a path inside the run dataset through one routine:
//! drop the namespace prefix, drop loop index segments (`[]`, `[i]`, `[0]`),
//! split the remainder on `.`. Bindings and parameters both go through
//! [`mark_data_path`], so `d.items[].name` lands at `items.name` and
//! `v.period.month` lands at `period.month`.

/// Split a mark into dataset path segments.
///
/// `d.items[].name` ⇒ `["items", "name"]`; `d[0].total` ⇒ `["total"]`;
/// `v.report_month` ⇒ `["report_month"]`. An empty result means the mark
/// carries no addressable path and the caller should ignore it.
pub fn mark_data_path(mark: &str) -> Vec<String> {
    let trimmed = mark.trim();
    let bytes = trimmed.as_bytes();
    let rest = match (bytes.first(), bytes.get(1)) {
        (Some(b'd' | b'v' | b'c'), Some(b'.')) => &trimmed[2..],
        (Some(b'd' | b'v' | b'c'), Some(b'[')) => &trimmed[1..],
        _ => trimmed,
    };

    split_segments(&strip_bracket_groups(rest))
}

/// Split a field-mapping name on `.` so `customer.name` nests in row objects.
pub fn field_path(field: &str) -> Vec<String> {
    split_segments(field)
}

fn split_segments(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect()
}

/// Remove complete `[...]` groups. An unmatched `[` stays verbatim so a
/// malformed mark degrades to an odd segment name instead of losing text.
fn strip_bracket_groups(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        match rest[open..].find(']') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Header text to snake_case field slug: keep ASCII alphanumerics lowered,
/// treat every other run of characters as one separator, never start or end
/// with `_`. Headers with no ASCII alphanumerics slug to the empty string.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = false;
    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending && !out.is_empty() {
                out.push('_');
            }
            pending = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending = true;
        }
    }
    out
}
