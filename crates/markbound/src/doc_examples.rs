use markbound_common::MarkItem;
use markbound_template::{Classification, classify_token};

/// Classify one brace token the way the template scanner would.
///
/// This helper is intended for documentation examples to avoid repetitive
/// setup; real templates go through [`markbound_template::parse_template`].
///
/// # Example
///
/// ```rust
/// # use markbound::doc_examples::classify;
/// # use markbound::MarkKind;
/// let item = classify("{d.items[].price:formatNumber(2)}").unwrap();
/// assert_eq!(item.mark, "d.items[].price");
/// assert_eq!(item.kind, MarkKind::List);
///
/// assert!(classify("{o.sheetName}").is_none()); // control syntax, not a mark
/// ```
pub fn classify(token: &str) -> Option<MarkItem> {
    let inner = token
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}');
    match classify_token(inner) {
        Classification::Mark(item) => Some(item),
        _ => None,
    }
}
