//! Mark vocabulary shared by the template classifier and the contract model.
//!
//! A mark is the normalized text of a template expression, e.g.
//! `d.company_name`, `d.items[].name`, `v.report_month`. The namespace prefix
//! decides what a mark can bind to:
//!
//! * `d.` / `d[` — data extracted from an input spreadsheet
//! * `c.` / `c[` — complement data, treated exactly like `d` for binding
//! * `v.` / `v[` — runtime parameters supplied by the caller

use serde::{Deserialize, Serialize};

use schemars::JsonSchema;

/// Semantic kind assigned to a mark by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    /// One scalar value from one cell.
    Single,
    /// Repeated rows produced by a loop construct.
    List,
    /// A caller-supplied runtime value.
    Parameter,
}

impl MarkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkKind::Single => "single",
            MarkKind::List => "list",
            MarkKind::Parameter => "parameter",
        }
    }
}

impl std::fmt::Display for MarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified mark, in first-seen template order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MarkItem {
    pub mark: String,
    pub kind: MarkKind,
}

impl MarkItem {
    pub fn new(mark: impl Into<String>, kind: MarkKind) -> Self {
        Self {
            mark: mark.into(),
            kind,
        }
    }
}

/// `d.` / `d[` prefix check on a normalized expression.
pub fn is_data_mark(expression: &str) -> bool {
    expression.starts_with("d.") || expression.starts_with("d[")
}

/// `c.` / `c[` prefix check on a normalized expression.
pub fn is_complement_mark(expression: &str) -> bool {
    expression.starts_with("c.") || expression.starts_with("c[")
}

/// `v.` / `v[` prefix check on a normalized expression.
pub fn is_parameter_mark(expression: &str) -> bool {
    expression.starts_with("v.") || expression.starts_with("v[")
}
