use thiserror::Error;

use markbound_sheet::SheetIoError;

/// Failures raised while scanning a template for marks.
///
/// The two mark variants carry the sheet name and A1 cell so the author can
/// locate the offending token.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("empty mark at {sheet}!{cell}: braces with nothing inside")]
    EmptyMark { sheet: String, cell: String },

    #[error("unsupported mark `{expression}` at {sheet}!{cell}")]
    UnsupportedMark {
        sheet: String,
        cell: String,
        expression: String,
    },

    #[error(transparent)]
    Io(#[from] SheetIoError),
}
