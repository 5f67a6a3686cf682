use std::path::PathBuf;

use thiserror::Error;

/// Errors from the in-memory workbook builder API.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unknown sheet `{0}`")]
    UnknownSheet(String),
    #[error("cell indexes are 1-based, got row {row}, col {col}")]
    InvalidIndex { row: u32, col: u32 },
}

/// Errors from loading a spreadsheet file from disk.
#[derive(Debug, Error)]
pub enum SheetIoError {
    #[error("failed to open spreadsheet `{}`: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("failed to read worksheet `{sheet}` from `{}`: {source}", path.display())]
    Worksheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}
