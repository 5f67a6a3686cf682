//! Extraction failures, built to be shown to the person fixing the contract.
//!
//! - **`ExtractErrorKind`**: the closed set of ways extraction can fail
//! - **`ExtractError`**: kind + reason + sheet context + optional suggestion
//!
//! Construction is builder-style so call sites stay readable.

use std::{error::Error, fmt};

/// Every way extraction of one binding can fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExtractErrorKind {
    SheetNotFound,
    InvalidCoordinate,
    InvalidRange,
    InvalidBinding,
    HeaderNotFound,
    NoDataRows,
    ColumnEmpty,
    CoercionFailed,
}

impl fmt::Display for ExtractErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SheetNotFound => "sheet not found",
            Self::InvalidCoordinate => "invalid coordinate",
            Self::InvalidRange => "invalid range",
            Self::InvalidBinding => "invalid binding",
            Self::HeaderNotFound => "header not found",
            Self::NoDataRows => "no data rows",
            Self::ColumnEmpty => "column empty",
            Self::CoercionFailed => "coercion failed",
        })
    }
}

/// The error extraction hands back for one binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractError {
    pub kind: ExtractErrorKind,
    pub sheet: Option<String>,
    pub reason: Option<String>,
    pub suggestion: Option<String>,
}

impl From<ExtractErrorKind> for ExtractError {
    fn from(kind: ExtractErrorKind) -> Self {
        Self {
            kind,
            sheet: None,
            reason: None,
            suggestion: None,
        }
    }
}

impl ExtractError {
    pub fn new(kind: ExtractErrorKind) -> Self {
        kind.into()
    }

    /// Name the sheet the failure happened on.
    pub fn on_sheet<S: Into<String>>(mut self, sheet: S) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Attach the human explanation of what went wrong.
    pub fn with_reason<S: Into<String>>(mut self, reason: S) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attach a hint for fixing the binding or the spreadsheet.
    pub fn with_suggestion<S: Into<String>>(mut self, suggestion: S) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref reason) = self.reason {
            write!(f, ": {reason}")?;
        }
        if let Some(ref sheet) = self.sheet {
            write!(f, " (sheet `{sheet}`)")?;
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "; {suggestion}")?;
        }
        Ok(())
    }
}

impl Error for ExtractError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reads_like_a_diagnostic() {
        let err = ExtractError::new(ExtractErrorKind::HeaderNotFound)
            .on_sheet("Lines")
            .with_reason("no column titled `Amount` in row 1")
            .with_suggestion("available headers: Product, Qty");
        assert_eq!(
            err.to_string(),
            "header not found: no column titled `Amount` in row 1 (sheet `Lines`); available headers: Product, Qty"
        );
    }

    #[test]
    fn bare_kind_displays_alone() {
        let err = ExtractError::new(ExtractErrorKind::NoDataRows);
        assert_eq!(err.to_string(), "no data rows");
    }
}
