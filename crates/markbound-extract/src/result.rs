//! What extraction hands to the dataset assembler.
//!
//! Each shape keeps enough provenance (row numbers, column letters, the
//! field mapping that selected it) for the assembler to build row objects
//! and for diagnostics to point back into the spreadsheet.

use markbound_common::CellValue;

/// One scalar pulled for a `single` binding.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleExtraction {
    pub mark: String,
    pub sheet_name: String,
    pub value: CellValue,
}

/// Rows pulled for a `list` binding, shaped by its addressing method.
#[derive(Debug, Clone, PartialEq)]
pub enum ListExtraction {
    Header {
        mark: String,
        sheet_name: String,
        rows: Vec<HeaderRow>,
    },
    Fixed {
        mark: String,
        sheet_name: String,
        rows: Vec<FixedRow>,
    },
    Column {
        mark: String,
        sheet_name: String,
        columns: Vec<ColumnValues>,
    },
}

impl ListExtraction {
    pub fn mark(&self) -> &str {
        match self {
            ListExtraction::Header { mark, .. }
            | ListExtraction::Fixed { mark, .. }
            | ListExtraction::Column { mark, .. } => mark,
        }
    }
}

/// The result of extracting one binding.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Single(SingleExtraction),
    List(ListExtraction),
}

impl ExtractionResult {
    pub fn mark(&self) -> &str {
        match self {
            ExtractionResult::Single(single) => &single.mark,
            ExtractionResult::List(list) => list.mark(),
        }
    }
}

/// One data row resolved through header lookup: field name to value.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRow {
    pub row_number: u32,
    pub values: Vec<FieldValue>,
}

/// A named value inside a header row. `field_name` may be dotted
/// (`customer.name`); the assembler explodes it into nested objects.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub field_name: String,
    pub value: CellValue,
}

/// One row of a fixed range, one cell per column offset (blanks included).
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRow {
    pub row_number: u32,
    pub cells: Vec<FixedCell>,
}

/// A cell of a fixed-range row plus the field mapping paired with its
/// column offset, when the binding declared one.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedCell {
    pub column: String,
    pub field_name: Option<String>,
    pub header_text: Option<String>,
    pub value: CellValue,
}

/// The non-blank cells of one referenced column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValues {
    pub column: String,
    pub field_name: Option<String>,
    pub header_text: Option<String>,
    pub values: Vec<ColumnCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnCell {
    pub row_number: u32,
    pub value: CellValue,
}
