//! The extraction engine: resolve bindings against one workbook snapshot.

use std::collections::HashMap;

use markbound_common::{
    CellAddress, CellValue, RangeAddress, column_to_letters, letters_to_column,
    normalize_column_reference,
};
use markbound_contract::{DataType, ListBinding, RangeMethod, SingleBinding};
use markbound_sheet::{Sheet, Workbook};

use crate::coerce::coerce;
use crate::error::{ExtractError, ExtractErrorKind};
use crate::result::{
    ColumnCell, ColumnValues, FieldValue, FixedCell, FixedRow, HeaderRow, ListExtraction,
    SingleExtraction,
};

/// Extracts binding data from one workbook.
///
/// `source_label` names the data source in diagnostics, typically the
/// configured source name or the uploaded file name.
pub struct Extractor<'a> {
    workbook: &'a Workbook,
    source_label: String,
}

impl<'a> Extractor<'a> {
    pub fn new(workbook: &'a Workbook, source_label: impl Into<String>) -> Self {
        Self {
            workbook,
            source_label: source_label.into(),
        }
    }

    /// Pull the one cell a `single` binding points at and coerce it to the
    /// declared type. A cell that was never written reads as `Empty`.
    pub fn extract_single(
        &self,
        binding: &SingleBinding,
    ) -> Result<SingleExtraction, ExtractError> {
        let sheet = self.sheet(&binding.sheet_name)?;
        let address = CellAddress::parse(&binding.cell_coordinate).map_err(|err| {
            ExtractError::new(ExtractErrorKind::InvalidCoordinate)
                .on_sheet(&binding.sheet_name)
                .with_reason(err.to_string())
                .with_suggestion("use an A1-style coordinate like B12")
        })?;

        let raw = sheet
            .value(address.row, address.col)
            .cloned()
            .unwrap_or(CellValue::Empty);
        let wanted = binding.data_type.unwrap_or(DataType::Auto);
        let value = coerce(raw, wanted).map_err(|err| {
            ExtractError::new(ExtractErrorKind::CoercionFailed)
                .on_sheet(&binding.sheet_name)
                .with_reason(format!("cell {}: {err}", address.to_a1()))
        })?;

        Ok(SingleExtraction {
            mark: binding.mark.clone(),
            sheet_name: binding.sheet_name.clone(),
            value,
        })
    }

    /// Pull the rows a `list` binding addresses, shaped by its method.
    pub fn extract_list(&self, binding: &ListBinding) -> Result<ListExtraction, ExtractError> {
        let sheet = self.sheet(&binding.sheet_name)?;
        match binding.range_method {
            RangeMethod::Header => self.extract_header_list(sheet, binding),
            RangeMethod::Fixed => self.extract_fixed_list(sheet, binding),
            RangeMethod::Column => self.extract_column_list(sheet, binding),
        }
    }

    fn sheet(&self, name: &str) -> Result<&Sheet, ExtractError> {
        self.workbook.sheet(name).ok_or_else(|| {
            ExtractError::new(ExtractErrorKind::SheetNotFound)
                .on_sheet(name)
                .with_reason(format!(
                    "no sheet named `{name}` in {}",
                    self.source_label
                ))
                .with_suggestion(format!(
                    "available sheets: {}",
                    self.workbook.sheet_names().join(", ")
                ))
        })
    }

    fn extract_header_list(
        &self,
        sheet: &Sheet,
        binding: &ListBinding,
    ) -> Result<ListExtraction, ExtractError> {
        if binding.field_mappings.is_empty() {
            return Err(ExtractError::new(ExtractErrorKind::InvalidBinding)
                .on_sheet(&binding.sheet_name)
                .with_reason("the header method requires at least one field mapping"));
        }

        let header_row = binding.header_row.unwrap_or(1).max(1);
        let data_start = binding
            .data_start_row
            .unwrap_or(header_row + 1)
            .max(header_row + 1);

        // Case-insensitive header lookup; the first occurrence of a title
        // wins when a sheet repeats it.
        let mut columns_by_title: HashMap<String, u32> = HashMap::new();
        let mut titles = Vec::new();
        for (col, value) in sheet.row_cells(header_row) {
            if value.is_blank() {
                continue;
            }
            let title = value.to_string().trim().to_string();
            columns_by_title
                .entry(title.to_lowercase())
                .or_insert(col);
            titles.push(title);
        }
        if titles.is_empty() {
            return Err(ExtractError::new(ExtractErrorKind::HeaderNotFound)
                .on_sheet(&binding.sheet_name)
                .with_reason(format!("header row {header_row} has no values"))
                .with_suggestion("point headerRow at the row containing the column titles"));
        }

        let mut resolved = Vec::with_capacity(binding.field_mappings.len());
        for mapping in &binding.field_mappings {
            let key = mapping.header_text.trim().to_lowercase();
            let col = columns_by_title.get(&key).copied().ok_or_else(|| {
                ExtractError::new(ExtractErrorKind::HeaderNotFound)
                    .on_sheet(&binding.sheet_name)
                    .with_reason(format!(
                        "no column titled `{}` in row {header_row}",
                        mapping.header_text.trim()
                    ))
                    .with_suggestion(format!("available headers: {}", titles.join(", ")))
            })?;
            resolved.push((mapping.field_name.clone(), col));
        }

        let mut rows = Vec::new();
        for row in data_start..=sheet.last_row() {
            let mut values = Vec::with_capacity(resolved.len());
            let mut any_value = false;
            for (field_name, col) in &resolved {
                let value = sheet
                    .value(row, *col)
                    .cloned()
                    .unwrap_or(CellValue::Empty);
                if !value.is_blank() {
                    any_value = true;
                }
                values.push(FieldValue {
                    field_name: field_name.clone(),
                    value,
                });
            }
            if any_value {
                rows.push(HeaderRow {
                    row_number: row,
                    values,
                });
            }
        }
        if rows.is_empty() {
            return Err(ExtractError::new(ExtractErrorKind::NoDataRows)
                .on_sheet(&binding.sheet_name)
                .with_reason(format!("no data rows at or below row {data_start}"))
                .with_suggestion("add rows beneath the headers or adjust dataStartRow"));
        }

        Ok(ListExtraction::Header {
            mark: binding.mark.clone(),
            sheet_name: binding.sheet_name.clone(),
            rows,
        })
    }

    fn extract_fixed_list(
        &self,
        sheet: &Sheet,
        binding: &ListBinding,
    ) -> Result<ListExtraction, ExtractError> {
        let range_text = binding
            .fixed_range
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ExtractError::new(ExtractErrorKind::InvalidBinding)
                    .on_sheet(&binding.sheet_name)
                    .with_reason("the fixed method requires fixedRange")
                    .with_suggestion("set fixedRange to a corner pair like A2:C50")
            })?;
        let range = RangeAddress::parse(range_text).map_err(|err| {
            ExtractError::new(ExtractErrorKind::InvalidRange)
                .on_sheet(&binding.sheet_name)
                .with_reason(err.to_string())
                .with_suggestion("use a corner pair like A2:C50")
        })?;

        let mut rows = Vec::new();
        for row in range.start_row..=range.end_row {
            let mut cells = Vec::with_capacity(range.width() as usize);
            let mut any_value = false;
            for (offset, col) in (range.start_col..=range.end_col).enumerate() {
                let value = sheet.value(row, col).cloned().unwrap_or(CellValue::Empty);
                if !value.is_blank() {
                    any_value = true;
                }
                let mapping = binding.field_mappings.get(offset);
                cells.push(FixedCell {
                    column: column_to_letters(col),
                    field_name: mapping.and_then(|m| non_empty(&m.field_name)),
                    header_text: mapping.and_then(|m| non_empty(&m.header_text)),
                    value,
                });
            }
            if any_value {
                rows.push(FixedRow {
                    row_number: row,
                    cells,
                });
            }
        }
        if rows.is_empty() {
            return Err(ExtractError::new(ExtractErrorKind::NoDataRows)
                .on_sheet(&binding.sheet_name)
                .with_reason(format!(
                    "range {} has no non-blank rows",
                    range.normalized()
                )));
        }

        Ok(ListExtraction::Fixed {
            mark: binding.mark.clone(),
            sheet_name: binding.sheet_name.clone(),
            rows,
        })
    }

    fn extract_column_list(
        &self,
        sheet: &Sheet,
        binding: &ListBinding,
    ) -> Result<ListExtraction, ExtractError> {
        if binding.columns.is_empty() {
            return Err(ExtractError::new(ExtractErrorKind::InvalidBinding)
                .on_sheet(&binding.sheet_name)
                .with_reason("the column method requires at least one column reference"));
        }

        let data_start = binding.data_start_row.unwrap_or(1).max(1);
        let mut columns = Vec::with_capacity(binding.columns.len());
        for (idx, reference) in binding.columns.iter().enumerate() {
            let letters = normalize_column_reference(reference)
                .and_then(|letters| letters_to_column(&letters).map(|col| (letters, col)));
            let Some((letters, col)) = letters else {
                return Err(ExtractError::new(ExtractErrorKind::InvalidCoordinate)
                    .on_sheet(&binding.sheet_name)
                    .with_reason(format!("column reference `{reference}` cannot be parsed"))
                    .with_suggestion("use a column letter like A, C or A:A"));
            };

            let mut values = Vec::new();
            for row in data_start..=sheet.last_row() {
                if let Some(value) = sheet.value(row, col) {
                    if !value.is_blank() {
                        values.push(ColumnCell {
                            row_number: row,
                            value: value.clone(),
                        });
                    }
                }
            }
            if values.is_empty() {
                return Err(ExtractError::new(ExtractErrorKind::ColumnEmpty)
                    .on_sheet(&binding.sheet_name)
                    .with_reason(format!(
                        "column {letters} has no values at or below row {data_start}"
                    ))
                    .with_suggestion("check the column letter and dataStartRow"));
            }

            let mapping = binding.field_mappings.get(idx);
            columns.push(ColumnValues {
                column: letters,
                field_name: mapping.and_then(|m| non_empty(&m.field_name)),
                header_text: mapping.and_then(|m| non_empty(&m.header_text)),
                values,
            });
        }

        Ok(ListExtraction::Column {
            mark: binding.mark.clone(),
            sheet_name: binding.sheet_name.clone(),
            columns,
        })
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
