//! Spreadsheet file loading via calamine.
//!
//! `open_workbook_auto` picks the backend from the file signature, so the
//! same entry point covers `.xlsx`, `.xlsm`, `.xlsb`, `.xls` and `.ods`.
//! Formula cells surface their cached result only; a formula with no cached
//! value loads as a missing cell. Error cells (`#N/A` and friends) carry no
//! data for extraction purposes and load as missing too.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use markbound_common::{CellValue, serial_to_datetime};

use crate::error::SheetIoError;
use crate::workbook::Workbook;

/// Load a spreadsheet file into an in-memory [`Workbook`].
pub fn open_workbook_file(path: impl AsRef<Path>) -> Result<Workbook, SheetIoError> {
    let path = path.as_ref();
    let mut source = open_workbook_auto(path).map_err(|source| SheetIoError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut workbook = Workbook::new();
    let names: Vec<String> = source.sheet_names().to_vec();
    for name in names {
        let range = source
            .worksheet_range(&name)
            .map_err(|source| SheetIoError::Worksheet {
                path: path.to_path_buf(),
                sheet: name.clone(),
                source,
            })?;

        let sheet = workbook.add_sheet(name);
        let Some((base_row, base_col)) = range.start() else {
            continue;
        };
        for (r, c, data) in range.used_cells() {
            if let Some(value) = convert_cell(data) {
                sheet.set(base_row + r as u32 + 1, base_col + c as u32 + 1, value);
            }
        }
    }
    Ok(workbook)
}

fn convert_cell(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Int(*i)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(if dt.is_datetime() {
            CellValue::DateTime(serial_to_datetime(dt.as_f64()))
        } else {
            // Duration-formatted serials stay numeric.
            CellValue::Number(dt.as_f64())
        }),
        Data::DateTimeIso(s) => Some(
            parse_iso_datetime(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::DateTime),
        ),
        Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}
