//! Declared-type coercion for single cells and parameter values.

use std::{error::Error, fmt};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use markbound_common::{CellValue, datetime_to_serial};
use markbound_contract::DataType;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Why a value refused to become the declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    pub wanted: DataType,
    pub reason: String,
}

impl CoerceError {
    fn new(wanted: DataType, reason: impl Into<String>) -> Self {
        Self {
            wanted,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (wanted {})", self.reason, type_name(self.wanted))
    }
}

impl Error for CoerceError {}

pub fn type_name(wanted: DataType) -> &'static str {
    match wanted {
        DataType::Auto => "auto",
        DataType::Text => "text",
        DataType::Number => "number",
        DataType::Date => "date",
    }
}

/// Coerce a cell value to the declared type.
///
/// Blank values pass through untouched regardless of the declared type;
/// whether a blank is acceptable is the caller's decision.
pub fn coerce(value: CellValue, wanted: DataType) -> Result<CellValue, CoerceError> {
    if value.is_blank() {
        return Ok(value);
    }
    match wanted {
        DataType::Auto => Ok(value),
        DataType::Text => Ok(coerce_text(value)),
        DataType::Number => coerce_number(value),
        DataType::Date => coerce_date(value),
    }
}

fn coerce_text(value: CellValue) -> CellValue {
    match value {
        CellValue::Text(_) => value,
        other => CellValue::Text(other.to_string()),
    }
}

fn coerce_number(value: CellValue) -> Result<CellValue, CoerceError> {
    match value {
        CellValue::Number(_) | CellValue::Int(_) => Ok(value),
        CellValue::Bool(b) => Ok(CellValue::Int(if b { 1 } else { 0 })),
        CellValue::DateTime(dt) => Ok(CellValue::Number(datetime_to_serial(&dt))),
        CellValue::Text(text) => {
            let parsed = text.trim().parse::<f64>().ok().filter(|n| n.is_finite());
            match parsed {
                Some(n) => Ok(CellValue::Number(n)),
                None => Err(CoerceError::new(
                    DataType::Number,
                    format!("`{text}` is not a number"),
                )),
            }
        }
        CellValue::Empty => Ok(CellValue::Empty),
    }
}

fn coerce_date(value: CellValue) -> Result<CellValue, CoerceError> {
    match value {
        CellValue::DateTime(_) => Ok(value),
        CellValue::Text(text) => {
            let trimmed = text.trim();
            for format in DATETIME_FORMATS {
                if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                    return Ok(CellValue::DateTime(dt));
                }
            }
            for format in DATE_FORMATS {
                if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
                    return Ok(CellValue::DateTime(d.and_time(NaiveTime::MIN)));
                }
            }
            Err(CoerceError::new(
                DataType::Date,
                format!("`{text}` is not a date"),
            ))
        }
        other => Err(CoerceError::new(
            DataType::Date,
            format!("{other} is not a date"),
        )),
    }
}
