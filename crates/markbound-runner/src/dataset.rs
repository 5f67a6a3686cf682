//! Builds the `{d, v}` dataset a renderer consumes.
//!
//! Extraction results land under `d` at the path their mark spells
//! (`d.items[].name` fills `d.items`, an array of row objects with a `name`
//! key); caller-supplied parameter values land under `v`. The tree is plain
//! JSON so any renderer backend can walk it.

use std::collections::{BTreeMap, HashMap};

use markbound_common::{CellValue, field_path, mark_data_path, slugify};
use markbound_contract::DataBinding;
use markbound_extract::{
    ColumnValues, ExtractionResult, FixedCell, FixedRow, HeaderRow, ListExtraction, coerce,
};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::RunError;
use crate::log::RunLog;

/// The assembled dataset, split into extracted data (`d`) and parameters
/// (`v`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub d: Map<String, JsonValue>,
    pub v: Map<String, JsonValue>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Merge extraction results and parameter values into one dataset.
///
/// `results` holds one entry per extracted `single`/`list` binding, keyed by
/// mark; `parameters` maps parameter marks to the raw values the caller
/// supplied. Parameter values are coerced to the binding's declared type and
/// a blank or absent value fails the run; `defaultValue` is designer
/// documentation, not a fallback.
pub fn assemble(
    bindings: &[DataBinding],
    results: &[ExtractionResult],
    parameters: &HashMap<String, String>,
    log: &mut RunLog,
) -> Result<Dataset, RunError> {
    let by_mark: HashMap<&str, &ExtractionResult> =
        results.iter().map(|result| (result.mark(), result)).collect();

    let mut dataset = Dataset::new();
    for binding in bindings {
        match binding {
            DataBinding::Single(single) => {
                let Some(result) = by_mark.get(single.mark.as_str()) else {
                    log.warn_with("no extraction result for binding", &single.mark);
                    continue;
                };
                if let ExtractionResult::Single(extracted) = result {
                    insert_at_mark(&mut dataset.d, &single.mark, extracted.value.to_json(), log);
                }
            }
            DataBinding::List(list) => {
                let Some(result) = by_mark.get(list.mark.as_str()) else {
                    log.warn_with("no extraction result for binding", &list.mark);
                    continue;
                };
                if let ExtractionResult::List(extracted) = result {
                    let rows = match extracted {
                        ListExtraction::Header { rows, .. } => header_rows_to_objects(rows),
                        ListExtraction::Fixed { rows, .. } => fixed_rows_to_objects(rows),
                        ListExtraction::Column { columns, .. } => column_lists_to_objects(columns),
                    };
                    insert_at_mark(&mut dataset.d, &list.mark, rows, log);
                }
            }
            DataBinding::Parameter(parameter) => {
                let supplied = parameters
                    .get(&parameter.mark)
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty());
                let Some(raw) = supplied else {
                    return Err(RunError::ParameterMissing {
                        mark: parameter.mark.clone(),
                        label: parameter.display_label.clone(),
                    });
                };
                let coerced = coerce(CellValue::Text(raw.to_string()), parameter.data_type.into())
                    .map_err(|err| RunError::ParameterInvalid {
                        mark: parameter.mark.clone(),
                        label: parameter.display_label.clone(),
                        reason: err.to_string(),
                    })?;
                insert_at_mark(&mut dataset.v, &parameter.mark, coerced.to_json(), log);
            }
            DataBinding::Skip(_) => {}
        }
    }
    Ok(dataset)
}

fn insert_at_mark(
    root: &mut Map<String, JsonValue>,
    mark: &str,
    value: JsonValue,
    log: &mut RunLog,
) {
    let segments = mark_data_path(mark);
    if segments.is_empty() {
        log.warn_with("mark has no dataset path; value dropped", mark);
        return;
    }
    assign_deep(root, &segments, value);
}

/// Write `value` at the nested path, creating intermediate objects. An
/// intermediate that already holds a non-object (a single wrote `d.report`
/// before a list writes `d.report.rows`) is replaced by an object; last
/// writer wins.
pub(crate) fn assign_deep(
    root: &mut Map<String, JsonValue>,
    segments: &[String],
    value: JsonValue,
) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut cursor = root;
    for segment in parents {
        let slot = cursor
            .entry(segment.clone())
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if !slot.is_object() {
            *slot = JsonValue::Object(Map::new());
        }
        match slot {
            JsonValue::Object(map) => cursor = map,
            _ => unreachable!("slot was just made an object"),
        }
    }
    cursor.insert(last.clone(), value);
}

/// Header-method rows become objects keyed by field name, with dotted names
/// nesting (`customer.name` gives `{"customer":{"name":...}}`).
fn header_rows_to_objects(rows: &[HeaderRow]) -> JsonValue {
    let objects = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for field in &row.values {
                let segments = field_path(&field.field_name);
                if segments.is_empty() {
                    continue;
                }
                assign_deep(&mut object, &segments, field.value.to_json());
            }
            JsonValue::Object(object)
        })
        .collect();
    JsonValue::Array(objects)
}

/// Fixed-range rows become flat objects. Key precedence per cell: the
/// mapping's field name, else the slug of the header text, else the
/// lower-cased column letter.
fn fixed_rows_to_objects(rows: &[FixedRow]) -> JsonValue {
    let objects = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for cell in &row.cells {
                object.insert(fixed_cell_key(cell), cell.value.to_json());
            }
            JsonValue::Object(object)
        })
        .collect();
    JsonValue::Array(objects)
}

fn fixed_cell_key(cell: &FixedCell) -> String {
    if let Some(name) = cell.field_name.as_deref() {
        return name.to_string();
    }
    if let Some(header) = cell.header_text.as_deref() {
        let slug = slugify(header);
        if !slug.is_empty() {
            return slug;
        }
    }
    cell.column.to_ascii_lowercase()
}

/// Column-method values regroup into row objects: cells from different
/// columns that share a row number join one object, rows come out in
/// ascending row order, and a row only exists where at least one column had
/// a value.
fn column_lists_to_objects(columns: &[ColumnValues]) -> JsonValue {
    let mut rows: BTreeMap<u32, Map<String, JsonValue>> = BTreeMap::new();
    for column in columns {
        let key = column_key(column);
        for cell in &column.values {
            rows.entry(cell.row_number)
                .or_default()
                .insert(key.clone(), cell.value.to_json());
        }
    }
    JsonValue::Array(rows.into_values().map(JsonValue::Object).collect())
}

fn column_key(column: &ColumnValues) -> String {
    if let Some(name) = column.field_name.as_deref() {
        return name.to_string();
    }
    if let Some(header) = column.header_text.as_deref() {
        let slug = slugify(header);
        if !slug.is_empty() {
            return slug;
        }
    }
    column.column.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use markbound_common::CellValue;
    use markbound_contract::{ParamType, ParameterBinding, SingleBinding};
    use markbound_extract::{ColumnCell, FieldValue, SingleExtraction};
    use serde_json::json;

    fn single_binding(mark: &str) -> DataBinding {
        DataBinding::Single(SingleBinding {
            mark: mark.to_string(),
            data_source: "sales".to_string(),
            sheet_name: "Summary".to_string(),
            cell_coordinate: "B2".to_string(),
            data_type: None,
        })
    }

    fn parameter_binding(mark: &str, ty: ParamType) -> DataBinding {
        DataBinding::Parameter(ParameterBinding {
            mark: mark.to_string(),
            display_label: "Issued by".to_string(),
            data_type: ty,
            default_value: Some("fallback".to_string()),
        })
    }

    fn single_result(mark: &str, value: CellValue) -> ExtractionResult {
        ExtractionResult::Single(SingleExtraction {
            mark: mark.to_string(),
            sheet_name: "Summary".to_string(),
            value,
        })
    }

    #[test]
    fn assign_deep_nests_and_replaces_non_objects() {
        let mut root = Map::new();
        assign_deep(
            &mut root,
            &["report".into(), "month".into()],
            json!("2023-05"),
        );
        assign_deep(&mut root, &["report".into(), "total".into()], json!(9.5));
        assert_eq!(
            JsonValue::Object(root.clone()),
            json!({"report": {"month": "2023-05", "total": 9.5}})
        );

        // a scalar in the way of a deeper write is replaced
        assign_deep(&mut root, &["report".into()], json!(1));
        assign_deep(&mut root, &["report".into(), "rows".into()], json!([]));
        assert_eq!(
            JsonValue::Object(root),
            json!({"report": {"rows": []}})
        );
    }

    #[test]
    fn header_rows_explode_dotted_field_names() {
        let rows = vec![HeaderRow {
            row_number: 2,
            values: vec![
                FieldValue {
                    field_name: "customer.name".into(),
                    value: CellValue::Text("ACME".into()),
                },
                FieldValue {
                    field_name: "amount".into(),
                    value: CellValue::Number(12.0),
                },
            ],
        }];
        assert_eq!(
            header_rows_to_objects(&rows),
            json!([{"customer": {"name": "ACME"}, "amount": 12}])
        );
    }

    #[test]
    fn fixed_cells_fall_back_from_field_name_to_slug_to_column() {
        let rows = vec![FixedRow {
            row_number: 2,
            cells: vec![
                FixedCell {
                    column: "A".into(),
                    field_name: Some("name".into()),
                    header_text: Some("Full Name".into()),
                    value: CellValue::Text("ACME".into()),
                },
                FixedCell {
                    column: "B".into(),
                    field_name: None,
                    header_text: Some("Unit Price ($)".into()),
                    value: CellValue::Number(3.0),
                },
                FixedCell {
                    column: "C".into(),
                    field_name: None,
                    header_text: None,
                    value: CellValue::Bool(true),
                },
            ],
        }];
        assert_eq!(
            fixed_rows_to_objects(&rows),
            json!([{"name": "ACME", "unit_price": 3, "c": true}])
        );
    }

    #[test]
    fn column_values_regroup_into_rows_in_ascending_order() {
        let columns = vec![
            ColumnValues {
                column: "A".into(),
                field_name: Some("product".into()),
                header_text: None,
                values: vec![
                    ColumnCell {
                        row_number: 4,
                        value: CellValue::Text("Late".into()),
                    },
                    ColumnCell {
                        row_number: 2,
                        value: CellValue::Text("Early".into()),
                    },
                ],
            },
            ColumnValues {
                column: "B".into(),
                field_name: None,
                header_text: None,
                values: vec![ColumnCell {
                    row_number: 2,
                    value: CellValue::Number(5.0),
                }],
            },
        ];
        // row 3 never appears: no column had a value there
        assert_eq!(
            column_lists_to_objects(&columns),
            json!([
                {"product": "Early", "b": 5},
                {"product": "Late"}
            ])
        );
    }

    #[test]
    fn assemble_routes_singles_and_parameters() {
        let bindings = vec![
            single_binding("d.report.month"),
            parameter_binding("v.issuedBy", ParamType::Text),
        ];
        let results = vec![single_result(
            "d.report.month",
            CellValue::Text("May".into()),
        )];
        let parameters = HashMap::from([("v.issuedBy".to_string(), "Kim".to_string())]);

        let mut log = RunLog::new();
        let dataset = assemble(&bindings, &results, &parameters, &mut log).unwrap();
        assert_eq!(
            serde_json::to_value(&dataset).unwrap(),
            json!({"d": {"report": {"month": "May"}}, "v": {"issuedBy": "Kim"}})
        );
    }

    #[test]
    fn blank_parameter_fails_even_with_a_default() {
        let bindings = vec![parameter_binding("v.issuedBy", ParamType::Text)];
        let parameters = HashMap::from([("v.issuedBy".to_string(), "   ".to_string())]);

        let mut log = RunLog::new();
        let err = assemble(&bindings, &[], &parameters, &mut log).unwrap_err();
        assert_eq!(err.code(), "PARAMETER_MISSING");
        assert!(err.to_string().contains("Issued by"));
    }

    #[test]
    fn parameter_of_wrong_type_fails() {
        let bindings = vec![parameter_binding("v.count", ParamType::Number)];
        let parameters = HashMap::from([("v.count".to_string(), "twelve".to_string())]);

        let mut log = RunLog::new();
        let err = assemble(&bindings, &[], &parameters, &mut log).unwrap_err();
        assert_eq!(err.code(), "PARAMETER_INVALID");
    }

    #[test]
    fn parameter_number_coerces_before_insert() {
        let bindings = vec![parameter_binding("v.count", ParamType::Number)];
        let parameters = HashMap::from([("v.count".to_string(), " 12.5 ".to_string())]);

        let mut log = RunLog::new();
        let dataset = assemble(&bindings, &[], &parameters, &mut log).unwrap();
        assert_eq!(
            serde_json::to_value(&dataset).unwrap(),
            json!({"d": {}, "v": {"count": 12.5}})
        );
    }

    #[test]
    fn missing_extraction_result_warns_and_skips() {
        let bindings = vec![single_binding("d.total")];
        let mut log = RunLog::new();
        let dataset = assemble(&bindings, &[], &HashMap::new(), &mut log).unwrap();
        assert!(dataset.d.is_empty());
        assert!(
            log.entries()
                .iter()
                .any(|entry| entry.context.as_deref() == Some("d.total"))
        );
    }
}
