//! The report-contract model.
//!
//! A contract pairs a spreadsheet template with the bindings that tell the
//! extraction engine where each mark's data lives. The wire format is the
//! camelCase JSON the desktop editors exchange; YAML documents wrap it with a
//! versioned header (see `document.rs`).

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use markbound_common::{
    CellAddress, MarkKind, RangeAddress, is_complement_mark, is_data_mark, is_parameter_mark,
    normalize_column_reference,
};

use crate::validation::{ContractIssue, ValidationError};

/// Declared type for a single-cell binding. `Auto` keeps whatever the cell
/// holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Auto,
    Text,
    Number,
    Date,
}

/// Declared type for a runtime parameter. Parameters always coerce, so there
/// is no `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Text,
    Number,
    Date,
}

impl From<ParamType> for DataType {
    fn from(ty: ParamType) -> Self {
        match ty {
            ParamType::Text => DataType::Text,
            ParamType::Number => DataType::Number,
            ParamType::Date => DataType::Date,
        }
    }
}

/// Addressing strategy for a list binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RangeMethod {
    /// Columns found by header text in a header row.
    Header,
    /// A fixed rectangular range, columns paired positionally.
    Fixed,
    /// Whole columns referenced by letter.
    Column,
}

/// Maps a dataset field name to the header text that locates its column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FieldMapping {
    pub field_name: String,
    pub header_text: String,
}

/// One scalar cell bound to a `single` mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SingleBinding {
    pub mark: String,
    /// Id of the data source supplying the workbook.
    pub data_source: String,
    pub sheet_name: String,
    /// A1-style coordinate; `$` anchors are ignored.
    pub cell_coordinate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

/// A table region bound to a `list` mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ListBinding {
    pub mark: String,
    pub data_source: String,
    pub sheet_name: String,
    pub range_method: RangeMethod,
    /// Header method: 1-based header row, defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_row: Option<u32>,
    /// First data row; defaults below the header (header method) or 1
    /// (column method).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_start_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_mappings: Vec<FieldMapping>,
    /// Fixed method: `A2:C50`-style range, corners in any order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_range: Option<String>,
    /// Column method: references like `A`, `C:C` or `Sheet1!D`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
}

/// A runtime value the caller must supply for a `v.*` mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ParameterBinding {
    pub mark: String,
    /// Label shown when prompting for the value.
    pub display_label: String,
    pub data_type: ParamType,
    /// Recorded for editors; the engine never substitutes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Explicitly leaves a mark unbound so runs skip it without complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SkipBinding {
    pub mark: String,
    pub mark_kind: MarkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A mark binding, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataBinding {
    Single(SingleBinding),
    List(ListBinding),
    Parameter(ParameterBinding),
    Skip(SkipBinding),
}

impl DataBinding {
    pub fn mark(&self) -> &str {
        match self {
            DataBinding::Single(b) => &b.mark,
            DataBinding::List(b) => &b.mark,
            DataBinding::Parameter(b) => &b.mark,
            DataBinding::Skip(b) => &b.mark,
        }
    }

    pub fn mark_kind(&self) -> MarkKind {
        match self {
            DataBinding::Single(_) => MarkKind::Single,
            DataBinding::List(_) => MarkKind::List,
            DataBinding::Parameter(_) => MarkKind::Parameter,
            DataBinding::Skip(b) => b.mark_kind,
        }
    }

    /// Data-source id, for the binding kinds that read a workbook.
    pub fn data_source(&self) -> Option<&str> {
        match self {
            DataBinding::Single(b) => Some(&b.data_source),
            DataBinding::List(b) => Some(&b.data_source),
            DataBinding::Parameter(_) | DataBinding::Skip(_) => None,
        }
    }
}

/// One uploadable spreadsheet slot within a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub name: String,
}

/// The unsaved subset of a contract, used for draft test runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ContractDraft {
    pub template_path: String,
    pub template_file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_checksum: Option<String>,
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub bindings: Vec<DataBinding>,
}

/// A saved report contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ReportContract {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub template_path: String,
    pub template_file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_checksum: Option<String>,
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub bindings: Vec<DataBinding>,
    /// Storage-provided timestamps, carried verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ReportContract {
    /// Validate the contract and return granular issues when invariants fail.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push(ContractIssue::new(
                "name",
                "contract name must not be empty",
            ));
        }

        validate_shared(&self.data_sources, &self.bindings, &mut issues);

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

impl ContractDraft {
    /// Drafts carry no name or id; everything else validates like a saved
    /// contract.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        validate_shared(&self.data_sources, &self.bindings, &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

fn validate_shared(
    data_sources: &[DataSource],
    bindings: &[DataBinding],
    issues: &mut Vec<ContractIssue>,
) {
    let mut seen_sources = HashSet::new();
    for (idx, source) in data_sources.iter().enumerate() {
        let path = format!("dataSources[{idx}].id");
        if source.id.trim().is_empty() {
            issues.push(ContractIssue::new(path, "data source id must not be empty"));
        } else if !seen_sources.insert(source.id.as_str()) {
            issues.push(ContractIssue::new(
                path,
                format!("duplicate data source id `{}`", source.id),
            ));
        }
    }

    let mut seen_marks: HashSet<&str> = HashSet::new();
    for (idx, binding) in bindings.iter().enumerate() {
        let mark = binding.mark().trim();
        let mark_path = format!("bindings[{idx}].mark");

        if mark.is_empty() {
            issues.push(ContractIssue::new(mark_path.clone(), "mark must not be empty"));
        } else if !seen_marks.insert(mark) {
            issues.push(ContractIssue::new(
                mark_path.clone(),
                format!("duplicate mark `{mark}`"),
            ));
        }

        if !mark.is_empty() {
            validate_mark_prefix(binding, mark, &mark_path, issues);
        }

        if let Some(source_id) = binding.data_source() {
            if !data_sources.iter().any(|s| s.id == source_id) {
                issues.push(ContractIssue::new(
                    format!("bindings[{idx}].dataSource"),
                    format!("unknown data source `{source_id}`"),
                ));
            }
        }

        match binding {
            DataBinding::Single(b) => validate_single(b, idx, issues),
            DataBinding::List(b) => validate_list(b, idx, issues),
            DataBinding::Parameter(b) => {
                if b.display_label.trim().is_empty() {
                    issues.push(ContractIssue::new(
                        format!("bindings[{idx}].displayLabel"),
                        "displayLabel must not be empty",
                    ));
                }
            }
            DataBinding::Skip(_) => {}
        }
    }
}

fn validate_mark_prefix(
    binding: &DataBinding,
    mark: &str,
    path: &str,
    issues: &mut Vec<ContractIssue>,
) {
    match binding {
        DataBinding::Single(_) | DataBinding::List(_) => {
            if !is_data_mark(mark) && !is_complement_mark(mark) {
                issues.push(ContractIssue::new(
                    path,
                    format!("`{mark}` cannot bind spreadsheet data; only d.* and c.* marks can"),
                ));
            }
        }
        DataBinding::Parameter(_) => {
            if !is_parameter_mark(mark) {
                issues.push(ContractIssue::new(
                    path,
                    format!("`{mark}` is not a parameter mark; parameters use the v.* namespace"),
                ));
            }
        }
        DataBinding::Skip(_) => {}
    }
}

fn validate_single(binding: &SingleBinding, idx: usize, issues: &mut Vec<ContractIssue>) {
    if let Err(err) = CellAddress::parse(&binding.cell_coordinate) {
        issues.push(ContractIssue::new(
            format!("bindings[{idx}].cellCoordinate"),
            err.to_string(),
        ));
    }
}

fn validate_list(binding: &ListBinding, idx: usize, issues: &mut Vec<ContractIssue>) {
    match binding.range_method {
        RangeMethod::Header => {
            if binding.field_mappings.is_empty() {
                issues.push(ContractIssue::new(
                    format!("bindings[{idx}].fieldMappings"),
                    "the header method requires at least one field mapping",
                ));
            }
            for (m_idx, mapping) in binding.field_mappings.iter().enumerate() {
                if mapping.field_name.trim().is_empty() {
                    issues.push(ContractIssue::new(
                        format!("bindings[{idx}].fieldMappings[{m_idx}].fieldName"),
                        "fieldName must not be empty",
                    ));
                }
                if mapping.header_text.trim().is_empty() {
                    issues.push(ContractIssue::new(
                        format!("bindings[{idx}].fieldMappings[{m_idx}].headerText"),
                        "headerText must not be empty",
                    ));
                }
            }
        }
        RangeMethod::Fixed => match binding.fixed_range.as_deref().map(str::trim) {
            None | Some("") => {
                issues.push(ContractIssue::new(
                    format!("bindings[{idx}].fixedRange"),
                    "the fixed method requires fixedRange, e.g. A2:C50",
                ));
            }
            Some(range) => {
                if let Err(err) = RangeAddress::parse(range) {
                    issues.push(ContractIssue::new(
                        format!("bindings[{idx}].fixedRange"),
                        err.to_string(),
                    ));
                }
            }
        },
        RangeMethod::Column => {
            if binding.columns.is_empty() {
                issues.push(ContractIssue::new(
                    format!("bindings[{idx}].columns"),
                    "the column method requires at least one column reference",
                ));
            }
            for (c_idx, reference) in binding.columns.iter().enumerate() {
                if normalize_column_reference(reference).is_none() {
                    issues.push(ContractIssue::new(
                        format!("bindings[{idx}].columns[{c_idx}]"),
                        format!("column reference `{reference}` cannot be parsed; use A, C or A:A"),
                    ));
                }
            }
        }
    }
}
