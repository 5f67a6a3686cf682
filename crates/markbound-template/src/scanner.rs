//! Workbook scanning: find every mark a template exposes.

use std::path::Path;

use rustc_hash::FxHashSet;

use markbound_common::{CellAddress, CellValue, MarkItem};
use markbound_sheet::{Workbook, open_workbook_file};

use crate::classify::{Classification, MARK_PATTERN, classify_token};
use crate::error::TemplateError;

/// Scan every text cell and return the distinct marks in first-seen order
/// (sheets in workbook order, cells row-major).
///
/// Control tokens and sample rows are skipped silently; empty or unsupported
/// tokens abort the scan with the offending location.
pub fn scan_workbook(workbook: &Workbook) -> Result<Vec<MarkItem>, TemplateError> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut marks = Vec::new();

    for sheet in workbook.sheets() {
        for (row, col, value) in sheet.cells() {
            let CellValue::Text(text) = value else {
                continue;
            };
            if !text.contains('{') {
                continue;
            }
            for token in MARK_PATTERN.find_iter(text) {
                let inner = strip_braces(token.as_str());
                match classify_token(inner) {
                    Classification::Mark(item) => {
                        if seen.insert(item.mark.clone()) {
                            marks.push(item);
                        }
                    }
                    Classification::Control | Classification::SampleRow => {}
                    Classification::Empty => {
                        return Err(TemplateError::EmptyMark {
                            sheet: sheet.name().to_string(),
                            cell: CellAddress::new(row, col).to_a1(),
                        });
                    }
                    Classification::Unsupported => {
                        return Err(TemplateError::UnsupportedMark {
                            sheet: sheet.name().to_string(),
                            cell: CellAddress::new(row, col).to_a1(),
                            expression: inner.trim().to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(marks)
}

/// Load a template workbook from disk and scan it.
pub fn parse_template(path: impl AsRef<Path>) -> Result<Vec<MarkItem>, TemplateError> {
    let workbook = open_workbook_file(path)?;
    scan_workbook(&workbook)
}

fn strip_braces(token: &str) -> &str {
    token.trim_start_matches('{').trim_end_matches('}')
}

#[cfg(test)]
mod tests {
    use markbound_common::MarkKind;

    use super::*;

    fn marks(workbook: &Workbook) -> Vec<(String, MarkKind)> {
        scan_workbook(workbook)
            .expect("scan should succeed")
            .into_iter()
            .map(|item| (item.mark, item.kind))
            .collect()
    }

    #[test]
    fn collects_marks_in_first_seen_order() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_sheet("Report");
        sheet.set(1, 1, "Issued by {v.issuedBy}");
        sheet.set(2, 1, "{d.customer.name}");
        sheet.set(4, 1, "{d.items[].name}");
        sheet.set(4, 2, "{d.items[].price:formatNumber(2)}");

        assert_eq!(
            marks(&workbook),
            vec![
                ("v.issuedBy".to_string(), MarkKind::Parameter),
                ("d.customer.name".to_string(), MarkKind::Single),
                ("d.items[].name".to_string(), MarkKind::List),
                ("d.items[].price".to_string(), MarkKind::List),
            ]
        );
    }

    #[test]
    fn dedupes_repeated_marks_keeping_the_first_kind() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_sheet("Report");
        sheet.set(1, 1, "{d.total} and again {d.total}");
        sheet.set(2, 1, "{ d . total }");

        assert_eq!(
            marks(&workbook),
            vec![("d.total".to_string(), MarkKind::Single)]
        );
    }

    #[test]
    fn double_braces_parse_as_one_token() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_sheet("Report");
        sheet.set(1, 1, "{{d.customer.name}} owes {{d.total}}");

        assert_eq!(
            marks(&workbook),
            vec![
                ("d.customer.name".to_string(), MarkKind::Single),
                ("d.total".to_string(), MarkKind::Single),
            ]
        );
    }

    #[test]
    fn control_tokens_and_sample_rows_do_not_surface() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_sheet("Report");
        sheet.set(1, 1, "{t(A1:C9)}");
        sheet.set(2, 1, "{#section}{d.rows[i].qty}{/section}");
        sheet.set(3, 1, "{d.rows[i+1].qty}");
        sheet.set(4, 1, "{o.pageBreak}");

        assert_eq!(
            marks(&workbook),
            vec![("d.rows[i].qty".to_string(), MarkKind::List)]
        );
    }

    #[test]
    fn non_text_cells_are_ignored() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_sheet("Report");
        sheet.set(1, 1, 12.5);
        sheet.set(1, 2, true);
        sheet.set(2, 1, "{d.only}");

        assert_eq!(
            marks(&workbook),
            vec![("d.only".to_string(), MarkKind::Single)]
        );
    }

    #[test]
    fn empty_mark_reports_sheet_and_cell() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_sheet("Report");
        sheet.set(3, 2, "{  }");

        let err = scan_workbook(&workbook).expect_err("scan should fail");
        match err {
            TemplateError::EmptyMark { sheet, cell } => {
                assert_eq!(sheet, "Report");
                assert_eq!(cell, "B3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unsupported_mark_reports_the_expression() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_sheet("Report");
        sheet.set(2, 3, "{customer.name}");

        let err = scan_workbook(&workbook).expect_err("scan should fail");
        match err {
            TemplateError::UnsupportedMark {
                sheet,
                cell,
                expression,
            } => {
                assert_eq!(sheet, "Report");
                assert_eq!(cell, "C2");
                assert_eq!(expression, "customer.name");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn marks_collect_across_sheets_in_workbook_order() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Cover").set(1, 1, "{v.title}");
        workbook.add_sheet("Body").set(1, 1, "{d.rows[].item}");

        assert_eq!(
            marks(&workbook),
            vec![
                ("v.title".to_string(), MarkKind::Parameter),
                ("d.rows[].item".to_string(), MarkKind::List),
            ]
        );
    }
}
