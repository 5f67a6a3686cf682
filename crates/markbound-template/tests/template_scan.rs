// End-to-end scan of a template written to disk, through the xlsx loader.

use std::path::PathBuf;

use markbound_common::MarkKind;
use markbound_template::{TemplateError, parse_template};

fn build_template(
    build: impl FnOnce(&mut umya_spreadsheet::Workbook),
) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("template.xlsx");
    let mut book = umya_spreadsheet::new_file();
    build(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write xlsx template");
    (dir, path)
}

#[test]
fn parses_a_realistic_invoice_template() {
    let (_dir, path) = build_template(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut((1, 1)).set_value("Invoice for {d.customer.name}"); // A1
        sh.get_cell_mut((1, 2)).set_value("Issued by {v.issuedBy}"); // A2
        sh.get_cell_mut((1, 4)).set_value("{d.items[].name}"); // A4
        sh.get_cell_mut((2, 4)).set_value("{d.items[].price:formatNumber(2)}"); // B4
        sh.get_cell_mut((1, 5)).set_value("{d.items[i+1].name}"); // A5, sample row
        sh.get_cell_mut((1, 7)).set_value("Total: {d.total}"); // A7
        sh.get_cell_mut((1, 9)).set_value("{o.sheetName}"); // A9, control
    });

    let marks: Vec<(String, MarkKind)> = parse_template(&path)
        .expect("template should parse")
        .into_iter()
        .map(|item| (item.mark, item.kind))
        .collect();

    assert_eq!(
        marks,
        vec![
            ("d.customer.name".to_string(), MarkKind::Single),
            ("v.issuedBy".to_string(), MarkKind::Parameter),
            ("d.items[].name".to_string(), MarkKind::List),
            ("d.items[].price".to_string(), MarkKind::List),
            ("d.total".to_string(), MarkKind::Single),
        ]
    );
}

#[test]
fn unsupported_mark_in_a_file_names_the_cell() {
    let (_dir, path) = build_template(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut((2, 2)).set_value("{who.knows}"); // B2
    });

    let err = parse_template(&path).expect_err("parse should fail");
    match err {
        TemplateError::UnsupportedMark { sheet, cell, expression } => {
            assert_eq!(sheet, "Sheet1");
            assert_eq!(cell, "B2");
            assert_eq!(expression, "who.knows");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_template_file_surfaces_the_io_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("gone.xlsx");
    let err = parse_template(&path).expect_err("parse should fail");
    assert!(matches!(err, TemplateError::Io(_)), "{err}");
}
