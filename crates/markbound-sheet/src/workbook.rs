//! In-memory workbook snapshots.
//!
//! A `Workbook` is the engine's only view of a spreadsheet: ordered sheets
//! over a sparse `BTreeMap<(row, col), CellValue>` grid, 1-based on both
//! axes. Loaders fill one in; extraction only ever reads. The invariant on
//! the grid is that stored cells are never `CellValue::Empty`, so "the cell
//! exists" and "the cell holds something" stay distinguishable, while empty
//! text still counts as a present (but blank) cell.

use std::collections::BTreeMap;

use markbound_common::CellValue;

use crate::error::SheetError;

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a sheet, preserving insertion order.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> &mut Sheet {
        let name = name.into();
        match self.sheets.iter().position(|s| s.name == name) {
            Some(idx) => &mut self.sheets[idx],
            None => {
                self.sheets.push(Sheet::new(name));
                let idx = self.sheets.len() - 1;
                &mut self.sheets[idx]
            }
        }
    }

    /// Exact-name sheet lookup.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Convenience setter used by embedders and tests.
    pub fn set_value(
        &mut self,
        sheet: &str,
        row: u32,
        col: u32,
        value: impl Into<CellValue>,
    ) -> Result<(), SheetError> {
        if row < 1 || col < 1 {
            return Err(SheetError::InvalidIndex { row, col });
        }
        let sheet = self
            .sheet_mut(sheet)
            .ok_or_else(|| SheetError::UnknownSheet(sheet.to_string()))?;
        sheet.set(row, col, value);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
    max_row: u32,
    max_col: u32,
}

impl Sheet {
    fn new(name: String) -> Self {
        Self {
            name,
            cells: BTreeMap::new(),
            max_row: 0,
            max_col: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a cell. Setting `Empty` clears instead, keeping the grid sparse.
    pub fn set(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        debug_assert!(row >= 1 && col >= 1, "cell indexes are 1-based");
        let value = value.into();
        if matches!(value, CellValue::Empty) {
            self.cells.remove(&(row, col));
            return;
        }
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
        self.cells.insert((row, col), value);
    }

    /// `None` when the cell was never written.
    pub fn value(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Highest row carrying any cell, 0 for an empty sheet.
    pub fn last_row(&self) -> u32 {
        self.max_row
    }

    /// Highest column carrying any cell, 0 for an empty sheet.
    pub fn last_col(&self) -> u32 {
        self.max_col
    }

    /// True when the row has at least one stored cell. Empty text counts as
    /// present here; blankness filtering happens later, per value.
    pub fn row_has_values(&self, row: u32) -> bool {
        self.row_cells(row).next().is_some()
    }

    /// Stored cells of one row as `(col, value)`, ascending by column.
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = (u32, &CellValue)> + '_ {
        self.cells
            .range((row, 1)..=(row, u32::MAX))
            .map(|((_, col), value)| (*col, value))
    }

    /// All stored cells in row-major order as `(row, col, value)`.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, &CellValue)> + '_ {
        self.cells
            .iter()
            .map(|((row, col), value)| (*row, *col, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Workbook {
        let mut wb = Workbook::new();
        let sheet = wb.add_sheet("Data");
        sheet.set(1, 1, "Name");
        sheet.set(1, 2, "Age");
        sheet.set(2, 1, "Ada");
        sheet.set(2, 2, 36i64);
        sheet.set(5, 4, 1.5);
        wb
    }

    #[test]
    fn add_sheet_is_get_or_create_in_order() {
        let mut wb = Workbook::new();
        wb.add_sheet("B");
        wb.add_sheet("A");
        wb.add_sheet("B").set(1, 1, "x");
        assert_eq!(wb.sheet_names(), vec!["B", "A"]);
        assert_eq!(
            wb.sheet("B").unwrap().value(1, 1),
            Some(&CellValue::Text("x".into()))
        );
    }

    #[test]
    fn tracks_extents_sparsely() {
        let wb = sample();
        let sheet = wb.sheet("Data").unwrap();
        assert_eq!(sheet.last_row(), 5);
        assert_eq!(sheet.last_col(), 4);
        assert_eq!(sheet.value(3, 1), None);
        assert!(sheet.row_has_values(2));
        assert!(!sheet.row_has_values(3));
    }

    #[test]
    fn row_cells_walk_one_row_in_column_order() {
        let wb = sample();
        let sheet = wb.sheet("Data").unwrap();
        let row: Vec<(u32, String)> = sheet
            .row_cells(1)
            .map(|(col, v)| (col, v.to_string()))
            .collect();
        assert_eq!(row, vec![(1, "Name".to_string()), (2, "Age".to_string())]);
        assert_eq!(sheet.row_cells(4).count(), 0);
    }

    #[test]
    fn setting_empty_clears_the_cell() {
        let mut wb = sample();
        wb.set_value("Data", 2, 1, CellValue::Empty).unwrap();
        assert_eq!(wb.sheet("Data").unwrap().value(2, 1), None);
    }

    #[test]
    fn empty_text_is_present_but_blank() {
        let mut wb = Workbook::new();
        wb.add_sheet("S").set(3, 1, "");
        let sheet = wb.sheet("S").unwrap();
        assert!(sheet.row_has_values(3));
        assert!(sheet.value(3, 1).unwrap().is_blank());
    }

    #[test]
    fn set_value_validates_sheet_and_indexes() {
        let mut wb = sample();
        assert!(matches!(
            wb.set_value("Nope", 1, 1, 1i64),
            Err(SheetError::UnknownSheet(name)) if name == "Nope"
        ));
        assert!(matches!(
            wb.set_value("Data", 0, 1, 1i64),
            Err(SheetError::InvalidIndex { row: 0, col: 1 })
        ));
    }
}
