//! The host document port
//!
//! Everything the bridge needs from a spreadsheet host goes through
//! [`HostDocument`]. A host integration implements it once; the bridge logic
//! never touches host storage directly. [`Workbook`] implements it for
//! in-memory documents.

use crate::cell::{CellAddress, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::workbook::Workbook;

/// Narrow interface to a host spreadsheet document
pub trait HostDocument {
    /// Names of all sheets, in order
    fn sheet_names(&self) -> Vec<String>;

    /// Whether a sheet with this name exists
    fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names().iter().any(|n| n == name)
    }

    /// Range from A1 to the last cell with content, `None` for an empty sheet
    fn data_range(&self, sheet: &str) -> Result<Option<CellRange>>;

    /// Literal values of a range
    fn get_grid(&self, sheet: &str, range: &CellRange) -> Result<Grid<CellValue>>;

    /// Live formulas of a range (empty string where none)
    ///
    /// `None` when the host cannot expose formulas at all.
    fn get_formulas(&self, sheet: &str, range: &CellRange) -> Result<Option<Grid<String>>>;

    /// Live formula of a single cell
    fn get_formula(&self, sheet: &str, cell: CellAddress) -> Result<Option<String>> {
        let grid = self.get_formulas(sheet, &CellRange::single(cell))?;
        Ok(grid
            .and_then(|g| g.get(0, 0).cloned())
            .filter(|f| !f.is_empty()))
    }

    /// Store text verbatim, without the host interpreting it as a formula
    fn write_raw(&mut self, sheet: &str, cell: CellAddress, text: &str) -> Result<()>;

    /// Install a live formula at one cell
    fn write_formula(&mut self, sheet: &str, cell: CellAddress, formula: &str) -> Result<()>;

    /// Overwrite a block of values with its top-left corner at `origin`
    fn write_values(&mut self, sheet: &str, origin: CellAddress, values: &Grid<CellValue>)
        -> Result<()>;

    /// Create `target` as a copy of `source`, formatting included
    fn clone_with_format(&mut self, source: &str, target: &str) -> Result<()>;

    /// Remove every value and formula from a sheet, keeping its formatting
    fn clear_contents(&mut self, sheet: &str) -> Result<()>;

    /// Delete a sheet
    fn delete_sheet(&mut self, name: &str) -> Result<()>;
}

impl Workbook {
    fn sheet(&self, name: &str) -> Result<&crate::Worksheet> {
        self.worksheet_by_name(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut crate::Worksheet> {
        self.worksheet_by_name_mut(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }
}

impl HostDocument for Workbook {
    fn sheet_names(&self) -> Vec<String> {
        self.worksheets().map(|ws| ws.name().to_string()).collect()
    }

    fn has_sheet(&self, name: &str) -> bool {
        self.sheet_index(name).is_some()
    }

    fn data_range(&self, sheet: &str) -> Result<Option<CellRange>> {
        Ok(self.sheet(sheet)?.data_range())
    }

    fn get_grid(&self, sheet: &str, range: &CellRange) -> Result<Grid<CellValue>> {
        Ok(self.sheet(sheet)?.values_grid(range))
    }

    fn get_formulas(&self, sheet: &str, range: &CellRange) -> Result<Option<Grid<String>>> {
        Ok(Some(self.sheet(sheet)?.formulas_grid(range)))
    }

    fn write_raw(&mut self, sheet: &str, cell: CellAddress, text: &str) -> Result<()> {
        self.sheet_mut(sheet)?
            .set_cell_value_at(cell.row, cell.col, text)
    }

    fn write_formula(&mut self, sheet: &str, cell: CellAddress, formula: &str) -> Result<()> {
        self.sheet_mut(sheet)?
            .set_cell_formula_at(cell.row, cell.col, formula)
    }

    fn write_values(
        &mut self,
        sheet: &str,
        origin: CellAddress,
        values: &Grid<CellValue>,
    ) -> Result<()> {
        self.sheet_mut(sheet)?.write_grid(origin, values)
    }

    fn clone_with_format(&mut self, source: &str, target: &str) -> Result<()> {
        self.duplicate_worksheet(source, target).map(|_| ())
    }

    fn clear_contents(&mut self, sheet: &str) -> Result<()> {
        self.sheet_mut(sheet)?.clear_contents();
        Ok(())
    }

    fn delete_sheet(&mut self, name: &str) -> Result<()> {
        self.remove_worksheet_by_name(name).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellState, Style};

    fn model() -> Workbook {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Model").unwrap();
        wb
    }

    #[test]
    fn test_raw_and_formula_writes() {
        let mut wb = model();
        let a1 = CellAddress::new(0, 0);

        wb.write_formula("Model", a1, "=1+1").unwrap();
        assert_eq!(wb.get_formula("Model", a1).unwrap().as_deref(), Some("=1+1"));

        wb.write_raw("Model", a1, "=1+1").unwrap();
        assert_eq!(wb.get_formula("Model", a1).unwrap(), None);
        let ws = wb.worksheet_by_name("Model").unwrap();
        assert_eq!(ws.cell_state_at(0, 0), CellState::FrozenText);
    }

    #[test]
    fn test_missing_sheet() {
        let wb = model();
        assert!(matches!(
            wb.data_range("Nope"),
            Err(Error::SheetNotFound(name)) if name == "Nope"
        ));
        assert!(!wb.has_sheet("Nope"));
        assert!(wb.has_sheet("Model"));
    }

    #[test]
    fn test_clone_then_clear_keeps_formatting() {
        let mut wb = model();
        {
            let ws = wb.worksheet_by_name_mut("Model").unwrap();
            ws.set_cell_value("A1", "header").unwrap();
            ws.set_cell_style_at(0, 0, &Style::new().bold(true)).unwrap();
        }
        wb.clone_with_format("Model", "Copy").unwrap();
        wb.clear_contents("Copy").unwrap();

        let copy = wb.worksheet_by_name("Copy").unwrap();
        assert_eq!(copy.get_value_at(0, 0), CellValue::Empty);
        assert!(copy.cell_style_at(0, 0).bold);
        assert_eq!(
            wb.worksheet_by_name("Model").unwrap().get_value_at(0, 0),
            CellValue::string("header")
        );
    }
}
