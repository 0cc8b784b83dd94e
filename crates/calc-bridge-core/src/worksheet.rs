//! Worksheet type

use ahash::AHashMap;

use crate::cell::{CellAddress, CellData, CellRange, CellState, CellValue};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::style::{Style, StylePool};
use crate::{MAX_COLS, MAX_ROWS};

/// A single sheet of an in-memory [`Workbook`](crate::Workbook)
///
/// Storage is sparse: only cells with a value, a formula or a non-default
/// style are kept. Formulas are never evaluated here; a live formula keeps
/// whatever value was last stored next to it.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    cells: AHashMap<(u32, u32), CellData>,
    styles: StylePool,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: AHashMap::new(),
            styles: StylePool::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u32) -> Option<&CellData> {
        self.cells.get(&(row, col))
    }

    /// Get a cell value by address string (e.g., "A1")
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get a cell value by row and column indices
    pub fn get_value_at(&self, row: u32, col: u32) -> CellValue {
        self.cell_at(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Live formula source at a position, if the cell has one
    pub fn get_formula_at(&self, row: u32, col: u32) -> Option<&str> {
        self.cell_at(row, col).and_then(|c| c.formula.as_deref())
    }

    /// Formula state of a cell
    pub fn cell_state_at(&self, row: u32, col: u32) -> CellState {
        self.cell_at(row, col)
            .map(CellData::state)
            .unwrap_or(CellState::Literal)
    }

    /// Style of a cell (the default style for unstyled cells)
    pub fn cell_style_at(&self, row: u32, col: u32) -> Style {
        let idx = self.cell_at(row, col).map(|c| c.style_index).unwrap_or(0);
        self.styles.get(idx).cloned().unwrap_or_default()
    }

    // === Cell Mutation ===

    /// Store a literal value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Store a literal value, dropping any live formula
    ///
    /// Text is stored verbatim: `"=A1"` becomes frozen formula text, never a
    /// live formula. This is the raw, non-recalculating write path.
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u32,
        value: V,
    ) -> Result<()> {
        let cell = self.cell_entry(row, col)?;
        cell.value = value.into();
        cell.formula = None;
        self.prune(row, col);
        Ok(())
    }

    /// Install a live formula by address string
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula)
    }

    /// Install a live formula; the cached value is cleared until the host recalculates
    pub fn set_cell_formula_at(&mut self, row: u32, col: u32, formula: &str) -> Result<()> {
        let cell = self.cell_entry(row, col)?;
        cell.formula = Some(formula.to_string());
        cell.value = CellValue::Empty;
        Ok(())
    }

    /// Set the formatting of a cell
    pub fn set_cell_style_at(&mut self, row: u32, col: u32, style: &Style) -> Result<()> {
        let idx = self.styles.get_or_insert(style.clone());
        let cell = self.cell_entry(row, col)?;
        cell.style_index = idx;
        self.prune(row, col);
        Ok(())
    }

    /// Remove every value and formula, keeping formatting
    pub fn clear_contents(&mut self) {
        for cell in self.cells.values_mut() {
            cell.value = CellValue::Empty;
            cell.formula = None;
        }
        self.cells.retain(|_, c| !c.is_empty());
    }

    // === Ranges ===

    /// Bounding box of cells with content (value or formula)
    pub fn used_range(&self) -> Option<CellRange> {
        let mut content = self
            .cells
            .iter()
            .filter(|(_, c)| c.has_content())
            .map(|(&(r, c), _)| (r, c));
        let (r0, c0) = content.next()?;
        let (min_r, min_c, max_r, max_c) = content.fold((r0, c0, r0, c0), |acc, (r, c)| {
            (acc.0.min(r), acc.1.min(c), acc.2.max(r), acc.3.max(c))
        });
        Some(CellRange::new(
            CellAddress::new(min_r, min_c),
            CellAddress::new(max_r, max_c),
        ))
    }

    /// Range from A1 to the bottom-right cell with content
    pub fn data_range(&self) -> Option<CellRange> {
        self.used_range()
            .map(|used| CellRange::new(CellAddress::new(0, 0), used.end))
    }

    /// Literal values of a range
    pub fn values_grid(&self, range: &CellRange) -> Grid<CellValue> {
        Grid::from_fn(
            range.row_count() as usize,
            range.col_count() as usize,
            |r, c| self.get_value_at(range.start.row + r as u32, range.start.col + c as u32),
        )
    }

    /// Live formulas of a range (empty string where there is none)
    pub fn formulas_grid(&self, range: &CellRange) -> Grid<String> {
        Grid::from_fn(
            range.row_count() as usize,
            range.col_count() as usize,
            |r, c| {
                self.get_formula_at(range.start.row + r as u32, range.start.col + c as u32)
                    .unwrap_or_default()
                    .to_string()
            },
        )
    }

    /// Write a grid of literals with its top-left corner at `origin`
    pub fn write_grid(&mut self, origin: CellAddress, values: &Grid<CellValue>) -> Result<()> {
        for (r, c, value) in values.iter() {
            self.set_cell_value_at(origin.row + r as u32, origin.col + c as u32, value.clone())?;
        }
        Ok(())
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn cell_entry(&mut self, row: u32, col: u32) -> Result<&mut CellData> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(self.cells.entry((row, col)).or_insert_with(CellData::empty))
    }

    fn prune(&mut self, row: u32, col: u32) {
        if self.cells.get(&(row, col)).is_some_and(CellData::is_empty) {
            self.cells.remove(&(row, col));
        }
    }
}
