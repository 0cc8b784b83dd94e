//! Splitting a cell grid into parallel formula and value grids

use calc_bridge_core::{CellValue, Grid, HostDocument};
use calc_bridge_protocol::{SheetBatchRequest, WireValue};

use crate::error::{BridgeError, Result};

/// A sheet region ready for whole-sheet evaluation
///
/// `formulas[r][c]` is the formula source at a cell (empty string if none);
/// `values[r][c]` is the literal there (empty where a formula sits).
#[derive(Debug, Clone, PartialEq)]
pub struct SheetBatch {
    pub formulas: Grid<String>,
    pub values: Grid<CellValue>,
}

impl SheetBatch {
    /// Classify each cell of a region
    ///
    /// A live formula wins; otherwise literal text starting with `=` counts
    /// as a frozen formula; otherwise the cell is a literal. `formulas` is
    /// `None` when the host cannot expose live formulas.
    pub fn encode(values: &Grid<CellValue>, formulas: Option<&Grid<String>>) -> Result<Self> {
        if let Some(formulas) = formulas {
            values
                .ensure_same_shape(formulas)
                .map_err(|e| BridgeError::input(e.to_string()))?;
        }

        let (rows, cols) = values.dimensions();
        let mut formula_rows = Vec::with_capacity(rows);
        let mut value_rows = Vec::with_capacity(rows);

        for (r, row) in values.rows().enumerate() {
            let mut formula_row = Vec::with_capacity(cols);
            let mut value_row = Vec::with_capacity(cols);

            for (c, value) in row.iter().enumerate() {
                let live = formulas
                    .and_then(|f| f.get(r, c))
                    .filter(|f| !f.is_empty());

                match (live, value) {
                    (Some(formula), _) => {
                        formula_row.push(formula.clone());
                        value_row.push(CellValue::Empty);
                    }
                    (None, CellValue::String(text)) if value.is_formula_text() => {
                        formula_row.push(text.clone());
                        value_row.push(CellValue::Empty);
                    }
                    (None, value) => {
                        formula_row.push(String::new());
                        value_row.push(value.clone().normalize_blank());
                    }
                }
            }

            formula_rows.push(formula_row);
            value_rows.push(value_row);
        }

        Ok(Self {
            formulas: Grid::from_rows(formula_rows)?,
            values: Grid::from_rows(value_rows)?,
        })
    }

    /// Read and encode a sheet's data range (A1 to the last used cell)
    pub fn from_host<H: HostDocument + ?Sized>(host: &H, sheet: &str) -> Result<Self> {
        let Some(range) = host.data_range(sheet)? else {
            return Ok(Self {
                formulas: Grid::empty(),
                values: Grid::empty(),
            });
        };
        let values = host.get_grid(sheet, &range)?;
        let formulas = host.get_formulas(sheet, &range)?;
        Self::encode(&values, formulas.as_ref())
    }

    /// `(rows, cols)` of the batch
    pub fn dimensions(&self) -> (usize, usize) {
        self.values.dimensions()
    }

    /// Whether there is nothing to evaluate
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of cells carrying a formula
    pub fn formula_count(&self) -> usize {
        self.formulas.iter().filter(|(_, _, f)| !f.is_empty()).count()
    }

    /// Wire form, after re-checking that both grids line up
    pub fn to_request(&self) -> Result<SheetBatchRequest> {
        self.formulas
            .ensure_same_shape(&self.values)
            .map_err(|e| BridgeError::input(e.to_string()))?;

        Ok(SheetBatchRequest {
            formulas: self.formulas.rows().map(<[String]>::to_vec).collect(),
            values: self
                .values
                .rows()
                .map(|row| row.iter().map(WireValue::from).collect())
                .collect(),
        })
    }
}
