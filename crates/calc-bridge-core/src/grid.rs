//! Rectangular grids of cell data

use crate::error::{Error, Result};

/// A rectangular `rows x cols` grid, stored row-major
///
/// Every row has exactly `cols` entries. A grid with no rows or no columns
/// is the "no data" grid and compares equal to [`Grid::empty`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    rows: Vec<Vec<T>>,
    cols: usize,
}

impl<T> Grid<T> {
    /// The empty grid
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            cols: 0,
        }
    }

    /// Build a grid from rows, rejecting ragged input
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(Error::RaggedGrid {
                row,
                expected: cols,
                actual: bad.len(),
            });
        }
        if cols == 0 {
            return Ok(Self::empty());
        }
        Ok(Self { rows, cols })
    }

    /// Build a `rows x cols` grid from a function of (row, col)
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        if rows == 0 || cols == 0 {
            return Self::empty();
        }
        let rows = (0..rows)
            .map(|r| (0..cols).map(|c| f(r, c)).collect())
            .collect();
        Self { rows, cols }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.cols)
    }

    /// True for the "no data" grid
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols == 0
    }

    /// Get a cell by 0-based position
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterate over `(row, col, value)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, v)| (r, c, v)))
    }

    /// Apply a function to every cell
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(&mut f).collect())
                .collect(),
            cols: self.cols,
        }
    }

    /// Check that another grid has the same shape
    pub fn ensure_same_shape<U>(&self, other: &Grid<U>) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::GridMismatch {
                left_rows: self.row_count(),
                left_cols: self.col_count(),
                right_rows: other.row_count(),
                right_cols: other.col_count(),
            });
        }
        Ok(())
    }

    /// Consume the grid into its rows
    pub fn into_rows(self) -> Vec<Vec<T>> {
        self.rows
    }
}

impl<T: Clone> Grid<T> {
    /// Rectangularize possibly-ragged rows by padding short rows with `pad`
    ///
    /// The width becomes the longest row's length.
    pub fn from_ragged(mut rows: Vec<Vec<T>>, pad: T) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if cols == 0 {
            return Self::empty();
        }
        for row in &mut rows {
            row.resize(cols, pad.clone());
        }
        Self { rows, cols }
    }

    /// Cells in row-major order
    pub fn flatten(&self) -> Vec<T> {
        self.rows.iter().flatten().cloned().collect()
    }
}

impl<T> Default for Grid<T> {
    fn default() -> Self {
        Self::empty()
    }
}
