//! # calc-bridge-core
//!
//! Core data structures shared by the calc-bridge crates.
//!
//! This crate provides:
//! - [`CellValue`] - Scalar cell values (numbers, text, booleans, dates)
//! - [`CellError`] - The host's "broken cell" sentinel markers
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`Grid`] - Rectangular grids of cells
//! - [`HostDocument`] - The narrow port the bridge uses to talk to a host spreadsheet
//! - [`Workbook`], [`Worksheet`] - An in-memory host implementing that port
//!
//! ## Example
//!
//! ```rust
//! use calc_bridge_core::{CellState, CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", 2.0).unwrap();
//! sheet.set_cell_formula("B1", "=A1*2").unwrap();
//! sheet.set_cell_value("C1", "=A1+1").unwrap();
//!
//! assert_eq!(sheet.cell_state_at(0, 1), CellState::LiveFormula);
//! assert_eq!(sheet.cell_state_at(0, 2), CellState::FrozenText);
//! assert_eq!(sheet.get_value_at(0, 0), CellValue::Number(2.0));
//! ```

pub mod cell;
pub mod error;
pub mod grid;
pub mod host;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellRange, CellState, CellValue};
pub use error::{Error, Result};
pub use grid::Grid;
pub use host::HostDocument;
pub use style::{Style, StylePool};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Leading character that marks cell text as formula source
pub const FORMULA_MARKER: char = '=';

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 10_000_000;

/// Maximum number of columns in a worksheet (column ZZZ)
pub const MAX_COLS: u32 = 18_278;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 100;
