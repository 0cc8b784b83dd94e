//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] - The scalar stored in a cell
//! - [`CellError`] - Host error sentinels that can appear in place of a value
//! - [`CellAddress`] / [`CellRange`] - A cell's location and rectangular spans
//! - [`CellData`] / [`CellState`] - A stored cell and its formula state

mod address;
mod data;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use data::{CellData, CellState};
pub use value::{CellError, CellValue};
