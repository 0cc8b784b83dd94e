//! # calc-bridge-csv
//!
//! CSV reader and writer for calc-bridge worksheets.
//!
//! Formula state survives a round trip: a field starting with `=` is a live
//! formula, a field starting with `'=` is frozen formula text. Literal text
//! that itself starts with `'` is written with one more `'` in front.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;

/// Prefix that keeps formula text inert in a CSV field
pub const FROZEN_PREFIX: char = '\'';
