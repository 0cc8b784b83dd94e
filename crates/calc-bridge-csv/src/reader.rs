//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use crate::FROZEN_PREFIX;
use calc_bridge_core::{CellValue, Worksheet, FORMULA_MARKER};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read CSV file into a worksheet
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let file = File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "reading csv");
        Self::read(file, options)
    }

    /// Read CSV from a reader into a worksheet
    ///
    /// Every record is data; there is no header row. Records may have
    /// different lengths.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut worksheet = Worksheet::new(options.sheet_name.as_str());

        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row = row_idx as u32;

            for (col, field) in record.iter().enumerate() {
                let col = col as u32;
                if field.starts_with(FORMULA_MARKER) {
                    worksheet.set_cell_formula_at(row, col, field)?;
                } else if let Some(escaped) = field
                    .strip_prefix(FROZEN_PREFIX)
                    .filter(|rest| rest.starts_with(FROZEN_PREFIX))
                {
                    worksheet.set_cell_value_at(row, col, escaped)?;
                } else if let Some(frozen) = field
                    .strip_prefix(FROZEN_PREFIX)
                    .filter(|rest| rest.starts_with(FORMULA_MARKER))
                {
                    worksheet.set_cell_value_at(row, col, frozen)?;
                } else {
                    let value = if options.auto_detect_types {
                        Self::detect_type(field)
                    } else {
                        CellValue::string(field).normalize_blank()
                    };
                    worksheet.set_cell_value_at(row, col, value)?;
                }
            }
        }

        Ok(worksheet)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }

        if let Some(dt) = Self::parse_datetime(trimmed) {
            return CellValue::DateTime(dt);
        }

        CellValue::string(field)
    }

    fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_utc());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt);
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}
