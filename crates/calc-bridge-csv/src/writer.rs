//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};
use crate::FROZEN_PREFIX;
use calc_bridge_core::{CellState, Worksheet};

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a worksheet to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        worksheet: &Worksheet,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path.as_ref())?;
        debug!(sheet = worksheet.name(), path = %path.as_ref().display(), "writing csv");
        Self::write(worksheet, file, options)
    }

    /// Write a worksheet to a writer
    ///
    /// Output always starts at A1 so cell positions survive the round trip.
    pub fn write<W: Write>(
        worksheet: &Worksheet,
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .from_writer(writer);

        if let Some(range) = worksheet.data_range() {
            for row in range.start.row..=range.end.row {
                let mut record = Vec::with_capacity(range.col_count() as usize);

                for col in range.start.col..=range.end.col {
                    let field = match (options.preserve_formulas, worksheet.cell_state_at(row, col)) {
                        (true, CellState::LiveFormula) => worksheet
                            .get_formula_at(row, col)
                            .unwrap_or_default()
                            .to_string(),
                        (true, CellState::FrozenText) => {
                            format!("{}{}", FROZEN_PREFIX, worksheet.get_value_at(row, col))
                        }
                        (preserve, _) => {
                            let value = worksheet.get_value_at(row, col);
                            match value.as_str() {
                                // escape literal text that would read back as a prefix
                                Some(text) if preserve && text.starts_with(FROZEN_PREFIX) => {
                                    format!("{}{}", FROZEN_PREFIX, text)
                                }
                                _ => value.to_string(),
                            }
                        }
                    };
                    record.push(field);
                }

                csv_writer.write_record(&record)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}
