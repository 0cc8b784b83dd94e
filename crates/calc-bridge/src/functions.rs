//! Custom spreadsheet functions
//!
//! These back the host's custom formula functions (`CLOUD_CALC`,
//! `CLOUD_SUMIFS`, `CLOUD_CALC_OPERATIONS`, `CLOUD_BATCH_CALC`). A custom
//! function must always produce a cell value, so none of them fail: every
//! error becomes the text `#ERROR: <message>`. That text starts with a
//! sentinel marker itself, so a dependent cell short-circuits in turn.

use std::fmt;

use tracing::debug;

use calc_bridge_core::{CellAddress, CellValue, Grid, HostDocument};
use calc_bridge_formula::{extract_arguments, FormulaArgument};
use calc_bridge_protocol::{BatchArg, BatchCalcRequest, CalcResult, WireValue};

use crate::classify;
use crate::config::Endpoint;
use crate::error::{BridgeError, Result};
use crate::transport::Transport;
use crate::CalcBridge;

/// One argument as the host passes it to a custom function
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArg {
    /// A single value
    Scalar(CellValue),
    /// A block of cells
    Range(Grid<CellValue>),
}

impl FunctionArg {
    /// Cells in row-major order, blank text collapsed to empty
    pub fn flatten(&self) -> Vec<CellValue> {
        match self {
            FunctionArg::Scalar(v) => vec![v.clone().normalize_blank()],
            FunctionArg::Range(grid) => grid
                .flatten()
                .into_iter()
                .map(CellValue::normalize_blank)
                .collect(),
        }
    }

    /// The value of a scalar or of a 1x1 range
    pub fn single(&self) -> Option<CellValue> {
        match self {
            FunctionArg::Scalar(v) => Some(v.clone()),
            FunctionArg::Range(grid) if grid.dimensions() == (1, 1) => grid.get(0, 0).cloned(),
            FunctionArg::Range(_) => None,
        }
    }
}

impl From<CellValue> for FunctionArg {
    fn from(value: CellValue) -> Self {
        FunctionArg::Scalar(value)
    }
}

impl From<Grid<CellValue>> for FunctionArg {
    fn from(grid: Grid<CellValue>) -> Self {
        FunctionArg::Range(grid)
    }
}

/// Flatten every argument, in order, into one list
pub fn flatten_args(args: &[FunctionArg]) -> Vec<CellValue> {
    args.iter().flat_map(FunctionArg::flatten).collect()
}

/// What a custom function hands back to its cell
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionOutput {
    /// A single value
    Value(CellValue),
    /// A block that spills from the calling cell
    Array(Grid<CellValue>),
}

impl FunctionOutput {
    /// Prefix of every error produced by a custom function
    pub const ERROR_PREFIX: &'static str = "#ERROR: ";

    /// Render an error as cell text
    pub fn error(err: &BridgeError) -> Self {
        FunctionOutput::Value(CellValue::string(format!("{}{}", Self::ERROR_PREFIX, err)))
    }

    /// Whether this output is an error text
    pub fn is_error(&self) -> bool {
        matches!(self, FunctionOutput::Value(CellValue::String(s)) if s.starts_with(Self::ERROR_PREFIX))
    }

    /// The single value, if this is not an array
    pub fn as_value(&self) -> Option<&CellValue> {
        match self {
            FunctionOutput::Value(v) => Some(v),
            FunctionOutput::Array(_) => None,
        }
    }

    fn from_result(result: CalcResult) -> Self {
        match result {
            CalcResult::Scalar(v) => FunctionOutput::Value(v.into()),
            other => {
                let rows = other
                    .into_rows()
                    .into_iter()
                    .map(|row| row.into_iter().map(CellValue::from).collect())
                    .collect();
                let grid = Grid::from_ragged(rows, CellValue::string(""));
                if grid.is_empty() {
                    FunctionOutput::Value(CellValue::string(""))
                } else {
                    FunctionOutput::Array(grid)
                }
            }
        }
    }

    fn from_outcome(outcome: Result<CalcResult>) -> Self {
        match outcome {
            Ok(result) => Self::from_result(result),
            Err(e) => {
                debug!(error = %e, "custom function failed");
                Self::error(&e)
            }
        }
    }
}

impl fmt::Display for FunctionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionOutput::Value(v) => write!(f, "{}", v),
            FunctionOutput::Array(grid) => {
                for (i, row) in grid.rows().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    let cells: Vec<String> = row.iter().map(CellValue::to_string).collect();
                    write!(f, "{}", cells.join("\t"))?;
                }
                Ok(())
            }
        }
    }
}

/// Top-level arguments of the formula installed at `cell`
///
/// Best effort: a host that cannot supply the formula text, or text that
/// cannot be split, yields no arguments.
pub fn formula_arguments_for<H: HostDocument + ?Sized>(
    host: &H,
    sheet: &str,
    cell: CellAddress,
) -> Vec<FormulaArgument> {
    let formula = match host.get_formula(sheet, cell) {
        Ok(Some(formula)) => formula,
        Ok(None) => return Vec::new(),
        Err(e) => {
            debug!(sheet, %cell, error = %e, "formula text unavailable; no hints");
            return Vec::new();
        }
    };
    match extract_arguments(&formula) {
        Ok(args) => args,
        Err(e) => {
            debug!(sheet, %cell, error = %e, "formula not splittable; no hints");
            Vec::new()
        }
    }
}

/// Flatten arguments into wire form, each cell tagged with where it came from
///
/// When `sources` lines up one to one with `args`, every argument takes the
/// addresses of its own reference: a cell reference tags its single value,
/// a range reference tags each cell when the shapes agree, and literals stay
/// untagged. Otherwise the references are matched to the flattened cells by
/// position.
pub fn batch_args(args: &[FunctionArg], sources: &[FormulaArgument]) -> Vec<BatchArg> {
    if args.len() != sources.len() {
        let hints: Vec<&str> = sources
            .iter()
            .filter_map(|s| s.reference.as_deref())
            .collect();
        return flatten_args(args)
            .iter()
            .enumerate()
            .map(|(i, value)| BatchArg {
                value: WireValue::from(value),
                reference: hints.get(i).map(|h| h.to_string()),
            })
            .collect();
    }

    args.iter()
        .zip(sources)
        .flat_map(|(arg, source)| {
            let cells = arg.flatten();
            let mut addresses = source_addresses(arg, source).into_iter();
            cells
                .iter()
                .map(|value| BatchArg {
                    value: WireValue::from(value),
                    reference: addresses.next(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Cell addresses an argument was read from, empty when they cannot be known
fn source_addresses(arg: &FunctionArg, source: &FormulaArgument) -> Vec<String> {
    let Some(range) = source.range() else {
        return Vec::new();
    };
    let shape = (range.row_count() as usize, range.col_count() as usize);
    let matches = match arg {
        FunctionArg::Scalar(_) => shape == (1, 1),
        FunctionArg::Range(grid) => grid.dimensions() == shape,
    };
    if !matches {
        return Vec::new();
    }
    range.cells().map(|cell| cell.to_string()).collect()
}

impl<T: Transport> CalcBridge<T> {
    /// `CLOUD_CALC(operation, args...)`
    ///
    /// `iferror` is answered locally over the flattened arguments: the first
    /// cell unless it carries a sentinel, in which case the second.
    pub fn cloud_calc(&self, operation: &CellValue, args: &[FunctionArg]) -> FunctionOutput {
        if operation
            .as_str()
            .is_some_and(|op| op.trim().eq_ignore_ascii_case("iferror"))
        {
            let mut flat = flatten_args(args).into_iter();
            let value = flat.next();
            let fallback = flat.next();
            return FunctionOutput::Value(classify::iferror(value, fallback));
        }

        FunctionOutput::from_outcome(self.dispatcher().calc(operation, &flatten_args(args)))
    }

    /// `CLOUD_SUMIFS(sum_range, criteria_range1, criteria1, ...)`
    pub fn cloud_sumifs(&self, args: &[FunctionArg]) -> FunctionOutput {
        let outcome =
            classify::validate_sumifs(args).and_then(|request| self.dispatcher().sumifs(&request));
        FunctionOutput::from_outcome(outcome)
    }

    /// `CLOUD_CALC_OPERATIONS()`: the service's operations, comma separated
    pub fn cloud_calc_operations(&self) -> FunctionOutput {
        match self.dispatcher().operations(Endpoint::Calc) {
            Ok(operations) => FunctionOutput::Value(CellValue::string(operations.join(", "))),
            Err(e) => FunctionOutput::error(&e),
        }
    }

    /// `CLOUD_BATCH_CALC(operation, args..., row, column)`
    ///
    /// `row` and `column` are the calling cell's 1-based position (the host
    /// passes `ROW()` and `COLUMN()`). The calling cell's own formula text
    /// supplies reference hints for the arguments.
    pub fn cloud_batch_calc<H: HostDocument + ?Sized>(
        &self,
        host: &H,
        sheet: &str,
        operation: &CellValue,
        args: &[FunctionArg],
    ) -> FunctionOutput {
        FunctionOutput::from_outcome(self.batch_calc_call(host, sheet, operation, args))
    }

    fn batch_calc_call<H: HostDocument + ?Sized>(
        &self,
        host: &H,
        sheet: &str,
        operation: &CellValue,
        args: &[FunctionArg],
    ) -> Result<CalcResult> {
        let operation = classify::check_operation(operation)?;
        if args.len() < 2 {
            return Err(BridgeError::input(
                "the last two arguments must be ROW() and COLUMN() of the calling cell",
            ));
        }
        let (values, position) = args.split_at(args.len() - 2);
        let cell = CellAddress::new(
            position_index("row", &position[0])?,
            position_index("column", &position[1])?,
        );

        classify::check_args(&flatten_args(values))?;

        let sources = formula_arguments_for(host, sheet, cell);
        let args = batch_args(values, &sources);

        let request = BatchCalcRequest {
            cell: cell.to_string(),
            operation: operation.to_string(),
            args,
        };
        self.dispatcher().batch_calc(&request)
    }
}

/// 0-based index from a 1-based position argument
fn position_index(name: &str, arg: &FunctionArg) -> Result<u32> {
    let n = arg.single().and_then(|v| v.as_number()).unwrap_or(0.0);
    if n < 1.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return Err(BridgeError::input(format!(
            "{} must be a positive whole number",
            name
        )));
    }
    Ok(n as u32 - 1)
}
