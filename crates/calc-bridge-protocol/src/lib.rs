//! Shared protocol types for communication between the bridge and the remote
//! calculation service.
//!
//! The protocol is HTTP+JSON: one JSON object per request body and one per
//! response body. Success bodies carry `result` (or `results`), failure bodies
//! carry `error`.

use std::fmt;

use calc_bridge_core::CellValue;
use serde::{Deserialize, Serialize};

/// Largest magnitude at which an `f64` still holds every integer exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A scalar as it travels on the wire.
///
/// Whole numbers are sent as JSON integers (`2`, not `2.0`); the service
/// treats both the same but the integer form matches what hosts emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

impl WireValue {
    /// Wrap a number, choosing the integer form when it is whole
    pub fn number(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            WireValue::Integer(n as i64)
        } else {
            WireValue::Number(n)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            WireValue::Integer(i) => Some(*i as f64),
            WireValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Blank cells (empty, or empty text) become `null`; dates become ISO-8601
/// UTC text with millisecond precision.
impl From<&CellValue> for WireValue {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => WireValue::Null,
            CellValue::Boolean(b) => WireValue::Bool(*b),
            CellValue::Number(n) => WireValue::number(*n),
            CellValue::String(s) if s.is_empty() => WireValue::Null,
            CellValue::String(s) => WireValue::String(s.clone()),
            CellValue::DateTime(dt) => WireValue::String(CellValue::iso8601(dt)),
        }
    }
}

impl From<CellValue> for WireValue {
    fn from(value: CellValue) -> Self {
        WireValue::from(&value)
    }
}

impl From<WireValue> for CellValue {
    fn from(value: WireValue) -> Self {
        match value {
            WireValue::Null => CellValue::Empty,
            WireValue::Bool(b) => CellValue::Boolean(b),
            WireValue::Integer(i) => CellValue::Number(i as f64),
            WireValue::Number(n) => CellValue::Number(n),
            WireValue::String(s) => CellValue::String(s),
        }
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::Null => Ok(()),
            WireValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            WireValue::Integer(i) => write!(f, "{}", i),
            WireValue::Number(n) => write!(f, "{}", n),
            WireValue::String(s) => f.write_str(s),
        }
    }
}

// === Requests ===

/// `POST {calc}/calc` with a plain operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcRequest {
    pub operation: String,
    pub args: Vec<WireValue>,
}

/// `POST {calc}/calc` for multi-criteria conditional summation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SumifsRequest {
    /// Always `"sumifs"`.
    pub operation: String,
    /// Flattened (row-major) cells to sum.
    pub sum_range: Vec<WireValue>,
    pub criteria_pairs: Vec<CriteriaPair>,
}

/// One `(criteria range, criterion)` pair of a [`SumifsRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaPair {
    /// Flattened cells, same length as the sum range.
    pub range: Vec<WireValue>,
    /// Criterion such as `"metano"`, `">10"` or `"<>0"`; blank is `null`.
    pub criteria: WireValue,
}

impl SumifsRequest {
    pub const OPERATION: &'static str = "sumifs";

    pub fn new(sum_range: Vec<WireValue>, criteria_pairs: Vec<CriteriaPair>) -> Self {
        Self {
            operation: Self::OPERATION.to_string(),
            sum_range,
            criteria_pairs,
        }
    }
}

/// `POST {batch}/eval_sheet`: a whole sheet as parallel grids.
///
/// `formulas` holds formula source (empty string where none); `values` holds
/// literals (`null` where a formula occupies the cell). Both have the same
/// dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetBatchRequest {
    pub formulas: Vec<Vec<String>>,
    pub values: Vec<Vec<WireValue>>,
}

/// `POST {batch}/batch_calc`: one cell's call with dependency hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCalcRequest {
    /// Address of the calling cell, e.g. `"C3"`.
    pub cell: String,
    pub operation: String,
    pub args: Vec<BatchArg>,
}

/// An argument of a [`BatchCalcRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchArg {
    pub value: WireValue,
    /// Normalized cell or range reference the value came from, when known.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

// === Responses ===

/// Result of a single call: a scalar, a row, or a 2D block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalcResult {
    Scalar(WireValue),
    Row(Vec<WireValue>),
    Grid(Vec<Vec<WireValue>>),
}

impl CalcResult {
    /// Rows of the result; a scalar is a 1x1 block and a list is one row
    pub fn into_rows(self) -> Vec<Vec<WireValue>> {
        match self {
            CalcResult::Scalar(v) => vec![vec![v]],
            CalcResult::Row(row) => vec![row],
            CalcResult::Grid(rows) => rows,
        }
    }
}

/// Success body of `/calc` and `/batch_calc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcResponse {
    #[serde(default)]
    pub result: Option<CalcResult>,
}

/// Success body of `/eval_sheet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSheetResponse {
    /// Result rows; rows may have different lengths.
    #[serde(default)]
    pub results: Option<Vec<Vec<WireValue>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<SheetStats>,
}

/// Counters the batch service may report with a sheet evaluation.
///
/// Either counter may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_cells: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cells: Option<u64>,
}

/// Failure body of every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /operations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsResponse {
    #[serde(default)]
    pub operations: Vec<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// `"batch"` for the batch service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}
