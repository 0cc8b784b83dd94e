//! Cell value types

use std::fmt;

use chrono::{NaiveDateTime, SecondsFormat};

use crate::FORMULA_MARKER;

/// The scalar held by a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Numeric value
    Number(f64),

    /// Text value. Frozen formulas and host error sentinels arrive here too.
    String(String),

    /// Date/time value, host-local wall clock
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Empty, or an empty string (hosts report blank cells both ways)
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Collapse an empty string to [`CellValue::Empty`]
    pub fn normalize_blank(self) -> Self {
        if self.is_blank() {
            CellValue::Empty
        } else {
            self
        }
    }

    /// Text beginning with the formula marker (`=`)
    pub fn is_formula_text(&self) -> bool {
        matches!(self, CellValue::String(s) if s.starts_with(FORMULA_MARKER))
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(true) => Some(1.0),
            CellValue::Boolean(false) => Some(0.0),
            _ => None,
        }
    }

    /// Try to get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Host error sentinel carried by this value, if any
    pub fn sentinel(&self) -> Option<CellError> {
        self.as_str().and_then(CellError::match_prefix)
    }

    /// Canonical ISO-8601 text for a date value (UTC, millisecond precision)
    pub fn iso8601(dt: &NaiveDateTime) -> String {
        dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Boolean(_) => "boolean",
            CellValue::Number(_) => "number",
            CellValue::String(_) => "string",
            CellValue::DateTime(_) => "date",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::DateTime(dt) => write!(f, "{}", Self::iso8601(dt)),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::string(e.as_str())
    }
}

/// "Broken cell" markers a host writes in place of a failed cell's value
///
/// Hosts hand these to custom functions as plain text, so detection is a
/// prefix match on string values (`#N/A (not found)` still counts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #REF! - Invalid cell reference
    Ref,
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #N/A - Value not available
    Na,
    /// #NULL! - Empty range intersection
    Null,
    /// #NUM! - Invalid numeric value
    Num,
    /// #DIV/0! - Division by zero
    Div0,
    /// #ERROR - Generic error (also the bridge's own error prefix)
    Error,
    /// #NAME? - Unrecognized name
    Name,
}

impl CellError {
    /// Every sentinel, in scan order
    pub const ALL: [CellError; 8] = [
        CellError::Ref,
        CellError::Value,
        CellError::Na,
        CellError::Null,
        CellError::Num,
        CellError::Div0,
        CellError::Error,
        CellError::Name,
    ];

    /// Get the marker text for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Ref => "#REF!",
            CellError::Value => "#VALUE!",
            CellError::Na => "#N/A",
            CellError::Null => "#NULL!",
            CellError::Num => "#NUM!",
            CellError::Div0 => "#DIV/0!",
            CellError::Error => "#ERROR",
            CellError::Name => "#NAME?",
        }
    }

    /// Find the sentinel a piece of text starts with
    pub fn match_prefix(text: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| text.starts_with(e.as_str()))
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
