//! Stored cell data and its formula state

use super::CellValue;

/// Where a cell sits in the freeze/unfreeze state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    /// The host's live-formula slot is occupied
    LiveFormula,
    /// The literal is text starting with `=` and the live slot is empty
    FrozenText,
    /// Anything else: plain values, blanks, non-formula text
    Literal,
}

impl CellState {
    /// Derive the state from a literal value and the host's live-formula slot
    pub fn classify(value: &CellValue, formula: Option<&str>) -> Self {
        match formula {
            Some(f) if !f.is_empty() => CellState::LiveFormula,
            _ if value.is_formula_text() => CellState::FrozenText,
            _ => CellState::Literal,
        }
    }
}

/// Complete data for a single stored cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    /// Literal value (for live formulas: the host's last computed value)
    pub value: CellValue,
    /// Live formula source, when the host evaluates this cell
    pub formula: Option<String>,
    /// Index into the workbook's style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a new literal cell with the default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            formula: None,
            style_index: 0,
        }
    }

    /// Create an empty cell
    pub fn empty() -> Self {
        Self::new(CellValue::Empty)
    }

    /// Formula state of this cell
    pub fn state(&self) -> CellState {
        CellState::classify(&self.value, self.formula.as_deref())
    }

    /// No value, no formula and default style
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.formula.is_none() && self.style_index == 0
    }

    /// Holds content (a value or a formula), ignoring formatting
    pub fn has_content(&self) -> bool {
        !self.value.is_blank() || self.formula.is_some()
    }
}
