//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors raised while splitting formula text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormulaError {
    /// Text does not start with the formula marker
    #[error("Not a formula: '{0}'")]
    NotAFormula(String),

    /// An opening parenthesis is never closed
    #[error("Unbalanced parentheses: '(' at offset {0} is never closed")]
    UnbalancedParentheses(usize),

    /// A string literal runs to the end of the formula
    #[error("Unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),
}
