//! # calc-bridge-formula
//!
//! Lexical argument extraction for formula source text.
//!
//! This is deliberately not a formula parser: there is no operator precedence
//! and no evaluation. It recovers the top-level arguments of a formula's
//! outermost call and tells cell/range references apart from literals, which
//! is enough to send dependency hints alongside a remote call.
//!
//! ## Example
//!
//! ```rust
//! use calc_bridge_formula::reference_hints;
//!
//! let hints = reference_hints("=SUM(A1,B2,ROW(),COLUMN())");
//! assert_eq!(hints, vec!["A1", "B2"]);
//! ```

pub mod error;
pub mod references;
pub mod splitter;

pub use error::{FormulaError, FormulaResult};
pub use references::{
    classify_token, extract_arguments, normalize_reference, reference_hints, ArgumentKind,
    FormulaArgument,
};
pub use splitter::{call_arguments, split_arguments};
