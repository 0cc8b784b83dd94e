//! Argument classification and reference hints

use calc_bridge_core::CellRange;
use lazy_regex::regex_is_match;
use tracing::debug;

use crate::error::FormulaResult;
use crate::splitter::{call_arguments, split_arguments};

/// Trailing positional arguments reserved for the calling cell's position
/// (e.g. `ROW()`, `COLUMN()`)
const RESERVED_TRAILING_ARGS: usize = 2;

/// What a single argument token is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// A single cell, e.g. `B2` or `$B$2`
    CellRef,
    /// A rectangular span, e.g. `A1:C10`
    RangeRef,
    /// Anything else: numbers, strings, nested calls, names
    Literal,
}

/// One top-level argument of a formula call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaArgument {
    /// Trimmed source text of the argument
    pub text: String,
    /// Classification of the text
    pub kind: ArgumentKind,
    /// Uppercased reference with `$` removed, for references only
    pub reference: Option<String>,
}

impl FormulaArgument {
    /// Classify a raw argument token
    pub fn new(token: &str) -> Self {
        let text = token.trim().to_string();
        let kind = classify_token(&text);
        let reference = match kind {
            ArgumentKind::Literal => None,
            _ => Some(normalize_reference(&text)),
        };
        Self {
            text,
            kind,
            reference,
        }
    }

    /// Whether the argument is a cell or range reference
    pub fn is_reference(&self) -> bool {
        self.kind != ArgumentKind::Literal
    }

    /// The referenced range, when the reference denotes real cells
    pub fn range(&self) -> Option<CellRange> {
        self.reference
            .as_deref()
            .and_then(|r| CellRange::parse(r).ok())
    }
}

/// Classify a trimmed token as a cell reference, range reference or literal
pub fn classify_token(token: &str) -> ArgumentKind {
    if !regex_is_match!(r"^\$?[A-Z]{1,3}\$?\d+(:\$?[A-Z]{1,3}\$?\d+)?$"i, token) {
        ArgumentKind::Literal
    } else if token.contains(':') {
        ArgumentKind::RangeRef
    } else {
        ArgumentKind::CellRef
    }
}

/// Uppercase a reference and drop its `$` anchors
pub fn normalize_reference(reference: &str) -> String {
    reference
        .chars()
        .filter(|&c| c != '$')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Extract the user-facing arguments of a formula's outermost call
///
/// The first split is dropped when it is a quoted string literal (the
/// operation name), and the last two splits are always dropped since they
/// carry the calling cell's position. Remaining tokens are trimmed and
/// classified.
///
/// # Example
/// ```rust
/// use calc_bridge_formula::{extract_arguments, ArgumentKind};
///
/// let args = extract_arguments("=CLOUD_BATCH_CALC(\"plus\", $a$1, 3, ROW(), COLUMN())").unwrap();
/// assert_eq!(args.len(), 2);
/// assert_eq!(args[0].kind, ArgumentKind::CellRef);
/// assert_eq!(args[0].reference.as_deref(), Some("A1"));
/// assert_eq!(args[1].kind, ArgumentKind::Literal);
/// ```
pub fn extract_arguments(formula: &str) -> FormulaResult<Vec<FormulaArgument>> {
    let Some(inner) = call_arguments(formula)? else {
        return Ok(Vec::new());
    };

    let mut splits = split_arguments(inner)?;
    if splits.first().is_some_and(|s| is_string_literal(s)) {
        splits.remove(0);
    }
    splits.truncate(splits.len().saturating_sub(RESERVED_TRAILING_ARGS));

    Ok(splits.into_iter().map(FormulaArgument::new).collect())
}

/// Normalized references of a formula, in argument order
///
/// Literal arguments are skipped. Never fails: text that cannot be split
/// yields no hints.
pub fn reference_hints(formula: &str) -> Vec<String> {
    match extract_arguments(formula) {
        Ok(args) => args.into_iter().filter_map(|a| a.reference).collect(),
        Err(e) => {
            debug!(formula, error = %e, "no reference hints");
            Vec::new()
        }
    }
}

fn is_string_literal(token: &str) -> bool {
    let token = token.trim();
    token.len() >= 2 && token.starts_with('"') && token.ends_with('"')
}
