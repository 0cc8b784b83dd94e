//! Top-level argument splitting
//!
//! A small character scanner that knows about three things only: string
//! literals (with the `""` escape), parenthesis nesting and array-constant
//! brace nesting. Separators inside any of those are not argument boundaries.

use crate::error::{FormulaError, FormulaResult};
use calc_bridge_core::FORMULA_MARKER;

/// Inner text of the outermost call in a formula
///
/// For `=SUM(A1, MAX(B1,B2))` this is `A1, MAX(B1,B2)`. Returns `None` when
/// the formula has no call at all (e.g. `=A1+1`).
///
/// # Example
/// ```rust
/// use calc_bridge_formula::call_arguments;
///
/// assert_eq!(call_arguments("=F(\"a(\",B1)").unwrap(), Some("\"a(\",B1"));
/// assert_eq!(call_arguments("=A1*2").unwrap(), None);
/// ```
pub fn call_arguments(formula: &str) -> FormulaResult<Option<&str>> {
    let body = formula
        .trim()
        .strip_prefix(FORMULA_MARKER)
        .ok_or_else(|| FormulaError::NotAFormula(formula.to_string()))?;

    let mut scanner = Scanner::new(body);

    // Find the first opening parenthesis outside a string
    loop {
        match scanner.peek_char() {
            None => return Ok(None),
            Some('"') => scanner.skip_string()?,
            Some('(') => break,
            Some(_) => scanner.advance(),
        }
    }

    let open = scanner.pos;
    scanner.advance();
    let mut depth = 1usize;

    while let Some(c) = scanner.peek_char() {
        match c {
            '"' => {
                scanner.skip_string()?;
                continue;
            }
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(&body[open + 1..scanner.pos]));
                }
            }
            _ => {}
        }
        scanner.advance();
    }

    Err(FormulaError::UnbalancedParentheses(open))
}

/// Split an argument list on its top-level separator
///
/// The separator is `;` when any top-level `;` occurs (locales that use `,`
/// as decimal mark), otherwise `,`. Splits are returned untrimmed. An empty
/// or all-whitespace list has no arguments.
pub fn split_arguments(args: &str) -> FormulaResult<Vec<&str>> {
    if args.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut scanner = Scanner::new(args);
    let mut commas = Vec::new();
    let mut semicolons = Vec::new();
    let mut depth = 0usize;

    while let Some(c) = scanner.peek_char() {
        match c {
            '"' => {
                scanner.skip_string()?;
                continue;
            }
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => commas.push(scanner.pos),
            ';' if depth == 0 => semicolons.push(scanner.pos),
            _ => {}
        }
        scanner.advance();
    }

    let cuts = if semicolons.is_empty() {
        commas
    } else {
        semicolons
    };

    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        parts.push(&args[start..cut]);
        start = cut + 1;
    }
    parts.push(&args[start..]);
    Ok(parts)
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Skip a string literal; `pos` must be on its opening quote
    fn skip_string(&mut self) -> FormulaResult<()> {
        let start = self.pos;
        self.advance();
        while let Some(c) = self.peek_char() {
            self.advance();
            if c == '"' {
                // "" is an escaped quote
                if self.peek_char() == Some('"') {
                    self.advance();
                } else {
                    return Ok(());
                }
            }
        }
        Err(FormulaError::UnterminatedString(start))
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}
