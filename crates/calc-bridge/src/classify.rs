//! Local input checks that run before any network call
//!
//! Hosts inject error sentinels (`#DIV/0!`, `#REF!`, ...) as plain text into
//! the inputs of a formula whose precedents are broken. Sending those to the
//! service is pointless, so every dispatch path scans its inputs first and
//! fails fast, naming the offending argument.

use calc_bridge_core::{CellValue, Grid};
use calc_bridge_protocol::{CriteriaPair, SumifsRequest, WireValue};

use crate::error::{BridgeError, Result};
use crate::functions::FunctionArg;

/// Require the operation to be non-empty text
pub fn check_operation(operation: &CellValue) -> Result<&str> {
    match operation.as_str().map(str::trim) {
        Some(op) if !op.is_empty() => Ok(op),
        _ => Err(BridgeError::input("operation must be a non-empty string")),
    }
}

/// Scan flattened arguments; the first sentinel names its 1-based position
pub fn check_args(args: &[CellValue]) -> Result<()> {
    for (i, value) in args.iter().enumerate() {
        if let Some(marker) = value.sentinel() {
            return Err(BridgeError::Sentinel {
                location: format!("argument {}", i + 1),
                marker,
            });
        }
    }
    Ok(())
}

/// Scan the cells of a named range
pub fn check_range(label: &str, cells: &[CellValue]) -> Result<()> {
    match cells.iter().find_map(CellValue::sentinel) {
        Some(marker) => Err(BridgeError::Sentinel {
            location: label.to_string(),
            marker,
        }),
        None => Ok(()),
    }
}

/// Scan a whole sheet grid; the first sentinel names its cell
pub fn check_grid(sheet: &str, values: &Grid<CellValue>) -> Result<()> {
    for (r, c, value) in values.iter() {
        if let Some(marker) = value.sentinel() {
            let cell = calc_bridge_core::CellAddress::new(r as u32, c as u32);
            return Err(BridgeError::Sentinel {
                location: format!("cell {}!{}", sheet, cell),
                marker,
            });
        }
    }
    Ok(())
}

/// Validate multi-criteria summation arguments and build the request
///
/// Arguments are `sum_range, criteria_range1, criteria1, ...`: at least three,
/// pairs after the first, every criteria range as long as the sum range.
pub fn validate_sumifs(args: &[FunctionArg]) -> Result<SumifsRequest> {
    if args.len() < 3 {
        return Err(BridgeError::input(format!(
            "sumifs needs sum_range, criteria_range and criteria; got {} arguments",
            args.len()
        )));
    }
    if (args.len() - 1) % 2 != 0 {
        return Err(BridgeError::input(
            "arguments after sum_range must come in (criteria_range, criteria) pairs",
        ));
    }

    let sum_range = args[0].flatten();
    check_range("sum_range", &sum_range)?;

    let mut pairs = Vec::with_capacity((args.len() - 1) / 2);
    for (k, pair) in args[1..].chunks_exact(2).enumerate() {
        let n = k + 1;
        let range = pair[0].flatten();
        check_range(&format!("criteria_range {}", n), &range)?;
        if range.len() != sum_range.len() {
            return Err(BridgeError::input(format!(
                "criteria_range {} has {} cells but sum_range has {}",
                n,
                range.len(),
                sum_range.len()
            )));
        }

        let criteria = pair[1].single().ok_or_else(|| {
            BridgeError::input(format!("criteria {} must be a single value", n))
        })?;
        check_range(&format!("criteria {}", n), std::slice::from_ref(&criteria))?;

        pairs.push(CriteriaPair {
            range: range.iter().map(WireValue::from).collect(),
            criteria: WireValue::from(&criteria),
        });
    }

    Ok(SumifsRequest::new(
        sum_range.iter().map(WireValue::from).collect(),
        pairs,
    ))
}

/// Local `iferror`: the fallback when `value` carries a sentinel
///
/// An absent fallback and an empty value both come back as empty text.
pub fn iferror(value: Option<CellValue>, fallback: Option<CellValue>) -> CellValue {
    let value = value.unwrap_or_default();
    if value.sentinel().is_some() {
        return fallback.unwrap_or_else(|| CellValue::string(""));
    }
    if value.is_empty() {
        CellValue::string("")
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_bridge_core::CellError;
    use pretty_assertions::assert_eq;

    fn column(values: &[f64]) -> FunctionArg {
        FunctionArg::Range(Grid::from_fn(values.len(), 1, |r, _| CellValue::Number(values[r])))
    }

    #[test]
    fn test_check_operation() {
        assert_eq!(check_operation(&CellValue::string(" plus ")).unwrap(), "plus");
        assert!(check_operation(&CellValue::string("")).is_err());
        assert!(check_operation(&CellValue::Number(1.0)).is_err());
        assert!(check_operation(&CellValue::Empty).is_err());
    }

    #[test]
    fn test_check_args_names_position() {
        let args = vec![
            CellValue::Number(1.0),
            CellValue::string("ok"),
            CellValue::string("#REF! (deleted)"),
        ];
        let err = check_args(&args).unwrap_err();
        assert_eq!(err.to_string(), "argument 3 contains a sheet error (#REF!)");
        assert!(check_args(&args[..2]).is_ok());
    }

    #[test]
    fn test_every_marker_is_caught() {
        for marker in CellError::ALL {
            let exact = CellValue::string(marker.as_str());
            let prefixed = CellValue::string(format!("{} detail", marker.as_str()));
            assert!(check_args(&[exact]).is_err(), "{}", marker);
            assert!(check_args(&[prefixed]).is_err(), "{}", marker);
        }
        assert!(check_args(&[CellValue::string("total #N/A")]).is_ok());
    }

    #[test]
    fn test_check_grid_names_cell() {
        let grid = Grid::from_rows(vec![
            vec![CellValue::Number(1.0), CellValue::Empty],
            vec![CellValue::Empty, CellValue::string("#NAME?")],
        ])
        .unwrap();
        let err = check_grid("Model", &grid).unwrap_err();
        assert_eq!(err.to_string(), "cell Model!B2 contains a sheet error (#NAME?)");
    }

    #[test]
    fn test_sumifs_length_mismatch() {
        let sum: Vec<f64> = (0..10).map(f64::from).collect();
        let criteria: Vec<f64> = (0..8).map(f64::from).collect();
        let args = vec![
            column(&sum),
            column(&criteria),
            FunctionArg::Scalar(CellValue::string(">3")),
        ];
        let err = validate_sumifs(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "criteria_range 1 has 8 cells but sum_range has 10"
        );
    }

    #[test]
    fn test_sumifs_arity() {
        let one = column(&[1.0]);
        assert!(validate_sumifs(&[one.clone(), one.clone()]).is_err());
        assert!(validate_sumifs(&[one.clone(), one.clone(), one.clone(), one.clone()]).is_err());
    }

    #[test]
    fn test_sumifs_builds_request() {
        let args = vec![
            column(&[1.0, 2.0]),
            FunctionArg::Range(
                Grid::from_rows(vec![vec![CellValue::string("a"), CellValue::string("b")]]).unwrap(),
            ),
            FunctionArg::Scalar(CellValue::string("")),
        ];
        let request = validate_sumifs(&args).unwrap();
        assert_eq!(request.operation, "sumifs");
        assert_eq!(request.sum_range, vec![WireValue::Integer(1), WireValue::Integer(2)]);
        assert_eq!(request.criteria_pairs[0].criteria, WireValue::Null);
    }

    #[test]
    fn test_sumifs_sentinels() {
        let args = vec![
            column(&[1.0]),
            column(&[1.0]),
            FunctionArg::Scalar(CellValue::string("#VALUE!")),
        ];
        assert_eq!(
            validate_sumifs(&args).unwrap_err().to_string(),
            "criteria 1 contains a sheet error (#VALUE!)"
        );
    }

    #[test]
    fn test_iferror() {
        let div0 = CellValue::string("#DIV/0!");
        assert_eq!(iferror(Some(div0.clone()), Some(CellValue::Number(0.0))), CellValue::Number(0.0));
        assert_eq!(iferror(Some(div0), None), CellValue::string(""));
        assert_eq!(iferror(Some(CellValue::Number(4.0)), None), CellValue::Number(4.0));
        assert_eq!(iferror(None, Some(CellValue::Number(1.0))), CellValue::string(""));
    }
}
