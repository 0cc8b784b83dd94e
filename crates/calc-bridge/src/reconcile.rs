//! Writing a sheet evaluation back into the document
//!
//! Results land in a derived sheet named after the source (`"Model"` →
//! `"Model Results"`), cloned from the source so formatting carries over.
//! Values go through the raw write path, so result text that looks like a
//! formula is never re-evaluated by the host.

use tracing::{debug, info, warn};

use calc_bridge_core::{
    CellAddress, CellValue, Error as DocumentError, Grid, HostDocument, MAX_COLS, MAX_ROWS,
};
use calc_bridge_protocol::WireValue;

use crate::error::{BridgeError, Result};

/// Suffix that marks a derived results sheet
pub const RESULTS_SUFFIX: &str = " Results";

/// Name of the results sheet derived from `source`
pub fn derived_sheet_name(source: &str) -> String {
    format!("{}{}", source, RESULTS_SUFFIX)
}

/// Whether a sheet name denotes a derived results sheet
///
/// Name-based only: a renamed results sheet is no longer recognized.
pub fn is_derived_sheet(name: &str) -> bool {
    name.ends_with(RESULTS_SUFFIX)
}

/// Refuse to treat a results sheet as a source
pub fn ensure_source_sheet(name: &str) -> Result<()> {
    if is_derived_sheet(name) {
        return Err(BridgeError::SelfReferential(name.to_string()));
    }
    Ok(())
}

/// Pad result rows to the widest row with empty text
pub fn rectangularize(results: Vec<Vec<WireValue>>) -> Result<Grid<CellValue>> {
    let rows: Vec<Vec<CellValue>> = results
        .into_iter()
        .map(|row| row.into_iter().map(CellValue::from).collect())
        .collect();
    let grid = Grid::from_ragged(rows, CellValue::string(""));
    if grid.is_empty() {
        return Err(BridgeError::EmptyResult);
    }
    Ok(grid)
}

/// Refuse a grid the host sheet cannot hold
pub fn ensure_fits(grid: &Grid<CellValue>) -> Result<()> {
    let (rows, cols) = grid.dimensions();
    let last_row = u32::try_from(rows.saturating_sub(1)).unwrap_or(u32::MAX);
    let last_col = u32::try_from(cols.saturating_sub(1)).unwrap_or(u32::MAX);
    if last_row >= MAX_ROWS {
        return Err(DocumentError::RowOutOfBounds(last_row, MAX_ROWS - 1).into());
    }
    if last_col >= MAX_COLS {
        return Err(DocumentError::ColumnOutOfBounds(last_col, MAX_COLS - 1).into());
    }
    Ok(())
}

/// Replace the derived sheet of `source` with `results`
///
/// Checks run before the document is touched: the source must not itself be
/// a results sheet, and the results must be non-empty and fit on a sheet. A
/// write that still fails removes the partial results sheet. Returns the
/// name of the sheet written.
pub fn reconcile<H: HostDocument + ?Sized>(
    host: &mut H,
    source: &str,
    results: Vec<Vec<WireValue>>,
) -> Result<String> {
    ensure_source_sheet(source)?;
    let grid = rectangularize(results)?;
    ensure_fits(&grid)?;
    let target = derived_sheet_name(source);

    if host.has_sheet(&target) {
        debug!(sheet = %target, "removing stale results sheet");
        host.delete_sheet(&target)?;
    }
    host.clone_with_format(source, &target)?;
    let written = host
        .clear_contents(&target)
        .and_then(|_| host.write_values(&target, CellAddress::new(0, 0), &grid));
    if let Err(e) = written {
        warn!(sheet = %target, error = %e, "results write failed; removing partial sheet");
        host.delete_sheet(&target)?;
        return Err(e.into());
    }

    let (rows, cols) = grid.dimensions();
    info!(source, target = %target, rows, cols, "results written");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_bridge_core::{CellState, Style, Workbook};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn int(i: i64) -> WireValue {
        WireValue::Integer(i)
    }

    proptest! {
        #[test]
        fn padded_rows_share_the_widest_length(
            lengths in prop::collection::vec(0usize..8, 1..10)
        ) {
            prop_assume!(lengths.iter().any(|&n| n > 0));
            let widest = lengths.iter().copied().max().unwrap_or(0);
            let results: Vec<Vec<WireValue>> = lengths
                .iter()
                .map(|&n| (0..n as i64).map(int).collect())
                .collect();

            let grid = rectangularize(results).unwrap();
            prop_assert_eq!(grid.dimensions(), (lengths.len(), widest));
            for (r, &n) in lengths.iter().enumerate() {
                for c in 0..widest {
                    let expected = if c < n {
                        CellValue::Number(c as f64)
                    } else {
                        CellValue::string("")
                    };
                    prop_assert_eq!(grid.get(r, c), Some(&expected));
                }
            }
        }
    }

    #[test]
    fn test_rectangularize_pads_to_widest_row() {
        let grid = rectangularize(vec![
            vec![int(1), int(2), int(3)],
            vec![int(1), int(2), int(3), int(4), int(5)],
            vec![int(1), int(2)],
        ])
        .unwrap();
        assert_eq!(grid.dimensions(), (3, 5));
        assert!(grid.rows().all(|row| row.len() == 5));
        assert_eq!(grid.get(2, 4), Some(&CellValue::string("")));
    }

    #[test]
    fn test_empty_results_rejected() {
        assert!(matches!(rectangularize(vec![]), Err(BridgeError::EmptyResult)));
        assert!(matches!(rectangularize(vec![vec![], vec![]]), Err(BridgeError::EmptyResult)));
        assert_eq!(BridgeError::EmptyResult.to_string(), "server returned no results");
    }

    #[test]
    fn test_suffix_guard() {
        assert_eq!(derived_sheet_name("Model"), "Model Results");
        assert!(is_derived_sheet("Model Results"));
        assert!(!is_derived_sheet("Results"));

        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Model Results").unwrap();
        let err = reconcile(&mut wb, "Model Results", vec![vec![int(1)]]).unwrap_err();
        assert!(matches!(err, BridgeError::SelfReferential(_)));
        assert_eq!(wb.sheet_names(), vec!["Model Results"]);
    }

    #[test]
    fn test_oversized_results_keep_previous_sheet() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Model").unwrap();
        wb.add_worksheet_with_name("Model Results").unwrap();
        wb.worksheet_by_name_mut("Model Results")
            .unwrap()
            .set_cell_value("A1", "previous run")
            .unwrap();

        let wide: Vec<Vec<WireValue>> = vec![(0..=i64::from(MAX_COLS)).map(int).collect()];
        let err = reconcile(&mut wb, "Model", wide).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Document(DocumentError::ColumnOutOfBounds(..))
        ));

        assert_eq!(wb.sheet_names(), vec!["Model", "Model Results"]);
        let previous = wb.worksheet_by_name("Model Results").unwrap();
        assert_eq!(previous.get_value_at(0, 0), CellValue::string("previous run"));
    }

    #[test]
    fn test_reconcile_replaces_stale_sheet() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Model").unwrap();
        {
            let ws = wb.worksheet_by_name_mut("Model").unwrap();
            ws.set_cell_value("A1", "label").unwrap();
            ws.set_cell_formula("B1", "=1+1").unwrap();
            ws.set_cell_value("D9", "far away").unwrap();
            ws.set_cell_style_at(0, 0, &Style::new().bold(true)).unwrap();
        }
        wb.add_worksheet_with_name("Model Results").unwrap();
        wb.worksheet_by_name_mut("Model Results")
            .unwrap()
            .set_cell_value("Z1", "stale")
            .unwrap();

        let target = reconcile(
            &mut wb,
            "Model",
            vec![
                vec![WireValue::String("label".into()), int(2)],
                vec![WireValue::String("=looks like a formula".into())],
            ],
        )
        .unwrap();
        assert_eq!(target, "Model Results");

        let out = wb.worksheet_by_name("Model Results").unwrap();
        assert_eq!(out.get_value_at(0, 1), CellValue::Number(2.0));
        assert_eq!(out.get_value_at(1, 1), CellValue::string(""));
        assert_eq!(out.get_value_at(0, 25), CellValue::Empty);
        assert_eq!(out.get_value_at(8, 3), CellValue::Empty);
        assert_eq!(out.cell_state_at(1, 0), CellState::FrozenText);
        assert!(out.cell_style_at(0, 0).bold);

        // the source is untouched
        let source = wb.worksheet_by_name("Model").unwrap();
        assert_eq!(source.get_formula_at(0, 1), Some("=1+1"));
        assert_eq!(wb.sheet_count(), 2);
    }
}
