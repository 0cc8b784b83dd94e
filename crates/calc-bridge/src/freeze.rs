//! Reversible conversion between live formulas and inert formula text
//!
//! A frozen cell holds its formula source as plain text, so the host stops
//! recalculating it while the source stays editable. Freezing writes through
//! the raw (non-recalculating) path; unfreezing reinstalls each formula at
//! its own absolute position. Cells in any other state pass through, so both
//! directions are idempotent. Formatting is never touched.

use tracing::{debug, info};

use calc_bridge_core::{CellRange, CellState, HostDocument};

use crate::error::Result;

/// Outcome of a freeze or unfreeze pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreezeReport {
    /// Cells examined
    pub scanned: usize,
    /// Cells that changed state
    pub transitioned: usize,
}

impl FreezeReport {
    /// Whether any cell changed state
    pub fn changed(&self) -> bool {
        self.transitioned > 0
    }
}

/// Turn every live formula in `range` into frozen text
pub fn freeze_range<H: HostDocument + ?Sized>(
    host: &mut H,
    sheet: &str,
    range: &CellRange,
) -> Result<FreezeReport> {
    let mut report = FreezeReport {
        scanned: range.cell_count() as usize,
        transitioned: 0,
    };

    // a host without a formula view has nothing live to freeze
    let Some(formulas) = host.get_formulas(sheet, range)? else {
        return Ok(report);
    };

    for (r, c, formula) in formulas.iter() {
        if formula.is_empty() {
            continue;
        }
        let cell = range.start.offset(r as u32, c as u32);
        debug!(sheet, %cell, "freezing");
        host.write_raw(sheet, cell, formula)?;
        report.transitioned += 1;
    }

    info!(sheet, range = %range, frozen = report.transitioned, "freeze complete");
    Ok(report)
}

/// Turn every frozen formula text in `range` back into a live formula
pub fn unfreeze_range<H: HostDocument + ?Sized>(
    host: &mut H,
    sheet: &str,
    range: &CellRange,
) -> Result<FreezeReport> {
    let values = host.get_grid(sheet, range)?;
    let formulas = host.get_formulas(sheet, range)?;

    let mut report = FreezeReport {
        scanned: range.cell_count() as usize,
        transitioned: 0,
    };

    for (r, c, value) in values.iter() {
        let live = formulas.as_ref().and_then(|f| f.get(r, c)).map(String::as_str);
        if CellState::classify(value, live) != CellState::FrozenText {
            continue;
        }
        let Some(text) = value.as_str() else {
            continue;
        };
        let cell = range.start.offset(r as u32, c as u32);
        debug!(sheet, %cell, "unfreezing");
        host.write_formula(sheet, cell, text)?;
        report.transitioned += 1;
    }

    info!(sheet, range = %range, unfrozen = report.transitioned, "unfreeze complete");
    Ok(report)
}

/// Freeze the whole data range of a sheet
pub fn freeze_all<H: HostDocument + ?Sized>(host: &mut H, sheet: &str) -> Result<FreezeReport> {
    match host.data_range(sheet)? {
        Some(range) => freeze_range(host, sheet, &range),
        None => Ok(FreezeReport::default()),
    }
}

/// Unfreeze the whole data range of a sheet
pub fn unfreeze_all<H: HostDocument + ?Sized>(host: &mut H, sheet: &str) -> Result<FreezeReport> {
    match host.data_range(sheet)? {
        Some(range) => unfreeze_range(host, sheet, &range),
        None => Ok(FreezeReport::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_bridge_core::{CellAddress, CellValue, Style, Workbook};
    use pretty_assertions::assert_eq;

    fn model() -> Workbook {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Model").unwrap();
        let ws = wb.worksheet_by_name_mut("Model").unwrap();
        ws.set_cell_value("A1", 2).unwrap();
        ws.set_cell_formula("B1", "=A1*2").unwrap();
        ws.set_cell_formula("C1", "=SUM(A1:B1)").unwrap();
        ws.set_cell_value("A2", "=not live").unwrap();
        ws.set_cell_style_at(0, 1, &Style::new().number_format("0.0")).unwrap();
        wb
    }

    fn state(wb: &Workbook, cell: &str) -> CellState {
        let addr = CellAddress::parse(cell).unwrap();
        wb.worksheet_by_name("Model")
            .unwrap()
            .cell_state_at(addr.row, addr.col)
    }

    fn snapshot(wb: &Workbook) -> Vec<(CellValue, Option<String>)> {
        let ws = wb.worksheet_by_name("Model").unwrap();
        CellRange::parse("A1:C2")
            .unwrap()
            .cells()
            .map(|a| {
                (
                    ws.get_value_at(a.row, a.col),
                    ws.get_formula_at(a.row, a.col).map(str::to_string),
                )
            })
            .collect()
    }

    #[test]
    fn test_freeze_all() {
        let mut wb = model();
        let report = freeze_all(&mut wb, "Model").unwrap();
        assert_eq!(report.transitioned, 2);
        assert_eq!(report.scanned, 6);
        assert_eq!(state(&wb, "B1"), CellState::FrozenText);
        assert_eq!(state(&wb, "C1"), CellState::FrozenText);
        assert_eq!(state(&wb, "A1"), CellState::Literal);

        let ws = wb.worksheet_by_name("Model").unwrap();
        assert_eq!(ws.get_value_at(0, 1), CellValue::string("=A1*2"));
        assert_eq!(ws.cell_style_at(0, 1).number_format.as_deref(), Some("0.0"));

        // second pass is a no-op
        assert!(!freeze_all(&mut wb, "Model").unwrap().changed());
    }

    #[test]
    fn test_unfreeze_selection_only() {
        let mut wb = model();
        freeze_all(&mut wb, "Model").unwrap();

        let selection = CellRange::parse("B1:B2").unwrap();
        let report = unfreeze_range(&mut wb, "Model", &selection).unwrap();
        assert_eq!(report.transitioned, 1);
        assert_eq!(state(&wb, "B1"), CellState::LiveFormula);
        assert_eq!(state(&wb, "C1"), CellState::FrozenText);
        assert_eq!(state(&wb, "A2"), CellState::FrozenText);
    }

    #[test]
    fn test_unfreeze_is_idempotent() {
        let mut wb = model();

        let live = CellRange::parse("B1:C1").unwrap();
        assert!(!unfreeze_range(&mut wb, "Model", &live).unwrap().changed());
        assert_eq!(state(&wb, "B1"), CellState::LiveFormula);
        assert_eq!(
            wb.worksheet_by_name("Model").unwrap().get_formula_at(0, 2),
            Some("=SUM(A1:B1)")
        );

        freeze_all(&mut wb, "Model").unwrap();
        assert_eq!(unfreeze_all(&mut wb, "Model").unwrap().transitioned, 3);
        let once = snapshot(&wb);

        assert!(!unfreeze_all(&mut wb, "Model").unwrap().changed());
        assert_eq!(snapshot(&wb), once);
    }

    #[test]
    fn test_empty_sheet() {
        let mut wb = Workbook::new();
        assert_eq!(freeze_all(&mut wb, "Sheet1").unwrap(), FreezeReport::default());
        assert_eq!(unfreeze_all(&mut wb, "Sheet1").unwrap(), FreezeReport::default());
        assert!(freeze_all(&mut wb, "Missing").is_err());
    }
}
