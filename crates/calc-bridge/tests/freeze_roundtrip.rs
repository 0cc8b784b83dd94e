use calc_bridge::{freeze_all, freeze_range, unfreeze_all, CellRange, CellState, CellValue};
use calc_bridge_core::{Style, Workbook};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Seed {
    Number(i32),
    Text(String),
    Formula(String),
}

fn seed() -> impl Strategy<Value = Seed> {
    prop_oneof![
        any::<i32>().prop_map(Seed::Number),
        "[a-z ]{0,6}".prop_map(Seed::Text),
        "[A-C][1-4]\\*[1-9]".prop_map(|body| Seed::Formula(format!("={}", body))),
    ]
}

fn build(cells: &[Seed], width: usize) -> Workbook {
    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name("Model").unwrap();
    let ws = wb.worksheet_by_name_mut("Model").unwrap();
    for (i, cell) in cells.iter().enumerate() {
        let (row, col) = ((i / width) as u32, (i % width) as u32);
        match cell {
            Seed::Number(n) => ws.set_cell_value_at(row, col, *n).unwrap(),
            Seed::Text(s) => ws.set_cell_value_at(row, col, s.as_str()).unwrap(),
            Seed::Formula(f) => ws.set_cell_formula_at(row, col, f).unwrap(),
        }
        if i % 3 == 0 {
            ws.set_cell_style_at(row, col, &Style::new().bold(true)).unwrap();
        }
    }
    wb
}

fn snapshot(wb: &Workbook) -> Vec<(CellValue, Option<String>, bool)> {
    let ws = wb.worksheet_by_name("Model").unwrap();
    let range = CellRange::from_origin(0, 0, 6, 4).unwrap();
    range
        .cells()
        .map(|a| {
            (
                ws.get_value_at(a.row, a.col),
                ws.get_formula_at(a.row, a.col).map(str::to_string),
                ws.cell_style_at(a.row, a.col).bold,
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn unfreeze_after_freeze_restores_every_formula(cells in prop::collection::vec(seed(), 1..24)) {
        let mut wb = build(&cells, 4);
        let before = snapshot(&wb);

        let frozen = freeze_all(&mut wb, "Model").unwrap();
        let live = cells.iter().filter(|c| matches!(c, Seed::Formula(_))).count();
        prop_assert_eq!(frozen.transitioned, live);

        let ws = wb.worksheet_by_name("Model").unwrap();
        for (i, cell) in cells.iter().enumerate() {
            if matches!(cell, Seed::Formula(_)) {
                prop_assert_eq!(ws.cell_state_at((i / 4) as u32, (i % 4) as u32), CellState::FrozenText);
            }
        }

        unfreeze_all(&mut wb, "Model").unwrap();
        prop_assert_eq!(snapshot(&wb), before);
    }

    #[test]
    fn both_directions_are_idempotent(cells in prop::collection::vec(seed(), 1..24)) {
        let mut wb = build(&cells, 4);

        freeze_all(&mut wb, "Model").unwrap();
        let frozen = snapshot(&wb);
        prop_assert!(!freeze_all(&mut wb, "Model").unwrap().changed());
        prop_assert_eq!(snapshot(&wb), frozen);

        unfreeze_all(&mut wb, "Model").unwrap();
        let live = snapshot(&wb);
        prop_assert!(!unfreeze_all(&mut wb, "Model").unwrap().changed());
        prop_assert_eq!(snapshot(&wb), live);
    }

    #[test]
    fn unfreeze_on_live_formulas_changes_nothing(cells in prop::collection::vec(seed(), 1..24)) {
        let mut wb = build(&cells, 4);
        let before = snapshot(&wb);

        let report = unfreeze_all(&mut wb, "Model").unwrap();
        prop_assert!(!report.changed());
        prop_assert_eq!(snapshot(&wb), before);
    }

    #[test]
    fn freeze_without_formulas_changes_nothing(values in prop::collection::vec(any::<i32>(), 1..16)) {
        let cells: Vec<Seed> = values.into_iter().map(Seed::Number).collect();
        let mut wb = build(&cells, 4);
        let before = snapshot(&wb);

        let report = freeze_range(&mut wb, "Model", &CellRange::from_origin(0, 0, 4, 4).unwrap()).unwrap();
        prop_assert!(!report.changed());
        prop_assert_eq!(snapshot(&wb), before);
    }
}
