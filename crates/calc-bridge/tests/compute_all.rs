mod common;

use calc_bridge::{
    BridgeError, CellRange, CellState, CellValue, CommandOutcome, MenuCommand, Selection,
};
use calc_bridge_core::{HostDocument, Style};
use common::{bridge, model_workbook, MockTransport, RecordingUi};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_compute_all_writes_results_sheet() {
    let mut wb = model_workbook();
    wb.worksheet_by_name_mut("Model")
        .unwrap()
        .set_cell_style_at(0, 0, &Style::new().number_format("0.00"))
        .unwrap();

    let bridge = bridge(MockTransport::new().reply_json(
        200,
        json!({
            "results": [[10, 20], [20, 40, "extra"]],
            "stats": {"formula_cells": 2, "total_cells": 4}
        }),
    ));

    let report = bridge.compute_all(&mut wb, "Model").unwrap();
    assert_eq!(report.target, "Model Results");
    assert_eq!(report.stats.and_then(|s| s.formula_cells), Some(2));

    let calls = bridge.dispatcher().transport().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, "http://batch.test/eval_sheet");
    assert_eq!(
        calls[0].body,
        Some(json!({
            "formulas": [["", "=A1*2"], ["", "=A2*2"]],
            "values": [[10, null], [20, null]]
        }))
    );

    let results = wb.worksheet_by_name("Model Results").unwrap();
    assert_eq!(results.get_value_at(0, 1), CellValue::Number(20.0));
    assert_eq!(results.get_value_at(1, 2), CellValue::string("extra"));
    assert_eq!(results.get_value_at(0, 2), CellValue::string(""));
    assert_eq!(results.cell_style_at(0, 0).number_format.as_deref(), Some("0.00"));
    assert_eq!(results.cell_state_at(0, 1), CellState::Literal);

    // the source keeps its formulas
    let model = wb.worksheet_by_name("Model").unwrap();
    assert_eq!(model.cell_state_at(0, 1), CellState::LiveFormula);
    assert_eq!(model.cell_state_at(1, 1), CellState::FrozenText);
}

#[test]
fn test_partial_stats_keep_results() {
    let mut wb = model_workbook();
    let bridge = bridge(MockTransport::new().reply_json(
        200,
        json!({"results": [[10, 20]], "stats": {"formula_cells": 1}}),
    ));

    let report = bridge.compute_all(&mut wb, "Model").unwrap();
    assert_eq!(report.stats.and_then(|s| s.formula_cells), Some(1));
    assert_eq!(report.stats.and_then(|s| s.total_cells), None);
    assert!(report.to_string().ends_with("(1 formula cells)"));

    let results = wb.worksheet_by_name("Model Results").unwrap();
    assert_eq!(results.get_value_at(0, 1), CellValue::Number(20.0));
}

#[test]
fn test_rerun_replaces_previous_results() {
    let mut wb = model_workbook();
    let bridge = bridge(
        MockTransport::new()
            .reply_json(200, json!({"results": [[1, 2, 3], [4, 5, 6]]}))
            .reply_json(200, json!({"results": [[7]]})),
    );

    bridge.compute_all(&mut wb, "Model").unwrap();
    bridge.compute_all(&mut wb, "Model").unwrap();

    let results = wb.worksheet_by_name("Model Results").unwrap();
    assert_eq!(results.get_value_at(0, 0), CellValue::Number(7.0));
    assert_eq!(results.get_value_at(1, 2), CellValue::Empty);
    assert_eq!(wb.sheet_names(), vec!["Model", "Model Results"]);
}

#[test]
fn test_results_sheet_is_refused_before_any_call() {
    let mut wb = model_workbook();
    wb.add_worksheet_with_name("Model Results").unwrap();
    let bridge = bridge(MockTransport::new());

    let err = bridge.compute_all(&mut wb, "Model Results").unwrap_err();
    assert!(matches!(err, BridgeError::SelfReferential(_)));
    assert!(bridge.dispatcher().transport().calls().is_empty());
}

#[test]
fn test_sentinel_in_sheet_is_refused_before_any_call() {
    let mut wb = model_workbook();
    wb.worksheet_by_name_mut("Model")
        .unwrap()
        .set_cell_value("A2", "#REF!")
        .unwrap();
    let bridge = bridge(MockTransport::new());

    let err = bridge.compute_all(&mut wb, "Model").unwrap_err();
    assert_eq!(err.to_string(), "cell Model!A2 contains a sheet error (#REF!)");
    assert!(bridge.dispatcher().transport().calls().is_empty());
}

#[test]
fn test_failed_batch_leaves_document_untouched() {
    let mut wb = model_workbook();
    wb.add_worksheet_with_name("Model Results").unwrap();
    wb.worksheet_by_name_mut("Model Results")
        .unwrap()
        .set_cell_value("A1", "previous run")
        .unwrap();

    let failures = vec![
        MockTransport::new().reply_json(500, json!({"error": "cycle detected at B1"})),
        MockTransport::new().reply_json(200, json!({"results": []})),
        MockTransport::new().reply_json(200, json!({"stats": {"formula_cells": 0, "total_cells": 0}})),
        MockTransport::new().fail("timed out"),
    ];

    for transport in failures {
        let bridge = bridge(transport);
        assert!(bridge.compute_all(&mut wb, "Model").is_err());

        assert_eq!(wb.sheet_names(), vec!["Model", "Model Results"]);
        let previous = wb.worksheet_by_name("Model Results").unwrap();
        assert_eq!(previous.get_value_at(0, 0), CellValue::string("previous run"));
    }
}

#[test]
fn test_empty_sheet_is_an_input_error() {
    let mut wb = calc_bridge_core::Workbook::new();
    let bridge = bridge(MockTransport::new());
    assert!(matches!(
        bridge.compute_all(&mut wb, "Sheet1"),
        Err(BridgeError::Input(_))
    ));
}

#[test]
fn test_menu_reports_through_ui() {
    let mut wb = model_workbook();
    let mut ui = RecordingUi::default();
    let bridge = bridge(
        MockTransport::new().reply_json(400, json!({"error": "formula syntax error in B1"})),
    );
    let selection = Selection {
        sheet: "Model".into(),
        range: CellRange::parse("B1:B2").unwrap(),
    };

    let outcome = bridge.execute(MenuCommand::ComputeAll, &mut wb, &mut ui, &selection);
    assert_eq!(outcome, None);
    assert_eq!(ui.alerts, vec!["Compute all failed: formula syntax error in B1"]);
    assert!(!wb.has_sheet("Model Results"));

    let outcome = bridge.execute(MenuCommand::FreezeSelection, &mut wb, &mut ui, &selection);
    assert!(matches!(outcome, Some(CommandOutcome::Frozen(r)) if r.transitioned == 1));

    let outcome = bridge.execute(MenuCommand::UnfreezeAll, &mut wb, &mut ui, &selection);
    assert!(matches!(outcome, Some(CommandOutcome::Unfrozen(r)) if r.transitioned == 2));
    assert_eq!(
        ui.toasts,
        vec!["1 formulas frozen", "2 formulas unfrozen"]
    );
}
