//! Menu commands
//!
//! The host's menu drives whole-sheet evaluation and freezing. Commands show
//! a blocking alert on failure and abort before any write-back, so a failed
//! evaluation leaves every existing sheet as it was.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use calc_bridge_core::{CellRange, HostDocument};
use calc_bridge_protocol::SheetStats;

use crate::classify;
use crate::codec::SheetBatch;
use crate::error::{BridgeError, Result};
use crate::freeze::{self, FreezeReport};
use crate::reconcile;
use crate::transport::Transport;
use crate::CalcBridge;

/// Entries of the host menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    ComputeAll,
    FreezeAll,
    FreezeSelection,
    UnfreezeAll,
    UnfreezeSelection,
}

impl MenuCommand {
    /// Every entry, in menu order
    pub const ALL: [MenuCommand; 5] = [
        MenuCommand::ComputeAll,
        MenuCommand::FreezeAll,
        MenuCommand::FreezeSelection,
        MenuCommand::UnfreezeAll,
        MenuCommand::UnfreezeSelection,
    ];

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            MenuCommand::ComputeAll => "Compute all",
            MenuCommand::FreezeAll => "Freeze formulas (all)",
            MenuCommand::FreezeSelection => "Freeze formulas (selection)",
            MenuCommand::UnfreezeAll => "Unfreeze formulas (all)",
            MenuCommand::UnfreezeSelection => "Unfreeze formulas (selection)",
        }
    }
}

impl fmt::Display for MenuCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The active sheet and the user's selected range on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub sheet: String,
    pub range: CellRange,
}

/// User-facing notifications of the host
pub trait HostUi {
    /// Blocking message the user must dismiss
    fn alert(&mut self, title: &str, message: &str);

    /// Transient status message
    fn toast(&mut self, title: &str, message: &str);
}

/// Summary of a whole-sheet evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeReport {
    pub source: String,
    pub target: String,
    pub elapsed: Duration,
    pub stats: Option<SheetStats>,
}

impl fmt::Display for ComputeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' computed into '{}' in {:.2}s",
            self.source,
            self.target,
            self.elapsed.as_secs_f64()
        )?;
        let counters: Vec<String> = self
            .stats
            .iter()
            .flat_map(|stats| {
                [
                    stats.formula_cells.map(|n| format!("{} formula cells", n)),
                    stats.total_cells.map(|n| format!("{} total cells", n)),
                ]
            })
            .flatten()
            .collect();
        if !counters.is_empty() {
            write!(f, " ({})", counters.join(", "))?;
        }
        Ok(())
    }
}

/// What a successful menu command did
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Computed(ComputeReport),
    Frozen(FreezeReport),
    Unfrozen(FreezeReport),
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Computed(report) => write!(f, "{}", report),
            CommandOutcome::Frozen(report) if report.changed() => {
                write!(f, "{} formulas frozen", report.transitioned)
            }
            CommandOutcome::Unfrozen(report) if report.changed() => {
                write!(f, "{} formulas unfrozen", report.transitioned)
            }
            _ => f.write_str("no formulas to convert"),
        }
    }
}

const UI_TITLE: &str = "calc-bridge";

impl<T: Transport> CalcBridge<T> {
    /// Evaluate a whole sheet remotely and write the results sheet
    ///
    /// Nothing in the document changes unless the service answered with a
    /// non-empty result.
    pub fn compute_all<H: HostDocument + ?Sized>(
        &self,
        host: &mut H,
        sheet: &str,
    ) -> Result<ComputeReport> {
        reconcile::ensure_source_sheet(sheet)?;

        let started = Instant::now();
        let batch = SheetBatch::from_host(host, sheet)?;
        if batch.is_empty() {
            return Err(BridgeError::input(format!("sheet '{}' has no data", sheet)));
        }
        classify::check_grid(sheet, &batch.values)?;

        let response = self.dispatcher().eval_sheet(&batch)?;
        let results = response.results.unwrap_or_default();
        let target = reconcile::reconcile(host, sheet, results)?;

        let report = ComputeReport {
            source: sheet.to_string(),
            target,
            elapsed: started.elapsed(),
            stats: response.stats,
        };
        info!(%report, "compute all");
        Ok(report)
    }

    /// Run a menu command against the current selection
    ///
    /// Failures are reported through an alert and yield `None`; successes
    /// through a toast.
    pub fn execute<H, U>(
        &self,
        command: MenuCommand,
        host: &mut H,
        ui: &mut U,
        selection: &Selection,
    ) -> Option<CommandOutcome>
    where
        H: HostDocument + ?Sized,
        U: HostUi + ?Sized,
    {
        let sheet = selection.sheet.as_str();
        let outcome = match command {
            MenuCommand::ComputeAll => self.compute_all(host, sheet).map(CommandOutcome::Computed),
            MenuCommand::FreezeAll => freeze::freeze_all(host, sheet).map(CommandOutcome::Frozen),
            MenuCommand::FreezeSelection => {
                freeze::freeze_range(host, sheet, &selection.range).map(CommandOutcome::Frozen)
            }
            MenuCommand::UnfreezeAll => {
                freeze::unfreeze_all(host, sheet).map(CommandOutcome::Unfrozen)
            }
            MenuCommand::UnfreezeSelection => {
                freeze::unfreeze_range(host, sheet, &selection.range).map(CommandOutcome::Unfrozen)
            }
        };

        match outcome {
            Ok(outcome) => {
                ui.toast(UI_TITLE, &outcome.to_string());
                Some(outcome)
            }
            Err(e) => {
                warn!(command = %command, error = %e, "command failed");
                ui.alert(UI_TITLE, &format!("{} failed: {}", command.label(), e));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labels() {
        let labels: Vec<_> = MenuCommand::ALL.iter().map(MenuCommand::label).collect();
        assert_eq!(
            labels,
            vec![
                "Compute all",
                "Freeze formulas (all)",
                "Freeze formulas (selection)",
                "Unfreeze formulas (all)",
                "Unfreeze formulas (selection)",
            ]
        );
    }

    #[test]
    fn test_report_display() {
        let report = ComputeReport {
            source: "Model".into(),
            target: "Model Results".into(),
            elapsed: Duration::from_millis(1250),
            stats: Some(SheetStats {
                formula_cells: Some(3),
                total_cells: Some(12),
            }),
        };
        assert_eq!(
            report.to_string(),
            "'Model' computed into 'Model Results' in 1.25s (3 formula cells, 12 total cells)"
        );
        let partial = ComputeReport {
            stats: Some(SheetStats {
                formula_cells: None,
                total_cells: Some(12),
            }),
            ..report.clone()
        };
        assert_eq!(
            partial.to_string(),
            "'Model' computed into 'Model Results' in 1.25s (12 total cells)"
        );
        let bare = ComputeReport {
            stats: Some(SheetStats::default()),
            ..report
        };
        assert_eq!(bare.to_string(), "'Model' computed into 'Model Results' in 1.25s");
        assert_eq!(
            CommandOutcome::Frozen(FreezeReport::default()).to_string(),
            "no formulas to convert"
        );
    }
}
