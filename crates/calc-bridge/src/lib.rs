//! # calc-bridge
//!
//! Offload spreadsheet formula evaluation to a remote calculation service.
//!
//! The bridge sits between a host spreadsheet (reached through the
//! [`HostDocument`] port) and an HTTP+JSON service:
//!
//! - [`freeze`] converts live formulas to inert text and back, losslessly
//! - [`codec`] splits a sheet into parallel formula and value grids
//! - [`dispatch`] sends whole-sheet or single-cell requests and validates replies
//! - [`reconcile`] writes a result grid into a derived results sheet
//! - [`classify`] rejects inputs carrying host error sentinels before any call
//! - [`functions`] and [`commands`] are the custom-function and menu surfaces
//!
//! ## Example
//!
//! ```rust
//! use calc_bridge::prelude::*;
//!
//! let mut workbook = Workbook::empty();
//! workbook.add_worksheet_with_name("Model").unwrap();
//! let sheet = workbook.worksheet_by_name_mut("Model").unwrap();
//! sheet.set_cell_value("A1", 2.0).unwrap();
//! sheet.set_cell_formula("B1", "=A1*2").unwrap();
//!
//! let report = freeze_all(&mut workbook, "Model").unwrap();
//! assert_eq!(report.transitioned, 1);
//!
//! let sheet = workbook.worksheet_by_name("Model").unwrap();
//! assert_eq!(sheet.cell_state_at(0, 1), CellState::FrozenText);
//! ```

pub mod classify;
pub mod codec;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod freeze;
pub mod functions;
pub mod prelude;
pub mod reconcile;
pub mod transport;

pub use codec::SheetBatch;
pub use commands::{CommandOutcome, ComputeReport, HostUi, MenuCommand, Selection};
pub use config::{BridgeConfig, ConfigLayer, Endpoint};
pub use dispatch::Dispatcher;
pub use error::{BridgeError, Result};
pub use freeze::{freeze_all, freeze_range, unfreeze_all, unfreeze_range, FreezeReport};
pub use functions::{batch_args, flatten_args, formula_arguments_for, FunctionArg, FunctionOutput};
pub use reconcile::{derived_sheet_name, RESULTS_SUFFIX};
pub use transport::{HttpReply, HttpTransport, Transport};

// Re-export core types
pub use calc_bridge_core::{
    CellAddress, CellData, CellError, CellRange, CellState, CellValue, Grid, HostDocument, Style,
    Workbook, Worksheet,
};

// Re-export formula and protocol types
pub use calc_bridge_formula::{extract_arguments, reference_hints, ArgumentKind, FormulaArgument};
pub use calc_bridge_protocol::{CalcResult, SheetStats, WireValue};

// Re-export CSV I/O
pub use calc_bridge_csv::{CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};

/// The bridge: a configured dispatcher plus the operations built on it
#[derive(Debug, Clone)]
pub struct CalcBridge<T: Transport = HttpTransport> {
    dispatcher: Dispatcher<T>,
}

impl CalcBridge<HttpTransport> {
    /// Create a bridge over the blocking HTTP client
    pub fn new(config: BridgeConfig) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(config)?,
        })
    }
}

impl<T: Transport> CalcBridge<T> {
    /// Create a bridge over any transport
    pub fn with_transport(config: BridgeConfig, transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::with_transport(config, transport),
        }
    }

    /// The underlying dispatcher, for direct remote calls
    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn config(&self) -> &BridgeConfig {
        self.dispatcher.config()
    }
}
