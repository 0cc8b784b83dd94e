//! Prelude module - common imports for calc-bridge users
//!
//! ```rust
//! use calc_bridge::prelude::*;
//! ```

pub use crate::{
    // Bridge
    BridgeConfig,
    BridgeError,
    CalcBridge,
    // Cell types
    CellAddress,
    CellError,
    CellRange,
    CellState,
    CellValue,
    // Menu surface
    CommandOutcome,
    ComputeReport,
    // I/O types
    CsvReader,
    CsvWriter,

    Endpoint,
    FreezeReport,
    // Custom functions
    FunctionArg,
    FunctionOutput,
    Grid,
    HostDocument,
    HostUi,
    MenuCommand,
    Result,
    Selection,
    SheetBatch,
    Transport,
    // Main types
    Workbook,
    Worksheet,
};

pub use crate::freeze::{freeze_all, freeze_range, unfreeze_all, unfreeze_range};
