//! Error types for the bridge

use calc_bridge_core::CellError;
use thiserror::Error;

/// Result type alias using [`BridgeError`]
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Everything that can stop a bridge operation
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Caller-supplied input is unusable (missing operation, bad arity, ...)
    #[error("{0}")]
    Input(String),

    /// An input carries a host error sentinel; nothing was sent
    #[error("{location} contains a sheet error ({marker})")]
    Sentinel { location: String, marker: CellError },

    /// The request never produced an HTTP response
    #[error("network error: {0}")]
    Transport(String),

    /// The response was not JSON
    #[error("server did not return JSON (HTTP {status})")]
    NotJson { status: u16 },

    /// Non-200 response; the server's message is surfaced verbatim
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A sheet evaluation succeeded but carried nothing to write back
    #[error("server returned no results")]
    EmptyResult,

    /// A JSON response did not have the expected shape
    #[error("invalid response: {0}")]
    Parse(String),

    /// Evaluation was requested on a sheet that is itself a results sheet
    #[error("'{0}' is a results sheet; run the computation on its source sheet")]
    SelfReferential(String),

    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// The host document rejected an operation
    #[error(transparent)]
    Document(#[from] calc_bridge_core::Error),
}

impl BridgeError {
    /// Create an input error with a message
    pub fn input<S: Into<String>>(msg: S) -> Self {
        BridgeError::Input(msg.into())
    }

    /// Create a config error with a message
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BridgeError::Config(msg.into())
    }

    /// Whether the error was raised locally, before any network call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            BridgeError::Input(_)
                | BridgeError::Sentinel { .. }
                | BridgeError::SelfReferential(_)
                | BridgeError::Config(_)
        )
    }
}
