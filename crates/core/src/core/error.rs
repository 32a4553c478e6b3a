use thiserror::Error;

use crate::catalog::GridSize;

/// Errors surfaced by the replay session and the wire layer.
///
/// Transport and shape failures are carried as strings because the browser
/// and native clients produce them from unrelated error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlitherError {
    #[error("a load is already in flight")]
    LoadInFlight,

    #[error("unknown agent code: {0:?}")]
    UnknownAgent(String),

    #[error("unsupported grid size: {0}")]
    UnknownGridSize(u32),

    #[error("training budget {label:?} is not offered for agent {agent}")]
    UnknownTraining { agent: &'static str, label: String },

    #[error("malformed simulation response: {0}")]
    Shape(String),

    #[error("cell {cell} is outside a {grid} grid")]
    CellOutOfRange { cell: u32, grid: GridSize },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("no history entry at index {0}")]
    NoSuchEntry(usize),

    #[error("no history entry with id {0}")]
    NoSuchEntryId(u64),
}

impl From<serde_json::Error> for SlitherError {
    fn from(e: serde_json::Error) -> Self {
        SlitherError::Shape(e.to_string())
    }
}

pub type Result<T> = core::result::Result<T, SlitherError>;
