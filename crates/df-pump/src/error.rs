//! Error types for pump operations.

use df_core::PartId;
use df_graph::GraphError;
use thiserror::Error;

/// Errors surfaced by pumps. Stop conditions are not errors.
#[derive(Error, Debug)]
pub enum PumpError {
    #[error("Invalid setting: {what}")]
    InvalidSetting { what: String },

    #[error("No connector on part {part}")]
    UnknownConnector { part: PartId },

    #[error("Part {part} already hosts a connector")]
    DuplicateConnector { part: PartId },

    #[error("Part {part} has no docking port")]
    NotAPort { part: PartId },

    #[error("Host graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type PumpResult<T> = Result<T, PumpError>;
