//! Graph-specific error types.

use df_core::{DfError, PartId, PoolId};

pub type GraphResult<T> = Result<T, GraphError>;

/// Vessel construction, validation and mutation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A part ID does not exist in the vessel.
    UnknownPart { part: PartId },

    /// A pool ID does not exist in the vessel.
    UnknownPool { pool: PoolId },

    /// A part's parent chain loops back on itself.
    ParentCycle { part: PartId },

    /// Parent/child lists disagree.
    InconsistentAdjacency { parent: PartId, child: PartId },

    /// A pool amount is outside `[0, capacity]` or not finite.
    AmountOutOfRange {
        pool: PoolId,
        amount: f64,
        capacity: f64,
    },

    /// A numeric part attribute is negative or not finite.
    InvalidPartValue { part: PartId, what: &'static str },

    /// A link references a part without a docking port.
    NotAPort { part: PartId },

    /// A link joins a port to itself.
    SelfLink { part: PartId },

    /// A port is already linked to another port.
    AlreadyLinked { part: PartId, other: PartId },

    /// Neither end of a new link is the root of its own tree.
    LinkNotRoot { a: PartId, b: PartId },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::UnknownPart { part } => write!(f, "Part {} does not exist", part),
            GraphError::UnknownPool { pool } => write!(f, "Pool {} does not exist", pool),
            GraphError::ParentCycle { part } => {
                write!(f, "Part {} is its own ancestor", part)
            }
            GraphError::InconsistentAdjacency { parent, child } => {
                write!(
                    f,
                    "Part {} lists child {} but the child does not reference it as parent",
                    parent, child
                )
            }
            GraphError::AmountOutOfRange {
                pool,
                amount,
                capacity,
            } => {
                write!(
                    f,
                    "Pool {} amount {} is outside [0, {}]",
                    pool, amount, capacity
                )
            }
            GraphError::InvalidPartValue { part, what } => {
                write!(f, "Part {} has an invalid {}", part, what)
            }
            GraphError::NotAPort { part } => {
                write!(f, "Part {} has no docking port", part)
            }
            GraphError::SelfLink { part } => write!(f, "Port {} cannot link to itself", part),
            GraphError::AlreadyLinked { part, other } => {
                write!(f, "Port {} is already linked to {}", part, other)
            }
            GraphError::LinkNotRoot { a, b } => {
                write!(
                    f,
                    "Cannot link {} and {}: neither is the root of its own tree",
                    a, b
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for DfError {
    fn from(err: GraphError) -> Self {
        DfError::Invariant {
            what: err.to_string(),
        }
    }
}
