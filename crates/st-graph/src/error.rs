//! Graph-subsystem error type.

use thiserror::Error;

use st_core::{EdgeId, VertexId};
use st_geometry::GeometryError;

/// Errors produced by `st-graph`.
///
/// Only construction-time operations fail.  Traversal never sees these.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("vertex {0} not found in graph")]
    VertexNotFound(VertexId),

    #[error("edge {0} not found in graph")]
    EdgeNotFound(EdgeId),

    #[error("edge {0} is not a street edge")]
    NotAStreetEdge(EdgeId),

    #[error("invalid {kind} safety factor {value}: must be finite and positive")]
    InvalidSafetyFactor { kind: &'static str, value: f32 },

    #[error("cannot set {0} safety factor on an edge with an elevation extension")]
    SafetyFactorWithElevation(&'static str),

    #[error("turn restriction from {from} to {to}: the edges do not meet")]
    NonAdjacentTurnRestriction { from: EdgeId, to: EdgeId },

    #[error("inconsistent split of {edge}: {reason}")]
    InconsistentSplit { edge: EdgeId, reason: String },

    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

pub type GraphResult<T> = Result<T, GraphError>;
