//! Traversal error type.

use thiserror::Error;

use st_core::{CoreError, EdgeId, VertexId};
use st_graph::GraphError;

/// Errors produced by `st-traverse`.
///
/// An edge that cannot be traversed is not an error: it yields no
/// successor states.  These variants cover misuse by the caller.
#[derive(Debug, Error, PartialEq)]
pub enum TraverseError {
    /// The state is not at the vertex the edge is entered from.
    #[error("state at {state_vertex} cannot traverse {edge}, which is entered at {entry_vertex}")]
    WrongVertex {
        edge: EdgeId,
        state_vertex: VertexId,
        entry_vertex: VertexId,
    },

    #[error("invalid routing preferences: {0}")]
    Config(#[from] CoreError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type TraverseResult<T> = Result<T, TraverseError>;
