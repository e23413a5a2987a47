//! Entry points called by the outer search.

use std::sync::Arc;

use smallvec::SmallVec;

use st_core::EdgeId;
use st_graph::{Edge, EdgeKind, Graph, Vertex};

use crate::other;
use crate::state::State;
use crate::street::StreetTraversal;
use crate::{TraverseError, TraverseResult};

/// Successor states of one traversal.  Almost always zero, one or two.
pub type Successors = SmallVec<[Arc<State>; 2]>;

pub(crate) fn successors<const N: usize>(states: [Option<Arc<State>>; N]) -> Successors {
    states.into_iter().flatten().collect()
}

/// Everything a traversal reads about the edge being traversed.
pub(crate) struct EdgeContext<'g> {
    pub graph: &'g Graph,
    pub id: EdgeId,
    pub edge: &'g Edge,
    pub from: &'g Vertex,
    pub to: &'g Vertex,
}

/// Traverse edge `id` from `s0`.
///
/// An edge that cannot be traversed from `s0` (permission, U-turn, turn
/// restriction, rental or parking precondition) yields an empty
/// [`Successors`]; more than one state means the traversal forked.
///
/// # Errors
///
/// [`TraverseError::Graph`] if `id` or one of its vertices is unknown, and
/// [`TraverseError::WrongVertex`] if `s0` is not at the vertex the edge is
/// entered from (its `to` vertex in an arrive-by search).
pub fn traverse(graph: &Graph, id: EdgeId, s0: &Arc<State>) -> TraverseResult<Successors> {
    let edge = graph.try_edge(id)?;
    let entry = if s0.request().arrive_by() { edge.to() } else { edge.from() };
    if s0.vertex() != entry {
        return Err(TraverseError::WrongVertex {
            edge: id,
            state_vertex: s0.vertex(),
            entry_vertex: entry,
        });
    }
    let ctx = EdgeContext {
        graph,
        id,
        edge,
        from: graph.try_vertex(edge.from())?,
        to: graph.try_vertex(edge.to())?,
    };

    let out = match edge.kind() {
        EdgeKind::Street(street) => StreetTraversal::new(&ctx, street, s0).traverse(),
        EdgeKind::Free => other::free(&ctx, s0),
        EdgeKind::ElevatorBoard => other::elevator_board(&ctx, s0),
        EdgeKind::ElevatorHop(hop) => other::elevator_hop(&ctx, hop, s0),
        EdgeKind::ElevatorAlight => other::elevator_alight(&ctx, s0),
        EdgeKind::Escalator(escalator) => other::escalator(&ctx, escalator, s0),
        EdgeKind::Pathway(pathway) => other::pathway(&ctx, pathway, s0),
        EdgeKind::StreetTransitLink => other::street_transit_link(&ctx, s0),
        EdgeKind::VehicleParkingLink => other::vehicle_parking_link(&ctx, s0),
        EdgeKind::VehicleParking => other::vehicle_parking(&ctx, s0),
        EdgeKind::VehicleRental(rental) => other::vehicle_rental(&ctx, rental, s0),
    };
    Ok(out)
}

/// Traverse every edge leaving `s0` in search direction: outgoing edges
/// for a depart-after search, incoming edges for an arrive-by search.
pub fn expand(graph: &Graph, s0: &Arc<State>) -> TraverseResult<Vec<Arc<State>>> {
    let vertex = graph.try_vertex(s0.vertex())?;
    let edges = if s0.request().arrive_by() { vertex.incoming() } else { vertex.outgoing() };
    let mut out = Vec::with_capacity(edges.len());
    for &id in edges {
        out.extend(traverse(graph, id, s0)?);
    }
    Ok(out)
}
