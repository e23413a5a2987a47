//! The street graph arena and its connection/removal protocol.
//!
//! # Data layout
//!
//! Vertices and edges live in two arena `Vec`s indexed by [`VertexId`] and
//! [`EdgeId`].  Removal leaves a `None` tombstone so ids are never reused and
//! a stale id held by a spatial index or a search state simply resolves to
//! nothing.
//!
//! # Mutation
//!
//! Topology changes (`connect`, `remove_edge`, splits, setters) take
//! `&mut self` and run before the graph is shared with search threads.
//! Turn-restriction changes take `&self`: each edge's list is copy-on-write
//! and may be edited while searches read it.

use std::sync::Arc;

use log::{debug, warn};
use rustc_hash::FxHashMap;

use st_core::{EdgeId, GeoPoint, StreetTraversalPermission, TraverseMode, VertexId};
use st_geometry::uncompact_line_string;

use crate::elevation::StreetElevationExtension;
use crate::extension::StreetEdgeCostExtension;
use crate::flags::StreetEdgeFlags;
use crate::rental::RentalRestriction;
use crate::restriction::TurnRestriction;
use crate::street::StreetEdge;
use crate::vertex::{Vertex, VertexKind};
use crate::{Edge, EdgeKind, GraphError, GraphResult};

#[derive(Debug, Default)]
pub struct Graph {
    vertices: Vec<Option<Vertex>>,
    edges: Vec<Option<Edge>>,
    labels: FxHashMap<Arc<str>, VertexId>,
    live_vertices: usize,
    live_edges: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
            labels: FxHashMap::with_capacity_and_hasher(vertices, Default::default()),
            live_vertices: 0,
            live_edges: 0,
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.live_vertices
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    pub fn is_empty(&self) -> bool {
        self.live_vertices == 0
    }

    // ── Vertices ──────────────────────────────────────────────────────────

    /// Add a vertex.  A label already in use is re-pointed at the new vertex.
    pub fn add_vertex(
        &mut self,
        label: impl Into<Arc<str>>,
        coordinate: GeoPoint,
        kind: VertexKind,
    ) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        let label: Arc<str> = label.into();
        self.labels.insert(Arc::clone(&label), id);
        self.vertices.push(Some(Vertex::new(id, label, coordinate, kind)));
        self.live_vertices += 1;
        id
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index()).and_then(Option::as_ref)
    }

    pub fn try_vertex(&self, id: VertexId) -> GraphResult<&Vertex> {
        self.vertex(id).ok_or(GraphError::VertexNotFound(id))
    }

    fn vertex_mut(&mut self, id: VertexId) -> GraphResult<&mut Vertex> {
        self.vertices
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(GraphError::VertexNotFound(id))
    }

    pub fn vertex_by_label(&self, label: &str) -> Option<VertexId> {
        self.labels.get(label).copied()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().flatten()
    }

    /// Remove a vertex and every edge touching it.
    pub fn remove_vertex(&mut self, id: VertexId) -> GraphResult<()> {
        let v = self.try_vertex(id)?;
        let mut touching: Vec<EdgeId> = v.outgoing().to_vec();
        touching.extend(v.incoming().iter().filter(|e| !v.outgoing().contains(e)));
        for e in touching {
            self.remove_edge(e)?;
        }
        if let Some(v) = self.vertices[id.index()].take() {
            if self.labels.get(v.label()) == Some(&id) {
                self.labels.remove(v.label());
            }
            self.live_vertices -= 1;
        }
        Ok(())
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    pub fn try_edge(&self, id: EdgeId) -> GraphResult<&Edge> {
        self.edge(id).ok_or(GraphError::EdgeNotFound(id))
    }

    fn edge_mut(&mut self, id: EdgeId) -> GraphResult<&mut Edge> {
        self.edges
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(GraphError::EdgeNotFound(id))
    }

    /// The street edge `id`.
    pub fn street(&self, id: EdgeId) -> GraphResult<&StreetEdge> {
        self.try_edge(id)?.as_street().ok_or(GraphError::NotAStreetEdge(id))
    }

    fn street_mut(&mut self, id: EdgeId) -> GraphResult<&mut StreetEdge> {
        match self.edge_mut(id)?.kind_mut() {
            EdgeKind::Street(s) => Ok(s),
            _ => Err(GraphError::NotAStreetEdge(id)),
        }
    }

    /// Live edges with their ids.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId(i as u32), e)))
    }

    /// Publish a built edge: register it in `from.outgoing` and `to.incoming`.
    pub fn connect(&mut self, edge: Edge) -> GraphResult<EdgeId> {
        self.try_vertex(edge.from())?;
        self.try_vertex(edge.to())?;
        let id = EdgeId(self.edges.len() as u32);
        let (from, to) = (edge.from(), edge.to());
        self.edges.push(Some(edge));
        self.vertex_mut(from)?.add_outgoing(id);
        self.vertex_mut(to)?.add_incoming(id);
        self.live_edges += 1;
        Ok(id)
    }

    /// Deregister and drop an edge.
    ///
    /// For street edges, turn restrictions from this edge and restrictions on
    /// the edges leading into it that point at it are cleared first.
    pub fn remove_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self.try_edge(id)?;
        let (from, to) = (edge.from(), edge.to());
        if let Some(street) = edge.as_street() {
            street.turn_restrictions().remove_all();
            for &incoming in self.try_vertex(from)?.incoming() {
                if let Some(s) = self.edge(incoming).and_then(Edge::as_street) {
                    let removed = s.turn_restrictions().remove_to(id);
                    if removed > 0 {
                        debug!("removed {removed} turn restrictions from {incoming} to {id}");
                    }
                }
            }
        }
        self.vertex_mut(from)?.remove_outgoing(id);
        self.vertex_mut(to)?.remove_incoming(id);
        self.live_edges -= 1;
        self.edges[id.index()].take().ok_or(GraphError::EdgeNotFound(id))
    }

    /// `true` if `id` is live and listed in its `to` vertex's incoming list.
    pub fn is_reachable_from_graph(&self, id: EdgeId) -> bool {
        self.edge(id)
            .and_then(|e| self.vertex(e.to()))
            .is_some_and(|v| v.incoming().contains(&id))
    }

    /// Identity, or `a` is a temporary fragment of `b`.
    pub fn is_equivalent(&self, a: EdgeId, b: EdgeId) -> bool {
        a == b
            || self
                .edge(a)
                .and_then(Edge::as_street)
                .and_then(StreetEdge::parent)
                .is_some_and(|p| p == b)
    }

    /// Permission of a street edge intersected with barriers at both ends.
    pub fn permission_with_barriers(&self, id: EdgeId) -> GraphResult<StreetTraversalPermission> {
        let edge = self.try_edge(id)?;
        let street = edge.as_street().ok_or(GraphError::NotAStreetEdge(id))?;
        let from = self.try_vertex(edge.from())?.barrier_permission();
        let to = self.try_vertex(edge.to())?.barrier_permission();
        Ok(street.permission().intersection(from).intersection(to))
    }

    pub fn can_traverse_with_barriers(&self, id: EdgeId, mode: TraverseMode) -> bool {
        self.permission_with_barriers(id).is_ok_and(|p| p.allows(mode))
    }

    /// Geometry of a street edge in its direction of travel.
    pub fn street_geometry(&self, id: EdgeId) -> GraphResult<Vec<GeoPoint>> {
        let edge = self.try_edge(id)?;
        let street = edge.as_street().ok_or(GraphError::NotAStreetEdge(id))?;
        let from = self.try_vertex(edge.from())?.coordinate();
        let to = self.try_vertex(edge.to())?.coordinate();
        Ok(uncompact_line_string(from, to, street.compact_geometry(), street.is_back())?)
    }

    /// Make `a` use `b`'s geometry buffer.  Only done when the bytes match,
    /// as they do for the two members of a bidirectional pair; otherwise
    /// logged and `false`.
    pub fn share_geometry(&mut self, a: EdgeId, b: EdgeId) -> GraphResult<bool> {
        let theirs = Arc::clone(self.street(b)?.compact_geometry());
        let mine = self.street_mut(a)?;
        if **mine.compact_geometry() == *theirs {
            mine.set_compact_geometry(theirs);
            Ok(true)
        } else {
            warn!("can't share geometry between {a} and {b}");
            Ok(false)
        }
    }

    // ── Turn restrictions ─────────────────────────────────────────────────

    /// Add `r` to the list of `r.from`.  Safe while searches are running.
    ///
    /// `r.from` must end where `r.to` starts.
    pub fn add_turn_restriction(&self, r: TurnRestriction) -> GraphResult<()> {
        let via = self.try_edge(r.to)?.from();
        let from = self.try_edge(r.from)?;
        if from.to() != via {
            return Err(GraphError::NonAdjacentTurnRestriction { from: r.from, to: r.to });
        }
        self.street(r.from)?.turn_restrictions().add(r);
        Ok(())
    }

    pub fn remove_turn_restriction(&self, r: &TurnRestriction) -> GraphResult<bool> {
        Ok(self.street(r.from)?.turn_restrictions().remove(r))
    }

    /// Current restrictions from `id`.
    pub fn turn_restrictions(&self, id: EdgeId) -> GraphResult<Arc<[TurnRestriction]>> {
        Ok(self.street(id)?.turn_restrictions().snapshot())
    }

    // ── Rental restrictions ───────────────────────────────────────────────

    pub fn add_rental_restriction(&mut self, v: VertexId, r: RentalRestriction) -> GraphResult<()> {
        self.vertex_mut(v)?.add_rental_restriction(r);
        Ok(())
    }

    pub fn remove_rental_restriction(
        &mut self,
        v: VertexId,
        r: &RentalRestriction,
    ) -> GraphResult<bool> {
        Ok(self.vertex_mut(v)?.remove_rental_restriction(r))
    }

    /// Give `to` every rental restriction of `from`.
    pub(crate) fn copy_rental_restrictions(&mut self, from: VertexId, to: VertexId) -> GraphResult<()> {
        if from == to {
            return Ok(());
        }
        let source = self.try_vertex(from)?.rental_restrictions().clone();
        if source.has_restrictions() {
            self.vertex_mut(to)?.rental_restrictions_mut().extend_from(&source);
        }
        Ok(())
    }

    // ── Street-edge setters ───────────────────────────────────────────────

    pub fn set_permission(&mut self, id: EdgeId, permission: StreetTraversalPermission) -> GraphResult<()> {
        self.street_mut(id)?.set_permission(permission);
        Ok(())
    }

    /// # Errors
    ///
    /// The factor is not finite and positive, or the edge has an elevation
    /// extension.
    pub fn set_bicycle_safety_factor(&mut self, id: EdgeId, factor: f32) -> GraphResult<()> {
        self.street_mut(id)?.set_bicycle_safety_factor(factor)
    }

    /// # Errors
    ///
    /// As [`set_bicycle_safety_factor`](Self::set_bicycle_safety_factor).
    pub fn set_walk_safety_factor(&mut self, id: EdgeId, factor: f32) -> GraphResult<()> {
        self.street_mut(id)?.set_walk_safety_factor(factor)
    }

    pub fn set_elevation_extension(
        &mut self,
        id: EdgeId,
        ext: Option<StreetElevationExtension>,
    ) -> GraphResult<()> {
        self.street_mut(id)?.set_elevation(ext);
        Ok(())
    }

    pub fn set_name(&mut self, id: EdgeId, name: impl Into<Arc<str>>) -> GraphResult<()> {
        self.street_mut(id)?.set_name(name.into());
        Ok(())
    }

    pub fn set_cost_extension(
        &mut self,
        id: EdgeId,
        ext: Option<Arc<dyn StreetEdgeCostExtension>>,
    ) -> GraphResult<()> {
        self.street_mut(id)?.set_cost_extension(ext);
        Ok(())
    }

    /// Edit the packed flags of a street edge.
    pub fn update_flags(
        &mut self,
        id: EdgeId,
        f: impl FnOnce(&mut StreetEdgeFlags),
    ) -> GraphResult<()> {
        f(self.street_mut(id)?.flags_mut());
        Ok(())
    }
}
