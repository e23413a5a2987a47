//! Splitting street edges at a vertex.
//!
//! # Lengths
//!
//! Each half's length is first measured on its own geometry, then the pair is
//! rescaled so it adds up to the parent's stored length exactly.  The
//! rescale is done from the head for forward edges and from the tail for back
//! edges: a forward edge and its back twin split at the same point then get
//! bit-identical fragment lengths, and repeated splits never drift.
//!
//! # Turn restrictions
//!
//! Restrictions pointing *into* the parent (stored on edges arriving at its
//! `from` vertex) are copied to point into the head.  Restrictions *from* the
//! parent are copied to start at the tail.

use std::sync::Arc;

use log::{debug, error};

use st_core::{EdgeId, GeoPoint, VertexId};
use st_geometry::line::{interior_segment, length_m, length_mm, split_at_point};

use crate::street::{StreetEdge, StreetEdgeBuilder};
use crate::{Graph, GraphError, GraphResult, TurnRestriction};

/// The fragments produced by a split.  A non-destructive split may create
/// only one of them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SplitStreetEdge {
    /// `from` → split vertex.
    pub head: Option<EdgeId>,
    /// Split vertex → `to`.
    pub tail: Option<EdgeId>,
}

/// Which temporary fragments a non-destructive split creates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkingDirection {
    /// Only the head (`from` → split vertex).
    Outgoing,
    /// Only the tail (split vertex → `to`).
    Incoming,
    Bidirectional,
}

impl LinkingDirection {
    #[inline]
    fn head(self) -> bool {
        matches!(self, LinkingDirection::Outgoing | LinkingDirection::Bidirectional)
    }

    #[inline]
    fn tail(self) -> bool {
        matches!(self, LinkingDirection::Incoming | LinkingDirection::Bidirectional)
    }
}

// ── Disposal handle ───────────────────────────────────────────────────────────

/// Temporary edges (and vertices) created for one search, removed together.
#[derive(Debug, Default)]
pub struct DisposableEdgeCollection {
    edges: Vec<EdgeId>,
    vertices: Vec<VertexId>,
}

impl DisposableEdgeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, e: EdgeId) {
        self.edges.push(e);
    }

    /// Register a temporary vertex, removed after its edges.
    pub fn add_vertex(&mut self, v: VertexId) {
        self.vertices.push(v);
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.vertices.is_empty()
    }

    /// Remove every registered edge and vertex.  Already removed items are
    /// skipped.
    pub fn dispose(self, graph: &mut Graph) {
        for e in self.edges {
            if graph.edge(e).is_some() {
                if let Err(err) = graph.remove_edge(e) {
                    error!("failed to dispose temporary edge {e}: {err}");
                }
            }
        }
        for v in self.vertices {
            if graph.vertex(v).is_some() {
                if let Err(err) = graph.remove_vertex(v) {
                    error!("failed to dispose temporary vertex {v}: {err}");
                }
            }
        }
    }
}

// ── Length arithmetic ─────────────────────────────────────────────────────────

/// Rescale measured half lengths `l1`, `l2` so they add up to `length_mm`.
///
/// Forward edges round the head, back edges round the tail.  No clamping.
pub fn rescale_split_lengths(length_mm: i32, l1: i32, l2: i32, back: bool) -> (i32, i32) {
    let sum = f64::from(l1) + f64::from(l2);
    if !back {
        let frac = if sum > 0.0 { f64::from(l1) / sum } else { 0.5 };
        let head = (f64::from(length_mm) * frac) as i32;
        (head, length_mm - head)
    } else {
        let frac = if sum > 0.0 { f64::from(l2) / sum } else { 0.5 };
        let tail = (f64::from(length_mm) * frac) as i32;
        (length_mm - tail, tail)
    }
}

/// Keep both halves at least 1 mm long.  A half that would be empty takes
/// 1 mm from the other, so the sum stays `length_mm` whenever it is at least
/// 2 mm; shorter parents give two 1 mm halves.
pub fn clamp_split_lengths(length_mm: i32, head: i32, tail: i32, at: GeoPoint) -> (i32, i32) {
    if head > 0 && tail > 0 {
        return (head, tail);
    }
    error!("split at {at} gives lengths {head} + {tail} mm, clamping to 1 mm");
    if length_mm < 2 {
        (1, 1)
    } else if head <= 0 {
        (1, length_mm - 1)
    } else {
        (length_mm - 1, 1)
    }
}

/// Length the two fragments of a `length_mm` parent must add up to.
fn split_sum_mm(length_mm: i32) -> i32 {
    length_mm.max(2)
}

// ── Splitting ─────────────────────────────────────────────────────────────────

struct SplitPlan {
    from: VertexId,
    to: VertexId,
    head_points: Vec<GeoPoint>,
    tail_points: Vec<GeoPoint>,
    head_mm: i32,
    tail_mm: i32,
}

impl Graph {
    fn plan_split(&self, edge: EdgeId, v: VertexId) -> GraphResult<SplitPlan> {
        let e = self.try_edge(edge)?;
        let street = e.as_street().ok_or(GraphError::NotAStreetEdge(edge))?;
        let at = self.try_vertex(v)?.coordinate();

        let split = split_at_point(&self.street_geometry(edge)?, at)?;
        let (l1, l2) = rescale_split_lengths(
            street.length_mm(),
            length_mm(&split.head),
            length_mm(&split.tail),
            street.is_back(),
        );
        let (head_mm, tail_mm) = clamp_split_lengths(street.length_mm(), l1, l2, at);
        Ok(SplitPlan {
            from: e.from(),
            to: e.to(),
            head_points: split.head,
            tail_points: split.tail,
            head_mm,
            tail_mm,
        })
    }

    /// Builder for a fragment of `parent` covering `[start_m, end_m]` of it,
    /// inheriting flags, safety factors, car speed, permission, name and the
    /// matching slice of the elevation profile.
    fn fragment_builder(
        parent: &StreetEdge,
        from: VertexId,
        to: VertexId,
        points: Vec<GeoPoint>,
        length: i32,
        start_m: f64,
        end_m: f64,
    ) -> GraphResult<StreetEdgeBuilder> {
        let mut b = StreetEdgeBuilder::new(from, to)
            .geometry(points)
            .length_mm(length)
            .flags(parent.flags())
            .bicycle_safety_factor(parent.bicycle_safety_factor())
            .walk_safety_factor(parent.walk_safety_factor())
            .car_speed(parent.car_speed())
            .permission(parent.permission())
            .maybe_name(parent.name().map(Arc::from));
        if let Some(ext) = parent.elevation() {
            let partial = ext.profile()?.partial(start_m, end_m);
            if partial.len() >= 2 {
                b = b.elevation_profile(partial);
            }
        }
        if let Some(cost) = parent.cost_extension_arc() {
            b = b.cost_extension(cost);
        }
        Ok(b)
    }

    /// Copy restrictions touching `edge` onto its fragments.
    fn copy_restrictions_to_split_edges(&self, edge: EdgeId, split: SplitStreetEdge) -> GraphResult<()> {
        let from = self.try_edge(edge)?.from();
        if let Some(head) = split.head {
            let mut created = Vec::new();
            for &incoming in self.try_vertex(from)?.incoming() {
                if let Some(s) = self.edge(incoming).and_then(|e| e.as_street()) {
                    created.extend(
                        s.turn_restrictions()
                            .snapshot()
                            .iter()
                            .filter(|r| r.to == edge)
                            .map(|r| r.retarget(r.from, head)),
                    );
                }
            }
            for r in created {
                debug!("created restriction for split edge: {r:?}");
                self.add_turn_restriction(r)?;
            }
        }
        if let Some(tail) = split.tail {
            for r in self.street(edge)?.turn_restrictions().snapshot().iter() {
                let r: TurnRestriction = r.retarget(tail, r.to);
                debug!("created restriction for split edge: {r:?}");
                self.add_turn_restriction(r)?;
            }
        }
        Ok(())
    }

    /// Split `edge` at `v` and remove it.  Both fragments are permanent.
    ///
    /// # Errors
    ///
    /// Unknown edge or vertex, not a street edge, undecodable geometry.
    pub fn split_destructively(&mut self, edge: EdgeId, v: VertexId) -> GraphResult<SplitStreetEdge> {
        let plan = self.plan_split(edge, v)?;
        let parent = self.street(edge)?;
        let expected_mm = split_sum_mm(parent.length_mm());
        let total_m = parent.distance_m();
        let head_end_m = f64::from(plan.head_mm) / 1000.0;

        let head_edge = Self::fragment_builder(
            parent, plan.from, v, plan.head_points, plan.head_mm, 0.0, head_end_m,
        )?
        .build(self)?;
        let tail_edge = Self::fragment_builder(
            parent, v, plan.to, plan.tail_points, plan.tail_mm, head_end_m, total_m,
        )?
        .build(self)?;

        let head = self.connect(head_edge)?;
        let tail = self.connect(tail_edge)?;
        self.copy_rental_restrictions(plan.from, v)?;

        let split = SplitStreetEdge { head: Some(head), tail: Some(tail) };
        self.copy_restrictions_to_split_edges(edge, split)?;
        self.remove_edge(edge)?;
        self.check_split(edge, split, expected_mm)?;
        Ok(split)
    }

    /// Split `edge` at `v` into temporary fragments registered with
    /// `temp`.  The parent stays in the graph.
    pub fn split_non_destructively(
        &mut self,
        edge: EdgeId,
        v: VertexId,
        temp: &mut DisposableEdgeCollection,
        direction: LinkingDirection,
    ) -> GraphResult<SplitStreetEdge> {
        let plan = self.plan_split(edge, v)?;
        let parent = self.street(edge)?;
        let total_m = parent.distance_m();
        let head_end_m = f64::from(plan.head_mm) / 1000.0;

        let head_edge = if direction.head() {
            Some(
                Self::fragment_builder(
                    parent, plan.from, v, plan.head_points, plan.head_mm, 0.0, head_end_m,
                )?
                .temporary_partial(edge)
                .build(self)?,
            )
        } else {
            None
        };
        let tail_edge = if direction.tail() {
            Some(
                Self::fragment_builder(
                    parent, v, plan.to, plan.tail_points, plan.tail_mm, head_end_m, total_m,
                )?
                .temporary_partial(edge)
                .build(self)?,
            )
        } else {
            None
        };

        let mut split = SplitStreetEdge { head: None, tail: None };
        if let Some(e) = head_edge {
            let id = self.connect(e)?;
            temp.add_edge(id);
            split.head = Some(id);
        }
        if let Some(e) = tail_edge {
            let id = self.connect(e)?;
            temp.add_edge(id);
            self.copy_rental_restrictions(plan.from, v)?;
            split.tail = Some(id);
        }
        self.copy_restrictions_to_split_edges(edge, split)?;
        Ok(split)
    }

    /// A temporary edge along `edge` from `from` to `to`, both of which lie
    /// on its geometry.  `None` if they are not in that order.
    pub fn create_partial_edge(
        &mut self,
        edge: EdgeId,
        from: VertexId,
        to: VertexId,
    ) -> GraphResult<Option<EdgeId>> {
        let e = self.try_edge(edge)?;
        let (parent_from, parent_to) = (e.from(), e.to());
        let parent = self.street(edge)?;
        let points = self.street_geometry(edge)?;

        let a = self.try_vertex(parent_from)?.coordinate();
        let b = self.try_vertex(parent_to)?.coordinate();
        let p = self.try_vertex(from)?.coordinate();
        let q = self.try_vertex(to)?.coordinate();

        let parent_len = length_m(&points);
        let head_len = length_m(&interior_segment(&points, a, p)?);
        let tail_len = length_m(&interior_segment(&points, q, b)?);
        if parent_len <= head_len + tail_len {
            return Ok(None);
        }

        let partial = interior_segment(&points, p, q)?;
        let start = parent.distance_m() * head_len / parent_len;
        let length = parent.distance_m() * length_m(&partial) / parent_len;

        let built = Self::fragment_builder(
            parent,
            from,
            to,
            partial,
            (length * 1000.0) as i32,
            start,
            start + length,
        )?
        .temporary_partial(edge)
        .build(self)?;
        let id = self.connect(built)?;
        self.copy_rental_restrictions(parent_from, from)?;
        Ok(Some(id))
    }

    fn check_split(&self, edge: EdgeId, split: SplitStreetEdge, expected_mm: i32) -> GraphResult<()> {
        let (Some(h), Some(t)) = (split.head, split.tail) else {
            return Ok(());
        };
        let got = self.street(h)?.length_mm() + self.street(t)?.length_mm();
        if got != expected_mm {
            return Err(GraphError::InconsistentSplit {
                edge,
                reason: format!("fragments sum to {got} mm, expected {expected_mm} mm"),
            });
        }
        if self.is_reachable_from_graph(edge) {
            return Err(GraphError::InconsistentSplit {
                edge,
                reason: "parent edge still connected".into(),
            });
        }
        Ok(())
    }
}
