//! R-tree spatial index over street-edge segments and vertices.
//!
//! The index is a snapshot: it is built from a graph and only updated through
//! [`StreetIndex::insert_edge`].  Edges removed from the graph afterwards stay
//! in the tree until the next rebuild.  Queries check every hit against the
//! live topology and skip (and log) the stale ones.

use log::warn;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashSet;

use st_core::geo::EARTH_RADIUS_M;
use st_core::{EdgeId, GeoPoint, VertexId};
use st_geometry::line::{locate, point_at};

use crate::{Graph, GraphResult};

// ── R-tree entries ────────────────────────────────────────────────────────────

/// One segment of a street edge, `[lon, lat]` endpoints.
#[derive(Clone, Debug)]
struct SegmentEntry {
    a: [f64; 2],
    b: [f64; 2],
    edge: EdgeId,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.a, self.b)
    }
}

#[derive(Clone, Debug)]
struct VertexEntry {
    point: [f64; 2], // [lon, lat]
    id: VertexId,
}

impl RTreeObject for VertexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VertexEntry {
    /// Squared distance in a plane scaled by the cosine of the latitude, good
    /// enough to rank neighbours at city scale.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let k = point[1].to_radians().cos();
        let dlon = (self.point[0] - point[0]) * k;
        let dlat = self.point[1] - point[1];
        dlon * dlon + dlat * dlat
    }
}

#[inline]
fn xy(p: GeoPoint) -> [f64; 2] {
    [p.lon, p.lat]
}

fn segments(graph: &Graph, id: EdgeId) -> Vec<SegmentEntry> {
    match graph.street_geometry(id) {
        Ok(points) => points
            .windows(2)
            .map(|w| SegmentEntry { a: xy(w[0]), b: xy(w[1]), edge: id })
            .collect(),
        Err(err) => {
            warn!("not indexing {id}: {err}");
            Vec::new()
        }
    }
}

// ── StreetIndex ───────────────────────────────────────────────────────────────

pub struct StreetIndex {
    segments: RTree<SegmentEntry>,
    vertices: RTree<VertexEntry>,
}

impl StreetIndex {
    /// Bulk-load both trees from the live street edges and vertices.
    pub fn build(graph: &Graph) -> Self {
        let street_ids: Vec<EdgeId> = graph
            .edges()
            .filter(|(_, e)| e.is_street())
            .map(|(id, _)| id)
            .collect();

        #[cfg(feature = "parallel")]
        let entries: Vec<SegmentEntry> = {
            use rayon::prelude::*;
            street_ids.par_iter().flat_map_iter(|&id| segments(graph, id)).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let entries: Vec<SegmentEntry> =
            street_ids.iter().flat_map(|&id| segments(graph, id)).collect();

        let vertices = graph
            .vertices()
            .map(|v| VertexEntry { point: xy(v.coordinate()), id: v.id() })
            .collect();

        Self {
            segments: RTree::bulk_load(entries),
            vertices: RTree::bulk_load(vertices),
        }
    }

    /// Index an edge connected after the build.
    pub fn insert_edge(&mut self, graph: &Graph, id: EdgeId) -> GraphResult<()> {
        graph.street(id)?;
        for s in segments(graph, id) {
            self.segments.insert(s);
        }
        Ok(())
    }

    pub fn insert_vertex(&mut self, graph: &Graph, id: VertexId) -> GraphResult<()> {
        let v = graph.try_vertex(id)?;
        self.vertices.insert(VertexEntry { point: xy(v.coordinate()), id });
        Ok(())
    }

    pub fn segment_count(&self) -> usize {
        self.segments.size()
    }

    /// Live street edges within `radius_m` of `point`, nearest first.
    ///
    /// Hits that are no longer reachable from the graph are logged and
    /// skipped.
    pub fn edges_near(&self, graph: &Graph, point: GeoPoint, radius_m: f64) -> Vec<EdgeId> {
        let dlat = (radius_m / EARTH_RADIUS_M).to_degrees();
        let dlon = dlat / point.lat.to_radians().cos().max(1e-6);
        let envelope = AABB::from_corners(
            [point.lon - dlon, point.lat - dlat],
            [point.lon + dlon, point.lat + dlat],
        );

        let candidates: FxHashSet<EdgeId> = self
            .segments
            .locate_in_envelope_intersecting(&envelope)
            .map(|s| s.edge)
            .collect();

        let mut hits: Vec<(f64, EdgeId)> = candidates
            .into_iter()
            .filter(|&id| {
                let live = graph.is_reachable_from_graph(id);
                if !live {
                    warn!("spatial index returned {id}, which is no longer reachable from the graph");
                }
                live
            })
            .filter_map(|id| {
                let points = graph.street_geometry(id).ok()?;
                let at = point_at(&points, locate(&points, point).ok()?);
                let d = at.distance_m(point);
                (d <= radius_m).then_some((d, id))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// Nearest live vertex to `point`.
    pub fn nearest_vertex(&self, graph: &Graph, point: GeoPoint) -> Option<VertexId> {
        self.vertices
            .nearest_neighbor_iter(&xy(point))
            .map(|e| e.id)
            .find(|&id| graph.vertex(id).is_some())
    }
}
