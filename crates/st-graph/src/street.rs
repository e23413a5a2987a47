//! Street edges: the dominant, highest-cardinality edge variant.
//!
//! # Memory layout
//!
//! Length is kept as whole millimetres in an `i32` (up to ~2 100 km), the
//! boolean attributes are packed into [`StreetEdgeFlags`], bearings are
//! quantised to one byte each and geometry is stored as a compact delta
//! buffer that a forward/back pair can share.  Everything derived from
//! elevation lives behind one optional box.
//!
//! # Construction
//!
//! [`StreetEdgeBuilder::build`] validates the properties and returns a
//! disconnected [`Edge`]; [`Graph::connect`](crate::Graph::connect) publishes
//! it.  A half-built street edge is never reachable from the graph.

use std::sync::Arc;

use log::warn;

use st_core::{EdgeId, GeoPoint, StreetTraversalPermission, TraverseMode, VertexId};
use st_geometry::line::{brads_to_degrees, degrees_to_brads, first_bearing, last_bearing, length_mm};
use st_geometry::{compact_line_string, ElevationProfile};

use crate::elevation::{StreetElevationExtension, StreetElevationExtensionBuilder};
use crate::extension::StreetEdgeCostExtension;
use crate::flags::StreetEdgeFlags;
use crate::restriction::TurnRestrictions;
use crate::{Edge, EdgeKind, Graph, GraphError, GraphResult};

/// Car speed used when none is given: 11.2 m/s, about 40 km/h.
pub const DEFAULT_CAR_SPEED: f32 = 11.2;

/// Street edges that are not plain street segments.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum StreetEdgeVariant {
    #[default]
    Plain,
    /// A walkable area (plaza, parking lot), visibility-graph edge of the
    /// area labelled `area`.
    Area { area: Arc<str> },
    /// A temporary fragment of `parent`, created for a search endpoint.
    TemporaryPartial { parent: EdgeId },
}

#[derive(Debug)]
pub struct StreetEdge {
    length_mm: i32,
    flags: StreetEdgeFlags,
    bicycle_safety_factor: f32,
    walk_safety_factor: f32,
    geometry: Arc<[u8]>,
    permission: StreetTraversalPermission,
    car_speed: f32,
    in_angle: i8,
    out_angle: i8,
    elevation: Option<Box<StreetElevationExtension>>,
    name: Option<Arc<str>>,
    turn_restrictions: TurnRestrictions,
    cost_extension: Option<Arc<dyn StreetEdgeCostExtension>>,
    variant: StreetEdgeVariant,
}

impl StreetEdge {
    // ── Length ────────────────────────────────────────────────────────────

    #[inline]
    pub fn length_mm(&self) -> i32 {
        self.length_mm
    }

    #[inline]
    pub fn distance_m(&self) -> f64 {
        f64::from(self.length_mm) / 1000.0
    }

    // ── Flags ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn flags(&self) -> StreetEdgeFlags {
        self.flags
    }

    /// Reverse member of a bidirectional pair.  Says nothing about
    /// `from`/`to`, only how the geometry is stored.
    #[inline]
    pub fn is_back(&self) -> bool {
        self.flags.is_back()
    }

    #[inline]
    pub fn is_stairs(&self) -> bool {
        self.flags.is_stairs()
    }

    #[inline]
    pub fn is_roundabout(&self) -> bool {
        self.flags.is_roundabout()
    }

    #[inline]
    pub fn is_wheelchair_accessible(&self) -> bool {
        self.flags.is_wheelchair_accessible()
    }

    #[inline]
    pub fn is_slope_override(&self) -> bool {
        self.flags.is_slope_override()
    }

    #[inline]
    pub fn is_link(&self) -> bool {
        self.flags.is_link()
    }

    #[inline]
    pub fn name_is_derived(&self) -> bool {
        self.flags.name_is_derived()
    }

    #[inline]
    pub fn is_no_thru_traffic(&self, mode: TraverseMode) -> bool {
        self.flags.is_no_thru_traffic(mode)
    }

    // ── Access ────────────────────────────────────────────────────────────

    #[inline]
    pub fn permission(&self) -> StreetTraversalPermission {
        self.permission
    }

    /// Permission check on the edge alone; barriers are checked by
    /// [`Graph::can_traverse_with_barriers`](crate::Graph::can_traverse_with_barriers).
    #[inline]
    pub fn can_traverse(&self, mode: TraverseMode) -> bool {
        self.permission.allows(mode)
    }

    #[inline]
    pub fn car_speed(&self) -> f32 {
        self.car_speed
    }

    #[inline]
    pub fn bicycle_safety_factor(&self) -> f32 {
        self.bicycle_safety_factor
    }

    #[inline]
    pub fn walk_safety_factor(&self) -> f32 {
        self.walk_safety_factor
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn variant(&self) -> &StreetEdgeVariant {
        &self.variant
    }

    /// Parent of a temporary partial edge.
    #[inline]
    pub fn parent(&self) -> Option<EdgeId> {
        match self.variant {
            StreetEdgeVariant::TemporaryPartial { parent } => Some(parent),
            _ => None,
        }
    }

    pub fn cost_extension(&self) -> Option<&dyn StreetEdgeCostExtension> {
        self.cost_extension.as_deref()
    }

    pub(crate) fn cost_extension_arc(&self) -> Option<Arc<dyn StreetEdgeCostExtension>> {
        self.cost_extension.clone()
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    #[inline]
    pub fn compact_geometry(&self) -> &Arc<[u8]> {
        &self.geometry
    }

    /// Bearing of the first segment, integer degrees clockwise from north.
    #[inline]
    pub fn in_angle(&self) -> i32 {
        brads_to_degrees(self.in_angle).round() as i32
    }

    /// Bearing of the last segment, integer degrees clockwise from north.
    #[inline]
    pub fn out_angle(&self) -> i32 {
        brads_to_degrees(self.out_angle).round() as i32
    }

    // ── Elevation-adjusted distances ──────────────────────────────────────

    #[inline]
    pub fn elevation(&self) -> Option<&StreetElevationExtension> {
        self.elevation.as_deref()
    }

    #[inline]
    pub fn has_elevation(&self) -> bool {
        self.elevation.is_some()
    }

    pub fn effective_bike_distance(&self) -> f64 {
        self.elevation().map_or(self.distance_m(), |e| e.effective_bike_distance())
    }

    pub fn effective_bike_distance_for_work_cost(&self) -> f64 {
        self.elevation().map_or(self.distance_m(), |e| e.effective_bike_work_distance())
    }

    pub fn effective_walk_distance(&self) -> f64 {
        self.elevation().map_or(self.distance_m(), |e| e.effective_walk_distance())
    }

    pub fn effective_bicycle_safety_distance(&self) -> f64 {
        self.elevation().map_or(
            f64::from(self.bicycle_safety_factor) * self.distance_m(),
            |e| e.effective_bicycle_safety_distance(),
        )
    }

    pub fn effective_walk_safety_distance(&self) -> f64 {
        self.elevation().map_or(
            f64::from(self.walk_safety_factor) * self.distance_m(),
            |e| e.effective_walk_safety_distance(),
        )
    }

    pub fn distance_with_elevation(&self) -> f64 {
        self.elevation().map_or(self.distance_m(), |e| e.distance_with_elevation())
    }

    pub fn max_slope(&self) -> f32 {
        self.elevation().map_or(0.0, |e| e.max_slope())
    }

    // ── Turn restrictions ─────────────────────────────────────────────────

    #[inline]
    pub fn turn_restrictions(&self) -> &TurnRestrictions {
        &self.turn_restrictions
    }

    /// `false` if a restriction on this edge forbids continuing onto `target`
    /// in `mode` at `time_s`.  A `None` mode matches no restriction.
    ///
    /// `target` decides equivalence, so a temporary fragment of a restricted
    /// edge is restricted too.
    pub fn can_turn_onto(
        &self,
        graph: &Graph,
        target: EdgeId,
        time_s: i64,
        mode: Option<TraverseMode>,
    ) -> bool {
        let Some(mode) = mode else {
            return true;
        };
        let restrictions = self.turn_restrictions.snapshot();
        restrictions.iter().all(|r| {
            if !r.applies(mode, time_s) {
                return true;
            }
            let onto_restricted = graph.is_equivalent(target, r.to);
            match r.kind {
                crate::TurnRestrictionType::Only => onto_restricted,
                crate::TurnRestrictionType::No => !onto_restricted,
            }
        })
    }

    // ── Construction-time mutation (through `Graph`) ──────────────────────

    pub(crate) fn set_permission(&mut self, permission: StreetTraversalPermission) {
        self.permission = permission;
    }

    pub(crate) fn set_bicycle_safety_factor(&mut self, factor: f32) -> GraphResult<()> {
        if self.has_elevation() {
            return Err(GraphError::SafetyFactorWithElevation("bicycle"));
        }
        self.bicycle_safety_factor = validate_safety_factor("bicycle", factor)?;
        Ok(())
    }

    pub(crate) fn set_walk_safety_factor(&mut self, factor: f32) -> GraphResult<()> {
        if self.has_elevation() {
            return Err(GraphError::SafetyFactorWithElevation("walk"));
        }
        self.walk_safety_factor = validate_safety_factor("walk", factor)?;
        Ok(())
    }

    pub(crate) fn set_elevation(&mut self, ext: Option<StreetElevationExtension>) {
        self.elevation = ext.map(Box::new);
    }

    /// Sets a real name, which clears the derived-name flag.
    pub(crate) fn set_name(&mut self, name: Arc<str>) {
        self.name = Some(name);
        self.flags.set_name_is_derived(false);
    }

    pub(crate) fn set_cost_extension(&mut self, ext: Option<Arc<dyn StreetEdgeCostExtension>>) {
        self.cost_extension = ext;
    }

    pub(crate) fn flags_mut(&mut self) -> &mut StreetEdgeFlags {
        &mut self.flags
    }

    pub(crate) fn set_compact_geometry(&mut self, geometry: Arc<[u8]>) {
        self.geometry = geometry;
    }
}

fn validate_safety_factor(kind: &'static str, value: f32) -> GraphResult<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GraphError::InvalidSafetyFactor { kind, value })
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Builds a street [`Edge`].
///
/// ```
/// use st_core::{GeoPoint, StreetTraversalPermission};
/// use st_graph::{Graph, StreetEdgeBuilder, VertexKind};
///
/// let mut g = Graph::new();
/// let kind = VertexKind::Intersection { traffic_light: false, free_flowing: None };
/// let a = g.add_vertex("a", GeoPoint::new(59.9, 10.7), kind.clone());
/// let b = g.add_vertex("b", GeoPoint::new(59.9, 10.701), kind);
/// let edge = StreetEdgeBuilder::new(a, b)
///     .permission(StreetTraversalPermission::PEDESTRIAN)
///     .build(&g)
///     .unwrap();
/// let id = g.connect(edge).unwrap();
/// assert!(g.is_reachable_from_graph(id));
/// ```
pub struct StreetEdgeBuilder {
    from: VertexId,
    to: VertexId,
    geometry: Option<Vec<GeoPoint>>,
    length_mm: Option<i32>,
    flags: StreetEdgeFlags,
    bicycle_safety_factor: f32,
    walk_safety_factor: f32,
    permission: StreetTraversalPermission,
    car_speed: f32,
    name: Option<Arc<str>>,
    elevation_profile: Option<ElevationProfile>,
    cost_extension: Option<Arc<dyn StreetEdgeCostExtension>>,
    variant: StreetEdgeVariant,
}

macro_rules! flag_setter {
    ($($(#[$doc:meta])* $name:ident => $set:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(mut self, value: bool) -> Self {
                self.flags.$set(value);
                self
            }
        )*
    };
}

impl StreetEdgeBuilder {
    pub fn new(from: VertexId, to: VertexId) -> Self {
        Self {
            from,
            to,
            geometry: None,
            length_mm: None,
            flags: StreetEdgeFlags::DEFAULT_STREET,
            bicycle_safety_factor: 1.0,
            walk_safety_factor: 1.0,
            permission: StreetTraversalPermission::ALL,
            car_speed: DEFAULT_CAR_SPEED,
            name: None,
            elevation_profile: None,
            cost_extension: None,
            variant: StreetEdgeVariant::Plain,
        }
    }

    /// Full polyline in the edge's direction, endpoints included.  Defaults
    /// to the straight line between the two vertices.
    pub fn geometry(mut self, points: Vec<GeoPoint>) -> Self {
        self.geometry = Some(points);
        self
    }

    /// Explicit length.  Defaults to the geometry length.
    pub fn length_mm(mut self, length_mm: i32) -> Self {
        self.length_mm = Some(length_mm);
        self
    }

    pub fn length_m(self, length_m: f64) -> Self {
        self.length_mm((length_m * 1000.0) as i32)
    }

    /// Replace all flags, e.g. to copy them from a parent edge.
    pub fn flags(mut self, flags: StreetEdgeFlags) -> Self {
        self.flags = flags;
        self
    }

    flag_setter! {
        back => set_back;
        roundabout => set_roundabout;
        stairs => set_stairs;
        slope_override => set_slope_override;
        wheelchair_accessible => set_wheelchair_accessible;
        link => set_link;
        name_is_derived => set_name_is_derived;
        walk_no_thru_traffic => set_walk_no_thru_traffic;
        bicycle_no_thru_traffic => set_bicycle_no_thru_traffic;
        motor_vehicle_no_thru_traffic => set_motor_vehicle_no_thru_traffic;
    }

    pub fn bicycle_safety_factor(mut self, factor: f32) -> Self {
        self.bicycle_safety_factor = factor;
        self
    }

    pub fn walk_safety_factor(mut self, factor: f32) -> Self {
        self.walk_safety_factor = factor;
        self
    }

    pub fn permission(mut self, permission: StreetTraversalPermission) -> Self {
        self.permission = permission;
        self
    }

    pub fn car_speed(mut self, speed: f32) -> Self {
        self.car_speed = speed;
        self
    }

    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn maybe_name(mut self, name: Option<Arc<str>>) -> Self {
        self.name = name;
        self
    }

    /// Elevation samples along the edge.  The extension is derived at
    /// [`build`](Self::build) time with the default slope model.
    pub fn elevation_profile(mut self, profile: ElevationProfile) -> Self {
        self.elevation_profile = Some(profile);
        self
    }

    pub fn cost_extension(mut self, ext: Arc<dyn StreetEdgeCostExtension>) -> Self {
        self.cost_extension = Some(ext);
        self
    }

    pub fn area(mut self, area: impl Into<Arc<str>>) -> Self {
        self.variant = StreetEdgeVariant::Area { area: area.into() };
        self
    }

    pub(crate) fn temporary_partial(mut self, parent: EdgeId) -> Self {
        self.variant = StreetEdgeVariant::TemporaryPartial { parent };
        self
    }

    /// Validate and produce a disconnected edge.
    ///
    /// # Errors
    ///
    /// Unknown endpoint vertices, invalid safety factors.
    pub fn build(self, graph: &Graph) -> GraphResult<Edge> {
        let from_pt = graph.try_vertex(self.from)?.coordinate();
        let to_pt = graph.try_vertex(self.to)?.coordinate();

        let bicycle_safety_factor = validate_safety_factor("bicycle", self.bicycle_safety_factor)?;
        let walk_safety_factor = validate_safety_factor("walk", self.walk_safety_factor)?;

        let points = self.geometry.unwrap_or_else(|| vec![from_pt, to_pt]);
        let length = self.length_mm.unwrap_or_else(|| length_mm(&points));
        if length == 0 {
            warn!(
                "street edge {} from {} to {} has length 0, this is usually an error",
                self.name.as_deref().unwrap_or("<unnamed>"),
                self.from,
                self.to
            );
        }

        let in_angle = degrees_to_brads(first_bearing(&points).unwrap_or(0.0));
        let out_angle = degrees_to_brads(last_bearing(&points).unwrap_or(0.0));
        let geometry = compact_line_string(from_pt, to_pt, &points, self.flags.is_back());

        let elevation = self.elevation_profile.and_then(|profile| {
            StreetElevationExtensionBuilder::new(profile, f64::from(length) / 1000.0)
                .permission(self.permission)
                .bicycle_safety_factor(bicycle_safety_factor)
                .walk_safety_factor(walk_safety_factor)
                .slope_override(self.flags.is_slope_override())
                .build()
                .map(Box::new)
        });

        let street = StreetEdge {
            length_mm: length,
            flags: self.flags,
            bicycle_safety_factor,
            walk_safety_factor,
            geometry,
            permission: self.permission,
            car_speed: self.car_speed,
            in_angle,
            out_angle,
            elevation,
            name: self.name,
            turn_restrictions: TurnRestrictions::new(),
            cost_extension: self.cost_extension,
            variant: self.variant,
        };
        Ok(Edge::new(self.from, self.to, EdgeKind::Street(street)))
    }
}
