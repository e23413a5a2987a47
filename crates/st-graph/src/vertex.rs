//! Graph vertices.
//!
//! A vertex lists the ids of its adjacent edges but owns none of them.  The
//! lists are only changed through the four `add_*`/`remove_*` methods, which
//! [`Graph`](crate::Graph) calls while connecting and removing edges.

use std::sync::Arc;

use smallvec::SmallVec;

use st_core::{EdgeId, GeoPoint, RentalFormFactor, StreetTraversalPermission, VertexId};

use crate::rental::{RentalRestriction, RentalRestrictions};

/// Adjacency list: almost every street vertex has four or fewer edges per
/// direction.
pub type EdgeList = SmallVec<[EdgeId; 4]>;

/// What a vertex represents.  Traversal rules depend on it.
#[derive(Clone, Debug, PartialEq)]
pub enum VertexKind {
    /// A street intersection.  `free_flowing` overrides the inferred
    /// "straight-through, nothing to wait for" test.
    Intersection { traffic_light: bool, free_flowing: Option<bool> },
    /// A barrier (bollard, gate) restricting which modes may pass.
    Barrier { permission: StreetTraversalPermission },
    /// Created by a permanent edge split.
    Splitter,
    /// Created for a search endpoint; removed with its temporary edges.
    Temporary,
    ElevatorOnboard,
    ElevatorOffboard,
    TransitStop { wheelchair_accessible: bool },
    TransitEntrance,
    VehicleParking { car_places: bool, bicycle_places: bool },
    VehicleRentalPlace {
        network: Arc<str>,
        form_factor: RentalFormFactor,
        /// Free-floating vehicle rather than a docking station.
        floating: bool,
        allows_drop_off: bool,
    },
}

impl VertexKind {
    /// Kinds at which a turn takes intersection time.
    #[inline]
    pub fn is_intersection_like(&self) -> bool {
        matches!(
            self,
            VertexKind::Intersection { .. } | VertexKind::Barrier { .. } | VertexKind::Splitter
        )
    }
}

#[derive(Clone, Debug)]
pub struct Vertex {
    id: VertexId,
    coordinate: GeoPoint,
    label: Arc<str>,
    kind: VertexKind,
    outgoing: EdgeList,
    incoming: EdgeList,
    rental_restrictions: RentalRestrictions,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, label: Arc<str>, coordinate: GeoPoint, kind: VertexKind) -> Self {
        Self {
            id,
            coordinate,
            label,
            kind,
            outgoing: EdgeList::new(),
            incoming: EdgeList::new(),
            rental_restrictions: RentalRestrictions::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    #[inline]
    pub fn coordinate(&self) -> GeoPoint {
        self.coordinate
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn kind(&self) -> &VertexKind {
        &self.kind
    }

    #[inline]
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    #[inline]
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    #[inline]
    pub fn degree_out(&self) -> usize {
        self.outgoing.len()
    }

    #[inline]
    pub fn degree_in(&self) -> usize {
        self.incoming.len()
    }

    // ── Adjacency mutation ────────────────────────────────────────────────

    pub fn add_outgoing(&mut self, e: EdgeId) {
        if !self.outgoing.contains(&e) {
            self.outgoing.push(e);
        }
    }

    pub fn remove_outgoing(&mut self, e: EdgeId) -> bool {
        remove_from(&mut self.outgoing, e)
    }

    pub fn add_incoming(&mut self, e: EdgeId) {
        if !self.incoming.contains(&e) {
            self.incoming.push(e);
        }
    }

    pub fn remove_incoming(&mut self, e: EdgeId) -> bool {
        remove_from(&mut self.incoming, e)
    }

    // ── Rental restrictions ───────────────────────────────────────────────

    #[inline]
    pub fn rental_restrictions(&self) -> &RentalRestrictions {
        &self.rental_restrictions
    }

    pub(crate) fn rental_restrictions_mut(&mut self) -> &mut RentalRestrictions {
        &mut self.rental_restrictions
    }

    pub fn add_rental_restriction(&mut self, r: RentalRestriction) {
        self.rental_restrictions.add(r);
    }

    pub fn remove_rental_restriction(&mut self, r: &RentalRestriction) -> bool {
        self.rental_restrictions.remove(r)
    }

    #[inline]
    pub fn rental_traversal_banned(&self, renting: bool, network: Option<&str>) -> bool {
        self.rental_restrictions.traversal_banned(renting, network)
    }

    #[inline]
    pub fn rental_drop_off_banned(&self, renting: bool, network: Option<&str>) -> bool {
        self.rental_restrictions.drop_off_banned(renting, network)
    }

    // ── Kind helpers ──────────────────────────────────────────────────────

    /// Barrier permission, or `ALL` for anything that is not a barrier.
    #[inline]
    pub fn barrier_permission(&self) -> StreetTraversalPermission {
        match self.kind {
            VertexKind::Barrier { permission } => permission,
            _ => StreetTraversalPermission::ALL,
        }
    }

    pub fn has_traffic_light(&self) -> bool {
        matches!(self.kind, VertexKind::Intersection { traffic_light: true, .. })
    }

    /// Explicit free-flowing tag, else inferred: one edge in, one edge out
    /// and no traffic light.
    pub fn in_free_flowing(&self) -> bool {
        match self.kind {
            VertexKind::Intersection { free_flowing: Some(f), .. } => f,
            VertexKind::Intersection { traffic_light, free_flowing: None } => {
                !traffic_light && self.incoming.len() == 1 && self.outgoing.len() == 1
            }
            _ => false,
        }
    }
}

fn remove_from(list: &mut EdgeList, e: EdgeId) -> bool {
    match list.iter().position(|x| *x == e) {
        Some(i) => {
            list.remove(i);
            true
        }
        None => false,
    }
}
