//! Directed edges and the closed set of edge variants.

use st_core::{RentalFormFactor, StreetTraversalPermission, VertexId};

use crate::street::StreetEdge;

/// An elevator ride between two levels.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevatorHopEdge {
    /// Levels travelled; scales the per-hop cost and time.
    pub levels: f64,
    pub permission: StreetTraversalPermission,
    pub wheelchair_accessible: bool,
    /// Measured ride time, overriding `levels × hop time`.
    pub travel_time_s: Option<u32>,
}

impl ElevatorHopEdge {
    pub fn new(levels: f64) -> Self {
        Self {
            levels,
            permission: StreetTraversalPermission::PEDESTRIAN_AND_BICYCLE,
            wheelchair_accessible: true,
            travel_time_s: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EscalatorEdge {
    pub length_m: f64,
    /// Ride time from the data, overriding `length / escalator speed`.
    pub duration_s: Option<f64>,
}

/// A station pathway (corridor, stairs, walkway) from transit data.
#[derive(Clone, Debug, PartialEq)]
pub struct PathwayEdge {
    pub length_m: f64,
    pub traversal_time_s: Option<u32>,
    pub steps: u32,
    pub wheelchair_accessible: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleRentalEdge {
    pub form_factor: RentalFormFactor,
}

/// What kind of connection an edge is.
#[derive(Debug)]
pub enum EdgeKind {
    Street(StreetEdge),
    /// A zero-cost connector.
    Free,
    ElevatorBoard,
    ElevatorHop(ElevatorHopEdge),
    ElevatorAlight,
    Escalator(EscalatorEdge),
    Pathway(PathwayEdge),
    /// Street vertex to transit stop or entrance.
    StreetTransitLink,
    /// Street vertex to a parking facility.
    VehicleParkingLink,
    /// Loop edge at a parking vertex where the vehicle is parked.
    VehicleParking,
    /// Loop edge at a rental place where a vehicle is picked up or dropped.
    VehicleRental(VehicleRentalEdge),
}

impl EdgeKind {
    pub fn name(&self) -> &'static str {
        match self {
            EdgeKind::Street(_)           => "street",
            EdgeKind::Free                => "free",
            EdgeKind::ElevatorBoard       => "elevator-board",
            EdgeKind::ElevatorHop(_)      => "elevator-hop",
            EdgeKind::ElevatorAlight      => "elevator-alight",
            EdgeKind::Escalator(_)        => "escalator",
            EdgeKind::Pathway(_)          => "pathway",
            EdgeKind::StreetTransitLink   => "street-transit-link",
            EdgeKind::VehicleParkingLink  => "vehicle-parking-link",
            EdgeKind::VehicleParking      => "vehicle-parking",
            EdgeKind::VehicleRental(_)    => "vehicle-rental",
        }
    }
}

/// A directed edge.  `from` and `to` never change after construction.
#[derive(Debug)]
pub struct Edge {
    from: VertexId,
    to: VertexId,
    kind: EdgeKind,
}

impl Edge {
    /// A disconnected edge.  Publish it with [`Graph::connect`](crate::Graph::connect).
    pub fn new(from: VertexId, to: VertexId, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }

    #[inline]
    pub fn from(&self) -> VertexId {
        self.from
    }

    #[inline]
    pub fn to(&self) -> VertexId {
        self.to
    }

    #[inline]
    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    #[inline]
    pub(crate) fn kind_mut(&mut self) -> &mut EdgeKind {
        &mut self.kind
    }

    #[inline]
    pub fn as_street(&self) -> Option<&StreetEdge> {
        match &self.kind {
            EdgeKind::Street(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_street(&self) -> bool {
        matches!(self.kind, EdgeKind::Street(_))
    }

    /// Same vertex pair in the opposite direction.
    #[inline]
    pub fn is_reverse_of(&self, other: &Edge) -> bool {
        self.from == other.to && self.to == other.from
    }

    /// Physical length in metres, zero for connectors.
    pub fn distance_m(&self) -> f64 {
        match &self.kind {
            EdgeKind::Street(s) => s.distance_m(),
            EdgeKind::Escalator(e) => e.length_m,
            EdgeKind::Pathway(p) => p.length_m,
            _ => 0.0,
        }
    }
}
