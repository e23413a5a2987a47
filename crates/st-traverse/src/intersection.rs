//! Time spent crossing an intersection between two street edges.

use std::fmt;

use st_core::TraverseMode;
use st_graph::{StreetEdge, Vertex};

/// Turn-duration model consulted whenever a state moves from one street edge
/// onto another.
///
/// Search threads share one calculator, so implementations must be
/// `Send + Sync` and must not keep per-call state.
pub trait IntersectionTraversalCalculator: Send + Sync + fmt::Debug {
    /// Seconds needed to get from `from` onto `to` at `vertex`, travelling
    /// in `mode`.  Speeds are in metres per second on each edge.
    fn traversal_duration(
        &self,
        vertex: &Vertex,
        from: &StreetEdge,
        to: &StreetEdge,
        mode: TraverseMode,
        from_speed: f64,
        to_speed: f64,
    ) -> f64;
}

// ── Constant ──────────────────────────────────────────────────────────────────

/// The same duration at every intersection.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct ConstantIntersectionTraversalCalculator {
    pub duration_s: f64,
}

impl ConstantIntersectionTraversalCalculator {
    pub fn new(duration_s: f64) -> Self {
        Self { duration_s }
    }
}

impl IntersectionTraversalCalculator for ConstantIntersectionTraversalCalculator {
    fn traversal_duration(
        &self,
        _vertex: &Vertex,
        _from: &StreetEdge,
        _to: &StreetEdge,
        _mode: TraverseMode,
        _from_speed: f64,
        _to_speed: f64,
    ) -> f64 {
        self.duration_s
    }
}

// ── Simple model ──────────────────────────────────────────────────────────────

/// Side of the road traffic drives on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum DrivingDirection {
    #[default]
    Right,
    Left,
}

const TRAFFIC_LIGHT_WAIT_S: f64 = 15.0;
const TURN_NO_LIGHT_S: f64 = 8.0;
const STRAIGHT_NO_LIGHT_S: f64 = 0.0;
/// Both edges faster than this (m/s) means a grade-separated junction.
const HIGHWAY_SPEED: f32 = 25.0;
const SAFE_BICYCLE_TURN_FACTOR: f64 = 5.0;
const ACROSS_TRAFFIC_BICYCLE_TURN_FACTOR: f64 = SAFE_BICYCLE_TURN_FACTOR * 3.0;
/// Degrees of heading change per second-metre of walking or cycling.
const NON_DRIVING_TURN_DIVISOR: f64 = 20.0;

/// Traffic-light waits plus turn-angle costs.
///
/// Angles are compass bearings, so a clockwise turn of about 90° is a right
/// turn.  Under right-hand traffic a right turn is the safe one and a left
/// turn crosses oncoming traffic; left-hand traffic mirrors that.
/// Free-flowing vertices cost nothing.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct SimpleIntersectionTraversalCalculator {
    driving_direction: DrivingDirection,
}

impl SimpleIntersectionTraversalCalculator {
    pub fn new(driving_direction: DrivingDirection) -> Self {
        Self { driving_direction }
    }

    #[inline]
    pub fn driving_direction(&self) -> DrivingDirection {
        self.driving_direction
    }

    /// Clockwise heading change from `from` onto `to`, in `[0, 360)`.
    pub fn turn_angle(&self, from: &StreetEdge, to: &StreetEdge) -> i32 {
        (to.in_angle() - from.out_angle()).rem_euclid(360)
    }

    pub fn is_safe_turn(&self, turn_angle: i32) -> bool {
        match self.driving_direction {
            DrivingDirection::Right => (45..135).contains(&turn_angle),
            DrivingDirection::Left => (225..315).contains(&turn_angle),
        }
    }

    pub fn is_turn_across_traffic(&self, turn_angle: i32) -> bool {
        match self.driving_direction {
            DrivingDirection::Right => (225..315).contains(&turn_angle),
            DrivingDirection::Left => (45..135).contains(&turn_angle),
        }
    }

    fn driving_duration(&self, vertex: &Vertex, from: &StreetEdge, to: &StreetEdge) -> f64 {
        if vertex.has_traffic_light() {
            return TRAFFIC_LIGHT_WAIT_S;
        }
        if from.car_speed() > HIGHWAY_SPEED && to.car_speed() > HIGHWAY_SPEED {
            return 0.0;
        }
        let angle = self.turn_angle(from, to);
        if self.is_safe_turn(angle) || self.is_turn_across_traffic(angle) {
            TURN_NO_LIGHT_S
        } else {
            STRAIGHT_NO_LIGHT_S
        }
    }

    fn cycling_duration(&self, vertex: &Vertex, from: &StreetEdge, to: &StreetEdge, to_speed: f64) -> f64 {
        let base = non_driving_turn_duration(from, to, to_speed);
        if vertex.has_traffic_light() {
            return TRAFFIC_LIGHT_WAIT_S + base;
        }
        let angle = self.turn_angle(from, to);
        if self.is_turn_across_traffic(angle) {
            base * ACROSS_TRAFFIC_BICYCLE_TURN_FACTOR
        } else if self.is_safe_turn(angle) {
            base * SAFE_BICYCLE_TURN_FACTOR
        } else {
            base
        }
    }
}

/// Smallest heading change in degrees, scaled down and slowed by speed.
fn non_driving_turn_duration(from: &StreetEdge, to: &StreetEdge, to_speed: f64) -> f64 {
    if !(to_speed.is_finite() && to_speed > 0.0) {
        return 0.0;
    }
    let mut diff = (to.in_angle() - from.out_angle()).rem_euclid(360);
    if diff > 180 {
        diff = 360 - diff;
    }
    f64::from(diff) / NON_DRIVING_TURN_DIVISOR / to_speed
}

impl IntersectionTraversalCalculator for SimpleIntersectionTraversalCalculator {
    fn traversal_duration(
        &self,
        vertex: &Vertex,
        from: &StreetEdge,
        to: &StreetEdge,
        mode: TraverseMode,
        _from_speed: f64,
        to_speed: f64,
    ) -> f64 {
        if vertex.in_free_flowing() {
            return 0.0;
        }
        if mode.is_in_car() {
            self.driving_duration(vertex, from, to)
        } else if mode.is_cycling() {
            self.cycling_duration(vertex, from, to, to_speed)
        } else {
            let wait = if vertex.has_traffic_light() { TRAFFIC_LIGHT_WAIT_S } else { 0.0 };
            wait + non_driving_turn_duration(from, to, to_speed)
        }
    }
}
