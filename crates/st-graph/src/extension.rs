//! Per-edge extra-cost hook.

use std::fmt;

use st_core::TraverseMode;

/// Adds implementation-defined weight (tolls, custom routing data) after the
/// base cost of a street edge is computed.
///
/// Implementations are shared between search threads and must be cheap.
pub trait StreetEdgeCostExtension: Send + Sync + fmt::Debug {
    /// Extra weight for traversing an edge of `length_mm` in `mode`, taking
    /// `time_s` seconds.  Must be finite and non-negative.
    fn extra_cost(&self, mode: TraverseMode, length_mm: i32, time_s: f64) -> f64;
}

/// A fixed weight per traversal for the listed modes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstantCostExtension {
    pub cost: f64,
    pub modes: st_core::TraverseModeSet,
}

impl StreetEdgeCostExtension for ConstantCostExtension {
    fn extra_cost(&self, mode: TraverseMode, _length_mm: i32, _time_s: f64) -> f64 {
        if self.modes.contains(mode) { self.cost } else { 0.0 }
    }
}
