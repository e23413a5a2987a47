//! Elevation data derived for one street edge.
//!
//! The extension stores the packed profile plus every effective distance the
//! cost model needs, so traversal never decodes the profile.  When present it
//! supersedes the edge's plain safety factors.

use log::error;

use st_core::{StreetTraversalPermission, TraverseMode};
use st_geometry::{
    CompactElevationProfile, DefaultSlopeCostCalculator, ElevationProfile, GeometryResult,
    SlopeCostCalculator,
};

#[derive(Clone, Debug, PartialEq)]
pub struct StreetElevationExtension {
    profile: CompactElevationProfile,
    distance_m: f64,
    effective_bicycle_safety_distance: f64,
    effective_bike_distance: f64,
    effective_bike_work_distance: f64,
    effective_walk_distance: f64,
    effective_walk_safety_distance: f64,
    distance_with_elevation: f64,
    max_slope: f32,
    flattened: bool,
}

impl StreetElevationExtension {
    pub fn profile(&self) -> GeometryResult<ElevationProfile> {
        self.profile.decode()
    }

    #[inline]
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    #[inline]
    pub fn effective_bicycle_safety_distance(&self) -> f64 {
        self.effective_bicycle_safety_distance
    }

    #[inline]
    pub fn effective_bike_distance(&self) -> f64 {
        self.effective_bike_distance
    }

    #[inline]
    pub fn effective_bike_work_distance(&self) -> f64 {
        self.effective_bike_work_distance
    }

    #[inline]
    pub fn effective_walk_distance(&self) -> f64 {
        self.effective_walk_distance
    }

    #[inline]
    pub fn effective_walk_safety_distance(&self) -> f64 {
        self.effective_walk_safety_distance
    }

    #[inline]
    pub fn distance_with_elevation(&self) -> f64 {
        self.distance_with_elevation
    }

    #[inline]
    pub fn max_slope(&self) -> f32 {
        self.max_slope
    }

    /// Some samples were steeper than plausible and counted as flat.
    #[inline]
    pub fn flattened(&self) -> bool {
        self.flattened
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Derives a [`StreetElevationExtension`] from a profile and the edge's
/// properties.
pub struct StreetElevationExtensionBuilder<'a> {
    profile: ElevationProfile,
    distance_m: f64,
    permission: StreetTraversalPermission,
    bicycle_safety_factor: f32,
    walk_safety_factor: f32,
    slope_override: bool,
    calculator: &'a dyn SlopeCostCalculator,
}

impl<'a> StreetElevationExtensionBuilder<'a> {
    pub fn new(profile: ElevationProfile, distance_m: f64) -> Self {
        Self {
            profile,
            distance_m,
            permission: StreetTraversalPermission::ALL,
            bicycle_safety_factor: 1.0,
            walk_safety_factor: 1.0,
            slope_override: false,
            calculator: &DefaultSlopeCostCalculator,
        }
    }

    pub fn permission(mut self, permission: StreetTraversalPermission) -> Self {
        self.permission = permission;
        self
    }

    pub fn bicycle_safety_factor(mut self, factor: f32) -> Self {
        self.bicycle_safety_factor = factor;
        self
    }

    pub fn walk_safety_factor(mut self, factor: f32) -> Self {
        self.walk_safety_factor = factor;
        self
    }

    pub fn slope_override(mut self, slope_override: bool) -> Self {
        self.slope_override = slope_override;
        self
    }

    pub fn calculator(mut self, calculator: &'a dyn SlopeCostCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// `None` when the profile has fewer than two samples or the edge's slope
    /// is overridden.
    pub fn build(self) -> Option<StreetElevationExtension> {
        if self.profile.len() < 2 || self.slope_override {
            return None;
        }
        let costs = self
            .calculator
            .slope_costs(&self.profile, self.permission.allows(TraverseMode::Car));
        let d = self.distance_m;

        let mut bicycle_safety =
            f64::from(self.bicycle_safety_factor) * costs.length_multiplier + costs.safety_cost / d;
        if !bicycle_safety.is_finite() {
            error!(
                "effective bicycle safety factor is {bicycle_safety} for a {d} m edge, using 1.0"
            );
            bicycle_safety = 1.0;
        }
        let walk_safety = f64::from(self.walk_safety_factor) * costs.length_multiplier;

        Some(StreetElevationExtension {
            profile: self.profile.compact(),
            distance_m: d,
            effective_bicycle_safety_distance: bicycle_safety * d,
            effective_bike_distance: costs.speed_factor * d,
            effective_bike_work_distance: costs.work_factor * d,
            effective_walk_distance: costs.walk_factor * d,
            effective_walk_safety_distance: walk_safety * d,
            distance_with_elevation: costs.length_multiplier * d,
            max_slope: costs.max_slope as f32,
            flattened: costs.flattened,
        })
    }
}
