//! Mode reluctance: the factor turning street time into weight.

use st_core::{RoutingPreferences, TraverseMode};

/// Reluctance for `mode` on a street edge.  Stairs use the walking stairs
/// reluctance whatever the mode; it replaces the mode reluctance rather than
/// multiplying it, so `walk.reluctance` has no effect on stairs.
pub fn compute_reluctance(
    prefs: &RoutingPreferences,
    mode: TraverseMode,
    walking_bike: bool,
    stairs: bool,
) -> f64 {
    if stairs {
        return prefs.walk.stairs_reluctance;
    }
    match mode {
        TraverseMode::Walk if walking_bike => prefs.bike.walking.reluctance,
        TraverseMode::Walk => prefs.walk.reluctance,
        TraverseMode::Bicycle => prefs.bike.reluctance,
        TraverseMode::Scooter => prefs.scooter.reluctance,
        TraverseMode::Car => prefs.car.reluctance,
    }
}

/// Reluctance for a wheelchair user.
///
/// Starts from the walk reluctance, multiplied by the inaccessible-street
/// reluctance when the edge is not accessible and by the stairs reluctance
/// on stairs.  Each percentage point of slope beyond the configured maximum
/// adds `slope_exceeded_reluctance` to the multiplier.
pub fn compute_wheelchair_reluctance(
    prefs: &RoutingPreferences,
    max_slope: f64,
    accessible: bool,
    stairs: bool,
) -> f64 {
    let wheelchair = &prefs.wheelchair;
    let mut reluctance = if accessible { 1.0 } else { wheelchair.inaccessible_street_reluctance };
    reluctance *= prefs.walk.reluctance;
    if stairs {
        reluctance *= wheelchair.stairs_reluctance;
    }
    let exceeded_by = max_slope.abs() - wheelchair.max_slope;
    if exceeded_by > 0.0 && wheelchair.slope_exceeded_reluctance > 0.0 {
        reluctance *= 1.0 + exceeded_by * 100.0 * wheelchair.slope_exceeded_reluctance;
    }
    reluctance
}
