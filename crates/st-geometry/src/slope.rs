//! Slope-dependent cost factors derived from an elevation profile.
//!
//! All factors are multipliers of an edge's flat (2-D) length, except
//! `safety_cost` which is an absolute extra distance in metres.

use log::warn;

use crate::ElevationProfile;

/// Energy per metre on flat ground.
const ENERGY_PER_METER_ON_FLAT: f64 = 1.0;
/// Extra energy per metre for uphill, multiplied by slope cubed.
const ENERGY_SLOPE_FACTOR: f64 = 4000.0;
/// Steepest street open to cars anywhere; steeper samples are data errors.
const MAX_CAR_SLOPE: f64 = 0.35;
/// Hard ceiling for everything else.
const MAX_SLOPE: f64 = 1.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlopeCosts {
    /// Effective riding length / flat length.
    pub speed_factor: f64,
    /// Effective work length / flat length.
    pub work_factor: f64,
    /// Effective walking length / flat length.
    pub walk_factor: f64,
    pub max_slope: f64,
    /// Extra safety distance from fast descents, metres.
    pub safety_cost: f64,
    /// 3-D length / flat length.
    pub length_multiplier: f64,
    /// At least one sample exceeded the slope limit and was treated as flat.
    pub flattened: bool,
}

impl SlopeCosts {
    pub const NEUTRAL: SlopeCosts = SlopeCosts {
        speed_factor:      1.0,
        work_factor:       1.0,
        walk_factor:       1.0,
        max_slope:         0.0,
        safety_cost:       0.0,
        length_multiplier: 1.0,
        flattened:         false,
    };
}

/// Computes [`SlopeCosts`] for a profile.
///
/// `car_slope_limited` is set for streets open to cars, where slopes above
/// 35 % are considered bad data.
pub trait SlopeCostCalculator: Send + Sync {
    fn slope_costs(&self, profile: &ElevationProfile, car_slope_limited: bool) -> SlopeCosts;
}

/// Cubic work model for cycling energy, a smooth speed coefficient for
/// riding and Tobler's hiking function for walking.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultSlopeCostCalculator;

/// Riding speed relative to flat ground.  Below 1 uphill, above 1 downhill
/// (capped at 1.6).
pub fn speed_coefficient(slope: f64) -> f64 {
    if slope >= 0.0 {
        1.0 / (1.0 + 10.0 * slope + 40.0 * slope * slope)
    } else {
        (1.0 - 4.0 * slope).min(1.6)
    }
}

/// Flat walking speed divided by Tobler walking speed at `slope`.
pub fn walk_length_factor(slope: f64) -> f64 {
    (3.5 * ((slope + 0.05).abs() - 0.05)).exp()
}

impl SlopeCostCalculator for DefaultSlopeCostCalculator {
    fn slope_costs(&self, profile: &ElevationProfile, car_slope_limited: bool) -> SlopeCosts {
        let samples = profile.samples();

        let (mut true_length, mut flat_length) = (0.0, 0.0);
        for w in samples.windows(2) {
            let run = w[1].distance_m - w[0].distance_m;
            let rise = w[1].elevation_m - w[0].elevation_m;
            true_length += run.hypot(rise);
            flat_length += run;
        }
        if flat_length < 1e-3 {
            warn!("elevation profile of {flat_length} m is too short, using neutral slope costs");
            return SlopeCosts::NEUTRAL;
        }

        let mut flattened = false;
        let mut max_slope: f64 = 0.0;
        let (mut speed_len, mut work, mut walk_len, mut safety) = (0.0, 0.0, 0.0, 0.0);

        for w in samples.windows(2) {
            let run = w[1].distance_m - w[0].distance_m;
            if run == 0.0 {
                continue;
            }
            let rise = w[1].elevation_m - w[0].elevation_m;
            let mut slope = rise / run;
            if (car_slope_limited && slope.abs() > MAX_CAR_SLOPE) || slope.abs() > MAX_SLOPE {
                slope = 0.0;
                flattened = true;
            }
            max_slope = max_slope.max(slope.abs());

            let hypotenuse = run.hypot(rise);
            let up = slope.max(0.0);
            work += hypotenuse * (ENERGY_PER_METER_ON_FLAT + ENERGY_SLOPE_FACTOR * up * up * up);

            let coef = speed_coefficient(slope);
            speed_len += hypotenuse / coef;
            let extra = hypotenuse * (coef - 1.0) * 0.25;
            if extra > 0.0 {
                safety += extra;
            }

            walk_len += run * walk_length_factor(slope);
        }

        SlopeCosts {
            speed_factor:      speed_len / flat_length,
            work_factor:       work / flat_length,
            walk_factor:       walk_len / flat_length,
            max_slope,
            safety_cost:       safety,
            length_multiplier: true_length / flat_length,
            flattened,
        }
    }
}

/// Shorthand for the default calculator.
pub fn slope_costs(profile: &ElevationProfile, car_slope_limited: bool) -> SlopeCosts {
    DefaultSlopeCostCalculator.slope_costs(profile, car_slope_limited)
}
