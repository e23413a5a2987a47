//! Routing preferences consumed by the cost model.
//!
//! These are plain data with defaults; loading them from a config file is the
//! caller's job (enable the `serde` feature and deserialize
//! [`RoutingPreferences`] directly).  Every group has consuming `with_*`
//! setters so tests and callers can tweak one value without spelling out the
//! rest:
//!
//! ```
//! use st_core::RoutingPreferences;
//!
//! let prefs = RoutingPreferences::default()
//!     .with_walk(|w| w.with_speed(1.5).with_reluctance(1.0));
//! assert_eq!(prefs.walk.speed, 1.5);
//! prefs.validate().unwrap();
//! ```

use crate::{CoreError, CoreResult};

macro_rules! setters {
    ($ty:ident { $($field:ident : $fty:ty => $name:ident),* $(,)? }) => {
        impl $ty {
            $(
                #[must_use]
                pub fn $name(mut self, value: $fty) -> Self {
                    self.$field = value;
                    self
                }
            )*
        }
    };
}

fn check_positive(name: &str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be positive and finite, got {value}")))
    }
}

fn check_non_negative(name: &str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be non-negative and finite, got {value}")))
    }
}

// ── Cycling optimisation ──────────────────────────────────────────────────────

/// How bicycle and scooter weights are derived from an edge.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptimizeType {
    /// Elevation-adjusted riding distance.
    ShortestDuration,
    /// Elevation-adjusted safety distance.
    #[default]
    SafeStreets,
    /// Elevation-adjusted work (energy) distance.
    FlatStreets,
    /// Raw safety factor times distance, with very safe streets discounted.
    SafestStreets,
    /// Weighted mix of quickness, flatness and safety.
    Triangle,
}

/// Weights for [`OptimizeType::Triangle`], normalised to sum to one.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSlopeSafetyTriangle {
    pub time:   f64,
    pub slope:  f64,
    pub safety: f64,
}

impl TimeSlopeSafetyTriangle {
    /// Build from raw weights.  Negative weights count as zero; the rest are
    /// scaled so they sum to one.
    pub fn new(time: f64, slope: f64, safety: f64) -> CoreResult<Self> {
        let (time, slope, safety) = (time.max(0.0), slope.max(0.0), safety.max(0.0));
        let total = time + slope + safety;
        if !(total.is_finite() && total > 0.0) {
            return Err(CoreError::Config(format!(
                "triangle weights must sum to a positive value, got {total}"
            )));
        }
        Ok(Self { time: time / total, slope: slope / total, safety: safety / total })
    }
}

impl Default for TimeSlopeSafetyTriangle {
    fn default() -> Self {
        Self { time: 1.0 / 3.0, slope: 1.0 / 3.0, safety: 1.0 / 3.0 }
    }
}

// ── Walking ───────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalkPreferences {
    /// Metres per second on flat ground.
    pub speed: f64,
    pub reluctance: f64,
    pub stairs_reluctance: f64,
    /// Non-car speeds are divided by this on stairs.
    pub stairs_time_factor: f64,
    /// `0` ignores walk safety, `1` uses only the safety-adjusted distance.
    pub safety_factor: f64,
    pub escalator_speed: f64,
    pub escalator_reluctance: f64,
}

impl Default for WalkPreferences {
    fn default() -> Self {
        Self {
            speed:                1.33,
            reluctance:           2.0,
            stairs_reluctance:    2.0,
            stairs_time_factor:   3.0,
            safety_factor:        1.0,
            escalator_speed:      0.45,
            escalator_reluctance: 1.5,
        }
    }
}

setters!(WalkPreferences {
    speed: f64 => with_speed,
    reluctance: f64 => with_reluctance,
    stairs_reluctance: f64 => with_stairs_reluctance,
    stairs_time_factor: f64 => with_stairs_time_factor,
    safety_factor: f64 => with_safety_factor,
    escalator_speed: f64 => with_escalator_speed,
    escalator_reluctance: f64 => with_escalator_reluctance,
});

/// Walking while pushing a bicycle.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VehicleWalkingPreferences {
    pub speed: f64,
    pub reluctance: f64,
    pub stairs_reluctance: f64,
    /// One-off penalty for switching between riding and pushing.
    pub mount_dismount_time_s: u32,
    pub mount_dismount_cost: f64,
}

impl Default for VehicleWalkingPreferences {
    fn default() -> Self {
        Self {
            speed:                 1.33,
            reluctance:            5.0,
            stairs_reluctance:     10.0,
            mount_dismount_time_s: 0,
            mount_dismount_cost:   0.0,
        }
    }
}

setters!(VehicleWalkingPreferences {
    speed: f64 => with_speed,
    reluctance: f64 => with_reluctance,
    stairs_reluctance: f64 => with_stairs_reluctance,
    mount_dismount_time_s: u32 => with_mount_dismount_time_s,
    mount_dismount_cost: f64 => with_mount_dismount_cost,
});

// ── Cycling and scooters ──────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BikePreferences {
    pub speed: f64,
    pub reluctance: f64,
    pub optimize_type: OptimizeType,
    pub triangle: TimeSlopeSafetyTriangle,
    pub walking: VehicleWalkingPreferences,
}

impl Default for BikePreferences {
    fn default() -> Self {
        Self {
            speed:         5.0,
            reluctance:    2.0,
            optimize_type: OptimizeType::default(),
            triangle:      TimeSlopeSafetyTriangle::default(),
            walking:       VehicleWalkingPreferences::default(),
        }
    }
}

setters!(BikePreferences {
    speed: f64 => with_speed,
    reluctance: f64 => with_reluctance,
    optimize_type: OptimizeType => with_optimize_type,
    triangle: TimeSlopeSafetyTriangle => with_triangle,
});

impl BikePreferences {
    #[must_use]
    pub fn with_walking(
        mut self,
        f: impl FnOnce(VehicleWalkingPreferences) -> VehicleWalkingPreferences,
    ) -> Self {
        self.walking = f(self.walking);
        self
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScooterPreferences {
    pub speed: f64,
    pub reluctance: f64,
    pub optimize_type: OptimizeType,
    pub triangle: TimeSlopeSafetyTriangle,
}

impl Default for ScooterPreferences {
    fn default() -> Self {
        Self {
            speed:         5.0,
            reluctance:    2.0,
            optimize_type: OptimizeType::default(),
            triangle:      TimeSlopeSafetyTriangle::default(),
        }
    }
}

setters!(ScooterPreferences {
    speed: f64 => with_speed,
    reluctance: f64 => with_reluctance,
    optimize_type: OptimizeType => with_optimize_type,
    triangle: TimeSlopeSafetyTriangle => with_triangle,
});

// ── Driving ───────────────────────────────────────────────────────────────────

/// Car speed comes from each edge; only the reluctance and kiss-and-ride
/// penalties are preferences.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CarPreferences {
    pub reluctance: f64,
    pub pickup_time_s: u32,
    pub pickup_cost: f64,
}

impl Default for CarPreferences {
    fn default() -> Self {
        Self { reluctance: 2.0, pickup_time_s: 60, pickup_cost: 60.0 }
    }
}

setters!(CarPreferences {
    reluctance: f64 => with_reluctance,
    pickup_time_s: u32 => with_pickup_time_s,
    pickup_cost: f64 => with_pickup_cost,
});

// ── Street, wheelchair, elevator ──────────────────────────────────────────────

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StreetPreferences {
    /// Weight per second of intersection turn duration.
    pub turn_reluctance: f64,
}

impl Default for StreetPreferences {
    fn default() -> Self {
        Self { turn_reluctance: 1.0 }
    }
}

setters!(StreetPreferences {
    turn_reluctance: f64 => with_turn_reluctance,
});

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WheelchairPreferences {
    /// Slope (rise over run) above which the excess-slope penalty applies.
    pub max_slope: f64,
    pub slope_exceeded_reluctance: f64,
    pub inaccessible_street_reluctance: f64,
    pub stairs_reluctance: f64,
}

impl Default for WheelchairPreferences {
    fn default() -> Self {
        Self {
            max_slope:                      0.083,
            slope_exceeded_reluctance:      1.0,
            inaccessible_street_reluctance: 25.0,
            stairs_reluctance:              100.0,
        }
    }
}

setters!(WheelchairPreferences {
    max_slope: f64 => with_max_slope,
    slope_exceeded_reluctance: f64 => with_slope_exceeded_reluctance,
    inaccessible_street_reluctance: f64 => with_inaccessible_street_reluctance,
    stairs_reluctance: f64 => with_stairs_reluctance,
});

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ElevatorPreferences {
    pub board_time_s: u32,
    pub board_cost: f64,
    /// Per level travelled.
    pub hop_time_s: u32,
    pub hop_cost: f64,
}

impl Default for ElevatorPreferences {
    fn default() -> Self {
        Self { board_time_s: 90, board_cost: 90.0, hop_time_s: 20, hop_cost: 20.0 }
    }
}

setters!(ElevatorPreferences {
    board_time_s: u32 => with_board_time_s,
    board_cost: f64 => with_board_cost,
    hop_time_s: u32 => with_hop_time_s,
    hop_cost: f64 => with_hop_cost,
});

// ── Rental and parking ────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RentalPreferences {
    pub pickup_time_s: u32,
    pub pickup_cost: f64,
    pub drop_off_time_s: u32,
    pub drop_off_cost: f64,
    /// When non-empty, only these networks may be used.
    pub allowed_networks: Vec<String>,
    /// Ignored when `allowed_networks` is non-empty.
    pub banned_networks: Vec<String>,
    pub allow_arriving_in_rented_vehicle: bool,
}

impl Default for RentalPreferences {
    fn default() -> Self {
        Self {
            pickup_time_s:                    60,
            pickup_cost:                      120.0,
            drop_off_time_s:                  30,
            drop_off_cost:                    30.0,
            allowed_networks:                 Vec::new(),
            banned_networks:                  Vec::new(),
            allow_arriving_in_rented_vehicle: false,
        }
    }
}

setters!(RentalPreferences {
    pickup_time_s: u32 => with_pickup_time_s,
    pickup_cost: f64 => with_pickup_cost,
    drop_off_time_s: u32 => with_drop_off_time_s,
    drop_off_cost: f64 => with_drop_off_cost,
    allowed_networks: Vec<String> => with_allowed_networks,
    banned_networks: Vec<String> => with_banned_networks,
    allow_arriving_in_rented_vehicle: bool => with_allow_arriving_in_rented_vehicle,
});

impl RentalPreferences {
    /// Allow-list wins over the ban-list.
    pub fn network_allowed(&self, network: &str) -> bool {
        if self.allowed_networks.is_empty() {
            !self.banned_networks.iter().any(|n| n == network)
        } else {
            self.allowed_networks.iter().any(|n| n == network)
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParkingPreferences {
    pub park_time_s: u32,
    pub park_cost: f64,
}

impl Default for ParkingPreferences {
    fn default() -> Self {
        Self { park_time_s: 60, park_cost: 120.0 }
    }
}

setters!(ParkingPreferences {
    park_time_s: u32 => with_park_time_s,
    park_cost: f64 => with_park_cost,
});

// ── RoutingPreferences ────────────────────────────────────────────────────────

/// All preferences a street search reads during traversal.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutingPreferences {
    pub walk: WalkPreferences,
    pub bike: BikePreferences,
    pub scooter: ScooterPreferences,
    pub car: CarPreferences,
    pub street: StreetPreferences,
    pub wheelchair: WheelchairPreferences,
    pub elevator: ElevatorPreferences,
    pub rental: RentalPreferences,
    pub parking: ParkingPreferences,
}

macro_rules! group_setters {
    ($($field:ident : $ty:ty => $name:ident),* $(,)?) => {
        impl RoutingPreferences {
            $(
                #[must_use]
                pub fn $name(mut self, f: impl FnOnce($ty) -> $ty) -> Self {
                    self.$field = f(self.$field);
                    self
                }
            )*
        }
    };
}

group_setters! {
    walk: WalkPreferences => with_walk,
    bike: BikePreferences => with_bike,
    scooter: ScooterPreferences => with_scooter,
    car: CarPreferences => with_car,
    street: StreetPreferences => with_street,
    wheelchair: WheelchairPreferences => with_wheelchair,
    elevator: ElevatorPreferences => with_elevator,
    rental: RentalPreferences => with_rental,
    parking: ParkingPreferences => with_parking,
}

impl RoutingPreferences {
    /// Reject values that would make traversal produce NaN or negative costs.
    pub fn validate(&self) -> CoreResult<()> {
        check_positive("walk.speed", self.walk.speed)?;
        check_positive("walk.stairs_time_factor", self.walk.stairs_time_factor)?;
        check_positive("walk.escalator_speed", self.walk.escalator_speed)?;
        check_positive("bike.speed", self.bike.speed)?;
        check_positive("bike.walking.speed", self.bike.walking.speed)?;
        check_positive("scooter.speed", self.scooter.speed)?;

        check_non_negative("walk.reluctance", self.walk.reluctance)?;
        check_non_negative("walk.stairs_reluctance", self.walk.stairs_reluctance)?;
        check_non_negative("walk.escalator_reluctance", self.walk.escalator_reluctance)?;
        check_non_negative("bike.reluctance", self.bike.reluctance)?;
        check_non_negative("bike.walking.reluctance", self.bike.walking.reluctance)?;
        check_non_negative("bike.walking.stairs_reluctance", self.bike.walking.stairs_reluctance)?;
        check_non_negative("bike.walking.mount_dismount_cost", self.bike.walking.mount_dismount_cost)?;
        check_non_negative("scooter.reluctance", self.scooter.reluctance)?;
        check_non_negative("car.reluctance", self.car.reluctance)?;
        check_non_negative("car.pickup_cost", self.car.pickup_cost)?;
        check_non_negative("street.turn_reluctance", self.street.turn_reluctance)?;
        check_non_negative("wheelchair.max_slope", self.wheelchair.max_slope)?;
        check_non_negative("elevator.board_cost", self.elevator.board_cost)?;
        check_non_negative("elevator.hop_cost", self.elevator.hop_cost)?;
        check_non_negative("rental.pickup_cost", self.rental.pickup_cost)?;
        check_non_negative("rental.drop_off_cost", self.rental.drop_off_cost)?;
        check_non_negative("parking.park_cost", self.parking.park_cost)?;

        if !(0.0..=1.0).contains(&self.walk.safety_factor) {
            return Err(CoreError::Config(format!(
                "walk.safety_factor must be within [0, 1], got {}",
                self.walk.safety_factor
            )));
        }
        Ok(())
    }
}
