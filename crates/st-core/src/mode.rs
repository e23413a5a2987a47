//! Traverse modes and requested street modes.
//!
//! [`TraverseMode`] is what a state is doing on the current edge.
//! [`StreetMode`] is what the request asked for; one request mode may switch
//! between several traverse modes (rent a scooter, park a car, get dropped
//! off) during a single street search.

use std::fmt;

// ── TraverseMode ──────────────────────────────────────────────────────────────

/// The physical mode used to traverse a single edge.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraverseMode {
    Walk,
    Bicycle,
    Scooter,
    Car,
}

impl TraverseMode {
    pub const ALL: [TraverseMode; 4] = [
        TraverseMode::Walk,
        TraverseMode::Bicycle,
        TraverseMode::Scooter,
        TraverseMode::Car,
    ];

    #[inline]
    pub fn is_in_car(self) -> bool {
        matches!(self, TraverseMode::Car)
    }

    /// Bicycles and scooters share the cycling cost model.
    #[inline]
    pub fn is_cycling(self) -> bool {
        matches!(self, TraverseMode::Bicycle | TraverseMode::Scooter)
    }

    #[inline]
    pub fn is_walking(self) -> bool {
        matches!(self, TraverseMode::Walk)
    }

    #[inline]
    const fn bit(self) -> u8 {
        match self {
            TraverseMode::Walk    => 1 << 0,
            TraverseMode::Bicycle => 1 << 1,
            TraverseMode::Scooter => 1 << 2,
            TraverseMode::Car     => 1 << 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TraverseMode::Walk    => "walk",
            TraverseMode::Bicycle => "bicycle",
            TraverseMode::Scooter => "scooter",
            TraverseMode::Car     => "car",
        }
    }
}

impl fmt::Display for TraverseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TraverseModeSet ───────────────────────────────────────────────────────────

/// A set of [`TraverseMode`]s packed into one byte.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraverseModeSet(u8);

impl TraverseModeSet {
    pub const EMPTY: TraverseModeSet = TraverseModeSet(0);

    pub const fn all() -> Self {
        TraverseModeSet(
            TraverseMode::Walk.bit()
                | TraverseMode::Bicycle.bit()
                | TraverseMode::Scooter.bit()
                | TraverseMode::Car.bit(),
        )
    }

    pub fn of(modes: &[TraverseMode]) -> Self {
        modes.iter().fold(Self::EMPTY, |set, &m| set.with(m))
    }

    #[inline]
    pub const fn with(self, mode: TraverseMode) -> Self {
        TraverseModeSet(self.0 | mode.bit())
    }

    #[inline]
    pub fn insert(&mut self, mode: TraverseMode) {
        self.0 |= mode.bit();
    }

    #[inline]
    pub fn contains(self, mode: TraverseMode) -> bool {
        self.0 & mode.bit() != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = TraverseMode> {
        TraverseMode::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl fmt::Debug for TraverseModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<TraverseMode> for TraverseModeSet {
    fn from_iter<I: IntoIterator<Item = TraverseMode>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |set, m| set.with(m))
    }
}

// ── RentalFormFactor ──────────────────────────────────────────────────────────

/// Kind of rented vehicle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RentalFormFactor {
    Bicycle,
    Scooter,
    Car,
}

impl RentalFormFactor {
    #[inline]
    pub fn traverse_mode(self) -> TraverseMode {
        match self {
            RentalFormFactor::Bicycle => TraverseMode::Bicycle,
            RentalFormFactor::Scooter => TraverseMode::Scooter,
            RentalFormFactor::Car     => TraverseMode::Car,
        }
    }
}

// ── StreetMode ────────────────────────────────────────────────────────────────

/// The access/egress/direct mode requested for a street search.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreetMode {
    #[default]
    Walk,
    Bike,
    /// Park-and-ride with a private bicycle.
    BikeToPark,
    BikeRental,
    ScooterRental,
    Car,
    /// Park-and-ride with a private car.
    CarToPark,
    /// Kiss-and-ride: walk to a pick-up point, ride, walk from the drop-off.
    CarPickup,
    CarRental,
}

impl StreetMode {
    pub fn includes_renting(self) -> bool {
        matches!(
            self,
            StreetMode::BikeRental | StreetMode::ScooterRental | StreetMode::CarRental
        )
    }

    pub fn includes_parking(self) -> bool {
        matches!(self, StreetMode::BikeToPark | StreetMode::CarToPark)
    }

    pub fn includes_pickup(self) -> bool {
        matches!(self, StreetMode::CarPickup)
    }

    pub fn includes_driving(self) -> bool {
        matches!(
            self,
            StreetMode::Car | StreetMode::CarToPark | StreetMode::CarPickup | StreetMode::CarRental
        )
    }

    pub fn includes_biking(self) -> bool {
        matches!(self, StreetMode::Bike | StreetMode::BikeToPark | StreetMode::BikeRental)
    }

    /// Vehicle kind for rental modes.
    pub fn rental_form_factor(self) -> Option<RentalFormFactor> {
        match self {
            StreetMode::BikeRental    => Some(RentalFormFactor::Bicycle),
            StreetMode::ScooterRental => Some(RentalFormFactor::Scooter),
            StreetMode::CarRental     => Some(RentalFormFactor::Car),
            _ => None,
        }
    }

    /// Private vehicle mode for park-and-ride requests.
    pub fn parked_vehicle_mode(self) -> Option<TraverseMode> {
        match self {
            StreetMode::BikeToPark => Some(TraverseMode::Bicycle),
            StreetMode::CarToPark  => Some(TraverseMode::Car),
            _ => None,
        }
    }

    /// Traverse mode a plain (non-forked) initial state starts in.
    pub fn initial_mode(self) -> TraverseMode {
        match self {
            StreetMode::Bike | StreetMode::BikeToPark => TraverseMode::Bicycle,
            StreetMode::Car | StreetMode::CarToPark   => TraverseMode::Car,
            StreetMode::Walk
            | StreetMode::BikeRental
            | StreetMode::ScooterRental
            | StreetMode::CarPickup
            | StreetMode::CarRental => TraverseMode::Walk,
        }
    }
}
