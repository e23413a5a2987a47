//! `st-core` — shared vocabulary for the street traversal engine.
//!
//! Every other `st-*` crate depends on this one.  It has no `st-*`
//! dependencies and only `thiserror` (plus optional `serde`) from outside.
//!
//! # What lives here
//!
//! | Module           | Contents                                                   |
//! |------------------|------------------------------------------------------------|
//! | [`ids`]          | `VertexId`, `EdgeId`                                       |
//! | [`geo`]          | `GeoPoint`, haversine distance, bearings                   |
//! | [`mode`]         | `TraverseMode`, `TraverseModeSet`, `StreetMode`, `RentalFormFactor` |
//! | [`permission`]   | `StreetTraversalPermission` bitmask                        |
//! | [`preferences`]  | `RoutingPreferences` and its per-mode groups               |
//! | [`error`]        | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod permission;
pub mod preferences;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, VertexId};
pub use mode::{RentalFormFactor, StreetMode, TraverseMode, TraverseModeSet};
pub use permission::StreetTraversalPermission;
pub use preferences::{
    BikePreferences, CarPreferences, ElevatorPreferences, OptimizeType, ParkingPreferences,
    RentalPreferences, RoutingPreferences, ScooterPreferences, StreetPreferences,
    TimeSlopeSafetyTriangle, VehicleWalkingPreferences, WalkPreferences, WheelchairPreferences,
};
