//! `st-traverse` — one step of a street search.
//!
//! Given a [`State`] and an edge of an [`st_graph::Graph`], [`traverse`]
//! returns the successor states.  The outer search (A*, Dijkstra, the open
//! and closed sets, dominance pruning) lives elsewhere and only ever calls
//! [`traverse`] or [`expand`].
//!
//! # Crate layout
//!
//! | Module           | Contents                                                        |
//! |------------------|-----------------------------------------------------------------|
//! | [`request`]      | `StreetSearchRequest` and its builder                           |
//! | [`state`]        | immutable `State`, `StateData`, rental and pickup sub-states    |
//! | [`editor`]       | `StateEditor`, the only way to make a state                     |
//! | [`traverse`]     | `traverse` / `expand` dispatching on `EdgeKind`                 |
//! | [`street`]       | street-edge rules and the per-mode cost model                   |
//! | `other`          | elevators, escalators, pathways, links, parking, rental         |
//! | [`intersection`] | `IntersectionTraversalCalculator` and the default models         |
//! | [`reluctance`]   | mode and wheelchair reluctance                                  |
//! | [`error`]        | `TraverseError`, `TraverseResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on the sub-state enums.   |
//!
//! # Threading
//!
//! States are immutable and shared through `Arc`; a graph published for
//! search is only read.  Any number of searches may traverse the same graph
//! concurrently.

pub mod editor;
pub mod error;
pub mod intersection;
mod other;
pub mod reluctance;
pub mod request;
pub mod state;
pub mod street;
pub mod traverse;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use editor::StateEditor;
pub use error::{TraverseError, TraverseResult};
pub use intersection::{
    ConstantIntersectionTraversalCalculator, DrivingDirection, IntersectionTraversalCalculator,
    SimpleIntersectionTraversalCalculator,
};
pub use reluctance::{compute_reluctance, compute_wheelchair_reluctance};
pub use request::{StreetSearchRequest, StreetSearchRequestBuilder};
pub use state::{CarPickupState, State, StateData, VehicleRentalState};
pub use street::calculate_speed;
pub use traverse::{expand, traverse, Successors};
