//! `st-graph` — the street graph: topology, street edges, turn restrictions,
//! edge splitting and spatial lookup.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`graph`]       | `Graph` arena, `connect` / `remove_edge`, setters             |
//! | [`vertex`]      | `Vertex`, `VertexKind`                                        |
//! | [`edge`]        | `Edge`, `EdgeKind` and the non-street edge payloads           |
//! | [`street`]      | `StreetEdge`, `StreetEdgeBuilder`, `StreetEdgeVariant`        |
//! | [`flags`]       | `StreetEdgeFlags` packed booleans                             |
//! | [`elevation`]   | `StreetElevationExtension` and its builder                    |
//! | [`restriction`] | `TurnRestriction`, copy-on-write `TurnRestrictions`           |
//! | [`rental`]      | geofencing `RentalRestriction`s on vertices                   |
//! | [`extension`]   | `StreetEdgeCostExtension` hook                                |
//! | [`split`]       | destructive / non-destructive splitting, disposal handle      |
//! | [`index`]       | `StreetIndex` R-tree over segments and vertices               |
//! | [`error`]       | `GraphError`, `GraphResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Builds the spatial index with rayon.                      |
//! | `serde`    | Derives `Serialize`/`Deserialize` on plain data types.    |

pub mod edge;
pub mod elevation;
pub mod error;
pub mod extension;
pub mod flags;
pub mod graph;
pub mod index;
pub mod rental;
pub mod restriction;
pub mod split;
pub mod street;
pub mod vertex;

#[cfg(test)]
mod tests;

pub use edge::{Edge, EdgeKind, ElevatorHopEdge, EscalatorEdge, PathwayEdge, VehicleRentalEdge};
pub use elevation::{StreetElevationExtension, StreetElevationExtensionBuilder};
pub use error::{GraphError, GraphResult};
pub use extension::{ConstantCostExtension, StreetEdgeCostExtension};
pub use flags::StreetEdgeFlags;
pub use graph::Graph;
pub use index::StreetIndex;
pub use rental::{RentalRestriction, RentalRestrictions};
pub use restriction::{RepeatingTimePeriod, TurnRestriction, TurnRestrictionType, TurnRestrictions};
pub use split::{
    clamp_split_lengths, rescale_split_lengths, DisposableEdgeCollection, LinkingDirection,
    SplitStreetEdge,
};
pub use street::{StreetEdge, StreetEdgeBuilder, StreetEdgeVariant, DEFAULT_CAR_SPEED};
pub use vertex::{Vertex, VertexKind};
