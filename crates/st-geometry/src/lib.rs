//! `st-geometry` — geometry services consumed by the street graph.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`varint`]    | zig-zag signed varint packing shared by both codecs           |
//! | [`compact`]   | `compact_line_string` / `uncompact_line_string`               |
//! | [`line`]      | polyline length, projection, `split_at_point`, bearings       |
//! | [`elevation`] | `ElevationProfile`, `CompactElevationProfile`, partial slices |
//! | [`slope`]     | `SlopeCostCalculator`, `SlopeCosts`, default slope model      |
//! | [`error`]     | `GeometryError`, `GeometryResult<T>`                          |
//!
//! Geometry is stored per edge only as interior points; the endpoints always
//! come from the edge's vertices.

pub mod compact;
pub mod elevation;
pub mod error;
pub mod line;
pub mod slope;
pub mod varint;

#[cfg(test)]
mod tests;

pub use compact::{compact_line_string, straight_line, uncompact_line_string};
pub use elevation::{CompactElevationProfile, ElevationProfile, ElevationSample};
pub use error::{GeometryError, GeometryResult};
pub use line::{LinearLocation, SplitLine};
pub use slope::{DefaultSlopeCostCalculator, SlopeCostCalculator, SlopeCosts};
