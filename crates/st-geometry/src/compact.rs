//! Compact polyline codec.
//!
//! Only interior points are stored, as fixed-point (1e-6 degree) deltas
//! from the previous point, starting at the edge's logical start vertex.
//!
//! The `reversed` flag says the edge is the back member of a bidirectional
//! pair: the bytes are then laid out in the *forward* direction, so both
//! edges of the pair encode to identical buffers and can share one `Arc`.
//!
//! A straight segment has no interior points and encodes to a single
//! shared empty buffer.

use std::sync::Arc;

use once_cell::sync::Lazy;

use st_core::GeoPoint;

use crate::varint::{read_i64, write_i64};
use crate::GeometryResult;

const FIXED_FLOAT_MULT: f64 = 1.0e6;

static STRAIGHT_LINE: Lazy<Arc<[u8]>> = Lazy::new(|| Arc::from(Vec::<u8>::new()));

/// The shared empty buffer used for straight edges.
#[inline]
pub fn straight_line() -> Arc<[u8]> {
    Arc::clone(&STRAIGHT_LINE)
}

#[inline]
fn fixed(v: f64) -> i64 {
    (v * FIXED_FLOAT_MULT).round() as i64
}

/// Encode `points` (in the direction of the edge, endpoints included).
///
/// `from`/`to` are the edge's own endpoint coordinates.
pub fn compact_line_string(
    from: GeoPoint,
    to: GeoPoint,
    points: &[GeoPoint],
    reversed: bool,
) -> Arc<[u8]> {
    if points.len() <= 2 {
        return straight_line();
    }
    let interior = &points[1..points.len() - 1];
    let start = if reversed { to } else { from };

    let mut buf = Vec::with_capacity(interior.len() * 4);
    let (mut px, mut py) = (fixed(start.lon), fixed(start.lat));
    let mut push = |p: &GeoPoint| {
        let (x, y) = (fixed(p.lon), fixed(p.lat));
        write_i64(&mut buf, x - px);
        write_i64(&mut buf, y - py);
        px = x;
        py = y;
    };
    if reversed {
        interior.iter().rev().for_each(&mut push);
    } else {
        interior.iter().for_each(&mut push);
    }
    Arc::from(buf)
}

/// Decode a buffer produced by [`compact_line_string`] with the same
/// endpoints and `reversed` flag.  The result runs in the edge's direction.
pub fn uncompact_line_string(
    from: GeoPoint,
    to: GeoPoint,
    bytes: &[u8],
    reversed: bool,
) -> GeometryResult<Vec<GeoPoint>> {
    let (start, end) = if reversed { (to, from) } else { (from, to) };

    let mut points = Vec::with_capacity(2 + bytes.len() / 2);
    points.push(start);

    let (mut x, mut y) = (fixed(start.lon), fixed(start.lat));
    let mut pos = 0;
    while pos < bytes.len() {
        x += read_i64(bytes, &mut pos)?;
        y += read_i64(bytes, &mut pos)?;
        points.push(GeoPoint::new(y as f64 / FIXED_FLOAT_MULT, x as f64 / FIXED_FLOAT_MULT));
    }
    points.push(end);

    if reversed {
        points.reverse();
    }
    Ok(points)
}
