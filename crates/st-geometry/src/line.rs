//! Polyline measurement, projection and splitting.
//!
//! Lengths are spherical (haversine per segment).  Projection of a point
//! onto a polyline uses a local equirectangular plane, which is accurate
//! enough at street scale to pick the right segment and fraction.

use st_core::GeoPoint;

use crate::{GeometryError, GeometryResult};

/// Polyline length in metres.
pub fn length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
}

/// Polyline length in whole millimetres (truncating).  This is the length a
/// street edge gets when none is given explicitly.
#[inline]
pub fn length_mm(points: &[GeoPoint]) -> i32 {
    (length_m(points) * 1000.0) as i32
}

// ── Linear referencing ────────────────────────────────────────────────────────

/// A position along a polyline: segment index plus fraction within it.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct LinearLocation {
    pub segment: usize,
    pub fraction: f64,
}

impl LinearLocation {
    pub const START: LinearLocation = LinearLocation { segment: 0, fraction: 0.0 };

    pub fn end_of(points: &[GeoPoint]) -> LinearLocation {
        LinearLocation { segment: points.len().saturating_sub(2), fraction: 1.0 }
    }
}

fn require_line(points: &[GeoPoint]) -> GeometryResult<()> {
    if points.len() < 2 {
        return Err(GeometryError::TooFewPoints(points.len()));
    }
    Ok(())
}

/// Closest location on `points` to `p`.  On ties the earliest segment wins.
pub fn locate(points: &[GeoPoint], p: GeoPoint) -> GeometryResult<LinearLocation> {
    require_line(points)?;
    let k = p.lat.to_radians().cos();
    let (px, py) = (p.lon * k, p.lat);

    let mut best = LinearLocation::START;
    let mut best_d2 = f64::INFINITY;
    for (i, w) in points.windows(2).enumerate() {
        let (ax, ay) = (w[0].lon * k, w[0].lat);
        let (bx, by) = (w[1].lon * k, w[1].lat);
        let (dx, dy) = (bx - ax, by - ay);
        let len2 = dx * dx + dy * dy;
        let t = if len2 > 0.0 {
            (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (qx, qy) = (ax + t * dx, ay + t * dy);
        let d2 = (px - qx).powi(2) + (py - qy).powi(2);
        if d2 < best_d2 {
            best_d2 = d2;
            best = LinearLocation { segment: i, fraction: t };
        }
    }
    Ok(best)
}

/// Coordinate at `loc`.
#[inline]
pub fn point_at(points: &[GeoPoint], loc: LinearLocation) -> GeoPoint {
    points[loc.segment].lerp(points[loc.segment + 1], loc.fraction)
}

/// Sub-line between two locations.  Reversed if `b` comes before `a`.
pub fn extract(points: &[GeoPoint], a: LinearLocation, b: LinearLocation) -> Vec<GeoPoint> {
    if b < a {
        let mut out = extract(points, b, a);
        out.reverse();
        return out;
    }
    let mut out = Vec::with_capacity(b.segment - a.segment + 2);
    out.push(point_at(points, a));
    out.extend_from_slice(&points[a.segment + 1..=b.segment]);
    out.push(point_at(points, b));
    out
}

// ── Splitting ─────────────────────────────────────────────────────────────────

/// The two halves of a polyline split at a point.  Both share the split
/// coordinate as their joint.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitLine {
    pub head: Vec<GeoPoint>,
    pub tail: Vec<GeoPoint>,
}

/// Split `points` at the projection of `p`.
pub fn split_at_point(points: &[GeoPoint], p: GeoPoint) -> GeometryResult<SplitLine> {
    let loc = locate(points, p)?;
    Ok(SplitLine {
        head: extract(points, LinearLocation::START, loc),
        tail: extract(points, loc, LinearLocation::end_of(points)),
    })
}

/// The part of `points` between the projections of `first` and `second`.
pub fn interior_segment(
    points: &[GeoPoint],
    first: GeoPoint,
    second: GeoPoint,
) -> GeometryResult<Vec<GeoPoint>> {
    let a = locate(points, first)?;
    let b = locate(points, second)?;
    Ok(extract(points, a, b))
}

// ── Bearings ──────────────────────────────────────────────────────────────────

/// Bearing of the first non-degenerate segment, degrees clockwise from north.
pub fn first_bearing(points: &[GeoPoint]) -> Option<f64> {
    points
        .windows(2)
        .find(|w| w[0] != w[1])
        .map(|w| w[0].bearing_deg(w[1]))
}

/// Bearing of the last non-degenerate segment.
pub fn last_bearing(points: &[GeoPoint]) -> Option<f64> {
    points
        .windows(2)
        .rev()
        .find(|w| w[0] != w[1])
        .map(|w| w[0].bearing_deg(w[1]))
}

/// Quantise a bearing to one signed byte (256 steps per full turn).
#[inline]
pub fn degrees_to_brads(deg: f64) -> i8 {
    ((deg * 256.0 / 360.0).round() as i64).rem_euclid(256) as u8 as i8
}

/// Inverse of [`degrees_to_brads`], in `[0, 360)`.
#[inline]
pub fn brads_to_degrees(brads: i8) -> f64 {
    f64::from(brads as u8) * 360.0 / 256.0
}
