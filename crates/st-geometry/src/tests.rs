//! Unit tests for st-geometry.
//!
//! Coordinates are built with `GeoPoint::offset_m` from a fixed origin so the
//! expected lengths are easy to read.

#[cfg(test)]
mod helpers {
    use st_core::GeoPoint;

    pub fn origin() -> GeoPoint {
        GeoPoint::new(59.9, 10.7)
    }

    /// An L-shaped line: 100 m east, then 50 m north.
    pub fn l_shape() -> Vec<GeoPoint> {
        let o = origin();
        vec![o, o.offset_m(100.0, 0.0), o.offset_m(100.0, 50.0)]
    }
}

// ── Compact polyline codec ────────────────────────────────────────────────────

#[cfg(test)]
mod compact {
    use std::sync::Arc;

    use st_core::GeoPoint;

    use super::helpers::{l_shape, origin};
    use crate::{compact_line_string, straight_line, uncompact_line_string, GeometryError};

    fn close(a: GeoPoint, b: GeoPoint) -> bool {
        (a.lat - b.lat).abs() < 1e-6 && (a.lon - b.lon).abs() < 1e-6
    }

    #[test]
    fn straight_edges_share_one_buffer() {
        let o = origin();
        let e = o.offset_m(10.0, 0.0);
        let a = compact_line_string(o, e, &[o, e], false);
        let b = compact_line_string(e, o, &[e, o], true);
        assert!(a.is_empty());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &straight_line()));
    }

    #[test]
    fn decodes_interior_points() {
        let line = l_shape();
        let (from, to) = (line[0], line[2]);
        let bytes = compact_line_string(from, to, &line, false);
        let decoded = uncompact_line_string(from, to, &bytes, false).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0], from);
        assert_eq!(decoded[2], to);
        assert!(close(decoded[1], line[1]));
    }

    #[test]
    fn back_edge_bytes_equal_forward_bytes() {
        let line = l_shape();
        let (a, b) = (line[0], line[2]);
        let mut back_line = line.clone();
        back_line.reverse();

        let forward = compact_line_string(a, b, &line, false);
        let back = compact_line_string(b, a, &back_line, true);
        assert_eq!(&*forward, &*back);

        let decoded_back = uncompact_line_string(b, a, &back, true).unwrap();
        assert_eq!(decoded_back[0], b);
        assert_eq!(decoded_back[2], a);
        assert!(close(decoded_back[1], line[1]));
    }

    #[test]
    fn truncated_buffer_is_an_error() {
        let o = origin();
        let err = uncompact_line_string(o, o, &[0x80], false).unwrap_err();
        assert_eq!(err, GeometryError::TruncatedVarint { offset: 0 });
    }
}

// ── Lines ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod line {
    use super::helpers::{l_shape, origin};
    use crate::line::{
        brads_to_degrees, degrees_to_brads, first_bearing, interior_segment, last_bearing,
        length_m, length_mm, locate, split_at_point,
    };
    use crate::GeometryError;

    #[test]
    fn length_of_l_shape() {
        let line = l_shape();
        assert!((length_m(&line) - 150.0).abs() < 0.01);
        let mm = length_mm(&line);
        assert!((149_990..=150_010).contains(&mm), "got {mm}");
    }

    #[test]
    fn split_on_second_segment() {
        let line = l_shape();
        let p = origin().offset_m(100.0, 20.0);
        let split = split_at_point(&line, p).unwrap();
        assert_eq!(split.head.len(), 3);
        assert_eq!(split.tail.len(), 2);
        assert!((length_m(&split.head) - 120.0).abs() < 0.01);
        assert!((length_m(&split.tail) - 30.0).abs() < 0.01);
        assert_eq!(split.head.last(), split.tail.first());
    }

    #[test]
    fn point_off_the_line_is_projected() {
        let line = l_shape();
        let p = origin().offset_m(40.0, -5.0);
        let loc = locate(&line, p).unwrap();
        assert_eq!(loc.segment, 0);
        assert!((loc.fraction - 0.4).abs() < 1e-3);
    }

    #[test]
    fn split_needs_a_line() {
        let err = split_at_point(&[origin()], origin()).unwrap_err();
        assert_eq!(err, GeometryError::TooFewPoints(1));
    }

    #[test]
    fn interior_segment_between_two_points() {
        let line = l_shape();
        let o = origin();
        let part = interior_segment(&line, o.offset_m(50.0, 0.0), o.offset_m(100.0, 25.0)).unwrap();
        assert_eq!(part.len(), 3);
        assert!((length_m(&part) - 75.0).abs() < 0.01);

        let reversed = interior_segment(&line, o.offset_m(100.0, 25.0), o.offset_m(50.0, 0.0)).unwrap();
        assert_eq!(reversed.first(), part.last());
    }

    #[test]
    fn bearings_of_l_shape() {
        let line = l_shape();
        assert!((first_bearing(&line).unwrap() - 90.0).abs() < 0.1);
        assert!(last_bearing(&line).unwrap().abs() < 0.1);
        assert_eq!(first_bearing(&[origin(), origin()]), None);
    }

    #[test]
    fn brads_quantisation() {
        assert_eq!(degrees_to_brads(0.0), 0);
        assert_eq!(degrees_to_brads(90.0), 64);
        assert_eq!(degrees_to_brads(180.0), -128);
        assert_eq!(degrees_to_brads(359.0), -1);
        assert_eq!(degrees_to_brads(-90.0), -64);
        assert_eq!(brads_to_degrees(64), 90.0);
        assert_eq!(brads_to_degrees(-128), 180.0);
        assert_eq!(brads_to_degrees(-64), 270.0);
    }
}

// ── Elevation profiles ────────────────────────────────────────────────────────

#[cfg(test)]
mod elevation {
    use crate::{ElevationProfile, ElevationSample, GeometryError};

    fn ramp() -> ElevationProfile {
        ElevationProfile::from_pairs(&[(0.0, 10.0), (50.0, 15.0), (100.0, 15.0)]).unwrap()
    }

    #[test]
    fn rejects_decreasing_distances() {
        let err = ElevationProfile::from_pairs(&[(0.0, 0.0), (10.0, 1.0), (5.0, 1.0)]).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidProfile(_)));
    }

    #[test]
    fn interpolates_elevation() {
        let p = ramp();
        assert_eq!(p.elevation_at(25.0), Some(12.5));
        assert_eq!(p.elevation_at(-5.0), Some(10.0));
        assert_eq!(p.elevation_at(500.0), Some(15.0));
    }

    #[test]
    fn partial_profile_is_rebased() {
        let p = ramp().partial(25.0, 75.0);
        assert_eq!(
            p.samples(),
            &[
                ElevationSample::new(0.0, 12.5),
                ElevationSample::new(25.0, 15.0),
                ElevationSample::new(50.0, 15.0),
            ]
        );
    }

    #[test]
    fn partial_profile_clamps_range() {
        let p = ramp().partial(-10.0, 1_000.0);
        assert_eq!(p.length_m(), 100.0);
        assert!(ramp().partial(80.0, 20.0).is_empty());
    }

    #[test]
    fn compact_form_keeps_centimetres() {
        let p = ElevationProfile::from_pairs(&[(0.0, 101.234), (12.5, 99.0)]).unwrap();
        let decoded = p.compact().decode().unwrap();
        assert_eq!(decoded.samples()[0], ElevationSample::new(0.0, 101.23));
        assert_eq!(decoded.samples()[1], ElevationSample::new(12.5, 99.0));
    }
}

// ── Slope costs ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod slope {
    use crate::slope::{slope_costs, speed_coefficient, walk_length_factor};
    use crate::{ElevationProfile, SlopeCosts};

    #[test]
    fn flat_profile_is_neutral() {
        let p = ElevationProfile::from_pairs(&[(0.0, 5.0), (100.0, 5.0)]).unwrap();
        let c = slope_costs(&p, true);
        assert!((c.speed_factor - 1.0).abs() < 1e-12);
        assert!((c.work_factor - 1.0).abs() < 1e-12);
        assert!((c.walk_factor - 1.0).abs() < 1e-12);
        assert_eq!(c.max_slope, 0.0);
        assert_eq!(c.safety_cost, 0.0);
        assert!(!c.flattened);
    }

    #[test]
    fn uphill_costs_more() {
        let p = ElevationProfile::from_pairs(&[(0.0, 0.0), (100.0, 8.0)]).unwrap();
        let c = slope_costs(&p, true);
        assert!(c.speed_factor > 1.0);
        assert!(c.work_factor > 1.0);
        assert!(c.walk_factor > 1.0);
        assert!(c.length_multiplier > 1.0);
        assert!((c.max_slope - 0.08).abs() < 1e-12);
    }

    #[test]
    fn descent_adds_safety_cost() {
        let p = ElevationProfile::from_pairs(&[(0.0, 8.0), (100.0, 0.0)]).unwrap();
        let c = slope_costs(&p, true);
        assert!(c.safety_cost > 0.0);
        assert!(c.speed_factor < 1.0);
    }

    #[test]
    fn steep_car_street_is_flattened() {
        let p = ElevationProfile::from_pairs(&[(0.0, 0.0), (10.0, 5.0)]).unwrap();
        let limited = slope_costs(&p, true);
        assert!(limited.flattened);
        assert_eq!(limited.max_slope, 0.0);

        let footpath = slope_costs(&p, false);
        assert!(!footpath.flattened);
        assert!((footpath.max_slope - 0.5).abs() < 1e-12);
    }

    #[test]
    fn tiny_profile_is_neutral() {
        let p = ElevationProfile::from_pairs(&[(0.0, 0.0), (0.0001, 0.0)]).unwrap();
        assert_eq!(slope_costs(&p, false), SlopeCosts::NEUTRAL);
    }

    #[test]
    fn coefficients_are_one_on_flat_ground() {
        assert_eq!(speed_coefficient(0.0), 1.0);
        assert!((walk_length_factor(0.0) - 1.0).abs() < 1e-12);
        assert!(walk_length_factor(0.1) > walk_length_factor(0.0));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::helpers::{l_shape, origin};
    use crate::line::{length_m, split_at_point};

    proptest! {
        #[test]
        fn split_halves_add_up(east in 0.0f64..100.0, north in 0.0f64..50.0, second_leg in any::<bool>()) {
            let line = l_shape();
            let p = if second_leg {
                origin().offset_m(100.0, north)
            } else {
                origin().offset_m(east, 0.0)
            };
            let split = split_at_point(&line, p).unwrap();
            let total = length_m(&line);
            let sum = length_m(&split.head) + length_m(&split.tail);
            prop_assert!((sum - total).abs() < 1e-3, "sum {} vs total {}", sum, total);
        }
    }
}
