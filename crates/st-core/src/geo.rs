//! Geographic coordinate type and spherical helpers.
//!
//! `GeoPoint` stores `f64` latitude/longitude.  Edge lengths are kept in
//! millimetres and split lengths must add up exactly, so single precision
//! (≈1 m at the equator) is not enough here.

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_010.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// Initial bearing towards `other` in degrees, clockwise from north,
    /// normalised to `[0, 360)`.
    pub fn bearing_deg(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// Move by a local east/north offset in metres (equirectangular).
    /// Good to well under a millimetre for the sub-kilometre offsets used
    /// when building test networks and snapping points.
    pub fn offset_m(self, east_m: f64, north_m: f64) -> GeoPoint {
        let d_lat = (north_m / EARTH_RADIUS_M).to_degrees();
        let d_lon = (east_m / (EARTH_RADIUS_M * self.lat.to_radians().cos())).to_degrees();
        GeoPoint::new(self.lat + d_lat, self.lon + d_lon)
    }

    /// Linear interpolation in coordinate space; `t = 0` is `self`.
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint::new(
            self.lat + (other.lat - self.lat) * t,
            self.lon + (other.lon - self.lon) * t,
        )
    }

    /// Approximate bounding-box check, cheap pre-filter for `distance_m`.
    #[inline]
    pub fn within_bbox(self, center: GeoPoint, half_deg: f64) -> bool {
        (self.lat - center.lat).abs() <= half_deg
            && (self.lon - center.lon).abs() <= half_deg
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.7}, {:.7})", self.lat, self.lon)
    }
}
