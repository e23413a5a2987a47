//! Elevation profiles along an edge.
//!
//! A profile is a list of `(distance along edge, elevation)` samples in
//! metres with non-decreasing distances.  Edges hold it in compact form
//! (centimetre varint deltas); the cost model only needs the derived
//! factors, so decoding happens at construction and split time only.

use std::sync::Arc;

use crate::varint::{read_i64, write_i64};
use crate::{GeometryError, GeometryResult};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElevationSample {
    pub distance_m: f64,
    pub elevation_m: f64,
}

impl ElevationSample {
    #[inline]
    pub fn new(distance_m: f64, elevation_m: f64) -> Self {
        Self { distance_m, elevation_m }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElevationProfile {
    samples: Vec<ElevationSample>,
}

impl ElevationProfile {
    /// Validate and wrap samples.
    pub fn new(samples: Vec<ElevationSample>) -> GeometryResult<Self> {
        if let Some(bad) = samples
            .iter()
            .find(|s| !s.distance_m.is_finite() || !s.elevation_m.is_finite())
        {
            return Err(GeometryError::InvalidProfile(format!("non-finite sample {bad:?}")));
        }
        if samples.windows(2).any(|w| w[1].distance_m < w[0].distance_m) {
            return Err(GeometryError::InvalidProfile("distances must not decrease".into()));
        }
        Ok(Self { samples })
    }

    /// Convenience constructor from `(distance, elevation)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> GeometryResult<Self> {
        Self::new(pairs.iter().map(|&(d, e)| ElevationSample::new(d, e)).collect())
    }

    #[inline]
    pub fn samples(&self) -> &[ElevationSample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distance of the last sample.
    pub fn length_m(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.distance_m)
    }

    /// Linearly interpolated elevation at `distance_m`, clamped to the ends.
    pub fn elevation_at(&self, distance_m: f64) -> Option<f64> {
        let first = self.samples.first()?;
        if distance_m <= first.distance_m {
            return Some(first.elevation_m);
        }
        for w in self.samples.windows(2) {
            let (a, b) = (w[0], w[1]);
            if distance_m <= b.distance_m {
                let run = b.distance_m - a.distance_m;
                if run <= 0.0 {
                    return Some(b.elevation_m);
                }
                let t = (distance_m - a.distance_m) / run;
                return Some(a.elevation_m + t * (b.elevation_m - a.elevation_m));
            }
        }
        self.samples.last().map(|s| s.elevation_m)
    }

    /// The part of the profile between `start_m` and `end_m`, re-based so it
    /// starts at distance zero.  Boundary elevations are interpolated.
    /// Returns an empty profile if the range is empty after clamping.
    pub fn partial(&self, start_m: f64, end_m: f64) -> ElevationProfile {
        let start = start_m.max(0.0);
        let end = end_m.min(self.length_m());
        let (Some(e0), Some(e1)) = (self.elevation_at(start), self.elevation_at(end)) else {
            return ElevationProfile::default();
        };
        if end <= start {
            return ElevationProfile::default();
        }

        let mut samples = Vec::with_capacity(self.samples.len() + 2);
        samples.push(ElevationSample::new(0.0, e0));
        samples.extend(
            self.samples
                .iter()
                .filter(|s| s.distance_m > start && s.distance_m < end)
                .map(|s| ElevationSample::new(s.distance_m - start, s.elevation_m)),
        );
        samples.push(ElevationSample::new(end - start, e1));
        ElevationProfile { samples }
    }

    /// Pack into centimetre-precision varint deltas.
    pub fn compact(&self) -> CompactElevationProfile {
        let mut buf = Vec::with_capacity(self.samples.len() * 3);
        let (mut pd, mut pe) = (0i64, 0i64);
        for s in &self.samples {
            let d = (s.distance_m * 100.0).round() as i64;
            let e = (s.elevation_m * 100.0).round() as i64;
            write_i64(&mut buf, d - pd);
            write_i64(&mut buf, e - pe);
            pd = d;
            pe = e;
        }
        CompactElevationProfile(Arc::from(buf))
    }
}

/// Packed elevation profile as stored on an edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactElevationProfile(Arc<[u8]>);

impl CompactElevationProfile {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn decode(&self) -> GeometryResult<ElevationProfile> {
        let bytes = &self.0;
        let mut samples = Vec::with_capacity(bytes.len() / 3);
        let (mut d, mut e) = (0i64, 0i64);
        let mut pos = 0;
        while pos < bytes.len() {
            d += read_i64(bytes, &mut pos)?;
            e += read_i64(bytes, &mut pos)?;
            samples.push(ElevationSample::new(d as f64 / 100.0, e as f64 / 100.0));
        }
        ElevationProfile::new(samples)
    }
}
