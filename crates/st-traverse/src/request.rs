//! The per-search request every state carries.

use std::fmt;
use std::sync::Arc;

use st_core::{RoutingPreferences, StreetMode};

use crate::intersection::{DrivingDirection, IntersectionTraversalCalculator, SimpleIntersectionTraversalCalculator};
use crate::TraverseResult;

/// What a street search is asked to do.  Shared by every state of the search.
#[derive(Clone)]
pub struct StreetSearchRequest {
    mode: StreetMode,
    arrive_by: bool,
    wheelchair: bool,
    start_time_ms: i64,
    preferences: Arc<RoutingPreferences>,
    intersection: Arc<dyn IntersectionTraversalCalculator>,
}

impl StreetSearchRequest {
    pub fn builder() -> StreetSearchRequestBuilder {
        StreetSearchRequestBuilder::new()
    }

    /// A builder pre-filled from `self`.
    pub fn copy_of(&self) -> StreetSearchRequestBuilder {
        StreetSearchRequestBuilder {
            mode: self.mode,
            arrive_by: self.arrive_by,
            wheelchair: self.wheelchair,
            start_time_ms: self.start_time_ms,
            preferences: (*self.preferences).clone(),
            intersection: Some(Arc::clone(&self.intersection)),
        }
    }

    #[inline]
    pub fn mode(&self) -> StreetMode {
        self.mode
    }

    /// Reverse search from the destination.
    #[inline]
    pub fn arrive_by(&self) -> bool {
        self.arrive_by
    }

    #[inline]
    pub fn wheelchair(&self) -> bool {
        self.wheelchair
    }

    /// Epoch milliseconds of the search origin (the arrival time when
    /// searching arrive-by).
    #[inline]
    pub fn start_time_ms(&self) -> i64 {
        self.start_time_ms
    }

    #[inline]
    pub fn preferences(&self) -> &RoutingPreferences {
        &self.preferences
    }

    #[inline]
    pub fn intersection_calculator(&self) -> &dyn IntersectionTraversalCalculator {
        &*self.intersection
    }
}

impl fmt::Debug for StreetSearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreetSearchRequest")
            .field("mode", &self.mode)
            .field("arrive_by", &self.arrive_by)
            .field("wheelchair", &self.wheelchair)
            .field("start_time_ms", &self.start_time_ms)
            .field("intersection", &self.intersection)
            .finish_non_exhaustive()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`StreetSearchRequest`].
///
/// | Method                       | Default                                   |
/// |------------------------------|-------------------------------------------|
/// | `.mode(m)`                   | `StreetMode::Walk`                        |
/// | `.arrive_by(b)`              | `false`                                   |
/// | `.wheelchair(b)`             | `false`                                   |
/// | `.start_time_ms(t)`          | `0`                                       |
/// | `.preferences(p)`            | `RoutingPreferences::default()`           |
/// | `.intersection_calculator(c)`| simple model, right-hand traffic          |
///
/// ```
/// use st_core::StreetMode;
/// use st_traverse::StreetSearchRequest;
///
/// let request = StreetSearchRequest::builder()
///     .mode(StreetMode::Bike)
///     .with_preferences(|p| p.with_bike(|b| b.with_speed(4.0)))
///     .build()
///     .unwrap();
/// assert_eq!(request.preferences().bike.speed, 4.0);
/// ```
#[derive(Clone, Debug)]
pub struct StreetSearchRequestBuilder {
    mode: StreetMode,
    arrive_by: bool,
    wheelchair: bool,
    start_time_ms: i64,
    preferences: RoutingPreferences,
    intersection: Option<Arc<dyn IntersectionTraversalCalculator>>,
}

impl StreetSearchRequestBuilder {
    pub fn new() -> Self {
        Self {
            mode: StreetMode::Walk,
            arrive_by: false,
            wheelchair: false,
            start_time_ms: 0,
            preferences: RoutingPreferences::default(),
            intersection: None,
        }
    }

    pub fn mode(mut self, mode: StreetMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn arrive_by(mut self, arrive_by: bool) -> Self {
        self.arrive_by = arrive_by;
        self
    }

    pub fn wheelchair(mut self, wheelchair: bool) -> Self {
        self.wheelchair = wheelchair;
        self
    }

    pub fn start_time_ms(mut self, start_time_ms: i64) -> Self {
        self.start_time_ms = start_time_ms;
        self
    }

    pub fn preferences(mut self, preferences: RoutingPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Tweak the current preferences in place.
    pub fn with_preferences(mut self, f: impl FnOnce(RoutingPreferences) -> RoutingPreferences) -> Self {
        self.preferences = f(self.preferences);
        self
    }

    pub fn intersection_calculator(mut self, calculator: Arc<dyn IntersectionTraversalCalculator>) -> Self {
        self.intersection = Some(calculator);
        self
    }

    /// Validate the preferences and freeze the request.
    ///
    /// # Errors
    ///
    /// [`TraverseError::Config`](crate::TraverseError::Config) when a
    /// preference would make traversal costs NaN or negative.
    pub fn build(self) -> TraverseResult<StreetSearchRequest> {
        self.preferences.validate()?;
        let intersection = self.intersection.unwrap_or_else(|| {
            Arc::new(SimpleIntersectionTraversalCalculator::new(DrivingDirection::Right))
        });
        Ok(StreetSearchRequest {
            mode: self.mode,
            arrive_by: self.arrive_by,
            wheelchair: self.wheelchair,
            start_time_ms: self.start_time_ms,
            preferences: Arc::new(self.preferences),
            intersection,
        })
    }
}

impl Default for StreetSearchRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
