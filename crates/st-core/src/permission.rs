//! Per-mode street access permissions.

use std::fmt;

use crate::{TraverseMode, TraverseModeSet};

/// Which classes of traveller may use a street, packed into one byte.
///
/// Scooters are allowed wherever bicycles are.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreetTraversalPermission(u8);

impl StreetTraversalPermission {
    pub const NONE: Self                   = Self(0);
    pub const PEDESTRIAN: Self             = Self(1);
    pub const BICYCLE: Self                = Self(2);
    pub const PEDESTRIAN_AND_BICYCLE: Self = Self(1 | 2);
    pub const CAR: Self                    = Self(4);
    pub const PEDESTRIAN_AND_CAR: Self     = Self(1 | 4);
    pub const BICYCLE_AND_CAR: Self        = Self(2 | 4);
    pub const ALL: Self                    = Self(1 | 2 | 4);

    #[inline]
    const fn mode_bits(mode: TraverseMode) -> u8 {
        match mode {
            TraverseMode::Walk                          => 1,
            TraverseMode::Bicycle | TraverseMode::Scooter => 2,
            TraverseMode::Car                           => 4,
        }
    }

    /// `true` if `mode` may traverse.
    #[inline]
    pub fn allows(self, mode: TraverseMode) -> bool {
        self.0 & Self::mode_bits(mode) != 0
    }

    /// `true` if any mode of `modes` may traverse.
    pub fn allows_any(self, modes: TraverseModeSet) -> bool {
        modes.iter().any(|m| self.allows(m))
    }

    /// `true` if every mode of `modes` may traverse.  Vacuously true for an
    /// empty set.
    pub fn allows_all(self, modes: TraverseModeSet) -> bool {
        modes.iter().all(|m| self.allows(m))
    }

    /// `true` if the two permissions share at least one class.
    #[inline]
    pub fn allows_permission(self, other: StreetTraversalPermission) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn allows_nothing(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn intersection(self, other: StreetTraversalPermission) -> Self {
        Self(self.0 & other.0)
    }

    #[inline]
    pub fn union(self, other: StreetTraversalPermission) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub fn remove(self, other: StreetTraversalPermission) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn as_str(self) -> &'static str {
        match self.0 {
            0 => "NONE",
            1 => "PEDESTRIAN",
            2 => "BICYCLE",
            3 => "PEDESTRIAN_AND_BICYCLE",
            4 => "CAR",
            5 => "PEDESTRIAN_AND_CAR",
            6 => "BICYCLE_AND_CAR",
            _ => "ALL",
        }
    }
}

impl fmt::Debug for StreetTraversalPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StreetTraversalPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
