//! Packed boolean attributes of a street edge.

use std::fmt;

use st_core::TraverseMode;

/// Boolean street-edge attributes in one `u16`.
///
/// Bit positions are private; use the named accessors.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreetEdgeFlags(u16);

const BACK: u16                 = 1 << 0;
const ROUNDABOUT: u16           = 1 << 1;
const NAME_IS_DERIVED: u16      = 1 << 2;
const MOTOR_NO_THRU: u16        = 1 << 3;
const STAIRS: u16               = 1 << 4;
const SLOPE_OVERRIDE: u16       = 1 << 5;
const WHEELCHAIR_ACCESSIBLE: u16 = 1 << 6;
const BICYCLE_NO_THRU: u16      = 1 << 7;
const WALK_NO_THRU: u16         = 1 << 8;
const LINK: u16                 = 1 << 9;

macro_rules! flag {
    ($get:ident, $set:ident, $bit:ident) => {
        #[inline]
        pub fn $get(self) -> bool {
            self.0 & $bit != 0
        }

        #[inline]
        pub fn $set(&mut self, value: bool) {
            if value {
                self.0 |= $bit;
            } else {
                self.0 &= !$bit;
            }
        }
    };
}

impl StreetEdgeFlags {
    /// Flags of a new street edge: wheelchair accessible, nothing else.
    pub const DEFAULT_STREET: StreetEdgeFlags = StreetEdgeFlags(WHEELCHAIR_ACCESSIBLE);

    flag!(is_back, set_back, BACK);
    flag!(is_roundabout, set_roundabout, ROUNDABOUT);
    flag!(name_is_derived, set_name_is_derived, NAME_IS_DERIVED);
    flag!(is_motor_vehicle_no_thru_traffic, set_motor_vehicle_no_thru_traffic, MOTOR_NO_THRU);
    flag!(is_bicycle_no_thru_traffic, set_bicycle_no_thru_traffic, BICYCLE_NO_THRU);
    flag!(is_walk_no_thru_traffic, set_walk_no_thru_traffic, WALK_NO_THRU);
    flag!(is_stairs, set_stairs, STAIRS);
    flag!(is_slope_override, set_slope_override, SLOPE_OVERRIDE);
    flag!(is_wheelchair_accessible, set_wheelchair_accessible, WHEELCHAIR_ACCESSIBLE);
    flag!(is_link, set_link, LINK);

    /// No-thru-traffic flag for the class `mode` belongs to.
    #[inline]
    pub fn is_no_thru_traffic(self, mode: TraverseMode) -> bool {
        match mode {
            TraverseMode::Walk => self.is_walk_no_thru_traffic(),
            TraverseMode::Bicycle | TraverseMode::Scooter => self.is_bicycle_no_thru_traffic(),
            TraverseMode::Car => self.is_motor_vehicle_no_thru_traffic(),
        }
    }

    #[inline]
    pub fn bits(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for StreetEdgeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (BACK, "back"),
            (ROUNDABOUT, "roundabout"),
            (NAME_IS_DERIVED, "derived-name"),
            (MOTOR_NO_THRU, "motor-no-thru"),
            (BICYCLE_NO_THRU, "bicycle-no-thru"),
            (WALK_NO_THRU, "walk-no-thru"),
            (STAIRS, "stairs"),
            (SLOPE_OVERRIDE, "slope-override"),
            (WHEELCHAIR_ACCESSIBLE, "wheelchair"),
            (LINK, "link"),
        ];
        f.debug_set()
            .entries(names.iter().filter(|(bit, _)| self.0 & bit != 0).map(|(_, n)| n))
            .finish()
    }
}
