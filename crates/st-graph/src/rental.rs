//! Vehicle-rental restrictions attached to vertices.
//!
//! A vertex inside a geofencing zone carries one [`RentalRestriction`] per
//! zone.  Restrictions apply only to travellers currently renting a vehicle
//! of the matching network.

use std::sync::Arc;

/// One rental restriction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RentalRestriction {
    /// A geofencing zone of one network.
    GeofencingZone {
        network: Arc<str>,
        drop_off_banned: bool,
        traversal_banned: bool,
    },
    /// The border of a network's business area.  Crossing it while renting
    /// is never allowed.
    BusinessAreaBorder { network: Arc<str> },
}

impl RentalRestriction {
    pub fn network(&self) -> &str {
        match self {
            RentalRestriction::GeofencingZone { network, .. }
            | RentalRestriction::BusinessAreaBorder { network } => network,
        }
    }

    fn matches(&self, renting: bool, network: Option<&str>) -> bool {
        renting && network == Some(self.network())
    }

    pub fn traversal_banned(&self, renting: bool, network: Option<&str>) -> bool {
        match self {
            RentalRestriction::GeofencingZone { traversal_banned, .. } => {
                *traversal_banned && self.matches(renting, network)
            }
            RentalRestriction::BusinessAreaBorder { .. } => self.matches(renting, network),
        }
    }

    pub fn drop_off_banned(&self, renting: bool, network: Option<&str>) -> bool {
        match self {
            RentalRestriction::GeofencingZone { drop_off_banned, .. } => {
                *drop_off_banned && self.matches(renting, network)
            }
            RentalRestriction::BusinessAreaBorder { .. } => false,
        }
    }
}

/// The composite of all restrictions on one vertex.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RentalRestrictions(Vec<RentalRestriction>);

impl RentalRestrictions {
    /// Add `r` unless an equal restriction is already present.
    pub fn add(&mut self, r: RentalRestriction) {
        if !self.0.contains(&r) {
            self.0.push(r);
        }
    }

    pub fn remove(&mut self, r: &RentalRestriction) -> bool {
        let before = self.0.len();
        self.0.retain(|x| x != r);
        self.0.len() != before
    }

    pub fn extend_from(&mut self, other: &RentalRestrictions) {
        for r in &other.0 {
            self.add(r.clone());
        }
    }

    #[inline]
    pub fn has_restrictions(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RentalRestriction> {
        self.0.iter()
    }

    pub fn traversal_banned(&self, renting: bool, network: Option<&str>) -> bool {
        self.0.iter().any(|r| r.traversal_banned(renting, network))
    }

    pub fn drop_off_banned(&self, renting: bool, network: Option<&str>) -> bool {
        self.0.iter().any(|r| r.drop_off_banned(renting, network))
    }

    /// Networks whose vehicles may not be dropped off here, first-seen order.
    pub fn no_drop_off_networks(&self) -> Vec<Arc<str>> {
        let mut out: Vec<Arc<str>> = Vec::new();
        for r in &self.0 {
            if let RentalRestriction::GeofencingZone { network, drop_off_banned: true, .. } = r {
                if !out.contains(network) {
                    out.push(Arc::clone(network));
                }
            }
        }
        out
    }
}
