//! Restricted zones and point containment.
//!
//! Zones are circular geofences a route should avoid. The set is loaded
//! once at startup and passed explicitly into every evaluation; nothing in
//! this crate holds zone state globally.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_m, GeoPoint};

/// A circular geofenced area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawZone")]
pub struct RestrictedZone {
    id: String,
    center: GeoPoint,
    radius_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawZone {
    id: String,
    center: GeoPoint,
    radius_m: f64,
}

/// Rejected zone definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneError {
    NonPositiveRadius { id: String, radius_m: f64 },
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneError::NonPositiveRadius { id, radius_m } => {
                write!(f, "zone {:?} has non-positive radius {}", id, radius_m)
            }
        }
    }
}

impl std::error::Error for ZoneError {}

impl TryFrom<RawZone> for RestrictedZone {
    type Error = ZoneError;

    fn try_from(raw: RawZone) -> Result<Self, Self::Error> {
        RestrictedZone::new(raw.id, raw.center, raw.radius_m)
    }
}

impl RestrictedZone {
    pub fn new(
        id: impl Into<String>,
        center: GeoPoint,
        radius_m: f64,
    ) -> Result<Self, ZoneError> {
        let id = id.into();
        if !(radius_m > 0.0) {
            return Err(ZoneError::NonPositiveRadius { id, radius_m });
        }
        Ok(Self {
            id,
            center,
            radius_m,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// True iff the point lies strictly inside the zone radius.
    ///
    /// Strict inequality: a point exactly on the boundary is NOT contained,
    /// so boundary-snapped coordinates are not flagged.
    pub fn contains(&self, point: GeoPoint) -> bool {
        haversine_m(point, self.center) < self.radius_m
    }
}

/// An immutable collection of restricted zones, fixed after startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneSet {
    zones: Vec<RestrictedZone>,
}

impl ZoneSet {
    pub fn new(zones: Vec<RestrictedZone>) -> Self {
        Self { zones }
    }

    /// Parses a zone list from its JSON configuration form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn zones(&self) -> &[RestrictedZone] {
        &self.zones
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// First zone containing the point, if any. Zone order within the set
    /// carries no meaning; any match is sufficient for classification.
    pub fn first_containing(&self, point: GeoPoint) -> Option<&RestrictedZone> {
        self.zones.iter().find(|zone| zone.contains(point))
    }
}

impl FromIterator<RestrictedZone> for ZoneSet {
    fn from_iter<I: IntoIterator<Item = RestrictedZone>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
