//! Route safety classification and safe-alternative selection.
//!
//! The classifier checks every vertex of a polyline against every zone.
//! Both sets are small (hundreds of points, single-digit zone counts), so
//! the O(points * zones) scan is intentional; a spatial index would buy
//! nothing at this scale. No interpolation happens between consecutive
//! vertices: a segment can geometrically clip a zone between two sampled
//! points without being flagged, an accepted approximation given the
//! resolution of provider geometry.

use std::fmt;

use tracing::debug;

use crate::polyline::RoutePolyline;
use crate::zones::ZoneSet;

/// The first point/zone containment hit found along a route.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Index of the offending point within the polyline.
    pub point_index: usize,
    /// Identifier of the violated zone.
    pub zone_id: String,
}

/// Binary classification of a route against a zone set.
#[derive(Debug, Clone, PartialEq)]
pub enum SafetyVerdict {
    Safe,
    Unsafe { violation: Violation },
}

impl SafetyVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, SafetyVerdict::Safe)
    }
}

/// A route with no points cannot be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyRoute;

impl fmt::Display for EmptyRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot classify an empty route polyline")
    }
}

impl std::error::Error for EmptyRoute {}

/// Classifies a route against a zone set.
///
/// Points are visited in traversal order and each is tested against every
/// zone; the scan short-circuits on the first containment hit, citing that
/// point/zone pair. A route is `Safe` iff no point falls inside any zone.
pub fn classify(route: &RoutePolyline, zones: &ZoneSet) -> Result<SafetyVerdict, EmptyRoute> {
    if route.is_empty() {
        return Err(EmptyRoute);
    }

    for (point_index, point) in route.points().iter().enumerate() {
        if let Some(zone) = zones.first_containing(*point) {
            debug!(
                point_index,
                zone_id = zone.id(),
                "route point inside restricted zone"
            );
            return Ok(SafetyVerdict::Unsafe {
                violation: Violation {
                    point_index,
                    zone_id: zone.id().to_string(),
                },
            });
        }
    }

    Ok(SafetyVerdict::Safe)
}

/// Outcome of scanning a provider-ranked candidate set for a safe route.
///
/// `NoSafeAlternative` is an expected result, not an error; callers must
/// handle both arms explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The first safe candidate, with its rank in the provider's ordering.
    Safe {
        rank: usize,
        route: RoutePolyline,
    },
    NoSafeAlternative,
}

/// Picks the first candidate the classifier marks safe.
///
/// Candidate order is the provider's own ranking (typically fastest-first)
/// and is preserved: ties between safe candidates go to the better rank.
/// Empty candidates are skipped rather than treated as errors; an empty or
/// fully-unsafe set yields `NoSafeAlternative`.
pub fn select_safe(candidates: &[RoutePolyline], zones: &ZoneSet) -> Selection {
    for (rank, candidate) in candidates.iter().enumerate() {
        match classify(candidate, zones) {
            Ok(SafetyVerdict::Safe) => {
                debug!(rank, points = candidate.len(), "safe candidate selected");
                return Selection::Safe {
                    rank,
                    route: candidate.clone(),
                };
            }
            Ok(SafetyVerdict::Unsafe { .. }) | Err(EmptyRoute) => continue,
        }
    }

    debug!(
        candidates = candidates.len(),
        "no safe candidate in provider set"
    );
    Selection::NoSafeAlternative
}
