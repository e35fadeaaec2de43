//! Route polylines as decoded coordinate sequences.
//!
//! A polyline stores already-decoded points; translating to and from
//! provider wire formats (GeoJSON coordinate arrays, encoded polyline
//! strings) happens at the API boundary, not here.

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_m, GeoPoint};

/// An ordered sequence of points describing a path.
///
/// Insertion order is traversal order along the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePolyline {
    points: Vec<GeoPoint>,
}

impl RoutePolyline {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Sum of great-circle segment lengths in meters.
    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_m(pair[0], pair[1]))
            .sum()
    }
}

impl FromIterator<GeoPoint> for RoutePolyline {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
