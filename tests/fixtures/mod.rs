//! Test fixtures for route-guard.
//!
//! Provides realistic Delhi coordinates, zone builders and scripted
//! provider implementations for driving the flow without a network.
#![allow(dead_code)]

pub mod delhi_locations;

#[allow(unused_imports)]
pub use delhi_locations::*;

use std::cell::RefCell;

use route_guard::geo::GeoPoint;
use route_guard::polyline::RoutePolyline;
use route_guard::traits::{ProviderError, RoutingProvider, SnappingProvider};

/// Scripted routing provider: returns canned candidate sets in order,
/// one per call, recording the alternatives flag of each request.
pub struct ScriptedProvider {
    responses: RefCell<Vec<Result<Vec<RoutePolyline>, ProviderError>>>,
    pub flags_seen: RefCell<Vec<bool>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<Vec<RoutePolyline>, ProviderError>>) -> Self {
        // Stored reversed so pop() yields them in scripted order.
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: RefCell::new(responses),
            flags_seen: RefCell::new(Vec::new()),
        }
    }
}

impl RoutingProvider for ScriptedProvider {
    fn routes(
        &self,
        _waypoints: &[GeoPoint],
        want_alternatives: bool,
    ) -> Result<Vec<RoutePolyline>, ProviderError> {
        self.flags_seen.borrow_mut().push(want_alternatives);
        self.responses
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| Err(ProviderError::Unavailable("script exhausted".to_string())))
    }
}

impl RoutingProvider for &ScriptedProvider {
    fn routes(
        &self,
        waypoints: &[GeoPoint],
        want_alternatives: bool,
    ) -> Result<Vec<RoutePolyline>, ProviderError> {
        (**self).routes(waypoints, want_alternatives)
    }
}

/// Snapper that leaves every point untouched.
pub struct NoSnap;

impl SnappingProvider for NoSnap {
    fn snap(&self, point: GeoPoint) -> GeoPoint {
        point
    }
}

/// Snapper that nudges every point a fixed latitude offset, standing in
/// for a road-network snap.
pub struct OffsetSnap {
    pub lat_offset: f64,
}

impl SnappingProvider for OffsetSnap {
    fn snap(&self, point: GeoPoint) -> GeoPoint {
        GeoPoint::new(point.lat() + self.lat_offset, point.lon()).unwrap_or(point)
    }
}
