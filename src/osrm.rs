//! OSRM HTTP adapter for route candidates and point snapping.

use serde::Deserialize;
use tracing::warn;

use crate::geo::GeoPoint;
use crate::polyline::RoutePolyline;
use crate::traits::{ProviderError, RoutingProvider, SnappingProvider};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn coords_segment(waypoints: &[GeoPoint]) -> String {
        waypoints
            .iter()
            .map(|point| format!("{:.6},{:.6}", point.lon(), point.lat()))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl RoutingProvider for OsrmClient {
    fn routes(
        &self,
        waypoints: &[GeoPoint],
        want_alternatives: bool,
    ) -> Result<Vec<RoutePolyline>, ProviderError> {
        if waypoints.len() < 2 {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson&alternatives={}",
            self.config.base_url,
            self.config.profile,
            Self::coords_segment(waypoints),
            want_alternatives,
        );

        let body: OsrmRouteResponse = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())?;

        // OSRM reports "NoRoute" via the body code; that is an empty
        // candidate set, not a provider failure.
        if body.code != "Ok" {
            return Ok(Vec::new());
        }

        body.routes
            .into_iter()
            .map(|route| decode_line_string(route.geometry))
            .collect()
    }
}

impl SnappingProvider for OsrmClient {
    /// Snaps to the nearest routable road position via `/nearest`.
    ///
    /// Any failure (network, non-Ok code, malformed coordinates) falls
    /// back to the unsnapped input.
    fn snap(&self, point: GeoPoint) -> GeoPoint {
        let url = format!(
            "{}/nearest/v1/{}/{:.6},{:.6}?number=1",
            self.config.base_url,
            self.config.profile,
            point.lon(),
            point.lat(),
        );

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmNearestResponse>());

        match response {
            Ok(body) if body.code == "Ok" => body
                .waypoints
                .first()
                .and_then(|wp| GeoPoint::new(wp.location[1], wp.location[0]).ok())
                .unwrap_or(point),
            Ok(body) => {
                warn!(code = %body.code, %point, "snap rejected, using raw point");
                point
            }
            Err(err) => {
                warn!(error = %err, %point, "snap request failed, using raw point");
                point
            }
        }
    }
}

fn decode_line_string(geometry: GeoJsonLineString) -> Result<RoutePolyline, ProviderError> {
    geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| {
            GeoPoint::new(lat, lon)
                .map_err(|err| ProviderError::Unavailable(format!("bad route geometry: {}", err)))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: GeoJsonLineString,
}

/// GeoJSON coordinates come as `[lon, lat]` pairs.
#[derive(Debug, Deserialize)]
struct GeoJsonLineString {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmNearestResponse {
    code: String,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    /// `[lon, lat]` of the snapped road position.
    location: [f64; 2],
}
