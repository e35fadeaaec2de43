//! Seams for the external collaborators.
//!
//! These are intentionally minimal. The evaluation core never talks to a
//! network or a database directly; it consumes routes, snapped points and
//! alert persistence through these traits so tests (and any non-OSRM
//! deployment) can substitute their own implementations.

use std::fmt;

use crate::alerts::DwellAlert;
use crate::geo::GeoPoint;
use crate::polyline::RoutePolyline;

/// A collaborator failure, recoverable by the caller.
///
/// Route-fetch failure is fatal to the request that triggered it, never to
/// the process; no retries happen below this boundary.
#[derive(Debug)]
pub enum ProviderError {
    /// The provider could not be reached, timed out, or returned a
    /// malformed payload.
    Unavailable(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unavailable(reason) => {
                write!(f, "routing provider unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Unavailable(err.to_string())
    }
}

/// Produces candidate route polylines between waypoints.
///
/// Candidates come back in the provider's own ranking (typically
/// fastest-first). An empty vec means "no route", which callers report
/// rather than treat as a crash.
pub trait RoutingProvider {
    fn routes(
        &self,
        waypoints: &[GeoPoint],
        want_alternatives: bool,
    ) -> Result<Vec<RoutePolyline>, ProviderError>;
}

/// Maps an arbitrary coordinate to the nearest routable road position.
///
/// Snapping is best-effort: implementations return the input point
/// unmodified when the service fails, so a snapping outage degrades
/// accuracy, never availability.
pub trait SnappingProvider {
    fn snap(&self, point: GeoPoint) -> GeoPoint;
}

/// Failure writing to the alert store.
#[derive(Debug)]
pub enum AlertStoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for AlertStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertStoreError::Io(err) => write!(f, "alert store io error: {}", err),
            AlertStoreError::Serialize(err) => write!(f, "alert serialization error: {}", err),
        }
    }
}

impl std::error::Error for AlertStoreError {}

impl From<std::io::Error> for AlertStoreError {
    fn from(err: std::io::Error) -> Self {
        AlertStoreError::Io(err)
    }
}

impl From<serde_json::Error> for AlertStoreError {
    fn from(err: serde_json::Error) -> Self {
        AlertStoreError::Serialize(err)
    }
}

/// Persists dwell alerts raised by the zone watch.
pub trait AlertSink {
    fn record(&mut self, alert: &DwellAlert) -> Result<(), AlertStoreError>;
}
