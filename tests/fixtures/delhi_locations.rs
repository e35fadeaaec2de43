//! Real central Delhi coordinates (from OpenStreetMap).

use route_guard::geo::GeoPoint;
use route_guard::polyline::RoutePolyline;
use route_guard::zones::{RestrictedZone, ZoneSet};

pub fn point(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon).unwrap()
}

/// Connaught Place, the zone center used across the suite.
pub fn connaught_place() -> GeoPoint {
    point(28.6139, 77.2090)
}

pub fn india_gate() -> GeoPoint {
    point(28.6129, 77.2295)
}

pub fn karol_bagh() -> GeoPoint {
    point(28.6519, 77.1909)
}

pub fn noida() -> GeoPoint {
    point(28.5355, 77.3910)
}

/// Single zone over Connaught Place.
pub fn cp_zone(radius_m: f64) -> ZoneSet {
    ZoneSet::new(vec![
        RestrictedZone::new("delhi-cp", connaught_place(), radius_m).unwrap(),
    ])
}

/// A route that cuts straight through Connaught Place.
pub fn route_through_cp() -> RoutePolyline {
    RoutePolyline::new(vec![
        karol_bagh(),
        point(28.6330, 77.2000),
        connaught_place(),
        point(28.6000, 77.2400),
        noida(),
    ])
}

/// A route skirting well east of Connaught Place.
pub fn route_avoiding_cp() -> RoutePolyline {
    RoutePolyline::new(vec![
        karol_bagh(),
        point(28.6700, 77.2300),
        point(28.6400, 77.2900),
        point(28.5800, 77.3200),
        noida(),
    ])
}
