//! route-guard: geofenced route safety evaluation.
//!
//! Classifies driving routes against circular restricted zones, selects a
//! safe alternative among provider-ranked candidates, and simulates a
//! vehicle along the chosen route while watching for zone dwell. Path
//! finding itself is delegated to an external OSRM instance; this crate
//! only evaluates what the provider returns.

pub mod alerts;
pub mod config;
pub mod flow;
pub mod geo;
pub mod osrm;
pub mod polyline;
pub mod safety;
pub mod sim;
pub mod traits;
pub mod zones;
