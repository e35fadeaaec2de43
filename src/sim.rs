//! Vehicle movement simulation and zone dwell watching.
//!
//! The presentation layer animates a marker along the computed route and
//! raises an alert when it lingers inside a red zone. Here that behavior
//! is a single cooperative tick: [`RouteTracker`] advances a position
//! along the polyline, [`ZoneWatch`] recomputes containment on every tick
//! and surfaces explicit entered/exited edges plus dwell alerts. Callers
//! own the clock; nothing here spawns timers or threads.

use std::fmt;

use tracing::{debug, info};

use crate::alerts::DwellAlert;
use crate::geo::{haversine_m, GeoPoint};
use crate::polyline::RoutePolyline;
use crate::traits::{AlertSink, AlertStoreError};
use crate::zones::ZoneSet;

/// Rejected simulation input or a failed alert write.
#[derive(Debug)]
pub enum SimError {
    /// The route has no points to walk.
    EmptyRoute,
    /// Speed must be finite and positive, or the vehicle never reaches
    /// the route end and a timed run would never terminate.
    NonPositiveSpeed(f64),
    /// Tick intervals must be finite and positive for the same reason.
    NonPositiveTick(f64),
    AlertStore(AlertStoreError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::EmptyRoute => write!(f, "cannot simulate an empty route polyline"),
            SimError::NonPositiveSpeed(speed) => {
                write!(f, "vehicle speed must be positive, got {}", speed)
            }
            SimError::NonPositiveTick(dt) => {
                write!(f, "tick interval must be positive, got {}", dt)
            }
            SimError::AlertStore(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SimError {}

impl From<AlertStoreError> for SimError {
    fn from(err: AlertStoreError) -> Self {
        SimError::AlertStore(err)
    }
}

/// Walks a polyline at constant speed, interpolating along segments.
#[derive(Debug, Clone)]
pub struct RouteTracker {
    points: Vec<GeoPoint>,
    /// Segment currently being traversed (index of its first point).
    segment: usize,
    /// Meters already covered within the current segment.
    segment_covered_m: f64,
    speed_mps: f64,
    elapsed_secs: f64,
}

impl RouteTracker {
    pub fn new(route: &RoutePolyline, speed_mps: f64) -> Result<Self, SimError> {
        if route.is_empty() {
            return Err(SimError::EmptyRoute);
        }
        if !speed_mps.is_finite() || speed_mps <= 0.0 {
            return Err(SimError::NonPositiveSpeed(speed_mps));
        }
        Ok(Self {
            points: route.points().to_vec(),
            segment: 0,
            segment_covered_m: 0.0,
            speed_mps,
            elapsed_secs: 0.0,
        })
    }

    /// Current interpolated position along the route.
    pub fn position(&self) -> GeoPoint {
        if self.segment + 1 >= self.points.len() {
            return self.points[self.points.len() - 1];
        }
        let from = self.points[self.segment];
        let to = self.points[self.segment + 1];
        let segment_m = haversine_m(from, to);
        if segment_m == 0.0 {
            return from;
        }
        from.lerp(to, self.segment_covered_m / segment_m)
    }

    /// True once the final point has been reached.
    pub fn is_finished(&self) -> bool {
        self.segment + 1 >= self.points.len()
    }

    /// Seconds of simulated travel so far.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// Advances by `speed * dt` meters and returns the new position.
    ///
    /// Remaining distance carries across vertices within one tick, so a
    /// fast vehicle can cross several short segments per tick.
    pub fn tick(&mut self, dt_secs: f64) -> GeoPoint {
        self.elapsed_secs += dt_secs;
        let mut remaining_m = self.speed_mps * dt_secs;

        while remaining_m > 0.0 && !self.is_finished() {
            let from = self.points[self.segment];
            let to = self.points[self.segment + 1];
            let segment_m = haversine_m(from, to);
            let left_m = segment_m - self.segment_covered_m;

            if remaining_m < left_m {
                self.segment_covered_m += remaining_m;
                break;
            }

            remaining_m -= left_m;
            self.segment += 1;
            self.segment_covered_m = 0.0;
        }

        self.position()
    }
}

/// A zone boundary crossing or dwell threshold breach.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneEvent {
    Entered {
        zone_id: String,
    },
    Exited {
        zone_id: String,
        /// Time spent inside during the stay that just ended.
        dwell_secs: f64,
    },
    Dwell(DwellAlert),
}

/// Per-zone dwell outcome, kept for the post-run report.
#[derive(Debug, Clone, PartialEq)]
pub struct DwellRecord {
    pub zone_id: String,
    /// Longest single stay observed, in seconds.
    pub max_dwell_secs: f64,
    /// Whether any stay crossed the alert threshold.
    pub alerted: bool,
}

#[derive(Debug, Clone)]
struct ZoneState {
    inside: bool,
    dwell_secs: f64,
    max_dwell_secs: f64,
    alerted_this_stay: bool,
    ever_alerted: bool,
}

impl ZoneState {
    fn fresh() -> Self {
        Self {
            inside: false,
            dwell_secs: 0.0,
            max_dwell_secs: 0.0,
            alerted_this_stay: false,
            ever_alerted: false,
        }
    }
}

/// Watches a position stream for zone entry, exit and dwell.
///
/// Containment is recomputed on every observation rather than only on
/// transitions, preserving the original polling behavior; the edge events
/// are derived on top of that. The dwell clock starts at zero on entry,
/// accumulates observation deltas while inside, and resets on exit. One
/// alert fires per stay, at the observation where the threshold is
/// crossed.
#[derive(Debug, Clone)]
pub struct ZoneWatch {
    zones: ZoneSet,
    threshold_secs: f64,
    states: Vec<ZoneState>,
}

impl ZoneWatch {
    pub fn new(zones: ZoneSet, threshold_secs: f64) -> Self {
        let states = vec![ZoneState::fresh(); zones.len()];
        Self {
            zones,
            threshold_secs,
            states,
        }
    }

    /// Feeds one position sample, `dt_secs` after the previous one.
    pub fn observe(&mut self, position: GeoPoint, dt_secs: f64, elapsed_secs: f64) -> Vec<ZoneEvent> {
        let mut events = Vec::new();

        for (zone, state) in self.zones.zones().iter().zip(self.states.iter_mut()) {
            let inside = zone.contains(position);

            match (state.inside, inside) {
                (false, true) => {
                    debug!(zone_id = zone.id(), "vehicle entered zone");
                    state.inside = true;
                    state.dwell_secs = 0.0;
                    state.alerted_this_stay = false;
                    events.push(ZoneEvent::Entered {
                        zone_id: zone.id().to_string(),
                    });
                }
                (true, true) => {
                    state.dwell_secs += dt_secs;
                    state.max_dwell_secs = state.max_dwell_secs.max(state.dwell_secs);
                    if state.dwell_secs >= self.threshold_secs && !state.alerted_this_stay {
                        state.alerted_this_stay = true;
                        state.ever_alerted = true;
                        info!(
                            zone_id = zone.id(),
                            dwell_secs = state.dwell_secs,
                            "dwell threshold crossed"
                        );
                        events.push(ZoneEvent::Dwell(DwellAlert {
                            zone_id: zone.id().to_string(),
                            dwell_secs: state.dwell_secs,
                            threshold_secs: self.threshold_secs,
                            position,
                            elapsed_secs,
                        }));
                    }
                }
                (true, false) => {
                    debug!(
                        zone_id = zone.id(),
                        dwell_secs = state.dwell_secs,
                        "vehicle exited zone"
                    );
                    state.inside = false;
                    events.push(ZoneEvent::Exited {
                        zone_id: zone.id().to_string(),
                        dwell_secs: state.dwell_secs,
                    });
                    state.dwell_secs = 0.0;
                }
                (false, false) => {}
            }
        }

        events
    }

    /// Max-dwell summary per zone, in zone-set order.
    pub fn report(&self) -> Vec<DwellRecord> {
        self.zones
            .zones()
            .iter()
            .zip(self.states.iter())
            .map(|(zone, state)| DwellRecord {
                zone_id: zone.id().to_string(),
                max_dwell_secs: state.max_dwell_secs,
                alerted: state.ever_alerted,
            })
            .collect()
    }
}

/// Couples a tracker and a watch, pushing dwell alerts to a sink.
#[derive(Debug)]
pub struct VehicleSimulation {
    tracker: RouteTracker,
    watch: ZoneWatch,
}

impl VehicleSimulation {
    pub fn new(
        route: &RoutePolyline,
        zones: ZoneSet,
        speed_mps: f64,
        dwell_threshold_secs: f64,
    ) -> Result<Self, SimError> {
        Ok(Self {
            tracker: RouteTracker::new(route, speed_mps)?,
            watch: ZoneWatch::new(zones, dwell_threshold_secs),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.tracker.is_finished()
    }

    pub fn position(&self) -> GeoPoint {
        self.tracker.position()
    }

    /// One cooperative tick: move, observe, persist any dwell alerts.
    pub fn tick(
        &mut self,
        dt_secs: f64,
        sink: &mut dyn AlertSink,
    ) -> Result<Vec<ZoneEvent>, SimError> {
        if !dt_secs.is_finite() || dt_secs <= 0.0 {
            return Err(SimError::NonPositiveTick(dt_secs));
        }
        let position = self.tracker.tick(dt_secs);
        let events = self
            .watch
            .observe(position, dt_secs, self.tracker.elapsed_secs());

        for event in &events {
            if let ZoneEvent::Dwell(alert) = event {
                sink.record(alert)?;
            }
        }

        Ok(events)
    }

    /// Ticks until the route end, returning the dwell report.
    ///
    /// Speed and tick interval are both validated positive, so progress
    /// per tick is strictly positive and the loop terminates.
    pub fn run(
        &mut self,
        dt_secs: f64,
        sink: &mut dyn AlertSink,
    ) -> Result<Vec<DwellRecord>, SimError> {
        while !self.is_finished() {
            self.tick(dt_secs, sink)?;
        }
        Ok(self.watch.report())
    }

    pub fn report(&self) -> Vec<DwellRecord> {
        self.watch.report()
    }
}
