//! Route request / reroute flow.
//!
//! [`RouteFlow`] is a sans-IO state machine: it emits [`RouteQuery`]
//! values describing what to ask the routing provider and consumes the
//! candidate sets that come back. Each query carries a monotonically
//! increasing sequence number; a response tagged with anything other than
//! the awaited sequence is discarded, so a superseded request can never
//! overwrite a newer evaluation.
//!
//! [`SafeRouter`] wraps the machine around concrete providers for callers
//! that just want blocking calls.

use std::fmt;

use tracing::{debug, warn};

use crate::geo::GeoPoint;
use crate::polyline::RoutePolyline;
use crate::safety::{classify, select_safe, SafetyVerdict, Selection};
use crate::traits::{ProviderError, RoutingProvider, SnappingProvider};
use crate::zones::ZoneSet;

/// A request the caller should forward to the routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    pub seq: u64,
    pub waypoints: Vec<GeoPoint>,
    pub want_alternatives: bool,
}

/// Which endpoint of a route request failed a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

#[derive(Debug)]
pub enum FlowError {
    /// A route endpoint lies inside a restricted zone; the provider is
    /// never queried for such a request.
    EndpointInZone { endpoint: Endpoint, zone_id: String },
    /// The provider returned no candidates for the request.
    NoRoute,
    /// The provider returned a candidate with no points.
    EmptyRoute,
    /// The requested action is not legal in the current state.
    InvalidTransition { action: &'static str },
    Provider(ProviderError),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::EndpointInZone { endpoint, zone_id } => {
                write!(f, "{} point lies inside restricted zone {:?}", endpoint, zone_id)
            }
            FlowError::NoRoute => write!(f, "provider returned no route"),
            FlowError::EmptyRoute => write!(f, "provider returned a route with no points"),
            FlowError::InvalidTransition { action } => {
                write!(f, "action {:?} not valid in current flow state", action)
            }
            FlowError::Provider(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FlowError {}

impl From<ProviderError> for FlowError {
    fn from(err: ProviderError) -> Self {
        FlowError::Provider(err)
    }
}

/// Flow position. `AcceptedSafe`, `AcceptedUnsafe` (accepting a flagged
/// route is allowed) and `NoSafeAlternative` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Idle,
    RouteRequested {
        seq: u64,
    },
    RouteEvaluated {
        route: RoutePolyline,
        verdict: SafetyVerdict,
    },
    RerouteRequested {
        seq: u64,
    },
    RerouteEvaluated {
        rank: usize,
        route: RoutePolyline,
    },
    AcceptedSafe {
        route: RoutePolyline,
    },
    AcceptedUnsafe {
        route: RoutePolyline,
    },
    NoSafeAlternative,
}

/// What became of a delivered candidate set.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    /// The response carried a stale sequence number and was ignored.
    Discarded,
    Evaluated(SafetyVerdict),
    Rerouted(Selection),
}

#[derive(Debug, Clone)]
pub struct RouteFlow {
    state: FlowState,
    next_seq: u64,
    endpoints: Option<(GeoPoint, GeoPoint)>,
}

impl Default for RouteFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
            next_seq: 0,
            endpoints: None,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Starts a route request, superseding any request in flight.
    ///
    /// Fails without emitting a query when either endpoint already lies
    /// inside a restricted zone.
    pub fn submit(
        &mut self,
        start: GeoPoint,
        end: GeoPoint,
        zones: &ZoneSet,
    ) -> Result<RouteQuery, FlowError> {
        for (endpoint, point) in [(Endpoint::Start, start), (Endpoint::End, end)] {
            if let Some(zone) = zones.first_containing(point) {
                return Err(FlowError::EndpointInZone {
                    endpoint,
                    zone_id: zone.id().to_string(),
                });
            }
        }

        let seq = self.bump_seq();
        self.endpoints = Some((start, end));
        self.state = FlowState::RouteRequested { seq };
        debug!(seq, %start, %end, "route requested");

        Ok(RouteQuery {
            seq,
            waypoints: vec![start, end],
            want_alternatives: false,
        })
    }

    /// Asks for provider alternatives after an unsafe evaluation.
    pub fn request_reroute(&mut self) -> Result<RouteQuery, FlowError> {
        match &self.state {
            FlowState::RouteEvaluated {
                verdict: SafetyVerdict::Unsafe { .. },
                ..
            } => {}
            _ => {
                return Err(FlowError::InvalidTransition {
                    action: "request_reroute",
                });
            }
        }

        let (start, end) = self.endpoints.ok_or(FlowError::InvalidTransition {
            action: "request_reroute",
        })?;
        let seq = self.bump_seq();
        self.state = FlowState::RerouteRequested { seq };
        debug!(seq, "reroute requested");

        Ok(RouteQuery {
            seq,
            waypoints: vec![start, end],
            want_alternatives: true,
        })
    }

    /// Delivers the provider's candidate set for a previously emitted query.
    ///
    /// Responses whose sequence number does not match the awaited request
    /// are discarded; the flow holds no identity across requests beyond
    /// the sequence counter.
    pub fn on_candidates(
        &mut self,
        seq: u64,
        candidates: Vec<RoutePolyline>,
        zones: &ZoneSet,
    ) -> Result<ResponseOutcome, FlowError> {
        match &self.state {
            FlowState::RouteRequested { seq: awaited } if *awaited == seq => {
                // Without the alternatives flag the provider returns its
                // single preferred route; extras are ignored.
                let route = match candidates.into_iter().next() {
                    Some(route) => route,
                    None => {
                        self.state = FlowState::Idle;
                        return Err(FlowError::NoRoute);
                    }
                };
                let verdict = classify(&route, zones).map_err(|_| {
                    self.state = FlowState::Idle;
                    FlowError::EmptyRoute
                })?;
                debug!(
                    seq,
                    safe = verdict.is_safe(),
                    length_m = route.length_m(),
                    "route evaluated"
                );
                self.state = FlowState::RouteEvaluated {
                    route,
                    verdict: verdict.clone(),
                };
                Ok(ResponseOutcome::Evaluated(verdict))
            }
            FlowState::RerouteRequested { seq: awaited } if *awaited == seq => {
                if candidates.is_empty() {
                    self.state = FlowState::Idle;
                    return Err(FlowError::NoRoute);
                }
                let selection = select_safe(&candidates, zones);
                match &selection {
                    Selection::Safe { rank, route } => {
                        debug!(seq, rank, length_m = route.length_m(), "safe alternative found");
                        self.state = FlowState::RerouteEvaluated {
                            rank: *rank,
                            route: route.clone(),
                        };
                    }
                    Selection::NoSafeAlternative => {
                        debug!(seq, "no safe alternative among candidates");
                        self.state = FlowState::NoSafeAlternative;
                    }
                }
                Ok(ResponseOutcome::Rerouted(selection))
            }
            _ => {
                warn!(seq, "discarding response for superseded request");
                Ok(ResponseOutcome::Discarded)
            }
        }
    }

    /// Accepts the currently evaluated route, safe or not.
    ///
    /// Accepting an unsafe route is an explicitly allowed terminal state:
    /// the classification is advisory, not a veto.
    pub fn accept_route(&mut self) -> Result<RoutePolyline, FlowError> {
        match std::mem::replace(&mut self.state, FlowState::Idle) {
            FlowState::RouteEvaluated { route, verdict } => {
                self.state = match verdict {
                    SafetyVerdict::Safe => FlowState::AcceptedSafe {
                        route: route.clone(),
                    },
                    SafetyVerdict::Unsafe { .. } => FlowState::AcceptedUnsafe {
                        route: route.clone(),
                    },
                };
                Ok(route)
            }
            FlowState::RerouteEvaluated { route, .. } => {
                self.state = FlowState::AcceptedSafe {
                    route: route.clone(),
                };
                Ok(route)
            }
            other => {
                self.state = other;
                Err(FlowError::InvalidTransition {
                    action: "accept_route",
                })
            }
        }
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Blocking driver: runs a [`RouteFlow`] against concrete providers.
///
/// Endpoints are snapped to the road network before the precondition
/// check, so a click just off a road still routes; snapping failures fall
/// back to the raw point inside the snapper itself.
#[derive(Debug)]
pub struct SafeRouter<P, S> {
    provider: P,
    snapper: S,
    flow: RouteFlow,
}

/// A classified route as returned by [`SafeRouter::find_route`].
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub route: RoutePolyline,
    pub verdict: SafetyVerdict,
    /// Total great-circle length of the route in meters.
    pub length_m: f64,
}

impl<P, S> SafeRouter<P, S>
where
    P: RoutingProvider,
    S: SnappingProvider,
{
    pub fn new(provider: P, snapper: S) -> Self {
        Self {
            provider,
            snapper,
            flow: RouteFlow::new(),
        }
    }

    pub fn flow(&self) -> &RouteFlow {
        &self.flow
    }

    /// Fetches and classifies the provider's preferred route.
    pub fn find_route(
        &mut self,
        start: GeoPoint,
        end: GeoPoint,
        zones: &ZoneSet,
    ) -> Result<Evaluation, FlowError> {
        let start = self.snapper.snap(start);
        let end = self.snapper.snap(end);

        let query = self.flow.submit(start, end, zones)?;
        let candidates = self
            .provider
            .routes(&query.waypoints, query.want_alternatives)?;

        self.flow.on_candidates(query.seq, candidates, zones)?;
        match self.flow.state() {
            FlowState::RouteEvaluated { route, verdict } => Ok(Evaluation {
                length_m: route.length_m(),
                route: route.clone(),
                verdict: verdict.clone(),
            }),
            _ => Err(FlowError::InvalidTransition { action: "find_route" }),
        }
    }

    /// After an unsafe verdict, queries alternatives and picks the first
    /// safe one. Both arms of the returned [`Selection`] are expected
    /// outcomes for the caller to handle.
    pub fn find_alternative(&mut self, zones: &ZoneSet) -> Result<Selection, FlowError> {
        let query = self.flow.request_reroute()?;
        let candidates = self
            .provider
            .routes(&query.waypoints, query.want_alternatives)?;

        match self.flow.on_candidates(query.seq, candidates, zones)? {
            ResponseOutcome::Rerouted(selection) => Ok(selection),
            _ => Err(FlowError::InvalidTransition {
                action: "find_alternative",
            }),
        }
    }

    pub fn accept_route(&mut self) -> Result<RoutePolyline, FlowError> {
        self.flow.accept_route()
    }
}
