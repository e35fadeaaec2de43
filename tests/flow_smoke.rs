//! Flow state machine scenarios driven with scripted providers.

mod fixtures;

use fixtures::delhi_locations::*;
use fixtures::{NoSnap, OffsetSnap, ScriptedProvider};

use route_guard::flow::{
    Endpoint, FlowError, FlowState, ResponseOutcome, RouteFlow, SafeRouter,
};
use route_guard::polyline::RoutePolyline;
use route_guard::safety::{SafetyVerdict, Selection};
use route_guard::zones::ZoneSet;

#[test]
fn safe_route_accepted_end_to_end() {
    let provider = ScriptedProvider::new(vec![Ok(vec![route_avoiding_cp()])]);
    let mut router = SafeRouter::new(provider, NoSnap);
    let zones = cp_zone(700.0);

    let evaluation = router.find_route(karol_bagh(), noida(), &zones).unwrap();
    assert_eq!(evaluation.verdict, SafetyVerdict::Safe);
    assert_eq!(evaluation.length_m, route_avoiding_cp().length_m());
    assert!(evaluation.length_m > 0.0);

    let accepted = router.accept_route().unwrap();
    assert_eq!(accepted, route_avoiding_cp());
    assert!(matches!(router.flow().state(), FlowState::AcceptedSafe { .. }));
}

#[test]
fn unsafe_route_then_safe_alternative() {
    let provider = ScriptedProvider::new(vec![
        Ok(vec![route_through_cp()]),
        Ok(vec![route_through_cp(), route_avoiding_cp()]),
    ]);
    let mut router = SafeRouter::new(provider, NoSnap);
    let zones = cp_zone(700.0);

    let evaluation = router.find_route(karol_bagh(), noida(), &zones).unwrap();
    assert!(!evaluation.verdict.is_safe());

    match router.find_alternative(&zones).unwrap() {
        Selection::Safe { rank, route } => {
            assert_eq!(rank, 1);
            assert_eq!(route, route_avoiding_cp());
        }
        Selection::NoSafeAlternative => panic!("second candidate is safe"),
    }

    router.accept_route().unwrap();
    assert!(matches!(router.flow().state(), FlowState::AcceptedSafe { .. }));
}

#[test]
fn reroute_requests_alternatives_from_provider() {
    let provider = ScriptedProvider::new(vec![
        Ok(vec![route_through_cp()]),
        Ok(vec![route_avoiding_cp()]),
    ]);
    let mut router = SafeRouter::new(&provider, NoSnap);
    let zones = cp_zone(700.0);

    router.find_route(karol_bagh(), noida(), &zones).unwrap();
    router.find_alternative(&zones).unwrap();

    // First request runs without alternatives; the reroute asks for them.
    assert_eq!(*provider.flags_seen.borrow(), vec![false, true]);
}

#[test]
fn all_alternatives_unsafe_is_a_reported_terminal_state() {
    let provider = ScriptedProvider::new(vec![
        Ok(vec![route_through_cp()]),
        Ok(vec![route_through_cp(), route_through_cp()]),
    ]);
    let mut router = SafeRouter::new(provider, NoSnap);
    let zones = cp_zone(700.0);

    router.find_route(karol_bagh(), noida(), &zones).unwrap();
    assert_eq!(
        router.find_alternative(&zones).unwrap(),
        Selection::NoSafeAlternative
    );
    assert_eq!(router.flow().state(), &FlowState::NoSafeAlternative);

    // Terminal: accepting is no longer possible.
    assert!(matches!(
        router.accept_route(),
        Err(FlowError::InvalidTransition { .. })
    ));
}

#[test]
fn accepting_an_unsafe_route_is_allowed() {
    let provider = ScriptedProvider::new(vec![Ok(vec![route_through_cp()])]);
    let mut router = SafeRouter::new(provider, NoSnap);
    let zones = cp_zone(700.0);

    let evaluation = router.find_route(karol_bagh(), noida(), &zones).unwrap();
    assert!(!evaluation.verdict.is_safe());

    let accepted = router.accept_route().unwrap();
    assert_eq!(accepted, route_through_cp());
    assert!(matches!(
        router.flow().state(),
        FlowState::AcceptedUnsafe { .. }
    ));
}

#[test]
fn endpoint_inside_zone_is_rejected_before_querying() {
    let provider = ScriptedProvider::new(vec![]);
    let mut router = SafeRouter::new(provider, NoSnap);
    let zones = cp_zone(5_000.0);

    // Connaught Place is the zone center; the provider script is empty,
    // so any provider call would fail the test with "script exhausted".
    let result = router.find_route(connaught_place(), noida(), &zones);
    match result {
        Err(FlowError::EndpointInZone { endpoint, zone_id }) => {
            assert_eq!(endpoint, Endpoint::Start);
            assert_eq!(zone_id, "delhi-cp");
        }
        other => panic!("expected endpoint precondition failure, got {:?}", other),
    }
}

#[test]
fn end_point_inside_zone_is_also_rejected() {
    let provider = ScriptedProvider::new(vec![]);
    let mut router = SafeRouter::new(provider, NoSnap);
    let zones = cp_zone(5_000.0);

    match router.find_route(noida(), connaught_place(), &zones) {
        Err(FlowError::EndpointInZone { endpoint, .. }) => {
            assert_eq!(endpoint, Endpoint::End);
        }
        other => panic!("expected endpoint precondition failure, got {:?}", other),
    }
}

#[test]
fn provider_returning_no_candidates_reports_no_route() {
    let provider = ScriptedProvider::new(vec![Ok(vec![])]);
    let mut router = SafeRouter::new(provider, NoSnap);
    let zones = cp_zone(700.0);

    assert!(matches!(
        router.find_route(karol_bagh(), noida(), &zones),
        Err(FlowError::NoRoute)
    ));
    // The failure is fatal to that request only; the flow is reusable.
    assert_eq!(router.flow().state(), &FlowState::Idle);
}

#[test]
fn provider_failure_surfaces_as_recoverable_error() {
    use route_guard::traits::ProviderError;

    let provider = ScriptedProvider::new(vec![Err(ProviderError::Unavailable(
        "connection refused".to_string(),
    ))]);
    let mut router = SafeRouter::new(provider, NoSnap);
    let zones = cp_zone(700.0);

    assert!(matches!(
        router.find_route(karol_bagh(), noida(), &zones),
        Err(FlowError::Provider(_))
    ));
}

#[test]
fn provider_candidate_with_no_points_is_rejected() {
    let provider = ScriptedProvider::new(vec![Ok(vec![RoutePolyline::new(vec![])])]);
    let mut router = SafeRouter::new(provider, NoSnap);
    let zones = cp_zone(700.0);

    assert!(matches!(
        router.find_route(karol_bagh(), noida(), &zones),
        Err(FlowError::EmptyRoute)
    ));
}

#[test]
fn snapped_endpoints_are_what_gets_queried() {
    // The snapper pulls endpoints slightly north; the precondition must
    // run against the snapped positions.
    let provider = ScriptedProvider::new(vec![Ok(vec![route_avoiding_cp()])]);
    let mut router = SafeRouter::new(provider, OffsetSnap { lat_offset: 0.05 });
    // Zone sits exactly where the raw start point is; snapping moves the
    // endpoint ~5.5 km north, clear of the 700 m radius.
    let zones = cp_zone(700.0);

    let evaluation = router.find_route(connaught_place(), noida(), &zones).unwrap();
    assert_eq!(evaluation.verdict, SafetyVerdict::Safe);
}

#[test]
fn stale_responses_are_discarded() {
    let zones = cp_zone(700.0);
    let mut flow = RouteFlow::new();

    let first = flow.submit(karol_bagh(), noida(), &zones).unwrap();
    // A second submission supersedes the first before its response lands.
    let second = flow.submit(karol_bagh(), india_gate(), &zones).unwrap();
    assert!(second.seq > first.seq);

    let late = flow
        .on_candidates(first.seq, vec![route_through_cp()], &zones)
        .unwrap();
    assert_eq!(late, ResponseOutcome::Discarded);
    assert_eq!(flow.state(), &FlowState::RouteRequested { seq: second.seq });

    let current = flow
        .on_candidates(second.seq, vec![route_avoiding_cp()], &zones)
        .unwrap();
    assert_eq!(current, ResponseOutcome::Evaluated(SafetyVerdict::Safe));
}

#[test]
fn response_after_evaluation_is_discarded() {
    let zones = cp_zone(700.0);
    let mut flow = RouteFlow::new();

    let query = flow.submit(karol_bagh(), noida(), &zones).unwrap();
    flow.on_candidates(query.seq, vec![route_avoiding_cp()], &zones)
        .unwrap();

    // Duplicate delivery of the same sequence: flow is no longer waiting.
    let duplicate = flow
        .on_candidates(query.seq, vec![route_through_cp()], &zones)
        .unwrap();
    assert_eq!(duplicate, ResponseOutcome::Discarded);
}

#[test]
fn reroute_is_only_legal_after_an_unsafe_evaluation() {
    let zones = cp_zone(700.0);
    let mut flow = RouteFlow::new();

    assert!(matches!(
        flow.request_reroute(),
        Err(FlowError::InvalidTransition { .. })
    ));

    let query = flow.submit(karol_bagh(), noida(), &zones).unwrap();
    flow.on_candidates(query.seq, vec![route_avoiding_cp()], &zones)
        .unwrap();

    // Safe evaluation: nothing to reroute around.
    assert!(matches!(
        flow.request_reroute(),
        Err(FlowError::InvalidTransition { .. })
    ));
}

#[test]
fn reroute_query_carries_alternatives_flag_and_original_endpoints() {
    let zones = cp_zone(700.0);
    let mut flow = RouteFlow::new();

    let query = flow.submit(karol_bagh(), noida(), &zones).unwrap();
    assert!(!query.want_alternatives);
    assert_eq!(query.waypoints, vec![karol_bagh(), noida()]);

    flow.on_candidates(query.seq, vec![route_through_cp()], &zones)
        .unwrap();

    let reroute = flow.request_reroute().unwrap();
    assert!(reroute.want_alternatives);
    assert_eq!(reroute.waypoints, vec![karol_bagh(), noida()]);
    assert!(reroute.seq > query.seq);
}

#[test]
fn empty_zone_set_classifies_everything_safe() {
    let provider = ScriptedProvider::new(vec![Ok(vec![route_through_cp()])]);
    let mut router = SafeRouter::new(provider, NoSnap);

    let evaluation = router
        .find_route(karol_bagh(), noida(), &ZoneSet::default())
        .unwrap();
    assert_eq!(evaluation.verdict, SafetyVerdict::Safe);
}
