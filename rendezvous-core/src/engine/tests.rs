//! Unit tests for the engine's caching and degradation rules.

use super::*;
use crate::test_support::{HaversineRoutingProvider, venue};
use crate::{Candidate, TravelMetric};
use rstest::{fixture, rstest};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
        .block_on(future)
}

#[fixture]
fn taipei() -> Vec<Participant> {
    vec![
        Participant::new("a", 25.03, 121.56, TravelMode::Driving).expect("valid"),
        Participant::new("b", 25.04, 121.55, TravelMode::Driving).expect("valid"),
        Participant::new("c", 25.02, 121.57, TravelMode::Driving).expect("valid"),
    ]
}

#[fixture]
fn venues() -> Vec<Candidate> {
    vec![
        venue("centre", "Centre Cafe", 25.03, 121.56),
        venue("north", "North Cafe", 25.038, 121.552),
        venue("south", "South Cafe", 25.022, 121.568),
    ]
}

fn engine(provider: HaversineRoutingProvider) -> MeetingPointEngine<HaversineRoutingProvider> {
    let config = EngineConfig::default().with_search_radius(5_000);
    MeetingPointEngine::new(provider, Arc::new(ResultCache::new()), config)
}

#[rstest]
fn best_venue_is_no_worse_than_the_centroid(taipei: Vec<Participant>, venues: Vec<Candidate>) {
    let engine = engine(HaversineRoutingProvider::default().with_venues(venues));
    let points: Vec<GeoPoint> = taipei.iter().filter_map(|p| p.location).collect();
    let centre = centroid(&points).expect("located");
    let at_centroid: Vec<_> = points
        .iter()
        .map(|&origin| HaversineRoutingProvider::estimate(origin, centre, TravelMode::Driving))
        .collect();
    let centroid_metric = TravelMetric::from_estimates(&at_centroid);

    let result = block_on(engine.compute_time_optimized_midpoint(
        &taipei,
        Objective::MinimizeMax,
        false,
    ))
    .expect("optimised");

    assert!(result.iterations <= 5);
    assert!(result.metric.max_seconds <= centroid_metric.max_seconds);
    assert_eq!(result.candidates_considered, 3);
    assert_eq!(result.participant_times.len(), 3);
    assert!(!result.cached);
    assert!(engine.provider().directions_calls() <= 5 * taipei.len());
    assert_eq!(engine.provider().places_calls(), 1);
}

#[rstest]
fn second_call_is_served_from_cache(taipei: Vec<Participant>, venues: Vec<Candidate>) {
    let engine = engine(HaversineRoutingProvider::default().with_venues(venues));

    let first = block_on(engine.compute_time_optimized_midpoint(
        &taipei,
        Objective::MinimizeTotal,
        false,
    ))
    .expect("optimised");
    let calls = engine.provider().total_calls();
    let second = block_on(engine.compute_time_optimized_midpoint(
        &taipei,
        Objective::MinimizeTotal,
        false,
    ))
    .expect("cached");

    assert!(second.cached);
    assert_eq!(engine.provider().total_calls(), calls);
    assert_eq!(
        TimeOptimizedMidpoint {
            cached: false,
            ..second
        },
        first
    );
}

#[rstest]
fn force_recalculate_skips_the_lookup_but_refreshes_the_entry(
    taipei: Vec<Participant>,
    venues: Vec<Candidate>,
) {
    let engine = engine(HaversineRoutingProvider::default().with_venues(venues));
    block_on(engine.compute_time_optimized_midpoint(&taipei, Objective::MinimizeMax, false))
        .expect("optimised");
    let calls = engine.provider().total_calls();

    let forced = block_on(engine.compute_time_optimized_midpoint(
        &taipei,
        Objective::MinimizeMax,
        true,
    ))
    .expect("recomputed");

    assert!(!forced.cached);
    assert!(engine.provider().total_calls() > calls);
    assert_eq!(engine.cache().len(), 1);
}

#[rstest]
fn objectives_are_cached_separately(taipei: Vec<Participant>, venues: Vec<Candidate>) {
    let engine = engine(HaversineRoutingProvider::default().with_venues(venues));
    block_on(engine.compute_time_optimized_midpoint(&taipei, Objective::MinimizeMax, false))
        .expect("optimised");

    let other = block_on(engine.compute_time_optimized_midpoint(
        &taipei,
        Objective::MinimizeTotal,
        false,
    ))
    .expect("optimised");

    assert!(!other.cached);
    assert_eq!(engine.cache().len(), 2);
}

#[rstest]
fn failures_are_not_cached(taipei: Vec<Participant>) {
    let engine = engine(HaversineRoutingProvider::default());

    let err = block_on(engine.compute_time_optimized_midpoint(
        &taipei,
        Objective::MinimizeMax,
        false,
    ))
    .expect_err("no venues");

    assert_eq!(err, EngineError::NoCandidates);
    assert!(engine.cache().is_empty());
}

#[rstest]
fn single_participant_is_rejected_without_calls() {
    let engine = engine(HaversineRoutingProvider::default());
    let participants = vec![
        Participant::new("a", 25.03, 121.56, TravelMode::Driving).expect("valid"),
        Participant::unlocated("b", TravelMode::Transit),
    ];

    let geometric = block_on(engine.compute_geometric_midpoint(&participants));
    let optimised = block_on(engine.compute_time_optimized_midpoint(
        &participants,
        Objective::MinimizeMax,
        false,
    ));

    let expected = EngineError::InsufficientLocations {
        found: 1,
        required: 2,
    };
    assert_eq!(geometric, Err(expected.clone()));
    assert_eq!(optimised, Err(expected));
    assert_eq!(engine.provider().total_calls(), 0);
}

#[rstest]
fn geometric_midpoint_caps_suggestions(taipei: Vec<Participant>, venues: Vec<Candidate>) {
    let provider = HaversineRoutingProvider::default().with_venues(venues);
    let config = EngineConfig {
        suggested_venue_limit: 2,
        ..EngineConfig::default()
    };
    let engine = MeetingPointEngine::new(provider, Arc::new(ResultCache::new()), config);

    let result = block_on(engine.compute_geometric_midpoint(&taipei)).expect("midpoint");

    assert_eq!(result.suggested_venues.len(), 2);
    assert!(result.address.is_some());
    assert_eq!(result.participant_travel_times.len(), 3);
    assert!(
        result
            .participant_travel_times
            .iter()
            .all(|time| time.duration_seconds.is_some())
    );
    assert_eq!(engine.cache().len(), 1);
}

#[rstest]
fn offline_geometric_midpoint_degrades_and_is_not_cached(taipei: Vec<Participant>) {
    let engine = engine(HaversineRoutingProvider::default().offline());

    let result = block_on(engine.compute_geometric_midpoint(&taipei)).expect("degraded midpoint");

    assert!(result.address.is_none());
    assert!(result.suggested_venues.is_empty());
    assert!(
        result
            .participant_travel_times
            .iter()
            .all(|time| time.duration_seconds.is_none())
    );
    assert!(!result.cached);
    assert!(engine.cache().is_empty());
}

#[rstest]
fn routes_list_unresolved_participants(taipei: Vec<Participant>) {
    let walker = Participant::new("d", 25.05, 121.54, TravelMode::Walking).expect("valid");
    let stranded = walker.location.expect("located");
    let mut participants = taipei;
    participants.push(walker);
    participants.push(Participant::unlocated("e", TravelMode::Driving));
    let engine = engine(
        HaversineRoutingProvider::default().with_unreachable(stranded, TravelMode::Walking),
    );
    let target = GeoPoint::new(25.033, 121.565).expect("valid");

    let result =
        block_on(engine.compute_routes_to_point(&participants, target)).expect("routes");

    let routed: Vec<&str> = result
        .routes
        .iter()
        .map(|route| route.participant_id.as_str())
        .collect();
    assert_eq!(routed, ["a", "b", "c"]);
    assert_eq!(result.unresolved_participants, ["d"]);
    assert_eq!(engine.provider().directions_calls(), 4);
    assert_eq!(engine.cache().len(), 1);
}

#[rstest]
fn transit_routes_report_the_fallback_mode() {
    let rider = Participant::new("r", 25.04, 121.55, TravelMode::Transit).expect("valid");
    let origin = rider.location.expect("located");
    let engine = engine(
        HaversineRoutingProvider::default().with_unreachable(origin, TravelMode::Transit),
    );
    let target = GeoPoint::new(25.03, 121.56).expect("valid");

    let result = block_on(engine.compute_routes_to_point(&[rider], target)).expect("routes");

    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.routes[0].travel_mode, TravelMode::Driving);
    assert!(!result.routes[0].polyline.is_empty());
}

#[rstest]
fn routes_without_located_participants_are_rejected() {
    let engine = engine(HaversineRoutingProvider::default());
    let target = GeoPoint::new(25.03, 121.56).expect("valid");

    let err = block_on(engine.compute_routes_to_point(
        &[Participant::unlocated("a", TravelMode::Walking)],
        target,
    ))
    .expect_err("nobody to route");

    assert_eq!(
        err,
        EngineError::InsufficientLocations {
            found: 0,
            required: 1,
        }
    );
    assert_eq!(engine.provider().total_calls(), 0);
}

#[rstest]
fn offline_routes_are_provider_unavailable(taipei: Vec<Participant>) {
    let engine = engine(HaversineRoutingProvider::default().offline());
    let target = GeoPoint::new(25.03, 121.56).expect("valid");

    let err = block_on(engine.compute_routes_to_point(&taipei, target)).expect_err("offline");

    assert!(matches!(err, EngineError::ProviderUnavailable { .. }));
    assert!(engine.cache().is_empty());
}

#[rstest]
fn engines_can_share_one_cache(taipei: Vec<Participant>, venues: Vec<Candidate>) {
    let cache = Arc::new(ResultCache::new());
    let config = EngineConfig::default();
    let first = MeetingPointEngine::new(
        HaversineRoutingProvider::default().with_venues(venues.clone()),
        Arc::clone(&cache),
        config.clone(),
    );
    let second = MeetingPointEngine::new(
        HaversineRoutingProvider::default().with_venues(venues),
        Arc::clone(&cache),
        config,
    );

    block_on(first.compute_geometric_midpoint(&taipei)).expect("midpoint");
    let reused = block_on(second.compute_geometric_midpoint(&taipei)).expect("midpoint");

    assert!(reused.cached);
    assert_eq!(second.provider().total_calls(), 0);
}
