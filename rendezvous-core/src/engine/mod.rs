//! Orchestration of cache, optimiser and venue scorer.

use std::sync::Arc;

use futures_util::future::join3;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CacheNamespace, ResultCache, fingerprint};
use crate::candidate::dedupe_by_place_id;
use crate::midpoint::centroid;
use crate::optimizer::{MIN_PARTICIPANTS, TravelTimeOptimizer};
use crate::participant::{Located, located};
use crate::routing::{RoutingAdapter, RoutingProvider};
use crate::venue::VenueScorer;
use crate::{
    EngineConfig, EngineError, GeoPoint, GeometricMidpoint, Objective, Participant,
    ParticipantRoute, ParticipantTravelTime, RoutesToPoint, TimeOptimizedMidpoint, TravelMode,
};

/// Computes meeting points for groups of participants.
///
/// Results are memoised in a shared [`ResultCache`]; failed computations
/// are never cached. The engine holds no other mutable state, so one
/// instance can serve concurrent requests.
#[derive(Debug)]
pub struct MeetingPointEngine<P> {
    adapter: RoutingAdapter<P>,
    cache: Arc<ResultCache>,
    config: EngineConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionParams<'a> {
    category: &'a str,
    radius_meters: u32,
    limit: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OptimizeParams<'a> {
    objective: Objective,
    category: &'a str,
    radius_meters: u32,
    max_candidates: usize,
    max_iterations: usize,
    step_degrees: f64,
}

impl<P> MeetingPointEngine<P>
where
    P: RoutingProvider,
{
    /// Build an engine over `provider`, sharing `cache` with any other
    /// engine that holds it.
    pub fn new(provider: P, cache: Arc<ResultCache>, config: EngineConfig) -> Self {
        Self {
            adapter: RoutingAdapter::new(provider),
            cache,
            config,
        }
    }

    /// Build an engine with a private cache and default configuration.
    pub fn with_defaults(provider: P) -> Self {
        Self::new(provider, Arc::new(ResultCache::new()), EngineConfig::default())
    }

    /// The result cache.
    pub const fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// The engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The routing provider.
    pub const fn provider(&self) -> &P {
        self.adapter.provider()
    }

    /// Centroid of the located participants with its address, nearby venue
    /// suggestions and everyone's travel time to it.
    ///
    /// The address lookup, venue search and travel-time queries run
    /// concurrently. When the provider fails any of them the result is
    /// returned without that data and is not cached.
    ///
    /// # Errors
    ///
    /// [`EngineError::InsufficientLocations`] with fewer than two located
    /// participants, before any provider call.
    pub async fn compute_geometric_midpoint(
        &self,
        participants: &[Participant],
    ) -> Result<GeometricMidpoint, EngineError> {
        let travellers = require_located(participants, MIN_PARTICIPANTS)?;
        let params = SuggestionParams {
            category: &self.config.venue_category,
            radius_meters: self.config.search_radius_meters,
            limit: self.config.suggested_venue_limit,
        };
        let key = cache_key(CacheNamespace::GeometricMidpoint, participants, &params);
        if let Some(mut hit) = self.lookup::<GeometricMidpoint>(key.as_deref()) {
            hit.cached = true;
            return Ok(hit);
        }

        let midpoint = seed(&travellers)?;
        let starts = origins(&travellers);
        let (address, places, times) = join3(
            self.adapter.reverse_geocode(midpoint),
            self.adapter.nearby_places(
                midpoint,
                self.config.search_radius_meters,
                &self.config.venue_category,
            ),
            self.adapter.travel_times_to(&starts, midpoint),
        )
        .await;

        let mut degraded = address
            .as_ref()
            .err()
            .is_some_and(|unresolved| unresolved.failure().is_some());
        let suggested_venues = match places {
            Ok(found) => {
                let mut venues = dedupe_by_place_id(found);
                venues.truncate(self.config.suggested_venue_limit);
                venues
            }
            Err(_) => {
                degraded = true;
                Vec::new()
            }
        };
        degraded |= times
            .iter()
            .any(|time| time.as_ref().is_err_and(|unresolved| unresolved.failure().is_some()));
        let participant_travel_times = travellers
            .iter()
            .zip(&times)
            .map(|(traveller, time)| {
                ParticipantTravelTime::from_resolution(traveller.id, traveller.mode, time)
            })
            .collect();

        let result = GeometricMidpoint {
            midpoint,
            address: address.ok(),
            suggested_venues,
            participant_travel_times,
            cached: false,
        };
        if degraded {
            warn!("provider unavailable; returning geometric midpoint {midpoint} without full details");
        } else {
            self.store(CacheNamespace::GeometricMidpoint, key, &result);
        }
        info!(
            "geometric midpoint {midpoint} for {} participants with {} venue suggestions",
            travellers.len(),
            result.suggested_venues.len()
        );
        Ok(result)
    }

    /// Best venue near the point that minimises `objective`.
    ///
    /// Seeds the optimiser with the centroid, searches venues around the
    /// point it converges on and ranks them by every participant's travel
    /// time. `force_recalculate` skips the cache read but still stores the
    /// fresh result.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InsufficientLocations`] with fewer than two located
    ///   participants, before any provider call.
    /// - [`EngineError::NoResolvableLocation`] when the optimiser could not
    ///   evaluate any point.
    /// - [`EngineError::NoCandidates`] when no venue was found.
    /// - [`EngineError::NoValidRoutes`] when no venue is reachable by
    ///   everyone.
    /// - [`EngineError::ProviderUnavailable`] when the routing service could
    ///   not be used.
    pub async fn compute_time_optimized_midpoint(
        &self,
        participants: &[Participant],
        objective: Objective,
        force_recalculate: bool,
    ) -> Result<TimeOptimizedMidpoint, EngineError> {
        let travellers = require_located(participants, MIN_PARTICIPANTS)?;
        let params = OptimizeParams {
            objective,
            category: &self.config.venue_category,
            radius_meters: self.config.search_radius_meters,
            max_candidates: self.config.max_candidates,
            max_iterations: self.config.max_iterations,
            step_degrees: self.config.step_degrees,
        };
        let key = cache_key(CacheNamespace::TimeMidpoint, participants, &params);
        if force_recalculate {
            debug!("forced recalculation; skipping cache lookup");
        } else if let Some(mut hit) = self.lookup::<TimeOptimizedMidpoint>(key.as_deref()) {
            hit.cached = true;
            return Ok(hit);
        }

        let optimizer = TravelTimeOptimizer::new(&self.adapter, &self.config);
        let optimized = optimizer
            .optimize(participants, seed(&travellers)?, objective)
            .await?;

        let scorer = VenueScorer::new(&self.adapter, &self.config);
        let candidates = scorer.find_candidates(optimized.point).await?;
        let candidates_considered = candidates.len();
        let best = scorer
            .rank(participants, candidates, objective)
            .await?
            .into_iter()
            .next()
            .ok_or(EngineError::NoValidRoutes)?;

        let participant_times = travellers
            .iter()
            .zip(&best.legs)
            .map(|(traveller, leg)| ParticipantTravelTime::resolved(traveller.id, leg))
            .collect();
        let result = TimeOptimizedMidpoint {
            venue: best.candidate,
            metric: best.metric,
            participant_times,
            candidates_considered,
            optimized_point: optimized.point,
            iterations: optimized.iterations,
            objective,
            cached: false,
        };
        self.store(CacheNamespace::TimeMidpoint, key, &result);
        info!(
            "selected {} ({objective} = {}s) from {candidates_considered} candidates after {} iterations",
            result.venue.name,
            result.metric.score(objective),
            result.iterations
        );
        Ok(result)
    }

    /// Routes from every located participant to `target`.
    ///
    /// One directions query per participant, issued concurrently. Routes are
    /// returned in participant order; participants without a route are
    /// listed separately. Results containing provider failures are not
    /// cached.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InsufficientLocations`] when no participant is
    ///   located, before any provider call.
    /// - [`EngineError::ProviderUnavailable`] when every query failed
    ///   because the service could not be reached.
    pub async fn compute_routes_to_point(
        &self,
        participants: &[Participant],
        target: GeoPoint,
    ) -> Result<RoutesToPoint, EngineError> {
        let travellers = require_located(participants, 1)?;
        let key = cache_key(CacheNamespace::RoutesToPoint, participants, &target);
        if let Some(mut hit) = self.lookup::<RoutesToPoint>(key.as_deref()) {
            hit.cached = true;
            return Ok(hit);
        }

        let legs = self.adapter.routes_to(&origins(&travellers), target).await;
        let mut routes = Vec::with_capacity(legs.len());
        let mut unresolved_participants = Vec::new();
        let mut failures = Vec::new();
        for (traveller, leg) in travellers.iter().zip(legs) {
            match leg {
                Ok(routed) => routes.push(ParticipantRoute {
                    participant_id: traveller.id.to_owned(),
                    travel_mode: routed.mode,
                    duration_seconds: routed.value.duration.as_secs(),
                    distance_meters: routed.value.distance_meters,
                    polyline: routed.value.polyline,
                }),
                Err(unresolved) => {
                    debug!("no route for {} to {target}: {unresolved}", traveller.id);
                    unresolved_participants.push(traveller.id.to_owned());
                    if let Some(failure) = unresolved.failure() {
                        failures.push(failure.clone());
                    }
                }
            }
        }

        let complete = failures.is_empty();
        if routes.is_empty()
            && failures.len() == unresolved_participants.len()
            && let Some(source) = failures.into_iter().next()
        {
            return Err(EngineError::ProviderUnavailable { source });
        }

        let result = RoutesToPoint {
            target,
            routes,
            unresolved_participants,
            cached: false,
        };
        if complete {
            self.store(CacheNamespace::RoutesToPoint, key, &result);
        }
        info!(
            "routed {} of {} participants to {target}",
            result.routes.len(),
            travellers.len()
        );
        Ok(result)
    }

    fn lookup<T>(&self, key: Option<&str>) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let id = key?;
        let hit = self.cache.get::<T>(id);
        if hit.is_some() {
            debug!("cache hit for {id}");
        }
        hit
    }

    fn store<T>(&self, namespace: CacheNamespace, key: Option<String>, value: &T)
    where
        T: Serialize,
    {
        let Some(id) = key else {
            return;
        };
        self.cache
            .set(id, value, self.config.cache_ttls.ttl_for(namespace));
    }
}

/// Located participants, provided there are at least `required`.
fn require_located(
    participants: &[Participant],
    required: usize,
) -> Result<Vec<Located<'_>>, EngineError> {
    let travellers = located(participants);
    if travellers.len() < required {
        return Err(EngineError::InsufficientLocations {
            found: travellers.len(),
            required,
        });
    }
    Ok(travellers)
}

fn seed(travellers: &[Located<'_>]) -> Result<GeoPoint, EngineError> {
    let points: Vec<GeoPoint> = travellers.iter().map(|traveller| traveller.point).collect();
    centroid(&points).ok_or(EngineError::InsufficientLocations {
        found: 0,
        required: MIN_PARTICIPANTS,
    })
}

fn origins(travellers: &[Located<'_>]) -> Vec<(GeoPoint, TravelMode)> {
    travellers
        .iter()
        .map(|traveller| (traveller.point, traveller.mode))
        .collect()
}

/// Fingerprint for a request, or `None` when it cannot be computed. Such
/// requests are served without the cache.
fn cache_key<T>(namespace: CacheNamespace, participants: &[Participant], params: &T) -> Option<String>
where
    T: Serialize + ?Sized,
{
    fingerprint(namespace, participants, params)
        .inspect_err(|err| warn!("cannot fingerprint {} request: {err}", namespace.as_str()))
        .ok()
}

#[cfg(test)]
mod tests;
