//! Hill-climbing search for a travel-time-balanced meeting point.
//!
//! Starting from a seed (normally the geometric centroid), each iteration
//! asks for every participant's travel time to the current point, records
//! the point if it improves the objective, then moves a fixed step towards
//! the participant with the longest journey.
//!
//! Directions queries are capped at `max_iterations × participants` per
//! call. Each iteration first asks in every participant's current mode and
//! spends whatever budget remains on transit-to-driving retries. A
//! participant whose transit query only resolved by driving is asked by
//! driving from then on.

use futures_util::future::join_all;
use log::{debug, warn};

use crate::participant::{Located, located};
use crate::routing::{Resolution, Routed, RoutingAdapter, RoutingProvider, TravelEstimate};
use crate::{
    EngineConfig, EngineError, GeoPoint, Objective, Participant, TravelMetric, TravelMode,
};

/// Minimum located participants the optimiser accepts.
pub const MIN_PARTICIPANTS: usize = 2;

/// Outcome of [`TravelTimeOptimizer::optimize`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedLocation {
    /// Best point evaluated.
    pub point: GeoPoint,
    /// Travel times to `point`.
    pub metric: TravelMetric,
    /// Iterations that issued queries.
    pub iterations: usize,
}

/// Hill-climbing optimiser over a [`RoutingAdapter`].
#[derive(Debug)]
pub struct TravelTimeOptimizer<'a, P> {
    adapter: &'a RoutingAdapter<P>,
    max_iterations: usize,
    step_degrees: f64,
}

impl<'a, P> TravelTimeOptimizer<'a, P>
where
    P: RoutingProvider,
{
    /// Build an optimiser using the iteration limit and step size from
    /// `config`.
    pub const fn new(adapter: &'a RoutingAdapter<P>, config: &EngineConfig) -> Self {
        Self {
            adapter,
            max_iterations: config.max_iterations,
            step_degrees: config.step_degrees,
        }
    }

    /// Search for the point minimising `objective`, starting at `seed`.
    ///
    /// Iterations run sequentially; queries within one iteration run
    /// concurrently. The search stops early when a participant's travel time
    /// cannot be resolved (even after fallback) or when the slowest
    /// participant is closer than one step.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InsufficientLocations`] with fewer than two located
    ///   participants, before any query is issued.
    /// - [`EngineError::ProviderUnavailable`] when no point was evaluated and
    ///   every unresolved query failed outright.
    /// - [`EngineError::NoResolvableLocation`] when no point was evaluated
    ///   for any other reason.
    pub async fn optimize(
        &self,
        participants: &[Participant],
        seed: GeoPoint,
        objective: Objective,
    ) -> Result<OptimizedLocation, EngineError> {
        let travellers = located(participants);
        if travellers.len() < MIN_PARTICIPANTS {
            return Err(EngineError::InsufficientLocations {
                found: travellers.len(),
                required: MIN_PARTICIPANTS,
            });
        }
        let mut modes: Vec<TravelMode> =
            travellers.iter().map(|traveller| traveller.mode).collect();
        let mut budget = self.max_iterations.saturating_mul(travellers.len());

        let mut best = RunningBest::new(objective);
        let mut current = seed;
        let mut iterations = 0;
        let mut last_failure = None;

        while iterations < self.max_iterations {
            if budget < travellers.len() {
                debug!("query budget spent after {iterations} iterations");
                break;
            }
            iterations += 1;
            let times = self
                .travel_times(&travellers, &mut modes, current, &mut budget)
                .await;
            let estimates = match resolve_all(times) {
                Ok(estimates) => estimates,
                Err(unresolved) => {
                    debug!(
                        "iteration {iterations}: {} travel times unresolved at {current}; stopping",
                        unresolved.len()
                    );
                    last_failure = Some(unresolved);
                    break;
                }
            };

            let metric = TravelMetric::from_estimates(estimates.iter().map(|routed| &routed.value));
            let improved = best.offer(current, metric);
            debug!(
                "iteration {iterations}: {current} total={}s max={}s improved={improved}",
                metric.total_seconds, metric.max_seconds
            );

            let Some(laggard) = slowest(&travellers, &estimates) else {
                break;
            };
            if current.planar_distance(laggard.point) < self.step_degrees {
                debug!("iteration {iterations}: converged within one step of {}", laggard.id);
                break;
            }
            current = current.step_towards(laggard.point, self.step_degrees);
        }

        match best.into_inner() {
            Some((point, metric)) => Ok(OptimizedLocation {
                point,
                metric,
                iterations,
            }),
            None => Err(classify_failure(last_failure)),
        }
    }

    /// One travel time per traveller to `destination`, drawn from `budget`.
    ///
    /// Primary queries use `modes`; failed queries with a fallback mode are
    /// retried while budget remains. A successful retry switches that
    /// traveller's entry in `modes` to the fallback.
    async fn travel_times(
        &self,
        travellers: &[Located<'_>],
        modes: &mut [TravelMode],
        destination: GeoPoint,
        budget: &mut usize,
    ) -> Vec<Resolution<Routed<TravelEstimate>>> {
        let mut times = join_all(travellers.iter().zip(modes.iter()).map(|(traveller, &mode)| {
            self.adapter
                .travel_time_in_mode(traveller.point, destination, mode)
        }))
        .await;
        *budget = budget.saturating_sub(travellers.len());

        let retries: Vec<(usize, GeoPoint, TravelMode)> = travellers
            .iter()
            .zip(modes.iter())
            .zip(&times)
            .enumerate()
            .filter_map(|(index, ((traveller, mode), time))| match (time, mode.fallback()) {
                (Err(_), Some(fallback)) => Some((index, traveller.point, fallback)),
                _ => None,
            })
            .take(*budget)
            .collect();
        if retries.is_empty() {
            return times;
        }
        *budget = budget.saturating_sub(retries.len());

        let retried = join_all(retries.iter().map(|&(_, origin, fallback)| {
            warn!("{origin} -> {destination} unresolved; retrying with {fallback}");
            self.adapter.travel_time_in_mode(origin, destination, fallback)
        }))
        .await;
        for ((index, _, fallback), time) in retries.into_iter().zip(retried) {
            if time.is_ok()
                && let Some(mode) = modes.get_mut(index)
            {
                *mode = fallback;
            }
            if let Some(slot) = times.get_mut(index) {
                *slot = time;
            }
        }
        times
    }
}

/// Tracks the best point seen under one objective.
///
/// The stored metric carries both totals; comparisons always use the
/// objective's own unit, so a total is never compared against a maximum.
#[derive(Debug)]
struct RunningBest {
    objective: Objective,
    best: Option<(GeoPoint, TravelMetric)>,
}

impl RunningBest {
    const fn new(objective: Objective) -> Self {
        Self {
            objective,
            best: None,
        }
    }

    /// Record `point` if it strictly improves on the best so far. Ties keep
    /// the earlier, more central point.
    fn offer(&mut self, point: GeoPoint, metric: TravelMetric) -> bool {
        let improved = self.best.is_none_or(|(_, best)| {
            metric.score(self.objective) < best.score(self.objective)
        });
        if improved {
            self.best = Some((point, metric));
        }
        improved
    }

    const fn into_inner(self) -> Option<(GeoPoint, TravelMetric)> {
        self.best
    }
}

type ResolvedTimes = Vec<Routed<TravelEstimate>>;

fn resolve_all(
    times: Vec<Resolution<Routed<TravelEstimate>>>,
) -> Result<ResolvedTimes, Vec<crate::routing::Unresolved>> {
    let (resolved, unresolved): (Vec<_>, Vec<_>) = times.into_iter().partition(Result::is_ok);
    if unresolved.is_empty() {
        Ok(resolved.into_iter().filter_map(Result::ok).collect())
    } else {
        Err(unresolved.into_iter().filter_map(Result::err).collect())
    }
}

/// The first participant with the longest travel time.
fn slowest<'a>(
    travellers: &[Located<'a>],
    estimates: &[Routed<TravelEstimate>],
) -> Option<Located<'a>> {
    travellers
        .iter()
        .zip(estimates)
        .fold(None, |slowest: Option<(Located<'a>, _)>, (traveller, routed)| {
            match slowest {
                Some((_, longest)) if routed.value.duration <= longest => slowest,
                _ => Some((*traveller, routed.value.duration)),
            }
        })
        .map(|(traveller, _)| traveller)
}

fn classify_failure(last_failure: Option<Vec<crate::routing::Unresolved>>) -> EngineError {
    let Some(unresolved) = last_failure else {
        return EngineError::NoResolvableLocation;
    };
    let failures: Vec<_> = unresolved.iter().map(|cell| cell.failure()).collect();
    match failures.first() {
        Some(Some(first)) if failures.iter().all(Option::is_some) => {
            EngineError::ProviderUnavailable {
                source: (*first).clone(),
            }
        }
        _ => EngineError::NoResolvableLocation,
    }
}
