//! Venue search and ranking around an optimised point.

use futures_util::future::join_all;
use log::{debug, warn};

use crate::candidate::dedupe_by_place_id;
use crate::participant::located;
use crate::routing::{Resolution, Routed, RoutingAdapter, RoutingProvider, TravelEstimate};
use crate::{
    Candidate, EngineConfig, EngineError, GeoPoint, Objective, Participant, ScoredCandidate,
    TravelMetric,
};

/// Finds real venues near a point and ranks them by travel time.
#[derive(Debug)]
pub struct VenueScorer<'a, P> {
    adapter: &'a RoutingAdapter<P>,
    search_radius_meters: u32,
    category: &'a str,
    max_candidates: usize,
}

impl<'a, P> VenueScorer<'a, P>
where
    P: RoutingProvider,
{
    /// Build a scorer using the search radius, category and candidate cap
    /// from `config`.
    pub fn new(adapter: &'a RoutingAdapter<P>, config: &'a EngineConfig) -> Self {
        Self {
            adapter,
            search_radius_meters: config.search_radius_meters,
            category: config.venue_category.as_str(),
            max_candidates: config.max_candidates,
        }
    }

    /// Distinct venues near `around`, in search order, capped at the
    /// configured maximum.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ProviderUnavailable`] when the search call fails.
    /// - [`EngineError::NoCandidates`] when the search finds nothing.
    pub async fn find_candidates(&self, around: GeoPoint) -> Result<Vec<Candidate>, EngineError> {
        let places = self
            .adapter
            .nearby_places(around, self.search_radius_meters, self.category)
            .await
            .map_err(|source| EngineError::ProviderUnavailable { source })?;
        let mut candidates = dedupe_by_place_id(places);
        candidates.truncate(self.max_candidates);
        if candidates.is_empty() {
            return Err(EngineError::NoCandidates);
        }
        Ok(candidates)
    }

    /// Score every candidate reachable by all located participants and sort
    /// them best first under `objective`.
    ///
    /// Issues one distance-matrix query per participant, concurrently. A
    /// candidate with any unresolved cell is dropped. Equal scores keep
    /// search order.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ProviderUnavailable`] when every cell failed because
    ///   the service could not be reached.
    /// - [`EngineError::NoValidRoutes`] when no candidate is reachable by
    ///   every participant for any other reason.
    pub async fn rank(
        &self,
        participants: &[Participant],
        candidates: Vec<Candidate>,
        objective: Objective,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        let travellers = located(participants);
        let destinations: Vec<GeoPoint> = candidates.iter().map(|venue| venue.point).collect();

        let rows: Vec<Vec<Resolution<Routed<TravelEstimate>>>> =
            join_all(travellers.iter().map(|traveller| {
                self.adapter.travel_time_matrix(
                    std::slice::from_ref(&traveller.point),
                    &destinations,
                    traveller.mode,
                )
            }))
            .await
            .into_iter()
            .map(|matrix| matrix.into_iter().next().unwrap_or_default())
            .collect();

        let considered = candidates.len();
        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .enumerate()
            .filter_map(|(column, candidate)| {
                let legs = complete_column(&rows, column)?;
                let metric = TravelMetric::from_estimates(legs.iter().map(|leg| &leg.value));
                Some(ScoredCandidate {
                    candidate,
                    legs,
                    metric,
                })
            })
            .collect();

        debug!(
            "{} of {considered} candidates reachable by all {} participants",
            scored.len(),
            travellers.len()
        );
        if scored.is_empty() {
            return Err(classify_empty(&rows));
        }
        scored.sort_by_key(|entry| entry.score(objective));
        Ok(scored)
    }
}

/// Every participant's leg to candidate `column`, or `None` if any is
/// missing.
fn complete_column(
    rows: &[Vec<Resolution<Routed<TravelEstimate>>>],
    column: usize,
) -> Option<Vec<Routed<TravelEstimate>>> {
    rows.iter()
        .map(|row| row.get(column).and_then(|cell| cell.as_ref().ok()).cloned())
        .collect()
}

fn classify_empty(rows: &[Vec<Resolution<Routed<TravelEstimate>>>]) -> EngineError {
    let mut failures = rows
        .iter()
        .flatten()
        .map(|cell| cell.as_ref().err().and_then(|unresolved| unresolved.failure()));
    match failures.next() {
        Some(Some(first)) if failures.all(|failure| failure.is_some()) => {
            warn!("every distance-matrix cell failed: {first}");
            EngineError::ProviderUnavailable {
                source: first.clone(),
            }
        }
        _ => EngineError::NoValidRoutes,
    }
}
