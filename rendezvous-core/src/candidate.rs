//! Venues considered as meeting points.

use serde::{Deserialize, Serialize};

use crate::routing::{Routed, TravelEstimate};
use crate::{GeoPoint, Objective, TravelMetric};

/// A real-world venue returned by a places search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Provider-assigned place identifier; unique per venue.
    pub place_id: String,
    /// Display name.
    pub name: String,
    /// Venue position.
    pub point: GeoPoint,
    /// Street address or vicinity description, if known.
    pub address: Option<String>,
}

/// A candidate with a complete set of travel times.
///
/// Only built when every participant's travel time to the venue resolved,
/// so partial data never contributes to a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// The venue.
    pub candidate: Candidate,
    /// Travel estimate per located participant, in participant order.
    pub legs: Vec<Routed<TravelEstimate>>,
    /// Aggregate travel time over `legs`.
    pub metric: TravelMetric,
}

impl ScoredCandidate {
    /// Score under `objective`; lower is better.
    #[must_use]
    pub const fn score(&self, objective: Objective) -> u64 {
        self.metric.score(objective)
    }
}

/// Keep the first occurrence of each place identifier, preserving order.
pub(crate) fn dedupe_by_place_id(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.place_id.clone()))
        .collect()
}
