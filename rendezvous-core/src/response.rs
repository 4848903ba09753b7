//! Serializable payloads returned by [`MeetingPointEngine`](crate::MeetingPointEngine).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::{Resolution, Routed, TravelEstimate};
use crate::{Candidate, GeoPoint, TravelMode};

/// What the optimiser minimises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Sum of every participant's travel time.
    MinimizeTotal,
    /// Longest individual travel time.
    #[default]
    MinimizeMax,
}

impl Objective {
    /// Wire name of the objective.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MinimizeTotal => "minimize_total",
            Self::MinimizeMax => "minimize_max",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`Objective`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown objective {0:?}; expected minimize_total or minimize_max")]
pub struct ObjectiveParseError(pub String);

impl FromStr for Objective {
    type Err = ObjectiveParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "minimize_total" => Ok(Self::MinimizeTotal),
            "minimize_max" => Ok(Self::MinimizeMax),
            other => Err(ObjectiveParseError(other.to_owned())),
        }
    }
}

/// Aggregate travel time across participants, in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelMetric {
    /// Sum of all travel times.
    pub total_seconds: u64,
    /// Longest single travel time.
    pub max_seconds: u64,
}

impl TravelMetric {
    /// Aggregate a set of travel estimates.
    pub fn from_estimates<'a, I>(estimates: I) -> Self
    where
        I: IntoIterator<Item = &'a TravelEstimate>,
    {
        estimates
            .into_iter()
            .fold(Self::default(), |metric, estimate| {
                let seconds = estimate.duration.as_secs();
                Self {
                    total_seconds: metric.total_seconds.saturating_add(seconds),
                    max_seconds: metric.max_seconds.max(seconds),
                }
            })
    }

    /// The value `objective` minimises.
    #[must_use]
    pub const fn score(self, objective: Objective) -> u64 {
        match objective {
            Objective::MinimizeTotal => self.total_seconds,
            Objective::MinimizeMax => self.max_seconds,
        }
    }
}

/// One participant's travel time to a point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantTravelTime {
    /// Participant identifier.
    pub participant_id: String,
    /// Mode actually used, after any fallback.
    pub travel_mode: TravelMode,
    /// Travel time, absent when no route resolved.
    pub duration_seconds: Option<u64>,
    /// Route length, absent when no route resolved.
    pub distance_meters: Option<u64>,
}

impl ParticipantTravelTime {
    pub(crate) fn resolved(participant_id: &str, routed: &Routed<TravelEstimate>) -> Self {
        Self {
            participant_id: participant_id.to_owned(),
            travel_mode: routed.mode,
            duration_seconds: Some(routed.value.duration.as_secs()),
            distance_meters: Some(routed.value.distance_meters),
        }
    }

    pub(crate) fn from_resolution(
        participant_id: &str,
        requested_mode: TravelMode,
        resolution: &Resolution<Routed<TravelEstimate>>,
    ) -> Self {
        match resolution {
            Ok(routed) => Self::resolved(participant_id, routed),
            Err(_) => Self {
                participant_id: participant_id.to_owned(),
                travel_mode: requested_mode,
                duration_seconds: None,
                distance_meters: None,
            },
        }
    }
}

/// Result of [`MeetingPointEngine::compute_geometric_midpoint`](crate::MeetingPointEngine::compute_geometric_midpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometricMidpoint {
    /// Arithmetic centroid of the participants' positions.
    pub midpoint: GeoPoint,
    /// Reverse-geocoded address of the midpoint.
    pub address: Option<String>,
    /// Venues near the midpoint, in provider order.
    pub suggested_venues: Vec<Candidate>,
    /// Travel time from each located participant to the midpoint.
    pub participant_travel_times: Vec<ParticipantTravelTime>,
    /// Whether the result was served from the cache.
    pub cached: bool,
}

/// Result of [`MeetingPointEngine::compute_time_optimized_midpoint`](crate::MeetingPointEngine::compute_time_optimized_midpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOptimizedMidpoint {
    /// Best-ranked venue.
    pub venue: Candidate,
    /// Aggregate travel time to `venue`.
    pub metric: TravelMetric,
    /// Travel time from each located participant to `venue`.
    pub participant_times: Vec<ParticipantTravelTime>,
    /// Number of distinct venues scored.
    pub candidates_considered: usize,
    /// Point the optimiser converged on; venues were searched around it.
    pub optimized_point: GeoPoint,
    /// Optimiser iterations performed.
    pub iterations: usize,
    /// Objective the ranking minimised.
    pub objective: Objective,
    /// Whether the result was served from the cache.
    pub cached: bool,
}

/// A route from one participant to the target point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRoute {
    /// Participant identifier.
    pub participant_id: String,
    /// Mode actually used, after any fallback.
    pub travel_mode: TravelMode,
    /// Encoded overview polyline.
    pub polyline: String,
    /// Travel time.
    pub duration_seconds: u64,
    /// Route length.
    pub distance_meters: u64,
}

/// Result of [`MeetingPointEngine::compute_routes_to_point`](crate::MeetingPointEngine::compute_routes_to_point).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesToPoint {
    /// Destination shared by every route.
    pub target: GeoPoint,
    /// Resolved routes in participant order.
    pub routes: Vec<ParticipantRoute>,
    /// Participants for whom no route could be found.
    pub unresolved_participants: Vec<String>,
    /// Whether the result was served from the cache.
    pub cached: bool,
}
