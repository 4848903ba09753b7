use thiserror::Error;

use crate::routing::RoutingError;

/// Errors returned by [`MeetingPointEngine`](crate::MeetingPointEngine).
///
/// Per-cell routing failures are absorbed inside the engine. Only failures
/// that leave no valid result reach the caller, each as one actionable
/// variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Too few participants have a known position. Raised before any
    /// provider call.
    #[error("at least {required} participants with known locations are required, found {found}")]
    InsufficientLocations {
        /// Participants with a known position.
        found: usize,
        /// Minimum the operation needs.
        required: usize,
    },
    /// The optimiser could not evaluate any point because some
    /// participants had no route to it.
    #[error("no location could be evaluated: some participants have no route")]
    NoResolvableLocation,
    /// The venue search returned nothing near the optimised point.
    #[error("no venues found near the meeting point")]
    NoCandidates,
    /// Venues exist but none is reachable by every participant.
    #[error("no venue is reachable by every participant")]
    NoValidRoutes,
    /// The routing service could not be used at all.
    #[error("routing provider unavailable: {source}")]
    ProviderUnavailable {
        /// First failure observed.
        #[source]
        source: RoutingError,
    },
}
