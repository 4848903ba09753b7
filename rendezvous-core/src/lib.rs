//! Core domain types and algorithms for the rendezvous meeting-point engine.
//!
//! Given participants with positions and travel modes, the
//! [`MeetingPointEngine`] computes a geometric midpoint, refines it into a
//! travel-time-balanced point and ranks real venues around that point. Every
//! external service call goes through a [`RoutingProvider`]; results are
//! memoised in a shared [`ResultCache`].
//!
//! # Examples
//!
//! ```
//! use rendezvous_core::test_support::{HaversineRoutingProvider, venue};
//! use rendezvous_core::{MeetingPointEngine, Objective, Participant, TravelMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = HaversineRoutingProvider::default()
//!     .with_venues([venue("cafe-1", "Corner Cafe", 25.036, 121.554)]);
//! let engine = MeetingPointEngine::with_defaults(provider);
//! let participants = [
//!     Participant::new("ana", 25.03, 121.56, TravelMode::Driving)?,
//!     Participant::new("ben", 25.04, 121.55, TravelMode::Transit)?,
//! ];
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
//! let result = runtime.block_on(engine.compute_time_optimized_midpoint(
//!     &participants,
//!     Objective::MinimizeMax,
//!     false,
//! ))?;
//! assert_eq!(result.venue.place_id, "cafe-1");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod cache;
mod candidate;
mod config;
mod engine;
mod error;
pub mod midpoint;
pub mod optimizer;
mod participant;
mod point;
mod response;
pub mod routing;
#[doc(hidden)]
pub mod test_support;
pub mod venue;

pub use cache::{CacheNamespace, ResultCache};
pub use candidate::{Candidate, ScoredCandidate};
pub use config::{CacheTtls, EngineConfig};
pub use engine::MeetingPointEngine;
pub use error::EngineError;
pub use optimizer::{OptimizedLocation, TravelTimeOptimizer};
pub use participant::{Participant, ParticipantError, TravelMode, TravelModeParseError};
pub use point::{GeoPoint, GeoPointError};
pub use response::{
    GeometricMidpoint, Objective, ObjectiveParseError, ParticipantRoute, ParticipantTravelTime,
    RoutesToPoint, TimeOptimizedMidpoint, TravelMetric,
};
pub use routing::{RoutingError, RoutingProvider};
pub use venue::VenueScorer;
