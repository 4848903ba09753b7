//! Facade crate for the rendezvous meeting-point engine.
//!
//! This crate re-exports the core domain types and, behind the `http`
//! feature, the HTTP routing provider for Google-Maps-style web services.

#![forbid(unsafe_code)]

pub use rendezvous_core::{
    CacheNamespace, CacheTtls, Candidate, EngineConfig, EngineError, GeoPoint, GeoPointError,
    GeometricMidpoint, MeetingPointEngine, Objective, Participant, ParticipantError,
    ParticipantRoute, ParticipantTravelTime, ResultCache, RoutesToPoint, RoutingError,
    RoutingProvider, TimeOptimizedMidpoint, TravelMetric, TravelMode,
};

#[cfg(feature = "http")]
pub use rendezvous_data::{
    DEFAULT_BASE_URL, HttpRoutingProvider, HttpRoutingProviderConfig, ProviderBuildError,
};
