//! External service adapters for the rendezvous engine.
//!
//! Responsibilities:
//! - Implement [`rendezvous_core::RoutingProvider`] against real map services.
//! - Translate wire formats and transport failures into core types.
//!
//! Boundaries:
//! - Do not encode meeting-point rules (live in `rendezvous-core`).
//! - Stay async end to end; never block an executor thread.
//!
//! Invariants:
//! - API keys never appear in logs or error messages.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod maps;

pub use maps::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpRoutingProvider, HttpRoutingProviderConfig,
    ProviderBuildError,
};
