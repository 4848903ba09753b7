//! Access to external geocoding, directions, distance-matrix and places
//! services.
//!
//! [`RoutingProvider`] mirrors the four paid, rate-limited services one call
//! at a time. [`RoutingAdapter`] wraps a provider with the policy the rest of
//! the engine relies on:
//!
//! - failures are isolated per cell and reported as [`Unresolved`] rather
//!   than aborting sibling queries;
//! - a transit query that cannot be routed is retried once with driving;
//! - independent per-participant queries are issued concurrently and joined
//!   in input order.

mod adapter;
mod error;
mod provider;

pub use adapter::{Resolution, Routed, RoutingAdapter, Unresolved};
pub use error::RoutingError;
pub use provider::{RouteLeg, RoutingProvider, TravelEstimate, TravelTimeMatrix};
