//! HTTP routing and places provider for Google-Maps-style web services.
//!
//! This module provides [`HttpRoutingProvider`], an implementation of
//! [`rendezvous_core::RoutingProvider`] that talks to the geocoding,
//! directions, distance-matrix and nearby-places JSON endpoints.
//!
//! # Status handling
//!
//! Each response carries a service status. `OK` yields data, `ZERO_RESULTS`
//! and `NOT_FOUND` yield empty results (no route, no address, no places), and
//! anything else (`REQUEST_DENIED`, `OVER_QUERY_LIMIT`, ...) is reported as
//! [`RoutingError::ServiceError`](rendezvous_core::RoutingError::ServiceError).
//! Distance-matrix cells carry their own status and are resolved one by one.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use rendezvous_core::{GeoPoint, RoutingProvider, TravelMode};
//! use rendezvous_data::maps::{HttpRoutingProvider, HttpRoutingProviderConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpRoutingProviderConfig::new("my-api-key")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-app/1.0");
//! let provider = HttpRoutingProvider::with_config(config)?;
//!
//! let origin = GeoPoint::new(25.03, 121.56)?;
//! let destination = GeoPoint::new(25.04, 121.55)?;
//! let leg = provider.directions(origin, destination, TravelMode::Transit).await?;
//! println!("{:?}", leg.map(|leg| leg.duration));
//! # Ok(())
//! # }
//! ```

mod google;
mod provider;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpRoutingProvider, HttpRoutingProviderConfig,
    ProviderBuildError,
};
