//! Provider trait for external routing and places services.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{Candidate, GeoPoint, TravelMode};

use super::error::RoutingError;

/// Travel time and distance for one origin/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelEstimate {
    /// Travel time.
    pub duration: Duration,
    /// Route length in metres.
    pub distance_meters: u64,
}

/// A single routed leg as returned by a directions service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLeg {
    /// Travel time.
    pub duration: Duration,
    /// Route length in metres.
    pub distance_meters: u64,
    /// Encoded overview polyline.
    pub polyline: String,
}

impl RouteLeg {
    /// Travel time and distance of the leg.
    #[must_use]
    pub const fn estimate(&self) -> TravelEstimate {
        TravelEstimate {
            duration: self.duration,
            distance_meters: self.distance_meters,
        }
    }
}

/// Row-major matrix of optional estimates.
///
/// `matrix[i][j]` is the estimate from `origins[i]` to `destinations[j]`,
/// or `None` when the service found no route for that pair.
pub type TravelTimeMatrix = Vec<Vec<Option<TravelEstimate>>>;

/// External geocoding, directions, distance-matrix and places service.
///
/// Every method maps to exactly one billed service call. Implementations
/// report "no result" outcomes as `Ok(None)` or empty collections and
/// reserve `Err` for calls that failed outright.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Resolve a formatted address for `point`.
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Option<String>, RoutingError>;

    /// Route from `origin` to `destination` using `mode`.
    async fn directions(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<Option<RouteLeg>, RoutingError>;

    /// Estimates for every origin/destination pair using `mode`.
    async fn distance_matrix(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
        mode: TravelMode,
    ) -> Result<TravelTimeMatrix, RoutingError>;

    /// Venues of `category` within `radius_meters` of `point`, in relevance
    /// order.
    async fn nearby_places(
        &self,
        point: GeoPoint,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<Candidate>, RoutingError>;
}

#[async_trait]
impl<P> RoutingProvider for Arc<P>
where
    P: RoutingProvider + ?Sized,
{
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Option<String>, RoutingError> {
        (**self).reverse_geocode(point).await
    }

    async fn directions(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<Option<RouteLeg>, RoutingError> {
        (**self).directions(origin, destination, mode).await
    }

    async fn distance_matrix(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
        mode: TravelMode,
    ) -> Result<TravelTimeMatrix, RoutingError> {
        (**self).distance_matrix(origins, destinations, mode).await
    }

    async fn nearby_places(
        &self,
        point: GeoPoint,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<Candidate>, RoutingError> {
        (**self).nearby_places(point, radius_meters, category).await
    }
}
