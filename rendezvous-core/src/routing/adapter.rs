//! Per-cell failure isolation and the transit-to-driving fallback policy.

use futures_util::future::join_all;
use log::{debug, warn};
use thiserror::Error;

use crate::{Candidate, GeoPoint, TravelMode};

use super::error::RoutingError;
use super::provider::{RouteLeg, RoutingProvider, TravelEstimate};

/// Why a single routing query produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unresolved {
    /// The service answered but found no route or result.
    #[error("no result available")]
    NoResult,
    /// The call itself failed.
    #[error(transparent)]
    Failed(#[from] RoutingError),
}

impl Unresolved {
    /// The underlying call failure, if the service was not reachable.
    #[must_use]
    pub const fn failure(&self) -> Option<&RoutingError> {
        match self {
            Self::NoResult => None,
            Self::Failed(err) => Some(err),
        }
    }
}

/// Outcome of one routing query.
pub type Resolution<T> = Result<T, Unresolved>;

/// A resolved value tagged with the travel mode that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed<T> {
    /// The resolved value.
    pub value: T,
    /// Mode used; differs from the requested mode after a fallback.
    pub mode: TravelMode,
}

/// Wraps a [`RoutingProvider`] with the engine's query policy.
#[derive(Debug, Clone)]
pub struct RoutingAdapter<P> {
    provider: P,
}

impl<P> RoutingAdapter<P>
where
    P: RoutingProvider,
{
    /// Wrap `provider`.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Access the wrapped provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Formatted address for `point`.
    pub async fn reverse_geocode(&self, point: GeoPoint) -> Resolution<String> {
        match self.provider.reverse_geocode(point).await {
            Ok(Some(address)) => Ok(address),
            Ok(None) => Err(Unresolved::NoResult),
            Err(err) => {
                warn!("reverse geocoding {point} failed: {err}");
                Err(Unresolved::Failed(err))
            }
        }
    }

    /// Route from `origin` to `destination`, falling back from transit to
    /// driving when transit cannot route the pair.
    pub async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Resolution<Routed<RouteLeg>> {
        let first = self.directions_once(origin, destination, mode).await;
        match (first, mode.fallback()) {
            (Err(unresolved), Some(fallback)) => {
                warn!(
                    "{mode} route {origin} -> {destination} unresolved ({unresolved}); retrying with {fallback}"
                );
                self.directions_once(origin, destination, fallback)
                    .await
                    .map(|leg| Routed {
                        value: leg,
                        mode: fallback,
                    })
            }
            (result, _) => result.map(|leg| Routed { value: leg, mode }),
        }
    }

    /// Travel time from `origin` to `destination`, with fallback.
    pub async fn travel_time(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Resolution<Routed<TravelEstimate>> {
        self.route(origin, destination, mode)
            .await
            .map(|routed| Routed {
                value: routed.value.estimate(),
                mode: routed.mode,
            })
    }

    /// Travel time in exactly `mode`, with no fallback. Issues one
    /// directions query.
    pub async fn travel_time_in_mode(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Resolution<Routed<TravelEstimate>> {
        self.directions_once(origin, destination, mode)
            .await
            .map(|leg| Routed {
                value: leg.estimate(),
                mode,
            })
    }

    /// Travel times from every origin to a shared `destination`.
    ///
    /// One query per origin, issued concurrently. The result has one entry
    /// per origin in input order.
    pub async fn travel_times_to(
        &self,
        origins: &[(GeoPoint, TravelMode)],
        destination: GeoPoint,
    ) -> Vec<Resolution<Routed<TravelEstimate>>> {
        join_all(
            origins
                .iter()
                .map(|&(origin, mode)| self.travel_time(origin, destination, mode)),
        )
        .await
    }

    /// Routes from every origin to a shared `destination`, issued
    /// concurrently and returned in input order.
    pub async fn routes_to(
        &self,
        origins: &[(GeoPoint, TravelMode)],
        destination: GeoPoint,
    ) -> Vec<Resolution<Routed<RouteLeg>>> {
        join_all(
            origins
                .iter()
                .map(|&(origin, mode)| self.route(origin, destination, mode)),
        )
        .await
    }

    /// Matrix of travel times from `origins` to `destinations`.
    ///
    /// The result always has `origins.len()` rows of `destinations.len()`
    /// cells, whatever shape the provider returned. For transit, every
    /// unresolved cell is retried with driving; retries are batched into one
    /// query per affected origin.
    pub async fn travel_time_matrix(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
        mode: TravelMode,
    ) -> Vec<Vec<Resolution<Routed<TravelEstimate>>>> {
        let mut matrix = self.matrix_once(origins, destinations, mode).await;
        let Some(fallback) = mode.fallback() else {
            return matrix;
        };

        for (origin, row) in origins.iter().zip(matrix.iter_mut()) {
            let unresolved: Vec<usize> = row
                .iter()
                .enumerate()
                .filter_map(|(index, cell)| cell.is_err().then_some(index))
                .collect();
            if unresolved.is_empty() {
                continue;
            }
            let retry_destinations: Vec<GeoPoint> = unresolved
                .iter()
                .filter_map(|&index| destinations.get(index).copied())
                .collect();
            warn!(
                "{} of {} {mode} cells from {origin} unresolved; retrying with {fallback}",
                unresolved.len(),
                destinations.len()
            );
            let retried = self
                .matrix_once(std::slice::from_ref(origin), &retry_destinations, fallback)
                .await
                .into_iter()
                .next()
                .unwrap_or_default();
            for (index, cell) in unresolved.into_iter().zip(retried) {
                if let Some(slot) = row.get_mut(index) {
                    *slot = cell;
                }
            }
        }
        matrix
    }

    /// Venues near `point`. A failed search is returned as an error because
    /// there is no per-cell structure to isolate it in.
    pub async fn nearby_places(
        &self,
        point: GeoPoint,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<Candidate>, RoutingError> {
        let places = self
            .provider
            .nearby_places(point, radius_meters, category)
            .await
            .inspect_err(|err| warn!("nearby {category} search around {point} failed: {err}"))?;
        debug!(
            "nearby {category} search around {point} returned {} places",
            places.len()
        );
        Ok(places)
    }

    async fn directions_once(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Resolution<RouteLeg> {
        match self.provider.directions(origin, destination, mode).await {
            Ok(Some(leg)) => Ok(leg),
            Ok(None) => Err(Unresolved::NoResult),
            Err(err) => {
                warn!("{mode} directions {origin} -> {destination} failed: {err}");
                Err(Unresolved::Failed(err))
            }
        }
    }

    async fn matrix_once(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
        mode: TravelMode,
    ) -> Vec<Vec<Resolution<Routed<TravelEstimate>>>> {
        match self
            .provider
            .distance_matrix(origins, destinations, mode)
            .await
        {
            Ok(matrix) => (0..origins.len())
                .map(|row_index| {
                    let row = matrix.get(row_index);
                    (0..destinations.len())
                        .map(|column| {
                            row.and_then(|cells| cells.get(column))
                                .copied()
                                .flatten()
                                .map(|value| Routed { value, mode })
                                .ok_or(Unresolved::NoResult)
                        })
                        .collect()
                })
                .collect(),
            Err(err) => {
                warn!(
                    "{mode} distance matrix {}x{} failed: {err}",
                    origins.len(),
                    destinations.len()
                );
                let failed: Resolution<Routed<TravelEstimate>> = Err(Unresolved::Failed(err));
                vec![vec![failed; destinations.len()]; origins.len()]
            }
        }
    }
}
