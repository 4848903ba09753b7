//! Deterministic routing provider for unit and behaviour tests.
//!
//! [`HaversineRoutingProvider`] derives travel times from great-circle
//! distance and a fixed speed per travel mode, so tests can reason about
//! results without a routing service. It counts calls per service and can
//! simulate missing transit coverage or a provider outage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::routing::{RouteLeg, RoutingError, RoutingProvider, TravelEstimate, TravelTimeMatrix};
use crate::{Candidate, GeoPoint, TravelMode};

/// Stub `RoutingProvider` backed by straight-line distances.
#[derive(Debug, Default)]
pub struct HaversineRoutingProvider {
    venues: Vec<Candidate>,
    unreachable: Vec<(GeoPoint, TravelMode)>,
    closed: Vec<GeoPoint>,
    offline: bool,
    geocode_calls: AtomicUsize,
    directions_calls: AtomicUsize,
    matrix_calls: AtomicUsize,
    places_calls: AtomicUsize,
}

impl HaversineRoutingProvider {
    /// Venues returned by places searches, filtered by search radius.
    #[must_use]
    pub fn with_venues<I>(mut self, venues: I) -> Self
    where
        I: IntoIterator<Item = Candidate>,
    {
        self.venues.extend(venues);
        self
    }

    /// Report "no route" for every query from `origin` using `mode`.
    #[must_use]
    pub fn with_unreachable(mut self, origin: GeoPoint, mode: TravelMode) -> Self {
        self.unreachable.push((origin, mode));
        self
    }

    /// Report "no route" for every query ending at `destination`.
    #[must_use]
    pub fn with_unreachable_destination(mut self, destination: GeoPoint) -> Self {
        self.closed.push(destination);
        self
    }

    /// Fail every call with a network error.
    #[must_use]
    pub const fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Number of reverse-geocoding calls received.
    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    /// Number of directions calls received.
    pub fn directions_calls(&self) -> usize {
        self.directions_calls.load(Ordering::SeqCst)
    }

    /// Number of distance-matrix calls received.
    pub fn matrix_calls(&self) -> usize {
        self.matrix_calls.load(Ordering::SeqCst)
    }

    /// Number of places searches received.
    pub fn places_calls(&self) -> usize {
        self.places_calls.load(Ordering::SeqCst)
    }

    /// Calls received across every service.
    pub fn total_calls(&self) -> usize {
        self.geocode_calls() + self.directions_calls() + self.matrix_calls() + self.places_calls()
    }

    /// Estimate this provider reports for a reachable pair.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "stub estimates are derived from floating-point distances"
    )]
    pub fn estimate(origin: GeoPoint, destination: GeoPoint, mode: TravelMode) -> TravelEstimate {
        let metres = origin.haversine_distance(destination);
        let metres_per_second = speed_kmh(mode) / 3.6;
        TravelEstimate {
            duration: Duration::from_secs((metres / metres_per_second).round() as u64),
            distance_meters: metres.round() as u64,
        }
    }

    fn is_unreachable(&self, origin: GeoPoint, mode: TravelMode) -> bool {
        self.unreachable
            .iter()
            .any(|&(point, blocked)| point == origin && blocked == mode)
    }

    fn routes(&self, origin: GeoPoint, destination: GeoPoint, mode: TravelMode) -> bool {
        !self.is_unreachable(origin, mode) && !self.closed.contains(&destination)
    }

    fn check_online(&self, service: &str) -> Result<(), RoutingError> {
        if self.offline {
            return Err(RoutingError::NetworkError {
                url: format!("stub://{service}"),
                message: "connection refused".to_owned(),
            });
        }
        Ok(())
    }
}

const fn speed_kmh(mode: TravelMode) -> f64 {
    match mode {
        TravelMode::Driving => 40.0,
        TravelMode::Walking => 5.0,
        TravelMode::Transit => 25.0,
        TravelMode::Bicycling => 15.0,
    }
}

/// Build a venue at `lat`/`lng`.
///
/// # Panics
///
/// Panics when the coordinates are out of range.
#[must_use]
#[expect(clippy::expect_used, reason = "test fixtures use literal coordinates")]
pub fn venue(place_id: &str, name: &str, lat: f64, lng: f64) -> Candidate {
    Candidate {
        place_id: place_id.to_owned(),
        name: name.to_owned(),
        point: GeoPoint::new(lat, lng).expect("fixture coordinates must be valid"),
        address: Some(format!("{name}, {lat:.4}, {lng:.4}")),
    }
}

#[async_trait]
impl RoutingProvider for HaversineRoutingProvider {
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Option<String>, RoutingError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online("geocode")?;
        Ok(Some(format!("Near {:.4}, {:.4}", point.lat, point.lng)))
    }

    async fn directions(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<Option<RouteLeg>, RoutingError> {
        self.directions_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online("directions")?;
        if !self.routes(origin, destination, mode) {
            return Ok(None);
        }
        let estimate = Self::estimate(origin, destination, mode);
        Ok(Some(RouteLeg {
            duration: estimate.duration,
            distance_meters: estimate.distance_meters,
            polyline: format!("{origin};{destination}"),
        }))
    }

    async fn distance_matrix(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
        mode: TravelMode,
    ) -> Result<TravelTimeMatrix, RoutingError> {
        self.matrix_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online("distancematrix")?;
        Ok(origins
            .iter()
            .map(|&origin| {
                destinations
                    .iter()
                    .map(|&destination| {
                        self.routes(origin, destination, mode)
                            .then(|| Self::estimate(origin, destination, mode))
                    })
                    .collect()
            })
            .collect())
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "radius filtering compares floating-point distances"
    )]
    async fn nearby_places(
        &self,
        point: GeoPoint,
        radius_meters: u32,
        _category: &str,
    ) -> Result<Vec<Candidate>, RoutingError> {
        self.places_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online("place/nearbysearch")?;
        let radius = f64::from(radius_meters);
        Ok(self
            .venues
            .iter()
            .filter(|venue| venue.point.haversine_distance(point) <= radius)
            .cloned()
            .collect())
    }
}
