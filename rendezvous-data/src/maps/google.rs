//! Response types for the Google Maps web services.
//!
//! Only the fields the engine reads are modelled; everything else in the
//! payloads is ignored.
//!
//! See: <https://developers.google.com/maps/documentation>

use std::time::Duration;

use log::warn;
use rendezvous_core::routing::{RouteLeg, TravelEstimate, TravelTimeMatrix};
use rendezvous_core::{Candidate, GeoPoint, RoutingError};
use serde::Deserialize;

/// Whether a response status carries data.
///
/// `OK` does; `ZERO_RESULTS` and `NOT_FOUND` are valid empty answers. Every
/// other status is a rejection of the request.
fn has_results(status: &str, error_message: Option<String>) -> Result<bool, RoutingError> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
        other => Err(RoutingError::ServiceError {
            status: other.to_owned(),
            message: error_message.unwrap_or_default(),
        }),
    }
}

/// A `{ "value": n }` quantity: seconds for durations, metres for distances.
#[derive(Debug, Deserialize)]
pub struct Measure {
    pub value: u64,
}

/// Reverse geocoding response.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
}

impl GeocodeResponse {
    /// The most specific formatted address, if any.
    pub fn into_address(self) -> Result<Option<String>, RoutingError> {
        if !has_results(&self.status, self.error_message)? {
            return Ok(None);
        }
        Ok(self
            .results
            .into_iter()
            .next()
            .map(|result| result.formatted_address))
    }
}

/// Directions response.
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    pub overview_polyline: Polyline,
    #[serde(default)]
    pub legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
pub struct Polyline {
    pub points: String,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsLeg {
    pub duration: Measure,
    pub distance: Measure,
}

impl DirectionsResponse {
    /// The first route, with its legs summed.
    pub fn into_leg(self) -> Result<Option<RouteLeg>, RoutingError> {
        if !has_results(&self.status, self.error_message)? {
            return Ok(None);
        }
        let Some(route) = self.routes.into_iter().next() else {
            return Ok(None);
        };
        if route.legs.is_empty() {
            return Err(RoutingError::ParseError {
                message: "directions route has no legs".to_owned(),
            });
        }
        let (seconds, metres) = route.legs.iter().fold((0_u64, 0_u64), |(s, m), leg| {
            (
                s.saturating_add(leg.duration.value),
                m.saturating_add(leg.distance.value),
            )
        });
        Ok(Some(RouteLeg {
            duration: Duration::from_secs(seconds),
            distance_meters: metres,
            polyline: route.overview_polyline.points,
        }))
    }
}

/// Distance-matrix response.
#[derive(Debug, Deserialize)]
pub struct DistanceMatrixResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    pub status: String,
    pub duration: Option<Measure>,
    pub distance: Option<Measure>,
}

impl MatrixElement {
    fn into_estimate(self) -> Option<TravelEstimate> {
        if self.status != "OK" {
            return None;
        }
        let duration = self.duration?;
        Some(TravelEstimate {
            duration: Duration::from_secs(duration.value),
            distance_meters: self.distance.map_or(0, |distance| distance.value),
        })
    }
}

impl DistanceMatrixResponse {
    /// Row-major estimates; cells without an `OK` element status are `None`.
    pub fn into_matrix(self) -> Result<TravelTimeMatrix, RoutingError> {
        if !has_results(&self.status, self.error_message)? {
            return Ok(Vec::new());
        }
        Ok(self
            .rows
            .into_iter()
            .map(|row| {
                row.elements
                    .into_iter()
                    .map(MatrixElement::into_estimate)
                    .collect()
            })
            .collect())
    }
}

/// Nearby-places search response.
#[derive(Debug, Deserialize)]
pub struct PlacesResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    pub geometry: Geometry,
    pub vicinity: Option<String>,
    pub formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl PlacesResponse {
    /// Candidates in service order. Places with invalid coordinates are
    /// skipped.
    pub fn into_candidates(self) -> Result<Vec<Candidate>, RoutingError> {
        if !has_results(&self.status, self.error_message)? {
            return Ok(Vec::new());
        }
        Ok(self
            .results
            .into_iter()
            .filter_map(|place| {
                let LatLng { lat, lng } = place.geometry.location;
                match GeoPoint::new(lat, lng) {
                    Ok(point) => Some(Candidate {
                        place_id: place.place_id,
                        name: place.name,
                        point,
                        address: place.vicinity.or(place.formatted_address),
                    }),
                    Err(err) => {
                        warn!("skipping place {}: {err}", place.place_id);
                        None
                    }
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).expect("should deserialise")
    }

    #[rstest]
    fn geocode_takes_first_address() {
        let response: GeocodeResponse = parse(
            r#"{"status": "OK", "results": [
                {"formatted_address": "1 Main St"},
                {"formatted_address": "Main St"}
            ]}"#,
        );
        assert_eq!(
            response.into_address().expect("ok"),
            Some("1 Main St".to_owned())
        );
    }

    #[rstest]
    #[case("ZERO_RESULTS")]
    #[case("NOT_FOUND")]
    fn empty_statuses_are_not_errors(#[case] status: &str) {
        let response: GeocodeResponse = parse(&format!(r#"{{"status": "{status}"}}"#));
        assert_eq!(response.into_address().expect("ok"), None);
    }

    #[rstest]
    fn rejected_requests_are_service_errors() {
        let response: PlacesResponse = parse(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#,
        );
        let err = response.into_candidates().expect_err("denied");
        assert_eq!(
            err,
            RoutingError::ServiceError {
                status: "REQUEST_DENIED".to_owned(),
                message: "The provided API key is invalid.".to_owned(),
            }
        );
    }

    #[rstest]
    fn directions_sum_legs_of_the_first_route() {
        let response: DirectionsResponse = parse(
            r#"{"status": "OK", "routes": [{
                "overview_polyline": {"points": "_p~iF~ps|U"},
                "legs": [
                    {"duration": {"value": 600, "text": "10 mins"}, "distance": {"value": 4000}},
                    {"duration": {"value": 120}, "distance": {"value": 500}}
                ]
            }]}"#,
        );
        let leg = response.into_leg().expect("ok").expect("route");
        assert_eq!(leg.duration, Duration::from_secs(720));
        assert_eq!(leg.distance_meters, 4_500);
        assert_eq!(leg.polyline, "_p~iF~ps|U");
    }

    #[rstest]
    fn directions_without_routes_are_unresolved() {
        let response: DirectionsResponse = parse(r#"{"status": "OK", "routes": []}"#);
        assert_eq!(response.into_leg().expect("ok"), None);
    }

    #[rstest]
    fn matrix_resolves_cells_individually() {
        let response: DistanceMatrixResponse = parse(
            r#"{"status": "OK", "rows": [{"elements": [
                {"status": "OK", "duration": {"value": 300}, "distance": {"value": 2500}},
                {"status": "ZERO_RESULTS"},
                {"status": "NOT_FOUND"}
            ]}]}"#,
        );
        let matrix = response.into_matrix().expect("ok");
        assert_eq!(matrix.len(), 1);
        assert_eq!(
            matrix[0],
            vec![
                Some(TravelEstimate {
                    duration: Duration::from_secs(300),
                    distance_meters: 2_500,
                }),
                None,
                None,
            ]
        );
    }

    #[rstest]
    fn places_prefer_vicinity_and_skip_invalid_coordinates() {
        let response: PlacesResponse = parse(
            r#"{"status": "OK", "results": [
                {"place_id": "a", "name": "Cafe A", "vicinity": "Near the park",
                 "formatted_address": "1 Park Rd", "geometry": {"location": {"lat": 25.03, "lng": 121.56}}},
                {"place_id": "b", "name": "Broken", "geometry": {"location": {"lat": 95.0, "lng": 0.0}}},
                {"place_id": "c", "name": "Cafe C", "formatted_address": "3 Hill St",
                 "geometry": {"location": {"lat": 25.04, "lng": 121.55}}}
            ]}"#,
        );
        let candidates = response.into_candidates().expect("ok");
        let summary: Vec<(&str, Option<&str>)> = candidates
            .iter()
            .map(|c| (c.place_id.as_str(), c.address.as_deref()))
            .collect();
        assert_eq!(
            summary,
            [("a", Some("Near the park")), ("c", Some("3 Hill St"))]
        );
    }
}
