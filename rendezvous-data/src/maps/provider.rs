//! HTTP `RoutingProvider` for Google-Maps-style web services.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use rendezvous_core::routing::{RouteLeg, TravelTimeMatrix};
use rendezvous_core::{Candidate, GeoPoint, RoutingError, RoutingProvider, TravelMode};
use serde::de::DeserializeOwned;

use super::google::{DirectionsResponse, DistanceMatrixResponse, GeocodeResponse, PlacesResponse};

/// Error type for [`HttpRoutingProvider`] construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// No API key was configured.
    MissingApiKey,
}

impl fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::MissingApiKey => f.write_str("a maps API key is required"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::MissingApiKey => None,
        }
    }
}

/// Default base URL of the web services.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Default user agent for requests.
pub const DEFAULT_USER_AGENT: &str = "rendezvous-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`HttpRoutingProvider`].
#[derive(Clone)]
pub struct HttpRoutingProviderConfig {
    /// Base URL of the services, e.g. `"https://maps.googleapis.com/maps/api"`.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl fmt::Debug for HttpRoutingProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRoutingProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpRoutingProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpRoutingProviderConfig {
    /// Create a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the base URL, e.g. to target a proxy or a test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Routing and places provider backed by HTTP JSON services.
///
/// Each trait method issues exactly one request. The API key is sent as a
/// query parameter and is stripped from every error before it is returned.
#[derive(Debug)]
pub struct HttpRoutingProvider {
    client: Client,
    config: HttpRoutingProviderConfig,
}

impl HttpRoutingProvider {
    /// Create a provider for the default service with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the HTTP client fails to
    /// build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRoutingProviderConfig::new(api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the HTTP client fails to
    /// build.
    pub fn with_config(config: HttpRoutingProviderConfig) -> Result<Self, ProviderBuildError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderBuildError::MissingApiKey);
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self { client, config })
    }

    /// Endpoint URL for `service`, e.g. `{base_url}/directions/json`.
    fn endpoint(&self, service: &str) -> String {
        format!(
            "{}/{service}/json",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Issue a GET request to `service` and decode the JSON body.
    async fn fetch<T>(&self, service: &str, params: &[(&str, String)]) -> Result<T, RoutingError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(service);
        debug!("requesting {url}");
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, &url))?;

        response
            .json::<T>()
            .await
            .map_err(|err| RoutingError::ParseError {
                message: err.without_url().to_string(),
            })
    }

    /// Convert a reqwest error to a `RoutingError`.
    ///
    /// `url` is the endpoint without query parameters, and the error's own
    /// URL is dropped, so the API key cannot leak.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> RoutingError {
        if error.is_timeout() {
            return RoutingError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RoutingError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.without_url().to_string(),
            };
        }

        RoutingError::NetworkError {
            url: url.to_owned(),
            message: error.without_url().to_string(),
        }
    }
}

/// `lat,lng` as the services expect it.
fn latlng(point: GeoPoint) -> String {
    format!("{},{}", point.lat, point.lng)
}

/// Points joined with `|` for multi-location parameters.
fn latlng_list(points: &[GeoPoint]) -> String {
    points
        .iter()
        .map(|&point| latlng(point))
        .collect::<Vec<_>>()
        .join("|")
}

#[async_trait]
impl RoutingProvider for HttpRoutingProvider {
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Option<String>, RoutingError> {
        let response: GeocodeResponse = self
            .fetch("geocode", &[("latlng", latlng(point))])
            .await?;
        response.into_address()
    }

    async fn directions(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<Option<RouteLeg>, RoutingError> {
        let response: DirectionsResponse = self
            .fetch(
                "directions",
                &[
                    ("origin", latlng(origin)),
                    ("destination", latlng(destination)),
                    ("mode", mode.as_str().to_owned()),
                ],
            )
            .await?;
        response.into_leg()
    }

    async fn distance_matrix(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
        mode: TravelMode,
    ) -> Result<TravelTimeMatrix, RoutingError> {
        if origins.is_empty() || destinations.is_empty() {
            return Ok(vec![Vec::new(); origins.len()]);
        }
        let response: DistanceMatrixResponse = self
            .fetch(
                "distancematrix",
                &[
                    ("origins", latlng_list(origins)),
                    ("destinations", latlng_list(destinations)),
                    ("mode", mode.as_str().to_owned()),
                ],
            )
            .await?;
        response.into_matrix()
    }

    async fn nearby_places(
        &self,
        point: GeoPoint,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<Candidate>, RoutingError> {
        let response: PlacesResponse = self
            .fetch(
                "place/nearbysearch",
                &[
                    ("location", latlng(point)),
                    ("radius", radius_meters.to_string()),
                    ("type", category.to_owned()),
                ],
            )
            .await?;
        response.into_candidates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn endpoint_strips_trailing_slash() {
        let config = HttpRoutingProviderConfig::new("key").with_base_url("http://maps.example.com/api/");
        let provider = HttpRoutingProvider::with_config(config).expect("provider should build");

        assert_eq!(
            provider.endpoint("place/nearbysearch"),
            "http://maps.example.com/api/place/nearbysearch/json"
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_api_key_is_rejected(#[case] key: &str) {
        let err = HttpRoutingProvider::new(key).expect_err("should fail");
        assert!(matches!(err, ProviderBuildError::MissingApiKey));
    }

    #[rstest]
    fn debug_output_redacts_the_key() {
        let config = HttpRoutingProviderConfig::new("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    fn points_are_formatted_lat_first() {
        let points = [
            GeoPoint::new(25.03, 121.56).expect("valid"),
            GeoPoint::new(-33.5, 151.0).expect("valid"),
        ];
        assert_eq!(latlng_list(&points), "25.03,121.56|-33.5,151");
    }

    #[rstest]
    fn empty_matrix_requests_skip_the_network() {
        let config =
            HttpRoutingProviderConfig::new("key").with_base_url("http://127.0.0.1:9/unreachable");
        let provider = HttpRoutingProvider::with_config(config).expect("provider should build");
        let origin = GeoPoint::new(25.03, 121.56).expect("valid");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime should build");

        let matrix = runtime
            .block_on(provider.distance_matrix(&[origin], &[], TravelMode::Driving))
            .expect("no request needed");

        assert_eq!(matrix, vec![Vec::new()]);
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpRoutingProviderConfig::new("key")
            .with_base_url("http://example.com")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }
}
