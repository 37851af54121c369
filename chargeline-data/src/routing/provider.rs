//! HTTP-based `DirectionsProvider` using OSRM's Route API.
//!
//! The [`DirectionsProvider`] trait is synchronous to keep the engine
//! embeddable in synchronous contexts. This provider bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.
//!
//! OSRM only computes alternatives between two coordinates, so requests for
//! alternatives through via points are refused with
//! [`DirectionsError::AlternativesUnsupported`] before any HTTP call is made.

use std::time::Duration;

use chargeline_core::{DirectionsError, DirectionsProvider, DirectionsRoute};
use geo::Coord;

use super::osrm::RouteResponse;
use crate::http::{BlockingClient, RequestFailure, classify};
use crate::ProviderBuildError;

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "chargeline-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpDirectionsProvider`].
#[derive(Debug, Clone)]
pub struct HttpDirectionsProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile segment of the URL.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpDirectionsProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            profile: "driving".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpDirectionsProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
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

/// HTTP-based directions provider using the OSRM Route API.
///
/// The provider owns a Tokio runtime that is reused across calls. When called
/// from within a multi-threaded Tokio runtime it borrows that runtime through
/// [`tokio::task::block_in_place`] instead.
#[derive(Debug)]
pub struct HttpDirectionsProvider {
    http: BlockingClient,
    config: HttpDirectionsProviderConfig,
}

impl HttpDirectionsProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpDirectionsProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpDirectionsProviderConfig) -> Result<Self, ProviderBuildError> {
        let http = BlockingClient::build(config.timeout, &config.user_agent)?;
        Ok(Self { http, config })
    }

    /// Build the OSRM Route API URL.
    ///
    /// The format is `{base_url}/route/v1/{profile}/{coordinates}` followed by
    /// the query options, where coordinates are semicolon-separated
    /// `lon,lat` pairs.
    fn build_route_url(&self, waypoints: &[Coord<f64>], alternatives: bool) -> String {
        let coords = waypoints
            .iter()
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?alternatives={}&geometries=geojson&overview=full&steps=false",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords,
            alternatives
        )
    }

    async fn fetch_routes_async(
        &self,
        waypoints: &[Coord<f64>],
        alternatives: bool,
    ) -> Result<Vec<DirectionsRoute>, DirectionsError> {
        let url = self.build_route_url(waypoints, alternatives);
        log::debug!("requesting {} waypoint route from {url}", waypoints.len());

        let response = self
            .http
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        // OSRM reports routing failures such as `NoRoute` with a 400 status
        // and a JSON body, so the body is inspected before the status.
        match serde_json::from_str::<RouteResponse>(&body) {
            Ok(parsed) => Self::convert_response(parsed, alternatives),
            Err(_) if !status.is_success() => Err(DirectionsError::HttpError {
                url,
                status: status.as_u16(),
                message: body,
            }),
            Err(err) => Err(DirectionsError::ParseError {
                message: err.to_string(),
            }),
        }
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> DirectionsError {
        match classify(error) {
            RequestFailure::Timeout => DirectionsError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            },
            RequestFailure::Status(status) => DirectionsError::HttpError {
                url: url.to_owned(),
                status,
                message: error.to_string(),
            },
            RequestFailure::Network => DirectionsError::NetworkError {
                url: url.to_owned(),
                message: error.to_string(),
            },
        }
    }

    fn convert_response(
        response: RouteResponse,
        alternatives: bool,
    ) -> Result<Vec<DirectionsRoute>, DirectionsError> {
        if !response.is_ok() {
            let message = response.message.unwrap_or_default();
            return Err(match response.code.as_str() {
                "NoRoute" | "NoSegment" => DirectionsError::NoRoute { message },
                "InvalidOptions" if alternatives => {
                    DirectionsError::AlternativesUnsupported { message }
                }
                _ => DirectionsError::ServiceError {
                    code: response.code,
                    message,
                },
            });
        }

        let limit = if alternatives { usize::MAX } else { 1 };
        let routes: Vec<DirectionsRoute> = response
            .routes
            .into_iter()
            .take(limit)
            .map(|route| {
                let coordinates = route
                    .geometry
                    .coordinates
                    .into_iter()
                    .map(|[x, y]| Coord { x, y })
                    .collect();
                DirectionsRoute::new(coordinates, route.distance, route.duration)
            })
            .collect();

        if routes.is_empty() {
            return Err(DirectionsError::NoRoute {
                message: "OSRM response contained no routes".to_owned(),
            });
        }
        Ok(routes)
    }
}

impl DirectionsProvider for HttpDirectionsProvider {
    fn directions(
        &self,
        waypoints: &[Coord<f64>],
        alternatives: bool,
    ) -> Result<Vec<DirectionsRoute>, DirectionsError> {
        if waypoints.len() < 2 {
            return Err(DirectionsError::TooFewWaypoints {
                found: waypoints.len(),
            });
        }
        if alternatives && waypoints.len() > 2 {
            return Err(DirectionsError::AlternativesUnsupported {
                message: format!(
                    "OSRM computes alternatives between two coordinates, got {}",
                    waypoints.len()
                ),
            });
        }

        self.http
            .block_on(self.fetch_routes_async(waypoints, alternatives))
    }
}
