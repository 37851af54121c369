//! HTTP-based `Geocoder` using Nominatim's search endpoint.

use std::time::Duration;

use chargeline_core::{GeocodeError, GeocodedPlace, Geocoder};
use url::Url;

use super::nominatim::SearchResult;
use crate::ProviderBuildError;
use crate::http::{BlockingClient, RequestFailure, classify};

/// Default user agent for geocoding requests.
///
/// Nominatim's usage policy requires an identifying user agent.
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "chargeline-geocoder/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`HttpGeocoder`].
#[derive(Debug, Clone)]
pub struct HttpGeocoderConfig {
    /// Base URL of the Nominatim service.
    pub base_url: String,
    /// Restrict matches to these ISO 3166-1 alpha-2 country codes.
    pub country_codes: Vec<String>,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_owned(),
            country_codes: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_GEOCODER_USER_AGENT.to_owned(),
        }
    }
}

impl HttpGeocoderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Restrict matches to the given country codes.
    #[must_use]
    pub fn with_country_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.country_codes = codes.into_iter().map(Into::into).collect();
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

/// Geocoder backed by a Nominatim search endpoint.
#[derive(Debug)]
pub struct HttpGeocoder {
    http: BlockingClient,
    config: HttpGeocoderConfig,
}

impl HttpGeocoder {
    /// Create a geocoder with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpGeocoderConfig::new(base_url))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let http = BlockingClient::build(config.timeout, &config.user_agent)?;
        Ok(Self { http, config })
    }

    fn build_search_url(&self, query: &str) -> Result<Url, GeocodeError> {
        let endpoint = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&endpoint).map_err(|err| GeocodeError::ParseError {
            message: format!("invalid geocoder URL {endpoint:?}: {err}"),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("format", "jsonv2")
                .append_pair("limit", "1");
            if !self.config.country_codes.is_empty() {
                pairs.append_pair("countrycodes", &self.config.country_codes.join(","));
            }
        }
        Ok(url)
    }

    async fn search_async(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let url = self.build_search_url(query)?;
        let results: Vec<SearchResult> = self
            .http
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?
            .json()
            .await
            .map_err(|err| GeocodeError::ParseError {
                message: err.to_string(),
            })?;

        results
            .into_iter()
            .next()
            .map(SearchResult::into_place)
            .transpose()
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> GeocodeError {
        match classify(error) {
            RequestFailure::Timeout => GeocodeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            },
            RequestFailure::Status(status) => GeocodeError::HttpError {
                url: url.to_owned(),
                status,
                message: error.to_string(),
            },
            RequestFailure::Network => GeocodeError::NetworkError {
                url: url.to_owned(),
                message: error.to_string(),
            },
        }
    }
}

impl Geocoder for HttpGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }
        self.http.block_on(self.search_async(query))
    }
}
