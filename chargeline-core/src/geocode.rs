//! Resolve free-text place names to coordinates.

use geo::Coord;
use thiserror::Error;

/// Best match returned by a [`Geocoder`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeocodedPlace {
    /// Display label chosen by the geocoding service.
    pub label: String,
    /// Resolved position.
    pub location: Coord<f64>,
}

impl GeocodedPlace {
    /// Pair a label with its position.
    #[must_use]
    pub fn new(label: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            label: label.into(),
            location,
        }
    }
}

/// Errors from [`Geocoder::geocode`].
///
/// A query that simply matches nothing is not an error; geocoders report it as
/// `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The query was blank.
    #[error("geocoding query must not be empty")]
    EmptyQuery,

    /// The HTTP request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// The timeout duration in seconds.
        timeout_secs: u64,
    },

    /// The HTTP request returned an error status code.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Error message from the response or reqwest.
        message: String,
    },

    /// A network error occurred.
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// The URL that was requested.
        url: String,
        /// Description of the network error.
        message: String,
    },

    /// The response could not be parsed.
    #[error("failed to parse geocoding response: {message}")]
    ParseError {
        /// Description of the parse failure.
        message: String,
    },
}

/// Look up the best match for a free-text query.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use chargeline_core::{GeocodeError, GeocodedPlace, Geocoder};
///
/// struct Origin;
///
/// impl Geocoder for Origin {
///     fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
///         Ok((query == "null island")
///             .then(|| GeocodedPlace::new("Null Island", Coord { x: 0.0, y: 0.0 })))
///     }
/// }
///
/// assert!(Origin.geocode("null island")?.is_some());
/// assert!(Origin.geocode("atlantis")?.is_none());
/// # Ok::<(), GeocodeError>(())
/// ```
pub trait Geocoder {
    /// Resolve `query` to a place, or `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when the lookup itself fails.
    fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;
}

impl<T> Geocoder for &T
where
    T: Geocoder + ?Sized,
{
    fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        (**self).geocode(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::test_support::StubGeocoder;

    #[rstest]
    fn known_places_resolve() {
        let geocoder =
            StubGeocoder::default().with_place("Leeds", Coord { x: -1.55, y: 53.8 });
        let place = geocoder
            .geocode("Leeds")
            .expect("stub lookups succeed")
            .expect("Leeds is registered");
        assert_eq!(place.label, "Leeds");
    }

    #[rstest]
    fn unknown_places_are_not_errors() {
        let geocoder = StubGeocoder::default();
        assert_eq!(geocoder.geocode("Atlantis"), Ok(None));
    }

    #[rstest]
    fn blank_queries_are_rejected() {
        let geocoder = StubGeocoder::default();
        assert_eq!(geocoder.geocode("  "), Err(GeocodeError::EmptyQuery));
    }
}
