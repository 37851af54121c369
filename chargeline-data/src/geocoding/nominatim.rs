//! Nominatim search response types.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use chargeline_core::{GeocodeError, GeocodedPlace};
use geo::Coord;
use serde::Deserialize;

/// One entry of a `format=jsonv2` search response.
///
/// Nominatim encodes coordinates as decimal strings.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    /// Human-readable address of the match.
    pub display_name: String,
    /// Latitude as a decimal string.
    pub lat: String,
    /// Longitude as a decimal string.
    pub lon: String,
}

impl SearchResult {
    pub fn into_place(self) -> Result<GeocodedPlace, GeocodeError> {
        let parse = |value: &str, axis: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| GeocodeError::ParseError {
                    message: format!("invalid {axis} {value:?} for {}", self.display_name),
                })
        };
        let location = Coord {
            x: parse(&self.lon, "longitude")?,
            y: parse(&self.lat, "latitude")?,
        };
        Ok(GeocodedPlace::new(self.display_name, location))
    }
}
