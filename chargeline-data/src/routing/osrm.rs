//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route found between the coordinates
    /// - `"NoSegment"` - A coordinate could not be snapped to the network
    /// - `"InvalidOptions"` - Invalid option combination
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Routes, preferred first.
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// One route in an OSRM response.
#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    /// Length in metres.
    pub distance: f64,
    /// Expected travel time in seconds.
    pub duration: f64,
    /// Full-overview GeoJSON geometry.
    pub geometry: GeoJsonLine,
}

/// GeoJSON `LineString` geometry; positions are `[lon, lat]`.
#[derive(Debug, Deserialize)]
pub struct GeoJsonLine {
    /// Ordered positions.
    pub coordinates: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 1609.3,
                "duration": 90.5,
                "weight": 90.5,
                "geometry": {"type": "LineString", "coordinates": [[-1.5, 53.8], [-1.49, 53.81]]}
            }],
            "waypoints": []
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        assert_eq!(response.routes.len(), 1);
        assert_eq!(response.routes[0].geometry.coordinates[1], [-1.49, 53.81]);
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(!response.is_ok());
        assert!(response.routes.is_empty());
        assert_eq!(
            response.message.as_deref(),
            Some("Impossible route between points")
        );
    }
}
