//! Test utilities for directions providers.
//!
//! [`StubDirectionsProvider`] returns pre-configured responses without making
//! HTTP requests, and records every waypoint list it is asked about.

use std::sync::Mutex;

use chargeline_core::{DirectionsError, DirectionsProvider, DirectionsRoute};
use geo::Coord;

/// Stub `DirectionsProvider` for testing.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use chargeline_core::{DirectionsProvider, DirectionsRoute};
/// use chargeline_data::routing::test_support::StubDirectionsProvider;
///
/// let route = DirectionsRoute::new(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 }], 1e5, 4e3);
/// let provider = StubDirectionsProvider::with_routes(vec![route]);
///
/// let stops = [Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 }];
/// assert_eq!(provider.directions(&stops, false).map(|r| r.len()), Ok(1));
/// assert_eq!(provider.requests().len(), 1);
/// ```
#[derive(Debug)]
pub struct StubDirectionsProvider {
    response: StubResponse,
    requests: Mutex<Vec<(Vec<Coord<f64>>, bool)>>,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Routes(Vec<DirectionsRoute>),
    Error(DirectionsError),
}

impl StubDirectionsProvider {
    /// Create a provider that returns `routes`, trimmed to the first one when
    /// alternatives are not requested.
    #[must_use]
    pub fn with_routes(routes: Vec<DirectionsRoute>) -> Self {
        Self::from_response(StubResponse::Routes(routes))
    }

    /// Create a provider that fails with `error` for any valid request.
    #[must_use]
    pub fn with_error(error: DirectionsError) -> Self {
        Self::from_response(StubResponse::Error(error))
    }

    fn from_response(response: StubResponse) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Waypoint lists and alternative flags received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<(Vec<Coord<f64>>, bool)> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl DirectionsProvider for StubDirectionsProvider {
    fn directions(
        &self,
        waypoints: &[Coord<f64>],
        alternatives: bool,
    ) -> Result<Vec<DirectionsRoute>, DirectionsError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push((waypoints.to_vec(), alternatives));
        }
        if waypoints.len() < 2 {
            return Err(DirectionsError::TooFewWaypoints {
                found: waypoints.len(),
            });
        }

        match &self.response {
            StubResponse::Routes(routes) if routes.is_empty() => Err(DirectionsError::NoRoute {
                message: "stub has no routes".to_owned(),
            }),
            StubResponse::Routes(routes) => {
                let keep = if alternatives { routes.len() } else { 1 };
                Ok(routes.iter().take(keep).cloned().collect())
            }
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}
