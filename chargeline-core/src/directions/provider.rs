//! Directions provider trait and the route type it returns.

use geo::Coord;

use crate::geometry::{PathGeometry, meters_to_miles};

use super::error::DirectionsError;

/// One drivable route between the requested waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRoute {
    /// Ordered polyline vertices, `x = longitude` and `y = latitude`.
    pub coordinates: Vec<Coord<f64>>,
    /// Trip length reported by the service, in metres.
    pub distance_meters: f64,
    /// Expected driving time, in seconds.
    pub duration_seconds: f64,
}

impl DirectionsRoute {
    /// Construct a route from its polyline and summary.
    #[must_use]
    pub const fn new(
        coordinates: Vec<Coord<f64>>,
        distance_meters: f64,
        duration_seconds: f64,
    ) -> Self {
        Self {
            coordinates,
            distance_meters,
            duration_seconds,
        }
    }

    /// The polyline paired with its authoritative distance.
    #[must_use]
    pub fn geometry(&self) -> PathGeometry {
        PathGeometry::new(self.coordinates.clone(), Some(self.distance_meters))
    }

    /// Trip length in miles.
    #[must_use]
    pub fn distance_miles(&self) -> f64 {
        meters_to_miles(self.distance_meters)
    }
}

/// Fetch driving routes through an ordered list of waypoints.
///
/// Implementations return at least one route on success. The first route is
/// the service's preferred answer; any further routes are alternatives and are
/// only returned when `alternatives` is `true`.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use chargeline_core::{DirectionsError, DirectionsProvider, DirectionsRoute};
///
/// struct DirectLine;
///
/// impl DirectionsProvider for DirectLine {
///     fn directions(
///         &self,
///         waypoints: &[Coord<f64>],
///         _alternatives: bool,
///     ) -> Result<Vec<DirectionsRoute>, DirectionsError> {
///         if waypoints.len() < 2 {
///             return Err(DirectionsError::TooFewWaypoints {
///                 found: waypoints.len(),
///             });
///         }
///         Ok(vec![DirectionsRoute::new(waypoints.to_vec(), 1_000.0, 60.0)])
///     }
/// }
///
/// let stops = [Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.01 }];
/// let routes = DirectLine.directions(&stops, false)?;
/// assert_eq!(routes.len(), 1);
/// # Ok::<(), DirectionsError>(())
/// ```
pub trait DirectionsProvider {
    /// Return routes visiting `waypoints` in order.
    ///
    /// # Errors
    ///
    /// Implementations must return `Err(DirectionsError::TooFewWaypoints)`
    /// when fewer than two waypoints are given, and
    /// `Err(DirectionsError::AlternativesUnsupported)` when alternatives were
    /// requested but the service refuses them.
    fn directions(
        &self,
        waypoints: &[Coord<f64>],
        alternatives: bool,
    ) -> Result<Vec<DirectionsRoute>, DirectionsError>;
}

impl<T> DirectionsProvider for &T
where
    T: DirectionsProvider + ?Sized,
{
    fn directions(
        &self,
        waypoints: &[Coord<f64>],
        alternatives: bool,
    ) -> Result<Vec<DirectionsRoute>, DirectionsError> {
        (**self).directions(waypoints, alternatives)
    }
}
