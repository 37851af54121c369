//! Distance units and small geodesic helpers shared by the engine.
//!
//! Coordinates follow the `geo` convention: `x = longitude`, `y = latitude`,
//! both in WGS84 degrees. Distances surfaced to callers are in miles; the
//! directions provider reports metres.

use geo::{Closest, ClosestPoint, Coord, Distance, Haversine, LineString, Point, Rect};

/// Metres in one statute mile.
pub const METERS_PER_MILE: f64 = 1_609.344;

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3_958.761_3;

/// Length of one degree of latitude, in miles.
pub const MILES_PER_DEGREE: f64 = EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0;

/// Lower bound on `cos(latitude)` so padding stays finite near the poles.
const MIN_LONGITUDE_SCALE: f64 = 0.01;

/// Highest latitude used when deriving padding, in degrees.
const MAX_PADDING_LATITUDE: f64 = 89.9;

/// Convert metres to miles.
#[must_use]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Convert miles to metres.
#[must_use]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

/// Scale applied to longitude degrees at `latitude` in an equirectangular
/// projection.
#[must_use]
pub fn longitude_scale(latitude: f64) -> f64 {
    latitude.to_radians().cos().max(MIN_LONGITUDE_SCALE)
}

/// Great-circle distance between two coordinates, in miles.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use chargeline_core::geometry::haversine_miles;
///
/// let one_degree = haversine_miles(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 });
/// assert!((one_degree - 69.0).abs() < 0.2);
/// ```
#[must_use]
pub fn haversine_miles(from: Coord<f64>, to: Coord<f64>) -> f64 {
    meters_to_miles(Haversine.distance(Point::from(from), Point::from(to)))
}

/// Great-circle distance from `location` to the closest point of `path`, in
/// miles.
///
/// The closest point is found in lon/lat space, which is accurate enough at
/// corridor widths. Returns `None` for an empty path.
#[must_use]
pub fn haversine_miles_to_path(path: &LineString<f64>, location: Coord<f64>) -> Option<f64> {
    match path.closest_point(&Point::from(location)) {
        Closest::Intersection(point) | Closest::SinglePoint(point) => {
            Some(haversine_miles(location, point.0))
        }
        Closest::Indeterminate => None,
    }
}

/// Bounding box enclosing `coords`, padded by `pad_miles` on every side.
///
/// Longitude padding uses the latitude furthest from the equator inside the
/// padded box, so the box never under-covers the requested distance.
/// Returns `None` when `coords` is empty.
#[must_use]
pub fn padded_bbox(coords: &[Coord<f64>], pad_miles: f64) -> Option<Rect<f64>> {
    let first = coords.first()?;
    let (mut min, mut max) = (*first, *first);
    for coord in coords {
        min.x = min.x.min(coord.x);
        min.y = min.y.min(coord.y);
        max.x = max.x.max(coord.x);
        max.y = max.y.max(coord.y);
    }

    let lat_pad = pad_miles.max(0.0) / MILES_PER_DEGREE;
    let min_lat = (min.y - lat_pad).max(-90.0);
    let max_lat = (max.y + lat_pad).min(90.0);
    let widest = min_lat.abs().max(max_lat.abs()).min(MAX_PADDING_LATITUDE);
    let lng_pad = pad_miles.max(0.0) / (MILES_PER_DEGREE * longitude_scale(widest));

    Some(Rect::new(
        Coord {
            x: min.x - lng_pad,
            y: min_lat,
        },
        Coord {
            x: max.x + lng_pad,
            y: max_lat,
        },
    ))
}

/// Bounding box covering every point within `radius_miles` of `center`.
#[must_use]
pub fn bbox_around(center: Coord<f64>, radius_miles: f64) -> Rect<f64> {
    let lat_pad = radius_miles.max(0.0) / MILES_PER_DEGREE;
    let widest = (center.y.abs() + lat_pad).min(MAX_PADDING_LATITUDE);
    let lng_pad = radius_miles.max(0.0) / (MILES_PER_DEGREE * longitude_scale(widest));
    Rect::new(
        Coord {
            x: center.x - lng_pad,
            y: (center.y - lat_pad).max(-90.0),
        },
        Coord {
            x: center.x + lng_pad,
            y: (center.y + lat_pad).min(90.0),
        },
    )
}

/// A travel path returned by the directions provider.
///
/// `distance_meters` is the provider's authoritative trip length, which can
/// differ from the polyline's own planar length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathGeometry {
    /// Ordered polyline vertices.
    pub coordinates: Vec<Coord<f64>>,
    /// Authoritative trip length in metres, when known.
    pub distance_meters: Option<f64>,
}

impl PathGeometry {
    /// Pair a polyline with the provider's reported distance.
    #[must_use]
    pub const fn new(coordinates: Vec<Coord<f64>>, distance_meters: Option<f64>) -> Self {
        Self {
            coordinates,
            distance_meters,
        }
    }

    /// The polyline as a `geo` line string.
    #[must_use]
    pub fn line_string(&self) -> LineString<f64> {
        LineString::new(self.coordinates.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unit_conversions_are_inverse() {
        let miles = meters_to_miles(miles_to_meters(42.5));
        assert!((miles - 42.5).abs() < 1e-9);
    }

    #[rstest]
    fn padded_bbox_grows_by_requested_distance() {
        let coords = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }];
        let bbox = padded_bbox(&coords, MILES_PER_DEGREE).expect("non-empty input");
        assert!((bbox.min().y + 1.0).abs() < 1e-9);
        assert!((bbox.max().y - 1.0).abs() < 1e-9);
        // Longitude padding widens at the padded box's highest latitude.
        assert!(bbox.min().x < -1.0);
        assert!(bbox.max().x > 2.0);
    }

    #[rstest]
    fn path_distance_uses_the_closest_vertex_or_edge() {
        let path = LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]);
        let beside = Coord { x: 0.5, y: 10.0 / MILES_PER_DEGREE };
        let beyond = Coord { x: 2.0, y: 0.0 };
        let miles = haversine_miles_to_path(&path, beside).expect("non-empty path");
        assert!((miles - 10.0).abs() < 0.05);
        let miles = haversine_miles_to_path(&path, beyond).expect("non-empty path");
        assert!((miles - MILES_PER_DEGREE).abs() < 0.1);
        assert!(haversine_miles_to_path(&LineString::new(Vec::new()), beside).is_none());
    }

    #[rstest]
    fn padded_bbox_of_nothing_is_none() {
        assert!(padded_bbox(&[], 10.0).is_none());
    }

    #[rstest]
    #[case(0.0)]
    #[case(45.0)]
    #[case(70.0)]
    fn bbox_around_contains_points_at_radius(#[case] latitude: f64) {
        let center = Coord { x: 10.0, y: latitude };
        let bbox = bbox_around(center, 30.0);
        let north = Coord {
            x: center.x,
            y: center.y + 30.0 / MILES_PER_DEGREE,
        };
        let east_span = bbox.max().x - center.x;
        assert!(bbox.max().y >= north.y - 1e-12);
        assert!(haversine_miles(center, Coord { x: center.x + east_span, y: latitude }) >= 29.9);
    }
}
