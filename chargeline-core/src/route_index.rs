//! Distance-rescaled segment index over a route polyline.
//!
//! Each segment is flattened with an equirectangular approximation scaled by
//! the segment's mean latitude. Lengths are in miles. Provider polylines have
//! uneven vertex density, so the summed planar length only approximates the
//! trip; every along-route measure is multiplied by a single rescale factor so
//! mile markers agree with the provider's reported distance.

use geo::Coord;
use thiserror::Error;

use crate::geometry::{MILES_PER_DEGREE, PathGeometry, longitude_scale, meters_to_miles};

/// Errors raised while building or querying a [`RouteIndex`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteIndexError {
    /// The polyline had fewer than two vertices.
    #[error("route polyline needs at least two vertices, found {found}")]
    TooFewVertices {
        /// Number of vertices supplied.
        found: usize,
    },
    /// A vertex contained NaN or infinite components.
    #[error("route vertex {index} is not a finite coordinate")]
    NonFiniteCoordinate {
        /// Position of the offending vertex.
        index: usize,
    },
    /// Every segment had zero length, so nothing can be projected.
    #[error("route geometry has no segments of non-zero length")]
    DegenerateGeometry,
}

/// One non-degenerate polyline segment in local planar miles.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    start: Coord<f64>,
    end: Coord<f64>,
    origin: Coord<f64>,
    direction: Coord<f64>,
    length: f64,
    cumulative_start: f64,
    lng_scale: f64,
}

impl RouteSegment {
    /// Unscaled distance from the route start to this segment's start.
    #[must_use]
    pub const fn cumulative_start_miles(&self) -> f64 {
        self.cumulative_start
    }

    /// Planar segment length in miles, before rescaling.
    #[must_use]
    pub const fn length_miles(&self) -> f64 {
        self.length
    }

    /// First vertex of the segment.
    #[must_use]
    pub const fn start(&self) -> Coord<f64> {
        self.start
    }

    /// Last vertex of the segment.
    #[must_use]
    pub const fn end(&self) -> Coord<f64> {
        self.end
    }

    fn to_planar(&self, point: Coord<f64>) -> Coord<f64> {
        Coord {
            x: point.x * self.lng_scale * MILES_PER_DEGREE,
            y: point.y * MILES_PER_DEGREE,
        }
    }
}

/// Where a point lands on a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Perpendicular planar distance from the route, in miles.
    pub lateral_miles: f64,
    /// Rescaled distance from the route start to the foot of the projection.
    pub along_route_miles: f64,
    /// Index of the closest segment.
    pub segment: usize,
    /// Clamped position along the closest segment, in `[0, 1]`.
    pub fraction: f64,
}

/// Queryable index over a route polyline.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use chargeline_core::RouteIndex;
///
/// let path = [Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 }];
/// let index = RouteIndex::build(&path, Some(100_000.0))?;
/// let projection = index.project(Coord { x: 0.0, y: 0.5 })?;
///
/// assert!(projection.lateral_miles < 1e-9);
/// assert!((projection.along_route_miles - index.total_miles() / 2.0).abs() < 1e-9);
/// # Ok::<(), chargeline_core::RouteIndexError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteIndex {
    segments: Vec<RouteSegment>,
    planar_length: f64,
    rescale: f64,
    total_miles: f64,
}

impl RouteIndex {
    /// Build an index over a route's geometry.
    ///
    /// # Errors
    ///
    /// See [`RouteIndex::build`].
    pub fn from_geometry(geometry: &PathGeometry) -> Result<Self, RouteIndexError> {
        Self::build(&geometry.coordinates, geometry.distance_meters)
    }

    /// Build an index from polyline vertices and the provider's distance.
    ///
    /// The rescale factor is `authoritative / planar`, falling back to `1`
    /// when no usable authoritative distance is given or the planar length is
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns [`RouteIndexError::TooFewVertices`] for polylines shorter than
    /// two vertices and [`RouteIndexError::NonFiniteCoordinate`] when a vertex
    /// is not finite.
    pub fn build(
        coords: &[Coord<f64>],
        distance_meters: Option<f64>,
    ) -> Result<Self, RouteIndexError> {
        if coords.len() < 2 {
            return Err(RouteIndexError::TooFewVertices {
                found: coords.len(),
            });
        }
        if let Some(index) = coords
            .iter()
            .position(|c| !(c.x.is_finite() && c.y.is_finite()))
        {
            return Err(RouteIndexError::NonFiniteCoordinate { index });
        }

        let mut segments = Vec::with_capacity(coords.len() - 1);
        let mut cumulative = 0.0;
        for pair in coords.windows(2) {
            let [start, end] = pair else { continue };
            let lng_scale = longitude_scale((start.y + end.y) / 2.0);
            let direction = Coord {
                x: (end.x - start.x) * lng_scale * MILES_PER_DEGREE,
                y: (end.y - start.y) * MILES_PER_DEGREE,
            };
            let length = direction.x.hypot(direction.y);
            if length <= 0.0 {
                continue;
            }
            segments.push(RouteSegment {
                start: *start,
                end: *end,
                origin: Coord {
                    x: start.x * lng_scale * MILES_PER_DEGREE,
                    y: start.y * MILES_PER_DEGREE,
                },
                direction,
                length,
                cumulative_start: cumulative,
                lng_scale,
            });
            cumulative += length;
        }

        let authoritative = distance_meters
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(meters_to_miles);
        let rescale = match authoritative {
            Some(miles) if cumulative > 0.0 => miles / cumulative,
            _ => 1.0,
        };

        Ok(Self {
            segments,
            planar_length: cumulative,
            rescale,
            total_miles: authoritative.unwrap_or(cumulative),
        })
    }

    /// Segments in geometry order.
    #[must_use]
    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    /// Whether the index has no projectable segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Factor converting planar miles to reported miles.
    #[must_use]
    pub const fn rescale_factor(&self) -> f64 {
        self.rescale
    }

    /// Summed planar segment length, before rescaling.
    #[must_use]
    pub const fn planar_length_miles(&self) -> f64 {
        self.planar_length
    }

    /// Reported route length in miles.
    #[must_use]
    pub const fn total_miles(&self) -> f64 {
        self.total_miles
    }

    /// Project `point` onto the closest segment.
    ///
    /// Ties resolve to the segment that comes first along the route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteIndexError::DegenerateGeometry`] when the index has no
    /// segments.
    pub fn project(&self, point: Coord<f64>) -> Result<Projection, RouteIndexError> {
        let mut best: Option<Projection> = None;
        for (position, segment) in self.segments.iter().enumerate() {
            let planar = segment.to_planar(point);
            let rel_x = planar.x - segment.origin.x;
            let rel_y = planar.y - segment.origin.y;
            let dot = rel_x * segment.direction.x + rel_y * segment.direction.y;
            let fraction = (dot / (segment.length * segment.length)).clamp(0.0, 1.0);
            let foot_x = segment.origin.x + fraction * segment.direction.x;
            let foot_y = segment.origin.y + fraction * segment.direction.y;
            let lateral = (planar.x - foot_x).hypot(planar.y - foot_y);

            if best.is_none_or(|current| lateral < current.lateral_miles) {
                best = Some(Projection {
                    lateral_miles: lateral,
                    along_route_miles: (segment.cumulative_start + fraction * segment.length)
                        * self.rescale,
                    segment: position,
                    fraction,
                });
            }
        }
        best.ok_or(RouteIndexError::DegenerateGeometry)
    }

    /// Coordinate found `along_route_miles` from the start.
    ///
    /// Positions before the start or past the end clamp to the route
    /// endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`RouteIndexError::DegenerateGeometry`] when the index has no
    /// segments.
    pub fn coordinate_at(&self, along_route_miles: f64) -> Result<Coord<f64>, RouteIndexError> {
        let last = self
            .segments
            .last()
            .ok_or(RouteIndexError::DegenerateGeometry)?;
        let target = (along_route_miles / self.rescale).clamp(0.0, self.planar_length);
        let segment = self
            .segments
            .iter()
            .find(|segment| segment.cumulative_start + segment.length >= target)
            .unwrap_or(last);
        let fraction = ((target - segment.cumulative_start) / segment.length).clamp(0.0, 1.0);
        Ok(Coord {
            x: segment.start.x + fraction * (segment.end.x - segment.start.x),
            y: segment.start.y + fraction * (segment.end.y - segment.start.y),
        })
    }
}
