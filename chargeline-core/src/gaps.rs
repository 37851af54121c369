//! Coverage gaps between corridor stations.
//!
//! Gaps are measured along the route between consecutive charging
//! opportunities, with the route start and end acting as boundaries. `N`
//! stations always yield `N + 1` gaps.

use crate::CorridorStation;

/// An uncovered stretch of route, in along-route miles.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gap {
    /// Mile marker where the gap starts.
    pub start_miles: f64,
    /// Mile marker where the gap ends.
    pub end_miles: f64,
    /// Length of the gap.
    pub length_miles: f64,
    /// Mile marker halfway through the gap.
    pub midpoint_miles: f64,
}

impl Gap {
    /// Gap between two mile markers. Reversed markers yield a zero-length gap.
    #[must_use]
    pub fn between(start_miles: f64, end_miles: f64) -> Self {
        let length_miles = (end_miles - start_miles).max(0.0);
        Self {
            start_miles,
            end_miles,
            length_miles,
            midpoint_miles: start_miles + length_miles / 2.0,
        }
    }
}

/// Every gap along a route, in route order.
///
/// `stations` must already be sorted by `along_route_miles`, as returned by
/// [`crate::locate_corridor_stations`].
///
/// # Examples
/// ```
/// use chargeline_core::coverage_gaps;
///
/// let gaps = coverage_gaps(&[], 120.0);
/// assert_eq!(gaps.len(), 1);
/// assert_eq!(gaps[0].length_miles, 120.0);
/// ```
#[must_use]
pub fn coverage_gaps(stations: &[CorridorStation], total_miles: f64) -> Vec<Gap> {
    let markers: Vec<f64> = std::iter::once(0.0)
        .chain(stations.iter().map(|s| s.along_route_miles))
        .chain(std::iter::once(total_miles))
        .collect();
    markers
        .windows(2)
        .filter_map(|pair| match pair {
            [start, end] => Some(Gap::between(*start, *end)),
            _ => None,
        })
        .collect()
}

/// Length of the longest gap, or `total_miles` when there are no stations.
#[must_use]
pub fn max_gap_miles(stations: &[CorridorStation], total_miles: f64) -> f64 {
    coverage_gaps(stations, total_miles)
        .iter()
        .map(|gap| gap.length_miles)
        .fold(0.0, f64::max)
}

/// The `count` longest gaps, longest first. Equal lengths keep route order.
#[must_use]
pub fn largest_gaps(stations: &[CorridorStation], total_miles: f64, count: usize) -> Vec<Gap> {
    let mut gaps = coverage_gaps(stations, total_miles);
    gaps.sort_by(|a, b| b.length_miles.total_cmp(&a.length_miles));
    gaps.truncate(count);
    gaps
}
