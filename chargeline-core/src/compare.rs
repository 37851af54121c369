//! Rank candidate routes against a target maximum gap.

use std::cmp::Ordering;

/// The figures a route is ranked by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    /// Longest uncovered stretch, in miles.
    pub max_gap_miles: f64,
    /// Number of corridor stations.
    pub station_count: usize,
    /// Trip length in metres.
    pub distance_meters: f64,
}

/// Total order over routes, parameterised by the largest acceptable gap.
///
/// A route meets the target when its longest gap does not exceed it. Routes
/// that meet the target always rank ahead of those that do not. Among routes
/// meeting the target, more corridor stations wins, then the smaller gap, then
/// the shorter trip. Among routes missing it, the smaller gap wins, then more
/// stations, then the shorter trip.
///
/// # Examples
/// ```
/// use std::cmp::Ordering;
/// use chargeline_core::{RouteComparator, RouteMetrics};
///
/// let comparator = RouteComparator::new(50.0);
/// let covered = RouteMetrics { max_gap_miles: 45.0, station_count: 1, distance_meters: 9e5 };
/// let busier = RouteMetrics { max_gap_miles: 60.0, station_count: 9, distance_meters: 1e5 };
///
/// assert_eq!(comparator.compare(&covered, &busier), Ordering::Less);
/// assert!(comparator.improves(&covered, &busier));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteComparator {
    target_gap_miles: f64,
}

impl RouteComparator {
    /// Rank routes against `target_gap_miles`.
    #[must_use]
    pub const fn new(target_gap_miles: f64) -> Self {
        Self { target_gap_miles }
    }

    /// The largest acceptable gap.
    #[must_use]
    pub const fn target_gap_miles(&self) -> f64 {
        self.target_gap_miles
    }

    /// Whether `route` keeps every gap within the target.
    #[must_use]
    pub fn meets_target(&self, route: &RouteMetrics) -> bool {
        route.max_gap_miles <= self.target_gap_miles
    }

    /// Order two routes; [`Ordering::Less`] means `a` is better.
    #[must_use]
    pub fn compare(&self, a: &RouteMetrics, b: &RouteMetrics) -> Ordering {
        let by_gap = || a.max_gap_miles.total_cmp(&b.max_gap_miles);
        let by_stations = || b.station_count.cmp(&a.station_count);
        let by_distance = || a.distance_meters.total_cmp(&b.distance_meters);

        match (self.meets_target(a), self.meets_target(b)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => by_stations().then_with(by_gap).then_with(by_distance),
            (false, false) => by_gap().then_with(by_stations).then_with(by_distance),
        }
    }

    /// Whether `candidate` ranks strictly ahead of `current`.
    #[must_use]
    pub fn improves(&self, candidate: &RouteMetrics, current: &RouteMetrics) -> bool {
        self.compare(candidate, current) == Ordering::Less
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn metrics(max_gap_miles: f64, station_count: usize, distance_meters: f64) -> RouteMetrics {
        RouteMetrics {
            max_gap_miles,
            station_count,
            distance_meters,
        }
    }

    #[rstest]
    #[case(metrics(40.0, 0, 9e9), metrics(41.0, 50, 1.0))]
    #[case(metrics(30.0, 5, 1e5), metrics(30.0, 4, 1e3))]
    #[case(metrics(25.0, 5, 1e5), metrics(30.0, 5, 1e3))]
    #[case(metrics(30.0, 5, 1e3), metrics(30.0, 5, 1e5))]
    #[case(metrics(50.0, 1, 1e5), metrics(60.0, 9, 1e3))]
    #[case(metrics(60.0, 9, 1e5), metrics(60.0, 8, 1e3))]
    #[case(metrics(60.0, 9, 1e3), metrics(60.0, 9, 1e5))]
    fn better_route_ranks_first(#[case] better: RouteMetrics, #[case] worse: RouteMetrics) {
        let comparator = RouteComparator::new(40.0);
        assert_eq!(comparator.compare(&better, &worse), Ordering::Less);
        assert_eq!(comparator.compare(&worse, &better), Ordering::Greater);
        assert!(comparator.improves(&better, &worse));
        assert!(!comparator.improves(&worse, &better));
    }

    #[rstest]
    fn identical_routes_do_not_improve() {
        let comparator = RouteComparator::new(40.0);
        let route = metrics(35.0, 3, 1e5);
        assert_eq!(comparator.compare(&route, &route), Ordering::Equal);
        assert!(!comparator.improves(&route, &route));
    }

    fn any_metrics() -> impl Strategy<Value = RouteMetrics> {
        (0.0..200.0_f64, 0..20_usize, 1.0..1e6_f64)
            .prop_map(|(gap, count, distance)| metrics(gap, count, distance))
    }

    proptest! {
        #[test]
        fn ordering_is_antisymmetric(a in any_metrics(), b in any_metrics(), target in 0.0..200.0_f64) {
            let comparator = RouteComparator::new(target);
            prop_assert_eq!(comparator.compare(&a, &b), comparator.compare(&b, &a).reverse());
        }

        #[test]
        fn ordering_is_transitive(
            a in any_metrics(),
            b in any_metrics(),
            c in any_metrics(),
            target in 0.0..200.0_f64,
        ) {
            let comparator = RouteComparator::new(target);
            let mut routes = [a, b, c];
            routes.sort_by(|x, y| comparator.compare(x, y));
            let [first, second, third] = routes;
            prop_assert_ne!(comparator.compare(&first, &second), Ordering::Greater);
            prop_assert_ne!(comparator.compare(&second, &third), Ordering::Greater);
            prop_assert_ne!(comparator.compare(&first, &third), Ordering::Greater);
        }

        #[test]
        fn meeting_the_target_dominates(
            a in any_metrics(),
            b in any_metrics(),
            share in 0.0..=1.0_f64,
            overshoot in 0.001..100.0_f64,
            target in 0.0..200.0_f64,
        ) {
            let comparator = RouteComparator::new(target);
            let within = RouteMetrics { max_gap_miles: target * share, ..a };
            let beyond = RouteMetrics { max_gap_miles: target + overshoot, ..b };
            prop_assert_eq!(comparator.compare(&within, &beyond), Ordering::Less);
        }
    }
}
