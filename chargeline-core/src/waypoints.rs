//! Search for stations that could close a coverage gap.
//!
//! For each target gap the finder looks around the gap's midpoint, using
//! straight-line (haversine) distance rather than along-route distance, and
//! scores what it finds. Lower scores are better: proximity dominates, while
//! connector power and charger count act as capped tie-breakers.

use std::collections::HashSet;

use geo::Coord;

use crate::geometry::{bbox_around, haversine_miles};
use crate::{Gap, RouteIndex, StationRecord, StationStore};

/// Tunables for [`find_waypoint_candidates`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WaypointSearchConfig {
    /// Score penalty per mile between the gap midpoint and the station.
    pub distance_weight: f64,
    /// Maximum connector power is divided by this before being subtracted.
    pub power_divisor: f64,
    /// Upper bound on the charger-count bonus.
    pub charger_count_cap: u32,
    /// Smallest search radius around a gap midpoint, in miles.
    pub min_radius_miles: f64,
    /// Largest search radius around a gap midpoint, in miles.
    pub max_radius_miles: f64,
}

impl Default for WaypointSearchConfig {
    fn default() -> Self {
        Self {
            distance_weight: 10.0,
            power_divisor: 100.0,
            charger_count_cap: 10,
            min_radius_miles: 30.0,
            max_radius_miles: 80.0,
        }
    }
}

impl WaypointSearchConfig {
    /// Search radius for a corridor half-width: twice the width, clamped to
    /// the configured bounds.
    #[must_use]
    pub fn search_radius_miles(&self, corridor_miles: f64) -> f64 {
        let upper = self.max_radius_miles.max(self.min_radius_miles);
        (2.0 * corridor_miles).clamp(self.min_radius_miles, upper)
    }

    /// Score a station `distance_miles` from a gap midpoint. Lower is better.
    ///
    /// Missing power contributes nothing.
    #[must_use]
    pub fn score(&self, distance_miles: f64, station: &StationRecord) -> f64 {
        let power_bonus = if self.power_divisor > 0.0 {
            station.max_power_kw.unwrap_or(0.0) / self.power_divisor
        } else {
            0.0
        };
        let count_bonus = f64::from(station.fast_charger_count.min(self.charger_count_cap));
        distance_miles * self.distance_weight - power_bonus - count_bonus
    }
}

/// A station proposed as an automatic waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointCandidate {
    /// The proposed station.
    pub station: StationRecord,
    /// The gap this station was found for.
    pub gap: Gap,
    /// Straight-line distance from the gap midpoint, in miles.
    pub distance_miles: f64,
    /// Ranking score; lower is better.
    pub score: f64,
}

/// Stations near the midpoints of `gaps`, best first.
///
/// Stations without usable fast charging, those listed in `excluded` and
/// repeats across gaps are skipped; the first gap to find a station keeps it.
/// At most `limit` candidates are returned, ordered by score then station id.
pub fn find_waypoint_candidates<S>(
    store: &S,
    index: &RouteIndex,
    gaps: &[Gap],
    corridor_miles: f64,
    excluded: &HashSet<u64>,
    limit: usize,
    config: &WaypointSearchConfig,
) -> Vec<WaypointCandidate>
where
    S: StationStore + ?Sized,
{
    let radius = config.search_radius_miles(corridor_miles);
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for gap in gaps {
        let Ok(midpoint) = index.coordinate_at(gap.midpoint_miles) else {
            log::debug!("gap at mile {:.1} has no coordinate; skipping", gap.midpoint_miles);
            continue;
        };
        for station in store.stations_in_bbox(&bbox_around(midpoint, radius)) {
            if !station.has_fast_charging()
                || excluded.contains(&station.id)
                || seen.contains(&station.id)
            {
                continue;
            }
            let distance_miles = haversine_miles(midpoint, station.location);
            if distance_miles > radius {
                continue;
            }
            seen.insert(station.id);
            candidates.push(WaypointCandidate {
                score: config.score(distance_miles, &station),
                station,
                gap: *gap,
                distance_miles,
            });
        }
    }

    candidates.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then_with(|| a.station.id.cmp(&b.station.id))
    });
    candidates.truncate(limit);
    candidates
}

/// Position at which a waypoint aimed at `target_miles` joins `via`.
///
/// The waypoint goes before the first via point (after the origin) whose
/// projection onto `index` lies beyond the target, or before the destination
/// when none does. Returns `None` when the insertion would sit next to an
/// identical coordinate.
#[must_use]
pub fn insertion_index(
    via: &[Coord<f64>],
    index: &RouteIndex,
    target_miles: f64,
    location: Coord<f64>,
) -> Option<usize> {
    let last = via.len().checked_sub(1).filter(|last| *last >= 1)?;
    let position = via
        .iter()
        .enumerate()
        .take(last)
        .skip(1)
        .find(|(_, point)| {
            index
                .project(**point)
                .is_ok_and(|projection| projection.along_route_miles > target_miles)
        })
        .map_or(last, |(position, _)| position);

    let before = via.get(position - 1)?;
    let after = via.get(position)?;
    (*before != location && *after != location).then_some(position)
}
