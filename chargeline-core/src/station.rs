//! Charging station records as served by the station dataset.

use geo::Coord;
use rstar::{AABB, RTreeObject};

/// Operational state reported for a charging site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StationStatus {
    /// Open to the public.
    #[default]
    Available,
    /// Announced but not yet built.
    Planned,
    /// Temporarily closed for maintenance or repairs.
    TemporarilyUnavailable,
}

impl StationStatus {
    /// Stable identifier used when persisting the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Planned => "planned",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
        }
    }

    /// Parse a persisted status identifier.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Self::Available),
            "planned" => Some(Self::Planned),
            "temporarily_unavailable" => Some(Self::TemporarilyUnavailable),
            _ => None,
        }
    }
}

/// A charging site.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. Optional
/// fields are treated as absent values and never fail downstream
/// computation.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use chargeline_core::StationRecord;
///
/// let station = StationRecord::new(7, Coord { x: -1.5, y: 52.0 }, 4).with_max_power_kw(150.0);
///
/// assert!(station.has_fast_charging());
/// assert_eq!(station.max_power_kw, Some(150.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationRecord {
    /// Unique identifier within the dataset.
    pub id: u64,
    /// Human-readable site name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Number of DC fast-charging ports.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fast_charger_count: u32,
    /// Highest power offered by any connector, in kilowatts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_power_kw: Option<f64>,
    /// Facility hosting the chargers, e.g. `"hotel"` or `"service_area"`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub facility_type: Option<String>,
    /// Operational state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: StationStatus,
}

impl StationRecord {
    /// Construct an available station with no optional metadata.
    #[must_use]
    pub const fn new(id: u64, location: Coord<f64>, fast_charger_count: u32) -> Self {
        Self {
            id,
            name: None,
            location,
            fast_charger_count,
            max_power_kw: None,
            facility_type: None,
            status: StationStatus::Available,
        }
    }

    /// Attach a site name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the maximum connector power.
    #[must_use]
    pub const fn with_max_power_kw(mut self, max_power_kw: f64) -> Self {
        self.max_power_kw = Some(max_power_kw);
        self
    }

    /// Attach the facility type.
    #[must_use]
    pub fn with_facility_type(mut self, facility_type: impl Into<String>) -> Self {
        self.facility_type = Some(facility_type.into());
        self
    }

    /// Override the operational status.
    #[must_use]
    pub const fn with_status(mut self, status: StationStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the site has at least one usable fast-charge connector.
    #[must_use]
    pub fn has_fast_charging(&self) -> bool {
        self.fast_charger_count > 0 && self.status == StationStatus::Available
    }
}

impl RTreeObject for StationRecord {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.x, self.location.y])
    }
}
