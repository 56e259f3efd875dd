//! Engine configuration

use serde::{Deserialize, Serialize};
use speed_governor::GovernorConfig;

/// How waypoint progression is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionPolicy {
    /// Announce whichever waypoint is nearest of all. Robust to GPS noise;
    /// the cursor is advisory only.
    #[default]
    ClosestScan,
    /// Only the waypoint under the cursor is checked; the cursor advances
    /// when it is reached.
    IndexedCursor,
}

/// Proximity engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Distance from the first waypoint within which a session may start (m)
    pub start_radius_m: f64,

    /// Distance at which a waypoint, marker, or feature counts as reached (m)
    pub proximity_radius_m: f64,

    /// Advisory off-route flag threshold (m)
    pub off_route_radius_m: f64,

    /// Deviation logged as an infraction beyond this distance (m)
    pub deviation_infraction_radius_m: f64,

    /// Speed above which a mandatory stop is considered missed (km/h)
    pub stop_speed_threshold_kmh: f64,

    /// Limit used when neither waypoint nor route carries one (km/h)
    pub default_speed_limit_kmh: f64,

    pub progression: ProgressionPolicy,

    pub governor: GovernorConfig,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            start_radius_m: 1000.0,
            proximity_radius_m: 20.0,
            off_route_radius_m: 100.0,
            deviation_infraction_radius_m: 500.0,
            stop_speed_threshold_kmh: 0.5,
            default_speed_limit_kmh: 30.0,
            progression: ProgressionPolicy::ClosestScan,
            governor: GovernorConfig::default(),
        }
    }
}
