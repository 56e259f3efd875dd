//! Governor configuration

use serde::{Deserialize, Serialize};

/// Speed governor configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Over-limit band above which speeding is logged (km/h)
    pub severe_over_kmh: f64,

    /// Speed change between consecutive fixes treated as sudden (km/h)
    pub sudden_change_kmh: f64,

    /// Heading change treated as a turn (degrees)
    pub turn_heading_change_deg: f64,

    /// Maximum speed through a turn (km/h)
    pub turn_speed_limit_kmh: f64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            severe_over_kmh: 9.0,
            sudden_change_kmh: 10.0,
            turn_heading_change_deg: 45.0,
            turn_speed_limit_kmh: 20.0,
        }
    }
}

impl GovernorConfig {
    /// Create strict config (lower thresholds)
    pub fn strict() -> Self {
        Self {
            severe_over_kmh: 5.0,
            sudden_change_kmh: 8.0,
            turn_speed_limit_kmh: 15.0,
            ..Default::default()
        }
    }

    /// Create lenient config (higher thresholds)
    pub fn lenient() -> Self {
        Self {
            severe_over_kmh: 15.0,
            sudden_change_kmh: 15.0,
            turn_speed_limit_kmh: 25.0,
            ..Default::default()
        }
    }
}
