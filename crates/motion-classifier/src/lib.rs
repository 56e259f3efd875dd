//! Motion Classification
//!
//! Stateless classification of accelerometer/gyroscope samples:
//! - Hard braking (strong negative Z acceleration)
//! - Hard acceleration (strong positive Z acceleration)
//! - Hard turning (high angular velocity around Y)
//!
//! Outputs are level signals. Debouncing for logging purposes is the
//! ledger's job, not the classifier's.

mod feed;

pub use feed::{MotionError, MotionFeed, MotionReader};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accelerometer + gyroscope reading (~10 Hz)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Acceleration along Z (m/s²)
    pub acceleration_z: f64,
    /// Angular velocity around Y (rad/s)
    pub rotation_rate_y: f64,
    pub timestamp: DateTime<Utc>,
}

impl MotionSample {
    pub fn new(acceleration_z: f64, rotation_rate_y: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            acceleration_z,
            rotation_rate_y,
            timestamp,
        }
    }
}

/// Classification thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionThresholds {
    /// Braking threshold (m/s², negative)
    pub brake_accel: f64,
    /// Acceleration threshold (m/s²)
    pub gas_accel: f64,
    /// Turn rate threshold (rad/s)
    pub turn_rate: f64,
}

impl Default for MotionThresholds {
    fn default() -> Self {
        Self {
            brake_accel: -2.5,
            gas_accel: 2.5,
            turn_rate: 4.0,
        }
    }
}

impl MotionThresholds {
    /// Tighter thresholds used on early test-route builds
    pub fn sensitive() -> Self {
        Self {
            brake_accel: -1.5,
            gas_accel: 1.5,
            ..Default::default()
        }
    }
}

/// Level signals for one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MotionClass {
    pub is_hard_braking: bool,
    pub is_hard_acceleration: bool,
    pub is_hard_turning: bool,
}

impl MotionClass {
    pub fn any(&self) -> bool {
        self.is_hard_braking || self.is_hard_acceleration || self.is_hard_turning
    }
}

/// Classify a single sample
pub fn classify(sample: &MotionSample, thresholds: &MotionThresholds) -> MotionClass {
    MotionClass {
        is_hard_braking: sample.acceleration_z < thresholds.brake_accel,
        is_hard_acceleration: sample.acceleration_z > thresholds.gas_accel,
        is_hard_turning: sample.rotation_rate_y.abs() > thresholds.turn_rate,
    }
}
