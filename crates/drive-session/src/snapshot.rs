//! Observable session state

use motion_classifier::MotionClass;
use serde::{Deserialize, Serialize};
use speed_governor::SpeedTier;

/// Instruction shown before any waypoint is reached
pub const INITIAL_INSTRUCTION: &str = "Proceed to the start location.";

/// Published after every processed sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub is_within_start_region: bool,
    pub is_off_route: bool,
    pub is_near_stop_sign: bool,
    pub is_near_traffic_light: bool,
    pub current_instruction: String,
    pub speed_kmh: f64,
    pub speed_tier: SpeedTier,
    /// Latest motion classification
    pub motion: MotionClass,
    pub waypoint_cursor: usize,
    pub infraction_count: usize,
    pub route_completed: bool,
    /// Location samples received, including missing fixes
    pub location_samples: u64,
    pub motion_samples: u64,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            is_within_start_region: false,
            is_off_route: false,
            is_near_stop_sign: false,
            is_near_traffic_light: false,
            current_instruction: INITIAL_INSTRUCTION.to_string(),
            speed_kmh: 0.0,
            speed_tier: SpeedTier::Normal,
            motion: MotionClass::default(),
            waypoint_cursor: 0,
            infraction_count: 0,
            route_completed: false,
            location_samples: 0,
            motion_samples: 0,
        }
    }
}
