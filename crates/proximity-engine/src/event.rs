//! Engine events

use infraction_ledger::Infraction;

/// Narration for an approaching stop sign
pub const STOP_SIGN_ANNOUNCEMENT: &str = "Approaching Stop Sign";
/// Narration for an approaching traffic light
pub const TRAFFIC_LIGHT_ANNOUNCEMENT: &str = "Approaching Traffic Light";

/// Events emitted by one evaluation, in detection order
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A new waypoint instruction is due
    InstructionChanged {
        waypoint_index: usize,
        instruction: String,
    },

    /// A test-maneuver marker was reached
    TestManeuver {
        marker_index: usize,
        instruction: String,
    },

    ApproachingStopSign { feature_index: usize },

    ApproachingTrafficLight { feature_index: usize },

    /// Over the limit, but within the advisory band
    SpeedAdvisory { speed_kmh: f64, over_limit_kmh: f64 },

    /// An infraction to append to the ledger
    InfractionRecorded(Infraction),

    /// Off-route advisory flag flipped
    OffRouteChanged { off_route: bool },

    /// The final waypoint's instruction was announced
    RouteCompleted,
}

impl EngineEvent {
    /// Text to narrate, if any
    pub fn narration(&self) -> Option<String> {
        match self {
            EngineEvent::InstructionChanged { instruction, .. }
            | EngineEvent::TestManeuver { instruction, .. } => {
                if instruction.trim().is_empty() {
                    None
                } else {
                    Some(instruction.clone())
                }
            }
            EngineEvent::ApproachingStopSign { .. } => Some(STOP_SIGN_ANNOUNCEMENT.to_string()),
            EngineEvent::ApproachingTrafficLight { .. } => {
                Some(TRAFFIC_LIGHT_ANNOUNCEMENT.to_string())
            }
            _ => None,
        }
    }

    pub fn infraction(&self) -> Option<&Infraction> {
        match self {
            EngineEvent::InfractionRecorded(infraction) => Some(infraction),
            _ => None,
        }
    }
}
