//! Engine state

use speed_governor::SpeedTier;
use std::collections::{HashMap, HashSet};

/// Identity of anything that can be announced or checked once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureId {
    /// Waypoint instruction, by waypoint index
    Instruction(usize),
    /// Test-maneuver marker, by marker index
    TestMarker(usize),
    StopSign(usize),
    TrafficLight(usize),
    /// Mandatory-stop check at a waypoint, per approach
    StopCheck { index: usize, visit: u32 },
}

/// Mutable core of the engine.
///
/// Created at route start, mutated per sample, discarded at route end.
/// `current_waypoint_cursor` never decreases and `announced_features` only
/// grows until [`EngineState::reset`].
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub current_waypoint_cursor: usize,
    pub announced_features: HashSet<FeatureId>,
    pub last_instruction_spoken: Option<String>,
    pub previous_speed_kmh: f64,
    pub previous_heading: Option<f64>,
    pub is_within_start_region: bool,
    pub is_off_route: bool,
    /// Per-sample flags, not sticky
    pub is_near_stop_sign: bool,
    pub is_near_traffic_light: bool,
    /// A deviation infraction was logged for the current excursion
    pub deviation_logged: bool,
    /// Completed passes through each mandatory-stop radius
    pub stop_visits: HashMap<usize, u32>,
    /// Mandatory-stop waypoints the last sample was inside
    pub inside_stop_zone: HashSet<usize>,
    pub route_completed: bool,
    pub last_speed_kmh: f64,
    pub last_tier: SpeedTier,
    pub samples_evaluated: u64,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_announced(&self, id: FeatureId) -> bool {
        self.announced_features.contains(&id)
    }

    /// Mark as announced; false when it already was
    pub fn mark_announced(&mut self, id: FeatureId) -> bool {
        self.announced_features.insert(id)
    }

    /// Move the cursor forward, never back
    pub fn advance_cursor_to(&mut self, index: usize) {
        self.current_waypoint_cursor = self.current_waypoint_cursor.max(index);
    }

    /// Track the stop radius of waypoint `index`. Returns the current
    /// approach number while inside, `None` outside. Leaving the radius
    /// starts a new approach.
    pub fn track_stop_zone(&mut self, index: usize, inside: bool) -> Option<u32> {
        if inside {
            self.inside_stop_zone.insert(index);
            return Some(self.stop_visits.get(&index).copied().unwrap_or(0));
        }
        if self.inside_stop_zone.remove(&index) {
            *self.stop_visits.entry(index).or_insert(0) += 1;
        }
        None
    }

    /// Reset state (on session restart)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
