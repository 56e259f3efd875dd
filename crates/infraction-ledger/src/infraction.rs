//! Infraction records

use chrono::{DateTime, Utc};
use geo_math::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Infraction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InfractionKind {
    Speeding,
    FailureToStop,
    SuddenAcceleration,
    SuddenBraking,
    ExcessiveTurnSpeed,
    RouteDeviation,
}

impl InfractionKind {
    pub const ALL: [InfractionKind; 6] = [
        InfractionKind::Speeding,
        InfractionKind::FailureToStop,
        InfractionKind::SuddenAcceleration,
        InfractionKind::SuddenBraking,
        InfractionKind::ExcessiveTurnSpeed,
        InfractionKind::RouteDeviation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InfractionKind::Speeding => "Speeding",
            InfractionKind::FailureToStop => "Failure to stop",
            InfractionKind::SuddenAcceleration => "Sudden acceleration",
            InfractionKind::SuddenBraking => "Sudden braking",
            InfractionKind::ExcessiveTurnSpeed => "Excessive turn speed",
            InfractionKind::RouteDeviation => "Route deviation",
        }
    }

    /// Stable metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            InfractionKind::Speeding => "speeding",
            InfractionKind::FailureToStop => "failure_to_stop",
            InfractionKind::SuddenAcceleration => "sudden_acceleration",
            InfractionKind::SuddenBraking => "sudden_braking",
            InfractionKind::ExcessiveTurnSpeed => "excessive_turn_speed",
            InfractionKind::RouteDeviation => "route_deviation",
        }
    }
}

impl fmt::Display for InfractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which stream produced an infraction; decides the unit of `magnitude`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InfractionSource {
    /// GPS-derived: km/h, or meters for route deviation
    #[default]
    Location,
    /// Motion-sensor-derived: m/s² or rad/s
    Motion,
}

/// A detected infraction. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Infraction {
    pub timestamp: DateTime<Utc>,
    pub kind: InfractionKind,
    pub magnitude: f64,
    pub waypoint_index: Option<usize>,
    pub position: Option<Coordinate>,
    pub source: InfractionSource,
}

impl Infraction {
    pub fn new(kind: InfractionKind, magnitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            kind,
            magnitude,
            waypoint_index: None,
            position: None,
            source: InfractionSource::Location,
        }
    }

    pub fn at_waypoint(mut self, index: usize) -> Self {
        self.waypoint_index = Some(index);
        self
    }

    pub fn at_position(mut self, position: Coordinate) -> Self {
        self.position = Some(position);
        self
    }

    pub fn from_motion(mut self) -> Self {
        self.source = InfractionSource::Motion;
        self
    }

    /// Human-readable detail line for the results screen
    pub fn describe(&self) -> String {
        let m = self.magnitude;
        let mut line = match (self.kind, self.source) {
            (InfractionKind::Speeding, _) => {
                format!("Speeding: {:.0} km/h over the limit", m)
            }
            (InfractionKind::FailureToStop, _) => match self.waypoint_index {
                Some(i) => format!("Failure to stop at waypoint {} ({:.1} km/h)", i + 1, m),
                None => format!("Failure to stop ({:.1} km/h)", m),
            },
            (InfractionKind::SuddenAcceleration, InfractionSource::Location) => {
                format!("Sudden acceleration: speed rose by {:.0} km/h", m)
            }
            (InfractionKind::SuddenAcceleration, InfractionSource::Motion) => {
                format!("Hard acceleration: {:.1} m/s²", m)
            }
            (InfractionKind::SuddenBraking, InfractionSource::Location) => {
                format!("Sudden braking: speed dropped by {:.0} km/h", m)
            }
            (InfractionKind::SuddenBraking, InfractionSource::Motion) => {
                format!("Hard braking: {:.1} m/s²", m)
            }
            (InfractionKind::ExcessiveTurnSpeed, InfractionSource::Location) => {
                format!("Turning at {:.0} km/h", m)
            }
            (InfractionKind::ExcessiveTurnSpeed, InfractionSource::Motion) => {
                format!("Hard turning: {:.1} rad/s", m)
            }
            (InfractionKind::RouteDeviation, _) => {
                format!("Route deviation: off track by {:.0} meters", m)
            }
        };

        if let Some(position) = self.position {
            line.push_str(&format!(" at {}", position));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_failure_to_stop_is_one_based() {
        let infraction = Infraction::new(InfractionKind::FailureToStop, 5.0, Utc::now())
            .at_waypoint(1)
            .at_position(Coordinate::new(43.6774, -79.8228));
        assert_eq!(
            infraction.describe(),
            "Failure to stop at waypoint 2 (5.0 km/h) at (43.67740, -79.82280)"
        );
    }

    #[test]
    fn test_describe_depends_on_source() {
        let gps = Infraction::new(InfractionKind::SuddenBraking, 30.0, Utc::now());
        let imu = gps.clone().from_motion();
        assert!(gps.describe().contains("km/h"));
        assert!(imu.describe().contains("m/s²"));
    }

    #[test]
    fn test_kinds_ordered_for_summary() {
        let mut kinds = InfractionKind::ALL.to_vec();
        kinds.reverse();
        kinds.sort();
        assert_eq!(kinds, InfractionKind::ALL.to_vec());
        assert_eq!(InfractionKind::FailureToStop.to_string(), "Failure to stop");
    }

    #[test]
    fn test_serde_round_trip() {
        let infraction = Infraction::new(InfractionKind::Speeding, 12.0, Utc::now()).at_waypoint(3);
        let json = serde_json::to_string(&infraction).unwrap();
        let back: Infraction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, infraction);
    }
}
