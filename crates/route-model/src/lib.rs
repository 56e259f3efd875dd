//! Route Model
//!
//! Immutable description of a training route, loaded once per session:
//! - Ordered waypoints carrying narrated instructions
//! - Mandatory-stop flags and optional per-waypoint speed limits
//! - Stop signs and traffic lights (unordered regulated features)
//! - Test-maneuver markers (parallel parking, three-point turn, ...)

mod document;
mod error;
mod provider;

pub use document::{FeaturePoint, LocationEntry, RouteDocument};
pub use error::DataError;
pub use provider::{InMemoryRouteProvider, RouteProvider};

use geo_math::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

/// Ordered route checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteWaypoint {
    pub position: Coordinate,
    pub instruction: String,
    pub requires_stop: bool,
    /// Position in the route (0-based), assigned on load
    pub index: usize,
    /// Speed limit for the segment ending at this waypoint (km/h)
    pub speed_limit_kmh: Option<f64>,
}

impl RouteWaypoint {
    pub fn new(position: Coordinate, instruction: impl Into<String>) -> Self {
        Self {
            position,
            instruction: instruction.into(),
            requires_stop: false,
            index: 0,
            speed_limit_kmh: None,
        }
    }

    pub fn requiring_stop(mut self) -> Self {
        self.requires_stop = true;
        self
    }

    pub fn with_speed_limit(mut self, limit_kmh: f64) -> Self {
        self.speed_limit_kmh = Some(limit_kmh);
        self
    }
}

/// Regulated feature kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    StopSign,
    TrafficLight,
}

/// Stop sign or traffic light at a fixed coordinate.
///
/// Identity is `(kind, index)`; the index is stable for the lifetime of the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegulatedFeature {
    pub index: usize,
    pub position: Coordinate,
    pub kind: FeatureKind,
}

/// Off-route instruction point used for test maneuvers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestMarker {
    pub index: usize,
    pub position: Coordinate,
    pub instruction: String,
}

/// Immutable route. No mutation methods; a new session loads a new model.
#[derive(Debug, Clone)]
pub struct RouteModel {
    name: String,
    waypoints: Vec<RouteWaypoint>,
    stop_signs: Vec<Coordinate>,
    traffic_lights: Vec<Coordinate>,
    test_markers: Vec<TestMarker>,
    default_speed_limit_kmh: Option<f64>,
}

impl RouteModel {
    /// Build and validate a route.
    ///
    /// Waypoints are re-indexed by position. Duplicate regulated features
    /// (same coordinate to ~0.1 m) are collapsed.
    pub fn new(
        name: impl Into<String>,
        waypoints: Vec<RouteWaypoint>,
        stop_signs: Vec<Coordinate>,
        traffic_lights: Vec<Coordinate>,
    ) -> Result<Self, DataError> {
        let name = name.into();
        if waypoints.is_empty() {
            return Err(DataError::EmptyRoute(name));
        }

        let mut waypoints = waypoints;
        for (index, waypoint) in waypoints.iter_mut().enumerate() {
            check_coordinate("locations", index, &waypoint.position)?;
            if let Some(limit) = waypoint.speed_limit_kmh {
                if !limit.is_finite() || limit <= 0.0 {
                    return Err(DataError::InvalidSpeedLimit { index, value: limit });
                }
            }
            waypoint.index = index;
        }

        let stop_signs = dedupe_features("stopSigns", stop_signs)?;
        let traffic_lights = dedupe_features("trafficLights", traffic_lights)?;

        info!(
            "Loaded route {}: {} waypoints, {} stop signs, {} traffic lights",
            name,
            waypoints.len(),
            stop_signs.len(),
            traffic_lights.len()
        );

        Ok(Self {
            name,
            waypoints,
            stop_signs,
            traffic_lights,
            test_markers: Vec::new(),
            default_speed_limit_kmh: None,
        })
    }

    /// Attach test-maneuver markers
    pub fn with_test_markers(
        mut self,
        markers: Vec<(Coordinate, String)>,
    ) -> Result<Self, DataError> {
        let mut test_markers = Vec::with_capacity(markers.len());
        for (index, (position, instruction)) in markers.into_iter().enumerate() {
            check_coordinate("tests", index, &position)?;
            test_markers.push(TestMarker {
                index,
                position,
                instruction,
            });
        }
        self.test_markers = test_markers;
        Ok(self)
    }

    /// Route-wide speed limit used where a waypoint carries none
    pub fn with_default_speed_limit(mut self, limit_kmh: f64) -> Result<Self, DataError> {
        if !limit_kmh.is_finite() || limit_kmh <= 0.0 {
            return Err(DataError::InvalidSpeedLimit {
                index: 0,
                value: limit_kmh,
            });
        }
        self.default_speed_limit_kmh = Some(limit_kmh);
        Ok(self)
    }

    /// Validate a loosely-typed provider document
    pub fn from_value(value: serde_json::Value) -> Result<Self, DataError> {
        let document: RouteDocument =
            serde_json::from_value(value).map_err(|e| DataError::Malformed(e.to_string()))?;
        Self::from_document(document)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn waypoints(&self) -> &[RouteWaypoint] {
        &self.waypoints
    }

    pub fn stop_signs(&self) -> &[Coordinate] {
        &self.stop_signs
    }

    pub fn traffic_lights(&self) -> &[Coordinate] {
        &self.traffic_lights
    }

    pub fn test_markers(&self) -> &[TestMarker] {
        &self.test_markers
    }

    /// All regulated features, stop signs first
    pub fn features(&self) -> impl Iterator<Item = RegulatedFeature> + '_ {
        let stops = self
            .stop_signs
            .iter()
            .enumerate()
            .map(|(index, &position)| RegulatedFeature {
                index,
                position,
                kind: FeatureKind::StopSign,
            });
        let lights = self
            .traffic_lights
            .iter()
            .enumerate()
            .map(|(index, &position)| RegulatedFeature {
                index,
                position,
                kind: FeatureKind::TrafficLight,
            });
        stops.chain(lights)
    }

    /// First waypoint of the route
    pub fn start_position(&self) -> Coordinate {
        // Construction rejects empty routes
        self.waypoints[0].position
    }

    pub fn default_speed_limit_kmh(&self) -> Option<f64> {
        self.default_speed_limit_kmh
    }

    /// Limit applying near a waypoint: its own, else the route default
    pub fn speed_limit_for(&self, waypoint_index: usize) -> Option<f64> {
        self.waypoints
            .get(waypoint_index)
            .and_then(|w| w.speed_limit_kmh)
            .or(self.default_speed_limit_kmh)
    }

    pub fn is_final_waypoint(&self, waypoint_index: usize) -> bool {
        waypoint_index + 1 == self.waypoints.len()
    }
}

fn check_coordinate(field: &'static str, index: usize, c: &Coordinate) -> Result<(), DataError> {
    if c.is_valid() {
        Ok(())
    } else {
        Err(DataError::InvalidCoordinate {
            field,
            index,
            latitude: c.latitude,
            longitude: c.longitude,
        })
    }
}

fn dedupe_features(
    field: &'static str,
    points: Vec<Coordinate>,
) -> Result<Vec<Coordinate>, DataError> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(points.len());
    for (index, point) in points.into_iter().enumerate() {
        check_coordinate(field, index, &point)?;
        if seen.insert(point.grid_key()) {
            unique.push(point);
        } else {
            warn!("Dropping duplicate {} entry at {}", field, point);
        }
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waypoints() -> Vec<RouteWaypoint> {
        vec![
            RouteWaypoint::new(Coordinate::new(43.6768, -79.8218), "Start"),
            RouteWaypoint::new(Coordinate::new(43.6774, -79.8228), "Stop at the corner")
                .requiring_stop()
                .with_speed_limit(40.0),
            RouteWaypoint::new(Coordinate::new(43.6780, -79.8241), "Finish"),
        ]
    }

    #[test]
    fn test_empty_route_rejected() {
        let err = RouteModel::new("Brampton", vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, DataError::EmptyRoute(name) if name == "Brampton"));
    }

    #[test]
    fn test_waypoints_reindexed() {
        let mut wps = waypoints();
        wps[2].index = 99;
        let route = RouteModel::new("Brampton", wps, vec![], vec![]).unwrap();
        let indices: Vec<_> = route.waypoints().iter().map(|w| w.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(route.start_position(), Coordinate::new(43.6768, -79.8218));
        assert!(route.is_final_waypoint(2));
        assert!(!route.is_final_waypoint(1));
    }

    #[test]
    fn test_invalid_coordinate_rejected() {
        let mut wps = waypoints();
        wps[1].position = Coordinate::new(95.0, 0.0);
        let err = RouteModel::new("Brampton", wps, vec![], vec![]).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidCoordinate { field: "locations", index: 1, .. }
        ));
    }

    #[test]
    fn test_duplicate_features_collapsed() {
        let stop = Coordinate::new(43.6770, -79.8220);
        let route = RouteModel::new(
            "Brampton",
            waypoints(),
            vec![stop, Coordinate::new(43.6770 + 1e-9, -79.8220)],
            vec![Coordinate::new(43.6779, -79.8240)],
        )
        .unwrap();
        assert_eq!(route.stop_signs().len(), 1);

        let kinds: Vec<_> = route.features().map(|f| (f.kind, f.index)).collect();
        assert_eq!(
            kinds,
            vec![(FeatureKind::StopSign, 0), (FeatureKind::TrafficLight, 0)]
        );
    }

    #[test]
    fn test_speed_limit_fallback() {
        let route = RouteModel::new("Brampton", waypoints(), vec![], vec![]).unwrap();
        assert_eq!(route.speed_limit_for(1), Some(40.0));
        assert_eq!(route.speed_limit_for(0), None);

        let route = route.with_default_speed_limit(30.0).unwrap();
        assert_eq!(route.speed_limit_for(0), Some(30.0));
        assert_eq!(route.speed_limit_for(1), Some(40.0));
        assert_eq!(route.speed_limit_for(42), Some(30.0));
    }

    #[test]
    fn test_invalid_speed_limit_rejected() {
        let mut wps = waypoints();
        wps[0].speed_limit_kmh = Some(-10.0);
        assert!(matches!(
            RouteModel::new("Brampton", wps, vec![], vec![]),
            Err(DataError::InvalidSpeedLimit { index: 0, .. })
        ));
    }
}
