//! Provider document shape
//!
//! The data provider stores one loosely-typed document per test centre.
//! This is the only place that shape is known; everything downstream sees a
//! validated [`RouteModel`].

use geo_math::Coordinate;
use serde::{Deserialize, Serialize};

use crate::{DataError, RouteModel, RouteWaypoint};

/// Raw route document as stored by the data provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDocument {
    #[serde(default)]
    pub name: String,
    /// Ordered route points with instructions
    #[serde(default)]
    pub locations: Vec<LocationEntry>,
    /// Test-maneuver markers
    #[serde(default)]
    pub tests: Vec<LocationEntry>,
    #[serde(default)]
    pub stop_signs: Vec<FeaturePoint>,
    #[serde(default)]
    pub traffic_lights: Vec<FeaturePoint>,
    /// Route-wide speed limit (km/h)
    #[serde(default)]
    pub speed_limit: Option<f64>,
}

/// One entry of `locations` / `tests`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationEntry {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub requires_stop: bool,
    #[serde(default)]
    pub speed_limit: Option<f64>,
}

/// One entry of `stopSigns` / `trafficLights`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeaturePoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<FeaturePoint> for Coordinate {
    fn from(p: FeaturePoint) -> Self {
        Coordinate::new(p.latitude, p.longitude)
    }
}

impl RouteModel {
    /// Validate a typed provider document
    pub fn from_document(document: RouteDocument) -> Result<Self, DataError> {
        let waypoints = document
            .locations
            .into_iter()
            .map(|entry| RouteWaypoint {
                position: Coordinate::new(entry.latitude, entry.longitude),
                instruction: entry.instruction,
                requires_stop: entry.requires_stop,
                index: 0,
                speed_limit_kmh: entry.speed_limit,
            })
            .collect();

        let mut route = RouteModel::new(
            document.name,
            waypoints,
            document.stop_signs.into_iter().map(Coordinate::from).collect(),
            document
                .traffic_lights
                .into_iter()
                .map(Coordinate::from)
                .collect(),
        )?;

        let markers = document
            .tests
            .into_iter()
            .map(|entry| {
                (
                    Coordinate::new(entry.latitude, entry.longitude),
                    entry.instruction,
                )
            })
            .collect();
        route = route.with_test_markers(markers)?;

        if let Some(limit) = document.speed_limit {
            route = route.with_default_speed_limit(limit)?;
        }

        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn brampton() -> serde_json::Value {
        json!({
            "name": "Brampton",
            "speedLimit": 30.0,
            "locations": [
                { "latitude": 43.6768, "longitude": -79.8218, "instruction": "Check your seatbelt, mirror and seats" },
                { "latitude": 43.6774, "longitude": -79.8228, "instruction": "Turn left at the next intersection.", "requiresStop": true },
                { "latitude": 43.6780, "longitude": -79.8241, "instruction": "Continue on Third Line.", "speedLimit": 50.0 }
            ],
            "tests": [
                { "latitude": 43.6786, "longitude": -79.8257, "instruction": "Parallel park behind the car." }
            ],
            "stopSigns": [ { "latitude": 43.6772, "longitude": -79.8225 } ],
            "trafficLights": [ { "latitude": 43.6779, "longitude": -79.8239 } ]
        })
    }

    #[test]
    fn test_document_conversion() {
        let route = RouteModel::from_value(brampton()).unwrap();
        assert_eq!(route.name(), "Brampton");
        assert_eq!(route.waypoints().len(), 3);
        assert!(route.waypoints()[1].requires_stop);
        assert!(!route.waypoints()[0].requires_stop);
        assert_eq!(route.speed_limit_for(2), Some(50.0));
        assert_eq!(route.speed_limit_for(0), Some(30.0));
        assert_eq!(route.test_markers().len(), 1);
        assert_eq!(route.stop_signs().len(), 1);
        assert_eq!(route.traffic_lights().len(), 1);
    }

    #[test]
    fn test_missing_locations_is_empty_route() {
        let err = RouteModel::from_value(json!({ "name": "Nowhere" })).unwrap_err();
        assert!(matches!(err, DataError::EmptyRoute(_)));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let err = RouteModel::from_value(json!({
            "name": "Brampton",
            "locations": [ { "latitude": "north", "longitude": -79.8 } ]
        }))
        .unwrap_err();
        assert!(matches!(err, DataError::Malformed(_)));
    }

    #[test]
    fn test_missing_latitude_is_malformed() {
        let err = RouteModel::from_value(json!({
            "locations": [ { "longitude": -79.8, "instruction": "Go" } ]
        }))
        .unwrap_err();
        assert!(matches!(err, DataError::Malformed(_)));
    }
}
