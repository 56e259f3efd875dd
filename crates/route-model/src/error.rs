//! Route Data Error Types

use thiserror::Error;

/// Route or feature data missing or malformed. Fatal to starting a session.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    /// No route document matches the requested location
    #[error("No route found for location: {0}")]
    NotFound(String),

    /// Route document carries zero waypoints
    #[error("Route {0} has no waypoints")]
    EmptyRoute(String),

    /// Coordinate outside the valid range
    #[error("{field}[{index}] has invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        field: &'static str,
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    /// Speed limit not a positive finite number
    #[error("Waypoint {index} has invalid speed limit {value}")]
    InvalidSpeedLimit { index: usize, value: f64 },

    /// Document does not have the expected shape
    #[error("Malformed route document: {0}")]
    Malformed(String),
}
