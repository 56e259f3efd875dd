//! Geospatial Math
//!
//! Leaf utilities shared by every other crate in the pipeline:
//! - Coordinates and range validation
//! - Haversine great-circle distance
//! - Location samples as delivered by the device GPS

mod distance;
mod error;
mod sample;

pub use distance::{distance_meters, heading_delta, EARTH_RADIUS_M};
pub use error::SampleError;
pub use sample::LocationSample;

use serde::{Deserialize, Serialize};

/// WGS84 coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Latitude in [-90, 90], longitude in [-180, 180], both finite
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Distance to another coordinate in meters
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(self, other)
    }

    /// Grid key at 1e-6 degree resolution (~0.1 m).
    ///
    /// Used wherever two coordinates must be compared for identity;
    /// raw float equality is never reliable for positions read from data.
    pub fn grid_key(&self) -> (i64, i64) {
        (
            (self.latitude * 1e6).round() as i64,
            (self.longitude * 1e6).round() as i64,
        )
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(43.6768, -79.8218).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.1, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_grid_key_ignores_float_noise() {
        let a = Coordinate::new(43.6768, -79.8218);
        let b = Coordinate::new(43.6768 + 1e-9, -79.8218 - 1e-9);
        assert_eq!(a.grid_key(), b.grid_key());
        assert_ne!(a.grid_key(), Coordinate::new(43.6769, -79.8218).grid_key());
    }

    #[test]
    fn test_display() {
        let c = Coordinate::new(43.6768, -79.8218);
        assert_eq!(c.to_string(), "(43.67680, -79.82180)");
    }
}
