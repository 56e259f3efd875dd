//! Location samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Coordinate, SampleError};

/// A single GPS fix pushed by the device location stream.
///
/// Fixes arrive at irregular intervals (the platform filter only emits after
/// roughly 10 m of movement). Speed may be negative when the fix carries no
/// valid velocity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub position: Coordinate,
    /// Ground speed (m/s), negative when invalid
    pub speed_mps: f64,
    /// Course over ground (degrees from true north)
    #[serde(default)]
    pub heading_degrees: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(position: Coordinate, speed_mps: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            position,
            speed_mps,
            heading_degrees: None,
            timestamp,
        }
    }

    pub fn with_heading(mut self, heading_degrees: f64) -> Self {
        self.heading_degrees = Some(heading_degrees);
        self
    }

    /// Build a sample from a speed expressed in km/h
    pub fn from_kmh(position: Coordinate, speed_kmh: f64, timestamp: DateTime<Utc>) -> Self {
        Self::new(position, speed_kmh / 3.6, timestamp)
    }

    /// Speed in km/h, clamped to zero and quantised to 0.001 km/h
    pub fn speed_kmh(&self) -> f64 {
        let mps = if self.speed_mps.is_finite() {
            self.speed_mps.max(0.0)
        } else {
            0.0
        };
        (mps * 3.6 * 1000.0).round() / 1000.0
    }

    /// Validate and normalise a raw fix.
    ///
    /// Invalid coordinates reject the sample. Bad speed is clamped to zero,
    /// and a negative or non-finite heading ("course unavailable") becomes `None`.
    pub fn sanitized(&self) -> Result<LocationSample, SampleError> {
        if !self.position.is_valid() {
            return Err(SampleError::InvalidCoordinate {
                latitude: self.position.latitude,
                longitude: self.position.longitude,
            });
        }

        let speed_mps = if self.speed_mps.is_finite() {
            self.speed_mps.max(0.0)
        } else {
            0.0
        };

        let heading_degrees = self
            .heading_degrees
            .filter(|h| h.is_finite() && *h >= 0.0)
            .map(|h| h.rem_euclid(360.0));

        Ok(LocationSample {
            position: self.position,
            speed_mps,
            heading_degrees,
            timestamp: self.timestamp,
        })
    }
}
