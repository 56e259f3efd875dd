//! Sample Error Types

use thiserror::Error;

/// A single malformed fix. Recovered locally by the caller, never surfaced.
#[derive(Debug, Clone, Error)]
pub enum SampleError {
    /// Coordinate outside the valid range or not finite
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}
