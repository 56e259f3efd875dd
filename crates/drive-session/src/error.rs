//! Session errors

use route_model::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Device capabilities a session may need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    Location,
    Motion,
    Speech,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Location => f.write_str("Location"),
            Capability::Motion => f.write_str("Motion"),
            Capability::Speech => f.write_str("Speech"),
        }
    }
}

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Route data error: {0}")]
    Data(#[from] DataError),

    #[error("{0} permission not granted")]
    Permission(Capability),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Session task failed: {0}")]
    TaskFailed(String),
}
