//! Proximity & Infraction Evaluation Engine
//!
//! Consumes noisy, irregular location samples against a route and produces:
//! - Monotonic progression through the route's waypoints
//! - One-shot narration triggers for instructions, stop signs, traffic lights
//! - Infractions (speeding, failure to stop, sudden changes, deviation)
//!
//! Each evaluation returns its events explicitly; listeners (ledger,
//! narrator) consume them independently.

mod config;
mod engine;
mod event;
mod state;

pub use config::{ProgressionPolicy, ProximityConfig};
pub use engine::ProximityEngine;
pub use event::{EngineEvent, STOP_SIGN_ANNOUNCEMENT, TRAFFIC_LIGHT_ANNOUNCEMENT};
pub use state::{EngineState, FeatureId};
