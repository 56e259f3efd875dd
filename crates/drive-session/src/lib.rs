//! Drive Session
//!
//! Wires location and motion feeds into the proximity engine, the infraction
//! ledger, and the narrator for the lifetime of one drive.

mod error;
mod session;
mod settings;
mod snapshot;
mod summary;

pub use error::{Capability, SessionError};
pub use session::{Authorization, DriveSession, LocationFeed, SessionHandle};
pub use settings::DriveSettings;
pub use snapshot::{SessionSnapshot, INITIAL_INSTRUCTION};
pub use summary::SessionSummary;

use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging() -> Result<(), SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

/// Initialize logging with one JSON object per line
pub fn init_json_logging() -> Result<(), SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .json()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
