//! Infraction Ledger
//!
//! Timestamped record of detected infractions:
//! - Append-only log (never rejects an entry)
//! - Per-kind counts for the session summary
//! - Rising-edge + cooldown deduplication for level signals (motion sensors)

mod dedup;
mod infraction;
mod ledger;

pub use dedup::{DedupConfig, DedupPolicy, SignalState};
pub use infraction::{Infraction, InfractionKind, InfractionSource};
pub use ledger::InfractionLedger;
