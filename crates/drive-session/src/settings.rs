//! Session settings

use config::{Config, Environment, File};
use infraction_ledger::DedupConfig;
use motion_classifier::MotionThresholds;
use narration::{Checklist, NarrationConfig, DEFAULT_CHECKLIST_ITEMS};
use proximity_engine::ProximityConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::SessionError;

/// Everything tunable about a drive session.
///
/// Loaded from an optional TOML file, then overridden by `DRIVESMART__…`
/// environment variables (`DRIVESMART__PROXIMITY__PROXIMITY_RADIUS_M=25`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    pub proximity: ProximityConfig,
    pub motion: MotionThresholds,
    pub dedup: DedupConfig,
    pub narration: NarrationConfig,
    /// Pre-drive checklist item names
    pub checklist: Vec<String>,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            proximity: ProximityConfig::default(),
            motion: MotionThresholds::default(),
            dedup: DedupConfig::default(),
            narration: NarrationConfig::default(),
            checklist: DEFAULT_CHECKLIST_ITEMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DriveSettings {
    /// Load settings; a given file must exist
    pub fn load(path: Option<&Path>) -> Result<Self, SessionError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("DRIVESMART")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Fresh, unchecked checklist built from the configured names
    pub fn checklist(&self) -> Checklist {
        Checklist::new(self.checklist.iter().cloned())
    }
}
