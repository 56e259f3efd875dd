//! Level-signal deduplication

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::InfractionKind;

/// Dedup configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Minimum spacing between two recorded occurrences of the same kind (ms)
    pub cooldown_ms: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self { cooldown_ms: 3000 }
    }
}

/// Tracking state for one signal kind
#[derive(Debug, Clone, Default)]
pub struct SignalState {
    /// Level seen on the previous observation
    pub active: bool,
    /// Timestamp of the last admitted occurrence
    pub last_recorded: Option<DateTime<Utc>>,
    /// Number of admitted occurrences
    pub record_count: usize,
    /// Rising edges dropped by the cooldown
    pub suppressed: usize,
}

/// Turns a level signal into discrete occurrences.
///
/// An occurrence is admitted on a rising edge (inactive → active), and only
/// once the cooldown since the previous admitted occurrence has elapsed.
#[derive(Debug, Clone)]
pub struct DedupPolicy {
    config: DedupConfig,
    states: HashMap<InfractionKind, SignalState>,
}

impl DedupPolicy {
    pub fn new(config: DedupConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// Observe the current level of a signal; true when it should be recorded
    pub fn admit(&mut self, kind: InfractionKind, active: bool, at: DateTime<Utc>) -> bool {
        // Saturates instead of wrapping negative
        let cooldown =
            Duration::milliseconds(i64::try_from(self.config.cooldown_ms).unwrap_or(i64::MAX));
        let state = self.states.entry(kind).or_default();

        let rising = active && !state.active;
        state.active = active;
        if !rising {
            return false;
        }

        if let Some(last) = state.last_recorded {
            if at - last < cooldown {
                state.suppressed += 1;
                debug!("{} suppressed: in cooldown period", kind);
                return false;
            }
        }

        state.last_recorded = Some(at);
        state.record_count += 1;
        true
    }

    pub fn state(&self, kind: InfractionKind) -> Option<&SignalState> {
        self.states.get(&kind)
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self::new(DedupConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_only_rising_edges_admitted() {
        let mut policy = DedupPolicy::default();
        let kind = InfractionKind::SuddenBraking;

        assert!(!policy.admit(kind, false, t(0)));
        assert!(policy.admit(kind, true, t(100)));
        // Held level is one occurrence
        assert!(!policy.admit(kind, true, t(200)));
        assert!(!policy.admit(kind, true, t(300)));
        assert_eq!(policy.state(kind).unwrap().record_count, 1);
    }

    #[test]
    fn test_cooldown_suppresses_chatter() {
        let mut policy = DedupPolicy::new(DedupConfig { cooldown_ms: 1000 });
        let kind = InfractionKind::ExcessiveTurnSpeed;

        assert!(policy.admit(kind, true, t(0)));
        assert!(!policy.admit(kind, false, t(100)));
        assert!(!policy.admit(kind, true, t(200)));
        assert_eq!(policy.state(kind).unwrap().suppressed, 1);

        assert!(!policy.admit(kind, false, t(1100)));
        assert!(policy.admit(kind, true, t(1200)));
    }

    #[test]
    fn test_oversized_cooldown_never_readmits() {
        for cooldown_ms in [u64::MAX, 1 << 63] {
            let mut policy = DedupPolicy::new(DedupConfig { cooldown_ms });
            let kind = InfractionKind::SuddenBraking;

            assert!(policy.admit(kind, true, t(0)));
            assert!(!policy.admit(kind, false, t(100)));
            assert!(!policy.admit(kind, true, t(86_400_000)));
            assert_eq!(policy.state(kind).unwrap().suppressed, 1);
        }
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut policy = DedupPolicy::default();
        assert!(policy.admit(InfractionKind::SuddenBraking, true, t(0)));
        assert!(policy.admit(InfractionKind::SuddenAcceleration, true, t(0)));
    }

    #[test]
    fn test_clear() {
        let mut policy = DedupPolicy::default();
        assert!(policy.admit(InfractionKind::SuddenBraking, true, t(0)));
        policy.clear();
        assert!(policy.state(InfractionKind::SuddenBraking).is_none());
        assert!(policy.admit(InfractionKind::SuddenBraking, true, t(10)));
    }
}
