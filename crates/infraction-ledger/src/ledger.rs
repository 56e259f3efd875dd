//! Ledger Implementation

use chrono::{DateTime, Utc};
use geo_math::Coordinate;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::{DedupConfig, DedupPolicy, Infraction, InfractionKind};

/// Append-only infraction log for one session
#[derive(Debug, Clone, Default)]
pub struct InfractionLedger {
    entries: Vec<Infraction>,
    policy: DedupPolicy,
}

impl InfractionLedger {
    pub fn new(config: DedupConfig) -> Self {
        Self {
            entries: Vec::new(),
            policy: DedupPolicy::new(config),
        }
    }

    /// Append an infraction. Never rejects: separate approach events that
    /// look alike are still separate infractions.
    pub fn record(&mut self, infraction: Infraction) {
        info!("Infraction recorded: {}", infraction.describe());
        self.entries.push(infraction);
    }

    /// Feed a motion level signal through the dedup policy.
    ///
    /// Returns the recorded infraction when the observation was admitted.
    pub fn observe_level(
        &mut self,
        kind: InfractionKind,
        active: bool,
        magnitude: f64,
        at: DateTime<Utc>,
        position: Option<Coordinate>,
    ) -> Option<&Infraction> {
        if !self.policy.admit(kind, active, at) {
            return None;
        }

        let mut infraction = Infraction::new(kind, magnitude, at).from_motion();
        infraction.position = position;
        self.record(infraction);
        self.entries.last()
    }

    /// Count per kind; every kind present, zero when never recorded
    pub fn summarize(&self) -> BTreeMap<InfractionKind, usize> {
        let mut counts: BTreeMap<InfractionKind, usize> =
            InfractionKind::ALL.iter().map(|&k| (k, 0)).collect();
        for entry in &self.entries {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, kind: InfractionKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn entries(&self) -> &[Infraction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy(&self) -> &DedupPolicy {
        &self.policy
    }

    /// Clear for a new session. Never called mid-session.
    pub fn reset(&mut self) {
        debug!("Resetting ledger ({} entries)", self.entries.len());
        self.entries.clear();
        self.policy.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_record_and_summarize() {
        let mut ledger = InfractionLedger::default();
        let now = Utc::now();
        ledger.record(Infraction::new(InfractionKind::Speeding, 12.0, now));
        ledger.record(Infraction::new(InfractionKind::Speeding, 12.0, now));
        ledger.record(Infraction::new(InfractionKind::FailureToStop, 3.0, now).at_waypoint(1));

        let summary = ledger.summarize();
        assert_eq!(summary[&InfractionKind::Speeding], 2);
        assert_eq!(summary[&InfractionKind::FailureToStop], 1);
        assert_eq!(summary[&InfractionKind::RouteDeviation], 0);
        assert_eq!(summary.len(), InfractionKind::ALL.len());
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_observe_level_debounces() {
        let mut ledger = InfractionLedger::default();
        let now = Utc::now();

        assert!(ledger
            .observe_level(InfractionKind::SuddenBraking, true, 3.1, now, None)
            .is_some());
        for _ in 0..10 {
            assert!(ledger
                .observe_level(InfractionKind::SuddenBraking, true, 3.4, now, None)
                .is_none());
        }
        assert_eq!(ledger.count(InfractionKind::SuddenBraking), 1);
        assert_eq!(
            ledger.entries()[0].source,
            crate::InfractionSource::Motion
        );
    }

    #[test]
    fn test_reset_clears_entries_and_policy() {
        let mut ledger = InfractionLedger::default();
        let now = Utc::now();
        ledger.observe_level(InfractionKind::SuddenBraking, true, 3.1, now, None);
        ledger.reset();
        assert!(ledger.is_empty());
        assert!(ledger
            .observe_level(InfractionKind::SuddenBraking, true, 3.1, now, None)
            .is_some());
    }

    proptest! {
        #[test]
        fn prop_record_is_append_only(kinds in proptest::collection::vec(0usize..6, 0..50)) {
            let mut ledger = InfractionLedger::default();
            let now = Utc::now();
            for (i, k) in kinds.iter().enumerate() {
                ledger.record(Infraction::new(InfractionKind::ALL[*k], i as f64, now));
                prop_assert_eq!(ledger.len(), i + 1);
            }
            let total: usize = ledger.summarize().values().sum();
            prop_assert_eq!(total, kinds.len());
        }
    }
}
