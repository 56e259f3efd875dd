//! End-of-session summary

use chrono::{DateTime, Duration, Utc};
use infraction_ledger::{Infraction, InfractionKind, InfractionLedger};
use narration::ChecklistItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Results of one drive, as shown on the results screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub route_name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Count per kind; every kind present
    pub counts: BTreeMap<InfractionKind, usize>,
    pub infractions: Vec<Infraction>,
    pub checklist: Vec<ChecklistItem>,
    pub route_completed: bool,
}

impl SessionSummary {
    pub fn new(
        session_id: Uuid,
        route_name: impl Into<String>,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        ledger: &InfractionLedger,
        checklist: Vec<ChecklistItem>,
        route_completed: bool,
    ) -> Self {
        Self {
            session_id,
            route_name: route_name.into(),
            started_at,
            ended_at,
            counts: ledger.summarize(),
            infractions: ledger.entries().to_vec(),
            checklist,
            route_completed,
        }
    }

    pub fn total(&self) -> usize {
        self.infractions.len()
    }

    pub fn count(&self, kind: InfractionKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn duration(&self) -> Duration {
        self.ended_at - self.started_at
    }

    /// One human-readable line per infraction, in recorded order
    pub fn detail_lines(&self) -> Vec<String> {
        self.infractions.iter().map(Infraction::describe).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_math::Coordinate;
    use infraction_ledger::DedupConfig;

    fn summary() -> SessionSummary {
        let now = Utc::now();
        let mut ledger = InfractionLedger::new(DedupConfig::default());
        ledger.record(
            Infraction::new(InfractionKind::FailureToStop, 5.0, now)
                .at_waypoint(2)
                .at_position(Coordinate::new(43.6774, -79.8228)),
        );
        ledger.record(Infraction::new(InfractionKind::Speeding, 12.0, now));

        SessionSummary::new(
            Uuid::new_v4(),
            "Brampton",
            now - Duration::minutes(20),
            now,
            &ledger,
            vec![ChecklistItem::new("Seatbelt")],
            true,
        )
    }

    #[test]
    fn test_counts_cover_every_kind() {
        let summary = summary();
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.counts.len(), InfractionKind::ALL.len());
        assert_eq!(summary.count(InfractionKind::FailureToStop), 1);
        assert_eq!(summary.count(InfractionKind::RouteDeviation), 0);
        assert_eq!(summary.duration(), Duration::minutes(20));
    }

    #[test]
    fn test_detail_lines_in_order() {
        let lines = summary().detail_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Failure to stop"));
        assert!(lines[1].starts_with("Speeding"));
    }

    #[test]
    fn test_json_shape() {
        let summary = summary();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["route_name"], "Brampton");
        assert_eq!(value["counts"]["FailureToStop"], 1);
        assert_eq!(value["checklist"][0]["name"], "Seatbelt");

        let back: SessionSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back.count(InfractionKind::FailureToStop), 1);
        assert_eq!(back.session_id, summary.session_id);
    }
}
