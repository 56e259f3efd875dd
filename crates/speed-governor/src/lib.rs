//! Speed Governor
//!
//! Per-sample speed checks against the applicable limit:
//! - Two-band speeding tiers (mild is advisory, severe is logged)
//! - Sudden acceleration / braking between consecutive fixes
//! - Turning too fast (large heading change above a speed threshold)

mod config;

pub use config::GovernorConfig;

use geo_math::{heading_delta, LocationSample};
use infraction_ledger::{Infraction, InfractionKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Speeding tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedTier {
    #[default]
    Normal,
    /// Over the limit, advisory only
    Mild,
    /// Over the limit by more than the severe band; always logged
    Severe,
}

impl SpeedTier {
    pub fn classify(over_limit_kmh: f64, config: &GovernorConfig) -> Self {
        if over_limit_kmh <= 0.0 {
            SpeedTier::Normal
        } else if over_limit_kmh <= config.severe_over_kmh {
            SpeedTier::Mild
        } else {
            SpeedTier::Severe
        }
    }
}

/// Result of evaluating one sample
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedVerdict {
    /// Clamped speed (km/h)
    pub speed_kmh: f64,
    /// Speed minus limit (km/h); negative when under
    pub over_limit_kmh: f64,
    pub tier: SpeedTier,
    pub infractions: Vec<Infraction>,
    /// Values to persist as the previous speed/heading for the next sample
    pub next_speed_kmh: f64,
    pub next_heading: Option<f64>,
}

/// Stateless speed evaluator; the caller persists previous speed/heading
#[derive(Debug, Clone, Default)]
pub struct SpeedGovernor {
    config: GovernorConfig,
}

impl SpeedGovernor {
    pub fn new(config: GovernorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Evaluate a sample against the applicable limit
    pub fn evaluate(
        &self,
        sample: &LocationSample,
        limit_kmh: f64,
        prev_speed_kmh: f64,
        prev_heading: Option<f64>,
    ) -> SpeedVerdict {
        let kmh = sample.speed_kmh();
        let mut infractions = Vec::new();

        let over = kmh - limit_kmh;
        let tier = SpeedTier::classify(over, &self.config);
        if tier == SpeedTier::Severe {
            debug!("Severe speeding: {:.1} km/h in a {:.0} km/h zone", kmh, limit_kmh);
            infractions.push(
                Infraction::new(InfractionKind::Speeding, over, sample.timestamp)
                    .at_position(sample.position),
            );
        }

        let diff = (kmh - prev_speed_kmh).abs();
        if diff > self.config.sudden_change_kmh {
            let kind = if kmh > prev_speed_kmh {
                InfractionKind::SuddenAcceleration
            } else {
                InfractionKind::SuddenBraking
            };
            debug!("{}: {:.1} -> {:.1} km/h", kind, prev_speed_kmh, kmh);
            infractions.push(
                Infraction::new(kind, diff, sample.timestamp).at_position(sample.position),
            );
        }

        if let (Some(prev), Some(current)) = (prev_heading, sample.heading_degrees) {
            let turned = heading_delta(current, prev);
            if turned > self.config.turn_heading_change_deg && kmh > self.config.turn_speed_limit_kmh
            {
                debug!("Turn of {:.0}° at {:.1} km/h", turned, kmh);
                infractions.push(
                    Infraction::new(InfractionKind::ExcessiveTurnSpeed, kmh, sample.timestamp)
                        .at_position(sample.position),
                );
            }
        }

        SpeedVerdict {
            speed_kmh: kmh,
            over_limit_kmh: over,
            tier,
            infractions,
            next_speed_kmh: kmh,
            next_heading: sample.heading_degrees,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use geo_math::Coordinate;
    use proptest::prelude::*;

    fn at_kmh(kmh: f64) -> LocationSample {
        LocationSample::from_kmh(Coordinate::new(43.6768, -79.8218), kmh, Utc::now())
    }

    fn kinds(verdict: &SpeedVerdict) -> Vec<InfractionKind> {
        verdict.infractions.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_speeding_tier_boundary() {
        let governor = SpeedGovernor::default();

        let mild = governor.evaluate(&at_kmh(39.0), 30.0, 39.0, None);
        assert_eq!(mild.tier, SpeedTier::Mild);
        assert!(mild.infractions.is_empty());

        let severe = governor.evaluate(&at_kmh(40.0), 30.0, 40.0, None);
        assert_eq!(severe.tier, SpeedTier::Severe);
        assert_eq!(kinds(&severe), vec![InfractionKind::Speeding]);
        assert_eq!(severe.infractions[0].magnitude, 10.0);
    }

    #[test]
    fn test_under_and_at_limit_is_normal() {
        let governor = SpeedGovernor::default();
        assert_eq!(governor.evaluate(&at_kmh(25.0), 30.0, 25.0, None).tier, SpeedTier::Normal);
        assert_eq!(governor.evaluate(&at_kmh(30.0), 30.0, 30.0, None).tier, SpeedTier::Normal);
    }

    #[test]
    fn test_negative_speed_clamped() {
        let governor = SpeedGovernor::default();
        let sample = LocationSample::new(Coordinate::new(43.6768, -79.8218), -5.0, Utc::now());
        let verdict = governor.evaluate(&sample, 30.0, 0.0, None);
        assert_eq!(verdict.speed_kmh, 0.0);
        assert!(verdict.infractions.is_empty());
    }

    #[test]
    fn test_sudden_changes() {
        let governor = SpeedGovernor::default();

        let up = governor.evaluate(&at_kmh(25.0), 50.0, 10.0, None);
        assert_eq!(kinds(&up), vec![InfractionKind::SuddenAcceleration]);
        assert_eq!(up.infractions[0].magnitude, 15.0);

        let down = governor.evaluate(&at_kmh(5.0), 50.0, 35.0, None);
        assert_eq!(kinds(&down), vec![InfractionKind::SuddenBraking]);

        let gentle = governor.evaluate(&at_kmh(20.0), 50.0, 10.0, None);
        assert!(gentle.infractions.is_empty());
    }

    #[test]
    fn test_turn_speed() {
        let governor = SpeedGovernor::default();

        let fast_turn = governor.evaluate(&at_kmh(30.0).with_heading(90.0), 50.0, 30.0, Some(0.0));
        assert_eq!(kinds(&fast_turn), vec![InfractionKind::ExcessiveTurnSpeed]);
        assert_eq!(fast_turn.infractions[0].magnitude, 30.0);

        let slow_turn = governor.evaluate(&at_kmh(15.0).with_heading(90.0), 50.0, 15.0, Some(0.0));
        assert!(slow_turn.infractions.is_empty());

        // 350° -> 10° is a 20° change, not 340°
        let across_north =
            governor.evaluate(&at_kmh(30.0).with_heading(10.0), 50.0, 30.0, Some(350.0));
        assert!(across_north.infractions.is_empty());
    }

    #[test]
    fn test_missing_heading_skips_turn_check() {
        let governor = SpeedGovernor::default();
        let verdict = governor.evaluate(&at_kmh(30.0), 50.0, 30.0, Some(0.0));
        assert!(verdict.infractions.is_empty());
        assert_eq!(verdict.next_heading, None);
        assert_eq!(verdict.next_speed_kmh, 30.0);
    }

    #[test]
    fn test_strict_preset_logs_mild_band() {
        let governor = SpeedGovernor::new(GovernorConfig::strict());
        let verdict = governor.evaluate(&at_kmh(36.0), 30.0, 36.0, None);
        assert_eq!(verdict.tier, SpeedTier::Severe);
    }

    proptest! {
        #[test]
        fn prop_only_severe_logs_speeding(kmh in 0.0f64..150.0, limit in 10.0f64..100.0) {
            let governor = SpeedGovernor::default();
            let verdict = governor.evaluate(&at_kmh(kmh), limit, kmh, None);
            let logged = verdict.infractions.iter().any(|i| i.kind == InfractionKind::Speeding);
            prop_assert_eq!(logged, verdict.tier == SpeedTier::Severe);
            prop_assert!(verdict.speed_kmh >= 0.0);
        }
    }
}
