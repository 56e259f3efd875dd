//! Proximity Engine Implementation

use geo_math::{distance_meters, Coordinate, LocationSample};
use infraction_ledger::{Infraction, InfractionKind};
use route_model::{FeatureKind, RouteModel};
use speed_governor::{SpeedGovernor, SpeedTier};
use tracing::{debug, info, warn};

use crate::{EngineEvent, EngineState, FeatureId, ProgressionPolicy, ProximityConfig};

/// Per-session evaluation engine. Single writer: samples are evaluated one
/// at a time, in arrival order.
pub struct ProximityEngine {
    route: RouteModel,
    config: ProximityConfig,
    governor: SpeedGovernor,
    state: EngineState,
}

impl ProximityEngine {
    pub fn new(route: RouteModel, config: ProximityConfig) -> Self {
        info!(
            "Creating proximity engine for route {} ({:?} progression)",
            route.name(),
            config.progression
        );
        Self {
            governor: SpeedGovernor::new(config.governor),
            route,
            config,
            state: EngineState::new(),
        }
    }

    pub fn route(&self) -> &RouteModel {
        &self.route
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Whether the last sample was close enough to the start to begin
    pub fn can_start(&self) -> bool {
        self.state.is_within_start_region
    }

    /// Reset state for a new session on the same route
    pub fn reset(&mut self) {
        debug!("Resetting engine state for route {}", self.route.name());
        self.state.reset();
    }

    /// Evaluate one sample. A missing sample is a no-op.
    pub fn evaluate(&mut self, sample: Option<&LocationSample>) -> Vec<EngineEvent> {
        let sample = match sample {
            Some(raw) => match raw.sanitized() {
                Ok(sample) => sample,
                Err(e) => {
                    warn!("Skipping location sample: {}", e);
                    return Vec::new();
                }
            },
            None => return Vec::new(),
        };

        let mut events = Vec::new();
        let position = sample.position;
        self.state.samples_evaluated += 1;

        self.state.is_within_start_region =
            distance_meters(&position, &self.route.start_position()) < self.config.start_radius_m;

        let (nearest_index, nearest_distance) = self.nearest_waypoint(&position);
        debug!(
            "Nearest waypoint {} at {:.1} m",
            nearest_index, nearest_distance
        );

        let speed_kmh = self.check_speed(&sample, nearest_index, nearest_distance, &mut events);

        match self.config.progression {
            ProgressionPolicy::ClosestScan => {
                self.progress_closest(nearest_index, nearest_distance, &mut events)
            }
            ProgressionPolicy::IndexedCursor => self.progress_indexed(&position, &mut events),
        }

        self.check_test_markers(&position, &mut events);
        self.check_features(&position, &mut events);
        self.check_mandatory_stops(&sample, speed_kmh, &mut events);
        self.check_deviation(&sample, nearest_distance, &mut events);

        events
    }

    /// Nearest waypoint over the whole route
    fn nearest_waypoint(&self, position: &Coordinate) -> (usize, f64) {
        self.route
            .waypoints()
            .iter()
            .map(|w| (w.index, distance_meters(position, &w.position)))
            .fold((0, f64::MAX), |best, candidate| {
                if candidate.1 < best.1 {
                    candidate
                } else {
                    best
                }
            })
    }

    fn check_speed(
        &mut self,
        sample: &LocationSample,
        nearest_index: usize,
        nearest_distance: f64,
        events: &mut Vec<EngineEvent>,
    ) -> f64 {
        let limit = self
            .route
            .speed_limit_for(nearest_index)
            .unwrap_or(self.config.default_speed_limit_kmh);

        let verdict = self.governor.evaluate(
            sample,
            limit,
            self.state.previous_speed_kmh,
            self.state.previous_heading,
        );

        self.state.previous_speed_kmh = verdict.next_speed_kmh;
        self.state.previous_heading = verdict.next_heading;
        self.state.last_speed_kmh = verdict.speed_kmh;
        self.state.last_tier = verdict.tier;

        if verdict.tier == SpeedTier::Mild {
            events.push(EngineEvent::SpeedAdvisory {
                speed_kmh: verdict.speed_kmh,
                over_limit_kmh: verdict.over_limit_kmh,
            });
        }

        // Tagged only when the driver is actually at the waypoint
        let at_waypoint = nearest_distance < self.config.proximity_radius_m;
        events.extend(verdict.infractions.into_iter().map(|i| {
            EngineEvent::InfractionRecorded(if at_waypoint {
                i.at_waypoint(nearest_index)
            } else {
                i
            })
        }));

        verdict.speed_kmh
    }

    fn progress_closest(
        &mut self,
        nearest_index: usize,
        nearest_distance: f64,
        events: &mut Vec<EngineEvent>,
    ) {
        if nearest_distance >= self.config.proximity_radius_m {
            return;
        }
        // Cursor is advisory under this policy
        self.state.advance_cursor_to(nearest_index);
        self.announce_waypoint(nearest_index, events);
    }

    fn progress_indexed(&mut self, position: &Coordinate, events: &mut Vec<EngineEvent>) {
        let cursor = self.state.current_waypoint_cursor;
        let target = match self.route.waypoints().get(cursor) {
            Some(waypoint) => waypoint.position,
            None => return,
        };

        if distance_meters(position, &target) < self.config.proximity_radius_m {
            self.announce_waypoint(cursor, events);
            self.state.advance_cursor_to(cursor + 1);
            debug!("Cursor advanced to {}", self.state.current_waypoint_cursor);
        }
    }

    fn announce_waypoint(&mut self, index: usize, events: &mut Vec<EngineEvent>) {
        let instruction = match self.route.waypoints().get(index) {
            Some(waypoint) => waypoint.instruction.clone(),
            None => return,
        };

        if self.state.last_instruction_spoken.as_deref() == Some(instruction.as_str()) {
            return;
        }
        if !self.state.mark_announced(FeatureId::Instruction(index)) {
            return;
        }

        info!("Instruction {}: {}", index, instruction);
        self.state.last_instruction_spoken = Some(instruction.clone());
        events.push(EngineEvent::InstructionChanged {
            waypoint_index: index,
            instruction,
        });

        if self.route.is_final_waypoint(index) && !self.state.route_completed {
            info!("Route {} completed", self.route.name());
            self.state.route_completed = true;
            events.push(EngineEvent::RouteCompleted);
        }
    }

    fn check_test_markers(&mut self, position: &Coordinate, events: &mut Vec<EngineEvent>) {
        let closest = self
            .route
            .test_markers()
            .iter()
            .map(|m| (m, distance_meters(position, &m.position)))
            .filter(|(_, d)| *d < self.config.proximity_radius_m)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let marker = match closest {
            Some((marker, _)) => marker,
            None => return,
        };

        if self.state.last_instruction_spoken.as_deref() == Some(marker.instruction.as_str()) {
            return;
        }
        if self.state.mark_announced(FeatureId::TestMarker(marker.index)) {
            info!("Test maneuver {}: {}", marker.index, marker.instruction);
            self.state.last_instruction_spoken = Some(marker.instruction.clone());
            events.push(EngineEvent::TestManeuver {
                marker_index: marker.index,
                instruction: marker.instruction.clone(),
            });
        }
    }

    fn check_features(&mut self, position: &Coordinate, events: &mut Vec<EngineEvent>) {
        self.state.is_near_stop_sign = false;
        self.state.is_near_traffic_light = false;

        let radius = self.config.proximity_radius_m;
        let nearby: Vec<_> = self
            .route
            .features()
            .filter(|f| distance_meters(position, &f.position) < radius)
            .collect();

        for feature in nearby {
            let (id, event) = match feature.kind {
                FeatureKind::StopSign => {
                    self.state.is_near_stop_sign = true;
                    (
                        FeatureId::StopSign(feature.index),
                        EngineEvent::ApproachingStopSign {
                            feature_index: feature.index,
                        },
                    )
                }
                FeatureKind::TrafficLight => {
                    self.state.is_near_traffic_light = true;
                    (
                        FeatureId::TrafficLight(feature.index),
                        EngineEvent::ApproachingTrafficLight {
                            feature_index: feature.index,
                        },
                    )
                }
            };

            if self.state.mark_announced(id) {
                debug!("Announcing {:?} at {}", feature.kind, feature.position);
                events.push(event);
            }
        }
    }

    fn check_mandatory_stops(
        &mut self,
        sample: &LocationSample,
        speed_kmh: f64,
        events: &mut Vec<EngineEvent>,
    ) {
        let radius = self.config.proximity_radius_m;
        let zones: Vec<(usize, bool)> = self
            .route
            .waypoints()
            .iter()
            .filter(|w| w.requires_stop)
            .map(|w| (w.index, distance_meters(&sample.position, &w.position) < radius))
            .collect();

        let moving = speed_kmh > self.config.stop_speed_threshold_kmh;
        for (index, inside) in zones {
            let visit = match self.state.track_stop_zone(index, inside) {
                Some(visit) => visit,
                None => continue,
            };
            if moving && self.state.mark_announced(FeatureId::StopCheck { index, visit }) {
                info!("Failure to stop at waypoint {} (approach {})", index, visit + 1);
                events.push(EngineEvent::InfractionRecorded(
                    Infraction::new(InfractionKind::FailureToStop, speed_kmh, sample.timestamp)
                        .at_waypoint(index)
                        .at_position(sample.position),
                ));
            }
        }
    }

    fn check_deviation(
        &mut self,
        sample: &LocationSample,
        nearest_distance: f64,
        events: &mut Vec<EngineEvent>,
    ) {
        let off_route = nearest_distance > self.config.off_route_radius_m;
        if off_route != self.state.is_off_route {
            if off_route {
                warn!("Off route: {:.0} m from nearest waypoint", nearest_distance);
            } else {
                info!("Back on route");
            }
            events.push(EngineEvent::OffRouteChanged { off_route });
        }
        self.state.is_off_route = off_route;

        if !off_route {
            // Re-arm for the next excursion
            self.state.deviation_logged = false;
        } else if nearest_distance > self.config.deviation_infraction_radius_m
            && !self.state.deviation_logged
        {
            self.state.deviation_logged = true;
            events.push(EngineEvent::InfractionRecorded(
                Infraction::new(
                    InfractionKind::RouteDeviation,
                    nearest_distance,
                    sample.timestamp,
                )
                .at_position(sample.position),
            ));
        }
    }
}
