//! Session Implementation

use chrono::{DateTime, Utc};
use geo_math::{Coordinate, LocationSample};
use infraction_ledger::{InfractionKind, InfractionLedger};
use motion_classifier::{classify, MotionClass, MotionFeed, MotionSample, MotionThresholds};
use narration::{Checklist, NarrationDispatcher, SpeechOutput};
use proximity_engine::{EngineEvent, ProximityEngine};
use route_model::RouteModel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    Capability, DriveSettings, SessionError, SessionSnapshot, SessionSummary, INITIAL_INSTRUCTION,
};

/// Platform permission state for a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authorization {
    Authorized,
    Denied,
    Restricted,
    Undetermined,
}

/// Location stream handed to a session. `None` items are missing fixes.
pub struct LocationFeed {
    pub authorization: Authorization,
    pub samples: mpsc::Receiver<Option<LocationSample>>,
}

impl LocationFeed {
    /// Feed driven by an external producer
    pub fn channel(
        authorization: Authorization,
        capacity: usize,
    ) -> (mpsc::Sender<Option<LocationSample>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            tx,
            Self {
                authorization,
                samples: rx,
            },
        )
    }
}

/// What the session task hands back when it stops
struct SessionOutcome {
    ledger: InfractionLedger,
    route_completed: bool,
}

/// Per-drive state owned by the session task.
///
/// Location samples drive the engine; motion samples go straight to the
/// ledger's dedup policy. Only the ledger sees both.
pub struct DriveSession {
    engine: ProximityEngine,
    ledger: InfractionLedger,
    narrator: NarrationDispatcher,
    thresholds: MotionThresholds,
    snapshot: watch::Sender<SessionSnapshot>,
    current_instruction: String,
    motion: MotionClass,
    last_position: Option<Coordinate>,
    location_samples: u64,
    motion_samples: u64,
}

impl DriveSession {
    /// Start a session on the current tokio runtime
    pub fn start(
        settings: DriveSettings,
        route: RouteModel,
        location: LocationFeed,
        motion: MotionFeed,
        speech: Arc<dyn SpeechOutput>,
        checklist: Checklist,
    ) -> Result<SessionHandle, SessionError> {
        if location.authorization != Authorization::Authorized {
            warn!(
                "Location authorization is {:?}; session not started",
                location.authorization
            );
            return Err(SessionError::Permission(Capability::Location));
        }
        if !motion.is_available() {
            warn!("{} unavailable; motion checks disabled", Capability::Motion);
        }

        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let route_name = route.name().to_string();
        info!(
            "Starting session {} on route {} ({} waypoints)",
            id,
            route_name,
            route.waypoints().len()
        );

        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let session = DriveSession {
            engine: ProximityEngine::new(route, settings.proximity),
            ledger: InfractionLedger::new(settings.dedup),
            narrator: NarrationDispatcher::new(speech, settings.narration),
            thresholds: settings.motion,
            snapshot: snapshot_tx,
            current_instruction: INITIAL_INSTRUCTION.to_string(),
            motion: MotionClass::default(),
            last_position: None,
            location_samples: 0,
            motion_samples: 0,
        };

        let task = tokio::spawn(session.run(location.samples, motion, shutdown_rx));

        Ok(SessionHandle {
            id,
            route_name,
            started_at,
            checklist,
            snapshot: snapshot_rx,
            shutdown: shutdown_tx,
            task,
        })
    }

    async fn run(
        mut self,
        mut locations: mpsc::Receiver<Option<LocationSample>>,
        mut motion: MotionFeed,
        mut shutdown: oneshot::Receiver<()>,
    ) -> SessionOutcome {
        let mut location_open = true;
        let mut motion_open = motion.is_available();
        let mut stopped = false;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    stopped = true;
                    break;
                }

                sample = locations.recv(), if location_open => match sample {
                    Some(sample) => self.on_location(sample.as_ref()),
                    None => {
                        debug!("Location feed closed");
                        location_open = false;
                    }
                },

                sample = motion.next(), if motion_open => match sample {
                    Some(sample) => self.on_motion(&sample),
                    None => {
                        debug!("Motion feed closed");
                        motion_open = false;
                    }
                },

                else => break,
            }
        }

        if !stopped {
            // Both feeds ended on their own; hold results until asked
            let _ = shutdown.await;
        }

        // No sample is consumed once the session is ending
        locations.close();
        motion.close();
        self.narrator.cancel();

        let route_completed = self.engine.state().route_completed;
        info!(
            "Session loop stopped after {} location and {} motion samples",
            self.location_samples, self.motion_samples
        );
        drop(self.engine);

        SessionOutcome {
            ledger: self.ledger,
            route_completed,
        }
    }

    fn on_location(&mut self, sample: Option<&LocationSample>) {
        metrics::counter!("drive_location_samples_total").increment(1);
        self.location_samples += 1;

        if let Some(sample) = sample {
            if sample.position.is_valid() {
                self.last_position = Some(sample.position);
            }
        }

        for event in self.engine.evaluate(sample) {
            // Whatever is spoken is what the driver sees
            if let Some(text) = event.narration() {
                if self.narrator.announce(&text) {
                    metrics::counter!("drive_narrations_total").increment(1);
                }
                self.current_instruction = text;
            }

            match event {
                EngineEvent::InfractionRecorded(infraction) => {
                    metrics::counter!("drive_infractions_total", "kind" => infraction.kind.as_str())
                        .increment(1);
                    self.ledger.record(infraction);
                }
                EngineEvent::SpeedAdvisory {
                    speed_kmh,
                    over_limit_kmh,
                } => {
                    debug!(
                        "Speed advisory: {:.1} km/h, {:.1} over",
                        speed_kmh, over_limit_kmh
                    );
                }
                EngineEvent::RouteCompleted => info!("Route completed"),
                _ => {}
            }
        }

        self.publish();
    }

    fn on_motion(&mut self, sample: &MotionSample) {
        metrics::counter!("drive_motion_samples_total").increment(1);
        self.motion_samples += 1;

        let class = classify(sample, &self.thresholds);
        let accel = sample.acceleration_z.abs();
        let signals = [
            (InfractionKind::SuddenBraking, class.is_hard_braking, accel),
            (InfractionKind::SuddenAcceleration, class.is_hard_acceleration, accel),
            (
                InfractionKind::ExcessiveTurnSpeed,
                class.is_hard_turning,
                sample.rotation_rate_y.abs(),
            ),
        ];

        for (kind, active, magnitude) in signals {
            let recorded = self
                .ledger
                .observe_level(kind, active, magnitude, sample.timestamp, self.last_position)
                .is_some();
            if recorded {
                metrics::counter!("drive_infractions_total", "kind" => kind.as_str()).increment(1);
            }
        }

        self.motion = class;
        self.publish();
    }

    fn publish(&self) {
        let state = self.engine.state();
        self.snapshot.send_replace(SessionSnapshot {
            is_within_start_region: state.is_within_start_region,
            is_off_route: state.is_off_route,
            is_near_stop_sign: state.is_near_stop_sign,
            is_near_traffic_light: state.is_near_traffic_light,
            current_instruction: self.current_instruction.clone(),
            speed_kmh: state.last_speed_kmh,
            speed_tier: state.last_tier,
            motion: self.motion,
            waypoint_cursor: state.current_waypoint_cursor,
            infraction_count: self.ledger.len(),
            route_completed: state.route_completed,
            location_samples: self.location_samples,
            motion_samples: self.motion_samples,
        });
    }
}

/// Caller's side of a running session
pub struct SessionHandle {
    id: Uuid,
    route_name: String,
    started_at: DateTime<Utc>,
    checklist: Checklist,
    snapshot: watch::Receiver<SessionSnapshot>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Stop the session and collect its results
    pub async fn end(self) -> Result<SessionSummary, SessionError> {
        info!("Ending session {}", self.id);
        // The task may already have finished
        let _ = self.shutdown.send(());

        let outcome = self
            .task
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))?;

        let summary = SessionSummary::new(
            self.id,
            self.route_name,
            self.started_at,
            Utc::now(),
            &outcome.ledger,
            self.checklist.snapshot(),
            outcome.route_completed,
        );
        info!(
            "Session {} ended with {} infraction(s)",
            summary.session_id,
            summary.total()
        );
        Ok(summary)
    }
}
