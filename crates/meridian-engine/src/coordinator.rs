//! Mission coordination: per-mission lifecycle, telemetry fan-in, the
//! monitor loop with replan triggering, completion detection, and event
//! publication.
//!
//! The coordinator exclusively owns mission records and their monitor
//! tasks. Status transitions are serialized per mission through its
//! monitor; the registry lock is never held across an await.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use meridian_core::constants::{
    EVENT_BACKLOG_CAPACITY, INTERCEPT_DEFAULT_HORIZON_SECS, MONITOR_TICK_SECS, STREAM_CAPACITY,
};
use meridian_core::enums::{MissionStatus, PayloadKind};
use meridian_core::error::{GuidanceError, Result};
use meridian_core::events::{MissionEvent, MissionEventKind};
use meridian_core::limits::limits_for;
use meridian_core::mission::{Mission, MissionId, MissionSpec};
use meridian_core::types::{EntityState, Trajectory, TrajectoryId, Vector3};
use meridian_estimator::{Observation, StateEstimator};
use meridian_planner::{
    predicted_intercept, solution_trajectory, PlanConstraints, TargetTrack, TrajectoryPlanner,
};
use meridian_planner::planner::PlannerConfig;
use meridian_stealth::evaluate::ThreatPicture;

use crate::payload::PayloadControl;
use crate::backoff::Backoff;

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Planner sampling seed.
    pub planner_seed: u64,
    /// Monitor loop tick when no telemetry arrives.
    pub monitor_tick: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            planner_seed: 42,
            monitor_tick: Duration::from_secs_f64(MONITOR_TICK_SECS),
        }
    }
}

struct MonitorHandle {
    telemetry_tx: mpsc::Sender<EntityState>,
    cancel: CancellationToken,
}

struct Inner {
    config: CoordinatorConfig,
    started: tokio::time::Instant,
    missions: RwLock<HashMap<MissionId, Mission>>,
    /// Trajectories owned by the mission that referenced them last.
    trajectories: RwLock<HashMap<TrajectoryId, Trajectory>>,
    payloads: RwLock<HashMap<String, Arc<dyn PayloadControl>>>,
    planner: Mutex<TrajectoryPlanner>,
    estimator: Mutex<StateEstimator>,
    threats: RwLock<ThreatPicture>,
    /// Bumped on every threat-picture change; monitors replan when the
    /// epoch moves under them.
    threat_epoch: AtomicU64,
    monitors: Mutex<HashMap<MissionId, MonitorHandle>>,
    events_tx: broadcast::Sender<MissionEvent>,
    telemetry_dropped: AtomicU64,
}

/// The mission coordinator.
#[derive(Clone)]
pub struct MissionCoordinator {
    inner: Arc<Inner>,
}

impl MissionCoordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_BACKLOG_CAPACITY);
        let planner = TrajectoryPlanner::new(PlannerConfig {
            seed: config.planner_seed,
        });
        MissionCoordinator {
            inner: Arc::new(Inner {
                config,
                started: tokio::time::Instant::now(),
                missions: RwLock::new(HashMap::new()),
                trajectories: RwLock::new(HashMap::new()),
                payloads: RwLock::new(HashMap::new()),
                planner: Mutex::new(planner),
                estimator: Mutex::new(StateEstimator::new()),
                threats: RwLock::new(ThreatPicture::default()),
                threat_epoch: AtomicU64::new(0),
                monitors: Mutex::new(HashMap::new()),
                events_tx,
                telemetry_dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Engine clock in seconds since coordinator start.
    pub fn now_secs(&self) -> f64 {
        self.inner.started.elapsed().as_secs_f64()
    }

    /// Register a payload backend under its identifier.
    pub fn register_payload(&self, payload_id: &str, backend: Arc<dyn PayloadControl>) {
        self.inner
            .payloads
            .write()
            .unwrap()
            .insert(payload_id.to_string(), backend);
    }

    /// Replace the threat picture. Monitors observe the epoch change and
    /// replan routes the new picture touches.
    pub fn set_threat_picture(&self, picture: ThreatPicture) {
        *self.inner.threats.write().unwrap() = picture;
        self.inner.threat_epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Add one engine-space threat zone to the picture.
    pub fn add_threat_zone(&self, zone: meridian_stealth::evaluate::ZoneFootprint) {
        self.inner.threats.write().unwrap().zones.push(zone);
        self.inner.threat_epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Subscribe to mission lifecycle events. The backlog is bounded;
    /// slow subscribers lose their oldest events (lossy by design).
    pub fn subscribe_events(&self) -> broadcast::Receiver<MissionEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Snapshot of a mission record.
    pub fn mission(&self, id: MissionId) -> Option<Mission> {
        self.inner.missions.read().unwrap().get(&id).cloned()
    }

    /// Snapshot of a trajectory by identifier.
    pub fn trajectory(&self, id: &TrajectoryId) -> Option<Trajectory> {
        self.inner.trajectories.read().unwrap().get(id).cloned()
    }

    /// Telemetry samples dropped at full monitor inboxes.
    pub fn telemetry_dropped(&self) -> u64 {
        self.inner.telemetry_dropped.load(Ordering::Relaxed)
    }

    /// Start a mission: plan, dispatch, activate, and spawn the monitor.
    pub async fn start_mission(&self, spec: MissionSpec) -> Result<MissionId> {
        let now = self.now_secs();
        let mission = Mission::from_spec(&spec, now);
        let mission_id = mission.id;
        self.inner
            .missions
            .write()
            .unwrap()
            .insert(mission_id, mission);
        self.publish(MissionEvent::new(MissionEventKind::MissionCreated, mission_id));
        info!(mission = %mission_id, kind = ?spec.kind, payload = %spec.payload_id, "mission created");

        let start_state = EntityState::at(spec.origin, now);
        let trajectory = match self.plan_route(&spec, &start_state, None, now) {
            Ok(t) => t,
            Err(err) => {
                self.fail_mission(mission_id, &err).await;
                return Err(err);
            }
        };

        if let Err(err) = self.dispatch(&spec.payload_id, &trajectory).await {
            self.fail_mission(mission_id, &err).await;
            return Err(err);
        }

        self.adopt_trajectory(mission_id, trajectory);
        {
            let mut missions = self.inner.missions.write().unwrap();
            if let Some(m) = missions.get_mut(&mission_id) {
                m.status = MissionStatus::Active;
                m.started_at_secs = Some(self.now_secs());
            }
        }

        self.spawn_monitor(mission_id, spec);
        Ok(mission_id)
    }

    /// Feed a telemetry sample into a mission's monitor. A full inbox
    /// drops the sample (drop-newest) and counts it.
    pub fn update_telemetry(&self, mission_id: MissionId, state: EntityState) -> Result<()> {
        let monitors = self.inner.monitors.lock().unwrap();
        let handle = monitors
            .get(&mission_id)
            .ok_or_else(|| GuidanceError::UnknownMission(mission_id.to_string()))?;
        if handle.telemetry_tx.try_send(state).is_err() {
            self.inner.telemetry_dropped.fetch_add(1, Ordering::Relaxed);
            return Err(GuidanceError::StreamBackpressure { stream: "telemetry" });
        }
        Ok(())
    }

    /// Abort a mission: cancel its monitor, stop the payload, publish.
    pub async fn abort_mission(&self, mission_id: MissionId) -> Result<()> {
        let payload_ids = {
            let missions = self.inner.missions.read().unwrap();
            let mission = missions
                .get(&mission_id)
                .ok_or_else(|| GuidanceError::UnknownMission(mission_id.to_string()))?;
            if mission.status.is_terminal() {
                return Ok(());
            }
            mission.payload_ids.clone()
        };

        self.remove_monitor(mission_id);
        if self.transition(mission_id, MissionStatus::Aborted) {
            for payload_id in &payload_ids {
                let backend = self.payload_backend(payload_id);
                if let Some(backend) = backend {
                    let _ = backend.stop().await;
                }
            }
            self.publish(MissionEvent::new(MissionEventKind::MissionAborted, mission_id));
            info!(mission = %mission_id, "mission aborted");
        }
        Ok(())
    }

    /// Look up a registered payload backend.
    pub fn payload_backend(&self, payload_id: &str) -> Option<Arc<dyn PayloadControl>> {
        self.inner.payloads.read().unwrap().get(payload_id).cloned()
    }

    /// Feed an observation of an external entity (a track target, not a
    /// mission payload) into the estimator.
    pub fn observe_entity(
        &self,
        entity_id: &str,
        kind: PayloadKind,
        observation: Observation,
    ) -> Result<()> {
        self.inner
            .estimator
            .lock()
            .unwrap()
            .update_state(entity_id, kind, observation)
    }

    /// Plan constraints carried by a mission request.
    fn constraints_for(spec: &MissionSpec) -> PlanConstraints {
        PlanConstraints {
            stealth_mode: spec.stealth_mode,
            priority: spec.priority,
            fuel_budget_kg: spec.fuel_budget_kg,
            max_time_secs: spec.max_time_secs,
            ..Default::default()
        }
    }

    /// Route a planning request: intercept-style missions go to the
    /// intercept solver, everything else to the waypoint planner. With a
    /// trajectory in force, the planner path replans against it and the
    /// result carries the lineage.
    fn plan_route(
        &self,
        spec: &MissionSpec,
        state: &EntityState,
        in_force: Option<&Trajectory>,
        now: f64,
    ) -> Result<Trajectory> {
        let threats = self.inner.threats.read().unwrap().clone();
        if spec.kind.is_intercept() {
            return self.plan_intercept(spec, state, in_force.map(|t| t.id.clone()), &threats, now);
        }

        let constraints = Self::constraints_for(spec);
        let mut planner = self.inner.planner.lock().unwrap();
        match in_force {
            Some(incumbent) => planner.replan(state, incumbent, &constraints, &threats, None, now),
            None => planner.plan(
                spec.payload_kind,
                state,
                spec.target,
                &constraints,
                &threats,
                None,
                now,
            ),
        }
    }

    /// Intercept-style planning: lead the tracked target (Kalman estimate
    /// when the request names a track, stationary hypothesis otherwise),
    /// gate on the ΔV budget and the kind's speed ceiling, and render the
    /// winning solution as the dispatched trajectory.
    fn plan_intercept(
        &self,
        spec: &MissionSpec,
        state: &EntityState,
        previous: Option<TrajectoryId>,
        threats: &ThreatPicture,
        now: f64,
    ) -> Result<Trajectory> {
        let limits = limits_for(spec.payload_kind);

        let tracked = spec.target_track.as_deref().and_then(|entity| {
            let mut estimator = self.inner.estimator.lock().unwrap();
            estimator.current_estimate(entity).ok()
        });
        let track = match tracked {
            Some(estimate) => TargetTrack::ConstantAcceleration {
                position: estimate.position,
                velocity: estimate.velocity,
                acceleration: estimate.acceleration,
            },
            None => TargetTrack::ConstantAcceleration {
                position: spec.target,
                velocity: Vector3::ZERO,
                acceleration: Vector3::ZERO,
            },
        };

        // The impulse budget is the fuel budget expressed as ΔV, or the
        // airframe's full speed envelope when unconstrained.
        let delta_v_budget = spec
            .fuel_budget_kg
            .map(|kg| kg / limits.fuel_per_delta_v.max(1e-9))
            .unwrap_or(limits.max_speed_mps);
        let horizon = spec.max_time_secs.unwrap_or(INTERCEPT_DEFAULT_HORIZON_SECS);

        let solution =
            predicted_intercept(state, &track, delta_v_budget, horizon, Some(limits.max_speed_mps))?;
        debug!(
            tof = solution.flight_time_secs,
            feasibility = solution.feasibility,
            "intercept solution selected"
        );
        Ok(solution_trajectory(
            &solution,
            state,
            spec.payload_kind,
            threats,
            now,
            previous,
        ))
    }

    /// Dispatch with the exponential-backoff retry schedule.
    async fn dispatch(&self, payload_id: &str, trajectory: &Trajectory) -> Result<()> {
        let backend = self.payload_backend(payload_id).ok_or_else(|| {
            GuidanceError::DispatchFailed {
                attempts: 0,
                detail: format!("no backend registered for {payload_id}"),
            }
        })?;

        let mut backoff = Backoff::dispatch();
        let mut attempts = 0;
        loop {
            attempts += 1;
            match backend.dispatch_trajectory(trajectory).await {
                Ok(()) => return Ok(()),
                Err(err) => match backoff.next() {
                    Some(delay) => {
                        warn!(payload = payload_id, attempt = attempts, %err, "dispatch failed, retrying");
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        return Err(GuidanceError::DispatchFailed {
                            attempts,
                            detail: err.to_string(),
                        })
                    }
                },
            }
        }
    }

    /// Record a trajectory and point the mission at it.
    fn adopt_trajectory(&self, mission_id: MissionId, trajectory: Trajectory) {
        let id = trajectory.id.clone();
        self.inner
            .trajectories
            .write()
            .unwrap()
            .insert(id.clone(), trajectory);
        if let Some(m) = self.inner.missions.write().unwrap().get_mut(&mission_id) {
            // Ownership moves to the newest reference; the previous
            // trajectory stays reachable through `previous` lineage only.
            m.trajectory_id = Some(id);
        }
    }

    /// Apply a status transition if the graph permits it.
    fn transition(&self, mission_id: MissionId, next: MissionStatus) -> bool {
        let mut missions = self.inner.missions.write().unwrap();
        let Some(mission) = missions.get_mut(&mission_id) else {
            return false;
        };
        if !mission.status.can_transition_to(next) {
            return false;
        }
        mission.status = next;
        match next {
            MissionStatus::Active => mission.started_at_secs = Some(self.now_secs()),
            MissionStatus::Completed | MissionStatus::Aborted | MissionStatus::Failed => {
                mission.completed_at_secs = Some(self.now_secs())
            }
            _ => {}
        }
        true
    }

    async fn fail_mission(&self, mission_id: MissionId, err: &GuidanceError) {
        self.remove_monitor(mission_id);
        if self.transition(mission_id, MissionStatus::Failed) {
            let event = MissionEvent::new(MissionEventKind::MissionFailed, mission_id)
                .with_field("error", serde_json::Value::String(err.to_string()));
            self.publish(event);
            warn!(mission = %mission_id, %err, "mission failed");
        }
    }

    fn remove_monitor(&self, mission_id: MissionId) {
        if let Some(handle) = self.inner.monitors.lock().unwrap().remove(&mission_id) {
            handle.cancel.cancel();
        }
    }

    fn publish(&self, event: MissionEvent) {
        // No receivers is fine; the broadcast backlog handles slow ones.
        let _ = self.inner.events_tx.send(event);
    }

    /// Spawn the per-mission monitor loop.
    fn spawn_monitor(&self, mission_id: MissionId, spec: MissionSpec) {
        let (telemetry_tx, telemetry_rx) = mpsc::channel(STREAM_CAPACITY);
        let cancel = CancellationToken::new();
        self.inner.monitors.lock().unwrap().insert(
            mission_id,
            MonitorHandle {
                telemetry_tx,
                cancel: cancel.clone(),
            },
        );

        let coordinator = self.clone();
        tokio::spawn(async move {
            monitor_loop(coordinator, mission_id, spec, telemetry_rx, cancel).await;
        });
    }
}

/// Outcome of one monitor step.
enum StepOutcome {
    Continue,
    Finished,
}

async fn monitor_loop(
    coordinator: MissionCoordinator,
    mission_id: MissionId,
    spec: MissionSpec,
    mut telemetry_rx: mpsc::Receiver<EntityState>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(coordinator.inner.config.monitor_tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last_state: Option<EntityState> = None;
    let mut seen_epoch = coordinator.inner.threat_epoch.load(Ordering::SeqCst);

    loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            Some(state) = telemetry_rx.recv() => {
                handle_telemetry(&coordinator, mission_id, &spec, state, &mut last_state, &mut seen_epoch, &cancel).await
            }
            _ = interval.tick() => {
                handle_tick(&coordinator, mission_id, &spec, &last_state, &mut seen_epoch, &cancel).await
            }
        };
        if matches!(outcome, StepOutcome::Finished) {
            break;
        }
    }
    coordinator.remove_monitor(mission_id);
}

#[allow(clippy::too_many_arguments)]
async fn handle_telemetry(
    coordinator: &MissionCoordinator,
    mission_id: MissionId,
    spec: &MissionSpec,
    state: EntityState,
    last_state: &mut Option<EntityState>,
    seen_epoch: &mut u64,
    cancel: &CancellationToken,
) -> StepOutcome {
    *last_state = Some(state);

    // Feed the estimator; stale samples drop silently by policy.
    {
        let mut estimator = coordinator.inner.estimator.lock().unwrap();
        let observation = match state.velocity {
            v if v.norm() > 0.0 => {
                let mut obs = Observation::position_fix(state.position, state.time_secs, 10.0);
                obs.velocity = Some(v);
                obs.noise = velocity_fix_noise(10.0, 5.0);
                obs
            }
            _ => Observation::position_fix(state.position, state.time_secs, 10.0),
        };
        match estimator.update_state(&spec.payload_id, spec.payload_kind, observation) {
            Ok(()) | Err(GuidanceError::StaleObservation { .. }) => {}
            Err(err) => debug!(mission = %mission_id, %err, "observation rejected"),
        }
    }

    // Completion check against the trajectory in force.
    let limits = limits_for(spec.payload_kind);
    if let Some(target) = coordinator
        .mission(mission_id)
        .and_then(|m| m.trajectory_id)
        .and_then(|id| coordinator.trajectory(&id))
        .and_then(|t| t.target())
    {
        let distance = state.position.distance_to(&target);
        if distance <= limits.completion_tolerance_m {
            coordinator.remove_monitor(mission_id);
            if coordinator.transition(mission_id, MissionStatus::Completed) {
                let event = MissionEvent::new(MissionEventKind::MissionCompleted, mission_id)
                    .with_field("final_distance_m", serde_json::json!(distance))
                    .with_field(
                        "final_position",
                        serde_json::to_value(state.position).unwrap_or_default(),
                    );
                coordinator.publish(event);
                info!(mission = %mission_id, distance_m = distance, "mission completed");
            }
            return StepOutcome::Finished;
        }
    }

    maybe_replan(coordinator, mission_id, spec, &state, seen_epoch, cancel).await
}

async fn handle_tick(
    coordinator: &MissionCoordinator,
    mission_id: MissionId,
    spec: &MissionSpec,
    last_state: &Option<EntityState>,
    seen_epoch: &mut u64,
    cancel: &CancellationToken,
) -> StepOutcome {
    // Mission time budget.
    if let Some(max_time) = spec.max_time_secs {
        let started = coordinator
            .mission(mission_id)
            .and_then(|m| m.started_at_secs);
        if let Some(started) = started {
            if coordinator.now_secs() - started > max_time {
                coordinator
                    .fail_mission(
                        mission_id,
                        &GuidanceError::BudgetExceeded {
                            resource: "time",
                            required: coordinator.now_secs() - started,
                            available: max_time,
                        },
                    )
                    .await;
                return StepOutcome::Finished;
            }
        }
    }

    match last_state {
        Some(state) => maybe_replan(coordinator, mission_id, spec, state, seen_epoch, cancel).await,
        None => StepOutcome::Continue,
    }
}

/// Replan when the trajectory has aged out, the payload has drifted past
/// the cross-track threshold, or the threat picture moved under the
/// remaining route.
async fn maybe_replan(
    coordinator: &MissionCoordinator,
    mission_id: MissionId,
    spec: &MissionSpec,
    state: &EntityState,
    seen_epoch: &mut u64,
    cancel: &CancellationToken,
) -> StepOutcome {
    let Some(mission) = coordinator.mission(mission_id) else {
        return StepOutcome::Finished;
    };
    if mission.status != MissionStatus::Active {
        return StepOutcome::Finished;
    }
    let Some(in_force) = mission
        .trajectory_id
        .as_ref()
        .and_then(|id| coordinator.trajectory(id))
    else {
        return StepOutcome::Continue;
    };

    let limits = limits_for(spec.payload_kind);
    let now = coordinator.now_secs();
    let age = now - in_force.created_at_secs;

    let current_epoch = coordinator.inner.threat_epoch.load(Ordering::SeqCst);
    let threats = coordinator.inner.threats.read().unwrap().clone();
    let threat_moved = current_epoch != *seen_epoch
        && threats_touch_remaining_route(&threats, &in_force, &state.position);
    if current_epoch != *seen_epoch && !threat_moved {
        // New picture does not affect this route; remember it.
        *seen_epoch = current_epoch;
    }

    let cross_track = in_force.cross_track_error(&state.position);
    let aged = age > limits.replan_interval_secs;
    let drifted = cross_track > limits.cross_track_threshold_m;

    if !(aged || drifted || threat_moved) {
        return StepOutcome::Continue;
    }

    let replanned = coordinator.plan_route(spec, state, Some(&in_force), now);

    match replanned {
        Ok(new_trajectory) => {
            // An abort mid-dispatch cancels the outbound call cleanly,
            // leaving no partial side effects behind.
            let dispatched = tokio::select! {
                _ = cancel.cancelled() => Err(GuidanceError::Cancelled),
                result = coordinator.dispatch(&spec.payload_id, &new_trajectory) => result,
            };
            match dispatched {
                Ok(()) => {}
                Err(GuidanceError::Cancelled) => return StepOutcome::Finished,
                Err(err) => {
                    coordinator.fail_mission(mission_id, &err).await;
                    return StepOutcome::Finished;
                }
            }
            let event =
                MissionEvent::replanned(mission_id, Some(&in_force.id), &new_trajectory.id);
            coordinator.adopt_trajectory(mission_id, new_trajectory);
            coordinator.publish(event);
            *seen_epoch = current_epoch;
            debug!(mission = %mission_id, "trajectory replanned");
            StepOutcome::Continue
        }
        Err(
            err @ (GuidanceError::NoFeasibleCandidate
            | GuidanceError::NoFeasibleIntercept
            | GuidanceError::BudgetExceeded { .. }),
        ) => {
            coordinator.fail_mission(mission_id, &err).await;
            StepOutcome::Finished
        }
        Err(err) => {
            // Transient planning hiccup: keep flying the incumbent.
            debug!(mission = %mission_id, %err, "replan attempt failed, keeping incumbent");
            StepOutcome::Continue
        }
    }
}

/// Whether any zone in the picture touches the part of the route still
/// ahead of the payload.
fn threats_touch_remaining_route(
    threats: &ThreatPicture,
    trajectory: &Trajectory,
    position: &Vector3,
) -> bool {
    if threats.zones.is_empty() {
        return false;
    }
    // Remaining route: waypoints at or beyond the closest one.
    let closest = trajectory
        .waypoints
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.position
                .distance_to(position)
                .partial_cmp(&b.position.distance_to(position))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    trajectory.waypoints[closest..].windows(2).any(|seg| {
        threats.zones.iter().any(|zone| {
            let center = Vector3::new(zone.center.x, zone.center.y, 0.0);
            let a = Vector3::new(seg[0].position.x, seg[0].position.y, 0.0);
            let b = Vector3::new(seg[1].position.x, seg[1].position.y, 0.0);
            meridian_core::types::point_segment_distance(&center, &a, &b) <= zone.radius_m
        })
    })
}

/// Block-diagonal position+velocity measurement noise.
fn velocity_fix_noise(pos_sigma: f64, vel_sigma: f64) -> Vec<f64> {
    let mut noise = vec![0.0; 36];
    for i in 0..3 {
        noise[i * 6 + i] = pos_sigma * pos_sigma;
    }
    for i in 3..6 {
        noise[i * 6 + i] = vel_sigma * vel_sigma;
    }
    noise
}
