//! The root engine object: composes the coordinator, broker, and swarm
//! controller, and runs the periodic loops (swarm heartbeat, event
//! forwarding) that tie them together.
//!
//! No global state: tests build a fresh engine per case.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use meridian_core::constants::HEARTBEAT_INTERVAL_SECS;
use meridian_core::enums::FormationKind;
use meridian_core::error::Result;
use meridian_core::mission::{MissionId, MissionSpec};
use meridian_core::types::{GeoCoord, Vector3};
use meridian_swarm::{SwarmCommand, SwarmConfig, SwarmController};
use meridian_terrain::TheaterProjection;

use crate::broker::IntegrationBroker;
use crate::coordinator::{CoordinatorConfig, MissionCoordinator};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub coordinator: CoordinatorConfig,
    pub swarm: SwarmConfig,
    /// Theater anchor for the geographic boundary (latitude, longitude
    /// in degrees).
    pub theater_ref: (f64, f64),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coordinator: CoordinatorConfig::default(),
            swarm: SwarmConfig::default(),
            theater_ref: (0.0, 0.0),
        }
    }
}

/// A mission request as the external surfaces submit it: geographic
/// endpoints, converted at this boundary and nowhere deeper.
#[derive(Debug, Clone)]
pub struct GeoMissionRequest {
    pub spec: MissionSpec,
    pub origin: GeoCoord,
    pub target: GeoCoord,
}

/// The guidance and coordination engine.
pub struct GuidanceEngine {
    coordinator: MissionCoordinator,
    broker: IntegrationBroker,
    swarm: Arc<Mutex<SwarmController>>,
    projection: TheaterProjection,
    cancel: CancellationToken,
}

impl Default for GuidanceEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl GuidanceEngine {
    pub fn new(config: EngineConfig) -> Self {
        GuidanceEngine {
            coordinator: MissionCoordinator::new(config.coordinator),
            broker: IntegrationBroker::default(),
            swarm: Arc::new(Mutex::new(SwarmController::new(config.swarm))),
            projection: TheaterProjection::new(config.theater_ref.0, config.theater_ref.1),
            cancel: CancellationToken::new(),
        }
    }

    /// The theater projection used at the geographic boundary.
    pub fn projection(&self) -> &TheaterProjection {
        &self.projection
    }

    /// Start a mission submitted with geographic endpoints. The
    /// equirectangular theater conversion happens here and only here;
    /// it is adequate for ground/aerial theater work and never applied
    /// to orbital missions, which arrive Cartesian.
    pub async fn start_mission_geo(&self, request: GeoMissionRequest) -> Result<MissionId> {
        let mut spec = request.spec;
        spec.origin = self.projection.to_engine(&request.origin);
        spec.target = self.projection.to_engine(&request.target);
        self.coordinator.start_mission(spec).await
    }

    pub fn coordinator(&self) -> &MissionCoordinator {
        &self.coordinator
    }

    pub fn broker(&self) -> &IntegrationBroker {
        &self.broker
    }

    pub fn swarm(&self) -> &Arc<Mutex<SwarmController>> {
        &self.swarm
    }

    /// Cancellation handle propagated to every loop the engine spawns.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop all engine loops.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Register a swarm robot whose control backend is already registered
    /// with the coordinator under the same identifier.
    pub fn register_robot(&self, robot_id: &str, position: Vector3) -> Result<usize> {
        let now = self.coordinator.now_secs();
        self.swarm.lock().unwrap().register(robot_id, position, now)
    }

    /// Set the swarm formation and dispatch the resulting moves.
    pub async fn set_formation(&self, kind: FormationKind) -> Result<()> {
        let commands = {
            let now = self.coordinator.now_secs();
            self.swarm.lock().unwrap().set_formation(kind, now)?
        };
        self.dispatch_swarm_commands(commands).await;
        Ok(())
    }

    /// Broadcast an emergency stop to every robot.
    pub async fn emergency_stop(&self) {
        let commands = self.swarm.lock().unwrap().emergency_stop();
        self.dispatch_swarm_commands(commands).await;
    }

    /// Deliver swarm commands through the payload backends.
    pub async fn dispatch_swarm_commands(&self, commands: Vec<SwarmCommand>) {
        for command in commands {
            match command {
                SwarmCommand::MoveTo { robot_id, target } => {
                    if let Some(backend) = self.coordinator.payload_backend(&robot_id) {
                        if let Err(err) = backend.navigate_to(target).await {
                            debug!(robot = %robot_id, %err, "swarm move dispatch failed");
                        }
                    }
                }
                SwarmCommand::Stop { robot_id } => {
                    if let Some(backend) = self.coordinator.payload_backend(&robot_id) {
                        if let Err(err) = backend.stop().await {
                            debug!(robot = %robot_id, %err, "swarm stop dispatch failed");
                        }
                    }
                }
            }
        }
    }

    /// Spawn the swarm heartbeat loop: ticks liveness, re-elects leaders,
    /// and dispatches corrective moves until cancelled.
    pub fn spawn_heartbeat_loop(&self) -> tokio::task::JoinHandle<()> {
        let swarm = Arc::clone(&self.swarm);
        let coordinator = self.coordinator.clone();
        let cancel = self.cancel.clone();
        let period = std::time::Duration::from_secs_f64(HEARTBEAT_INTERVAL_SECS);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }
                let report = {
                    let now = coordinator.now_secs();
                    swarm.lock().unwrap().heartbeat_tick(now)
                };
                for command in report.commands {
                    if let SwarmCommand::MoveTo { robot_id, target } = command {
                        if let Some(backend) = coordinator.payload_backend(&robot_id) {
                            let _ = backend.navigate_to(target).await;
                        }
                    }
                }
            }
        })
    }

    /// Spawn the forwarder that mirrors coordinator lifecycle events into
    /// the broker's mission-event stream (the orchestration provider's
    /// feed).
    pub fn spawn_event_forwarder(&self) -> tokio::task::JoinHandle<()> {
        let mut events = self.coordinator.subscribe_events();
        let stream = Arc::clone(&self.broker.mission_events);
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(event) => {
                            let _ = stream.push(event);
                        }
                        // Lagged: events were lost for this subscriber by
                        // policy; keep going.
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        })
    }
}
