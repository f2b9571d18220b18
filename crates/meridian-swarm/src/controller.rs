//! The swarm controller: registration, slots, leadership, liveness.
//!
//! Owns every robot record. Slot indices stay a dense permutation of
//! 0..N−1 over active robots, and a non-empty swarm always has exactly
//! one leader; both invariants are restored inside the same operation
//! that disturbed them.

use std::collections::HashMap;

use tracing::{info, warn};

use meridian_core::constants::{
    FORMATION_SPACING_M, HEARTBEAT_TIMEOUT_SECS, MAX_SWARM_SIZE, REPOSITION_MIN_INTERVAL_SECS,
};
use meridian_core::enums::{FormationKind, RobotStatus};
use meridian_core::error::{GuidanceError, Result};
use meridian_core::mission::{Robot, RobotTelemetry};
use meridian_core::types::Vector3;

use crate::formation::formation_offsets;

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct SwarmConfig {
    pub max_size: usize,
    pub spacing_m: f64,
    pub heartbeat_timeout_secs: f64,
    /// Issue corrective move commands when robots drift off their slots.
    pub enable_auto_formation: bool,
    pub reposition_min_interval_secs: f64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            max_size: MAX_SWARM_SIZE,
            spacing_m: FORMATION_SPACING_M,
            heartbeat_timeout_secs: HEARTBEAT_TIMEOUT_SECS,
            enable_auto_formation: true,
            reposition_min_interval_secs: REPOSITION_MIN_INTERVAL_SECS,
        }
    }
}

/// A command for the payload layer to deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum SwarmCommand {
    MoveTo { robot_id: String, target: Vector3 },
    Stop { robot_id: String },
}

/// What a heartbeat tick observed and decided.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Robots newly marked offline this tick.
    pub went_offline: Vec<String>,
    /// Leader elected this tick, if leadership changed.
    pub new_leader: Option<String>,
    /// Corrective move commands to dispatch.
    pub commands: Vec<SwarmCommand>,
}

/// The formation controller.
pub struct SwarmController {
    config: SwarmConfig,
    robots: HashMap<String, Robot>,
    formation: FormationKind,
    /// Current formation target per robot.
    targets: HashMap<String, Vector3>,
    /// Last corrective command time per robot.
    last_reposition: HashMap<String, f64>,
    emergency: bool,
}

impl SwarmController {
    pub fn new(config: SwarmConfig) -> Self {
        Self {
            config,
            robots: HashMap::new(),
            formation: FormationKind::Line,
            targets: HashMap::new(),
            last_reposition: HashMap::new(),
            emergency: false,
        }
    }

    /// Register a robot. Rejects beyond capacity; the first member leads.
    pub fn register(&mut self, robot_id: &str, position: Vector3, now_secs: f64) -> Result<usize> {
        self.refuse_if_emergency()?;
        if self.robots.contains_key(robot_id) {
            // Re-registration refreshes the heartbeat only.
            if let Some(r) = self.robots.get_mut(robot_id) {
                r.last_heartbeat_secs = now_secs;
                return Ok(r.slot);
            }
        }
        if self.robots.len() >= self.config.max_size {
            return Err(GuidanceError::SwarmCapacityExceeded {
                capacity: self.config.max_size,
            });
        }

        let slot = self.active_count();
        let is_leader = self.active_leader().is_none();
        self.robots.insert(
            robot_id.to_string(),
            Robot {
                id: robot_id.to_string(),
                position,
                velocity: Vector3::ZERO,
                battery: 1.0,
                status: RobotStatus::Active,
                is_leader,
                slot,
                last_heartbeat_secs: now_secs,
                task: None,
            },
        );
        info!(robot = robot_id, slot, leader = is_leader, "robot registered");
        Ok(slot)
    }

    /// Remove a robot, compacting slots and re-electing if it led.
    pub fn unregister(&mut self, robot_id: &str) -> Result<()> {
        let removed = self
            .robots
            .remove(robot_id)
            .ok_or_else(|| GuidanceError::UnknownEntity(robot_id.to_string()))?;
        self.targets.remove(robot_id);
        self.last_reposition.remove(robot_id);
        self.compact_slots();
        if removed.is_leader {
            self.elect_leader();
        }
        Ok(())
    }

    /// Merge a telemetry report and stamp the heartbeat.
    pub fn update_telemetry(&mut self, telemetry: &RobotTelemetry) -> Result<()> {
        let robot = self
            .robots
            .get_mut(&telemetry.id)
            .ok_or_else(|| GuidanceError::UnknownEntity(telemetry.id.clone()))?;
        robot.position = telemetry.position;
        robot.velocity = telemetry.velocity;
        robot.battery = telemetry.battery;
        robot.last_heartbeat_secs = telemetry.time_secs;
        // A heartbeat brings an offline robot back, at the end of the
        // slot order.
        if robot.status == RobotStatus::Offline {
            robot.status = RobotStatus::Active;
            robot.slot = usize::MAX;
            self.compact_slots();
            if self.active_leader().is_none() {
                self.elect_leader();
            }
        }
        Ok(())
    }

    /// Recompute formation targets for every active robot and return the
    /// move commands. Idempotent: the same formation over the same swarm
    /// yields bit-identical targets.
    pub fn set_formation(&mut self, kind: FormationKind, _now_secs: f64) -> Result<Vec<SwarmCommand>> {
        self.refuse_if_emergency()?;
        self.formation = kind;
        Ok(self.recompute_targets())
    }

    /// Heartbeat tick: mark silent robots offline, restore leadership and
    /// slot density, and issue corrective moves for drifted robots.
    pub fn heartbeat_tick(&mut self, now_secs: f64) -> TickReport {
        let mut report = TickReport::default();
        if self.emergency {
            return report;
        }

        let mut leadership_lost = false;
        for robot in self.robots.values_mut() {
            if robot.status != RobotStatus::Active {
                continue;
            }
            // Strictly past the timeout: exactly at the boundary is alive.
            if now_secs - robot.last_heartbeat_secs > self.config.heartbeat_timeout_secs {
                warn!(robot = %robot.id, "heartbeat timeout, marking offline");
                robot.status = RobotStatus::Offline;
                if robot.is_leader {
                    robot.is_leader = false;
                    leadership_lost = true;
                }
                report.went_offline.push(robot.id.clone());
            }
        }

        if !report.went_offline.is_empty() {
            self.compact_slots();
        }
        if leadership_lost || (self.active_count() > 0 && self.active_leader().is_none()) {
            report.new_leader = self.elect_leader();
        }

        if self.config.enable_auto_formation {
            report.commands = self.reposition_commands(now_secs);
        }
        report
    }

    /// Broadcast stop and latch the emergency state; all further commands
    /// are refused until `clear_emergency`.
    pub fn emergency_stop(&mut self) -> Vec<SwarmCommand> {
        self.emergency = true;
        let mut commands = Vec::with_capacity(self.robots.len());
        for robot in self.robots.values_mut() {
            robot.status = RobotStatus::EmergencyStopped;
            robot.is_leader = false;
            commands.push(SwarmCommand::Stop {
                robot_id: robot.id.clone(),
            });
        }
        warn!(robots = commands.len(), "swarm emergency stop");
        commands
    }

    /// Manually clear the emergency latch. Robots return active and the
    /// swarm re-forms.
    pub fn clear_emergency(&mut self, now_secs: f64) {
        self.emergency = false;
        for robot in self.robots.values_mut() {
            if robot.status == RobotStatus::EmergencyStopped {
                robot.status = RobotStatus::Active;
                robot.last_heartbeat_secs = now_secs;
            }
        }
        self.compact_slots();
        self.elect_leader();
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency
    }

    pub fn robot(&self, robot_id: &str) -> Option<&Robot> {
        self.robots.get(robot_id)
    }

    /// Active robots, ordered by slot.
    pub fn active_robots(&self) -> Vec<&Robot> {
        let mut active: Vec<&Robot> = self
            .robots
            .values()
            .filter(|r| r.status == RobotStatus::Active)
            .collect();
        active.sort_by_key(|r| r.slot);
        active
    }

    pub fn active_count(&self) -> usize {
        self.robots
            .values()
            .filter(|r| r.status == RobotStatus::Active)
            .count()
    }

    /// The current leader, if the swarm has active members.
    pub fn active_leader(&self) -> Option<&Robot> {
        self.robots
            .values()
            .find(|r| r.status == RobotStatus::Active && r.is_leader)
    }

    /// Formation target for a robot, if one is assigned.
    pub fn formation_target(&self, robot_id: &str) -> Option<Vector3> {
        self.targets.get(robot_id).copied()
    }

    fn refuse_if_emergency(&self) -> Result<()> {
        if self.emergency {
            Err(GuidanceError::EmergencyStopped)
        } else {
            Ok(())
        }
    }

    /// Restore slot density: active robots keep their relative order and
    /// get indices 0..N−1.
    fn compact_slots(&mut self) {
        let mut order: Vec<(String, usize)> = self
            .robots
            .values()
            .filter(|r| r.status == RobotStatus::Active)
            .map(|r| (r.id.clone(), r.slot))
            .collect();
        // Stable order: by previous slot, identifier as tiebreak.
        order.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        for (new_slot, (id, _)) in order.into_iter().enumerate() {
            if let Some(robot) = self.robots.get_mut(&id) {
                robot.slot = new_slot;
            }
        }
    }

    /// Elect the highest-battery active robot (identifier as tiebreak).
    /// Returns the elected identifier when leadership changed hands.
    fn elect_leader(&mut self) -> Option<String> {
        let candidate = self
            .robots
            .values()
            .filter(|r| r.status == RobotStatus::Active)
            .max_by(|a, b| {
                a.battery
                    .partial_cmp(&b.battery)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.id.cmp(&a.id))
            })
            .map(|r| r.id.clone())?;

        let mut changed = None;
        for robot in self.robots.values_mut() {
            let should_lead = robot.id == candidate && robot.status == RobotStatus::Active;
            if should_lead && !robot.is_leader {
                info!(robot = %robot.id, battery = robot.battery, "leader elected");
                changed = Some(robot.id.clone());
            }
            robot.is_leader = should_lead;
        }
        changed
    }

    /// Recompute formation targets around the active centroid.
    fn recompute_targets(&mut self) -> Vec<SwarmCommand> {
        let active = self.active_robots();
        let n = active.len();
        if n == 0 {
            self.targets.clear();
            return Vec::new();
        }

        let centroid = active
            .iter()
            .fold(Vector3::ZERO, |acc, r| acc.add(&r.position))
            .scale(1.0 / n as f64);
        let offsets = formation_offsets(&self.formation, n, self.config.spacing_m);

        let assignments: Vec<(String, Vector3)> = active
            .iter()
            .map(|r| (r.id.clone(), centroid.add(&offsets[r.slot])))
            .collect();

        self.targets.clear();
        let mut commands = Vec::with_capacity(assignments.len());
        for (id, target) in assignments {
            self.targets.insert(id.clone(), target);
            commands.push(SwarmCommand::MoveTo {
                robot_id: id,
                target,
            });
        }
        commands
    }

    /// Divide objective points among active robots, slot order first,
    /// nearest-point greedy within each turn. Each robot is tasked and
    /// sent toward its first objective; leftover points wrap around.
    pub fn assign_objectives(&mut self, points: &[Vector3]) -> Result<Vec<SwarmCommand>> {
        self.refuse_if_emergency()?;
        let active: Vec<(String, Vector3)> = self
            .active_robots()
            .iter()
            .map(|r| (r.id.clone(), r.position))
            .collect();
        if active.is_empty() || points.is_empty() {
            return Ok(Vec::new());
        }

        let mut remaining: Vec<(usize, Vector3)> = points.iter().copied().enumerate().collect();
        let mut commands = Vec::new();
        for (id, position) in active.iter().cycle().take(points.len()) {
            // Nearest remaining point to this robot.
            let (idx, _) = remaining
                .iter()
                .enumerate()
                .min_by(|(_, (_, a)), (_, (_, b))| {
                    position
                        .distance_to(a)
                        .partial_cmp(&position.distance_to(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, (orig, _))| (i, *orig))
                .unwrap_or((0, 0));
            let (point_idx, target) = remaining.remove(idx);

            if let Some(robot) = self.robots.get_mut(id) {
                // Only the first objective per robot drives a move.
                if robot.task.is_none() {
                    robot.task = Some(format!("objective-{point_idx}"));
                    commands.push(SwarmCommand::MoveTo {
                        robot_id: id.clone(),
                        target,
                    });
                }
            }
            if remaining.is_empty() {
                break;
            }
        }
        Ok(commands)
    }

    /// Corrective moves for robots drifted beyond spacing/2, rate-limited
    /// per robot.
    fn reposition_commands(&mut self, now_secs: f64) -> Vec<SwarmCommand> {
        let threshold = self.config.spacing_m / 2.0;
        let mut commands = Vec::new();
        for robot in self.robots.values() {
            if robot.status != RobotStatus::Active {
                continue;
            }
            let Some(target) = self.targets.get(&robot.id) else {
                continue;
            };
            if robot.position.distance_to(target) <= threshold {
                continue;
            }
            let last = self.last_reposition.get(&robot.id).copied();
            if let Some(last) = last {
                if now_secs - last < self.config.reposition_min_interval_secs {
                    continue;
                }
            }
            commands.push(SwarmCommand::MoveTo {
                robot_id: robot.id.clone(),
                target: *target,
            });
            self.last_reposition.insert(robot.id.clone(), now_secs);
        }
        commands
    }
}
