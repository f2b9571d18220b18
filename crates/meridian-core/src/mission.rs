//! Mission, swarm, and robot records.
//!
//! Records are plain data; lifecycle logic lives in the coordinator and
//! swarm controller, which exclusively own these structs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{FormationKind, MissionKind, MissionStatus, PayloadKind, RobotStatus, StealthMode};
use crate::types::{TrajectoryId, Vector3, Waypoint};

/// Mission identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissionId(pub Uuid);

impl MissionId {
    pub fn generate() -> Self {
        MissionId(Uuid::new_v4())
    }
}

impl std::fmt::Display for MissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inbound mission request: the core entry contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSpec {
    pub payload_id: String,
    pub payload_kind: PayloadKind,
    pub kind: MissionKind,
    pub origin: Vector3,
    pub target: Vector3,
    /// 1 (lowest) to 10 (highest).
    pub priority: u8,
    #[serde(default)]
    pub stealth_mode: StealthMode,
    /// Tag consumed by the external access layer; the core carries it opaquely.
    #[serde(default)]
    pub classification: String,
    /// Tracked entity the intercept solver should lead, for
    /// intercept-style missions. Absent: the target position is treated
    /// as stationary.
    #[serde(default)]
    pub target_track: Option<String>,
    /// Explicit waypoints the route must pass through, if any.
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    /// Fuel budget in kilograms, if constrained.
    #[serde(default)]
    pub fuel_budget_kg: Option<f64>,
    /// Mission time budget in seconds, if constrained.
    #[serde(default)]
    pub max_time_secs: Option<f64>,
}

/// A mission record. Owned exclusively by the coordinator; everything else
/// refers to missions by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub kind: MissionKind,
    pub payload_ids: Vec<String>,
    pub payload_kind: PayloadKind,
    pub priority: u8,
    pub status: MissionStatus,
    pub origin: Vector3,
    pub target: Vector3,
    pub stealth_mode: StealthMode,
    pub classification: String,
    /// Trajectory currently in force (identifier-only reference).
    pub trajectory_id: Option<TrajectoryId>,
    pub created_at_secs: f64,
    pub started_at_secs: Option<f64>,
    pub completed_at_secs: Option<f64>,
    pub max_time_secs: Option<f64>,
    pub fuel_budget_kg: Option<f64>,
}

impl Mission {
    /// Build a pending mission from a request.
    pub fn from_spec(spec: &MissionSpec, now_secs: f64) -> Self {
        Mission {
            id: MissionId::generate(),
            kind: spec.kind,
            payload_ids: vec![spec.payload_id.clone()],
            payload_kind: spec.payload_kind,
            priority: spec.priority.clamp(1, 10),
            status: MissionStatus::Pending,
            origin: spec.origin,
            target: spec.target,
            stealth_mode: spec.stealth_mode,
            classification: spec.classification.clone(),
            trajectory_id: None,
            created_at_secs: now_secs,
            started_at_secs: None,
            completed_at_secs: None,
            max_time_secs: spec.max_time_secs,
            fuel_budget_kg: spec.fuel_budget_kg,
        }
    }
}

/// A swarm mission: a mission plus formation geometry and per-unit objectives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmMission {
    pub mission: Mission,
    pub formation: FormationKind,
    pub area_center: Vector3,
    pub area_radius_m: f64,
    /// Target points divided among participating units.
    pub objectives: Vec<Vector3>,
}

/// A swarm participant. Owned exclusively by the formation controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub id: String,
    pub position: Vector3,
    pub velocity: Vector3,
    /// Battery fraction remaining, 0 to 1.
    pub battery: f64,
    pub status: RobotStatus,
    pub is_leader: bool,
    /// Formation slot index; active robots hold a dense permutation 0..N-1.
    pub slot: usize,
    /// Engine clock of the last heartbeat (seconds).
    pub last_heartbeat_secs: f64,
    #[serde(default)]
    pub task: Option<String>,
}

/// Telemetry update from a swarm participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotTelemetry {
    pub id: String,
    pub position: Vector3,
    pub velocity: Vector3,
    pub battery: f64,
    pub time_secs: f64,
}
