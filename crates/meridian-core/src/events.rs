//! Mission lifecycle events published by the coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mission::MissionId;
use crate::types::TrajectoryId;

/// Lifecycle event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissionEventKind {
    MissionCreated,
    TrajectoryReplanned,
    MissionCompleted,
    MissionAborted,
    MissionFailed,
}

/// A published lifecycle event. The payload map carries the terminal state
/// or replan context where applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionEvent {
    pub kind: MissionEventKind,
    pub mission_id: MissionId,
    pub timestamp: DateTime<Utc>,
    /// Always "coordinator" for events the engine originates.
    pub source: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl MissionEvent {
    pub fn new(kind: MissionEventKind, mission_id: MissionId) -> Self {
        MissionEvent {
            kind,
            mission_id,
            timestamp: Utc::now(),
            source: "coordinator".to_string(),
            payload: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }

    /// Convenience for replan events carrying both trajectory identifiers.
    pub fn replanned(mission_id: MissionId, old: Option<&TrajectoryId>, new: &TrajectoryId) -> Self {
        let mut ev = MissionEvent::new(MissionEventKind::TrajectoryReplanned, mission_id)
            .with_field("trajectory_id", Value::String(new.0.clone()));
        if let Some(old) = old {
            ev = ev.with_field("previous_trajectory_id", Value::String(old.0.clone()));
        }
        ev
    }
}
