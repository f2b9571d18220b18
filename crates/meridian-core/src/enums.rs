//! Enumeration types used throughout the engine.

use serde::{Deserialize, Serialize};

use crate::types::Vector3;

/// Payload category. Closed set; each kind maps to kinematic limits,
/// signature base parameters, and a control-abstraction backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadKind {
    GroundRobot,
    Humanoid,
    Drone,
    Uav,
    Missile,
    Rocket,
    Spacecraft,
    Submarine,
    Interstellar,
}

impl PayloadKind {
    /// Kinds that fly through atmosphere (drag regime planning).
    pub fn is_aerial(&self) -> bool {
        matches!(
            self,
            PayloadKind::Drone | PayloadKind::Uav | PayloadKind::Missile | PayloadKind::Rocket
        )
    }

    /// Kinds that operate on orbital mechanics (Lambert baselines,
    /// loose completion tolerance).
    pub fn is_orbital(&self) -> bool {
        matches!(
            self,
            PayloadKind::Rocket | PayloadKind::Spacecraft | PayloadKind::Interstellar
        )
    }

    /// Kinds confined to the surface.
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            PayloadKind::GroundRobot | PayloadKind::Humanoid | PayloadKind::Submarine
        )
    }
}

/// Mission category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissionKind {
    SearchRescue,
    AidDelivery,
    Recon,
    Strike,
    OrbitalInsertion,
    SwarmFormation,
}

impl MissionKind {
    /// Intercept-style missions engage the intercept solver instead of
    /// the waypoint planner's direct baseline.
    pub fn is_intercept(&self) -> bool {
        matches!(self, MissionKind::Strike)
    }
}

/// Mission lifecycle status. Transitions follow
/// pending → active → {completed, aborted, failed}; edges are never
/// skipped or reversed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissionStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Aborted,
    Failed,
}

impl MissionStatus {
    /// Whether the status machine permits this edge.
    pub fn can_transition_to(&self, next: MissionStatus) -> bool {
        use MissionStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Pending, Aborted)
                | (Pending, Failed)
                | (Active, Completed)
                | (Active, Aborted)
                | (Active, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MissionStatus::Completed | MissionStatus::Aborted | MissionStatus::Failed
        )
    }
}

/// Stealth emphasis requested for a mission. Each mode selects the stealth
/// weight used in candidate scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StealthMode {
    #[default]
    None,
    Low,
    Medium,
    High,
    Maximum,
}

impl StealthMode {
    /// Scoring weight applied to (1 - stealth score).
    pub fn stealth_weight(&self) -> f64 {
        match self {
            StealthMode::None => 0.1,
            StealthMode::Low => 0.3,
            StealthMode::Medium => 0.5,
            StealthMode::High => 0.7,
            StealthMode::Maximum => 0.9,
        }
    }
}

/// Swarm formation geometry. `Custom` carries a per-slot offset table
/// relative to the swarm centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FormationKind {
    Line,
    Column,
    Wedge,
    Circle,
    Grid,
    Scatter,
    Custom { offsets: Vec<Vector3> },
}

/// Threat zone category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreatKind {
    Radar,
    Sam,
    AirDefense,
}

/// Radar frequency band. Higher bands resolve smaller targets but
/// attenuate faster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadarBand {
    LBand,
    #[default]
    SBand,
    CBand,
    XBand,
    KuBand,
}

/// Swarm participant status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RobotStatus {
    #[default]
    Active,
    Offline,
    EmergencyStopped,
}
