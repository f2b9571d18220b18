//! Threat zones and emitter sites consumed by the stealth evaluator.

use serde::{Deserialize, Serialize};

use crate::enums::{RadarBand, ThreatKind};
use crate::types::{GeoCoord, Vector3};

/// A geographic threat zone published by the threat-intelligence provider.
/// Zones may be dynamic; `expires_secs` bounds validity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatZone {
    pub id: String,
    pub center: GeoCoord,
    pub radius_km: f64,
    pub kind: ThreatKind,
    /// Severity 0 to 1.
    pub level: f64,
    pub active: bool,
    /// Engine clock after which the zone no longer applies (seconds).
    #[serde(default)]
    pub expires_secs: Option<f64>,
}

impl ThreatZone {
    /// Whether the zone applies at the given engine clock.
    pub fn is_live(&self, now_secs: f64) -> bool {
        self.active && self.expires_secs.map_or(true, |t| now_secs < t)
    }
}

/// A radar emitter site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSite {
    pub id: String,
    pub position: Vector3,
    pub band: RadarBand,
    pub frequency_ghz: f64,
    pub range_km: f64,
    pub active: bool,
}

/// A surface-to-air missile site with an engagement envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamSite {
    pub id: String,
    pub position: Vector3,
    pub range_km: f64,
    /// Engagement ceiling (meters).
    pub ceiling_m: f64,
    pub active: bool,
}
