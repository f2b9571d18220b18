//! Trajectory-level stealth evaluation, terrain-masking optimization,
//! and decoy path generation.

use serde::{Deserialize, Serialize};

use meridian_core::limits::limits_for;
use meridian_core::threat::{RadarSite, SamSite};
use meridian_core::types::{Trajectory, Vector3, Waypoint};
use meridian_terrain::TerrainGrid;

use crate::detection::masked_detection_probability;
use crate::rcs::rcs_toward_site;
use crate::sam::engagement_threat;
use crate::thermal::{surface_temperature, thermal_signature};

/// Standard ambient used when a waypoint carries no measurement (K).
const STANDARD_AMBIENT_K: f64 = 288.15;

/// Visibility mix: how radar, thermal, and envelope intrusion combine.
const RADAR_WEIGHT: f64 = 0.5;
const THERMAL_WEIGHT: f64 = 0.2;
const ENVELOPE_WEIGHT: f64 = 0.3;

/// A threat zone already projected into engine space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneFootprint {
    pub center: Vector3,
    pub radius_m: f64,
    /// Severity 0 to 1.
    pub level: f64,
}

impl ZoneFootprint {
    pub fn contains(&self, position: &Vector3) -> bool {
        self.center.horizontal_distance_to(position) <= self.radius_m
    }
}

/// Everything the evaluator scores against.
#[derive(Debug, Clone, Default)]
pub struct ThreatPicture {
    pub radars: Vec<RadarSite>,
    pub sams: Vec<SamSite>,
    pub zones: Vec<ZoneFootprint>,
}

/// Per-waypoint signature breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointSignature {
    /// Worst-case detection probability over all radar sites.
    pub radar_pd: f64,
    /// Thermal signature index, 0 to 1.
    pub thermal: f64,
    /// Worst-case SAM engagement threat, 0 to 1.
    pub sam_threat: f64,
    /// Worst threat-zone level the waypoint sits inside.
    pub zone_level: f64,
    /// Composite stealth at this waypoint, 0 to 1.
    pub stealth: f64,
}

/// Trajectory-level result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StealthReport {
    /// Overall stealth score, 0 (glowing) to 1 (invisible).
    pub overall: f64,
    /// Mean envelope intrusion along the route, 0 to 1.
    pub threat_exposure: f64,
    pub per_waypoint: Vec<WaypointSignature>,
}

/// Score a waypoint sequence against the threat picture. Terrain, when
/// supplied, masks radar sites without line-of-sight.
pub fn evaluate_waypoints(
    waypoints: &[Waypoint],
    kind_rcs_scale: f64,
    kind_thermal_coeff: f64,
    kind_max_speed: f64,
    threats: &ThreatPicture,
    terrain: Option<&TerrainGrid>,
) -> StealthReport {
    let mut per_waypoint = Vec::with_capacity(waypoints.len());
    let mut stealth_sum = 0.0;
    let mut exposure_sum = 0.0;

    for wp in waypoints {
        let speed = wp.velocity.norm();

        let mut radar_pd: f64 = 0.0;
        for site in &threats.radars {
            let rcs = rcs_toward_site(&wp.position, &wp.velocity, &site.position, kind_rcs_scale);
            let pd = masked_detection_probability(site, &wp.position, rcs, terrain);
            radar_pd = radar_pd.max(pd);
        }

        let throttle = if kind_max_speed > 0.0 {
            (speed / kind_max_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let temp = surface_temperature(
            STANDARD_AMBIENT_K,
            speed,
            throttle,
            kind_thermal_coeff,
            wp.position.z,
        );
        let thermal = thermal_signature(temp);

        let mut sam_threat: f64 = 0.0;
        for site in &threats.sams {
            sam_threat = sam_threat.max(engagement_threat(site, &wp.position));
        }

        let mut zone_level: f64 = 0.0;
        for zone in &threats.zones {
            if zone.contains(&wp.position) {
                zone_level = zone_level.max(zone.level);
            }
        }

        let envelope = sam_threat.max(zone_level);
        let visibility =
            RADAR_WEIGHT * radar_pd + THERMAL_WEIGHT * thermal + ENVELOPE_WEIGHT * envelope;
        let stealth = (1.0 - visibility).clamp(0.0, 1.0);

        stealth_sum += stealth;
        exposure_sum += envelope.max(radar_pd);
        per_waypoint.push(WaypointSignature {
            radar_pd,
            thermal,
            sam_threat,
            zone_level,
            stealth,
        });
    }

    let n = waypoints.len().max(1) as f64;
    StealthReport {
        overall: stealth_sum / n,
        threat_exposure: exposure_sum / n,
        per_waypoint,
    }
}

/// Score a full trajectory using its payload kind's signature parameters.
pub fn evaluate_trajectory(
    trajectory: &Trajectory,
    threats: &ThreatPicture,
    terrain: Option<&TerrainGrid>,
) -> StealthReport {
    let limits = limits_for(trajectory.payload_kind);
    evaluate_waypoints(
        &trajectory.waypoints,
        limits.rcs_scale,
        limits.thermal_engine_coeff,
        limits.max_speed_mps,
        threats,
        terrain,
    )
}

/// Pull waypoint altitudes down toward `terrain + clearance` wherever the
/// route rides above the local ridge line, so terrain shadows the payload
/// from distant emitters. Altitude floors in the waypoint constraints are
/// respected.
pub fn optimize_terrain_masking(
    waypoints: &mut [Waypoint],
    terrain: &TerrainGrid,
    clearance_m: f64,
) -> usize {
    let mut adjusted = 0;
    for wp in waypoints.iter_mut() {
        let Some(elevation) = terrain.elevation_at(&wp.position) else {
            continue;
        };
        let hugging = elevation as f64 + clearance_m;
        if wp.position.z > hugging {
            let floor = wp
                .constraints
                .and_then(|c| c.altitude_floor_m)
                .unwrap_or(f64::MIN);
            wp.position.z = hugging.max(floor);
            adjusted += 1;
        }
    }
    adjusted
}

/// Mirror a trajectory's waypoints with an additive offset, preserving
/// velocities and timing. The decoy flies a parallel track to draw
/// attention away from the real route.
pub fn generate_decoy_path(trajectory: &Trajectory, offset: Vector3) -> Vec<Waypoint> {
    trajectory
        .waypoints
        .iter()
        .map(|wp| Waypoint {
            position: wp.position.add(&offset),
            velocity: wp.velocity,
            time_secs: wp.time_secs,
            constraints: wp.constraints,
        })
        .collect()
}
