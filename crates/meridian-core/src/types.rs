//! Fundamental geometric, kinematic, and trajectory types.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::enums::PayloadKind;

/// 3D Cartesian vector in engine space (meters, or meters/second).
/// x = East, y = North, z = Up (altitude).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean magnitude.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Distance to another point in meters (3D).
    pub fn distance_to(&self, other: &Vector3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Horizontal distance (ignoring altitude).
    pub fn horizontal_distance_to(&self, other: &Vector3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Bearing to another point in radians (0 = North, clockwise).
    pub fn bearing_to(&self, other: &Vector3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.atan2(dy).rem_euclid(std::f64::consts::TAU)
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn add(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(&self, s: f64) -> Vector3 {
        Vector3::new(self.x * s, self.y * s, self.z * s)
    }

    /// Unit vector in the same direction; zero vector stays zero.
    pub fn normalized(&self) -> Vector3 {
        let n = self.norm();
        if n < 1e-12 {
            Vector3::ZERO
        } else {
            self.scale(1.0 / n)
        }
    }
}

/// Geographic coordinate used only at system boundaries.
/// The engine itself operates in Cartesian space; conversions go through
/// the terrain crate's theater projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    /// Latitude in degrees.
    pub lat_deg: f64,
    /// Longitude in degrees.
    pub lon_deg: f64,
    /// Altitude in meters above the reference ellipsoid.
    pub alt_m: f64,
}

impl GeoCoord {
    pub fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            alt_m,
        }
    }
}

/// Per-waypoint motion constraints. All fields optional; absent means
/// the payload kind's defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointConstraints {
    pub min_speed_mps: Option<f64>,
    pub max_speed_mps: Option<f64>,
    pub altitude_floor_m: Option<f64>,
    pub altitude_ceiling_m: Option<f64>,
    /// Radius within which the planner may displace this waypoint (meters).
    pub deviation_radius_m: Option<f64>,
}

/// A timed position + velocity sample on a trajectory.
/// Waypoints are ordered by strictly increasing `time_secs` within a
/// trajectory; the last waypoint is the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Vector3,
    pub velocity: Vector3,
    /// Seconds from trajectory epoch.
    pub time_secs: f64,
    #[serde(default)]
    pub constraints: Option<WaypointConstraints>,
}

impl Waypoint {
    pub fn new(position: Vector3, velocity: Vector3, time_secs: f64) -> Self {
        Self {
            position,
            velocity,
            time_secs,
            constraints: None,
        }
    }
}

/// Trajectory identifier: a random prefix plus a SHA-256 content hash over
/// the waypoint sequence, so identical geometry replans to an identical
/// suffix and replay is content-addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrajectoryId(pub String);

impl TrajectoryId {
    /// Derive an identifier from the waypoint content.
    pub fn derive(nonce: &str, waypoints: &[Waypoint]) -> Self {
        let mut hasher = Sha256::new();
        for wp in waypoints {
            hasher.update(wp.position.x.to_be_bytes());
            hasher.update(wp.position.y.to_be_bytes());
            hasher.update(wp.position.z.to_be_bytes());
            hasher.update(wp.velocity.x.to_be_bytes());
            hasher.update(wp.velocity.y.to_be_bytes());
            hasher.update(wp.velocity.z.to_be_bytes());
            hasher.update(wp.time_secs.to_be_bytes());
        }
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(16);
        for byte in digest.iter().take(8) {
            hex.push_str(&format!("{byte:02x}"));
        }
        TrajectoryId(format!("traj-{nonce}-{hex}"))
    }
}

impl std::fmt::Display for TrajectoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A planned route for a payload. Immutable once emitted; a replan produces
/// a new trajectory with a new identifier and a `previous` back reference
/// (identifier only, never a pointer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub id: TrajectoryId,
    pub payload_kind: PayloadKind,
    pub waypoints: Vec<Waypoint>,
    /// Sum of segment lengths (meters).
    pub total_distance_m: f64,
    /// Time of the last waypoint relative to epoch (seconds).
    pub estimated_time_secs: f64,
    /// Fuel or energy required to fly the route (kilograms equivalent).
    pub required_fuel_kg: f64,
    /// Integrated exposure to threat envelopes, 0 (clean) to 1 (saturated).
    pub threat_exposure: f64,
    /// Composite stealth score, 0 (glowing) to 1 (invisible).
    pub stealth_score: f64,
    /// Planner confidence in the route, 0 to 1.
    pub confidence: f64,
    /// Engine clock at creation (seconds).
    pub created_at_secs: f64,
    /// Identifier of the trajectory this one replaced, if any.
    #[serde(default)]
    pub previous: Option<TrajectoryId>,
}

impl Trajectory {
    /// Target position: the last waypoint.
    pub fn target(&self) -> Option<Vector3> {
        self.waypoints.last().map(|wp| wp.position)
    }

    /// Total path length over all segments.
    pub fn path_length(waypoints: &[Waypoint]) -> f64 {
        waypoints
            .windows(2)
            .map(|pair| pair[0].position.distance_to(&pair[1].position))
            .sum()
    }

    /// Minimum perpendicular-ish distance from a point to the polyline
    /// (distance to the nearest point on any segment).
    pub fn cross_track_error(&self, position: &Vector3) -> f64 {
        let mut best = f64::MAX;
        for pair in self.waypoints.windows(2) {
            let d = point_segment_distance(position, &pair[0].position, &pair[1].position);
            if d < best {
                best = d;
            }
        }
        if self.waypoints.len() < 2 {
            if let Some(wp) = self.waypoints.first() {
                best = position.distance_to(&wp.position);
            }
        }
        best
    }
}

/// Distance from `p` to the closest point on segment [a, b].
pub fn point_segment_distance(p: &Vector3, a: &Vector3, b: &Vector3) -> f64 {
    let ab = b.sub(a);
    let len_sq = ab.dot(&ab);
    if len_sq < 1e-12 {
        return p.distance_to(a);
    }
    let t = (p.sub(a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let closest = a.add(&ab.scale(t));
    p.distance_to(&closest)
}

/// Vehicle attitude in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Ambient measurements reported by aerial/orbital payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ambient {
    /// Outside air temperature (Kelvin).
    pub temperature_k: f64,
    /// Wind vector (m/s), zero for vacuum.
    pub wind: Vector3,
}

/// Full kinematic + resource state of a tracked entity or payload.
/// States carry an epoch (`time_secs`) so replays are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub mass_kg: f64,
    pub fuel_kg: f64,
    /// Battery fraction remaining, 0 to 1.
    pub battery: f64,
    /// Engine clock epoch of this sample (seconds).
    pub time_secs: f64,
    #[serde(default)]
    pub attitude: Option<Attitude>,
    #[serde(default)]
    pub angular_rate: Option<Vector3>,
    #[serde(default)]
    pub ambient: Option<Ambient>,
}

impl EntityState {
    /// A minimal state at a position, everything else defaulted.
    pub fn at(position: Vector3, time_secs: f64) -> Self {
        Self {
            position,
            velocity: Vector3::ZERO,
            mass_kg: 0.0,
            fuel_kg: 0.0,
            battery: 1.0,
            time_secs,
            attitude: None,
            angular_rate: None,
            ambient: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3) -> Self {
        self.velocity = velocity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_norm_and_distance() {
        let a = Vector3::new(3.0, 4.0, 0.0);
        assert!((a.norm() - 5.0).abs() < 1e-12);

        let b = Vector3::new(3.0, 4.0, 12.0);
        assert!((a.distance_to(&b) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_product_right_handed() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        let z = x.cross(&y);
        assert!((z.z - 1.0).abs() < 1e-12, "x cross y should be z, got {z:?}");
    }

    #[test]
    fn test_trajectory_id_content_addressed() {
        let wps = vec![
            Waypoint::new(Vector3::new(0.0, 0.0, 100.0), Vector3::ZERO, 0.0),
            Waypoint::new(Vector3::new(1000.0, 0.0, 100.0), Vector3::ZERO, 10.0),
        ];
        let a = TrajectoryId::derive("abc", &wps);
        let b = TrajectoryId::derive("abc", &wps);
        assert_eq!(a, b, "same content should hash to same id");

        let mut wps2 = wps.clone();
        wps2[1].position.x = 2000.0;
        let c = TrajectoryId::derive("abc", &wps2);
        assert_ne!(a, c, "different content should hash differently");
    }

    #[test]
    fn test_waypoint_serialization_roundtrip() {
        let wp = Waypoint {
            position: Vector3::new(1.5, -2.25, 3.125),
            velocity: Vector3::new(0.1, 0.2, -0.3),
            time_secs: 42.5,
            constraints: Some(WaypointConstraints {
                max_speed_mps: Some(250.0),
                ..Default::default()
            }),
        };
        let json = serde_json::to_string(&wp).unwrap();
        let back: Waypoint = serde_json::from_str(&json).unwrap();
        assert_eq!(wp, back, "waypoint should round-trip bit-exactly");
    }

    #[test]
    fn test_cross_track_error_on_segment() {
        let traj = Trajectory {
            id: TrajectoryId("traj-test".into()),
            payload_kind: PayloadKind::Uav,
            waypoints: vec![
                Waypoint::new(Vector3::ZERO, Vector3::ZERO, 0.0),
                Waypoint::new(Vector3::new(1000.0, 0.0, 0.0), Vector3::ZERO, 10.0),
            ],
            total_distance_m: 1000.0,
            estimated_time_secs: 10.0,
            required_fuel_kg: 0.0,
            threat_exposure: 0.0,
            stealth_score: 1.0,
            confidence: 1.0,
            created_at_secs: 0.0,
            previous: None,
        };

        // 300m perpendicular offset from the midpoint
        let off = Vector3::new(500.0, 300.0, 0.0);
        let err = traj.cross_track_error(&off);
        assert!((err - 300.0).abs() < 1e-9, "cross-track should be 300, got {err}");

        // On the line
        let on = Vector3::new(250.0, 0.0, 0.0);
        assert!(traj.cross_track_error(&on) < 1e-9);
    }
}
