//! Cross-module tests for the core vocabulary crate.

use crate::enums::*;
use crate::events::{MissionEvent, MissionEventKind};
use crate::limits::limits_for;
use crate::mission::{Mission, MissionId, MissionSpec};
use crate::types::{TrajectoryId, Vector3, Waypoint};

fn sample_spec() -> MissionSpec {
    MissionSpec {
        payload_id: "uav-7".to_string(),
        payload_kind: PayloadKind::Uav,
        kind: MissionKind::Recon,
        origin: Vector3::new(0.0, 0.0, 100.0),
        target: Vector3::new(50_000.0, 30_000.0, 2_000.0),
        priority: 7,
        stealth_mode: StealthMode::High,
        classification: "secret".to_string(),
        target_track: None,
        waypoints: Vec::new(),
        fuel_budget_kg: Some(400.0),
        max_time_secs: Some(3_600.0),
    }
}

#[test]
fn test_mission_from_spec_starts_pending() {
    let mission = Mission::from_spec(&sample_spec(), 12.5);
    assert_eq!(mission.status, MissionStatus::Pending);
    assert_eq!(mission.created_at_secs, 12.5);
    assert!(mission.trajectory_id.is_none());
    assert!(mission.started_at_secs.is_none());
}

#[test]
fn test_mission_priority_clamped() {
    let mut spec = sample_spec();
    spec.priority = 200;
    let mission = Mission::from_spec(&spec, 0.0);
    assert_eq!(mission.priority, 10, "priority should clamp to 1..=10");
}

#[test]
fn test_mission_spec_json_roundtrip() {
    let spec = sample_spec();
    let json = serde_json::to_string(&spec).unwrap();
    let back: MissionSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(spec, back);
}

#[test]
fn test_mission_event_serializes_with_source() {
    let ev = MissionEvent::new(MissionEventKind::MissionCompleted, MissionId::generate())
        .with_field("final_distance_m", serde_json::json!(4.2));
    let json = serde_json::to_string(&ev).unwrap();
    assert!(json.contains("\"coordinator\""), "source tag missing: {json}");
    assert!(json.contains("mission-completed"), "kind tag missing: {json}");
}

#[test]
fn test_trajectory_id_nonce_distinguishes_replans() {
    // Identical geometry, different nonce: ids differ but share the content suffix.
    let wps = vec![
        Waypoint::new(Vector3::ZERO, Vector3::ZERO, 0.0),
        Waypoint::new(Vector3::new(100.0, 0.0, 0.0), Vector3::ZERO, 5.0),
    ];
    let a = TrajectoryId::derive("aaaa", &wps);
    let b = TrajectoryId::derive("bbbb", &wps);
    assert_ne!(a, b);
    let suffix_a = a.0.rsplit('-').next().unwrap();
    let suffix_b = b.0.rsplit('-').next().unwrap();
    assert_eq!(suffix_a, suffix_b, "content hash should be identical");
}

#[test]
fn test_kind_predicates_are_consistent() {
    for kind in [
        PayloadKind::GroundRobot,
        PayloadKind::Humanoid,
        PayloadKind::Drone,
        PayloadKind::Uav,
        PayloadKind::Missile,
        PayloadKind::Rocket,
        PayloadKind::Spacecraft,
        PayloadKind::Submarine,
        PayloadKind::Interstellar,
    ] {
        // Surface kinds never have an aerial cruise altitude above ground.
        if kind.is_surface() {
            assert!(
                limits_for(kind).cruise_altitude_m <= 0.0,
                "{kind:?} is surface but cruises above ground"
            );
        }
    }
}
