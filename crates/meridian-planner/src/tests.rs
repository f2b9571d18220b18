//! Planner tests: feasibility gating, kinematic invariants, stealth
//! routing, budgets, zone avoidance, and partial replanning.

use meridian_core::enums::{PayloadKind, RadarBand, StealthMode};
use meridian_core::error::GuidanceError;
use meridian_core::limits::limits_for;
use meridian_core::threat::RadarSite;
use meridian_core::types::{EntityState, Trajectory, Vector3, point_segment_distance};
use meridian_stealth::evaluate::{ThreatPicture, ZoneFootprint};

use crate::constraints::PlanConstraints;
use crate::planner::{PlannerConfig, TrajectoryPlanner};

fn planner() -> TrajectoryPlanner {
    TrajectoryPlanner::new(PlannerConfig { seed: 7 })
}

fn uav_start() -> EntityState {
    EntityState::at(Vector3::new(0.0, 0.0, 100.0), 0.0)
        .with_velocity(Vector3::new(50.0, 0.0, 0.0))
}

fn assert_kinematics_hold(traj: &Trajectory) {
    let limits = limits_for(traj.payload_kind);
    for pair in traj.waypoints.windows(2) {
        let dt = pair[1].time_secs - pair[0].time_secs;
        assert!(dt > 0.0, "waypoint times must be strictly increasing");
        let speed = pair[0].position.distance_to(&pair[1].position) / dt;
        assert!(
            speed <= limits.max_speed_mps + 1e-6,
            "segment speed {speed:.1} exceeds {:.1}",
            limits.max_speed_mps
        );
        let accel = pair[1].velocity.sub(&pair[0].velocity).norm() / dt;
        assert!(
            accel <= limits.max_accel_mps2 + 1e-6,
            "segment accel {accel:.2} exceeds {:.2}",
            limits.max_accel_mps2
        );
    }
}

#[test]
fn test_plan_reaches_target_within_tolerance() {
    let mut planner = planner();
    let target = Vector3::new(40_000.0, 10_000.0, 1_500.0);
    let traj = planner
        .plan(
            PayloadKind::Uav,
            &uav_start(),
            target,
            &PlanConstraints::default(),
            &ThreatPicture::default(),
            None,
            0.0,
        )
        .expect("clean-corridor plan should succeed");

    let end = traj.target().unwrap();
    assert!(end.distance_to(&target) < 1.0, "last waypoint is the target");
    assert!(traj.total_distance_m > 0.0);
    assert!(traj.estimated_time_secs > 0.0);
    assert_kinematics_hold(&traj);
}

#[test]
fn test_feasibility_gate_rejects_out_of_envelope() {
    let mut planner = planner();
    // A ground robot cannot take a target at 5 km altitude.
    let err = planner
        .plan(
            PayloadKind::GroundRobot,
            &EntityState::at(Vector3::ZERO, 0.0),
            Vector3::new(1_000.0, 0.0, 5_000.0),
            &PlanConstraints::default(),
            &ThreatPicture::default(),
            None,
            0.0,
        )
        .unwrap_err();
    assert!(matches!(err, GuidanceError::InfeasibleMission { .. }));
}

#[test]
fn test_fuel_budget_exceeded_surfaces() {
    let mut planner = planner();
    let constraints = PlanConstraints {
        fuel_budget_kg: Some(0.001),
        ..Default::default()
    };
    let err = planner
        .plan(
            PayloadKind::Uav,
            &uav_start(),
            Vector3::new(100_000.0, 0.0, 2_000.0),
            &constraints,
            &ThreatPicture::default(),
            None,
            0.0,
        )
        .unwrap_err();
    assert!(matches!(err, GuidanceError::BudgetExceeded { .. }));
}

#[test]
fn test_avoid_zone_is_respected() {
    let mut planner = planner();
    let zone = ZoneFootprint {
        center: Vector3::new(25_000.0, 0.0, 0.0),
        radius_m: 8_000.0,
        level: 1.0,
    };
    let constraints = PlanConstraints {
        avoid_zones: vec![zone.clone()],
        ..Default::default()
    };
    let traj = planner
        .plan(
            PayloadKind::Uav,
            &uav_start(),
            Vector3::new(50_000.0, 0.0, 2_000.0),
            &constraints,
            &ThreatPicture::default(),
            None,
            0.0,
        )
        .expect("zone should be routable around");

    for wp in &traj.waypoints[1..traj.waypoints.len() - 1] {
        assert!(
            !zone.contains(&wp.position),
            "waypoint {:?} sits inside the avoid zone",
            wp.position
        );
    }
    assert_kinematics_hold(&traj);
}

#[test]
fn test_same_seed_plans_same_route() {
    let target = Vector3::new(60_000.0, 20_000.0, 2_000.0);
    let threats = ThreatPicture::default();

    let mut a = TrajectoryPlanner::new(PlannerConfig { seed: 99 });
    let mut b = TrajectoryPlanner::new(PlannerConfig { seed: 99 });
    let ta = a
        .plan(PayloadKind::Uav, &uav_start(), target, &PlanConstraints::default(), &threats, None, 0.0)
        .unwrap();
    let tb = b
        .plan(PayloadKind::Uav, &uav_start(), target, &PlanConstraints::default(), &threats, None, 0.0)
        .unwrap();

    assert_eq!(ta.waypoints.len(), tb.waypoints.len());
    for (wa, wb) in ta.waypoints.iter().zip(&tb.waypoints) {
        assert_eq!(wa.position, wb.position, "same seed must sample the same route");
    }
}

#[test]
fn test_stealth_recon_against_two_radars() {
    // Recon UAV through a corridor watched by two radar sites. The
    // selected route should trade distance for masking: a healthy stealth
    // score, a real displacement off the direct line, bounded stretch.
    let mut planner = planner();
    let start = uav_start();
    let target = Vector3::new(50_000.0, 30_000.0, 2_000.0);
    let threats = ThreatPicture {
        radars: vec![
            RadarSite {
                id: "ew-1".to_string(),
                position: Vector3::new(20_000.0, 15_000.0, 0.0),
                band: RadarBand::SBand,
                frequency_ghz: 3.0,
                range_km: 30.0,
                active: true,
            },
            RadarSite {
                id: "ew-2".to_string(),
                position: Vector3::new(35_000.0, 25_000.0, 0.0),
                band: RadarBand::SBand,
                frequency_ghz: 3.2,
                range_km: 40.0,
                active: true,
            },
        ],
        ..Default::default()
    };
    let constraints = PlanConstraints {
        stealth_mode: StealthMode::High,
        priority: 6,
        ..Default::default()
    };

    let traj = planner
        .plan(PayloadKind::Uav, &start, target, &constraints, &threats, None, 0.0)
        .expect("stealth recon should be plannable");

    assert!(
        traj.stealth_score >= 0.7,
        "stealth score should reach 0.7, got {:.2}",
        traj.stealth_score
    );

    let direct = start.position.distance_to(&target);
    assert!(
        traj.total_distance_m <= 1.3 * direct,
        "route stretch {:.2}× exceeds 1.3×",
        traj.total_distance_m / direct
    );

    let max_offset = traj
        .waypoints
        .iter()
        .map(|wp| point_segment_distance(&wp.position, &start.position, &target))
        .fold(0.0_f64, f64::max);
    assert!(
        max_offset >= 1_000.0,
        "at least one waypoint should displace ≥1 km off the direct line, got {max_offset:.0}"
    );

    assert_kinematics_hold(&traj);
}

#[test]
fn test_update_trajectory_keeps_incumbent_on_track() {
    let mut planner = planner();
    let target = Vector3::new(40_000.0, 0.0, 2_000.0);
    let traj = planner
        .plan(
            PayloadKind::Uav,
            &uav_start(),
            target,
            &PlanConstraints::default(),
            &ThreatPicture::default(),
            None,
            0.0,
        )
        .unwrap();

    // On the route: no replan.
    let on_route = EntityState::at(traj.waypoints[2].position, 60.0)
        .with_velocity(traj.waypoints[2].velocity);
    let unchanged = planner
        .update_trajectory(&on_route, &traj, &PlanConstraints::default(), &ThreatPicture::default(), None, 60.0)
        .unwrap();
    assert!(unchanged.is_none(), "small cross-track should keep the incumbent");
}

#[test]
fn test_update_trajectory_replans_when_off_track() {
    let mut planner = planner();
    let target = Vector3::new(40_000.0, 0.0, 2_000.0);
    let traj = planner
        .plan(
            PayloadKind::Uav,
            &uav_start(),
            target,
            &PlanConstraints::default(),
            &ThreatPicture::default(),
            None,
            0.0,
        )
        .unwrap();

    // 5 km off the corridor: cross-track threshold for a UAV is 500 m.
    let off_route = EntityState::at(Vector3::new(20_000.0, -5_000.0, 3_000.0), 90.0)
        .with_velocity(Vector3::new(150.0, 0.0, 0.0));
    let replanned = planner
        .update_trajectory(&off_route, &traj, &PlanConstraints::default(), &ThreatPicture::default(), None, 90.0)
        .unwrap()
        .expect("large cross-track should trigger a replan");

    assert_ne!(replanned.id, traj.id, "replan must mint a new identifier");
    assert_eq!(
        replanned.previous.as_ref(),
        Some(&traj.id),
        "replan should reference the incumbent"
    );
    assert!(replanned.target().unwrap().distance_to(&target) < 1.0);
    assert_kinematics_hold(&replanned);
}

#[test]
fn test_ground_route_stays_on_surface() {
    let mut planner = planner();
    let traj = planner
        .plan(
            PayloadKind::GroundRobot,
            &EntityState::at(Vector3::ZERO, 0.0),
            Vector3::new(500.0, 300.0, 0.0),
            &PlanConstraints::default(),
            &ThreatPicture::default(),
            None,
            0.0,
        )
        .unwrap();
    for wp in &traj.waypoints {
        assert!(
            wp.position.z.abs() < 1.0,
            "ground route should stay at the surface, got z={}",
            wp.position.z
        );
    }
    assert_kinematics_hold(&traj);
}
