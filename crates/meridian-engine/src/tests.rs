//! Engine integration tests: mission lifecycle end-to-end, dispatch
//! retries, replanning under new threats, aborts, timeouts, and the
//! swarm loops. Tests run on a paused clock so backoff and monitor
//! ticks are deterministic.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::advance;

use meridian_core::enums::{FormationKind, MissionKind, MissionStatus, PayloadKind, StealthMode};
use meridian_core::error::GuidanceError;
use meridian_core::events::MissionEventKind;
use meridian_core::mission::MissionSpec;
use meridian_core::types::{EntityState, Vector3};
use meridian_stealth::evaluate::ZoneFootprint;

use crate::coordinator::{CoordinatorConfig, MissionCoordinator};
use crate::engine::{EngineConfig, GuidanceEngine};
use crate::payload::{MockPayload, PayloadCommand};

fn uav_spec(target: Vector3) -> MissionSpec {
    MissionSpec {
        payload_id: "uav-1".to_string(),
        payload_kind: PayloadKind::Uav,
        kind: MissionKind::Recon,
        origin: Vector3::new(0.0, 0.0, 100.0),
        target,
        priority: 5,
        stealth_mode: StealthMode::None,
        classification: String::new(),
        target_track: None,
        waypoints: Vec::new(),
        fuel_budget_kg: None,
        max_time_secs: None,
    }
}

/// Pump the paused clock so spawned monitors run.
async fn pump(millis: u64, steps: u32) {
    for _ in 0..steps {
        advance(Duration::from_millis(millis)).await;
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_mission_lifecycle_to_completion() {
    let coordinator = MissionCoordinator::new(CoordinatorConfig::default());
    let payload = Arc::new(MockPayload::default());
    coordinator.register_payload("uav-1", payload.clone());

    let mut events = coordinator.subscribe_events();
    let target = Vector3::new(30_000.0, 0.0, 1_500.0);
    let mission_id = coordinator
        .start_mission(uav_spec(target))
        .await
        .expect("mission should start");

    let mission = coordinator.mission(mission_id).unwrap();
    assert_eq!(mission.status, MissionStatus::Active);
    assert!(mission.trajectory_id.is_some());
    assert_eq!(payload.dispatched().len(), 1, "trajectory delivered to payload");

    // Created event first.
    let created = events.recv().await.unwrap();
    assert_eq!(created.kind, MissionEventKind::MissionCreated);

    // Mid-route telemetry: no completion yet.
    let mid = EntityState::at(Vector3::new(15_000.0, 0.0, 6_000.0), coordinator.now_secs());
    coordinator.update_telemetry(mission_id, mid).unwrap();
    pump(100, 5).await;
    assert_eq!(
        coordinator.mission(mission_id).unwrap().status,
        MissionStatus::Active
    );

    // Arrival telemetry within the 10 m completion tolerance.
    let arrived = EntityState::at(Vector3::new(30_000.0, 0.0, 1_504.0), coordinator.now_secs());
    coordinator.update_telemetry(mission_id, arrived).unwrap();
    pump(100, 10).await;

    let mission = coordinator.mission(mission_id).unwrap();
    assert_eq!(mission.status, MissionStatus::Completed);
    assert!(mission.completed_at_secs.is_some());

    // Drift replans may have published along the way; find the terminal event.
    let mut completed = None;
    while let Ok(ev) = events.try_recv() {
        if ev.kind == MissionEventKind::MissionCompleted {
            completed = Some(ev);
            break;
        }
    }
    let completed = completed.expect("completion event published");
    let final_distance = completed.payload["final_distance_m"].as_f64().unwrap();
    assert!(
        final_distance <= 10.0,
        "completed mission must be within tolerance, got {final_distance}"
    );

    // Terminal: further telemetry is rejected (monitor gone).
    let late = EntityState::at(target, coordinator.now_secs());
    assert!(coordinator.update_telemetry(mission_id, late).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_retries_with_backoff() {
    let coordinator = MissionCoordinator::new(CoordinatorConfig::default());
    let payload = Arc::new(MockPayload::default());
    payload.fail_next_dispatches(3);
    coordinator.register_payload("uav-1", payload.clone());

    let mission_id = coordinator
        .start_mission(uav_spec(Vector3::new(20_000.0, 5_000.0, 1_000.0)))
        .await
        .expect("three faults are within the retry budget");

    assert_eq!(payload.dispatched().len(), 1);
    assert_eq!(
        coordinator.mission(mission_id).unwrap().status,
        MissionStatus::Active
    );
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_escalates_to_failed() {
    let coordinator = MissionCoordinator::new(CoordinatorConfig::default());
    let payload = Arc::new(MockPayload::default());
    payload.fail_next_dispatches(10); // beyond the 6-attempt budget
    coordinator.register_payload("uav-1", payload.clone());

    let mut events = coordinator.subscribe_events();
    let err = coordinator
        .start_mission(uav_spec(Vector3::new(20_000.0, 5_000.0, 1_000.0)))
        .await
        .expect_err("exhausted retries must fail the mission");
    assert!(matches!(err, GuidanceError::DispatchFailed { attempts: 6, .. }));

    let created = events.recv().await.unwrap();
    assert_eq!(created.kind, MissionEventKind::MissionCreated);
    let failed = events.recv().await.unwrap();
    assert_eq!(failed.kind, MissionEventKind::MissionFailed);
    assert_eq!(failed.mission_id, created.mission_id);
    assert_eq!(
        coordinator.mission(created.mission_id).unwrap().status,
        MissionStatus::Failed
    );
}

#[tokio::test(start_paused = true)]
async fn test_replan_when_new_threat_crosses_route() {
    let coordinator = MissionCoordinator::new(CoordinatorConfig::default());
    let payload = Arc::new(MockPayload::default());
    coordinator.register_payload("uav-1", payload.clone());

    let mission_id = coordinator
        .start_mission(uav_spec(Vector3::new(40_000.0, 0.0, 2_000.0)))
        .await
        .unwrap();
    let first_id = coordinator
        .mission(mission_id)
        .unwrap()
        .trajectory_id
        .unwrap();

    // Fly a while: telemetry pinned to the planned route.
    let first = coordinator.trajectory(&first_id).unwrap();
    let on_route = first.waypoints[2];
    let state = EntityState::at(on_route.position, coordinator.now_secs())
        .with_velocity(on_route.velocity);
    coordinator.update_telemetry(mission_id, state).unwrap();
    pump(100, 5).await;
    assert_eq!(
        coordinator.mission(mission_id).unwrap().trajectory_id.unwrap(),
        first_id,
        "clean corridor keeps the incumbent"
    );

    // A new threat zone lands on the remaining route.
    coordinator.add_threat_zone(ZoneFootprint {
        center: Vector3::new(25_000.0, 0.0, 0.0),
        radius_m: 8_000.0,
        level: 0.9,
    });

    // Within one monitor tick the coordinator replans and re-dispatches.
    pump(200, 10).await;

    let mission = coordinator.mission(mission_id).unwrap();
    let current_id = mission.trajectory_id.unwrap();
    assert_ne!(current_id, first_id, "threat must force a new trajectory");
    assert_eq!(mission.status, MissionStatus::Active);

    let replanned = coordinator.trajectory(&current_id).unwrap();
    assert_eq!(
        replanned.previous.as_ref(),
        Some(&first_id),
        "replanned trajectory records its lineage"
    );
    assert!(payload.dispatched().len() >= 2, "new trajectory dispatched");
}

#[tokio::test(start_paused = true)]
async fn test_strike_mission_uses_intercept_solver() {
    let coordinator = MissionCoordinator::new(CoordinatorConfig::default());
    let payload = Arc::new(MockPayload::default());
    coordinator.register_payload("msl-1", payload.clone());

    // Track a target crossing east at 100 m/s; two fixes give the
    // estimator a velocity.
    use meridian_estimator::Observation;
    for t in 0..=10 {
        let pos = Vector3::new(20_000.0 + 100.0 * t as f64, 0.0, 5_000.0);
        coordinator
            .observe_entity("hostile-7", PayloadKind::Uav, Observation::position_fix(pos, t as f64, 5.0))
            .unwrap();
    }

    let spec = MissionSpec {
        payload_id: "msl-1".to_string(),
        payload_kind: PayloadKind::Missile,
        kind: MissionKind::Strike,
        origin: Vector3::new(0.0, 0.0, 100.0),
        target: Vector3::new(20_000.0, 0.0, 5_000.0),
        priority: 9,
        stealth_mode: StealthMode::None,
        classification: String::new(),
        target_track: Some("hostile-7".to_string()),
        waypoints: Vec::new(),
        fuel_budget_kg: None,
        max_time_secs: None,
    };
    let mission_id = coordinator.start_mission(spec).await.unwrap();

    let mission = coordinator.mission(mission_id).unwrap();
    assert_eq!(mission.status, MissionStatus::Active);
    let traj = coordinator.trajectory(&mission.trajectory_id.unwrap()).unwrap();

    // Intercept routes are straight runs at the launch velocity, leading
    // the target past its last observed position.
    let aim = traj.target().unwrap();
    assert!(
        aim.x > 21_500.0,
        "intercept point should lead the eastbound target, got x={:.0}",
        aim.x
    );
    let speeds: Vec<f64> = traj.waypoints.iter().map(|w| w.velocity.norm()).collect();
    assert!(
        speeds.windows(2).all(|p| (p[0] - p[1]).abs() < 1e-9),
        "intercept run should hold one commanded velocity"
    );
    assert!(speeds[0] <= 1_400.0, "launch speed bounded by the airframe");
    assert_eq!(payload.dispatched().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_strike_without_feasible_intercept_fails() {
    let coordinator = MissionCoordinator::new(CoordinatorConfig::default());
    coordinator.register_payload("msl-1", Arc::new(MockPayload::default()));

    let mut spec = uav_spec(Vector3::new(900_000.0, 0.0, 10_000.0));
    spec.payload_kind = PayloadKind::Missile;
    spec.kind = MissionKind::Strike;
    spec.payload_id = "msl-1".to_string();
    spec.max_time_secs = Some(30.0); // 900 km in 30 s is beyond any airframe

    let mut events = coordinator.subscribe_events();
    let err = coordinator.start_mission(spec).await.unwrap_err();
    assert!(matches!(err, GuidanceError::NoFeasibleIntercept));

    let created = events.recv().await.unwrap();
    let failed = events.recv().await.unwrap();
    assert_eq!(failed.kind, MissionEventKind::MissionFailed);
    assert_eq!(
        coordinator.mission(created.mission_id).unwrap().status,
        MissionStatus::Failed
    );
}

#[tokio::test(start_paused = true)]
async fn test_abort_stops_payload_and_publishes() {
    let coordinator = MissionCoordinator::new(CoordinatorConfig::default());
    let payload = Arc::new(MockPayload::default());
    coordinator.register_payload("uav-1", payload.clone());

    let mut events = coordinator.subscribe_events();
    let mission_id = coordinator
        .start_mission(uav_spec(Vector3::new(25_000.0, 0.0, 1_000.0)))
        .await
        .unwrap();

    coordinator.abort_mission(mission_id).await.unwrap();

    let mission = coordinator.mission(mission_id).unwrap();
    assert_eq!(mission.status, MissionStatus::Aborted);
    assert!(
        payload.commands().contains(&PayloadCommand::Stop),
        "abort should stop the payload"
    );

    let mut kinds = Vec::new();
    while let Ok(ev) = events.try_recv() {
        kinds.push(ev.kind);
    }
    assert!(kinds.contains(&MissionEventKind::MissionAborted));

    // Aborting again is a no-op.
    coordinator.abort_mission(mission_id).await.unwrap();
    assert_eq!(
        coordinator.mission(mission_id).unwrap().status,
        MissionStatus::Aborted
    );
}

#[tokio::test(start_paused = true)]
async fn test_mission_times_out_to_failed() {
    let coordinator = MissionCoordinator::new(CoordinatorConfig::default());
    let payload = Arc::new(MockPayload::default());
    coordinator.register_payload("uav-1", payload.clone());

    let mut spec = uav_spec(Vector3::new(30_000.0, 0.0, 1_500.0));
    spec.max_time_secs = Some(5.0);
    let mission_id = coordinator.start_mission(spec).await.unwrap();

    // Mid-route, then silence past the budget.
    let mid = EntityState::at(Vector3::new(5_000.0, 0.0, 4_000.0), coordinator.now_secs());
    coordinator.update_telemetry(mission_id, mid).unwrap();
    pump(1_000, 10).await;

    assert_eq!(
        coordinator.mission(mission_id).unwrap().status,
        MissionStatus::Failed
    );
}

#[tokio::test(start_paused = true)]
async fn test_infeasible_mission_fails_immediately() {
    let coordinator = MissionCoordinator::new(CoordinatorConfig::default());
    coordinator.register_payload("rover-1", Arc::new(MockPayload::default()));

    let spec = MissionSpec {
        payload_id: "rover-1".to_string(),
        payload_kind: PayloadKind::GroundRobot,
        kind: MissionKind::AidDelivery,
        origin: Vector3::ZERO,
        target: Vector3::new(2_000.0, 0.0, 5_000.0), // 5 km up
        priority: 3,
        stealth_mode: StealthMode::None,
        classification: String::new(),
        target_track: None,
        waypoints: Vec::new(),
        fuel_budget_kg: None,
        max_time_secs: None,
    };

    let mut events = coordinator.subscribe_events();
    let err = coordinator.start_mission(spec).await.unwrap_err();
    assert!(matches!(err, GuidanceError::InfeasibleMission { .. }));

    let created = events.recv().await.unwrap();
    let failed = events.recv().await.unwrap();
    assert_eq!(failed.kind, MissionEventKind::MissionFailed);
    assert_eq!(
        coordinator.mission(created.mission_id).unwrap().status,
        MissionStatus::Failed
    );
}

#[tokio::test(start_paused = true)]
async fn test_swarm_formation_dispatches_moves() {
    let engine = GuidanceEngine::new(EngineConfig::default());

    let mut mocks = Vec::new();
    for i in 0..4 {
        let id = format!("bot-{i}");
        let mock = Arc::new(MockPayload::new(EntityState::at(
            Vector3::new(i as f64 * 20.0, 0.0, 0.0),
            0.0,
        )));
        engine.coordinator().register_payload(&id, mock.clone());
        engine
            .register_robot(&id, Vector3::new(i as f64 * 20.0, 0.0, 0.0))
            .unwrap();
        mocks.push(mock);
    }

    engine.set_formation(FormationKind::Line).await.unwrap();

    for mock in &mocks {
        assert!(
            mock.commands()
                .iter()
                .any(|c| matches!(c, PayloadCommand::Move(_))),
            "every robot should receive a formation move"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_engine_emergency_stop_broadcasts() {
    let engine = GuidanceEngine::new(EngineConfig::default());
    let mock = Arc::new(MockPayload::default());
    engine.coordinator().register_payload("bot-0", mock.clone());
    engine.register_robot("bot-0", Vector3::ZERO).unwrap();

    engine.emergency_stop().await;

    assert!(mock.commands().contains(&PayloadCommand::Stop));
    assert!(engine.swarm().lock().unwrap().is_emergency());
    assert!(matches!(
        engine.register_robot("bot-9", Vector3::ZERO),
        Err(GuidanceError::EmergencyStopped)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_geo_mission_converts_at_the_boundary() {
    let engine = GuidanceEngine::new(EngineConfig {
        theater_ref: (34.0, 44.0),
        ..Default::default()
    });
    let payload = Arc::new(MockPayload::default());
    engine.coordinator().register_payload("uav-1", payload);

    // ~0.2° north of the anchor: ≈22.3 km in engine space.
    let request = crate::engine::GeoMissionRequest {
        spec: uav_spec(Vector3::ZERO),
        origin: meridian_core::types::GeoCoord::new(34.0, 44.0, 100.0),
        target: meridian_core::types::GeoCoord::new(34.2, 44.0, 1_500.0),
    };
    let mission_id = engine.start_mission_geo(request).await.unwrap();

    let mission = engine.coordinator().mission(mission_id).unwrap();
    assert!(
        mission.origin.horizontal_distance_to(&Vector3::ZERO) < 1.0,
        "anchor maps to the engine origin"
    );
    assert!(
        (mission.target.y - 0.2 * 111_320.0).abs() < 10.0,
        "0.2° lat should be ~22.3 km north, got {}",
        mission.target.y
    );
    assert_eq!(mission.status, MissionStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn test_event_forwarder_mirrors_into_broker() {
    let engine = GuidanceEngine::new(EngineConfig::default());
    let payload = Arc::new(MockPayload::default());
    engine.coordinator().register_payload("uav-1", payload);
    let forwarder = engine.spawn_event_forwarder();

    engine
        .coordinator()
        .start_mission(uav_spec(Vector3::new(15_000.0, 0.0, 1_000.0)))
        .await
        .unwrap();
    pump(50, 5).await;

    let mirrored = engine.broker().mission_events.drain();
    assert!(
        mirrored
            .iter()
            .any(|e| e.kind == MissionEventKind::MissionCreated),
        "lifecycle events should reach the broker stream"
    );

    engine.shutdown();
    let _ = forwarder.await;
}
