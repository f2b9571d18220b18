//! Tests for the tracker registry: ordering, staleness, history,
//! prediction confidence, and pruning.

use meridian_core::enums::PayloadKind;
use meridian_core::error::GuidanceError;
use meridian_core::types::Vector3;

use crate::tracker::{Observation, StateEstimator};

fn fix(x: f64, t: f64) -> Observation {
    Observation::position_fix(Vector3::new(x, 0.0, 1000.0), t, 5.0)
}

#[test]
fn test_observations_apply_in_timestamp_order() {
    let mut est = StateEstimator::new();

    // Deliver 0..20 s samples with 10 and 11 swapped; both are within the
    // staleness slack so the reorder buffer must fix the order.
    let mut times: Vec<f64> = (0..=20).map(|t| t as f64).collect();
    times.swap(10, 11);

    for t in times {
        est.update_state("target-1", PayloadKind::Uav, fix(100.0 * t, t))
            .expect("in-slack observations should be accepted");
    }

    let state = est.current_estimate("target-1").unwrap();
    assert_eq!(state.time_secs, 20.0, "all samples should have applied");
    assert!(
        (state.velocity.x - 100.0).abs() < 10.0,
        "velocity should converge despite the swap, got {:.1}",
        state.velocity.x
    );
}

#[test]
fn test_stale_observation_dropped_and_counted() {
    let mut est = StateEstimator::new();
    for t in 0..=10 {
        est.update_state("e", PayloadKind::Uav, fix(0.0, t as f64)).unwrap();
    }
    // Drain so last_applied reaches 10 s.
    est.current_estimate("e").unwrap();

    let err = est
        .update_state("e", PayloadKind::Uav, fix(0.0, 2.0))
        .expect_err("8-second-old observation should be stale");
    assert!(matches!(err, GuidanceError::StaleObservation { .. }));
    assert_eq!(est.stale_dropped("e"), 1);
}

#[test]
fn test_invalid_covariance_rejected() {
    let mut est = StateEstimator::new();
    let mut obs = fix(0.0, 0.0);
    obs.noise[0] = -4.0; // negative variance
    let err = est
        .update_state("e", PayloadKind::Uav, obs)
        .expect_err("negative-variance covariance must be rejected");
    assert!(matches!(err, GuidanceError::InvalidCovariance { .. }));
    assert!(!est.is_tracking("e"), "rejected first contact should not create a track");
}

#[test]
fn test_history_is_bounded_ring() {
    let mut est = StateEstimator::new();
    for t in 0..250 {
        est.update_state("e", PayloadKind::Drone, fix(t as f64, t as f64))
            .unwrap();
    }
    let all = est.observation_history("e", usize::MAX);
    assert_eq!(all.len(), 100, "history ring should cap at 100");
    let last10 = est.observation_history("e", 10);
    assert_eq!(last10.len(), 10);
    assert_eq!(last10.last().unwrap().time_secs, 249.0, "newest sample kept");
    assert_eq!(last10[0].time_secs, 240.0);
}

#[test]
fn test_prediction_confidence_decays_with_horizon() {
    let mut est = StateEstimator::new();
    for t in 0..=30 {
        est.update_state("a", PayloadKind::Uav, fix(50.0 * t as f64, t as f64))
            .unwrap();
    }

    let pred = est.predict_trajectory("a", 60.0, 6).unwrap();
    assert_eq!(pred.len(), 6);

    // τ for aircraft-class kinds is 30 s → exp(-60/30) at the end.
    let last = pred.last().unwrap();
    assert!(
        (last.confidence - (-2.0_f64).exp()).abs() < 1e-9,
        "confidence at 60 s should be exp(-2), got {}",
        last.confidence
    );
    for pair in pred.windows(2) {
        assert!(pair[1].confidence < pair[0].confidence);
        assert!(
            pair[1].position_variance[0] > pair[0].position_variance[0],
            "variance should grow along the horizon"
        );
    }
}

#[test]
fn test_spacecraft_confidence_decays_slower() {
    let mut est = StateEstimator::new();
    for t in 0..=30 {
        est.update_state("sat", PayloadKind::Spacecraft, fix(7000.0 * t as f64, t as f64))
            .unwrap();
        est.update_state("jet", PayloadKind::Uav, fix(200.0 * t as f64, t as f64))
            .unwrap();
    }
    let sat = est.predict_trajectory("sat", 60.0, 2).unwrap();
    let jet = est.predict_trajectory("jet", 60.0, 2).unwrap();
    assert!(
        sat.last().unwrap().confidence > jet.last().unwrap().confidence,
        "quiet orbital tracks should hold confidence longer"
    );
}

#[test]
fn test_prune_removes_idle_tracks() {
    let mut est = StateEstimator::new();
    est.update_state("m", PayloadKind::Missile, fix(0.0, 0.0)).unwrap();
    est.update_state("s", PayloadKind::Spacecraft, fix(0.0, 0.0)).unwrap();

    // Missile TTL is 30 s; spacecraft TTL is 3600 s.
    let pruned = est.prune(120.0);
    assert_eq!(pruned, vec!["m".to_string()]);
    assert!(!est.is_tracking("m"));
    assert!(est.is_tracking("s"));
}

#[test]
fn test_unknown_entity_errors() {
    let mut est = StateEstimator::new();
    let err = est.predict_trajectory("ghost", 10.0, 5).unwrap_err();
    assert!(matches!(err, GuidanceError::UnknownEntity(_)));
}
