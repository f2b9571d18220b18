//! Per-payload-kind parameter tables.
//!
//! Consolidates kinematic limits, signature bases, estimator tuning,
//! and coordination tolerances for each payload kind.

use crate::enums::PayloadKind;

/// Parameter row for a payload kind.
#[derive(Debug, Clone, Copy)]
pub struct KindLimits {
    /// Maximum segment speed (m/s).
    pub max_speed_mps: f64,
    /// Maximum segment acceleration (m/s²).
    pub max_accel_mps2: f64,
    /// Lowest permitted operating altitude (m).
    pub altitude_floor_m: f64,
    /// Highest permitted operating altitude (m).
    pub altitude_ceiling_m: f64,
    /// Preferred cruise altitude for baseline paths (m).
    pub cruise_altitude_m: f64,
    /// Base radar cross-section scale factor (relative to the aspect profile).
    pub rcs_scale: f64,
    /// Engine contribution coefficient in the thermal model (K per unit throttle).
    pub thermal_engine_coeff: f64,
    /// Fuel consumed per m/s of commanded ΔV (kg·s/m).
    pub fuel_per_delta_v: f64,
    /// Trajectory age beyond which the monitor requests a refresh (s).
    pub replan_interval_secs: f64,
    /// Cross-track error above which a replan is requested (m).
    pub cross_track_threshold_m: f64,
    /// Distance to target at which a mission completes (m).
    pub completion_tolerance_m: f64,
    /// Prediction confidence time constant τ (s).
    pub predict_tau_secs: f64,
    /// Kalman process-noise acceleration spectral density (m²/s³).
    pub process_noise_accel: f64,
    /// Tracked entities of this kind are pruned after this idle time (s).
    pub observation_ttl_secs: f64,
}

/// Get the parameter row for a payload kind.
pub fn limits_for(kind: PayloadKind) -> KindLimits {
    match kind {
        PayloadKind::GroundRobot => KindLimits {
            max_speed_mps: 5.0,
            max_accel_mps2: 2.0,
            altitude_floor_m: 0.0,
            altitude_ceiling_m: 0.0,
            cruise_altitude_m: 0.0,
            rcs_scale: 0.3,
            thermal_engine_coeff: 20.0,
            fuel_per_delta_v: 0.05,
            replan_interval_secs: 30.0,
            cross_track_threshold_m: 5.0,
            completion_tolerance_m: 10.0,
            predict_tau_secs: 20.0,
            process_noise_accel: 0.5,
            observation_ttl_secs: 120.0,
        },
        PayloadKind::Humanoid => KindLimits {
            max_speed_mps: 3.0,
            max_accel_mps2: 1.5,
            altitude_floor_m: 0.0,
            altitude_ceiling_m: 0.0,
            cruise_altitude_m: 0.0,
            rcs_scale: 0.2,
            thermal_engine_coeff: 10.0,
            fuel_per_delta_v: 0.02,
            replan_interval_secs: 30.0,
            cross_track_threshold_m: 3.0,
            completion_tolerance_m: 10.0,
            predict_tau_secs: 15.0,
            process_noise_accel: 0.8,
            observation_ttl_secs: 120.0,
        },
        PayloadKind::Drone => KindLimits {
            max_speed_mps: 30.0,
            max_accel_mps2: 8.0,
            altitude_floor_m: 5.0,
            altitude_ceiling_m: 2_000.0,
            cruise_altitude_m: 120.0,
            rcs_scale: 0.05,
            thermal_engine_coeff: 40.0,
            fuel_per_delta_v: 0.01,
            replan_interval_secs: 20.0,
            cross_track_threshold_m: 20.0,
            completion_tolerance_m: 10.0,
            predict_tau_secs: 30.0,
            process_noise_accel: 2.0,
            observation_ttl_secs: 60.0,
        },
        PayloadKind::Uav => KindLimits {
            max_speed_mps: 250.0,
            max_accel_mps2: 30.0,
            altitude_floor_m: 50.0,
            altitude_ceiling_m: 15_000.0,
            cruise_altitude_m: 8_000.0,
            rcs_scale: 1.0,
            thermal_engine_coeff: 150.0,
            fuel_per_delta_v: 0.4,
            replan_interval_secs: 15.0,
            cross_track_threshold_m: 500.0,
            completion_tolerance_m: 10.0,
            predict_tau_secs: 30.0,
            process_noise_accel: 5.0,
            observation_ttl_secs: 60.0,
        },
        PayloadKind::Missile => KindLimits {
            max_speed_mps: 1_400.0,
            max_accel_mps2: 300.0,
            altitude_floor_m: 10.0,
            altitude_ceiling_m: 30_000.0,
            cruise_altitude_m: 10_000.0,
            rcs_scale: 0.1,
            thermal_engine_coeff: 600.0,
            fuel_per_delta_v: 0.8,
            replan_interval_secs: 5.0,
            cross_track_threshold_m: 200.0,
            completion_tolerance_m: 10.0,
            predict_tau_secs: 20.0,
            process_noise_accel: 20.0,
            observation_ttl_secs: 30.0,
        },
        PayloadKind::Rocket => KindLimits {
            max_speed_mps: 8_000.0,
            max_accel_mps2: 50.0,
            altitude_floor_m: 0.0,
            altitude_ceiling_m: 500_000.0,
            cruise_altitude_m: 200_000.0,
            rcs_scale: 5.0,
            thermal_engine_coeff: 2_000.0,
            fuel_per_delta_v: 3.0,
            replan_interval_secs: 60.0,
            cross_track_threshold_m: 2_000.0,
            completion_tolerance_m: 100.0,
            predict_tau_secs: 120.0,
            process_noise_accel: 10.0,
            observation_ttl_secs: 600.0,
        },
        PayloadKind::Spacecraft => KindLimits {
            max_speed_mps: 11_000.0,
            max_accel_mps2: 10.0,
            altitude_floor_m: 160_000.0,
            altitude_ceiling_m: f64::INFINITY,
            cruise_altitude_m: 400_000.0,
            rcs_scale: 8.0,
            thermal_engine_coeff: 500.0,
            fuel_per_delta_v: 2.0,
            replan_interval_secs: 300.0,
            cross_track_threshold_m: 5_000.0,
            completion_tolerance_m: 100.0,
            predict_tau_secs: 600.0,
            process_noise_accel: 0.01,
            observation_ttl_secs: 3_600.0,
        },
        PayloadKind::Submarine => KindLimits {
            max_speed_mps: 15.0,
            max_accel_mps2: 1.0,
            altitude_floor_m: -600.0,
            altitude_ceiling_m: 0.0,
            cruise_altitude_m: -100.0,
            rcs_scale: 0.01,
            thermal_engine_coeff: 30.0,
            fuel_per_delta_v: 0.5,
            replan_interval_secs: 120.0,
            cross_track_threshold_m: 100.0,
            completion_tolerance_m: 10.0,
            predict_tau_secs: 60.0,
            process_noise_accel: 0.2,
            observation_ttl_secs: 600.0,
        },
        PayloadKind::Interstellar => KindLimits {
            max_speed_mps: 30_000.0,
            max_accel_mps2: 1.0,
            altitude_floor_m: 1.0e9,
            altitude_ceiling_m: f64::INFINITY,
            cruise_altitude_m: 1.0e10,
            rcs_scale: 10.0,
            thermal_engine_coeff: 100.0,
            fuel_per_delta_v: 1.0,
            replan_interval_secs: 86_400.0,
            cross_track_threshold_m: 1.0e6,
            completion_tolerance_m: 100.0,
            predict_tau_secs: 86_400.0,
            process_noise_accel: 1e-6,
            observation_ttl_secs: 604_800.0,
        },
    }
}
