//! Intercept solving: scan candidate flight times against a projected
//! target track, gate on the ΔV budget, and score feasible solutions.

use uuid::Uuid;

use meridian_core::constants::{
    INTERCEPT_CLOSING_SCALE_MPS, INTERCEPT_SCAN_STEP_SECS, INTERCEPT_TOF_SCALE_SECS,
};
use meridian_core::enums::PayloadKind;
use meridian_core::error::{GuidanceError, Result};
use meridian_core::limits::limits_for;
use meridian_core::types::{EntityState, Trajectory, TrajectoryId, Vector3, Waypoint};
use meridian_stealth::evaluate::{evaluate_waypoints, ThreatPicture};

/// Target motion hypothesis: constant-acceleration projection, or a
/// Kalman-predicted sample sequence when the estimator has a track.
#[derive(Debug, Clone)]
pub enum TargetTrack {
    /// Project `position + v·t + ½·a·t²`.
    ConstantAcceleration {
        position: Vector3,
        velocity: Vector3,
        acceleration: Vector3,
    },
    /// Predicted samples at uniform spacing from `start_secs`.
    Predicted {
        start_secs: f64,
        step_secs: f64,
        samples: Vec<(Vector3, Vector3)>,
    },
}

impl TargetTrack {
    /// Target position and velocity `t` seconds from now.
    fn project(&self, t: f64) -> (Vector3, Vector3) {
        match self {
            TargetTrack::ConstantAcceleration {
                position,
                velocity,
                acceleration,
            } => {
                let p = position
                    .add(&velocity.scale(t))
                    .add(&acceleration.scale(0.5 * t * t));
                let v = velocity.add(&acceleration.scale(t));
                (p, v)
            }
            TargetTrack::Predicted {
                step_secs, samples, ..
            } => {
                if samples.is_empty() {
                    return (Vector3::ZERO, Vector3::ZERO);
                }
                let idx = ((t / step_secs).floor() as usize).min(samples.len() - 1);
                samples[idx]
            }
        }
    }
}

/// A scored intercept solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterceptSolution {
    pub intercept_point: Vector3,
    pub flight_time_secs: f64,
    /// Velocity the pursuer must hold after the launch impulse.
    pub launch_velocity: Vector3,
    /// Pursuer velocity at impact (ballistic-free model: the launch velocity).
    pub impact_velocity: Vector3,
    /// Relative speed at impact (m/s).
    pub closing_speed_mps: f64,
    /// Angle between pursuer and target velocity at impact (radians).
    pub impact_angle_rad: f64,
    /// Composite feasibility score in (0, 1].
    pub feasibility: f64,
}

/// Scan candidate flight times at 1 s granularity up to `horizon_secs`,
/// projecting the target forward and computing the launch velocity that
/// arrives at the projected point. Candidates above the ΔV budget are
/// discarded; the rest score as
/// `(1 − ΔV/ΔVmax) · min(1, 50/tof) · min(1, vc/500)`.
///
/// `max_speed_mps`, when given, additionally rejects candidates whose
/// launch speed the airframe cannot hold, so the emitted route honors
/// the kind's kinematic ceiling.
pub fn predicted_intercept(
    pursuer: &EntityState,
    target: &TargetTrack,
    max_delta_v_mps: f64,
    horizon_secs: f64,
    max_speed_mps: Option<f64>,
) -> Result<InterceptSolution> {
    if max_delta_v_mps <= 0.0 || horizon_secs < INTERCEPT_SCAN_STEP_SECS {
        return Err(GuidanceError::NoFeasibleIntercept);
    }

    let mut best: Option<InterceptSolution> = None;
    let steps = (horizon_secs / INTERCEPT_SCAN_STEP_SECS).floor() as usize;

    for step in 1..=steps {
        let tof = step as f64 * INTERCEPT_SCAN_STEP_SECS;
        let (intercept_point, target_vel) = target.project(tof);

        // Velocity needed to cover the displacement in the flight time.
        let launch_velocity = intercept_point.sub(&pursuer.position).scale(1.0 / tof);
        let delta_v = launch_velocity.sub(&pursuer.velocity).norm();
        if delta_v > max_delta_v_mps {
            continue;
        }
        if let Some(ceiling) = max_speed_mps {
            if launch_velocity.norm() > ceiling {
                continue;
            }
        }

        let relative = launch_velocity.sub(&target_vel);
        let closing_speed = relative.norm();

        let dv_term = 1.0 - delta_v / max_delta_v_mps;
        let tof_term = (INTERCEPT_TOF_SCALE_SECS / tof).min(1.0);
        let closing_term = (closing_speed / INTERCEPT_CLOSING_SCALE_MPS).min(1.0);
        let score = dv_term * tof_term * closing_term;
        if score <= 0.0 {
            continue;
        }

        if best.map_or(true, |b| score > b.feasibility) {
            let impact_angle = if launch_velocity.norm() > 1e-6 && target_vel.norm() > 1e-6 {
                let cos = (launch_velocity.dot(&target_vel)
                    / (launch_velocity.norm() * target_vel.norm()))
                .clamp(-1.0, 1.0);
                cos.acos()
            } else {
                0.0
            };
            best = Some(InterceptSolution {
                intercept_point,
                flight_time_secs: tof,
                launch_velocity,
                impact_velocity: launch_velocity,
                closing_speed_mps: closing_speed,
                impact_angle_rad: impact_angle,
                feasibility: score,
            });
        }
    }

    best.ok_or(GuidanceError::NoFeasibleIntercept)
}

/// Legs an intercept route is sampled into when rendered as waypoints.
const INTERCEPT_LEG_COUNT: usize = 6;

/// Render an intercept solution as a dispatchable trajectory: a straight
/// run at the launch velocity from the pursuer to the intercept point,
/// scored against the threat picture like any planner route. The
/// solution's feasibility becomes the trajectory confidence.
pub fn solution_trajectory(
    solution: &InterceptSolution,
    pursuer: &EntityState,
    kind: PayloadKind,
    threats: &ThreatPicture,
    now_secs: f64,
    previous: Option<TrajectoryId>,
) -> Trajectory {
    let run = solution.intercept_point.sub(&pursuer.position);
    let mut waypoints = Vec::with_capacity(INTERCEPT_LEG_COUNT + 1);
    for leg in 0..=INTERCEPT_LEG_COUNT {
        let f = leg as f64 / INTERCEPT_LEG_COUNT as f64;
        waypoints.push(Waypoint::new(
            pursuer.position.add(&run.scale(f)),
            solution.launch_velocity,
            f * solution.flight_time_secs,
        ));
    }

    let limits = limits_for(kind);
    let report = evaluate_waypoints(
        &waypoints,
        limits.rcs_scale,
        limits.thermal_engine_coeff,
        limits.max_speed_mps,
        threats,
        None,
    );
    let delta_v = solution.launch_velocity.sub(&pursuer.velocity).norm();

    let nonce = Uuid::new_v4().simple().to_string();
    Trajectory {
        id: TrajectoryId::derive(&nonce[..8], &waypoints),
        payload_kind: kind,
        waypoints,
        total_distance_m: run.norm(),
        estimated_time_secs: solution.flight_time_secs,
        required_fuel_kg: delta_v * limits.fuel_per_delta_v,
        threat_exposure: report.threat_exposure,
        stealth_score: report.overall,
        confidence: solution.feasibility,
        created_at_secs: now_secs,
        previous,
    }
}
