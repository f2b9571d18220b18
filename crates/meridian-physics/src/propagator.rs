//! Classical fixed-step RK4 propagation over a composed force model.

use meridian_core::types::{EntityState, Vector3};

use crate::bodies::{body_params, BodyParams, CentralBody};
use crate::drag::{self, DragConfig};
use crate::gravity::{self, GravityModel};
use crate::srp::{self, SrpConfig};
use crate::third_body::{self, Perturber};

/// Default step for orbital propagation (seconds).
pub const ORBITAL_STEP_SECS: f64 = 10.0;

/// Default step for atmospheric propagation (seconds).
pub const ATMOSPHERIC_STEP_SECS: f64 = 0.1;

/// Force model and integration configuration.
#[derive(Debug, Clone)]
pub struct PropagationConfig {
    pub body: CentralBody,
    pub gravity: GravityModel,
    /// Drag is applied when present (atmospheric and LEO regimes).
    pub drag: Option<DragConfig>,
    /// SRP is applied when both a config and a Sun position are present.
    pub srp: Option<SrpConfig>,
    /// Sun position for SRP shadow and scaling (body-centered, m).
    pub sun_position: Option<Vector3>,
    /// Third-body perturbers with ephemeris positions.
    pub perturbers: Vec<Perturber>,
    /// Fixed RK4 step (seconds).
    pub step_secs: f64,
}

impl PropagationConfig {
    /// Point-mass orbital setup about a body at the default orbital step.
    pub fn orbital(body: CentralBody) -> Self {
        PropagationConfig {
            body,
            gravity: GravityModel::PointMass,
            drag: None,
            srp: None,
            sun_position: None,
            perturbers: Vec::new(),
            step_secs: ORBITAL_STEP_SECS,
        }
    }

    /// Atmospheric setup with drag at the default fine step.
    pub fn atmospheric(body: CentralBody, drag: DragConfig) -> Self {
        PropagationConfig {
            body,
            gravity: GravityModel::PointMass,
            drag: Some(drag),
            srp: None,
            sun_position: None,
            perturbers: Vec::new(),
            step_secs: ATMOSPHERIC_STEP_SECS,
        }
    }
}

/// One propagated sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagatedState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub time_secs: f64,
}

/// Total acceleration from the composed force model. Positions are
/// body-centered Cartesian.
pub fn total_acceleration(
    config: &PropagationConfig,
    body: &BodyParams,
    position: &Vector3,
    velocity: &Vector3,
    mass_kg: f64,
) -> Vector3 {
    let mut a = gravity::acceleration(config.gravity, body, position);

    if let Some(drag_cfg) = &config.drag {
        let altitude = position.norm() - body.radius_m;
        a = a.add(&drag::acceleration(drag_cfg, velocity, altitude, mass_kg));
    }

    if let (Some(srp_cfg), Some(sun)) = (&config.srp, &config.sun_position) {
        a = a.add(&srp::acceleration(
            srp_cfg,
            position,
            sun,
            body.radius_m,
            mass_kg,
        ));
    }

    if !config.perturbers.is_empty() {
        a = a.add(&third_body::total_acceleration(&config.perturbers, position));
    }

    a
}

/// Propagate an initial state for `duration_secs`, returning samples at
/// every step (the initial state included). Deterministic: identical
/// inputs produce identical outputs.
pub fn propagate(
    initial: &EntityState,
    duration_secs: f64,
    config: &PropagationConfig,
) -> Vec<PropagatedState> {
    let body = body_params(config.body);
    let dt = config.step_secs.max(1e-3);
    let steps = (duration_secs / dt).ceil() as usize;

    let mut out = Vec::with_capacity(steps + 1);
    let mut pos = initial.position;
    let mut vel = initial.velocity;
    let mut t = initial.time_secs;

    out.push(PropagatedState {
        position: pos,
        velocity: vel,
        time_secs: t,
    });

    for _ in 0..steps {
        let (next_pos, next_vel) = rk4_step(config, &body, &pos, &vel, initial.mass_kg, dt);
        pos = next_pos;
        vel = next_vel;
        t += dt;
        out.push(PropagatedState {
            position: pos,
            velocity: vel,
            time_secs: t,
        });
    }

    out
}

/// One classical RK4 step of the coupled position/velocity system.
fn rk4_step(
    config: &PropagationConfig,
    body: &BodyParams,
    pos: &Vector3,
    vel: &Vector3,
    mass_kg: f64,
    dt: f64,
) -> (Vector3, Vector3) {
    let a1 = total_acceleration(config, body, pos, vel, mass_kg);
    let k1v = a1;
    let k1p = *vel;

    let p2 = pos.add(&k1p.scale(dt / 2.0));
    let v2 = vel.add(&k1v.scale(dt / 2.0));
    let a2 = total_acceleration(config, body, &p2, &v2, mass_kg);
    let k2v = a2;
    let k2p = v2;

    let p3 = pos.add(&k2p.scale(dt / 2.0));
    let v3 = vel.add(&k2v.scale(dt / 2.0));
    let a3 = total_acceleration(config, body, &p3, &v3, mass_kg);
    let k3v = a3;
    let k3p = v3;

    let p4 = pos.add(&k3p.scale(dt));
    let v4 = vel.add(&k3v.scale(dt));
    let a4 = total_acceleration(config, body, &p4, &v4, mass_kg);
    let k4v = a4;
    let k4p = v4;

    let next_pos = pos.add(
        &k1p.add(&k2p.scale(2.0))
            .add(&k3p.scale(2.0))
            .add(&k4p)
            .scale(dt / 6.0),
    );
    let next_vel = vel.add(
        &k1v.add(&k2v.scale(2.0))
            .add(&k3v.scale(2.0))
            .add(&k4v)
            .scale(dt / 6.0),
    );

    (next_pos, next_vel)
}
