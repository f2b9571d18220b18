//! Re-entry sub-kernel: aerothermal heating, wall temperature, and
//! ablative mass loss during descent through the drag regime.

use meridian_core::types::Vector3;

use crate::atmosphere;
use crate::bodies::{body_params, CentralBody};
use crate::drag::{self, DragConfig};

/// Sutton–Graves constant for air (SI, W·kg^-0.5·m^0.5 form).
const SUTTON_GRAVES_K: f64 = 1.7415e-4;

/// Stefan–Boltzmann constant (W/(m²·K⁴)).
const STEFAN_BOLTZMANN: f64 = 5.670_374e-8;

/// Heating becomes significant below this altitude (m).
const DRAG_REGIME_ALTITUDE_M: f64 = 120_000.0;

/// Vehicle thermal-protection configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReentryConfig {
    /// Effective nose radius for stagnation heating (m).
    pub nose_radius_m: f64,
    /// Heat-shield ablator mass (kg).
    pub shield_mass_kg: f64,
    /// Effective heat of ablation (J/kg).
    pub ablation_heat_j_per_kg: f64,
    /// Surface emissivity for radiative equilibrium.
    pub emissivity: f64,
    /// Structural thermal ceiling (K); crossing it terminates the run.
    pub thermal_ceiling_k: f64,
    /// Heated reference area (m²).
    pub heated_area_m2: f64,
    pub drag: DragConfig,
    /// Integration step (seconds).
    pub step_secs: f64,
}

/// One re-entry sample.
#[derive(Debug, Clone, Copy)]
pub struct ReentryState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub mass_kg: f64,
    pub shield_mass_kg: f64,
    /// Stagnation-point heat rate (W/m²).
    pub heat_rate_w_m2: f64,
    /// Radiative-equilibrium wall temperature (K).
    pub wall_temp_k: f64,
    pub time_secs: f64,
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReentryOutcome {
    /// Reached the surface with shield margin.
    Landed,
    /// Ablator fully consumed.
    ShieldExhausted,
    /// Wall temperature crossed the structural ceiling.
    ThermalCeiling,
    /// Duration elapsed while still airborne.
    TimedOut,
}

/// Sutton–Graves stagnation heat rate: `q = k·sqrt(ρ/r_n)·v³`.
pub fn heat_rate(density: f64, nose_radius_m: f64, speed_mps: f64) -> f64 {
    SUTTON_GRAVES_K * (density / nose_radius_m).sqrt() * speed_mps.powi(3)
}

/// Radiative-equilibrium wall temperature for a heat rate.
pub fn equilibrium_wall_temp(heat_rate_w_m2: f64, emissivity: f64) -> f64 {
    if heat_rate_w_m2 <= 0.0 {
        return 0.0;
    }
    (heat_rate_w_m2 / (emissivity * STEFAN_BOLTZMANN)).powf(0.25)
}

/// Simulate a re-entry from an initial body-centered state, tracking
/// heating and ablation. Terminates on landing, shield exhaustion,
/// thermal-ceiling crossing, or `max_duration_secs`.
pub fn simulate(
    position: Vector3,
    velocity: Vector3,
    vehicle_mass_kg: f64,
    config: &ReentryConfig,
    body: CentralBody,
    max_duration_secs: f64,
) -> (Vec<ReentryState>, ReentryOutcome) {
    let params = body_params(body);
    let dt = config.step_secs.max(1e-3);
    let steps = (max_duration_secs / dt).ceil() as usize;

    let mut pos = position;
    let mut vel = velocity;
    let mut shield = config.shield_mass_kg;
    let mut t = 0.0;
    let mut samples = Vec::new();

    for _ in 0..steps {
        let altitude = pos.norm() - params.radius_m;
        if altitude <= 0.0 {
            return (samples, ReentryOutcome::Landed);
        }

        let mass = vehicle_mass_kg + shield;
        let speed = vel.norm();

        // Heating only inside the drag regime.
        let (q, wall_t) = if altitude < DRAG_REGIME_ALTITUDE_M {
            let rho = atmosphere::density_us76(altitude);
            let q = heat_rate(rho, config.nose_radius_m, speed);
            (q, equilibrium_wall_temp(q, config.emissivity))
        } else {
            (0.0, 0.0)
        };

        // Ablation consumes shield mass to reject heat.
        if q > 0.0 {
            let burned = q * config.heated_area_m2 * dt / config.ablation_heat_j_per_kg;
            shield -= burned;
        }

        samples.push(ReentryState {
            position: pos,
            velocity: vel,
            mass_kg: mass,
            shield_mass_kg: shield.max(0.0),
            heat_rate_w_m2: q,
            wall_temp_k: wall_t,
            time_secs: t,
        });

        if shield <= 0.0 {
            return (samples, ReentryOutcome::ShieldExhausted);
        }
        if wall_t > config.thermal_ceiling_k {
            return (samples, ReentryOutcome::ThermalCeiling);
        }

        // Semi-implicit step: gravity + drag.
        let gravity = pos.scale(-params.mu / pos.norm().powi(3));
        let drag_a = drag::acceleration(&config.drag, &vel, altitude, mass);
        vel = vel.add(&gravity.add(&drag_a).scale(dt));
        pos = pos.add(&vel.scale(dt));
        t += dt;
    }

    (samples, ReentryOutcome::TimedOut)
}
