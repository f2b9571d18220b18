//! Aerodynamic drag with a Mach-dependent drag coefficient.

use meridian_core::types::Vector3;

use crate::atmosphere::{self, speed_of_sound};

/// Aerodynamic configuration of a vehicle.
#[derive(Debug, Clone, Copy)]
pub struct DragConfig {
    /// Subsonic reference drag coefficient.
    pub cd_base: f64,
    /// Reference cross-section area (m²).
    pub area_m2: f64,
}

/// Mach-regime multiplier on the base drag coefficient: flat subsonic,
/// transonic rise between Mach 0.8 and 1.2, taper to Mach 5, then a slow
/// logarithmic hypersonic regime.
pub fn mach_factor(mach: f64) -> f64 {
    if mach < 0.8 {
        1.0
    } else if mach < 1.2 {
        1.0 + 0.8 * (mach - 0.8) / 0.4
    } else if mach < 5.0 {
        1.8 - 0.6 * (mach - 1.2) / 3.8
    } else {
        1.2 + 0.1 * (mach / 5.0).ln()
    }
}

/// Drag coefficient at a Mach number.
pub fn drag_coefficient(config: &DragConfig, mach: f64) -> f64 {
    config.cd_base * mach_factor(mach)
}

/// Drag acceleration vector: `a = −0.5·ρ·v²·Cd·A/m · v̂`.
///
/// `velocity` is relative to the airmass; density and temperature come
/// from the selected atmosphere at `altitude_m`.
pub fn acceleration(
    config: &DragConfig,
    velocity: &Vector3,
    altitude_m: f64,
    mass_kg: f64,
) -> Vector3 {
    let speed = velocity.norm();
    if speed < 1e-6 || mass_kg < 1e-9 {
        return Vector3::ZERO;
    }

    let rho = atmosphere::density_us76(altitude_m);
    let temp = atmosphere::temperature_us76(altitude_m);
    let mach = speed / speed_of_sound(temp);
    let cd = drag_coefficient(config, mach);

    let accel_mag = 0.5 * rho * speed * speed * cd * config.area_m2 / mass_kg;
    velocity.normalized().scale(-accel_mag)
}
