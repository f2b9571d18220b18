//! Solar radiation pressure with a cylindrical umbra shadow test.

use meridian_core::types::Vector3;

use crate::bodies::{AU_M, SOLAR_FLUX_1AU, SPEED_OF_LIGHT};

/// Radiation-pressure configuration for a spacecraft.
#[derive(Debug, Clone, Copy)]
pub struct SrpConfig {
    /// Illuminated area (m²).
    pub area_m2: f64,
    /// Surface reflectivity, 0 (absorbing) to 1 (mirror).
    pub reflectivity: f64,
}

/// SRP acceleration: `(S/c)·A·(1+ρ)/m`, scaled by inverse distance-squared
/// from the Sun and directed anti-sunward. Returns zero inside the
/// central body's cylindrical umbra.
pub fn acceleration(
    config: &SrpConfig,
    position: &Vector3,
    sun_position: &Vector3,
    body_radius_m: f64,
    mass_kg: f64,
) -> Vector3 {
    if mass_kg < 1e-9 {
        return Vector3::ZERO;
    }
    if in_umbra(position, sun_position, body_radius_m) {
        return Vector3::ZERO;
    }

    let from_sun = position.sub(sun_position);
    let dist = from_sun.norm();
    if dist < 1.0 {
        return Vector3::ZERO;
    }

    let flux = SOLAR_FLUX_1AU * (AU_M / dist) * (AU_M / dist);
    let accel = (flux / SPEED_OF_LIGHT) * config.area_m2 * (1.0 + config.reflectivity) / mass_kg;
    from_sun.normalized().scale(accel)
}

/// Cylindrical umbra test: the position is shadowed when it lies on the
/// anti-sun side of the body and within one body radius of the shadow axis.
pub fn in_umbra(position: &Vector3, sun_position: &Vector3, body_radius_m: f64) -> bool {
    let sun_dir = sun_position.normalized();
    // Component of position along the sunward axis (body-centered).
    let along = position.dot(&sun_dir);
    if along > 0.0 {
        return false; // Sun side
    }
    let axial = sun_dir.scale(along);
    let radial = position.sub(&axial).norm();
    radial < body_radius_m
}
