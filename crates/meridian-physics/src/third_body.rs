//! Third-body differential gravity from the Sun and Moon.
//!
//! Perturber positions are tabulated ephemeris inputs supplied by the
//! caller; the kernel does not compute ephemerides itself.

use meridian_core::types::Vector3;

/// A perturbing body with a body-centered ephemeris position.
#[derive(Debug, Clone, Copy)]
pub struct Perturber {
    /// Gravitational parameter GM (m³/s²).
    pub mu: f64,
    /// Position relative to the central body (m).
    pub position: Vector3,
}

/// Differential acceleration from one perturber:
/// `GM·((r_b − r)/|r_b − r|³ − r_b/|r_b|³)`.
pub fn acceleration(perturber: &Perturber, position: &Vector3) -> Vector3 {
    let to_body = perturber.position.sub(position);
    let d = to_body.norm();
    let rb = perturber.position.norm();
    if d < 1.0 || rb < 1.0 {
        return Vector3::ZERO;
    }

    let direct = to_body.scale(perturber.mu / (d * d * d));
    let indirect = perturber.position.scale(perturber.mu / (rb * rb * rb));
    direct.sub(&indirect)
}

/// Sum of differential accelerations over all perturbers.
pub fn total_acceleration(perturbers: &[Perturber], position: &Vector3) -> Vector3 {
    let mut sum = Vector3::ZERO;
    for p in perturbers {
        sum = sum.add(&acceleration(p, position));
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::{AU_M, MU_MOON, MU_SUN};

    #[test]
    fn test_third_body_vanishes_at_center() {
        let sun = Perturber {
            mu: MU_SUN,
            position: Vector3::new(AU_M, 0.0, 0.0),
        };
        // At the central body's center the direct and indirect terms cancel.
        let a = acceleration(&sun, &Vector3::ZERO);
        assert!(a.norm() < 1e-12, "differential term should vanish at origin");
    }

    #[test]
    fn test_lunar_perturbation_magnitude_at_geo() {
        let moon = Perturber {
            mu: MU_MOON,
            position: Vector3::new(384_400_000.0, 0.0, 0.0),
        };
        let geo = Vector3::new(42_164_000.0, 0.0, 0.0);
        let a = acceleration(&moon, &geo).norm();
        // Known order: a few 1e-6 m/s² at GEO.
        assert!(
            a > 1e-7 && a < 1e-5,
            "lunar perturbation at GEO should be ~1e-6 m/s², got {a:e}"
        );
    }
}
