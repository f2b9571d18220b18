//! Gravitational acceleration at selectable fidelity.
//!
//! Point-mass inverse square, J2 oblateness, or J2+J3+J4 zonal harmonics
//! about a central body from the constants table. Positions are
//! body-centered Cartesian with z along the spin axis.

use meridian_core::types::Vector3;

use crate::bodies::BodyParams;

/// Gravity model fidelity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GravityModel {
    /// Inverse-square about the body center.
    #[default]
    PointMass,
    /// Point mass plus J2 oblateness.
    J2,
    /// Point mass plus J2, J3, and J4 zonal harmonics.
    Zonal,
}

/// Gravitational acceleration at a body-centered position.
pub fn acceleration(model: GravityModel, body: &BodyParams, position: &Vector3) -> Vector3 {
    let r = position.norm();
    if r < 1.0 {
        return Vector3::ZERO;
    }

    let point = position.scale(-body.mu / (r * r * r));

    match model {
        GravityModel::PointMass => point,
        GravityModel::J2 => point.add(&j2_term(body, position, r)),
        GravityModel::Zonal => point
            .add(&j2_term(body, position, r))
            .add(&j3_term(body, position, r))
            .add(&j4_term(body, position, r)),
    }
}

/// J2 oblateness perturbation.
fn j2_term(body: &BodyParams, p: &Vector3, r: f64) -> Vector3 {
    let re_r = body.radius_m / r;
    let factor = -1.5 * body.j2 * (body.mu / (r * r)) * re_r * re_r;
    let z2_r2 = (p.z * p.z) / (r * r);

    Vector3::new(
        factor * (p.x / r) * (1.0 - 5.0 * z2_r2),
        factor * (p.y / r) * (1.0 - 5.0 * z2_r2),
        factor * (p.z / r) * (3.0 - 5.0 * z2_r2),
    )
}

/// J3 zonal perturbation.
fn j3_term(body: &BodyParams, p: &Vector3, r: f64) -> Vector3 {
    let re_r = body.radius_m / r;
    let factor = -2.5 * body.j3 * (body.mu / (r * r)) * re_r * re_r * re_r;
    let z_r = p.z / r;
    let z2_r2 = z_r * z_r;

    Vector3::new(
        factor * (p.x / r) * z_r * (3.0 - 7.0 * z2_r2),
        factor * (p.y / r) * z_r * (3.0 - 7.0 * z2_r2),
        factor * (6.0 * z2_r2 - 7.0 * z2_r2 * z2_r2 - 0.6),
    )
}

/// J4 zonal perturbation.
fn j4_term(body: &BodyParams, p: &Vector3, r: f64) -> Vector3 {
    let re_r = body.radius_m / r;
    let re_r4 = re_r * re_r * re_r * re_r;
    let factor = (15.0 / 8.0) * body.j4 * (body.mu / (r * r)) * re_r4;
    let z2_r2 = (p.z * p.z) / (r * r);
    let z4_r4 = z2_r2 * z2_r2;

    Vector3::new(
        factor * (p.x / r) * (1.0 - 14.0 * z2_r2 + 21.0 * z4_r4),
        factor * (p.y / r) * (1.0 - 14.0 * z2_r2 + 21.0 * z4_r4),
        factor * (p.z / r) * (5.0 - (70.0 / 3.0) * z2_r2 + 21.0 * z4_r4),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::{body_params, CentralBody};

    #[test]
    fn test_surface_gravity_point_mass() {
        let earth = body_params(CentralBody::Earth);
        let pos = Vector3::new(earth.radius_m, 0.0, 0.0);
        let a = acceleration(GravityModel::PointMass, &earth, &pos);

        let expected = earth.mu / (earth.radius_m * earth.radius_m);
        let got = a.norm();
        assert!(
            ((got - expected) / expected).abs() < 0.001,
            "surface gravity should be GM/R² within 0.1%: expected {expected:.4}, got {got:.4}"
        );
        // Directed toward the center
        assert!(a.x < 0.0);
    }

    #[test]
    fn test_j2_flattens_equatorial_field() {
        let earth = body_params(CentralBody::Earth);
        let equator = Vector3::new(earth.radius_m + 500_000.0, 0.0, 0.0);

        let point = acceleration(GravityModel::PointMass, &earth, &equator).norm();
        let j2 = acceleration(GravityModel::J2, &earth, &equator).norm();
        // J2 strengthens effective equatorial attraction.
        assert!(j2 > point, "J2 should add to equatorial gravity: {j2} vs {point}");

        let rel = (j2 - point) / point;
        assert!(rel < 0.01, "J2 is a small perturbation, got {rel}");
    }

    #[test]
    fn test_zonal_close_to_j2_at_altitude() {
        let earth = body_params(CentralBody::Earth);
        let pos = Vector3::new(5_000_000.0, 3_000_000.0, 4_000_000.0);
        let j2 = acceleration(GravityModel::J2, &earth, &pos);
        let zonal = acceleration(GravityModel::Zonal, &earth, &pos);
        let diff = j2.sub(&zonal).norm();
        assert!(
            diff / j2.norm() < 1e-3,
            "J3/J4 corrections should be far smaller than J2"
        );
    }
}
