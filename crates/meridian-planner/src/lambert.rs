//! Lambert's orbital boundary-value problem in universal variables.
//!
//! Given two position vectors and a time of flight about a central body,
//! finds the connecting conic via Stumpff functions C(z), S(z) and a
//! Newton iteration on the universal variable z, with a bisection
//! fallback when the derivative degenerates near-π transfers.

use meridian_core::constants::{LAMBERT_MAX_ITERATIONS, LAMBERT_TOF_TOLERANCE_SECS};
use meridian_core::error::{GuidanceError, Result};
use meridian_core::types::Vector3;

/// Solution of Lambert's problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertSolution {
    /// Velocity at departure (m/s).
    pub v_depart: Vector3,
    /// Velocity at arrival (m/s).
    pub v_arrive: Vector3,
    /// Newton/bisection iterations used.
    pub iterations: usize,
}

/// Per-endpoint and total ΔV for executing a transfer between two
/// existing velocity states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferDeltaV {
    pub depart_mps: f64,
    pub arrive_mps: f64,
    pub total_mps: f64,
}

impl LambertSolution {
    /// ΔV against the current departure velocity and desired arrival
    /// velocity.
    pub fn delta_v(&self, v_current: &Vector3, v_target: &Vector3) -> TransferDeltaV {
        let depart = self.v_depart.sub(v_current).norm();
        let arrive = v_target.sub(&self.v_arrive).norm();
        TransferDeltaV {
            depart_mps: depart,
            arrive_mps: arrive,
            total_mps: depart + arrive,
        }
    }
}

/// Stumpff C(z).
fn stumpff_c(z: f64) -> f64 {
    if z > 1e-6 {
        (1.0 - z.sqrt().cos()) / z
    } else if z < -1e-6 {
        ((-z).sqrt().cosh() - 1.0) / (-z)
    } else {
        0.5 - z / 24.0 + z * z / 720.0
    }
}

/// Stumpff S(z).
fn stumpff_s(z: f64) -> f64 {
    if z > 1e-6 {
        let sz = z.sqrt();
        (sz - sz.sin()) / (sz * sz * sz)
    } else if z < -1e-6 {
        let sz = (-z).sqrt();
        (sz.sinh() - sz) / (sz * sz * sz)
    } else {
        1.0 / 6.0 - z / 120.0 + z * z / 5040.0
    }
}

/// Solve Lambert's problem from `r1` to `r2` (body-centered meters) in
/// `tof_secs` about a body with gravitational parameter `mu`.
///
/// `short_way` selects the transfer angle below π; the long way goes
/// around the other side. Converges when the time-of-flight residual
/// drops under 1 µs-scale tolerance or the iteration cap is hit.
pub fn solve_lambert(
    r1: &Vector3,
    r2: &Vector3,
    tof_secs: f64,
    mu: f64,
    short_way: bool,
) -> Result<LambertSolution> {
    if tof_secs <= 0.0 {
        return Err(GuidanceError::NoFeasibleIntercept);
    }
    let r1n = r1.norm();
    let r2n = r2.norm();
    if r1n < 1.0 || r2n < 1.0 {
        return Err(GuidanceError::NoFeasibleIntercept);
    }

    let cos_dtheta = (r1.dot(r2) / (r1n * r2n)).clamp(-1.0, 1.0);
    let mut dtheta = cos_dtheta.acos();
    if !short_way {
        dtheta = std::f64::consts::TAU - dtheta;
    }

    let sin_dtheta = dtheta.sin();
    let a_coeff = sin_dtheta * (r1n * r2n / (1.0 - cos_dtheta)).sqrt();
    if a_coeff.abs() < 1e-9 {
        // Transfer angle of exactly 0 or π: the plane is undefined.
        return Err(GuidanceError::NoFeasibleIntercept);
    }

    let y = |z: f64| {
        let c = stumpff_c(z);
        r1n + r2n + a_coeff * (z * stumpff_s(z) - 1.0) / c.sqrt()
    };

    // Time-of-flight residual as a function of z.
    let tof_residual = |z: f64| -> f64 {
        let c = stumpff_c(z);
        let s = stumpff_s(z);
        let yz = y(z);
        if yz < 0.0 {
            return f64::NAN;
        }
        (yz / c).powf(1.5) * s + a_coeff * yz.sqrt() - mu.sqrt() * tof_secs
    };

    // Bracket the root in z, then Newton with bisection fallback. The
    // upper bound stays strictly inside the single-revolution region
    // (z < (2π)², where C(z) hits zero).
    let mut z_lo = -8.0 * std::f64::consts::TAU;
    let mut z_hi = std::f64::consts::TAU * std::f64::consts::TAU - 1e-4;
    // Walk z_lo up until y(z) is positive and the residual is finite.
    let mut f_lo = tof_residual(z_lo);
    let mut guard = 0;
    while (f_lo.is_nan() || f_lo > 0.0) && guard < 60 {
        z_lo += 2.0;
        f_lo = tof_residual(z_lo);
        guard += 1;
    }
    let f_hi = tof_residual(z_hi);
    if f_lo.is_nan() || f_hi.is_nan() || f_lo > 0.0 || f_hi < 0.0 {
        return Err(GuidanceError::NoFeasibleIntercept);
    }

    let mut z = 0.0_f64.clamp(z_lo, z_hi);
    let mut iterations = 0;
    loop {
        iterations += 1;
        let f = tof_residual(z);
        if f.is_nan() {
            z = (z_lo + z_hi) / 2.0;
            if iterations >= LAMBERT_MAX_ITERATIONS {
                break;
            }
            continue;
        }

        // Residual is in sqrt(mu)-scaled units; convert to seconds.
        if (f / mu.sqrt()).abs() < LAMBERT_TOF_TOLERANCE_SECS || iterations >= LAMBERT_MAX_ITERATIONS
        {
            break;
        }

        if f > 0.0 {
            z_hi = z;
        } else {
            z_lo = z;
        }

        // Numerical derivative for the Newton step.
        let h = 1e-5 * (1.0 + z.abs());
        let df = (tof_residual(z + h) - f) / h;
        let newton = if df.abs() > 1e-12 { z - f / df } else { f64::NAN };

        z = if newton.is_finite() && newton > z_lo && newton < z_hi {
            newton
        } else {
            (z_lo + z_hi) / 2.0
        };
    }

    let yz = y(z);
    if yz < 0.0 {
        return Err(GuidanceError::NoFeasibleIntercept);
    }

    // Lagrange coefficients.
    let f_coef = 1.0 - yz / r1n;
    let g_coef = a_coeff * (yz / mu).sqrt();
    let gdot = 1.0 - yz / r2n;
    if g_coef.abs() < 1e-12 {
        return Err(GuidanceError::NoFeasibleIntercept);
    }

    let v_depart = r2.sub(&r1.scale(f_coef)).scale(1.0 / g_coef);
    let v_arrive = r2.scale(gdot).sub(r1).scale(1.0 / g_coef);

    Ok(LambertSolution {
        v_depart,
        v_arrive,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::types::EntityState;
    use meridian_physics::bodies::{body_params, CentralBody};
    use meridian_physics::propagator::{propagate, PropagationConfig};

    const MU: f64 = 3.986_004_418e14;

    #[test]
    fn test_lambert_solution_flies_to_target() {
        // LEO departure, quarter-turn transfer: propagate the departure
        // velocity and confirm arrival at r2.
        let r1 = Vector3::new(6_778_137.0, 0.0, 0.0);
        let r2 = Vector3::new(0.0, 8_000_000.0, 0.0);
        let tof = 2_000.0;

        let sol = solve_lambert(&r1, &r2, tof, MU, true).expect("solvable geometry");

        let initial = EntityState::at(r1, 0.0).with_velocity(sol.v_depart);
        let mut config = PropagationConfig::orbital(CentralBody::Earth);
        config.step_secs = 1.0;
        let states = propagate(&initial, tof, &config);
        let arrival = states.last().unwrap();

        let miss = arrival.position.distance_to(&r2);
        assert!(
            miss < 20_000.0,
            "Lambert arc should arrive within 20 km of r2, missed by {miss:.0} m"
        );
    }

    #[test]
    fn test_lambert_is_repeatable() {
        let r1 = Vector3::new(6_778_137.0, 0.0, 0.0);
        let r2 = Vector3::new(0.0, 9_000_000.0, 1_000_000.0);
        let a = solve_lambert(&r1, &r2, 2_500.0, MU, true).unwrap();
        let b = solve_lambert(&r1, &r2, 2_500.0, MU, true).unwrap();
        assert!(
            a.v_depart.sub(&b.v_depart).norm() < 1e-6,
            "identical inputs should repeat ΔV within 1e-6 m/s"
        );
        assert!(a.v_arrive.sub(&b.v_arrive).norm() < 1e-6);
    }

    #[test]
    fn test_hohmann_like_transfer_delta_v() {
        // LEO 400 km to GEO, near-half-revolution transfer. Total ΔV should
        // land within 10 m/s of the analytic Hohmann value.
        let earth = body_params(CentralBody::Earth);
        let r_leo = earth.radius_m + 400_000.0;
        let r_geo = 42_164_000.0;

        // Analytic Hohmann.
        let v_leo = (MU / r_leo).sqrt();
        let v_geo = (MU / r_geo).sqrt();
        let a_transfer = (r_leo + r_geo) / 2.0;
        let v_peri = (MU * (2.0 / r_leo - 1.0 / a_transfer)).sqrt();
        let v_apo = (MU * (2.0 / r_geo - 1.0 / a_transfer)).sqrt();
        let hohmann_dv = (v_peri - v_leo) + (v_geo - v_apo);

        // 179.5° transfer with the matching fraction of the half-period.
        let angle = 179.5_f64.to_radians();
        let r1 = Vector3::new(r_leo, 0.0, 0.0);
        let r2 = Vector3::new(r_geo * angle.cos(), r_geo * angle.sin(), 0.0);
        let half_period = std::f64::consts::PI * (a_transfer.powi(3) / MU).sqrt();
        let tof = half_period * (179.5 / 180.0);

        let sol = solve_lambert(&r1, &r2, tof, MU, true).expect("near-Hohmann geometry");

        let v_current = Vector3::new(0.0, v_leo, 0.0);
        let v_target = Vector3::new(-v_geo * angle.sin(), v_geo * angle.cos(), 0.0);
        let dv = sol.delta_v(&v_current, &v_target);

        assert!(
            (dv.total_mps - hohmann_dv).abs() < 10.0,
            "near-Hohmann total ΔV {:.1} should be within 10 m/s of analytic {:.1}",
            dv.total_mps,
            hohmann_dv
        );
    }

    #[test]
    fn test_degenerate_inputs_rejected() {
        let r1 = Vector3::new(7_000_000.0, 0.0, 0.0);
        assert!(solve_lambert(&r1, &r1.scale(1.5), -10.0, MU, true).is_err());
        // Collinear positions: transfer plane undefined.
        assert!(solve_lambert(&r1, &r1.scale(2.0), 1_000.0, MU, true).is_err());
    }
}
