//! Radar cross-section model.
//!
//! A base aspect-dependent profile scaled by altitude attenuation and a
//! Doppler term. Aspect is taken against each illuminating site, so the
//! same waypoint presents a different RCS to each radar.

use meridian_core::constants::SPEED_OF_SOUND_SEA_LEVEL;
use meridian_core::types::Vector3;

/// Base aspect profile (m²).
pub const RCS_FRONTAL: f64 = 0.5;
pub const RCS_SIDE: f64 = 2.0;
pub const RCS_REAR: f64 = 1.0;
pub const RCS_TOP: f64 = 5.0;
pub const RCS_BOTTOM: f64 = 3.0;

/// Altitude attenuation scale height (m): thinner air, cleaner returns
/// closer to the ground.
const RCS_ALTITUDE_SCALE_M: f64 = 8_000.0;

/// RCS for an azimuthal aspect angle: 0 = nose-on, π/2 = beam, π = tail.
/// Linear interpolation across the base profile.
pub fn azimuth_profile(aspect_rad: f64) -> f64 {
    let a = aspect_rad.abs().min(std::f64::consts::PI);
    let half_pi = std::f64::consts::FRAC_PI_2;
    if a <= half_pi {
        RCS_FRONTAL + (RCS_SIDE - RCS_FRONTAL) * (a / half_pi)
    } else {
        RCS_SIDE + (RCS_REAR - RCS_SIDE) * ((a - half_pi) / half_pi)
    }
}

/// Effective RCS presented to a radar site.
///
/// The azimuthal profile blends toward the top/bottom plate as the
/// line-of-sight elevates; the result scales by `exp(−h/8000)` altitude
/// attenuation, a `1 + v/a₀` Doppler enhancement, and the vehicle's
/// kind-specific scale factor.
pub fn rcs_toward_site(
    position: &Vector3,
    velocity: &Vector3,
    site_position: &Vector3,
    rcs_scale: f64,
) -> f64 {
    let to_site = site_position.sub(position);
    let range = to_site.norm();
    if range < 1.0 {
        return RCS_TOP * rcs_scale;
    }
    let los = to_site.scale(1.0 / range);

    // Azimuthal aspect: angle between heading and line-of-sight in the
    // horizontal plane.
    let speed = velocity.norm();
    let aspect = if speed > 1e-6 {
        let heading = velocity.normalized();
        let dot = heading.dot(&los).clamp(-1.0, 1.0);
        dot.acos()
    } else {
        std::f64::consts::FRAC_PI_2 // stationary: beam aspect
    };
    let planform = azimuth_profile(aspect);

    // Elevation blend: a site looking up sees the belly, looking down the top.
    let sin_elev = (los.z).clamp(-1.0, 1.0);
    let vertical = if sin_elev > 0.0 { RCS_TOP } else { RCS_BOTTOM };
    let blend = sin_elev.abs();
    let base = planform * (1.0 - blend) + vertical * blend;

    let altitude_term = (-position.z.max(0.0) / RCS_ALTITUDE_SCALE_M).exp();
    let doppler_term = 1.0 + speed / SPEED_OF_SOUND_SEA_LEVEL;

    base * rcs_scale * altitude_term * doppler_term
}
