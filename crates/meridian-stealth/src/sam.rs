//! SAM engagement envelopes.
//!
//! The envelope is a range × altitude-ceiling cylinder, softened at the
//! edges so the planner sees a gradient to descend rather than a cliff.

use meridian_core::threat::SamSite;
use meridian_core::types::Vector3;

/// Fraction of the envelope over which the threat softens to zero.
const EDGE_SOFTNESS: f64 = 0.1;

/// Threat level in [0, 1] a SAM site presents to a position. 1.0 deep
/// inside the envelope, 0.0 well outside, a smooth ramp across the edge.
pub fn engagement_threat(site: &SamSite, position: &Vector3) -> f64 {
    if !site.active {
        return 0.0;
    }

    let range_m = site.range_km * 1_000.0;
    let horiz = site.position.horizontal_distance_to(position);
    let altitude = position.z;

    let range_factor = edge_ramp(horiz, range_m);
    let ceiling_factor = edge_ramp(altitude, site.ceiling_m);

    range_factor * ceiling_factor
}

/// 1.0 inside, linear ramp down across [limit·(1−ε), limit·(1+ε)], 0.0
/// beyond.
fn edge_ramp(value: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 0.0;
    }
    let inner = limit * (1.0 - EDGE_SOFTNESS);
    let outer = limit * (1.0 + EDGE_SOFTNESS);
    if value <= inner {
        1.0
    } else if value >= outer {
        0.0
    } else {
        (outer - value) / (outer - inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SamSite {
        SamSite {
            id: "sam-1".to_string(),
            position: Vector3::ZERO,
            range_km: 40.0,
            ceiling_m: 15_000.0,
            active: true,
        }
    }

    #[test]
    fn test_deep_inside_is_full_threat() {
        let t = engagement_threat(&site(), &Vector3::new(10_000.0, 0.0, 5_000.0));
        assert_eq!(t, 1.0);
    }

    #[test]
    fn test_outside_range_is_zero() {
        let t = engagement_threat(&site(), &Vector3::new(60_000.0, 0.0, 5_000.0));
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_above_ceiling_is_zero() {
        let t = engagement_threat(&site(), &Vector3::new(10_000.0, 0.0, 20_000.0));
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_edge_is_soft() {
        // Exactly at rated range: mid-ramp, neither 0 nor 1.
        let t = engagement_threat(&site(), &Vector3::new(40_000.0, 0.0, 5_000.0));
        assert!(t > 0.0 && t < 1.0, "envelope edge should be soft, got {t}");
    }

    #[test]
    fn test_inactive_site_no_threat() {
        let mut s = site();
        s.active = false;
        assert_eq!(engagement_threat(&s, &Vector3::new(1_000.0, 0.0, 100.0)), 0.0);
    }
}
