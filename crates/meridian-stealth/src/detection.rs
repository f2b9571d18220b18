//! Radar detection probability.
//!
//! Simplified radar equation: `Pd = 1 − exp(−K·band·rcs/d⁴)` with K
//! calibrated so a 1 m² target is a coin flip at 35% of the site's rated
//! range (the rated range itself is the envelope edge, where detection is
//! marginal). Doubling RCS extends detection range by 2^(1/4) ≈ 1.19
//! (fourth-root law). Terrain masking gates detection entirely.

use meridian_core::enums::RadarBand;
use meridian_core::threat::RadarSite;
use meridian_core::types::Vector3;
use meridian_terrain::{has_line_of_sight, TerrainGrid};

/// Range below which detection is guaranteed (meters).
const RADAR_MIN_RANGE_M: f64 = 500.0;

/// Fraction of the rated range where a 1 m² target has Pd = 0.5.
const DETECTION_MIDPOINT_FRACTION: f64 = 0.35;

/// Sensitivity multiplier per band: longer wavelengths search better,
/// higher bands trade range for resolution.
pub fn band_factor(band: RadarBand) -> f64 {
    match band {
        RadarBand::LBand => 1.2,
        RadarBand::SBand => 1.0,
        RadarBand::CBand => 0.9,
        RadarBand::XBand => 0.8,
        RadarBand::KuBand => 0.7,
    }
}

/// Probability that a site detects a target of the given effective RCS at
/// a range. Beyond the site's rated range the probability continues to
/// fall off by the same law rather than cutting off sharply.
pub fn detection_probability(site: &RadarSite, range_m: f64, rcs_m2: f64) -> f64 {
    if !site.active {
        return 0.0;
    }
    if range_m < RADAR_MIN_RANGE_M {
        return 1.0;
    }
    let midpoint_m = site.range_km * 1_000.0 * DETECTION_MIDPOINT_FRACTION;
    let k = std::f64::consts::LN_2 * midpoint_m.powi(4) * band_factor(site.band);
    let snr = k * rcs_m2 / range_m.powi(4);
    1.0 - (-snr).exp()
}

/// Detection probability with terrain masking: a site with no
/// line-of-sight to the target sees nothing.
pub fn masked_detection_probability(
    site: &RadarSite,
    target: &Vector3,
    rcs_m2: f64,
    terrain: Option<&TerrainGrid>,
) -> f64 {
    if let Some(grid) = terrain {
        if !has_line_of_sight(grid, &site.position, target) {
            return 0.0;
        }
    }
    detection_probability(site, site.position.distance_to(target), rcs_m2)
}
