//! Atmospheric density and temperature models.
//!
//! Two fidelities: a single-exponent exponential model, and the 1976
//! US Standard Atmosphere as piecewise layers to 86 km with a tabulated
//! exponential extension above. Density above 1000 km clamps to a vacuum
//! floor so orbital drag terms vanish smoothly.

/// Vacuum density floor above 1000 km (kg/m³).
pub const VACUUM_DENSITY: f64 = 1e-15;

/// Altitude above which density is clamped to the vacuum floor (m).
pub const VACUUM_CLAMP_ALTITUDE_M: f64 = 1_000_000.0;

/// Sea-level standard density (kg/m³).
pub const SEA_LEVEL_DENSITY: f64 = 1.225;

/// Sea-level standard temperature (K).
pub const SEA_LEVEL_TEMPERATURE_K: f64 = 288.15;

/// Sea-level standard pressure (Pa).
const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;

/// Specific gas constant for dry air (J/(kg·K)).
const R_AIR: f64 = 287.053;

/// Standard gravity used by the barometric layers (m/s²).
const G0: f64 = 9.806_65;

/// Ratio of specific heats for air.
const GAMMA_AIR: f64 = 1.4;

/// Earth radius used for geometric→geopotential conversion (m).
const EARTH_RADIUS_M: f64 = 6_356_766.0;

/// Atmosphere model selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AtmosphereModel {
    /// `ρ = ρ₀ · exp(−h/H)` with a per-body scale height.
    Exponential,
    /// Piecewise 1976 US Standard Atmosphere.
    #[default]
    Us76,
}

/// US76 layer bases to 86 km: (geopotential base altitude m,
/// base temperature K, base pressure Pa, lapse rate K/m).
const US76_LAYERS: [(f64, f64, f64, f64); 7] = [
    (0.0, 288.15, 101_325.0, -0.0065),
    (11_000.0, 216.65, 22_632.06, 0.0),
    (20_000.0, 216.65, 5_474.889, 0.001),
    (32_000.0, 228.65, 868.0187, 0.0028),
    (47_000.0, 270.65, 110.9063, 0.0),
    (51_000.0, 270.65, 66.93887, -0.0028),
    (71_000.0, 214.65, 3.956_420, -0.002),
];

/// High-altitude density anchors from the US76 tables:
/// (geometric altitude m, density kg/m³). Interpolated exponentially.
const US76_HIGH_ALT: [(f64, f64); 11] = [
    (86_000.0, 6.958e-6),
    (90_000.0, 3.416e-6),
    (100_000.0, 5.604e-7),
    (110_000.0, 9.708e-8),
    (120_000.0, 2.222e-8),
    (150_000.0, 2.076e-9),
    (200_000.0, 2.541e-10),
    (300_000.0, 1.916e-11),
    (500_000.0, 5.215e-13),
    (750_000.0, 2.388e-14),
    (1_000_000.0, 3.561e-15),
];

/// Density from the single-exponent model.
pub fn density_exponential(altitude_m: f64, surface_density: f64, scale_height_m: f64) -> f64 {
    if altitude_m >= VACUUM_CLAMP_ALTITUDE_M {
        return VACUUM_DENSITY;
    }
    let h = altitude_m.max(0.0);
    surface_density * (-h / scale_height_m).exp()
}

/// Density from the US76 model at a geometric altitude.
pub fn density_us76(altitude_m: f64) -> f64 {
    if altitude_m >= VACUUM_CLAMP_ALTITUDE_M {
        return VACUUM_DENSITY;
    }
    if altitude_m >= 86_000.0 {
        return high_altitude_density(altitude_m);
    }

    let h_geo = geopotential(altitude_m.max(0.0));
    let (t, p) = layer_temperature_pressure(h_geo);
    p / (R_AIR * t)
}

/// Temperature (K) at a geometric altitude under US76; above 86 km the
/// thermosphere is approximated as isothermal at 1000 K for drag Mach
/// computation (density there is negligible anyway).
pub fn temperature_us76(altitude_m: f64) -> f64 {
    if altitude_m >= 86_000.0 {
        return 1_000.0;
    }
    let h_geo = geopotential(altitude_m.max(0.0));
    let (t, _) = layer_temperature_pressure(h_geo);
    t
}

/// Local speed of sound (m/s) from temperature.
pub fn speed_of_sound(temperature_k: f64) -> f64 {
    (GAMMA_AIR * R_AIR * temperature_k).sqrt()
}

/// Geometric → geopotential altitude.
fn geopotential(h_m: f64) -> f64 {
    EARTH_RADIUS_M * h_m / (EARTH_RADIUS_M + h_m)
}

/// Temperature and pressure at a geopotential altitude within the
/// layered region.
fn layer_temperature_pressure(h_geo: f64) -> (f64, f64) {
    if h_geo <= 0.0 {
        return (SEA_LEVEL_TEMPERATURE_K, SEA_LEVEL_PRESSURE_PA);
    }

    let mut layer = US76_LAYERS[0];
    for candidate in US76_LAYERS.iter() {
        if h_geo >= candidate.0 {
            layer = *candidate;
        } else {
            break;
        }
    }
    let (base_h, base_t, base_p, lapse) = layer;
    let dh = h_geo - base_h;

    if lapse.abs() < 1e-12 {
        // Isothermal layer
        let t = base_t;
        let p = base_p * (-G0 * dh / (R_AIR * t)).exp();
        (t, p)
    } else {
        // Gradient layer
        let t = base_t + lapse * dh;
        let p = base_p * (t / base_t).powf(-G0 / (lapse * R_AIR));
        (t, p)
    }
}

/// Exponential interpolation between tabulated high-altitude anchors.
fn high_altitude_density(altitude_m: f64) -> f64 {
    let table = &US76_HIGH_ALT;
    if altitude_m <= table[0].0 {
        return table[0].1;
    }
    for pair in table.windows(2) {
        let (h0, d0) = pair[0];
        let (h1, d1) = pair[1];
        if altitude_m <= h1 {
            let t = (altitude_m - h0) / (h1 - h0);
            // Log-linear interpolation: density decays exponentially.
            let ln = d0.ln() + t * (d1.ln() - d0.ln());
            return ln.exp();
        }
    }
    VACUUM_DENSITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sea_level_density() {
        let d = density_us76(0.0);
        assert!(
            (d - SEA_LEVEL_DENSITY).abs() < 0.002,
            "sea-level density should be 1.225, got {d}"
        );
    }

    #[test]
    fn test_density_at_100km_matches_table() {
        let d = density_us76(100_000.0);
        assert!(
            ((d - 5.604e-7) / 5.604e-7).abs() < 1e-6,
            "100 km density should hit the tabulated anchor, got {d:e}"
        );
    }

    #[test]
    fn test_vacuum_clamp_at_1000km() {
        assert_eq!(density_us76(1_000_000.0), VACUUM_DENSITY);
        assert_eq!(density_us76(5_000_000.0), VACUUM_DENSITY);
        assert_eq!(density_exponential(2_000_000.0, 1.225, 8_500.0), VACUUM_DENSITY);
    }

    #[test]
    fn test_density_monotonically_decreases() {
        let mut prev = density_us76(0.0);
        for h in (1..100).map(|k| k as f64 * 10_000.0) {
            let d = density_us76(h);
            assert!(
                d < prev,
                "density should decrease with altitude: {d:e} at {h} vs {prev:e}"
            );
            prev = d;
        }
    }

    #[test]
    fn test_tropopause_temperature() {
        // 11 km geopotential is the tropopause at 216.65 K.
        let t = temperature_us76(11_019.0); // ~11 km geopotential
        assert!(
            (t - 216.65).abs() < 0.5,
            "tropopause temperature should be ~216.65 K, got {t}"
        );
    }

    #[test]
    fn test_exponential_model_scale_height() {
        let d0 = density_exponential(0.0, 1.225, 8_500.0);
        let dh = density_exponential(8_500.0, 1.225, 8_500.0);
        assert!(
            (dh / d0 - (-1.0_f64).exp()).abs() < 1e-9,
            "one scale height should reduce density by e"
        );
    }
}
