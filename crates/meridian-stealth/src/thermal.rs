//! Thermal signature model.
//!
//! Skin temperature combines ambient, friction heating (∝ v²), and engine
//! contribution, diluted with altitude; the observable signature follows
//! a fourth-power radiated intensity normalized to [0, 1].

/// Friction heating coefficient (K·s²/m²).
const FRICTION_COEFF: f64 = 4.5e-4;

/// Altitude dilution scale (m).
const ALTITUDE_DILUTION_M: f64 = 10_000.0;

/// Reference temperature for signature normalization (K). A plume at this
/// temperature saturates the signature.
const SATURATION_TEMP_K: f64 = 900.0;

/// Skin/plume temperature (K):
/// `T = (T_amb + k_f·v² + k_e·throttle) / (1 + h/10000)`.
pub fn surface_temperature(
    ambient_k: f64,
    speed_mps: f64,
    throttle: f64,
    engine_coeff: f64,
    altitude_m: f64,
) -> f64 {
    let heating = ambient_k + FRICTION_COEFF * speed_mps * speed_mps + engine_coeff * throttle;
    heating / (1.0 + altitude_m.max(0.0) / ALTITUDE_DILUTION_M)
}

/// Thermal signature in [0, 1]: radiated intensity ∝ T⁴, normalized to
/// the saturation temperature.
pub fn thermal_signature(temperature_k: f64) -> f64 {
    let ratio = (temperature_k / SATURATION_TEMP_K).max(0.0);
    (ratio * ratio * ratio * ratio).min(1.0)
}
