//! Central-body constants table.

/// Gravitational and shape parameters for a central body.
#[derive(Debug, Clone, Copy)]
pub struct BodyParams {
    /// Gravitational parameter GM (m³/s²).
    pub mu: f64,
    /// Equatorial radius (m).
    pub radius_m: f64,
    /// Second zonal harmonic (oblateness).
    pub j2: f64,
    /// Third zonal harmonic.
    pub j3: f64,
    /// Fourth zonal harmonic.
    pub j4: f64,
    /// Sea-level atmospheric density (kg/m³); zero for airless bodies.
    pub surface_density: f64,
    /// Atmospheric scale height for the exponential model (m).
    pub scale_height_m: f64,
}

/// Central bodies the kernel knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CentralBody {
    Earth,
    Moon,
    Mars,
    Sun,
}

/// Look up the parameter row for a body.
pub fn body_params(body: CentralBody) -> BodyParams {
    match body {
        CentralBody::Earth => BodyParams {
            mu: 3.986_004_418e14,
            radius_m: 6_378_137.0,
            j2: 1.082_626_68e-3,
            j3: -2.532_65e-6,
            j4: -1.619_62e-6,
            surface_density: 1.225,
            scale_height_m: 8_500.0,
        },
        CentralBody::Moon => BodyParams {
            mu: 4.902_800_066e12,
            radius_m: 1_737_400.0,
            j2: 2.033e-4,
            j3: 8.5e-6,
            j4: -9.6e-6,
            surface_density: 0.0,
            scale_height_m: 1.0,
        },
        CentralBody::Mars => BodyParams {
            mu: 4.282_837e13,
            radius_m: 3_396_200.0,
            j2: 1.960_45e-3,
            j3: 3.145e-5,
            j4: -1.538e-5,
            surface_density: 0.020,
            scale_height_m: 11_100.0,
        },
        CentralBody::Sun => BodyParams {
            mu: 1.327_124_400_18e20,
            radius_m: 6.957e8,
            j2: 2.2e-7,
            j3: 0.0,
            j4: 0.0,
            surface_density: 0.0,
            scale_height_m: 1.0,
        },
    }
}

/// GM of the Sun (m³/s²), for third-body terms.
pub const MU_SUN: f64 = 1.327_124_400_18e20;

/// GM of the Moon (m³/s²), for third-body terms.
pub const MU_MOON: f64 = 4.902_800_066e12;

/// Mean Sun-Earth distance, one astronomical unit (m).
pub const AU_M: f64 = 1.495_978_707e11;

/// Solar constant at 1 AU (W/m²).
pub const SOLAR_FLUX_1AU: f64 = 1_361.0;

/// Speed of light (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
