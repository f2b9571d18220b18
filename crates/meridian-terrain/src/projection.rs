//! Theater projection: the geographic boundary of the engine.
//!
//! Engine space is a local tangent frame (x East, y North, z Up) pinned
//! to a theater anchor; geographic coordinates convert through fixed
//! per-axis scales — one degree of latitude spans a near-constant ground
//! distance, one degree of longitude shrinks with cos(latitude). This is
//! the documented flat-theater shortcut, good to <0.1% within 400 km of
//! the anchor: it is applied only where GeoCoord crosses into the engine
//! (mission creation, terrain tiles, threat-zone centers), never to
//! orbital work, which stays Cartesian end to end.

use meridian_core::types::{GeoCoord, Vector3};

/// Ground span of one degree of latitude (meters).
const DEG_LAT_SPAN_M: f64 = 111_320.0;

/// Projection pinned to a theater anchor; the anchor is engine origin.
#[derive(Debug, Clone)]
pub struct TheaterProjection {
    anchor: GeoCoord,
    /// Meters per degree of longitude at the anchor latitude.
    east_scale: f64,
    /// Meters per degree of latitude.
    north_scale: f64,
}

impl TheaterProjection {
    /// Pin a projection at the given anchor latitude/longitude (degrees).
    pub fn new(anchor_lat_deg: f64, anchor_lon_deg: f64) -> Self {
        Self {
            anchor: GeoCoord::new(anchor_lat_deg, anchor_lon_deg, 0.0),
            east_scale: DEG_LAT_SPAN_M * anchor_lat_deg.to_radians().cos(),
            north_scale: DEG_LAT_SPAN_M,
        }
    }

    /// Geographic → engine space.
    pub fn to_engine(&self, geo: &GeoCoord) -> Vector3 {
        Vector3 {
            x: (geo.lon_deg - self.anchor.lon_deg) * self.east_scale,
            y: (geo.lat_deg - self.anchor.lat_deg) * self.north_scale,
            z: geo.alt_m,
        }
    }

    /// Engine space → geographic.
    pub fn to_geo(&self, pos: &Vector3) -> GeoCoord {
        GeoCoord {
            lat_deg: self.anchor.lat_deg + pos.y / self.north_scale,
            lon_deg: self.anchor.lon_deg + pos.x / self.east_scale,
            alt_m: pos.z,
        }
    }

    /// The anchor point (engine origin).
    pub fn anchor(&self) -> GeoCoord {
        self.anchor
    }

    /// Meters per degree of longitude at the anchor latitude.
    pub fn east_scale_m_per_deg(&self) -> f64 {
        self.east_scale
    }

    /// Meters per degree of latitude.
    pub fn north_scale_m_per_deg(&self) -> f64 {
        self.north_scale
    }
}
