//! Terrain heightmap grid with elevation queries.
//!
//! Grids arrive as tiles from the imaging provider (100 m-class cells);
//! queries interpolate bilinearly. The grid carries its own projection so
//! engine-space positions can be queried directly.

use meridian_core::types::{GeoCoord, Vector3};
use serde::{Deserialize, Serialize};

use crate::projection::TheaterProjection;

/// Grid header metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainHeader {
    /// Southwest corner latitude (degrees).
    pub origin_lat: f64,
    /// Southwest corner longitude (degrees).
    pub origin_lon: f64,
    /// Arc-seconds per grid cell.
    pub cell_size: f64,
    /// Columns, west to east.
    pub width: u32,
    /// Rows, north to south.
    pub height: u32,
    /// Minimum elevation in the tile (m).
    pub min_elevation: i16,
    /// Maximum elevation in the tile (m).
    pub max_elevation: i16,
}

impl TerrainHeader {
    /// North edge latitude (degrees).
    pub fn north_lat(&self) -> f64 {
        self.origin_lat + (self.height as f64 * self.cell_size) / 3600.0
    }

    /// East edge longitude (degrees).
    pub fn east_lon(&self) -> f64 {
        self.origin_lon + (self.width as f64 * self.cell_size) / 3600.0
    }
}

/// A loaded terrain tile with its projection.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    pub header: TerrainHeader,
    /// Elevation in meters, row-major (north-to-south, west-to-east).
    pub elevations: Vec<i16>,
    projection: TheaterProjection,
}

impl TerrainGrid {
    pub fn new(header: TerrainHeader, elevations: Vec<i16>, projection: TheaterProjection) -> Self {
        Self {
            header,
            elevations,
            projection,
        }
    }

    /// A flat tile of the given span centered at the projection anchor.
    /// Used where no terrain provider is wired (oceans, test rigs).
    pub fn flat(center_lat: f64, center_lon: f64, span_cells: u32, cell_size_arcsec: f64) -> Self {
        let proj = TheaterProjection::new(center_lat, center_lon);
        let half_span_deg = (span_cells as f64 * cell_size_arcsec / 3600.0) / 2.0;
        let header = TerrainHeader {
            origin_lat: center_lat - half_span_deg,
            origin_lon: center_lon - half_span_deg,
            cell_size: cell_size_arcsec,
            width: span_cells,
            height: span_cells,
            min_elevation: 0,
            max_elevation: 0,
        };
        let elevations = vec![0i16; (span_cells * span_cells) as usize];
        TerrainGrid::new(header, elevations, proj)
    }

    pub fn projection(&self) -> &TheaterProjection {
        &self.projection
    }

    /// Approximate ground span of one grid cell (meters), from its
    /// arc-second size along the latitude axis.
    pub fn cell_span_m(&self) -> f64 {
        self.header.cell_size * (self.projection.north_scale_m_per_deg() / 3600.0)
    }

    /// Engine-space position → fractional grid row/col; None outside the tile.
    fn engine_to_grid(&self, pos: &Vector3) -> Option<(f64, f64)> {
        let geo = self.projection.to_geo(pos);
        self.geo_to_grid(geo.lat_deg, geo.lon_deg)
    }

    fn geo_to_grid(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let h = &self.header;
        let col = (lon - h.origin_lon) * 3600.0 / h.cell_size;
        let row = (h.north_lat() - lat) * 3600.0 / h.cell_size;

        if col < 0.0 || row < 0.0 || col >= h.width as f64 || row >= h.height as f64 {
            return None;
        }
        Some((row, col))
    }

    fn raw_elevation(&self, row: usize, col: usize) -> i16 {
        let h = &self.header;
        if row >= h.height as usize || col >= h.width as usize {
            return 0;
        }
        self.elevations[row * h.width as usize + col]
    }

    /// Elevation at an engine-space position, bilinearly interpolated.
    pub fn elevation_at(&self, pos: &Vector3) -> Option<f32> {
        let (row, col) = self.engine_to_grid(pos)?;
        Some(self.bilinear(row, col))
    }

    /// Elevation at a geographic coordinate.
    pub fn elevation_at_geo(&self, geo: &GeoCoord) -> Option<f32> {
        let (row, col) = self.geo_to_grid(geo.lat_deg, geo.lon_deg)?;
        Some(self.bilinear(row, col))
    }

    fn bilinear(&self, row: f64, col: f64) -> f32 {
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(self.header.height as usize - 1);
        let c1 = (c0 + 1).min(self.header.width as usize - 1);

        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let e00 = self.raw_elevation(r0, c0) as f64;
        let e01 = self.raw_elevation(r0, c1) as f64;
        let e10 = self.raw_elevation(r1, c0) as f64;
        let e11 = self.raw_elevation(r1, c1) as f64;

        let top = e00 * (1.0 - fc) + e01 * fc;
        let bot = e10 * (1.0 - fc) + e11 * fc;
        (top * (1.0 - fr) + bot * fr) as f32
    }

    /// Maximum elevation along a straight engine-space segment, sampled at
    /// the given interval. Used by the terrain-masking optimizer to find
    /// ridge lines.
    pub fn max_elevation_along(&self, from: &Vector3, to: &Vector3, interval_m: f64) -> f32 {
        let dist = from.horizontal_distance_to(to);
        let samples = ((dist / interval_m).ceil() as usize).max(1);
        let mut peak = f32::MIN;
        for i in 0..=samples {
            let t = i as f64 / samples as f64;
            let p = Vector3::new(
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
                0.0,
            );
            let e = self.elevation_at(&p).unwrap_or(0.0);
            if e > peak {
                peak = e;
            }
        }
        peak
    }

    /// Geographic bounding box covering all route positions plus a margin,
    /// for requesting a tile from the imaging provider.
    pub fn bounding_box_for_route(
        projection: &TheaterProjection,
        route: &[Vector3],
        margin_m: f64,
    ) -> Option<(GeoCoord, GeoCoord)> {
        if route.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in route {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let sw = projection.to_geo(&Vector3::new(min_x - margin_m, min_y - margin_m, 0.0));
        let ne = projection.to_geo(&Vector3::new(max_x + margin_m, max_y + margin_m, 0.0));
        Some((sw, ne))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 5×5 tile with a 100 m peak in the center, anchored at (34.1, 44.5).
    pub(crate) fn make_peak_grid() -> TerrainGrid {
        let proj = TheaterProjection::new(34.1, 44.5);
        let cell_size = 1.0; // arc-second
        let width = 5u32;
        let height = 5u32;
        let origin_lat = 34.1 - (height as f64 * cell_size / 3600.0) / 2.0;
        let origin_lon = 44.5 - (width as f64 * cell_size / 3600.0) / 2.0;

        #[rustfmt::skip]
        let elevations: Vec<i16> = vec![
            0,   0,   0,   0,   0,
            0,  50,  50,  50,   0,
            0,  50, 100,  50,   0,
            0,  50,  50,  50,   0,
            0,   0,   0,   0,   0,
        ];

        TerrainGrid::new(
            TerrainHeader {
                origin_lat,
                origin_lon,
                cell_size,
                width,
                height,
                min_elevation: 0,
                max_elevation: 100,
            },
            elevations,
            proj,
        )
    }

    #[test]
    fn test_peak_elevation_query() {
        let grid = make_peak_grid();
        let h = &grid.header;
        let peak_lat = h.north_lat() - 2.0 * h.cell_size / 3600.0;
        let peak_lon = h.origin_lon + 2.0 * h.cell_size / 3600.0;
        let pos = grid
            .projection()
            .to_engine(&GeoCoord::new(peak_lat, peak_lon, 0.0));

        let e = grid.elevation_at(&pos).expect("peak inside tile");
        assert!((e - 100.0).abs() < 1.0, "peak should be ~100 m, got {e}");
    }

    #[test]
    fn test_outside_tile_is_none() {
        let grid = make_peak_grid();
        let far = Vector3::new(111_320.0, 0.0, 0.0); // one degree east
        assert!(grid.elevation_at(&far).is_none());
    }

    #[test]
    fn test_bilinear_interpolation_midpoint() {
        let grid = make_peak_grid();
        let h = &grid.header;
        // Halfway between row 1 (50 m) and row 2 (100 m) on the center column.
        let lat = h.north_lat() - 1.5 * h.cell_size / 3600.0;
        let lon = h.origin_lon + 2.0 * h.cell_size / 3600.0;
        let pos = grid
            .projection()
            .to_engine(&GeoCoord::new(lat, lon, 0.0));
        let e = grid.elevation_at(&pos).unwrap();
        assert!((e - 75.0).abs() < 1.0, "interpolated ~75 m, got {e}");
    }

    #[test]
    fn test_max_elevation_along_crosses_peak() {
        let grid = make_peak_grid();
        // A west→east segment through the tile center crosses the peak.
        let from = Vector3::new(-100.0, 0.0, 0.0);
        let to = Vector3::new(100.0, 0.0, 0.0);
        let peak = grid.max_elevation_along(&from, &to, 10.0);
        assert!(peak > 90.0, "segment should cross the 100 m peak, got {peak}");
    }

    #[test]
    fn test_route_bounding_box_includes_margin() {
        let proj = TheaterProjection::new(34.1, 44.5);
        let route = vec![Vector3::ZERO, Vector3::new(10_000.0, 5_000.0, 0.0)];
        let (sw, ne) = TerrainGrid::bounding_box_for_route(&proj, &route, 1_000.0).unwrap();
        assert!(sw.lat_deg < 34.1);
        assert!(ne.lat_deg > 34.1);
        assert!(ne.lon_deg > sw.lon_deg);
    }
}
