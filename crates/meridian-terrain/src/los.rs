//! Terrain occlusion via a horizon scan.
//!
//! Instead of walking a ray and testing heights, the check sweeps the
//! ground track between observer and target keeping a running maximum of
//! the elevation slope toward each terrain station. The target is visible
//! exactly when its own slope clears that running horizon. Earth
//! curvature enters as a depression of every station below the
//! observer's horizontal datum, with the 4/3-radius model standing in
//! for standard atmospheric refraction.

use meridian_core::constants::EARTH_RADIUS_M;
use meridian_core::types::Vector3;

use crate::grid::TerrainGrid;

/// Refraction-corrected Earth radius (4/3 model).
const REFRACTED_RADIUS_M: f64 = EARTH_RADIUS_M * 4.0 / 3.0;

/// Station spacing bounds (meters). The actual spacing follows the
/// tile's cell resolution so coarse tiles are not oversampled.
const MIN_STATION_SPACING_M: f64 = 30.0;
const MAX_STATION_SPACING_M: f64 = 250.0;

/// Height lost to Earth curvature at a ground distance from the
/// observer, relative to the observer's horizontal datum.
fn curvature_depression(ground_dist_m: f64) -> f64 {
    ground_dist_m * ground_dist_m / (2.0 * REFRACTED_RADIUS_M)
}

/// Whether the target at `to` is visible from `from` over the terrain.
///
/// Sweeps stations along the ground track; a station whose
/// curvature-depressed terrain slope reaches the target's sight slope
/// forms a horizon in front of the target and occludes it.
pub fn has_line_of_sight(grid: &TerrainGrid, from: &Vector3, to: &Vector3) -> bool {
    let east = to.x - from.x;
    let north = to.y - from.y;
    let ground_span = (east * east + north * north).sqrt();

    let spacing = grid
        .cell_span_m()
        .clamp(MIN_STATION_SPACING_M, MAX_STATION_SPACING_M);
    if ground_span <= spacing {
        return true; // nothing between observer and target to occlude
    }

    // Slope of the sight line to the (curvature-depressed) target.
    let sight_slope = (to.z - curvature_depression(ground_span) - from.z) / ground_span;

    let stations = (ground_span / spacing) as usize;
    for station in 1..stations {
        let dist = station as f64 * spacing;
        let along = dist / ground_span;
        let ground_point = Vector3::new(from.x + east * along, from.y + north * along, 0.0);

        // Outside the tile there is nothing known to occlude.
        let Some(elevation) = grid.elevation_at(&ground_point) else {
            continue;
        };

        let terrain_slope = (elevation as f64 - curvature_depression(dist) - from.z) / dist;
        if terrain_slope >= sight_slope {
            return false; // this station is the horizon; the target sits behind it
        }
    }

    true
}
