//! Terrain support: heightmap grids, the theater geo projection, and
//! line-of-sight checks used for terrain masking.

pub mod grid;
pub mod los;
pub mod projection;

pub use grid::{TerrainGrid, TerrainHeader};
pub use los::has_line_of_sight;
pub use projection::TheaterProjection;
