//! Formation geometry: per-slot offsets relative to the swarm centroid.
//!
//! All generators are deterministic functions of (kind, slot count,
//! spacing), so recomputing a formation leaves targets bit-identical.

use meridian_core::enums::FormationKind;
use meridian_core::types::Vector3;

/// Golden angle (radians) for the scatter distribution.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Offsets for `n` slots of the given formation, centered on the swarm
/// centroid. Index i is the offset for slot i.
pub fn formation_offsets(kind: &FormationKind, n: usize, spacing_m: f64) -> Vec<Vector3> {
    if n == 0 {
        return Vec::new();
    }
    match kind {
        FormationKind::Line => (0..n)
            .map(|i| Vector3::new(spacing_m * (i as f64 - (n as f64 - 1.0) / 2.0), 0.0, 0.0))
            .collect(),
        FormationKind::Column => (0..n)
            .map(|i| Vector3::new(0.0, spacing_m * (i as f64 - (n as f64 - 1.0) / 2.0), 0.0))
            .collect(),
        FormationKind::Wedge => (0..n)
            .map(|i| {
                if i == 0 {
                    Vector3::ZERO // apex
                } else {
                    let row = ((i + 1) / 2) as f64;
                    let side = if i % 2 == 1 { 1.0 } else { -1.0 };
                    Vector3::new(side * row * spacing_m, -row * spacing_m, 0.0)
                }
            })
            .collect(),
        FormationKind::Circle => {
            let radius = (spacing_m * n as f64 / std::f64::consts::TAU).max(spacing_m);
            let step = std::f64::consts::TAU / n as f64;
            (0..n)
                .map(|i| {
                    let angle = step * i as f64;
                    Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
                })
                .collect()
        }
        FormationKind::Grid => {
            let cols = (n as f64).sqrt().ceil() as usize;
            (0..n)
                .map(|i| {
                    let row = i / cols;
                    let col = i % cols;
                    Vector3::new(
                        spacing_m * (col as f64 - (cols as f64 - 1.0) / 2.0),
                        spacing_m * (row as f64 - ((n + cols - 1) / cols) as f64 / 2.0 + 0.5),
                        0.0,
                    )
                })
                .collect()
        }
        FormationKind::Scatter => (0..n)
            .map(|i| {
                let angle = GOLDEN_ANGLE * i as f64;
                let radius = spacing_m * (1.0 + (i % 3) as f64);
                Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
            })
            .collect(),
        FormationKind::Custom { offsets } => (0..n)
            .map(|i| offsets.get(i).copied().unwrap_or(Vector3::ZERO))
            .collect(),
    }
}
