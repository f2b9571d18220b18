//! Stealth evaluation: per-waypoint radar, thermal, and SAM signatures,
//! trajectory-level scoring, terrain-masking optimization, and decoy
//! generation.

pub mod detection;
pub mod evaluate;
pub mod rcs;
pub mod sam;
pub mod thermal;

pub use evaluate::{
    evaluate_trajectory, generate_decoy_path, optimize_terrain_masking, StealthReport,
    ThreatPicture, WaypointSignature,
};
