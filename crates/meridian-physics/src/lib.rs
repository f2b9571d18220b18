//! Physics kernel: gravity, atmosphere, drag, radiation pressure,
//! third-body perturbations, RK4 propagation, and re-entry heating.
//!
//! All functions are pure and deterministic: identical inputs produce
//! identical outputs, which the trajectory planner and tests rely on.

pub mod atmosphere;
pub mod bodies;
pub mod drag;
pub mod gravity;
pub mod propagator;
pub mod reentry;
pub mod srp;
pub mod third_body;
