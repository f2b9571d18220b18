//! State estimation: a 9-state constant-acceleration Kalman filter per
//! tracked entity, with ordered observation application, bounded history,
//! and idle-entity pruning.

pub mod kalman;
pub mod matrix;
pub mod tracker;

pub use kalman::{Kalman9, ObservationModel};
pub use tracker::{Observation, PredictedState, StateEstimator};

#[cfg(test)]
mod tests;
