//! The guidance engine: mission coordination, external-stream brokering,
//! and the uniform payload control contract.
//!
//! The root [`engine::GuidanceEngine`] composes the planner, estimator,
//! stealth evaluator, swarm controller, and broker behind one object;
//! tests instantiate a fresh engine per case.

pub mod backoff;
pub mod broker;
pub mod coordinator;
pub mod engine;
pub mod frame;
pub mod payload;

pub use coordinator::{CoordinatorConfig, MissionCoordinator};
pub use engine::{EngineConfig, GeoMissionRequest, GuidanceEngine};
pub use payload::{MockPayload, PayloadCommand, PayloadControl};

#[cfg(test)]
mod tests;
