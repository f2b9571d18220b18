//! Swarm formation control: robot registry, leader election, formation
//! geometry, heartbeat liveness, and emergency stop.
//!
//! The controller is pure bookkeeping over plain data; the engine drives
//! its heartbeat tick and dispatches the move commands it emits.

pub mod controller;
pub mod formation;

pub use controller::{SwarmCommand, SwarmConfig, SwarmController, TickReport};
pub use formation::formation_offsets;
