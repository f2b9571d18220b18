//! The uniform payload control contract and the deterministic mock
//! backend used in tests.
//!
//! The engine depends only on this trait; HTTP, line-based TCP,
//! binary-framed TCP, and Modbus adapters live outside the core and
//! implement the same surface.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use meridian_core::error::{GuidanceError, Result};
use meridian_core::types::{EntityState, Trajectory, Vector3};

/// A command a payload backend can execute.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadCommand {
    MotorEnable,
    TelemetryRequest,
    Move(Vector3),
    Stop,
    /// Named joint targets for articulated payloads.
    Joints(HashMap<String, f64>),
}

/// Uniform control surface over heterogeneous payload backends.
#[async_trait]
pub trait PayloadControl: Send + Sync {
    async fn initialize(&self) -> Result<()>;
    async fn send_command(&self, command: PayloadCommand) -> Result<()>;
    async fn navigate_to(&self, position: Vector3) -> Result<()>;
    /// Humanoid backends; others reject.
    async fn set_joint_positions(&self, positions: HashMap<String, f64>) -> Result<()>;
    async fn state(&self) -> Result<EntityState>;
    async fn stop(&self) -> Result<()>;
    async fn is_moving(&self) -> Result<bool>;
    async fn battery_level(&self) -> Result<f64>;
    /// Deliver a full trajectory in the backend's native format.
    async fn dispatch_trajectory(&self, trajectory: &Trajectory) -> Result<()>;
}

#[derive(Debug)]
struct MockInner {
    state: EntityState,
    moving: bool,
    initialized: bool,
    dispatched: Vec<Trajectory>,
    commands: Vec<PayloadCommand>,
    /// Remaining dispatch calls to fail, for retry tests.
    fail_dispatches: u32,
}

/// Deterministic in-memory backend.
pub struct MockPayload {
    inner: Mutex<MockInner>,
}

impl Default for MockPayload {
    fn default() -> Self {
        Self::new(EntityState::at(Vector3::ZERO, 0.0))
    }
}

impl MockPayload {
    pub fn new(initial: EntityState) -> Self {
        MockPayload {
            inner: Mutex::new(MockInner {
                state: initial,
                moving: false,
                initialized: false,
                dispatched: Vec::new(),
                commands: Vec::new(),
                fail_dispatches: 0,
            }),
        }
    }

    /// Make the next `count` dispatch calls fail, to exercise retries.
    pub fn fail_next_dispatches(&self, count: u32) {
        self.inner.lock().unwrap().fail_dispatches = count;
    }

    /// Trajectories accepted so far, in order.
    pub fn dispatched(&self) -> Vec<Trajectory> {
        self.inner.lock().unwrap().dispatched.clone()
    }

    /// Commands accepted so far, in order.
    pub fn commands(&self) -> Vec<PayloadCommand> {
        self.inner.lock().unwrap().commands.clone()
    }

    /// Advance the mock's reported state (test scaffolding for telemetry).
    pub fn set_state(&self, state: EntityState) {
        self.inner.lock().unwrap().state = state;
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock().unwrap().initialized
    }
}

#[async_trait]
impl PayloadControl for MockPayload {
    async fn initialize(&self) -> Result<()> {
        self.inner.lock().unwrap().initialized = true;
        Ok(())
    }

    async fn send_command(&self, command: PayloadCommand) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        match &command {
            PayloadCommand::Move(target) => {
                inner.moving = true;
                inner.state.position = *target;
            }
            PayloadCommand::Stop => inner.moving = false,
            _ => {}
        }
        inner.commands.push(command);
        Ok(())
    }

    async fn navigate_to(&self, position: Vector3) -> Result<()> {
        self.send_command(PayloadCommand::Move(position)).await
    }

    async fn set_joint_positions(&self, positions: HashMap<String, f64>) -> Result<()> {
        self.send_command(PayloadCommand::Joints(positions)).await
    }

    async fn state(&self) -> Result<EntityState> {
        Ok(self.inner.lock().unwrap().state)
    }

    async fn stop(&self) -> Result<()> {
        self.send_command(PayloadCommand::Stop).await
    }

    async fn is_moving(&self) -> Result<bool> {
        Ok(self.inner.lock().unwrap().moving)
    }

    async fn battery_level(&self) -> Result<f64> {
        Ok(self.inner.lock().unwrap().state.battery)
    }

    async fn dispatch_trajectory(&self, trajectory: &Trajectory) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_dispatches > 0 {
            inner.fail_dispatches -= 1;
            return Err(GuidanceError::DispatchFailed {
                attempts: 1,
                detail: "injected fault".to_string(),
            });
        }
        inner.moving = true;
        inner.dispatched.push(trajectory.clone());
        Ok(())
    }
}
