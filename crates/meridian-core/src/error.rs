//! Error kinds for guidance and coordination operations.
//!
//! A single enum carries every failure kind the engine surfaces; transient
//! kinds are retried locally, structural kinds flow into mission status.

use thiserror::Error;

/// Standard result type for engine operations.
pub type Result<T> = std::result::Result<T, GuidanceError>;

/// Failure kinds surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuidanceError {
    /// Observation timestamp precedes the last applied sample by more
    /// than the configured slack.
    #[error("stale observation for {entity}: {lag_secs:.1}s behind last applied")]
    StaleObservation { entity: String, lag_secs: f64 },

    /// Measurement covariance is not positive-semidefinite.
    #[error("invalid measurement covariance for {entity}")]
    InvalidCovariance { entity: String },

    /// Start or target outside the payload kind's operating envelope.
    #[error("infeasible mission: {reason}")]
    InfeasibleMission { reason: String },

    /// The planner exhausted all candidates without a valid path.
    #[error("no feasible trajectory candidate")]
    NoFeasibleCandidate,

    /// The intercept solver found no solution scoring above zero.
    #[error("no feasible intercept within horizon")]
    NoFeasibleIntercept,

    /// Fuel or time budget cannot be met.
    #[error("{resource} budget exceeded: need {required:.1}, have {available:.1}")]
    BudgetExceeded {
        resource: &'static str,
        required: f64,
        available: f64,
    },

    /// Payload command delivery failed after retries.
    #[error("dispatch to payload failed after {attempts} attempts: {detail}")]
    DispatchFailed { attempts: u32, detail: String },

    /// An external provider is unreachable.
    #[error("provider {provider} unreachable: {detail}")]
    ProviderUnreachable { provider: String, detail: String },

    /// A bounded stream buffer is full; the arrival was dropped.
    #[error("stream {stream} backpressure: buffer full")]
    StreamBackpressure { stream: &'static str },

    /// Registration beyond the swarm capacity.
    #[error("swarm capacity exceeded ({capacity})")]
    SwarmCapacityExceeded { capacity: usize },

    /// A robot failed to heartbeat within the timeout.
    #[error("formation timeout: robot {robot} missed heartbeat")]
    FormationTimeout { robot: String },

    /// The caller cancelled the operation.
    #[error("cancelled by caller")]
    Cancelled,

    /// No mission with the given identifier.
    #[error("unknown mission {0}")]
    UnknownMission(String),

    /// No tracked entity with the given identifier.
    #[error("unknown entity {0}")]
    UnknownEntity(String),

    /// The swarm is latched in emergency stop and refuses commands.
    #[error("swarm is emergency-stopped")]
    EmergencyStopped,
}

impl GuidanceError {
    /// Whether local retry is worthwhile. Structural infeasibilities are
    /// not; transient I/O conditions are.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GuidanceError::DispatchFailed { .. }
                | GuidanceError::ProviderUnreachable { .. }
                | GuidanceError::StreamBackpressure { .. }
        )
    }
}
