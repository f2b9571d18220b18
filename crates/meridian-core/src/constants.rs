//! Engine constants and tuning parameters.

// --- Physical ---

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Earth gravitational parameter (m³/s²).
pub const GM_EARTH: f64 = 3.986_004_418e14;

/// Sea-level speed of sound (m/s), used by the Doppler RCS term.
pub const SPEED_OF_SOUND_SEA_LEVEL: f64 = 340.29;

/// Sea-level standard air density (kg/m³).
pub const SEA_LEVEL_DENSITY: f64 = 1.225;

// --- State estimation ---

/// Observations older than the last applied sample by more than this
/// slack are dropped as stale (seconds).
pub const STALENESS_SLACK_SECS: f64 = 5.0;

/// Per-entity out-of-order observation buffer capacity.
pub const REORDER_BUFFER_CAPACITY: usize = 8;

/// Per-entity observation history ring capacity.
pub const OBSERVATION_HISTORY_CAPACITY: usize = 100;

// --- Planner ---

/// Candidate trajectories sampled per planning request.
pub const CANDIDATE_COUNT: usize = 16;

/// Smoothing may grow a trajectory to at most this multiple of its
/// original waypoint count.
pub const SMOOTHING_MAX_GROWTH: usize = 4;

/// Default lateral deviation radius for sampled intermediate waypoints
/// when the request does not constrain it (meters).
pub const DEFAULT_DEVIATION_RADIUS_M: f64 = 5_000.0;

// --- Intercept solver ---

/// Candidate flight-time scan granularity (seconds).
pub const INTERCEPT_SCAN_STEP_SECS: f64 = 1.0;

/// Time-of-flight scale in the intercept score: `min(1, 50/tof)`.
pub const INTERCEPT_TOF_SCALE_SECS: f64 = 50.0;

/// Closing-speed scale in the intercept score: `min(1, vc/500)`.
pub const INTERCEPT_CLOSING_SCALE_MPS: f64 = 500.0;

/// Flight-time scan horizon for intercept missions that carry no
/// explicit time budget (seconds).
pub const INTERCEPT_DEFAULT_HORIZON_SECS: f64 = 120.0;

/// Lambert time-of-flight convergence tolerance (seconds).
pub const LAMBERT_TOF_TOLERANCE_SECS: f64 = 1e-6;

/// Lambert Newton iteration cap.
pub const LAMBERT_MAX_ITERATIONS: usize = 100;

// --- Mission coordination ---

/// Monitor loop tick when no telemetry arrives (seconds).
pub const MONITOR_TICK_SECS: f64 = 1.0;

/// Dispatch retry backoff: base delay (milliseconds).
pub const DISPATCH_BACKOFF_BASE_MS: u64 = 500;

/// Dispatch retry backoff: multiplier per attempt.
pub const DISPATCH_BACKOFF_FACTOR: u32 = 2;

/// Dispatch retry backoff: cap (milliseconds).
pub const DISPATCH_BACKOFF_CAP_MS: u64 = 30_000;

/// Dispatch attempts before escalating to mission failure.
pub const DISPATCH_MAX_ATTEMPTS: u32 = 6;

/// Bounded backlog per mission-event subscriber; slow subscribers lose
/// their oldest events past this depth.
pub const EVENT_BACKLOG_CAPACITY: usize = 100;

// --- Integration broker ---

/// Bounded capacity for each external stream buffer.
pub const STREAM_CAPACITY: usize = 100;

/// Reconnect backoff shares the dispatch schedule.
pub const RECONNECT_BACKOFF_BASE_MS: u64 = DISPATCH_BACKOFF_BASE_MS;
pub const RECONNECT_BACKOFF_CAP_MS: u64 = DISPATCH_BACKOFF_CAP_MS;

// --- Swarm ---

/// Maximum robots per swarm.
pub const MAX_SWARM_SIZE: usize = 32;

/// Heartbeat monitor tick interval (seconds).
pub const HEARTBEAT_INTERVAL_SECS: f64 = 1.0;

/// A robot silent for strictly longer than this is marked offline (seconds).
pub const HEARTBEAT_TIMEOUT_SECS: f64 = 5.0;

/// Default spacing between formation slots (meters).
pub const FORMATION_SPACING_M: f64 = 50.0;

/// Minimum interval between corrective move commands per robot (seconds).
pub const REPOSITION_MIN_INTERVAL_SECS: f64 = 0.5;
