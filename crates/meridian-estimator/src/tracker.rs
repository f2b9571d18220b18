//! Per-entity track registry: ordered observation application, bounded
//! history, horizon prediction, and idle pruning.
//!
//! The estimator owns every filter; callers refer to entities by
//! identifier only. Observations pass through a small per-entity reorder
//! buffer so late arrivals within the staleness slack still apply in
//! timestamp order.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use meridian_core::constants::{
    OBSERVATION_HISTORY_CAPACITY, REORDER_BUFFER_CAPACITY, STALENESS_SLACK_SECS,
};
use meridian_core::enums::PayloadKind;
use meridian_core::error::{GuidanceError, Result};
use meridian_core::limits::limits_for;
use meridian_core::types::Vector3;

use crate::kalman::{Kalman9, ObservationModel};
use crate::matrix::{self, Matrix};

/// A measurement of a tracked entity. Which optional fields are present
/// selects the observation model; `noise` is the matching square
/// covariance, row-major.
#[derive(Debug, Clone)]
pub struct Observation {
    pub position: Vector3,
    pub velocity: Option<Vector3>,
    pub acceleration: Option<Vector3>,
    pub time_secs: f64,
    /// Measurement covariance, row-major, model.dim() × model.dim().
    pub noise: Vec<f64>,
}

impl Observation {
    /// Position-only fix with isotropic noise.
    pub fn position_fix(position: Vector3, time_secs: f64, sigma_m: f64) -> Self {
        let s2 = sigma_m * sigma_m;
        let mut noise = vec![0.0; 9];
        noise[0] = s2;
        noise[4] = s2;
        noise[8] = s2;
        Observation {
            position,
            velocity: None,
            acceleration: None,
            time_secs,
            noise,
        }
    }

    pub fn model(&self) -> ObservationModel {
        match (self.velocity.is_some(), self.acceleration.is_some()) {
            (true, true) => ObservationModel::Full,
            (true, false) => ObservationModel::PositionVelocity,
            _ => ObservationModel::PositionOnly,
        }
    }

    fn measurement(&self) -> Vec<f64> {
        let mut z = vec![self.position.x, self.position.y, self.position.z];
        if let Some(v) = self.velocity {
            z.extend([v.x, v.y, v.z]);
        }
        if let Some(a) = self.acceleration {
            z.extend([a.x, a.y, a.z]);
        }
        z
    }

    fn noise_matrix(&self) -> Option<Matrix> {
        let dim = self.model().dim();
        if self.noise.len() != dim * dim {
            return None;
        }
        Some(
            (0..dim)
                .map(|i| self.noise[i * dim..(i + 1) * dim].to_vec())
                .collect(),
        )
    }
}

/// One predicted sample along a horizon.
#[derive(Debug, Clone, Copy)]
pub struct PredictedState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub acceleration: Vector3,
    /// Position variance diagonal (m²).
    pub position_variance: [f64; 3],
    /// Confidence decaying with horizon as exp(−t/τ).
    pub confidence: f64,
    pub time_secs: f64,
}

struct EntityTrack {
    filter: Kalman9,
    kind: PayloadKind,
    /// Timestamp of the last observation applied to the filter.
    last_applied_secs: f64,
    /// Pending observations sorted by timestamp, capacity-bounded.
    pending: Vec<Observation>,
    history: VecDeque<Observation>,
    stale_dropped: u64,
}

impl EntityTrack {
    /// Apply the oldest pending observation to the filter.
    fn apply_oldest(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let obs = self.pending.remove(0);
        let dt = obs.time_secs - self.last_applied_secs;
        self.filter.predict(dt.max(0.0));

        if let Some(noise) = obs.noise_matrix() {
            if !self.filter.update(obs.model(), &obs.measurement(), &noise) {
                warn!(time = obs.time_secs, "singular innovation covariance, update skipped");
            }
        }
        self.last_applied_secs = obs.time_secs;
    }

    fn drain_pending(&mut self) {
        while !self.pending.is_empty() {
            self.apply_oldest();
        }
    }
}

/// The state estimator: one filter per tracked entity.
#[derive(Default)]
pub struct StateEstimator {
    tracks: HashMap<String, EntityTrack>,
}

impl StateEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a measurement to an entity's filter, creating the track on
    /// first contact. Observations older than the last applied sample by
    /// more than the staleness slack are dropped; out-of-order arrivals
    /// within the slack wait in the reorder buffer and apply in timestamp
    /// order.
    pub fn update_state(&mut self, id: &str, kind: PayloadKind, observation: Observation) -> Result<()> {
        // Validate the measurement covariance before anything else.
        let noise = observation.noise_matrix().ok_or_else(|| {
            GuidanceError::InvalidCovariance { entity: id.to_string() }
        })?;
        if !matrix::is_positive_semidefinite(&noise) {
            return Err(GuidanceError::InvalidCovariance { entity: id.to_string() });
        }

        let track = self.tracks.entry(id.to_string()).or_insert_with(|| {
            debug!(entity = id, ?kind, "initializing track");
            EntityTrack {
                filter: Kalman9::initialize(
                    observation.position,
                    observation.velocity.unwrap_or(Vector3::ZERO),
                    limits_for(kind).process_noise_accel,
                ),
                kind,
                last_applied_secs: observation.time_secs,
                pending: Vec::new(),
                history: VecDeque::new(),
                stale_dropped: 0,
            }
        });

        if observation.time_secs < track.last_applied_secs - STALENESS_SLACK_SECS {
            track.stale_dropped += 1;
            return Err(GuidanceError::StaleObservation {
                entity: id.to_string(),
                lag_secs: track.last_applied_secs - observation.time_secs,
            });
        }
        // Already passed by the filter and outside what the buffer can
        // reorder: drop rather than apply backwards.
        if observation.time_secs < track.last_applied_secs {
            track.stale_dropped += 1;
            return Err(GuidanceError::StaleObservation {
                entity: id.to_string(),
                lag_secs: track.last_applied_secs - observation.time_secs,
            });
        }

        if track.history.len() >= OBSERVATION_HISTORY_CAPACITY {
            track.history.pop_front();
        }
        track.history.push_back(observation.clone());

        // Insert sorted; equal timestamps keep arrival order.
        let idx = track
            .pending
            .partition_point(|o| o.time_secs <= observation.time_secs);
        track.pending.insert(idx, observation);

        // Release in order once the buffer is saturated.
        while track.pending.len() > REORDER_BUFFER_CAPACITY {
            track.apply_oldest();
        }
        Ok(())
    }

    /// Current best estimate for an entity, after draining any pending
    /// observations.
    pub fn current_estimate(&mut self, id: &str) -> Result<PredictedState> {
        let track = self
            .tracks
            .get_mut(id)
            .ok_or_else(|| GuidanceError::UnknownEntity(id.to_string()))?;
        track.drain_pending();
        Ok(PredictedState {
            position: track.filter.position(),
            velocity: track.filter.velocity(),
            acceleration: track.filter.acceleration(),
            position_variance: track.filter.position_variance(),
            confidence: 1.0,
            time_secs: track.last_applied_secs,
        })
    }

    /// Predict an entity forward over `horizon_secs` at regular
    /// sub-intervals. Confidence decays as exp(−t/τ) with τ from the
    /// entity kind.
    pub fn predict_trajectory(
        &mut self,
        id: &str,
        horizon_secs: f64,
        samples: usize,
    ) -> Result<Vec<PredictedState>> {
        let track = self
            .tracks
            .get_mut(id)
            .ok_or_else(|| GuidanceError::UnknownEntity(id.to_string()))?;
        track.drain_pending();

        let tau = limits_for(track.kind).predict_tau_secs;
        let samples = samples.max(1);
        let step = horizon_secs / samples as f64;

        let mut out = Vec::with_capacity(samples);
        let mut projected = track.filter.clone();
        for i in 1..=samples {
            projected.predict(step);
            let t = step * i as f64;
            out.push(PredictedState {
                position: projected.position(),
                velocity: projected.velocity(),
                acceleration: projected.acceleration(),
                position_variance: projected.position_variance(),
                confidence: (-t / tau).exp(),
                time_secs: track.last_applied_secs + t,
            });
        }
        Ok(out)
    }

    /// Most recent observations, newest last, bounded by `limit`.
    pub fn observation_history(&self, id: &str, limit: usize) -> Vec<Observation> {
        match self.tracks.get(id) {
            Some(track) => {
                let skip = track.history.len().saturating_sub(limit);
                track.history.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Count of observations dropped as stale for an entity.
    pub fn stale_dropped(&self, id: &str) -> u64 {
        self.tracks.get(id).map_or(0, |t| t.stale_dropped)
    }

    pub fn is_tracking(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    /// Drop entities with no observation for their kind's TTL. Returns the
    /// pruned identifiers.
    pub fn prune(&mut self, now_secs: f64) -> Vec<String> {
        let expired: Vec<String> = self
            .tracks
            .iter()
            .filter(|(_, t)| {
                let newest = t
                    .pending
                    .last()
                    .map(|o| o.time_secs)
                    .unwrap_or(t.last_applied_secs);
                now_secs - newest > limits_for(t.kind).observation_ttl_secs
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            debug!(entity = %id, "pruning idle track");
            self.tracks.remove(id);
        }
        expired
    }
}
