//! 9-state constant-acceleration Kalman filter.
//!
//! State vector: [x, y, z, vx, vy, vz, ax, ay, az]. The transition model
//! integrates acceleration into velocity and position; process noise is a
//! white-jerk model scaled by a per-kind spectral density so quiet orbital
//! tracks stay tight while maneuvering aircraft stay loose.

use meridian_core::types::Vector3;

use crate::matrix::{self, Matrix};

/// Which state components an observation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationModel {
    /// Position only (3 measurements).
    PositionOnly,
    /// Position and velocity (6 measurements).
    PositionVelocity,
    /// Full state (9 measurements).
    Full,
}

impl ObservationModel {
    pub fn dim(&self) -> usize {
        match self {
            ObservationModel::PositionOnly => 3,
            ObservationModel::PositionVelocity => 6,
            ObservationModel::Full => 9,
        }
    }

    /// Measurement matrix H (dim × 9): identity rows over the observed
    /// components.
    fn measurement_matrix(&self) -> Matrix {
        let dim = self.dim();
        let mut h = matrix::zeros(dim, 9);
        for (i, row) in h.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        h
    }
}

/// The filter: state estimate plus covariance.
#[derive(Debug, Clone)]
pub struct Kalman9 {
    /// State estimate [x, y, z, vx, vy, vz, ax, ay, az].
    pub state: [f64; 9],
    /// Covariance (9×9).
    pub covariance: Matrix,
    /// Process-noise acceleration spectral density (m²/s³).
    pub process_noise: f64,
}

impl Kalman9 {
    /// Initialize from a first position/velocity fix with broad covariance.
    pub fn initialize(position: Vector3, velocity: Vector3, process_noise: f64) -> Self {
        let state = [
            position.x, position.y, position.z, velocity.x, velocity.y, velocity.z, 0.0, 0.0, 0.0,
        ];
        let mut covariance = matrix::zeros(9, 9);
        for i in 0..3 {
            covariance[i][i] = 100.0; // position: 10 m sigma
            covariance[i + 3][i + 3] = 400.0; // velocity: 20 m/s sigma
            covariance[i + 6][i + 6] = 100.0; // acceleration: 10 m/s² sigma
        }
        Kalman9 {
            state,
            covariance,
            process_noise,
        }
    }

    pub fn position(&self) -> Vector3 {
        Vector3::new(self.state[0], self.state[1], self.state[2])
    }

    pub fn velocity(&self) -> Vector3 {
        Vector3::new(self.state[3], self.state[4], self.state[5])
    }

    pub fn acceleration(&self) -> Vector3 {
        Vector3::new(self.state[6], self.state[7], self.state[8])
    }

    /// Position variance diagonal (m²).
    pub fn position_variance(&self) -> [f64; 3] {
        [
            self.covariance[0][0],
            self.covariance[1][1],
            self.covariance[2][2],
        ]
    }

    /// Constant-acceleration transition matrix for a timestep.
    fn transition(dt: f64) -> Matrix {
        let mut f = matrix::identity(9);
        let half_dt2 = 0.5 * dt * dt;
        for axis in 0..3 {
            f[axis][axis + 3] = dt;
            f[axis][axis + 6] = half_dt2;
            f[axis + 3][axis + 6] = dt;
        }
        f
    }

    /// White-jerk process noise for a timestep, scaled by the spectral
    /// density.
    fn process_q(&self, dt: f64) -> Matrix {
        let q = self.process_noise;
        let dt2 = dt * dt;
        let dt3 = dt2 * dt;
        let dt4 = dt3 * dt;
        let dt5 = dt4 * dt;

        let mut m = matrix::zeros(9, 9);
        for axis in 0..3 {
            let (p, v, a) = (axis, axis + 3, axis + 6);
            m[p][p] = q * dt5 / 20.0;
            m[p][v] = q * dt4 / 8.0;
            m[p][a] = q * dt3 / 6.0;
            m[v][p] = q * dt4 / 8.0;
            m[v][v] = q * dt3 / 3.0;
            m[v][a] = q * dt2 / 2.0;
            m[a][p] = q * dt3 / 6.0;
            m[a][v] = q * dt2 / 2.0;
            m[a][a] = q * dt;
        }
        m
    }

    /// Time update: propagate state and covariance forward by `dt`.
    pub fn predict(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let f = Self::transition(dt);
        self.state = matrix::mul_vec(&f, &self.state)
            .try_into()
            .unwrap_or(self.state);
        let fp = matrix::mul(&f, &self.covariance);
        let fpft = matrix::mul(&fp, &matrix::transpose(&f));
        self.covariance = matrix::add(&fpft, &self.process_q(dt));
    }

    /// Measurement update. `measurement` must have `model.dim()` entries and
    /// `noise` must be the matching square covariance, already verified PSD
    /// by the caller. Returns false if the innovation covariance is
    /// singular (the update is skipped).
    pub fn update(&mut self, model: ObservationModel, measurement: &[f64], noise: &Matrix) -> bool {
        let h = model.measurement_matrix();
        let ht = matrix::transpose(&h);

        // Innovation y = z − Hx
        let hx = matrix::mul_vec(&h, &self.state);
        let innovation: Vec<f64> = measurement.iter().zip(&hx).map(|(z, p)| z - p).collect();

        // S = H P Hᵀ + R
        let ph_t = matrix::mul(&self.covariance, &ht);
        let s = matrix::add(&matrix::mul(&h, &ph_t), noise);
        let s_inv = match matrix::invert(&s) {
            Some(inv) => inv,
            None => return false,
        };

        // K = P Hᵀ S⁻¹
        let k = matrix::mul(&ph_t, &s_inv);

        // x ← x + K y
        let correction = matrix::mul_vec(&k, &innovation);
        for (xi, c) in self.state.iter_mut().zip(&correction) {
            *xi += c;
        }

        // P ← (I − K H) P
        let kh = matrix::mul(&k, &h);
        let i_kh = matrix::sub(&matrix::identity(9), &kh);
        self.covariance = matrix::mul(&i_kh, &self.covariance);
        true
    }

    /// Predicted state at `dt` ahead without mutating the filter.
    pub fn predicted(&self, dt: f64) -> Kalman9 {
        let mut clone = self.clone();
        clone.predict(dt);
        clone
    }
}
