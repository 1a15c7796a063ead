// ahrs.rs: Gravity-aided attitude filter (proportional feedback on the
// accelerometer gravity direction, gyro integration in between)
//
// The quaternion maps body to global frame: v_global = q * v_body * q⁻¹.
// The filter is a pure step function; a whole recording is a fold over it.

use nalgebra::Quaternion;

use crate::types::{Quat, Vec3};

#[derive(Clone, Debug)]
pub struct AhrsConfig {
    /// Feedback gain used while converging on the initial attitude
    pub init_gain: f64,
    /// Iterations of the initial convergence loop
    pub init_iterations: usize,
    /// Feedback gain on stationary samples
    pub stationary_gain: f64,
    /// Feedback gain while moving (0 = pure gyro integration)
    pub moving_gain: f64,
}

impl Default for AhrsConfig {
    fn default() -> Self {
        Self {
            init_gain: 1.0,
            init_iterations: 200,
            stationary_gain: 2.0,
            moving_gain: 0.0,
        }
    }
}

/// One filter update.
///
/// Estimates gravity in the body frame from `q`, takes the cross product with
/// the measured (normalized) acceleration as the attitude error, subtracts
/// `gain * error` from the angular rate and integrates one Euler step. A zero
/// accelerometer reading skips the correction.
pub fn step(q: &Quat, accel: &Vec3, gyro: &Vec3, gain: f64, dt: f64) -> Quat {
    let mut rate = *gyro;

    let norm = accel.norm();
    if norm > 0.0 {
        let a = accel / norm;
        let (w, x, y, z) = (q.w, q.i, q.j, q.k);
        let v = Vec3::new(
            2.0 * (x * z - w * y),
            2.0 * (w * x + y * z),
            w * w - x * x - y * y + z * z,
        );
        rate -= v.cross(&a) * gain;
    }

    let q_dot = q.quaternion() * Quaternion::from_imag(rate) * 0.5;
    Quat::new_normalize(q.quaternion() + q_dot * dt)
}

/// Mean accelerometer reading over stationary samples of `accel[..window]`.
pub fn mean_stationary_accel(accel: &[Vec3], mask: &[bool], window: usize) -> Option<Vec3> {
    let (sum, count) = accel
        .iter()
        .zip(mask)
        .take(window)
        .filter(|(_, m)| **m)
        .fold((Vec3::zeros(), 0usize), |(s, c), (a, _)| (s + a, c + 1));
    (count > 0).then(|| sum / count as f64)
}

pub struct AttitudeEstimator {
    config: AhrsConfig,
}

impl AttitudeEstimator {
    pub fn new(config: AhrsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AhrsConfig {
        &self.config
    }

    /// Initial attitude from a static gravity reading, starting at identity.
    pub fn converge(&self, gravity_reading: &Vec3, dt: f64) -> Quat {
        let zero = Vec3::zeros();
        (0..self.config.init_iterations).fold(Quat::identity(), |q, _| {
            step(&q, gravity_reading, &zero, self.config.init_gain, dt)
        })
    }

    /// Attitude for every sample, gain switched on the stationary mask.
    pub fn estimate(
        &self,
        initial: Quat,
        accel: &[Vec3],
        gyro: &[Vec3],
        stationary: &[bool],
        dt: f64,
    ) -> Vec<Quat> {
        accel
            .iter()
            .zip(gyro)
            .zip(stationary)
            .scan(initial, |q, ((a, g), &still)| {
                let gain = if still {
                    self.config.stationary_gain
                } else {
                    self.config.moving_gain
                };
                *q = step(q, a, g, gain, dt);
                Some(*q)
            })
            .collect()
    }
}

/// Rotate each vector by its own sample's attitude (body → global).
pub fn rotate_sequence(attitudes: &[Quat], vectors: &[Vec3]) -> Vec<Vec3> {
    attitudes.iter().zip(vectors).map(|(q, v)| q * v).collect()
}
