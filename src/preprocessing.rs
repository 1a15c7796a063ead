// preprocessing.rs: Signal helpers shared by every detection stage
//
// Norms, centered moving variance, and the trunk tilt angle obtained by
// integrating the medio-lateral gyroscope axis.

use crate::error::{DetectResult, DetectionError};
use crate::types::{AccelUnit, ImuRecording, Vec3};

/// Euclidean norm of every sample.
pub fn norms(samples: &[Vec3]) -> Vec<f64> {
    samples.iter().map(|v| v.norm()).collect()
}

/// Population variance over a centered window of `window` samples.
///
/// The window spans `window / 2` samples on each side and is truncated at the
/// recording edges, so the first and last outputs use fewer samples.
pub fn moving_variance(data: &[f64], window: usize) -> Vec<f64> {
    let n = data.len();
    let half = window / 2;

    // Prefix sums of x and x² make each window O(1)
    let mut sum = Vec::with_capacity(n + 1);
    let mut sum_sq = Vec::with_capacity(n + 1);
    sum.push(0.0);
    sum_sq.push(0.0);
    for &x in data {
        sum.push(sum[sum.len() - 1] + x);
        sum_sq.push(sum_sq[sum_sq.len() - 1] + x * x);
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            let k = (hi - lo) as f64;
            let mean = (sum[hi] - sum[lo]) / k;
            ((sum_sq[hi] - sum_sq[lo]) / k - mean * mean).max(0.0)
        })
        .collect()
}

/// Medio-lateral angular velocity (rad/s) for the given gyroscope axis.
pub fn medio_lateral_rate(gyro: &[Vec3], axis: usize) -> Vec<f64> {
    gyro.iter().map(|g| g[axis]).collect()
}

/// Trunk tilt (degrees) by cumulative integration of the medio-lateral rate.
///
/// Forward flexion produces negative medio-lateral rate, so the integral is
/// negated to make flexion a positive angle.
pub fn tilt_angle_deg(ml_rate: &[f64], dt: f64) -> Vec<f64> {
    ml_rate
        .iter()
        .scan(0.0, |acc, &w| {
            *acc -= w * dt;
            Some(acc.to_degrees())
        })
        .collect()
}

pub fn sine_of_degrees(angles: &[f64]) -> Vec<f64> {
    angles.iter().map(|a| a.to_radians().sin()).collect()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Enforce the accelerometer unit contract.
///
/// Data must be tagged as g, and its median norm must lie within
/// `plausible_g` (a body-worn sensor spends most of its time near 1 g).
pub fn check_units(recording: &ImuRecording, plausible_g: (f64, f64)) -> DetectResult<()> {
    if recording.accel_unit() != AccelUnit::StandardGravity {
        return Err(DetectionError::UnconvertedUnits);
    }
    let median_norm = median(&norms(recording.accel()));
    if median_norm < plausible_g.0 || median_norm > plausible_g.1 {
        log::warn!("median |accel| = {:.3}, outside {:?} g", median_norm, plausible_g);
        return Err(DetectionError::UnitMismatch { median_norm });
    }
    Ok(())
}

/// Per-recording signals derived once and shared by later stages.
#[derive(Clone, Debug)]
pub struct PreprocessedSignals {
    pub ml_rate: Vec<f64>,
    pub tilt_deg: Vec<f64>,
    pub tilt_sin: Vec<f64>,
    pub accel_norm: Vec<f64>,
    pub gyro_norm: Vec<f64>,
}

impl PreprocessedSignals {
    pub fn compute(recording: &ImuRecording, ml_axis: usize) -> Self {
        let ml_rate = medio_lateral_rate(recording.gyro(), ml_axis);
        let tilt_deg = tilt_angle_deg(&ml_rate, recording.dt());
        let tilt_sin = sine_of_degrees(&tilt_deg);
        Self {
            ml_rate,
            tilt_deg,
            tilt_sin,
            accel_norm: norms(recording.accel()),
            gyro_norm: norms(recording.gyro()),
        }
    }
}
