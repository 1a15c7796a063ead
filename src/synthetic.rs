//! Synthetic lower-back recordings for tests.
//!
//! A transition is a full-sine vertical acceleration pulse (rest to rest,
//! net displacement `displacement_m`) together with a full-sine flexion /
//! extension pulse on the medio-lateral gyro axis whose peak tilt is
//! `flexion_deg`. The accelerometer follows the integrated pitch so gravity
//! stays consistent with the gyro.

use std::f64::consts::PI;

use crate::types::{AccelUnit, ImuRecording, Vec3, GRAVITY};

#[derive(Clone, Copy, Debug)]
pub struct SyntheticMotion {
    pub start_s: f64,
    pub duration_s: f64,
    pub displacement_m: f64,
    pub flexion_deg: f64,
}

impl SyntheticMotion {
    pub fn new(start_s: f64, duration_s: f64, displacement_m: f64, flexion_deg: f64) -> Self {
        Self {
            start_s,
            duration_s,
            displacement_m,
            flexion_deg,
        }
    }
}

/// Alternating gyro offset so the rate is never exactly zero (keeps zero
/// crossings well defined during rest).
const DITHER: f64 = 1e-3;

pub fn recording(duration_s: f64, sampling_rate_hz: f64, motions: &[SyntheticMotion]) -> ImuRecording {
    let n = (duration_s * sampling_rate_hz).round() as usize;
    let dt = 1.0 / sampling_rate_hz;
    let mut vertical = vec![0.0; n];
    let mut pitch_rate = vec![0.0; n];

    for m in motions {
        let i0 = (m.start_s * sampling_rate_hz).round() as usize;
        let k = (m.duration_s * sampling_rate_hz).round() as usize;
        let accel_amp = 2.0 * PI * m.displacement_m / (m.duration_s * m.duration_s);
        let rate_amp = m.flexion_deg.to_radians() * PI / m.duration_s;
        for j in 0..=k {
            let phase = (2.0 * PI * j as f64 / k as f64).sin();
            vertical[i0 + j] += accel_amp * phase;
            pitch_rate[i0 + j] -= rate_amp * phase;
        }
    }

    let mut accel = Vec::with_capacity(n);
    let mut gyro = Vec::with_capacity(n);
    let mut pitch = 0.0f64;
    for i in 0..n {
        let g = pitch_rate[i] + if i % 2 == 0 { DITHER } else { -DITHER };
        pitch += 2.0 * (g * dt / 2.0).atan();
        let c = 1.0 + vertical[i] / GRAVITY;
        accel.push(Vec3::new(-c * pitch.sin(), 0.0, c * pitch.cos()));
        gyro.push(Vec3::new(0.0, g, 0.0));
    }

    ImuRecording::new(accel, gyro, sampling_rate_hz, AccelUnit::StandardGravity)
        .expect("synthetic recording is valid")
}
