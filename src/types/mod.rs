pub mod linalg;

pub use linalg::*;

use std::fmt;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::{DetectResult, DetectionError};

// ─── Input ───────────────────────────────────────────────────────────────────

/// Unit the accelerometer columns are expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccelUnit {
    #[default]
    #[serde(rename = "g")]
    StandardGravity,
    #[serde(rename = "m/s^2")]
    MetersPerSecondSquared,
}

/// Uniformly sampled lower-back IMU recording.
///
/// Accelerometer in the unit given by `accel_unit`, gyroscope in rad/s.
/// Constructors validate shape, lengths, finiteness and sampling rate, so a
/// value of this type always has at least one sample.
#[derive(Clone, Debug)]
pub struct ImuRecording {
    accel: Vec<Vec3>,
    gyro: Vec<Vec3>,
    sampling_rate_hz: f64,
    accel_unit: AccelUnit,
}

impl ImuRecording {
    pub fn new(
        accel: Vec<Vec3>,
        gyro: Vec<Vec3>,
        sampling_rate_hz: f64,
        accel_unit: AccelUnit,
    ) -> DetectResult<Self> {
        if accel.len() != gyro.len() {
            return Err(DetectionError::LengthMismatch {
                accel: accel.len(),
                gyro: gyro.len(),
            });
        }
        if accel.is_empty() {
            return Err(DetectionError::EmptyRecording);
        }
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(DetectionError::InvalidSamplingRate(sampling_rate_hz));
        }
        if let Some(i) = accel
            .iter()
            .zip(gyro.iter())
            .position(|(a, g)| !a.iter().chain(g.iter()).all(|v| v.is_finite()))
        {
            return Err(DetectionError::NonFiniteSample(i));
        }

        Ok(Self {
            accel,
            gyro,
            sampling_rate_hz,
            accel_unit,
        })
    }

    /// Build from an `(N, 6)` matrix with columns `ax ay az gx gy gz`.
    pub fn from_array(
        data: ArrayView2<f64>,
        sampling_rate_hz: f64,
        accel_unit: AccelUnit,
    ) -> DetectResult<Self> {
        if data.ncols() != 6 {
            return Err(DetectionError::ColumnCount(data.ncols()));
        }
        let accel = data
            .rows()
            .into_iter()
            .map(|r| Vec3::new(r[0], r[1], r[2]))
            .collect();
        let gyro = data
            .rows()
            .into_iter()
            .map(|r| Vec3::new(r[3], r[4], r[5]))
            .collect();
        Self::new(accel, gyro, sampling_rate_hz, accel_unit)
    }

    /// Build from row-major samples, each row `[ax, ay, az, gx, gy, gz]`.
    pub fn from_rows(
        rows: &[Vec<f64>],
        sampling_rate_hz: f64,
        accel_unit: AccelUnit,
    ) -> DetectResult<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != 6) {
            return Err(DetectionError::ColumnCount(bad.len()));
        }
        let accel = rows.iter().map(|r| Vec3::new(r[0], r[1], r[2])).collect();
        let gyro = rows.iter().map(|r| Vec3::new(r[3], r[4], r[5])).collect();
        Self::new(accel, gyro, sampling_rate_hz, accel_unit)
    }

    /// Convert SI accelerometer data to g. No-op for data already in g.
    pub fn into_standard_gravity(mut self) -> Self {
        if self.accel_unit == AccelUnit::MetersPerSecondSquared {
            for a in self.accel.iter_mut() {
                *a /= GRAVITY;
            }
            self.accel_unit = AccelUnit::StandardGravity;
        }
        self
    }

    pub fn accel(&self) -> &[Vec3] { &self.accel }
    pub fn gyro(&self) -> &[Vec3] { &self.gyro }
    pub fn sampling_rate_hz(&self) -> f64 { self.sampling_rate_hz }
    pub fn accel_unit(&self) -> AccelUnit { self.accel_unit }
    pub fn dt(&self) -> f64 { 1.0 / self.sampling_rate_hz }
    pub fn len(&self) -> usize { self.accel.len() }
    pub fn is_empty(&self) -> bool { self.accel.is_empty() }
}

/// Serialized form of a recording: one `[ax, ay, az, gx, gy, gz]` row per
/// sample. `accel_units` defaults to g when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordingFile {
    pub sampling_rate_hz: f64,
    #[serde(default)]
    pub accel_units: AccelUnit,
    pub samples: Vec<Vec<f64>>,
}

impl RecordingFile {
    pub fn into_recording(self) -> DetectResult<ImuRecording> {
        ImuRecording::from_rows(&self.samples, self.sampling_rate_hz, self.accel_units)
    }
}

impl From<&ImuRecording> for RecordingFile {
    fn from(rec: &ImuRecording) -> Self {
        let samples = rec
            .accel
            .iter()
            .zip(&rec.gyro)
            .map(|(a, g)| vec![a.x, a.y, a.z, g.x, g.y, g.z])
            .collect();
        Self {
            sampling_rate_hz: rec.sampling_rate_hz,
            accel_units: rec.accel_unit,
            samples,
        }
    }
}

// ─── Intermediate results ────────────────────────────────────────────────────

/// Candidate postural transition, as sample indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateEvent {
    pub left: usize,
    pub peak: usize,
    pub right: usize,
}

/// Maximal non-stationary run. `start` is the last stationary sample before
/// the run (or 0), `end` is its last non-stationary sample (or N).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActiveSegment {
    pub start: usize,
    pub end: usize,
}

impl ActiveSegment {
    pub fn len(&self) -> usize { self.end.saturating_sub(self.start) }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    #[serde(rename = "sit-to-stand")]
    SitToStand,
    #[serde(rename = "stand-to-sit")]
    StandToSit,
    #[serde(rename = "NA")]
    Undetermined,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitionKind::SitToStand => "sit-to-stand",
            TransitionKind::StandToSit => "stand-to-sit",
            TransitionKind::Undetermined => "NA",
        };
        f.write_str(s)
    }
}

/// One detected postural transition (actual or attempt).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub onset: f64,
    pub peak_time: f64,
    pub duration: f64,
    pub event_type: TransitionKind,
    pub postural_transition_angle: f64,
    pub maximum_flexion_velocity: f64,
    pub maximum_extension_velocity: f64,
    pub vertical_displacement: f64,
    pub is_actual: bool,
    pub tracking_system: String,
    pub tracked_point: String,
}
