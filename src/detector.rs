// detector.rs: Whole-recording postural transition detection
//
// Orchestrates the pipeline under one immutable configuration:
//   preprocess → wavelet candidates → stationarity → attitude → ZUPT
//   position → classification
//
// Nothing here keeps state between calls; each recording gets a freshly
// initialised attitude filter.

use serde::{Deserialize, Serialize};

use crate::classifier::TransitionClassifier;
use crate::error::{DetectResult, DetectionError};
use crate::events::{RightBoundaryPolicy, WaveletEventDetector};
use crate::filters::ahrs::{mean_stationary_accel, AhrsConfig, AttitudeEstimator};
use crate::kinematics::KinematicIntegrator;
use crate::preprocessing::{check_units, PreprocessedSignals};
use crate::stationarity::{active_segments, check_initial_stationary, stationary_mask};
use crate::types::{ActiveSegment, CandidateEvent, ImuRecording, TransitionRecord};
use crate::wavelet::WaveletFilter;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    // ── Input contract ──
    /// Gyroscope axis aligned with the medio-lateral direction
    pub ml_axis: usize,
    pub min_median_accel_g: f64,
    pub max_median_accel_g: f64,

    // ── Stationarity ──
    pub accel_dynamic_threshold_g: f64,
    pub accel_variance_threshold: f64,
    pub gyro_variance_threshold: f64,
    pub variance_window_s: f64,
    pub init_period_fraction: f64,
    pub min_init_stationary_samples: usize,

    // ── Attitude filter ──
    pub ahrs_init_gain: f64,
    pub ahrs_init_iterations: usize,
    pub ahrs_stationary_gain: f64,
    pub ahrs_moving_gain: f64,

    // ── Candidate detection ──
    pub wavelet: WaveletFilter,
    pub shallow_level: u32,
    pub deep_level: u32,
    pub peak_min_height: f64,
    pub peak_min_prominence: f64,
    pub min_boundary_gap_s: f64,
    pub right_boundary: RightBoundaryPolicy,

    // ── Classification ──
    pub min_vertical_displacement_m: f64,
    pub max_vertical_displacement_m: f64,
    pub tracking_system: String,
    pub tracked_point: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ml_axis: 1,
            min_median_accel_g: 0.5,
            max_median_accel_g: 1.5,
            accel_dynamic_threshold_g: 0.05,
            accel_variance_threshold: 1e-2,
            gyro_variance_threshold: 1e-2,
            variance_window_s: 1.0,
            init_period_fraction: 0.1,
            min_init_stationary_samples: 200,
            ahrs_init_gain: 1.0,
            ahrs_init_iterations: 200,
            ahrs_stationary_gain: 2.0,
            ahrs_moving_gain: 0.0,
            wavelet: WaveletFilter::Coif5,
            shallow_level: 3,
            deep_level: 10,
            peak_min_height: 0.1,
            peak_min_prominence: 0.1,
            min_boundary_gap_s: 0.25,
            right_boundary: RightBoundaryPolicy::RecordingEnd,
            min_vertical_displacement_m: 0.1,
            max_vertical_displacement_m: 1.0,
            tracking_system: "imu".to_string(),
            tracked_point: "LowerBack".to_string(),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> DetectResult<()> {
        let fail = |msg: String| Err(DetectionError::InvalidConfig(msg));

        if self.ml_axis > 2 {
            return fail(format!("ml_axis must be 0, 1 or 2, got {}", self.ml_axis));
        }
        if !(self.min_median_accel_g < self.max_median_accel_g) {
            return fail("min_median_accel_g must be below max_median_accel_g".into());
        }
        let positive = [
            ("accel_dynamic_threshold_g", self.accel_dynamic_threshold_g),
            ("accel_variance_threshold", self.accel_variance_threshold),
            ("gyro_variance_threshold", self.gyro_variance_threshold),
            ("variance_window_s", self.variance_window_s),
        ];
        if let Some((name, v)) = positive.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return fail(format!("{} must be positive, got {}", name, v));
        }
        if !(self.init_period_fraction > 0.0 && self.init_period_fraction <= 1.0) {
            return fail(format!(
                "init_period_fraction must be in (0, 1], got {}",
                self.init_period_fraction
            ));
        }
        if self.min_init_stationary_samples == 0 {
            return fail("min_init_stationary_samples must be at least 1".into());
        }
        if self.shallow_level == 0 || self.shallow_level >= self.deep_level {
            return fail(format!(
                "wavelet levels must satisfy 0 < shallow < deep, got {} and {}",
                self.shallow_level, self.deep_level
            ));
        }
        if self.deep_level > 20 {
            return fail(format!("deep_level {} is too large", self.deep_level));
        }
        if self.min_boundary_gap_s < 0.0 {
            return fail("min_boundary_gap_s must not be negative".into());
        }
        if !(self.min_vertical_displacement_m >= 0.0
            && self.min_vertical_displacement_m < self.max_vertical_displacement_m)
        {
            return fail("vertical displacement range is empty".into());
        }
        Ok(())
    }

    pub fn ahrs_config(&self) -> AhrsConfig {
        AhrsConfig {
            init_gain: self.ahrs_init_gain,
            init_iterations: self.ahrs_init_iterations,
            stationary_gain: self.ahrs_stationary_gain,
            moving_gain: self.ahrs_moving_gain,
        }
    }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Everything the pipeline produced for one recording.
///
/// When no candidate was found the attitude and position stages are skipped
/// and `vertical_position` / `segments` are empty.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DetectionReport {
    pub tilt_deg: Vec<f64>,
    pub band: Vec<f64>,
    pub stationary: Vec<bool>,
    pub segments: Vec<ActiveSegment>,
    pub candidates: Vec<CandidateEvent>,
    pub vertical_position: Vec<f64>,
    /// Actual transitions in time order
    pub transitions: Vec<TransitionRecord>,
    /// Candidates rejected on vertical displacement
    pub attempts: Vec<TransitionRecord>,
}

// ─── Detector ────────────────────────────────────────────────────────────────

pub struct TransitionDetector {
    config: DetectorConfig,
}

impl TransitionDetector {
    pub fn new(config: DetectorConfig) -> DetectResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Actual transitions only, in time order.
    pub fn detect(&self, recording: &ImuRecording) -> DetectResult<Vec<TransitionRecord>> {
        Ok(self.analyze(recording)?.transitions)
    }

    pub fn analyze(&self, recording: &ImuRecording) -> DetectResult<DetectionReport> {
        let cfg = &self.config;
        check_units(recording, (cfg.min_median_accel_g, cfg.max_median_accel_g))?;

        let fs = recording.sampling_rate_hz();
        let dt = recording.dt();
        let signals = PreprocessedSignals::compute(recording, cfg.ml_axis);

        let detection = WaveletEventDetector::new(cfg).detect(&signals.tilt_sin, &signals.ml_rate, fs);
        let stationary = stationary_mask(&signals.accel_norm, &signals.gyro_norm, fs, cfg);
        log::debug!(
            "{} of {} samples stationary",
            stationary.iter().filter(|&&m| m).count(),
            stationary.len()
        );

        let mut report = DetectionReport {
            tilt_deg: signals.tilt_deg.clone(),
            band: detection.band,
            stationary,
            candidates: detection.candidates,
            ..DetectionReport::default()
        };
        let window = check_initial_stationary(
            &report.stationary,
            cfg.init_period_fraction,
            cfg.min_init_stationary_samples,
        )?;
        if report.candidates.is_empty() {
            log::info!("no candidate transitions found");
            return Ok(report);
        }

        // ── Attitude ──
        let gravity = mean_stationary_accel(recording.accel(), &report.stationary, window)
            .ok_or(DetectionError::InsufficientInitialStationary {
                found: 0,
                required: cfg.min_init_stationary_samples,
                window,
            })?;
        let estimator = AttitudeEstimator::new(cfg.ahrs_config());
        let initial = estimator.converge(&gravity, dt);
        let attitudes = estimator.estimate(
            initial,
            recording.accel(),
            recording.gyro(),
            &report.stationary,
            dt,
        );

        // ── Position ──
        report.segments = active_segments(&report.stationary);
        log::debug!("{} active segments", report.segments.len());
        let position = KinematicIntegrator::new(dt).position(
            &attitudes,
            recording.accel(),
            &report.stationary,
            &report.segments,
        );
        report.vertical_position = position.iter().map(|p| p.z).collect();

        // ── Classification ──
        let classifier = TransitionClassifier::new(cfg, fs);
        for (i, c) in report.candidates.iter().enumerate() {
            let record = classifier.classify(
                i,
                c,
                &report.vertical_position,
                &signals.tilt_deg,
                &signals.ml_rate,
            );
            if record.is_actual {
                report.transitions.push(record);
            } else {
                log::debug!(
                    "candidate at {:.2}s rejected, vertical displacement {:.2} m",
                    record.peak_time,
                    record.vertical_displacement
                );
                report.attempts.push(record);
            }
        }

        log::info!(
            "{} postural transitions, {} attempts",
            report.transitions.len(),
            report.attempts.len()
        );
        Ok(report)
    }
}
