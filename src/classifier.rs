// classifier.rs: Actual-vs-attempt decision and per-transition features

use crate::detector::DetectorConfig;
use crate::types::{CandidateEvent, TransitionKind, TransitionRecord};

/// Round to two decimals, ties to even.
fn round_cm(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

fn max_abs_deg(rate: &[f64]) -> f64 {
    rate.iter().fold(0.0f64, |m, r| m.max(r.abs())).to_degrees()
}

pub struct TransitionClassifier<'a> {
    config: &'a DetectorConfig,
    sampling_rate_hz: f64,
}

impl<'a> TransitionClassifier<'a> {
    pub fn new(config: &'a DetectorConfig, sampling_rate_hz: f64) -> Self {
        Self {
            config,
            sampling_rate_hz,
        }
    }

    /// Rounded vertical displacement between the candidate's boundaries.
    pub fn displacement(&self, vertical_position: &[f64], c: &CandidateEvent) -> f64 {
        round_cm(vertical_position[c.right] - vertical_position[c.left])
    }

    pub fn is_actual(&self, displacement: f64) -> bool {
        let d = displacement.abs();
        d > self.config.min_vertical_displacement_m && d < self.config.max_vertical_displacement_m
    }

    /// Classify one candidate. `index` is its position in the candidate list;
    /// the first candidate anchored at sample 0 measures its angle against
    /// the right boundary instead.
    pub fn classify(
        &self,
        index: usize,
        candidate: &CandidateEvent,
        vertical_position: &[f64],
        tilt_deg: &[f64],
        ml_rate: &[f64],
    ) -> TransitionRecord {
        let CandidateEvent { left, peak, right } = *candidate;
        let fs = self.sampling_rate_hz;

        let displacement = self.displacement(vertical_position, candidate);
        let is_actual = self.is_actual(displacement);
        let event_type = if !is_actual || displacement == 0.0 {
            TransitionKind::Undetermined
        } else if displacement > 0.0 {
            TransitionKind::SitToStand
        } else {
            TransitionKind::StandToSit
        };

        let angle_ref = if index == 0 && left == 0 { right } else { left };
        let angle = (tilt_deg[peak] - tilt_deg[angle_ref]).abs();

        TransitionRecord {
            onset: left as f64 / fs,
            peak_time: peak as f64 / fs,
            duration: (right - left) as f64 / fs,
            event_type,
            postural_transition_angle: angle,
            maximum_flexion_velocity: max_abs_deg(&ml_rate[left..peak]),
            maximum_extension_velocity: max_abs_deg(&ml_rate[peak..right]),
            vertical_displacement: displacement,
            is_actual,
            tracking_system: self.config.tracking_system.clone(),
            tracked_point: self.config.tracked_point.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_position(n: usize, from: usize, to: usize, rise: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                if i <= from {
                    0.0
                } else if i >= to {
                    rise
                } else {
                    rise * (i - from) as f64 / (to - from) as f64
                }
            })
            .collect()
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_cm(0.454), 0.45);
        assert_eq!(round_cm(-0.456), -0.46);
        assert_eq!(round_cm(0.099), 0.1);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let cfg = DetectorConfig::default();
        let c = TransitionClassifier::new(&cfg, 100.0);
        assert!(!c.is_actual(0.1));
        assert!(c.is_actual(0.11));
        assert!(c.is_actual(-0.99));
        assert!(!c.is_actual(1.0));
        assert!(!c.is_actual(-1.3));
        assert!(!c.is_actual(0.0));
    }

    #[test]
    fn test_classify_features() {
        let cfg = DetectorConfig::default();
        let c = TransitionClassifier::new(&cfg, 100.0);
        let n = 400;
        let pos = ramp_position(n, 100, 220, 0.45);
        let tilt: Vec<f64> = (0..n).map(|i| if (100..160).contains(&i) { (i - 100) as f64 } else { 0.0 }).collect();
        let mut rate = vec![0.0; n];
        rate[120] = -1.0;
        rate[180] = 0.5;

        let cand = CandidateEvent { left: 100, peak: 159, right: 220 };
        let rec = c.classify(1, &cand, &pos, &tilt, &rate);

        assert_eq!(rec.event_type, TransitionKind::SitToStand);
        assert!(rec.is_actual);
        assert!((rec.vertical_displacement - 0.45).abs() < 1e-12);
        assert!((rec.onset - 1.0).abs() < 1e-12);
        assert!((rec.peak_time - 1.59).abs() < 1e-12);
        assert!((rec.duration - 1.2).abs() < 1e-12);
        assert!((rec.postural_transition_angle - 59.0).abs() < 1e-12);
        assert!((rec.maximum_flexion_velocity - 1f64.to_degrees()).abs() < 1e-9);
        assert!((rec.maximum_extension_velocity - 0.5f64.to_degrees()).abs() < 1e-9);
        assert_eq!(rec.tracking_system, "imu");
        assert_eq!(rec.tracked_point, "LowerBack");
    }

    #[test]
    fn test_first_candidate_at_start_uses_right_for_angle() {
        let cfg = DetectorConfig::default();
        let c = TransitionClassifier::new(&cfg, 100.0);
        let pos = ramp_position(300, 150, 250, -0.3);
        let mut tilt = vec![10.0; 300];
        tilt[50] = 40.0;
        tilt[299] = 5.0;
        let rate = vec![0.0; 300];

        let cand = CandidateEvent { left: 0, peak: 50, right: 299 };
        let rec = c.classify(0, &cand, &pos, &tilt, &rate);
        assert_eq!(rec.event_type, TransitionKind::StandToSit);
        assert!((rec.postural_transition_angle - 35.0).abs() < 1e-12);

        // the same candidate later in the list measures against the left side
        let rec = c.classify(2, &cand, &pos, &tilt, &rate);
        assert!((rec.postural_transition_angle - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_attempt_is_undetermined() {
        let cfg = DetectorConfig::default();
        let c = TransitionClassifier::new(&cfg, 100.0);
        let pos = ramp_position(300, 100, 200, 0.05);
        let cand = CandidateEvent { left: 90, peak: 150, right: 210 };
        let rec = c.classify(0, &cand, &pos, &vec![0.0; 300], &vec![0.0; 300]);
        assert!(!rec.is_actual);
        assert_eq!(rec.event_type, TransitionKind::Undetermined);
        assert!((rec.vertical_displacement - 0.05).abs() < 1e-12);
    }
}
