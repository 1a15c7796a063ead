// stationarity.rs: Stationary-period mask for ZUPT and attitude gain scheduling

use crate::detector::DetectorConfig;
use crate::error::{DetectResult, DetectionError};
use crate::preprocessing::moving_variance;
use crate::types::ActiveSegment;

/// Per-sample stationary mask from accelerometer and gyroscope norms.
///
/// A sample is stationary when all three hold:
///   - dynamic acceleration `| |a| - 1 g |` is below `accel_dynamic_threshold_g`
///   - moving variance of |a| is at most `accel_variance_threshold`
///   - moving variance of |ω| is at most `gyro_variance_threshold`
///
/// The combined mask is debounced once (see [`debounce`]).
pub fn stationary_mask(
    accel_norm: &[f64],
    gyro_norm: &[f64],
    sampling_rate_hz: f64,
    config: &DetectorConfig,
) -> Vec<bool> {
    let window = ((config.variance_window_s * sampling_rate_hz).round() as usize).max(1);
    let accel_var = moving_variance(accel_norm, window);
    let gyro_var = moving_variance(gyro_norm, window);

    let mut mask: Vec<bool> = (0..accel_norm.len())
        .map(|i| {
            (accel_norm[i] - 1.0).abs() < config.accel_dynamic_threshold_g
                && accel_var[i] <= config.accel_variance_threshold
                && gyro_var[i] <= config.gyro_variance_threshold
        })
        .collect();

    debounce(&mut mask);
    mask
}

/// Single forward pass: a stationary sample followed by a non-stationary one
/// becomes non-stationary. Each step reads the already-updated mask.
pub fn debounce(mask: &mut [bool]) {
    for i in 0..mask.len().saturating_sub(1) {
        if mask[i] && !mask[i + 1] {
            mask[i] = false;
        }
    }
}

/// Count stationary samples in the initial window and fail if too few.
///
/// A window that is stationary throughout passes even when it is shorter than
/// `required` (short recordings). Returns the window length on success.
pub fn check_initial_stationary(
    mask: &[bool],
    init_fraction: f64,
    required: usize,
) -> DetectResult<usize> {
    let window = ((init_fraction * mask.len() as f64).floor() as usize).min(mask.len());
    let found = mask[..window].iter().filter(|&&m| m).count();
    log::debug!("initial window: {} of {} samples stationary", found, window);

    if found < required && found < window {
        log::warn!(
            "not enough stationary data at start ({} < {}), cannot initialise attitude",
            found,
            required
        );
        return Err(DetectionError::InsufficientInitialStationary {
            found,
            required,
            window,
        });
    }
    Ok(window)
}

/// Non-stationary runs delimited by mask transitions.
///
/// Starts are the last stationary sample before motion, ends the last moving
/// sample. A recording that starts moving gets start 0; one that ends moving
/// gets end `N`. Unmatched transitions are dropped.
pub fn active_segments(mask: &[bool]) -> Vec<ActiveSegment> {
    let n = mask.len();
    if n == 0 {
        return Vec::new();
    }

    let mut starts: Vec<usize> = Vec::new();
    let mut ends: Vec<usize> = Vec::new();
    if !mask[0] {
        starts.push(0);
    }
    for i in 0..n - 1 {
        match (mask[i], mask[i + 1]) {
            (true, false) => starts.push(i),
            (false, true) => ends.push(i),
            _ => {}
        }
    }
    if !mask[n - 1] {
        ends.push(n);
    }

    starts
        .into_iter()
        .zip(ends)
        .map(|(start, end)| ActiveSegment { start, end })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_property() {
        let mut mask = vec![
            true, true, false, true, false, false, true, true, true, false, true,
        ];
        let original = mask.clone();
        debounce(&mut mask);
        for i in 0..mask.len() - 1 {
            if original[i] && !original[i + 1] {
                assert!(!mask[i], "sample {} should be cleared", i);
            }
        }
        assert_eq!(
            mask,
            vec![true, false, false, false, false, false, true, true, false, false, true]
        );
    }

    #[test]
    fn test_debounce_keeps_trailing_sample() {
        let mut mask = vec![false, true];
        debounce(&mut mask);
        assert_eq!(mask, vec![false, true]);
    }

    #[test]
    fn test_mask_on_quiet_and_moving_signal() {
        let fs = 100.0;
        let mut accel = vec![1.0; 600];
        for (i, a) in accel.iter_mut().enumerate().skip(250).take(100) {
            *a = 1.0 + 0.5 * (i as f64 * 0.3).sin();
        }
        let gyro = vec![0.0; 600];
        let mask = stationary_mask(&accel, &gyro, fs, &DetectorConfig::default());

        assert!(mask[..150].iter().all(|&m| m));
        assert!(mask[260..340].iter().all(|&m| !m));
        assert!(mask[500..].iter().all(|&m| m));
    }

    #[test]
    fn test_initial_gate() {
        let mut mask = vec![false; 3000];
        for m in mask.iter_mut().take(250) {
            *m = true;
        }
        assert_eq!(check_initial_stationary(&mask, 0.1, 200), Ok(300));

        let err = check_initial_stationary(&mask[..1000], 0.1, 200).unwrap_err();
        assert_eq!(
            err,
            DetectionError::InsufficientInitialStationary {
                found: 100,
                required: 200,
                window: 100
            }
        );
    }

    #[test]
    fn test_initial_gate_short_quiet_window() {
        // 20-sample window, all stationary, below the 200 requirement
        assert_eq!(check_initial_stationary(&[true; 200], 0.1, 200), Ok(20));

        let mut mask = vec![true; 200];
        mask[5] = false;
        assert!(matches!(
            check_initial_stationary(&mask, 0.1, 200),
            Err(DetectionError::InsufficientInitialStationary { found: 19, window: 20, .. })
        ));
    }

    #[test]
    fn test_segments_interior() {
        let mask = [true, true, false, false, true, true, false, true];
        let segs = active_segments(&mask);
        assert_eq!(
            segs,
            vec![
                ActiveSegment { start: 1, end: 3 },
                ActiveSegment { start: 5, end: 6 },
            ]
        );
    }

    #[test]
    fn test_segments_at_edges() {
        let mask = [false, false, true, true, false, false];
        let segs = active_segments(&mask);
        assert_eq!(
            segs,
            vec![
                ActiveSegment { start: 0, end: 1 },
                ActiveSegment { start: 3, end: 6 },
            ]
        );
    }

    #[test]
    fn test_segments_none_when_all_stationary() {
        assert!(active_segments(&[true; 20]).is_empty());
    }
}
