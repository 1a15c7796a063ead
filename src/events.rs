// events.rs: Candidate transitions from the band-passed tilt signal
//
// Peaks of the wavelet band mark the moment of maximum trunk tilt. Each peak
// is bracketed by zero crossings of the medio-lateral angular rate, where
// flexion starts (left) and extension ends (right).

use serde::{Deserialize, Serialize};

use crate::detector::DetectorConfig;
use crate::types::CandidateEvent;
use crate::wavelet::band_between;

/// How the end of a candidate transition is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RightBoundaryPolicy {
    /// Final sample of the recording for every candidate.
    #[default]
    RecordingEnd,
    /// First negative-slope zero crossing more than the minimum gap after
    /// the peak, or the final sample if there is none.
    ZeroCrossing,
}

// ─── Peaks ───────────────────────────────────────────────────────────────────

/// Local maxima, plateaus resolved to their midpoint. The first and last
/// samples are never peaks.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let n = x.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }

    let mut i = 1;
    while i < n - 1 {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Vertical distance from a peak down to the higher of the two lowest points
/// reachable on either side before the signal rises above the peak.
pub fn prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let left_min = x[..=peak]
        .iter()
        .rev()
        .take_while(|&&v| v <= height)
        .fold(height, |m, &v| m.min(v));
    let right_min = x[peak..]
        .iter()
        .take_while(|&&v| v <= height)
        .fold(height, |m, &v| m.min(v));

    height - left_min.max(right_min)
}

/// Peaks whose height and prominence both reach the given minimums.
pub fn find_peaks(x: &[f64], min_height: f64, min_prominence: f64) -> Vec<usize> {
    local_maxima(x)
        .into_iter()
        .filter(|&p| x[p] >= min_height && prominence(x, p) >= min_prominence)
        .collect()
}

// ─── Zero crossings and boundaries ───────────────────────────────────────────

/// Indices `i` where the signal changes sign between `i` and `i + 1`.
pub fn zero_crossings(x: &[f64]) -> Vec<usize> {
    x.windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] * w[1] < 0.0)
        .map(|(i, _)| i)
        .collect()
}

fn falling(x: &[f64], crossing: usize) -> bool {
    x[crossing + 1] - x[crossing] < 0.0
}

/// Most recent falling crossing more than `min_gap` samples before the peak.
pub fn left_boundary(rate: &[f64], crossings: &[usize], peak: usize, min_gap: usize) -> usize {
    crossings
        .iter()
        .rev()
        .filter(|&&c| c < peak)
        .find(|&&c| falling(rate, c) && peak - c > min_gap)
        .copied()
        .unwrap_or(0)
}

/// End of the candidate according to `policy`.
pub fn right_boundary(
    rate: &[f64],
    crossings: &[usize],
    peak: usize,
    min_gap: usize,
    policy: RightBoundaryPolicy,
) -> usize {
    let last = rate.len().saturating_sub(1);
    match policy {
        RightBoundaryPolicy::RecordingEnd => last,
        RightBoundaryPolicy::ZeroCrossing => crossings
            .iter()
            .filter(|&&c| c > peak)
            .find(|&&c| falling(rate, c) && c - peak > min_gap)
            .copied()
            .unwrap_or(last),
    }
}

/// Output of the candidate stage, kept for diagnostics.
#[derive(Clone, Debug, Default)]
pub struct CandidateDetection {
    pub band: Vec<f64>,
    pub candidates: Vec<CandidateEvent>,
}

pub struct WaveletEventDetector<'a> {
    config: &'a DetectorConfig,
}

impl<'a> WaveletEventDetector<'a> {
    pub fn new(config: &'a DetectorConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, tilt_sin: &[f64], ml_rate: &[f64], sampling_rate_hz: f64) -> CandidateDetection {
        let cfg = self.config;
        let band = band_between(
            tilt_sin,
            cfg.shallow_level,
            cfg.deep_level,
            cfg.wavelet,
        );
        let peaks = find_peaks(&band, cfg.peak_min_height, cfg.peak_min_prominence);
        let crossings = zero_crossings(ml_rate);
        let min_gap = (cfg.min_boundary_gap_s * sampling_rate_hz).round() as usize;

        let candidates: Vec<CandidateEvent> = peaks
            .into_iter()
            .map(|peak| CandidateEvent {
                left: left_boundary(ml_rate, &crossings, peak, min_gap),
                peak,
                right: right_boundary(ml_rate, &crossings, peak, min_gap, cfg.right_boundary),
            })
            .collect();

        log::debug!(
            "{} zero crossings, {} candidate transitions",
            crossings.len(),
            candidates.len()
        );
        CandidateDetection { band, candidates }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_maxima_with_plateau() {
        let x = [0.0, 1.0, 0.0, 2.0, 2.0, 2.0, 1.0, 3.0, 3.0];
        // plateau 3..=5 -> 4; trailing plateau at edge is not a peak
        assert_eq!(local_maxima(&x), vec![1, 4]);
    }

    #[test]
    fn test_prominence() {
        let x = [0.0, 0.5, 0.2, 1.0, 0.1, 0.8, 0.0];
        // peak 3 reaches down to 0.0 on both sides
        assert!((prominence(&x, 3) - 1.0).abs() < 1e-12);
        // peak 1 is bounded on the right by the higher peak 3: min 0.2, left min 0.0
        assert!((prominence(&x, 1) - 0.3).abs() < 1e-12);
        // peak 5: left walk stops at 1.0, min 0.1; right min 0.0
        assert!((prominence(&x, 5) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_find_peaks_thresholds() {
        let x = [0.0, 0.05, 0.0, 0.5, 0.45, 0.48, 0.0, 0.3, 0.0];
        // 0.05 fails height, 0.48 fails prominence (0.03)
        assert_eq!(find_peaks(&x, 0.1, 0.1), vec![3, 7]);
    }

    #[test]
    fn test_flat_signal_has_no_peaks() {
        assert!(find_peaks(&[0.0; 100], 0.1, 0.1).is_empty());
    }

    #[test]
    fn test_zero_crossings() {
        let x = [1.0, -1.0, -2.0, 0.0, 3.0, -1.0];
        // a sample exactly at zero does not count as a crossing
        assert_eq!(zero_crossings(&x), vec![0, 4]);
    }

    #[test]
    fn test_boundaries() {
        // falling crossings at 9 and 29, rising at 19 and 49
        let mut rate = vec![0.0; 60];
        for (i, r) in rate.iter_mut().enumerate() {
            *r = match i {
                0..=9 => 0.1,
                10..=19 => -0.1,
                20..=29 => 0.1,
                30..=49 => -0.1,
                _ => 0.1,
            };
        }
        let zc = zero_crossings(&rate);
        assert_eq!(zc, vec![9, 19, 29, 49]);

        // peak at 25: crossing 9 qualifies only if the gap allows
        assert_eq!(left_boundary(&rate, &zc, 25, 5), 9);
        assert_eq!(left_boundary(&rate, &zc, 25, 20), 0);
        // peak at 35: falling crossing 29 is within the gap, so 9
        assert_eq!(left_boundary(&rate, &zc, 35, 10), 9);

        assert_eq!(
            right_boundary(&rate, &zc, 12, 5, RightBoundaryPolicy::ZeroCrossing),
            29
        );
        assert_eq!(
            right_boundary(&rate, &zc, 12, 20, RightBoundaryPolicy::ZeroCrossing),
            59
        );
        assert_eq!(
            right_boundary(&rate, &zc, 12, 5, RightBoundaryPolicy::RecordingEnd),
            59
        );
    }
}
