//! Postural transition detection (sit-to-stand / stand-to-sit) from a single
//! lower-back IMU.
//!
//! ```no_run
//! use ndarray::Array2;
//! use transition_detector_rs::{AccelUnit, DetectorConfig, ImuRecording, TransitionDetector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data: Array2<f64> = Array2::zeros((6000, 6)); // ax ay az (g), gx gy gz (rad/s)
//! let recording = ImuRecording::from_array(data.view(), 100.0, AccelUnit::StandardGravity)?;
//! let detector = TransitionDetector::new(DetectorConfig::default())?;
//! for t in detector.detect(&recording)? {
//!     println!("{:.2}s {} {:.2} m", t.onset, t.event_type, t.vertical_displacement);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod detector;
pub mod error;
pub mod events;
pub mod filters;
pub mod kinematics;
pub mod preprocessing;
pub mod stationarity;
pub mod types;
pub mod wavelet;

#[cfg(test)]
pub(crate) mod synthetic;

pub use detector::{DetectionReport, DetectorConfig, TransitionDetector};
pub use error::{DetectResult, DetectionError};
pub use events::RightBoundaryPolicy;
pub use types::{AccelUnit, ImuRecording, RecordingFile, TransitionKind, TransitionRecord};
pub use wavelet::WaveletFilter;
