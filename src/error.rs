use thiserror::Error;

/// Transition detector error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("Recording contains no samples")]
    EmptyRecording,

    #[error("Expected 6 columns (ax, ay, az, gx, gy, gz), got {0}")]
    ColumnCount(usize),

    #[error("Accelerometer has {accel} samples but gyroscope has {gyro}")]
    LengthMismatch { accel: usize, gyro: usize },

    #[error("Non-finite value at sample {0}")]
    NonFiniteSample(usize),

    #[error("Invalid sampling rate: {0} Hz")]
    InvalidSamplingRate(f64),

    #[error("Accelerometer is tagged m/s^2; convert to g before detection")]
    UnconvertedUnits,

    #[error("Median accelerometer norm {median_norm:.3} is not plausible for data in g")]
    UnitMismatch { median_norm: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Insufficient stationary samples at start of recording: {found} in first {window} samples, need {required}"
    )]
    InsufficientInitialStationary {
        found: usize,
        required: usize,
        window: usize,
    },
}

/// Result type for detection operations
pub type DetectResult<T> = Result<T, DetectionError>;
