use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::json;

use transition_detector_rs::{
    AccelUnit, DetectorConfig, ImuRecording, RecordingFile, RightBoundaryPolicy,
    TransitionDetector,
};

#[derive(Parser, Debug)]
#[command(name = "transition_detector")]
#[command(about = "Detect sit-to-stand / stand-to-sit transitions in a lower-back IMU recording", long_about = None)]
struct Args {
    /// Recording as JSON (.json or .json.gz)
    #[arg(value_name = "RECORDING")]
    recording: PathBuf,

    /// JSON file overriding detector defaults (missing keys keep their default)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How the end of each transition is located (overrides the config file)
    #[arg(long, value_enum)]
    right_boundary: Option<BoundaryArg>,

    /// Also print rejected attempts
    #[arg(long, default_value_t = false)]
    include_attempts: bool,

    /// Print the full diagnostic report instead of the transition list
    #[arg(long, default_value_t = false)]
    report: bool,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BoundaryArg {
    RecordingEnd,
    ZeroCrossing,
}

impl From<BoundaryArg> for RightBoundaryPolicy {
    fn from(arg: BoundaryArg) -> Self {
        match arg {
            BoundaryArg::RecordingEnd => RightBoundaryPolicy::RecordingEnd,
            BoundaryArg::ZeroCrossing => RightBoundaryPolicy::ZeroCrossing,
        }
    }
}

fn open_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let parsed = if path.extension().map(|e| e == "gz").unwrap_or(false) {
        serde_json::from_reader(BufReader::new(GzDecoder::new(file)))
    } else {
        serde_json::from_reader(BufReader::new(file))
    };
    parsed.with_context(|| format!("parsing {}", path.display()))
}

fn load_recording(path: &Path) -> Result<ImuRecording> {
    let file: RecordingFile = open_json(path)?;
    if file.samples.is_empty() {
        bail!("{} contains no samples", path.display());
    }
    let rec = file.into_recording()?;
    if rec.accel_unit() == AccelUnit::MetersPerSecondSquared {
        log::info!("converting accelerometer from m/s^2 to g");
    }
    Ok(rec.into_standard_gravity())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => open_json::<DetectorConfig>(path)?,
        None => DetectorConfig::default(),
    };
    if let Some(policy) = args.right_boundary {
        config.right_boundary = policy.into();
    }

    let recording = load_recording(&args.recording)?;
    log::info!(
        "{}: {} samples at {} Hz ({:.1} s)",
        args.recording.display(),
        recording.len(),
        recording.sampling_rate_hz(),
        recording.len() as f64 * recording.dt()
    );

    let detector = TransitionDetector::new(config)?;
    let report = detector.analyze(&recording)?;

    let output = if args.report {
        serde_json::to_value(&report)?
    } else if args.include_attempts {
        json!({ "transitions": report.transitions, "attempts": report.attempts })
    } else {
        json!({ "transitions": report.transitions })
    };

    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);
    Ok(())
}
