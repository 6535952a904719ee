//! Measure per-frame pipeline latency on a live webcam.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use makaton_gesture::{
    backend::{Backend, OpenCvBackend},
    benchmark::run_benchmark,
    config::Config,
    constants::{DEFAULT_BENCHMARK_FRAMES, DEFAULT_LOG_DIR},
    logging::init_logging,
    pipeline::GestureSession,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Benchmark the gesture recognition pipeline")]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, default_value = "config.yaml")]
    config: PathBuf,

    /// Number of frames to process
    #[arg(short, long, default_value_t = DEFAULT_BENCHMARK_FRAMES)]
    frames: usize,

    /// Camera index, defaults to the configured one
    #[arg(long)]
    cam: Option<i32>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let (config, warnings) = Config::load_with_warnings(&args.config);
    init_logging(&config.logging, Path::new(DEFAULT_LOG_DIR));
    for warning in &warnings {
        warn!("{}", warning);
    }

    let index = args.cam.unwrap_or(config.camera.index);
    let backend = OpenCvBackend::new(config.model.clone());

    let source = backend
        .open_source(index)
        .with_context(|| format!("Cannot open camera {index}"))?;
    let provider = backend.open_provider().context("Cannot load the hand landmark model")?;
    let mut session = GestureSession::open(source, provider, config.gesture_thresholds)?;

    let report = run_benchmark(&mut session, args.frames)?;
    session.close();

    println!("{report}");
    if report.is_empty() {
        warn!("No frames were read from camera {}", index);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
