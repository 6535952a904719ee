//! Environment health check: libraries, config, log directory and webcam.
//!
//! Exits with status 0 when every check passes and 1 otherwise.

use clap::Parser;
use log::warn;
use makaton_gesture::{
    backend::OpenCvBackend,
    config::Config,
    constants::{DEFAULT_LOG_DIR, DEFAULT_SMOKE_TEST_FRAMES},
    diagnostics::{run_health_check, HealthCheckOptions},
    logging::init_logging,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Check that the gesture recognizer can run on this machine")]
struct Args {
    /// Configuration file to validate
    #[arg(short = 'C', long, default_value = "config.yaml")]
    config: PathBuf,

    /// Directory that must be writable for log files
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Frames to process in the FPS smoke test
    #[arg(long, default_value_t = DEFAULT_SMOKE_TEST_FRAMES)]
    smoke_frames: usize,

    /// Camera index, defaults to the configured one
    #[arg(long)]
    cam: Option<i32>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // The config check below stays strict; this copy only sets up logging and the model path
    let (config, warnings) = Config::load_with_warnings(&args.config);
    init_logging(&config.logging, &args.log_dir);
    for warning in &warnings {
        warn!("{}", warning);
    }
    let backend = OpenCvBackend::new(config.model);

    let options = HealthCheckOptions {
        config_path: args.config,
        log_dir: args.log_dir,
        camera_index: args.cam,
        smoke_frames: args.smoke_frames,
    };

    println!("Makaton gesture recognition health check");
    let report = run_health_check(&backend, &options);
    println!("{report}");

    if report.exit_code() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
