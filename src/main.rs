//! Interactive Makaton gesture recognition.

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use makaton_gesture::{
    app::GestureApp, backend::OpenCvBackend, config::Config, constants::DEFAULT_LOG_DIR, logging::init_logging,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, default_value = "config.yaml")]
    config: PathBuf,

    /// Camera index to use, overrides the configuration
    #[arg(long)]
    cam: Option<i32>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logging depends on the config, so report config problems once the logger is up
    let (mut config, warnings) = Config::load_with_warnings(&args.config);
    if args.debug {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging, Path::new(DEFAULT_LOG_DIR));
    info!("Makaton gesture recognition {}", env!("CARGO_PKG_VERSION"));

    for warning in &warnings {
        warn!("{}", warning);
    }
    if let Some(cam) = args.cam {
        config.camera.index = cam;
    }

    let backend = OpenCvBackend::new(config.model.clone());
    let mut app = GestureApp::new(backend, config);
    app.run()?;

    Ok(())
}
