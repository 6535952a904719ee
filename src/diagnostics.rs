//! Environment health check.
//!
//! Every check runs independently and yields a [`CheckResult`]; one failing
//! check never prevents the others from running. The report's exit code is
//! 0 only when everything passed.

use crate::{
    backend::Backend,
    benchmark::run_benchmark,
    capture::FrameSource,
    classifier::GestureThresholds,
    config::Config,
    constants::{DEFAULT_LOG_DIR, DEFAULT_SMOKE_TEST_FRAMES, MIN_RUSTC_VERSION},
    pipeline::GestureSession,
};
use log::{info, warn};
use opencv::prelude::MatTraitConst;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Probe file written to check the log directory
const LOG_PROBE_FILE: &str = "health_check_test.log";

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// What was checked
    pub label: String,
    /// Whether the check passed
    pub ok: bool,
    /// Version, path or error text
    pub details: String,
}

impl CheckResult {
    /// Passing check
    pub fn pass(label: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ok: true,
            details: details.into(),
        }
    }

    /// Failing check
    pub fn fail(label: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ok: false,
            details: details.into(),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.ok { "OK" } else { "FAIL" };
        write!(f, "[{}] {} - {}", tag, self.label, self.details)
    }
}

/// All check results of one run
#[derive(Debug, Clone, Default)]
pub struct HealthReport {
    /// Results in execution order
    pub checks: Vec<CheckResult>,
}

impl HealthReport {
    /// Whether every check passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.ok)
    }

    /// Number of failed checks
    #[must_use]
    pub fn failures(&self) -> usize {
        self.checks.iter().filter(|c| !c.ok).count()
    }

    /// Process exit status: 0 when all checks passed, 1 otherwise
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.all_passed())
    }

    fn record(&mut self, result: CheckResult) {
        if result.ok {
            info!("{}", result);
        } else {
            warn!("{}", result);
        }
        self.checks.push(result);
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            writeln!(f, "{check}")?;
        }
        if self.all_passed() {
            write!(f, "All {} checks passed", self.checks.len())
        } else {
            write!(f, "{} of {} checks failed", self.failures(), self.checks.len())
        }
    }
}

/// Inputs for a health check run
#[derive(Debug, Clone)]
pub struct HealthCheckOptions {
    /// Configuration file that must exist and parse
    pub config_path: PathBuf,
    /// Directory that must be writable for logs
    pub log_dir: PathBuf,
    /// Camera to open; the configured index is used when `None`
    pub camera_index: Option<i32>,
    /// Frames processed by the throughput smoke test
    pub smoke_frames: usize,
}

impl Default for HealthCheckOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config.yaml"),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            camera_index: None,
            smoke_frames: DEFAULT_SMOKE_TEST_FRAMES,
        }
    }
}

/// Extract `(major, minor)` from `rustc --version` output
#[must_use]
pub fn parse_rustc_version(version: &str) -> Option<(u32, u32)> {
    let number = version
        .split_whitespace()
        .find(|word| word.chars().next().is_some_and(|c| c.is_ascii_digit()))?;
    let mut parts = number.split(['.', '-']);
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Check a toolchain version string against the supported minimum
#[must_use]
pub fn check_runtime_version(version: &str) -> CheckResult {
    const LABEL: &str = "Rust toolchain";
    match parse_rustc_version(version) {
        Some(found) if found >= MIN_RUSTC_VERSION => CheckResult::pass(LABEL, version.trim()),
        Some(_) => CheckResult::fail(
            LABEL,
            format!(
                "{} is older than {}.{}",
                version.trim(),
                MIN_RUSTC_VERSION.0,
                MIN_RUSTC_VERSION.1
            ),
        ),
        None => CheckResult::fail(LABEL, format!("unrecognised version '{}'", version.trim())),
    }
}

/// Check that the configuration file exists and parses
#[must_use]
pub fn check_config(path: &Path) -> (CheckResult, Option<Config>) {
    const LABEL: &str = "Config file";
    if !path.exists() {
        return (CheckResult::fail(LABEL, format!("{} not found", path.display())), None);
    }
    match Config::from_file(path) {
        Ok(config) => (CheckResult::pass(LABEL, format!("{} loaded", path.display())), Some(config)),
        Err(e) => (CheckResult::fail(LABEL, format!("{}: {}", path.display(), e)), None),
    }
}

/// Check that a file can be created and deleted in the log directory
#[must_use]
pub fn check_log_dir(dir: &Path) -> CheckResult {
    const LABEL: &str = "Log directory";
    let probe = dir.join(LOG_PROBE_FILE);
    let result = fs::create_dir_all(dir)
        .and_then(|()| fs::write(&probe, b"health check\n"))
        .and_then(|()| fs::remove_file(&probe));
    match result {
        Ok(()) => CheckResult::pass(LABEL, format!("{} is writable", dir.display())),
        Err(e) => CheckResult::fail(LABEL, format!("{}: {}", dir.display(), e)),
    }
}

/// Check that the camera opens and delivers a frame
pub fn check_camera<B: Backend>(backend: &B, index: i32) -> CheckResult {
    let label = format!("Webcam {index}");
    let mut source = match backend.open_source(index) {
        Ok(source) => source,
        Err(e) => return CheckResult::fail(label, e.to_string()),
    };
    let result = match source.read() {
        Ok(Some(frame)) => CheckResult::pass(label, format!("read a {}x{} frame", frame.cols(), frame.rows())),
        Ok(None) => CheckResult::fail(label, "opened but returned no frame"),
        Err(e) => CheckResult::fail(label, e.to_string()),
    };
    source.release();
    result
}

/// Run the full pipeline over a few frames and check that any were processed
pub fn check_smoke_fps<B: Backend>(
    backend: &B,
    index: i32,
    thresholds: GestureThresholds,
    frames: usize,
) -> CheckResult {
    let label = format!("FPS smoke test ({frames} frames)");
    let report = backend
        .open_source(index)
        .and_then(|source| {
            let provider = backend.open_provider()?;
            GestureSession::open(source, provider, thresholds)
        })
        .and_then(|mut session| run_benchmark(&mut session, frames));

    match report {
        Ok(report) if report.is_empty() => CheckResult::fail(label, "no frames processed"),
        Ok(report) => CheckResult::pass(
            label,
            format!("{} frames, {:.1} FPS", report.frames_processed, report.fps),
        ),
        Err(e) => CheckResult::fail(label, e.to_string()),
    }
}

/// Run every check and collect the results
pub fn run_health_check<B: Backend>(backend: &B, options: &HealthCheckOptions) -> HealthReport {
    let mut report = HealthReport::default();

    report.record(check_runtime_version(option_env!("BUILD_RUSTC_VERSION").unwrap_or("unknown")));

    report.record(match backend.capture_library() {
        Ok(details) => CheckResult::pass("Capture library", details),
        Err(e) => CheckResult::fail("Capture library", e.to_string()),
    });
    report.record(match backend.landmark_library() {
        Ok(details) => CheckResult::pass("Landmark library", details),
        Err(e) => CheckResult::fail("Landmark library", e.to_string()),
    });

    let (config_check, config) = check_config(&options.config_path);
    report.record(config_check);
    let config = config.unwrap_or_default();

    report.record(check_log_dir(&options.log_dir));

    let index = options.camera_index.unwrap_or(config.camera.index);
    report.record(check_camera(backend, index));
    report.record(check_smoke_fps(
        backend,
        index,
        config.gesture_thresholds,
        options.smoke_frames,
    ));

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rustc_version() {
        assert_eq!(parse_rustc_version("rustc 1.75.0 (82e1608df 2023-12-21)"), Some((1, 75)));
        assert_eq!(parse_rustc_version("rustc 1.80.0-nightly (abc 2024-05-01)"), Some((1, 80)));
        assert_eq!(parse_rustc_version("unknown"), None);
        assert_eq!(parse_rustc_version(""), None);
    }

    #[test]
    fn test_runtime_version_check() {
        assert!(check_runtime_version("rustc 1.70.0 (90c541806 2023-05-31)").ok);
        assert!(check_runtime_version("rustc 2.0.0").ok);
        assert!(!check_runtime_version("rustc 1.69.0 (84c898d65 2023-04-16)").ok);
        assert!(!check_runtime_version("unknown").ok);
    }

    #[test]
    fn test_check_result_format() {
        assert_eq!(CheckResult::pass("Config file", "loaded").to_string(), "[OK] Config file - loaded");
        assert_eq!(CheckResult::fail("Webcam 0", "busy").to_string(), "[FAIL] Webcam 0 - busy");
    }

    #[test]
    fn test_exit_code() {
        let mut report = HealthReport::default();
        assert_eq!(report.exit_code(), 0);
        report.checks.push(CheckResult::pass("a", "fine"));
        assert_eq!(report.exit_code(), 0);
        report.checks.push(CheckResult::fail("b", "broken"));
        assert_eq!(report.exit_code(), 1);
        assert!(report.to_string().ends_with("1 of 2 checks failed"));
    }

    #[test]
    fn test_log_dir_check() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("nested").join("logs");
        assert!(check_log_dir(&logs).ok);
        assert!(!logs.join(LOG_PROBE_FILE).exists());

        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        assert!(!check_log_dir(&blocker.join("logs")).ok);
    }

    #[test]
    fn test_config_check() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.yaml");
        assert!(!check_config(&missing).0.ok);

        fs::write(&missing, "camera:\n  index: 1\n").unwrap();
        let (check, config) = check_config(&missing);
        assert!(check.ok);
        assert_eq!(config.unwrap().camera.index, 1);

        fs::write(&missing, "camera: [unclosed\n").unwrap();
        assert!(!check_config(&missing).0.ok);
    }
}
