//! Throughput measurement over a bounded number of frames.

use crate::{
    capture::FrameSource,
    hand_landmarks::LandmarkProvider,
    pipeline::{GestureSession, ReadFailurePolicy},
    Result,
};
use log::info;
use std::fmt;
use std::time::Duration;

/// Upper bound on the sample buffer reserved up front
const MAX_PREALLOCATED_SAMPLES: usize = 10_000;

/// Per-frame latency statistics for a benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    /// Frames asked for
    pub requested: usize,
    /// Frames actually processed before the run ended
    pub frames_processed: usize,
    /// Mean per-frame latency
    pub mean: Duration,
    /// Median per-frame latency
    pub median: Duration,
    /// Fastest frame
    pub min: Duration,
    /// Slowest frame
    pub max: Duration,
    /// Frames per second over the processing time
    pub fps: f64,
}

impl BenchmarkReport {
    /// Build a report from per-frame latencies
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_samples(requested: usize, samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self {
                requested,
                frames_processed: 0,
                mean: Duration::ZERO,
                median: Duration::ZERO,
                min: Duration::ZERO,
                max: Duration::ZERO,
                fps: 0.0,
            };
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();
        let total: Duration = sorted.iter().sum();
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2
        } else {
            sorted[n / 2]
        };

        // A frame never takes literally zero time; clamp so fps stays finite
        let seconds = total.as_secs_f64().max(1e-9);

        Self {
            requested,
            frames_processed: n,
            mean: total / u32::try_from(n).unwrap_or(u32::MAX),
            median,
            min: sorted[0],
            max: sorted[n - 1],
            fps: n as f64 / seconds,
        }
    }

    /// Whether no frame was processed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames_processed == 0
    }
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No frames processed, benchmark aborted");
        }
        writeln!(f, "Benchmark results")?;
        writeln!(f, "  Frames processed : {}/{}", self.frames_processed, self.requested)?;
        writeln!(f, "  Mean frame time  : {:.2} ms", ms(self.mean))?;
        writeln!(f, "  Median frame time: {:.2} ms", ms(self.median))?;
        writeln!(f, "  Min frame time   : {:.2} ms", ms(self.min))?;
        writeln!(f, "  Max frame time   : {:.2} ms", ms(self.max))?;
        write!(f, "  Approx FPS       : {:.2}", self.fps)
    }
}

/// Process up to `frames` frames and report latency statistics
///
/// Annotation is switched off for the run and restored afterwards. The run
/// stops early at the first failed read.
///
/// # Errors
///
/// Returns an error if frame processing fails for a reason other than a
/// failed read
pub fn run_benchmark<S: FrameSource, P: LandmarkProvider>(
    session: &mut GestureSession<S, P>,
    frames: usize,
) -> Result<BenchmarkReport> {
    info!("Running benchmark over {} frames", frames);
    let mut samples = Vec::with_capacity(frames.min(MAX_PREALLOCATED_SAMPLES));

    let annotate = session.annotation();
    session.set_annotation(false);
    let result = session.run(frames, ReadFailurePolicy::Stop, |output| samples.push(output.latency));
    session.set_annotation(annotate);
    result?;

    let report = BenchmarkReport::from_samples(frames, &samples);
    info!(
        "Benchmark finished: {} frames, {:.2} FPS",
        report.frames_processed, report.fps
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_statistics() {
        let samples = [10, 30, 20, 40].map(Duration::from_millis);
        let report = BenchmarkReport::from_samples(5, &samples);
        assert_eq!(report.frames_processed, 4);
        assert_eq!(report.mean, Duration::from_millis(25));
        assert_eq!(report.median, Duration::from_millis(25));
        assert_eq!(report.min, Duration::from_millis(10));
        assert_eq!(report.max, Duration::from_millis(40));
        assert!((report.fps - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_odd_sample_median() {
        let samples = [5, 1, 3].map(Duration::from_millis);
        assert_eq!(BenchmarkReport::from_samples(3, &samples).median, Duration::from_millis(3));
    }

    #[test]
    fn test_empty_report() {
        let report = BenchmarkReport::from_samples(200, &[]);
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "No frames processed, benchmark aborted");
    }

    #[test]
    fn test_zero_latency_frames_give_finite_fps() {
        let report = BenchmarkReport::from_samples(2, &[Duration::ZERO, Duration::ZERO]);
        assert!(report.fps.is_finite());
        assert!(report.fps > 0.0);
    }

    #[test]
    fn test_display_lists_fps() {
        let report = BenchmarkReport::from_samples(1, &[Duration::from_millis(50)]);
        let text = report.to_string();
        assert!(text.contains("1/1"));
        assert!(text.contains("20.00"));
    }
}
