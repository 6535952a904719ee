//! Frame pipeline: capture, detect, classify and annotate one frame at a time.
//!
//! A [`GestureSession`] owns the capture source and the landmark provider for
//! its whole lifetime. Closing the session (explicitly or on drop) releases
//! both, and closing twice does nothing.

use crate::{
    annotate::annotate_frame,
    capture::FrameSource,
    classifier::{GestureClassifier, GestureThresholds},
    gesture::{describe, Gesture},
    hand_landmarks::LandmarkProvider,
    landmark::HandLandmarkSet,
    Error, Result,
};
use log::{debug, info, warn};
use opencv::{core::Mat, imgproc, prelude::*};
use std::time::{Duration, Instant};

/// What to do when the capture source returns no frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFailurePolicy {
    /// Treat the failure as end of stream
    #[default]
    Stop,
    /// Drop this iteration and keep going
    Skip,
}

/// Result of one pipeline iteration
#[derive(Clone)]
pub struct FrameOutput {
    /// Captured frame, with the hand skeleton drawn when annotation is enabled
    pub frame: Mat,
    /// Landmarks of the first detected hand
    pub landmarks: Option<HandLandmarkSet>,
    /// Recognised gesture, `None` when no hand or no rule matched
    pub gesture: Option<Gesture>,
    /// Time from read start to result
    pub latency: Duration,
}

impl FrameOutput {
    /// Whether a hand was detected in this frame
    #[must_use]
    pub fn hand_found(&self) -> bool {
        self.landmarks.is_some()
    }

    /// Display label, "None" when nothing was recognised
    #[must_use]
    pub fn label(&self) -> &'static str {
        describe(self.gesture).0
    }

    /// Display description, "None" when nothing was recognised
    #[must_use]
    pub fn description(&self) -> &'static str {
        describe(self.gesture).1
    }
}

/// Counters for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames processed end to end
    pub frames: u64,
    /// Frames with a detected hand
    pub hands: u64,
    /// Frames with a recognised gesture
    pub gestures: u64,
    /// Reads that returned no frame
    pub read_failures: u64,
}

/// Capture-to-label session owning a frame source and a landmark provider
pub struct GestureSession<S: FrameSource, P: LandmarkProvider> {
    source: S,
    provider: P,
    classifier: GestureClassifier,
    annotate: bool,
    open: bool,
    stats: SessionStats,
}

impl<S: FrameSource, P: LandmarkProvider> GestureSession<S, P> {
    /// Start a session
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceUnavailable`] if the source is not open
    pub fn open(source: S, provider: P, thresholds: GestureThresholds) -> Result<Self> {
        if !source.is_opened() {
            let mut provider = provider;
            provider.close();
            return Err(Error::ResourceUnavailable("capture source is not open".to_string()));
        }
        if provider.max_hands() > 1 {
            debug!(
                "Provider reports up to {} hands, only the first is classified",
                provider.max_hands()
            );
        }
        info!(
            "Gesture session opened (extended_min={}, together_max={})",
            thresholds.extended_min, thresholds.together_max
        );
        Ok(Self {
            source,
            provider,
            classifier: GestureClassifier::new(thresholds),
            annotate: true,
            open: true,
            stats: SessionStats::default(),
        })
    }

    /// Enable or disable drawing the skeleton on output frames
    #[must_use]
    pub fn with_annotation(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Enable or disable annotation on an open session
    pub fn set_annotation(&mut self, annotate: bool) {
        self.annotate = annotate;
    }

    /// Whether output frames get the skeleton drawn
    #[must_use]
    pub fn annotation(&self) -> bool {
        self.annotate
    }

    /// Whether the session still holds its resources
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Counters since the session was opened
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Thresholds used by the classifier
    #[must_use]
    pub fn thresholds(&self) -> &GestureThresholds {
        self.classifier.thresholds()
    }

    /// Process one frame
    ///
    /// Returns `Ok(None)` when the source produced no frame or a transient
    /// read error; the caller's [`ReadFailurePolicy`] decides what happens next.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is closed, the source fails for good,
    /// or color conversion, landmark detection or annotation fails
    pub fn process_frame(&mut self) -> Result<Option<FrameOutput>> {
        if !self.open {
            return Err(Error::ResourceUnavailable("gesture session is closed".to_string()));
        }

        let started = Instant::now();
        let frame = match self.source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.stats.read_failures += 1;
                return Ok(None);
            }
            Err(e) if e.is_transient() => {
                debug!("Frame read error: {}", e);
                self.stats.read_failures += 1;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mut rgb = Mat::default();
        imgproc::cvt_color(&frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let landmarks = self.provider.process(&rgb)?.into_iter().next();
        let gesture = landmarks.as_ref().and_then(|hand| self.classifier.classify(hand));

        let frame = if self.annotate {
            annotate_frame(&frame, landmarks.as_ref())?
        } else {
            frame
        };

        self.stats.frames += 1;
        if landmarks.is_some() {
            self.stats.hands += 1;
        }
        if let Some(g) = gesture {
            self.stats.gestures += 1;
            debug!("Gesture: {}", g);
        }

        Ok(Some(FrameOutput {
            frame,
            landmarks,
            gesture,
            latency: started.elapsed(),
        }))
    }

    /// Process up to `max_frames` frames, handing each result to `on_frame`
    ///
    /// Returns the number of frames processed.
    ///
    /// # Errors
    ///
    /// Returns the first non-read error raised by [`GestureSession::process_frame`]
    pub fn run<F>(&mut self, max_frames: usize, policy: ReadFailurePolicy, mut on_frame: F) -> Result<usize>
    where
        F: FnMut(&FrameOutput),
    {
        let mut processed = 0;
        let mut attempts = 0;
        // Bound skipped reads too, so a dead source cannot spin forever
        while processed < max_frames && attempts < max_frames.saturating_mul(2).max(1) {
            attempts += 1;
            match self.process_frame()? {
                Some(output) => {
                    processed += 1;
                    on_frame(&output);
                }
                None => {
                    warn!("Failed to read frame {} from capture source", processed);
                    if policy == ReadFailurePolicy::Stop {
                        break;
                    }
                }
            }
        }
        Ok(processed)
    }

    /// Release the capture source and the landmark provider
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.source.release();
        self.provider.close();
        info!(
            "Gesture session closed after {} frames ({} with a hand, {} gestures, {} failed reads)",
            self.stats.frames, self.stats.hands, self.stats.gestures, self.stats.read_failures
        );
    }
}

impl<S: FrameSource, P: LandmarkProvider> Drop for GestureSession<S, P> {
    fn drop(&mut self) {
        self.close();
    }
}
