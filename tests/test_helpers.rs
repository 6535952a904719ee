//! Helper functions and fakes for integration tests

#![allow(dead_code)]

use makaton_gesture::{
    backend::Backend,
    capture::FrameSource,
    hand_landmarks::LandmarkProvider,
    landmark::{index, HandLandmarkSet, Landmark},
    Error, Result,
};
use opencv::{
    core::{Mat, CV_8UC3},
    prelude::*,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Create a black BGR test image
pub fn create_test_image(height: i32, width: i32) -> Result<Mat> {
    Mat::zeros(height, width, CV_8UC3)?.to_mat().map_err(Into::into)
}

/// Build a hand with the given points set and every other point at the origin
pub fn hand(overrides: &[(usize, (f32, f32))]) -> HandLandmarkSet {
    let mut points = [Landmark::default(); 21];
    for &(idx, (x, y)) in overrides {
        points[idx] = Landmark::new(x, y);
    }
    HandLandmarkSet::new(points)
}

/// Thumb far from every fingertip
pub fn hello_hand() -> HandLandmarkSet {
    hand(&[
        (index::WRIST, (0.0, 0.0)),
        (index::THUMB_TIP, (0.0, 0.0)),
        (index::INDEX_FINGER_TIP, (1.0, 0.0)),
        (index::MIDDLE_FINGER_TIP, (1.0, 0.5)),
        (index::RING_FINGER_TIP, (1.0, 1.0)),
        (index::PINKY_TIP, (0.5, 1.0)),
    ])
}

/// Every fingertip bunched against the thumb
pub fn goodbye_hand() -> HandLandmarkSet {
    hand(&[
        (index::WRIST, (0.0, 0.0)),
        (index::THUMB_TIP, (0.5, 0.5)),
        (index::INDEX_FINGER_TIP, (0.51, 0.5)),
        (index::MIDDLE_FINGER_TIP, (0.52, 0.5)),
        (index::RING_FINGER_TIP, (0.49, 0.5)),
        (index::PINKY_TIP, (0.5, 0.51)),
    ])
}

/// Thumb near the wrist and above it
pub fn please_hand() -> HandLandmarkSet {
    hand(&[
        (index::WRIST, (0.5, 0.8)),
        (index::THUMB_TIP, (0.5, 0.7)),
        (index::INDEX_FINGER_TIP, (0.5, 0.3)),
        (index::MIDDLE_FINGER_TIP, (0.55, 0.65)),
        (index::RING_FINGER_TIP, (0.6, 0.35)),
        (index::PINKY_TIP, (0.65, 0.4)),
    ])
}

/// Thumb near the wrist and below it
pub fn thank_you_hand() -> HandLandmarkSet {
    hand(&[
        (index::WRIST, (0.5, 0.2)),
        (index::THUMB_TIP, (0.5, 0.3)),
        (index::INDEX_FINGER_TIP, (0.5, 0.7)),
        (index::MIDDLE_FINGER_TIP, (0.55, 0.35)),
        (index::RING_FINGER_TIP, (0.6, 0.65)),
        (index::PINKY_TIP, (0.65, 0.6)),
    ])
}

/// Thumb left of the index tip, nothing else matching
pub fn yes_hand() -> HandLandmarkSet {
    hand(&[
        (index::WRIST, (0.0, 0.0)),
        (index::THUMB_TIP, (0.4, 0.6)),
        (index::INDEX_FINGER_TIP, (0.6, 0.3)),
        (index::MIDDLE_FINGER_TIP, (0.41, 0.6)),
        (index::RING_FINGER_TIP, (0.39, 0.6)),
        (index::PINKY_TIP, (0.4, 0.59)),
    ])
}

/// A pose no rule accepts
pub fn unmatched_hand() -> HandLandmarkSet {
    hand(&[
        (index::WRIST, (0.0, 0.0)),
        (index::THUMB_TIP, (0.4, 0.0)),
        (index::INDEX_FINGER_TIP, (0.2, 0.0)),
        (index::MIDDLE_FINGER_TIP, (0.4, 0.2)),
        (index::RING_FINGER_TIP, (0.4, -0.2)),
        (index::PINKY_TIP, (0.4, 0.1)),
    ])
}

/// Frame source playing back a script of successful and failed reads
///
/// With no script the source produces frames forever.
pub struct ScriptedSource {
    script: Option<VecDeque<bool>>,
    opened: bool,
    read_delay: Duration,
    pub reads: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl ScriptedSource {
    /// `true` entries yield a frame, `false` entries a failed read; reads past the end fail
    pub fn new(script: &[bool]) -> Self {
        Self {
            script: Some(script.iter().copied().collect()),
            ..Self::endless()
        }
    }

    /// Source that always delivers a frame
    pub fn endless() -> Self {
        Self {
            script: None,
            opened: true,
            read_delay: Duration::ZERO,
            reads: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep this long inside every read
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }
}

impl FrameSource for ScriptedSource {
    fn is_opened(&self) -> bool {
        self.opened
    }

    fn read(&mut self) -> Result<Option<Mat>> {
        if !self.opened {
            return Err(Error::ResourceUnavailable("scripted source released".to_string()));
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.read_delay.is_zero() {
            std::thread::sleep(self.read_delay);
        }
        let ok = match self.script.as_mut() {
            Some(script) => script.pop_front().unwrap_or(false),
            None => true,
        };
        if ok {
            Ok(Some(create_test_image(48, 64)?))
        } else {
            Ok(None)
        }
    }

    fn release(&mut self) {
        if self.opened {
            self.opened = false;
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Landmark provider returning the same hands for every image
pub struct FakeProvider {
    hands: Vec<HandLandmarkSet>,
    fail: bool,
    pub calls: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl FakeProvider {
    /// Provider reporting `hands` for every image
    pub fn new(hands: Vec<HandLandmarkSet>) -> Self {
        Self {
            hands,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Provider whose inference always fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }
}

impl LandmarkProvider for FakeProvider {
    fn process(&mut self, rgb: &Mat) -> Result<Vec<HandLandmarkSet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::ModelError("scripted inference failure".to_string()));
        }
        if rgb.channels() != 3 {
            return Err(Error::InvalidInput(format!("expected 3 channels, got {}", rgb.channels())));
        }
        Ok(self.hands.clone())
    }

    fn max_hands(&self) -> usize {
        1
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Backend handing out scripted sources and fake providers
#[derive(Clone)]
pub struct FakeBackend {
    pub camera_available: bool,
    pub libraries_available: bool,
    pub script: Option<Vec<bool>>,
    pub hands: Vec<HandLandmarkSet>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            camera_available: true,
            libraries_available: true,
            script: None,
            hands: Vec::new(),
        }
    }
}

impl Backend for FakeBackend {
    type Source = ScriptedSource;
    type Provider = FakeProvider;

    fn capture_library(&self) -> Result<String> {
        if self.libraries_available {
            Ok("fake capture 1.0".to_string())
        } else {
            Err(Error::ResourceUnavailable("capture library missing".to_string()))
        }
    }

    fn landmark_library(&self) -> Result<String> {
        if self.libraries_available {
            Ok("fake landmarks 1.0".to_string())
        } else {
            Err(Error::ResourceUnavailable("landmark library missing".to_string()))
        }
    }

    fn open_source(&self, index: i32) -> Result<ScriptedSource> {
        if !self.camera_available {
            return Err(Error::ResourceUnavailable(format!("cannot open camera index {index}")));
        }
        Ok(match &self.script {
            Some(script) => ScriptedSource::new(script),
            None => ScriptedSource::endless(),
        })
    }

    fn open_provider(&self) -> Result<FakeProvider> {
        Ok(FakeProvider::new(self.hands.clone()))
    }
}
