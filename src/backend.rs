//! External library bundle: where frames and landmarks come from.
//!
//! The diagnostics and the interactive app only talk to a [`Backend`], so the
//! whole stack can be swapped for scripted fakes in tests.

use crate::{
    capture::{CameraCapture, FrameSource},
    config::ModelConfig,
    constants::MAX_TRACKED_HANDS,
    hand_landmarks::{LandmarkProvider, OnnxHandLandmarker},
    Error, Result,
};
use ort::{Environment, LoggingLevel};

/// Factory for capture sources and landmark providers
pub trait Backend {
    /// Capture source type
    type Source: FrameSource;
    /// Landmark provider type
    type Provider: LandmarkProvider;

    /// Describe the capture library, failing if it is unusable
    ///
    /// # Errors
    ///
    /// Returns an error if the capture library cannot be queried
    fn capture_library(&self) -> Result<String>;

    /// Describe the landmark library, failing if it is unusable
    ///
    /// # Errors
    ///
    /// Returns an error if the inference runtime or its model is unavailable
    fn landmark_library(&self) -> Result<String>;

    /// Open the capture device at `index`
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceUnavailable`] if the device cannot be opened
    fn open_source(&self, index: i32) -> Result<Self::Source>;

    /// Create a landmark provider
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded
    fn open_provider(&self) -> Result<Self::Provider>;
}

/// Production backend: `OpenCV` capture and an `ONNX` hand landmark model
#[derive(Debug, Clone)]
pub struct OpenCvBackend {
    model: ModelConfig,
}

impl OpenCvBackend {
    /// Create a backend using the given model settings
    #[must_use]
    pub fn new(model: ModelConfig) -> Self {
        Self { model }
    }
}

impl Backend for OpenCvBackend {
    type Source = CameraCapture;
    type Provider = OnnxHandLandmarker;

    fn capture_library(&self) -> Result<String> {
        let version = opencv::core::get_version_string()?;
        Ok(format!("OpenCV {version}"))
    }

    fn landmark_library(&self) -> Result<String> {
        Environment::builder()
            .with_name("health_probe")
            .with_log_level(LoggingLevel::Warning)
            .build()?;
        let path = &self.model.hand_landmarks;
        if !path.exists() {
            return Err(Error::ResourceUnavailable(format!(
                "hand landmark model not found: {}",
                path.display()
            )));
        }
        Ok(format!("ONNX Runtime, model {}", path.display()))
    }

    fn open_source(&self, index: i32) -> Result<CameraCapture> {
        CameraCapture::open(index)
    }

    fn open_provider(&self) -> Result<OnnxHandLandmarker> {
        OnnxHandLandmarker::new(&self.model.hand_landmarks, MAX_TRACKED_HANDS, self.model.min_confidence)
    }
}
