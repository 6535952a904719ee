//! Error types for the gesture recognition library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A capture device, model or library needed by an operation is not available
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// A single frame could not be read from an open capture device
    #[error("Frame read failed: {0}")]
    ReadFailure(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A landmark set did not contain the expected number of points
    #[error("Invalid landmark set: expected {expected} points, got {actual}")]
    InvalidLandmarks {
        /// Required number of landmarks
        expected: usize,
        /// Number of landmarks supplied
        actual: usize,
    },

    /// Model loading or structure error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Model output processing error
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error only affects the current frame and the stream may continue
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ReadFailure(_))
    }
}
