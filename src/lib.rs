//! Makaton gesture recognition from live webcam video.
//!
//! Each frame goes through the same pipeline:
//! 1. Capture a BGR frame from the webcam ([`capture`])
//! 2. Detect the 21 hand landmarks with an ONNX model ([`hand_landmarks`])
//! 3. Classify the pose with an ordered rule list ([`classifier`])
//! 4. Draw the skeleton and caption ([`annotate`])
//!
//! [`pipeline::GestureSession`] ties the steps together, and
//! [`worker::PipelineWorker`] runs a session off the display thread.
//!
//! # Examples
//!
//! ## Classifying a landmark set
//!
//! ```
//! use makaton_gesture::{
//!     classifier::{classify, GestureThresholds},
//!     gesture::Gesture,
//!     landmark::{HandLandmarkSet, Landmark},
//! };
//!
//! // Every point in the same place: fingertips touching the thumb
//! let hand = HandLandmarkSet::uniform(Landmark::new(0.4, 0.4));
//! assert_eq!(classify(&hand, &GestureThresholds::default()), Some(Gesture::Goodbye));
//! ```
//!
//! ## Running the pipeline on a webcam
//!
//! ```no_run
//! use makaton_gesture::{
//!     backend::{Backend, OpenCvBackend},
//!     config::Config,
//!     pipeline::{GestureSession, ReadFailurePolicy},
//! };
//!
//! # fn main() -> makaton_gesture::Result<()> {
//! let config = Config::load_or_default("config.yaml");
//! let backend = OpenCvBackend::new(config.model.clone());
//! let mut session = GestureSession::open(
//!     backend.open_source(config.camera.index)?,
//!     backend.open_provider()?,
//!     config.gesture_thresholds,
//! )?;
//!
//! session.run(100, ReadFailurePolicy::Skip, |output| {
//!     println!("{}: {}", output.label(), output.description());
//! })?;
//! # Ok(())
//! # }
//! ```

/// Hand landmark types and skeleton topology
pub mod landmark;

/// Gesture labels and their descriptions
pub mod gesture;

/// Rule-based gesture classification
pub mod classifier;

/// Video capture sources
pub mod capture;

/// Hand landmark detection
pub mod hand_landmarks;

/// Drawing on frames
pub mod annotate;

/// Per-frame processing pipeline
pub mod pipeline;

/// Background pipeline execution
pub mod worker;

/// External library bundle
pub mod backend;

/// Environment health check
pub mod diagnostics;

/// Throughput benchmark
pub mod benchmark;

/// Interactive application
pub mod app;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

/// Logger setup
pub mod logging;

pub use error::{Error, Result};
