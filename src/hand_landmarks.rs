//! Hand landmark detection.
//!
//! [`LandmarkProvider`] is the seam between the frame pipeline and whatever
//! model turns an image into hand keypoints. [`OnnxHandLandmarker`] runs a
//! MediaPipe-style hand landmark network through ONNX Runtime on the whole
//! frame, letterboxed to a square.

use crate::{
    constants::{DEFAULT_LANDMARK_INPUT_SIZE, LANDMARK_COORDS, NUM_HAND_LANDMARKS},
    landmark::{HandLandmarkSet, Landmark},
    Error, Result,
};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Rect, Scalar, Size, Vec3f, CV_32F, CV_8UC3};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, GraphOptimizationLevel, LoggingLevel, Session, SessionBuilder, Value};
use std::path::Path;
use std::sync::Arc;

/// Produces hand landmark sets from RGB images
pub trait LandmarkProvider {
    /// Detect hands in an RGB image
    ///
    /// Returns at most [`LandmarkProvider::max_hands`] sets, empty when no hand is found.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the provider is closed
    fn process(&mut self, rgb: &Mat) -> Result<Vec<HandLandmarkSet>>;

    /// Maximum number of hands reported per image
    fn max_hands(&self) -> usize;

    /// Release model resources; closing twice is a no-op
    fn close(&mut self);
}

/// Memory layout of the model input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TensorLayout {
    Nchw,
    Nhwc,
}

/// Maps model input pixels back to normalized frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    frame_width: f32,
    frame_height: f32,
    input_size: f32,
}

impl Letterbox {
    /// Letterbox for a frame padded bottom/right to a square, then resized to `input_size`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(frame_width: i32, frame_height: i32, input_size: i32) -> Self {
        Self {
            frame_width: frame_width.max(1) as f32,
            frame_height: frame_height.max(1) as f32,
            input_size: input_size.max(1) as f32,
        }
    }

    /// Side of the padded square in frame pixels
    #[must_use]
    pub fn side(&self) -> f32 {
        self.frame_width.max(self.frame_height)
    }

    /// Convert a model-input pixel position to normalized frame coordinates
    #[must_use]
    pub fn to_normalized(&self, x: f32, y: f32) -> (f32, f32) {
        let scale = self.side() / self.input_size;
        (x * scale / self.frame_width, y * scale / self.frame_height)
    }
}

/// Decode one hand from raw model output (`x, y, z` triples in input pixels)
///
/// # Errors
///
/// Returns [`Error::ModelOutputError`] if fewer than 63 values are supplied
pub fn decode_hand(raw: &[f32], letterbox: &Letterbox) -> Result<HandLandmarkSet> {
    let needed = NUM_HAND_LANDMARKS * LANDMARK_COORDS;
    if raw.len() < needed {
        return Err(Error::ModelOutputError(format!(
            "expected at least {needed} landmark values, got {}",
            raw.len()
        )));
    }

    let mut points = [Landmark::default(); NUM_HAND_LANDMARKS];
    for (point, chunk) in points.iter_mut().zip(raw.chunks_exact(LANDMARK_COORDS)) {
        let (x, y) = letterbox.to_normalized(chunk[0], chunk[1]);
        // Depth is relative to the wrist and shares the x scale
        let z = chunk[2] / letterbox.input_size;
        *point = Landmark::with_depth(x, y, z);
    }
    Ok(HandLandmarkSet::new(points))
}

/// Interpret a hand presence output as a probability
#[must_use]
pub fn presence_probability(raw: f32) -> f32 {
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        1.0 / (1.0 + (-raw).exp())
    }
}

/// Hand landmark detector using `ONNX` Runtime
pub struct OnnxHandLandmarker {
    session: Option<Session>,
    input_size: i32,
    layout: TensorLayout,
    max_hands: usize,
    min_confidence: f32,
}

impl OnnxHandLandmarker {
    /// Load a hand landmark model
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_hands` is zero
    /// - The model file does not exist or cannot be loaded
    /// - The model has no inputs or outputs
    pub fn new<P: AsRef<Path>>(model_path: P, max_hands: usize, min_confidence: f32) -> Result<Self> {
        let model_path = model_path.as_ref();
        if max_hands == 0 {
            return Err(Error::InvalidInput("max_hands must be at least 1".to_string()));
        }
        if !model_path.exists() {
            return Err(Error::ResourceUnavailable(format!(
                "hand landmark model not found: {}",
                model_path.display()
            )));
        }

        log::info!("Initializing hand landmarker with model: {}", model_path.display());
        let environment = Arc::new(
            Environment::builder()
                .with_name("hand_landmarker")
                .with_log_level(LoggingLevel::Warning)
                .build()?,
        );

        let session = SessionBuilder::new(&environment)?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input_meta = session
            .inputs
            .first()
            .ok_or_else(|| Error::ModelError("Model has no inputs".to_string()))?;
        if session.outputs.is_empty() {
            return Err(Error::ModelError("Model has no outputs".to_string()));
        }

        // [batch, 3, h, w] or [batch, h, w, 3]
        let dims: Vec<Option<i64>> = input_meta.dimensions.iter().map(|d| d.map(i64::from)).collect();
        let (layout, input_size) = match dims.as_slice() {
            [_, Some(3), Some(h), _] => (TensorLayout::Nchw, *h),
            [_, Some(h), _, Some(3)] => (TensorLayout::Nhwc, *h),
            _ => {
                log::warn!("Unrecognised input shape {:?}, assuming NHWC", dims);
                (TensorLayout::Nhwc, i64::from(DEFAULT_LANDMARK_INPUT_SIZE))
            }
        };
        let input_size = i32::try_from(input_size)
            .map_err(|_| Error::ModelError(format!("Unsupported input size {input_size}")))?;
        log::debug!("Hand landmark model input: {}x{} {:?}", input_size, input_size, layout);

        Ok(Self {
            session: Some(session),
            input_size,
            layout,
            max_hands,
            min_confidence: min_confidence.clamp(0.0, 1.0),
        })
    }

    /// Square input side expected by the model
    #[must_use]
    pub fn input_size(&self) -> i32 {
        self.input_size
    }

    /// Pad to a square, resize to the model input and scale to `[0, 1]`
    #[allow(clippy::cast_sign_loss)]
    fn preprocess(&self, rgb: &Mat) -> Result<(Array4<f32>, Letterbox)> {
        let (width, height) = (rgb.cols(), rgb.rows());
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidInput(format!("Empty image {width}x{height}")));
        }
        let side = width.max(height);

        let mut square = Mat::new_rows_cols_with_default(side, side, CV_8UC3, Scalar::all(0.0))?;
        {
            let mut roi = square.roi_mut(Rect::new(0, 0, width, height))?;
            rgb.copy_to(&mut roi)?;
        }

        let mut resized = Mat::default();
        imgproc::resize(
            &square,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut float_image = Mat::default();
        resized.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let size = self.input_size as usize;
        let shape = match self.layout {
            TensorLayout::Nchw => (1, 3, size, size),
            TensorLayout::Nhwc => (1, size, size, 3),
        };
        let mut tensor = Array4::<f32>::zeros(shape);
        for row in 0..size {
            for col in 0..size {
                let pixel = float_image.at_2d::<Vec3f>(row as i32, col as i32)?;
                for ch in 0..3 {
                    match self.layout {
                        TensorLayout::Nchw => tensor[[0, ch, row, col]] = pixel[ch],
                        TensorLayout::Nhwc => tensor[[0, row, col, ch]] = pixel[ch],
                    }
                }
            }
        }

        Ok((tensor, Letterbox::new(width, height, self.input_size)))
    }

    /// Run the model, returning every output flattened
    fn forward(&self, input: Array4<f32>) -> Result<Vec<Vec<f32>>> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| Error::ResourceUnavailable("hand landmarker is closed".to_string()))?;

        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(session.allocator(), &cow_array)?;
        let outputs = session.run(vec![input_tensor])?;

        outputs
            .iter()
            .map(|output| {
                let tensor = output.try_extract::<f32>()?;
                let view = tensor.view();
                Ok(view.iter().copied().collect())
            })
            .collect()
    }
}

impl LandmarkProvider for OnnxHandLandmarker {
    fn process(&mut self, rgb: &Mat) -> Result<Vec<HandLandmarkSet>> {
        if self.session.is_none() {
            return Err(Error::ResourceUnavailable("hand landmarker is closed".to_string()));
        }

        let (input, letterbox) = self.preprocess(rgb)?;
        let outputs = self.forward(input)?;

        let raw_landmarks = outputs
            .iter()
            .find(|o| o.len() >= NUM_HAND_LANDMARKS * LANDMARK_COORDS)
            .ok_or_else(|| Error::ModelOutputError("No landmark output from model".to_string()))?;
        let presence = outputs
            .iter()
            .find(|o| o.len() == 1)
            .map_or(1.0, |o| presence_probability(o[0]));

        if presence < self.min_confidence {
            log::trace!("Hand presence {:.2} below {:.2}", presence, self.min_confidence);
            return Ok(Vec::new());
        }

        let hand = decode_hand(raw_landmarks, &letterbox)?;
        Ok(std::iter::once(hand).take(self.max_hands).collect())
    }

    fn max_hands(&self) -> usize {
        self.max_hands
    }

    fn close(&mut self) {
        if self.session.take().is_some() {
            log::info!("Hand landmarker closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_landscape_frame() {
        // 640x480 padded to 640x640, model input 224
        let lb = Letterbox::new(640, 480, 224);
        let (x, y) = lb.to_normalized(224.0, 168.0);
        assert!((x - 1.0).abs() < 1e-5);
        assert!((y - 1.0).abs() < 1e-5);

        let (x, y) = lb.to_normalized(112.0, 0.0);
        assert!((x - 0.5).abs() < 1e-5);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_letterbox_square_frame() {
        let lb = Letterbox::new(224, 224, 224);
        assert_eq!(lb.to_normalized(56.0, 112.0), (0.25, 0.5));
    }

    #[test]
    fn test_decode_hand() {
        let lb = Letterbox::new(224, 224, 224);
        let raw: Vec<f32> = (0..63).map(|i| i as f32).collect();
        let hand = decode_hand(&raw, &lb).unwrap();

        // Landmark 4 is the fifth triple: 12, 13, 14
        let thumb = hand.thumb_tip();
        assert!((thumb.x - 12.0 / 224.0).abs() < 1e-6);
        assert!((thumb.y - 13.0 / 224.0).abs() < 1e-6);
        assert!((thumb.z - 14.0 / 224.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_hand_short_output() {
        let lb = Letterbox::new(224, 224, 224);
        match decode_hand(&[0.0; 62], &lb) {
            Err(Error::ModelOutputError(msg)) => assert!(msg.contains("62")),
            other => panic!("Expected ModelOutputError, got {other:?}"),
        }
    }

    #[test]
    fn test_presence_probability() {
        assert_eq!(presence_probability(0.7), 0.7);
        assert!((presence_probability(0.0) - 0.0).abs() < 1e-6);
        // Logits outside [0, 1] go through a sigmoid
        assert!(presence_probability(5.0) > 0.99);
        assert!(presence_probability(-5.0) < 0.01);
    }

    #[test]
    fn test_missing_model_is_unavailable() {
        match OnnxHandLandmarker::new("does/not/exist.onnx", 1, 0.5) {
            Err(Error::ResourceUnavailable(msg)) => assert!(msg.contains("does/not/exist.onnx")),
            Err(e) => panic!("Unexpected error: {e}"),
            Ok(_) => panic!("Missing model should not load"),
        }
    }

    #[test]
    fn test_zero_hands_rejected() {
        assert!(matches!(
            OnnxHandLandmarker::new("does/not/exist.onnx", 0, 0.5),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    #[ignore = "Requires assets/hand_landmark.onnx"]
    fn test_blank_frame_has_no_hand() {
        let mut landmarker = OnnxHandLandmarker::new("assets/hand_landmark.onnx", 1, 0.5).unwrap();
        let frame = Mat::zeros(480, 640, CV_8UC3).unwrap().to_mat().unwrap();
        let hands = landmarker.process(&frame).unwrap();
        assert!(hands.len() <= 1);
        landmarker.close();
        assert!(landmarker.process(&frame).is_err());
    }
}
