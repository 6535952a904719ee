//! Rule-based gesture classification.
//!
//! The classifier is an ordered decision list over six distances between the
//! wrist, thumb tip and fingertips. Rules are evaluated top to bottom and the
//! first match wins:
//!
//! 1. **Hello**: every thumb-to-fingertip distance is above `extended_min`
//! 2. **Goodbye**: every thumb-to-fingertip distance is below `together_max`
//! 3. **Please**: thumb closer to the wrist than the index tip, thumb above the wrist
//! 4. **Thank You**: same distance condition, thumb below the wrist
//! 5. **Yes**: thumb tip left of the index tip
//!
//! Image-space y grows downward, so "above" means a smaller y.
//!
//! A hand with every landmark at the same position (fully occluded or
//! frozen) has all distances equal to zero and is classified as Goodbye.

use crate::{
    constants::{DEFAULT_EXTENDED_MIN, DEFAULT_TOGETHER_MAX},
    gesture::Gesture,
    landmark::HandLandmarkSet,
};
use serde::{Deserialize, Serialize};

/// Distance cut-offs used by the classifier, in normalized image units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// Thumb-to-fingertip distance above which a finger counts as extended
    #[serde(alias = "hello_min_distance")]
    pub extended_min: f32,

    /// Thumb-to-fingertip distance below which a finger counts as together
    #[serde(alias = "goodbye_max_distance")]
    pub together_max: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            extended_min: DEFAULT_EXTENDED_MIN,
            together_max: DEFAULT_TOGETHER_MAX,
        }
    }
}

/// Distances between the landmarks the rules look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandMetrics {
    /// Thumb tip to index fingertip
    pub thumb_index: f32,
    /// Thumb tip to middle fingertip
    pub thumb_middle: f32,
    /// Thumb tip to ring fingertip
    pub thumb_ring: f32,
    /// Thumb tip to pinky fingertip
    pub thumb_pinky: f32,
    /// Wrist to index fingertip
    pub wrist_index: f32,
    /// Wrist to thumb tip
    pub wrist_thumb: f32,
}

impl HandMetrics {
    /// Measure a hand
    #[must_use]
    pub fn measure(hand: &HandLandmarkSet) -> Self {
        let thumb = hand.thumb_tip();
        let wrist = hand.wrist();
        Self {
            thumb_index: thumb.distance_2d(hand.index_tip()),
            thumb_middle: thumb.distance_2d(hand.middle_tip()),
            thumb_ring: thumb.distance_2d(hand.ring_tip()),
            thumb_pinky: thumb.distance_2d(hand.pinky_tip()),
            wrist_index: wrist.distance_2d(hand.index_tip()),
            wrist_thumb: wrist.distance_2d(thumb),
        }
    }

    /// Thumb-to-fingertip distances for index, middle, ring and pinky
    #[must_use]
    pub fn thumb_to_fingertips(&self) -> [f32; 4] {
        [self.thumb_index, self.thumb_middle, self.thumb_ring, self.thumb_pinky]
    }
}

/// Classify a hand pose, returning `None` when no rule matches
///
/// Never panics; non-finite coordinates simply fail every comparison they
/// take part in.
#[must_use]
pub fn classify(hand: &HandLandmarkSet, thresholds: &GestureThresholds) -> Option<Gesture> {
    let metrics = HandMetrics::measure(hand);
    let tips = metrics.thumb_to_fingertips();
    let thumb = hand.thumb_tip();
    let wrist = hand.wrist();

    if tips.iter().all(|&d| d > thresholds.extended_min) {
        Some(Gesture::Hello)
    } else if tips.iter().all(|&d| d < thresholds.together_max) {
        Some(Gesture::Goodbye)
    } else if metrics.wrist_thumb < metrics.wrist_index && thumb.y < wrist.y {
        Some(Gesture::Please)
    } else if metrics.wrist_thumb < metrics.wrist_index && thumb.y > wrist.y {
        Some(Gesture::ThankYou)
    } else if thumb.x < hand.index_tip().x {
        Some(Gesture::Yes)
    } else {
        None
    }
}

/// Classifier bound to a fixed set of thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureClassifier {
    thresholds: GestureThresholds,
}

impl GestureClassifier {
    /// Create a classifier
    #[must_use]
    pub const fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use
    #[must_use]
    pub const fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Classify a hand pose
    #[must_use]
    pub fn classify(&self, hand: &HandLandmarkSet) -> Option<Gesture> {
        classify(hand, &self.thresholds)
    }
}
