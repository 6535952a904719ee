//! Hand landmark data model.
//!
//! A detected hand is described by 21 keypoints in normalized image space
//! (x grows to the right, y grows downward, both roughly in `[0, 1]`).
//! The ordering follows the MediaPipe hand model.

use crate::{constants::NUM_HAND_LANDMARKS, Error, Result};

/// Named indices into a [`HandLandmarkSet`]
#[allow(missing_docs)]
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Bones of the hand skeleton as pairs of landmark indices
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    // Palm
    (0, 1),
    (0, 5),
    (5, 9),
    (9, 13),
    (13, 17),
    (0, 17),
    // Thumb
    (1, 2),
    (2, 3),
    (3, 4),
    // Index finger
    (5, 6),
    (6, 7),
    (7, 8),
    // Middle finger
    (9, 10),
    (10, 11),
    (11, 12),
    // Ring finger
    (13, 14),
    (14, 15),
    (15, 16),
    // Pinky
    (17, 18),
    (18, 19),
    (19, 20),
];

/// A single hand keypoint
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    /// X coordinate, normalized to image width
    pub x: f32,
    /// Y coordinate, normalized to image height
    pub y: f32,
    /// Relative depth; not used for classification
    pub z: f32,
}

impl Landmark {
    /// Create a landmark without depth
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Create a landmark with depth
    #[must_use]
    pub const fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other` in the image plane
    #[must_use]
    pub fn distance_2d(&self, other: &Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f32, f32)> for Landmark {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// The 21-point skeleton of one detected hand in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarkSet {
    points: [Landmark; NUM_HAND_LANDMARKS],
}

impl HandLandmarkSet {
    /// Create a landmark set from exactly 21 points
    #[must_use]
    pub const fn new(points: [Landmark; NUM_HAND_LANDMARKS]) -> Self {
        Self { points }
    }

    /// Landmark set with every point at the same position
    #[must_use]
    pub const fn uniform(point: Landmark) -> Self {
        Self {
            points: [point; NUM_HAND_LANDMARKS],
        }
    }

    /// Build a landmark set from a slice
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLandmarks`] unless the slice holds exactly 21 points
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        let points: [Landmark; NUM_HAND_LANDMARKS] = points.try_into().map_err(|_| Error::InvalidLandmarks {
            expected: NUM_HAND_LANDMARKS,
            actual: points.len(),
        })?;
        Ok(Self { points })
    }

    /// Point at an anatomical index, see [`index`]
    ///
    /// # Panics
    ///
    /// Panics if `idx >= 21`
    #[must_use]
    pub fn point(&self, idx: usize) -> &Landmark {
        &self.points[idx]
    }

    /// All points in anatomical order
    #[must_use]
    pub fn points(&self) -> &[Landmark; NUM_HAND_LANDMARKS] {
        &self.points
    }

    /// Iterate over the points in anatomical order
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.points.iter()
    }

    /// Wrist position
    #[must_use]
    pub fn wrist(&self) -> &Landmark {
        &self.points[index::WRIST]
    }

    /// Thumb tip position
    #[must_use]
    pub fn thumb_tip(&self) -> &Landmark {
        &self.points[index::THUMB_TIP]
    }

    /// Index fingertip position
    #[must_use]
    pub fn index_tip(&self) -> &Landmark {
        &self.points[index::INDEX_FINGER_TIP]
    }

    /// Middle fingertip position
    #[must_use]
    pub fn middle_tip(&self) -> &Landmark {
        &self.points[index::MIDDLE_FINGER_TIP]
    }

    /// Ring fingertip position
    #[must_use]
    pub fn ring_tip(&self) -> &Landmark {
        &self.points[index::RING_FINGER_TIP]
    }

    /// Pinky fingertip position
    #[must_use]
    pub fn pinky_tip(&self) -> &Landmark {
        &self.points[index::PINKY_TIP]
    }

    /// Distance between two landmarks in the image plane
    #[must_use]
    pub fn distance_2d(&self, a: usize, b: usize) -> f32 {
        self.points[a].distance_2d(&self.points[b])
    }
}

impl TryFrom<Vec<Landmark>> for HandLandmarkSet {
    type Error = Error;

    fn try_from(points: Vec<Landmark>) -> Result<Self> {
        Self::from_slice(&points)
    }
}
