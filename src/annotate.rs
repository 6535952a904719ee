//! Frame annotation: hand skeleton overlay and gesture captions.

use crate::{
    gesture::{describe, Gesture},
    landmark::{HandLandmarkSet, HAND_CONNECTIONS},
    Result,
};
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};

const BONE_COLOR: (f64, f64, f64) = (255.0, 255.0, 255.0);
const JOINT_COLOR: (f64, f64, f64) = (0.0, 0.0, 255.0);
const CAPTION_COLOR: (f64, f64, f64) = (0.0, 255.0, 255.0);

fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

/// Map a normalized coordinate to a pixel index inside `[0, extent)`
///
/// Non-finite values map to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn to_pixel(normalized: f32, extent: i32) -> i32 {
    let max = (extent - 1).max(0);
    if !normalized.is_finite() {
        return 0;
    }
    let px = (normalized * extent as f32).round();
    (px.clamp(0.0, max as f32) as i32).clamp(0, max)
}

/// Draw the 21-point skeleton on a BGR frame
///
/// # Errors
///
/// Returns an error if an `OpenCV` drawing call fails
pub fn draw_hand(frame: &mut Mat, hand: &HandLandmarkSet) -> Result<()> {
    let (width, height) = (frame.cols(), frame.rows());
    let pixels: Vec<Point> = hand
        .iter()
        .map(|lm| Point::new(to_pixel(lm.x, width), to_pixel(lm.y, height)))
        .collect();

    for (a, b) in HAND_CONNECTIONS {
        imgproc::line(frame, pixels[a], pixels[b], bgr(BONE_COLOR), 2, LINE_8, 0)?;
    }
    for &p in &pixels {
        imgproc::circle(frame, p, 4, bgr(JOINT_COLOR), -1, LINE_8, 0)?;
    }
    Ok(())
}

/// Write `lines` top-left onto the frame, one per row
///
/// # Errors
///
/// Returns an error if an `OpenCV` drawing call fails
pub fn draw_text_lines(frame: &mut Mat, lines: &[&str], origin: Point, scale: f64, color: Scalar) -> Result<()> {
    #[allow(clippy::cast_possible_truncation)]
    let line_height = (30.0 * scale).max(12.0) as i32;
    for (row, line) in (0i32..).zip(lines) {
        let y = origin.y + line_height * row;
        imgproc::put_text(
            frame,
            line,
            Point::new(origin.x, y),
            FONT_HERSHEY_SIMPLEX,
            scale,
            color,
            1,
            LINE_8,
            false,
        )?;
    }
    Ok(())
}

/// Write the gesture label and its description onto the frame
///
/// # Errors
///
/// Returns an error if an `OpenCV` drawing call fails
pub fn draw_gesture_caption(frame: &mut Mat, gesture: Option<Gesture>) -> Result<()> {
    let (name, description) = describe(gesture);
    let label = format!("Gesture: {name}");
    let detail = format!("Description: {description}");
    draw_text_lines(frame, &[&label, &detail], Point::new(10, 30), 0.6, bgr(CAPTION_COLOR))
}

/// Copy of `frame` with the skeleton drawn when a hand was found
///
/// # Errors
///
/// Returns an error if the frame cannot be cloned or drawn on
pub fn annotate_frame(frame: &Mat, hand: Option<&HandLandmarkSet>) -> Result<Mat> {
    let mut annotated = frame.try_clone()?;
    if let Some(hand) = hand {
        draw_hand(&mut annotated, hand)?;
    }
    Ok(annotated)
}
