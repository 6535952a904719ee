//! Video capture sources.

use crate::{Error, Result};
use log::{debug, info, warn};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};

/// A source of BGR frames
pub trait FrameSource {
    /// Whether the device is open and can be read
    fn is_opened(&self) -> bool;

    /// Blocking read of one frame
    ///
    /// Returns `Ok(None)` when the device produced no data for this read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFailure`] if this read failed but the device may
    /// deliver later frames, or another error if the device is unusable
    fn read(&mut self) -> Result<Option<Mat>>;

    /// Release the device; releasing twice is a no-op
    fn release(&mut self);
}

/// Webcam opened by device index
pub struct CameraCapture {
    index: i32,
    capture: Option<VideoCapture>,
}

impl CameraCapture {
    /// Open the camera at `index`
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceUnavailable`] if the device cannot be opened
    pub fn open(index: i32) -> Result<Self> {
        info!("Opening camera {}", index);
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::ResourceUnavailable(format!("cannot open camera index {index}")));
        }

        // Keep only the newest frame in the driver queue
        if let Err(e) = capture.set(CAP_PROP_BUFFERSIZE, 1.0) {
            debug!("Camera {} does not support buffer size control: {}", index, e);
        }

        Ok(Self {
            index,
            capture: Some(capture),
        })
    }

    /// Device index this capture was opened with
    #[must_use]
    pub fn index(&self) -> i32 {
        self.index
    }
}

impl FrameSource for CameraCapture {
    fn is_opened(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(|cap| cap.is_opened().unwrap_or(false))
    }

    fn read(&mut self) -> Result<Option<Mat>> {
        let capture = self
            .capture
            .as_mut()
            .ok_or_else(|| Error::ResourceUnavailable(format!("camera {} is released", self.index)))?;

        let mut frame = Mat::default();
        let grabbed = capture
            .read(&mut frame)
            .map_err(|e| Error::ReadFailure(format!("camera {}: {}", self.index, e)))?;
        if !grabbed || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                warn!("Failed to release camera {}: {}", self.index, e);
            } else {
                info!("Camera {} released", self.index);
            }
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.release();
    }
}
