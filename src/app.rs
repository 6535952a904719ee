//! Interactive application: live video, gesture caption and event log.

use crate::{
    annotate::{draw_gesture_caption, draw_text_lines},
    backend::Backend,
    config::Config,
    constants::GESTURE_LOG_CAPACITY,
    error::Result,
    gesture::Gesture,
    pipeline::GestureSession,
    worker::{PipelineWorker, WorkerEvent},
};
use log::{info, warn};
use opencv::{
    core::{Mat, Point, Rect, Scalar, Size, CV_8UC3},
    highgui::{self, WINDOW_AUTOSIZE, WND_PROP_VISIBLE},
    imgproc::{self, INTER_LINEAR},
    prelude::*,
};
use std::collections::VecDeque;
use std::time::Duration;

const WINDOW_NAME: &str = "Makaton Gesture Recognition";
const VIDEO_WIDTH: i32 = 640;
const VIDEO_HEIGHT: i32 = 480;
const PANEL_WIDTH: i32 = 320;
const KEY_HELP: &str = "s: start  x: stop  c: clear  q: quit";

/// User command bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open the camera and start recognising
    Start,
    /// Stop recognising and release the camera
    Stop,
    /// Clear the gesture log
    Clear,
    /// Leave the application
    Exit,
}

impl Command {
    /// Map a `wait_key` code to a command
    #[must_use]
    pub fn from_key(key: i32) -> Option<Self> {
        if key < 0 {
            return None;
        }
        match key & 0xFF {
            k if k == i32::from(b's') => Some(Self::Start),
            k if k == i32::from(b'x') => Some(Self::Stop),
            k if k == i32::from(b'c') => Some(Self::Clear),
            k if k == i32::from(b'q') || k == 27 => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Bounded list of recent gesture events, newest last
#[derive(Debug, Clone)]
pub struct GestureLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for GestureLog {
    fn default() -> Self {
        Self::with_capacity(GESTURE_LOG_CAPACITY)
    }
}

impl GestureLog {
    /// Create a log keeping at most `capacity` entries
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, dropping the oldest when full
    pub fn push(&mut self, entry: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from oldest to newest
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Interactive gesture recognition application
pub struct GestureApp<B: Backend> {
    backend: B,
    config: Config,
    worker: Option<PipelineWorker>,
    frame: Option<Mat>,
    gesture: Option<Gesture>,
    last_logged: Option<Gesture>,
    status: String,
    log: GestureLog,
}

impl<B> GestureApp<B>
where
    B: Backend,
    B::Source: Send + 'static,
    B::Provider: Send + 'static,
{
    /// Create the application; nothing is opened until [`Command::Start`]
    pub fn new(backend: B, config: Config) -> Self {
        Self {
            backend,
            config,
            worker: None,
            frame: None,
            gesture: None,
            last_logged: None,
            status: "Stopped".to_string(),
            log: GestureLog::default(),
        }
    }

    /// Current status line
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Recent gesture events
    #[must_use]
    pub fn log(&self) -> &GestureLog {
        &self.log
    }

    /// Gesture shown in the caption
    #[must_use]
    pub fn gesture(&self) -> Option<Gesture> {
        self.gesture
    }

    /// Whether recognition is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(PipelineWorker::is_running)
    }

    /// Apply a command; returns `false` when the application should exit
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Clear => self.log.clear(),
            Command::Exit => {
                self.stop();
                return false;
            }
        }
        true
    }

    /// Open the camera and landmark model and start the background worker
    ///
    /// Failures are reported on the status line.
    pub fn start(&mut self) {
        if self.is_running() {
            self.status = "Already running".to_string();
            return;
        }
        let index = self.config.camera.index;
        match self.spawn_worker(index) {
            Ok(worker) => {
                self.worker = Some(worker);
                self.status = format!("Running (camera {index})");
                info!("Recognition started on camera {}", index);
            }
            Err(e) => {
                warn!("Cannot start recognition: {}", e);
                self.status = format!("Error: {e}");
            }
        }
    }

    fn spawn_worker(&self, index: i32) -> Result<PipelineWorker> {
        let source = self.backend.open_source(index)?;
        let provider = self.backend.open_provider()?;
        let session = GestureSession::open(source, provider, self.config.gesture_thresholds)?;
        PipelineWorker::spawn(session, Duration::from_millis(self.config.gui.refresh_ms))
    }

    /// Stop the worker and blank the video area
    pub fn stop(&mut self) {
        let mut status = "Stopped";
        if let Some(mut worker) = self.worker.take() {
            if worker.stop() {
                info!("Recognition stopped");
            } else {
                status = "Stopped (camera still closing)";
            }
        }
        self.clear_gesture();
        self.status = status.to_string();
    }

    fn clear_gesture(&mut self) {
        self.frame = None;
        self.gesture = None;
        self.last_logged = None;
    }

    /// Pull the newest event from the worker, if any
    ///
    /// A failed read or processing error clears the gesture and shows the
    /// problem on the status line until frames arrive again.
    pub fn poll(&mut self) {
        let Some(event) = self.worker.as_ref().and_then(PipelineWorker::latest) else {
            return;
        };
        let index = self.config.camera.index;
        match event {
            WorkerEvent::Frame(output) => {
                self.gesture = output.gesture;
                if let Some(gesture) = output.gesture {
                    if self.last_logged != Some(gesture) {
                        self.log.push(format!("Gesture: {gesture}"));
                    }
                }
                self.last_logged = output.gesture;
                self.frame = Some(output.frame);
                self.status = format!("Running (camera {index})");
            }
            WorkerEvent::ReadFailed => {
                self.clear_gesture();
                self.status = format!("No frames from camera {index}");
            }
            WorkerEvent::Failed(reason) => {
                self.clear_gesture();
                self.status = format!("Error: {reason}");
            }
        }
    }

    /// Compose the window contents
    ///
    /// # Errors
    ///
    /// Returns an error if an `OpenCV` drawing call fails
    pub fn render(&self) -> Result<Mat> {
        let mut canvas = Mat::zeros(VIDEO_HEIGHT, VIDEO_WIDTH + PANEL_WIDTH, CV_8UC3)?.to_mat()?;

        if let Some(frame) = &self.frame {
            let mut scaled = Mat::default();
            imgproc::resize(
                frame,
                &mut scaled,
                Size::new(VIDEO_WIDTH, VIDEO_HEIGHT),
                0.0,
                0.0,
                INTER_LINEAR,
            )?;
            let mut video = canvas.roi_mut(Rect::new(0, 0, VIDEO_WIDTH, VIDEO_HEIGHT))?;
            scaled.copy_to(&mut video)?;
        }
        draw_gesture_caption(&mut canvas, self.gesture)?;

        let white = Scalar::new(255.0, 255.0, 255.0, 0.0);
        let grey = Scalar::new(180.0, 180.0, 180.0, 0.0);
        let panel_x = VIDEO_WIDTH + 10;
        draw_text_lines(&mut canvas, &[&self.status], Point::new(panel_x, 30), 0.6, white)?;
        draw_text_lines(&mut canvas, &[KEY_HELP], Point::new(panel_x, 60), 0.45, grey)?;

        let entries: Vec<&str> = self.log.entries().collect();
        draw_text_lines(&mut canvas, &["Gesture log:"], Point::new(panel_x, 110), 0.55, white)?;
        draw_text_lines(&mut canvas, &entries, Point::new(panel_x, 140), 0.5, white)?;

        Ok(canvas)
    }

    /// Run the window loop until the user exits or closes the window
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be created or updated
    pub fn run(&mut self) -> Result<()> {
        info!("Starting interactive window");
        highgui::named_window(WINDOW_NAME, WINDOW_AUTOSIZE)?;
        let delay = i32::try_from(self.config.gui.refresh_ms.max(1)).unwrap_or(i32::MAX);

        loop {
            self.poll();
            let canvas = self.render()?;
            highgui::imshow(WINDOW_NAME, &canvas)?;

            let key = highgui::wait_key(delay)?;
            if let Some(command) = Command::from_key(key) {
                if !self.handle(command) {
                    info!("Exit requested by user");
                    break;
                }
            }
            if highgui::get_window_property(WINDOW_NAME, WND_PROP_VISIBLE)? < 1.0 {
                info!("Window closed");
                self.stop();
                break;
            }
        }

        highgui::destroy_all_windows()?;
        info!("Application shutting down");
        Ok(())
    }
}
