//! Background frame processing.
//!
//! [`PipelineWorker`] drives a [`GestureSession`] on its own thread so the
//! display loop never blocks on capture or inference. The newest
//! [`WorkerEvent`] is published through a one-slot [`LatestFrame`]; older
//! unread events are dropped.

use crate::{
    capture::FrameSource,
    constants::WORKER_SHUTDOWN_TIMEOUT_MS,
    hand_landmarks::LandmarkProvider,
    pipeline::{FrameOutput, GestureSession},
    Result,
};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use log::{debug, info, warn};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Single-slot mailbox that always holds the most recent value
pub struct LatestFrame<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> LatestFrame<T> {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    /// Store `value`, replacing anything not yet taken
    pub fn publish(&self, value: T) {
        match self.tx.try_send(value) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(value)) => {
                let _ = self.rx.try_recv();
                // The consumer may have emptied the slot in between; either way it fits now
                let _ = self.tx.try_send(value);
            }
        }
    }

    /// Take the stored value, if any
    #[must_use]
    pub fn take(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Default for LatestFrame<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for LatestFrame<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

/// Outcome of one worker iteration
#[derive(Clone)]
pub enum WorkerEvent {
    /// A frame went through the pipeline
    Frame(FrameOutput),
    /// The source delivered no frame
    ReadFailed,
    /// The iteration failed after the read
    Failed(String),
}

/// Runs a gesture session on a background thread
pub struct PipelineWorker {
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: Option<JoinHandle<()>>,
    latest: LatestFrame<WorkerEvent>,
}

impl PipelineWorker {
    /// Move `session` onto a new thread and start processing
    ///
    /// The worker waits `refresh` between iterations. Every iteration
    /// publishes a [`WorkerEvent`]; failed reads and per-frame errors are
    /// logged and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned
    pub fn spawn<S, P>(mut session: GestureSession<S, P>, refresh: Duration) -> Result<Self>
    where
        S: FrameSource + Send + 'static,
        P: LandmarkProvider + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (done_tx, done_rx) = bounded::<()>(1);
        let latest = LatestFrame::new();
        let publisher = latest.clone();

        let handle = thread::Builder::new()
            .name("gesture-pipeline".to_string())
            .spawn(move || {
                info!("Pipeline worker started (refresh {:?})", refresh);
                let mut reads_failing = false;
                loop {
                    match stop_rx.try_recv() {
                        Ok(()) | Err(TryRecvError::Disconnected) => break,
                        Err(TryRecvError::Empty) => {}
                    }

                    match session.process_frame() {
                        Ok(Some(output)) => {
                            if reads_failing {
                                info!("Frame reads recovered");
                                reads_failing = false;
                            }
                            publisher.publish(WorkerEvent::Frame(output));
                        }
                        Ok(None) => {
                            if !reads_failing {
                                warn!("Failed to read frame, skipping until the camera recovers");
                                reads_failing = true;
                            }
                            publisher.publish(WorkerEvent::ReadFailed);
                        }
                        Err(e) => {
                            warn!("Frame processing failed: {}", e);
                            publisher.publish(WorkerEvent::Failed(e.to_string()));
                        }
                    }

                    match stop_rx.recv_timeout(refresh) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                }
                session.close();
                info!("Pipeline worker stopped");
                let _ = done_tx.send(());
            })?;

        Ok(Self {
            stop_tx,
            done_rx,
            handle: Some(handle),
            latest,
        })
    }

    /// Most recent event not yet taken
    #[must_use]
    pub fn latest(&self) -> Option<WorkerEvent> {
        self.latest.take()
    }

    /// Whether the background thread is still processing
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the worker, waiting up to the default shutdown timeout
    ///
    /// Returns `false` if the thread had to be detached.
    pub fn stop(&mut self) -> bool {
        self.stop_within(Duration::from_millis(WORKER_SHUTDOWN_TIMEOUT_MS))
    }

    /// Stop the worker, waiting at most `timeout` for it to release the session
    ///
    /// Stopping an already stopped worker returns `true` immediately. A
    /// thread that does not finish in time is detached and keeps running
    /// until its current iteration returns. The session, and with it the
    /// capture device, is only released at that point, so opening the same
    /// device again before then can find it busy.
    pub fn stop_within(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        let _ = self.stop_tx.try_send(());

        match self.done_rx.recv_timeout(timeout) {
            Ok(()) => {
                if handle.join().is_err() {
                    warn!("Pipeline worker panicked during shutdown");
                }
                debug!("Pipeline worker joined");
                true
            }
            Err(RecvTimeoutError::Disconnected) => {
                // done_tx dropped without a send: the thread panicked
                warn!("Pipeline worker exited abnormally");
                let _ = handle.join();
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("Pipeline worker did not stop within {:?}, detaching", timeout);
                false
            }
        }
    }
}

impl Drop for PipelineWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
