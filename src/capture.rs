// SPDX-License-Identifier: GPL-3.0-only

//! Capture loop: read, process, publish, display
//!
//! One iteration per camera frame. The loop is driven by
//! [`CaptureLoopController`](crate::backends::camera::CaptureLoopController),
//! which calls [`CaptureLoop::step`] until it returns [`LoopAction::Stop`].

use crate::backends::camera::{FrameSource, LoopAction};
use crate::errors::{AppResult, CameraError};
use crate::frame_store::FrameStore;
use crate::pipelines::{AnnotatedFrame, FramePipeline};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the local display wants the loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayAction {
    Continue,
    Quit,
}

/// A local viewer for processed frames
pub trait FrameDisplay: Send {
    /// Show one frame and report whether the user asked to quit
    fn show(&mut self, frame: &AnnotatedFrame) -> AppResult<DisplayAction>;
}

impl<T: FrameDisplay + ?Sized> FrameDisplay for Box<T> {
    fn show(&mut self, frame: &AnnotatedFrame) -> AppResult<DisplayAction> {
        (**self).show(frame)
    }
}

/// State owned by the capture thread
pub struct CaptureLoop<S: FrameSource> {
    source: S,
    pipeline: FramePipeline,
    store: Arc<FrameStore>,
    display: Option<Box<dyn FrameDisplay>>,
    next_sequence: u64,
    skipped: u64,
}

impl<S: FrameSource> CaptureLoop<S> {
    pub fn new(source: S, pipeline: FramePipeline, store: Arc<FrameStore>) -> Self {
        Self {
            source,
            pipeline,
            store,
            display: None,
            next_sequence: 0,
            skipped: 0,
        }
    }

    /// Attach a local display; without one the loop runs headless
    pub fn with_display(mut self, display: Box<dyn FrameDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    /// Frames published so far
    pub fn published(&self) -> u64 {
        self.next_sequence
    }

    /// Frames dropped because they could not be processed
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Run one capture iteration
    ///
    /// A camera error ends the loop, except a read timeout, which only ends
    /// this iteration. A frame that cannot be processed is skipped and the
    /// loop keeps going.
    pub fn step(&mut self) -> LoopAction {
        let raw = match self.source.next_frame() {
            Ok(raw) => raw,
            // A stalled camera is not a failure; returning lets a stop request through
            Err(CameraError::TimedOut) => {
                debug!("No frame within read timeout");
                return LoopAction::Continue;
            }
            Err(e) => {
                warn!(error = %e, published = self.next_sequence, "Camera read failed, stopping capture");
                return LoopAction::Stop;
            }
        };

        let frame = match self.pipeline.process(&raw, self.next_sequence) {
            Ok(frame) => Arc::new(frame),
            Err(e) => {
                self.skipped += 1;
                warn!(error = %e, skipped = self.skipped, "Dropping unusable frame");
                return LoopAction::Continue;
            }
        };
        self.next_sequence += 1;

        if frame.sequence % 250 == 0 {
            debug!(
                sequence = frame.sequence,
                temperature = frame.temperature,
                subscribers = self.store.subscriber_count(),
                "Frame published"
            );
        }
        self.store.publish(Arc::clone(&frame));

        if let Some(display) = self.display.as_mut() {
            match display.show(&frame) {
                Ok(DisplayAction::Continue) => {}
                Ok(DisplayAction::Quit) => {
                    info!("Quit requested from display");
                    return LoopAction::Stop;
                }
                Err(e) => {
                    warn!(error = %e, "Display failed, continuing headless");
                    self.display = None;
                }
            }
        }

        LoopAction::Continue
    }
}
