// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! The capture loop only needs a source of raw frames. The V4L2 backend is
//! the real implementation; tests drive the loop with scripted sources.
//!
//! ```text
//! ┌──────────────┐   RawFrame   ┌──────────────┐
//! │ FrameSource  │ ───────────▶ │ Capture loop │
//! └──────────────┘              └──────────────┘
//!        ▲
//!   V4l2Camera
//! ```

pub mod frame_loop;
pub mod types;
pub mod v4l2;
pub mod v4l2_utils;

pub use frame_loop::{CaptureLoopController, LoopAction, LoopExit};
pub use types::*;
pub use v4l2::V4l2Camera;

use crate::errors::CameraError;

/// A blocking source of raw camera frames
///
/// `next_frame` blocks until the hardware delivers a frame. Any error ends
/// the capture loop; implementations should not retry internally.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<RawFrame, CameraError>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Result<RawFrame, CameraError> {
        (**self).next_frame()
    }
}
