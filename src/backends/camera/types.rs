// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use crate::constants::sensor;
use crate::errors::FrameError;
use std::sync::Arc;
use std::time::Instant;

/// One raw buffer as delivered by the thermal camera
///
/// The buffer holds two stacked `WIDTH` x `HEIGHT` images: YUYV visual data
/// in the top half and 16-bit thermal samples in the bottom half.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Raw bytes, shared so the frame can be handed across threads without copying
    pub data: Arc<[u8]>,
    /// Driver sequence number
    pub sequence: u32,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

impl RawFrame {
    pub fn new(data: impl Into<Arc<[u8]>>, sequence: u32) -> Self {
        Self {
            data: data.into(),
            sequence,
            captured_at: Instant::now(),
        }
    }

    /// Split the buffer into its visual and thermal halves
    ///
    /// Bytes past the fixed layout (some drivers pad the buffer) are ignored.
    pub fn halves(&self) -> Result<(&[u8], &[u8]), FrameError> {
        if self.data.len() < sensor::FRAME_SIZE {
            return Err(FrameError::TooShort {
                expected: sensor::FRAME_SIZE,
                got: self.data.len(),
            });
        }
        let (visual, rest) = self.data.split_at(sensor::HALF_SIZE);
        Ok((visual, &rest[..sensor::HALF_SIZE]))
    }
}

/// Identification of a V4L2 capture node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Device node, e.g. `/dev/video0`
    pub path: String,
    /// Card name reported by the driver
    pub card: String,
    /// Driver name (e.g. "uvcvideo")
    pub driver: String,
}
