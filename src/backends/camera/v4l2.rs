// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 capture for the thermal camera
//!
//! The camera advertises a YUYV stream twice as tall as the sensor. The
//! buffers must be read unconverted: the lower half is thermal data, not
//! video, so any colorspace conversion on the way in would destroy it.

use super::types::RawFrame;
use super::FrameSource;
use crate::constants::sensor;
use crate::errors::CameraError;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

/// Number of mmap buffers requested from the driver
const BUFFER_COUNT: u32 = 4;

/// Longest wait for one frame before the read reports a timeout
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Thermal camera opened through V4L2
///
/// Owns the device exclusively; dropping it stops streaming and closes the node.
pub struct V4l2Camera {
    device_path: String,
    stream: MmapStream<'static>,
    _device: Device,
}

impl V4l2Camera {
    /// Open the device node and start streaming raw frames
    pub fn open(device_path: &str) -> Result<Self, CameraError> {
        info!(device_path, "Opening V4L2 device for thermal capture");

        let device = Device::with_path(device_path)
            .map_err(|e| CameraError::OpenFailed(format!("{}: {}", device_path, e)))?;

        let mut format = device
            .format()
            .map_err(|e| CameraError::InvalidFormat(format!("Failed to query format: {}", e)))?;
        format.width = sensor::WIDTH;
        format.height = sensor::DEVICE_HEIGHT;
        format.fourcc = v4l::FourCC::new(b"YUYV");

        match device.set_format(&format) {
            Ok(f) => {
                info!(
                    width = f.width,
                    height = f.height,
                    fourcc = ?f.fourcc,
                    "Set V4L2 format"
                );
                if f.width != sensor::WIDTH || f.height != sensor::DEVICE_HEIGHT {
                    warn!(
                        expected_width = sensor::WIDTH,
                        expected_height = sensor::DEVICE_HEIGHT,
                        got_width = f.width,
                        got_height = f.height,
                        "Device did not accept the thermal frame size, frames will likely be rejected"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not set format, using current device format");
            }
        }

        let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|e| CameraError::OpenFailed(format!("Failed to create buffer stream: {}", e)))?;

        stream.set_timeout(READ_TIMEOUT);

        info!(device_path, "V4L2 capture stream started");

        Ok(Self {
            device_path: device_path.to_string(),
            stream,
            _device: device,
        })
    }
}

impl FrameSource for V4l2Camera {
    fn next_frame(&mut self) -> Result<RawFrame, CameraError> {
        static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

        let (buf, meta) = self
            .stream
            .next()
            .map_err(|e| match e.kind() {
                io::ErrorKind::TimedOut => CameraError::TimedOut,
                _ => CameraError::ReadFailed(e.to_string()),
            })?;

        if buf.is_empty() {
            return Err(CameraError::Disconnected);
        }

        let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
        if frame_num % 250 == 0 {
            debug!(
                frame = frame_num,
                sequence = meta.sequence,
                size = buf.len(),
                "Raw thermal frame captured"
            );
        }

        Ok(RawFrame::new(buf, meta.sequence))
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        info!(device_path = %self.device_path, "Releasing V4L2 device");
    }
}
