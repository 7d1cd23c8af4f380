// SPDX-License-Identifier: GPL-3.0-only

//! Shared V4L2 utility functions

use super::types::DeviceInfo;
use tracing::debug;
use v4l::capability::Flags;
use v4l::prelude::*;

/// Device node for a camera index (`/dev/video<N>`)
pub fn device_path(index: u32) -> String {
    format!("/dev/video{}", index)
}

/// Query driver and card name for a device node
///
/// Returns None if the device cannot be opened or is not a video capture node
/// (UVC cameras also expose metadata nodes that cannot stream frames).
pub fn query_capture_device(path: &str) -> Option<DeviceInfo> {
    let device = Device::with_path(path).ok()?;
    let caps = device.query_caps().ok()?;

    if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
        debug!(path, "Skipping non-capture V4L2 node");
        return None;
    }

    debug!(path, driver = %caps.driver, card = %caps.card, "Got V4L2 capabilities");
    Some(DeviceInfo {
        path: path.to_string(),
        card: caps.card,
        driver: caps.driver,
    })
}

/// Enumerate V4L2 video capture devices, sorted by index
pub fn list_capture_devices() -> Vec<DeviceInfo> {
    let mut nodes: Vec<(usize, String)> = v4l::context::enum_devices()
        .into_iter()
        .map(|node| (node.index(), node.path().to_string_lossy().to_string()))
        .collect();
    nodes.sort_by_key(|(index, _)| *index);

    nodes
        .into_iter()
        .filter_map(|(_, path)| query_capture_device(&path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_path_from_index() {
        assert_eq!(device_path(0), "/dev/video0");
        assert_eq!(device_path(12), "/dev/video12");
    }

    #[test]
    fn test_missing_device_is_none() {
        assert!(query_capture_device("/dev/video-does-not-exist").is_none());
    }
}
