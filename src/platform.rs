// SPDX-License-Identifier: GPL-3.0-only

//! Host platform detection

use std::path::Path;
use tracing::debug;

const DEVICE_TREE_MODEL: &str = "/sys/firmware/devicetree/base/model";

/// Whether a device-tree model string names a Raspberry Pi
pub fn model_is_raspberry_pi(model: &str) -> bool {
    model.to_lowercase().contains("raspberry pi")
}

/// Board model from the device tree, if the host exposes one
pub fn board_model() -> Option<String> {
    read_model(Path::new(DEVICE_TREE_MODEL))
}

fn read_model(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        // The device tree string is NUL-terminated
        Ok(model) => Some(model.trim_end_matches('\0').trim().to_string()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No device-tree model");
            None
        }
    }
}
