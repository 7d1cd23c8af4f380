// SPDX-License-Identifier: GPL-3.0-only

//! Hardware access layer
//!
//! - [`camera`]: V4L2 frame capture and the capture thread controller

pub mod camera;
