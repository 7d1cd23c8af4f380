// SPDX-License-Identifier: GPL-3.0-only

//! Image processing building blocks
//!
//! - [`conversions`]: YUYV to RGB, brightness gain, luma reduction
//! - [`colormap`]: jet false-color palette
//! - [`overlay`]: bitmap text burned into frames
//! - [`jpeg`]: JPEG encoding for the stream

pub mod colormap;
pub mod conversions;
pub mod jpeg;
pub mod overlay;

pub use colormap::apply_jet;
pub use conversions::{rgb_to_luma, scale_brightness, yuyv_to_rgb};
pub use jpeg::encode_rgb_jpeg;
pub use overlay::{TextStyle, draw_text, temperature_label};
