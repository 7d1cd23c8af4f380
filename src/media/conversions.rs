// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion utilities for the visual half of a thermal frame

use image::{GrayImage, Luma, RgbImage};

/// Convert YUYV (YUV 4:2:2) to RGB
///
/// YUYV format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
/// Uses BT.601 coefficients for YUV to RGB conversion.
/// Returns None if `data` is shorter than `width * height * 2` bytes.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Option<RgbImage> {
    let pixel_count = (width * height) as usize;
    if data.len() < pixel_count * 2 {
        return None;
    }

    let mut rgb = Vec::with_capacity(pixel_count * 3);

    // YUYV: Y0 U Y1 V - processes 2 pixels at a time
    for chunk in data[..pixel_count * 2].chunks_exact(4) {
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        for y in [y0, y1] {
            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

            rgb.push(r);
            rgb.push(g);
            rgb.push(b);
        }
    }

    RgbImage::from_raw(width, height, rgb)
}

/// Multiply every channel by `alpha`, saturating to 0..=255
///
/// A gain of exactly 1.0 leaves the image untouched.
pub fn scale_brightness(image: &mut RgbImage, alpha: f32) {
    if alpha == 1.0 {
        return;
    }
    for value in image.iter_mut() {
        *value = (*value as f32 * alpha).abs().round().clamp(0.0, 255.0) as u8;
    }
}

/// Collapse RGB to luma with BT.601 weights
///
/// The colormap stage indexes its palette by intensity, so the color image
/// is reduced to one channel before blurring and mapping.
pub fn rgb_to_luma(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}
