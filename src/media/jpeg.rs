// SPDX-License-Identifier: GPL-3.0-only
//! JPEG encoding for the MJPEG stream

use crate::errors::FrameError;
use bytes::Bytes;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;

/// Encode an RGB image as JPEG
pub fn encode_rgb_jpeg(image: &RgbImage, quality: u8) -> Result<Bytes, FrameError> {
    let mut jpeg_bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
    encoder.encode_image(image)?;
    Ok(Bytes::from(jpeg_bytes))
}
