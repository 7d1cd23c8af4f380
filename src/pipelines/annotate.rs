// SPDX-License-Identifier: GPL-3.0-only

//! Raw thermal frame to annotated false-color image

use crate::backends::camera::RawFrame;
use crate::config::PipelineSettings;
use crate::constants::{overlay, sensor};
use crate::errors::FrameError;
use crate::media::{
    TextStyle, apply_jet, draw_text, encode_rgb_jpeg, rgb_to_luma, scale_brightness,
    temperature_label, yuyv_to_rgb,
};
use crate::thermal::probe_temperature;
use bytes::Bytes;
use image::RgbImage;
use image::imageops::{self, FilterType};
use std::sync::OnceLock;
use std::time::Instant;

/// A processed frame ready for display and streaming
///
/// Immutable once built. The JPEG encoding is computed on first request and
/// cached, so any number of stream clients share a single encode per frame.
#[derive(Debug)]
pub struct AnnotatedFrame {
    /// False-color image with the temperature burned in
    pub image: RgbImage,
    /// Temperature at the probe point, degrees Celsius
    pub temperature: f32,
    /// Monotonic frame counter assigned by the capture loop
    pub sequence: u64,
    /// Capture time of the raw frame this was built from
    pub captured_at: Instant,
    jpeg: OnceLock<(u8, Bytes)>,
}

impl AnnotatedFrame {
    pub fn new(image: RgbImage, temperature: f32, sequence: u64) -> Self {
        Self {
            image,
            temperature,
            sequence,
            captured_at: Instant::now(),
            jpeg: OnceLock::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Cached JPEG bytes, if this frame was already encoded at `quality`
    pub fn cached_jpeg(&self, quality: u8) -> Option<Bytes> {
        match self.jpeg.get() {
            Some((q, bytes)) if *q == quality => Some(bytes.clone()),
            _ => None,
        }
    }

    /// JPEG encoding of the frame at `quality`
    ///
    /// Only the first quality requested is cached; other qualities are
    /// encoded on every call.
    pub fn jpeg(&self, quality: u8) -> Result<Bytes, FrameError> {
        if let Some(bytes) = self.cached_jpeg(quality) {
            return Ok(bytes);
        }
        let bytes = encode_rgb_jpeg(&self.image, quality)?;
        // Losing the race to another encoder is fine, both results are identical
        let _ = self.jpeg.set((quality, bytes.clone()));
        Ok(bytes)
    }
}

/// Fixed processing chain for the thermal camera
///
/// ```text
/// RawFrame ─┬─ visual half ─▶ YUYV→RGB ─▶ gain ─▶ upscale ─▶ luma ─▶ blur ─▶ jet ─┐
///           └─ thermal half ─▶ probe temperature ────────────────────────▶ label ─┴─▶ AnnotatedFrame
/// ```
#[derive(Debug, Clone)]
pub struct FramePipeline {
    settings: PipelineSettings,
    text_style: TextStyle,
}

impl FramePipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self {
            settings,
            text_style: TextStyle {
                scale: overlay::GLYPH_SCALE,
                color: overlay::TEXT_COLOR,
            },
        }
    }

    /// Output image size in pixels
    pub fn output_size(&self) -> (u32, u32) {
        let scale = self.settings.scale.max(1);
        (sensor::WIDTH * scale, sensor::HEIGHT * scale)
    }

    /// Build an annotated frame from one raw camera buffer
    pub fn process(&self, raw: &RawFrame, sequence: u64) -> Result<AnnotatedFrame, FrameError> {
        let (visual, thermal) = raw.halves()?;

        let temperature = probe_temperature(thermal).ok_or(FrameError::TooShort {
            expected: sensor::HALF_SIZE,
            got: thermal.len(),
        })?;

        let mut rgb = yuyv_to_rgb(visual, sensor::WIDTH, sensor::HEIGHT).ok_or_else(|| {
            FrameError::InvalidImage("visual half does not hold a full YUYV image".into())
        })?;
        scale_brightness(&mut rgb, self.settings.alpha);

        let (out_width, out_height) = self.output_size();
        let upscaled = if (out_width, out_height) == rgb.dimensions() {
            rgb
        } else {
            imageops::resize(&rgb, out_width, out_height, FilterType::CatmullRom)
        };

        // The palette is indexed by intensity
        let mut intensity = rgb_to_luma(&upscaled);
        if self.settings.blur > 1 {
            // Box kernel of 2r+1 pixels; even sizes round up to the next odd size
            let radius = self.settings.blur / 2;
            intensity = imageproc::filter::box_filter(&intensity, radius, radius);
        }

        let mut heatmap = apply_jet(&intensity);
        draw_text(
            &mut heatmap,
            &temperature_label(temperature),
            overlay::TEXT_X,
            overlay::TEXT_BASELINE_Y,
            &self.text_style,
        );

        let mut frame = AnnotatedFrame::new(heatmap, temperature, sequence);
        frame.captured_at = raw.captured_at;
        Ok(frame)
    }
}
