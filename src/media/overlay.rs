// SPDX-License-Identifier: GPL-3.0-only
//! Text overlay burned into the output image
//!
//! Glyphs come from the 8x8 public-domain bitmap font and are drawn as
//! filled squares, so no font file is needed at runtime.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Glyph cell size in font pixels
const GLYPH_SIZE: u32 = 8;

/// Style of an overlay string
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    /// Each font pixel becomes a `scale` x `scale` square
    pub scale: u32,
    pub color: [u8; 3],
}

/// Width in pixels that `text` occupies when drawn with `style`
pub fn text_width(text: &str, style: &TextStyle) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * style.scale
}

/// Draw `text` with its left edge at `x` and its baseline at `baseline_y`
///
/// Characters missing from the font are skipped but still advance the pen.
/// Pixels falling outside the image are clipped.
pub fn draw_text(image: &mut RgbImage, text: &str, x: i32, baseline_y: i32, style: &TextStyle) {
    let cell = (GLYPH_SIZE * style.scale) as i32;
    let top = baseline_y - cell;
    let color = Rgb(style.color);

    for (index, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let origin_x = x + index as i32 * cell;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // Bit 0 is the leftmost pixel
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = origin_x + col as i32 * style.scale as i32;
                let py = top + row as i32 * style.scale as i32;
                draw_filled_rect_mut(
                    image,
                    Rect::at(px, py).of_size(style.scale, style.scale),
                    color,
                );
            }
        }
    }
}

/// Label for a temperature reading, e.g. `"36.6C"`
pub fn temperature_label(celsius: f32) -> String {
    format!("{:.1}C", celsius)
}
