// SPDX-License-Identifier: GPL-3.0-only
//! False-color mapping

use image::{GrayImage, Rgb, RgbImage};
use std::sync::LazyLock;

/// Jet colormap: dark blue (cold) through cyan, yellow to dark red (hot)
///
/// Piecewise-linear approximation of the classic MATLAB/OpenCV jet palette.
fn jet(t: f32) -> [u8; 3] {
    let channel = |center: f32| (1.5 - (4.0 * t - center).abs()).clamp(0.0, 1.0);
    let r = channel(3.0);
    let g = channel(2.0);
    let b = channel(1.0);
    [
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    ]
}

static JET_LUT: LazyLock<[[u8; 3]; 256]> = LazyLock::new(|| {
    let mut lut = [[0u8; 3]; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = jet(i as f32 / 255.0);
    }
    lut
});

/// Look up the jet color for one intensity value
pub fn jet_color(value: u8) -> [u8; 3] {
    JET_LUT[value as usize]
}

/// Apply the jet palette to a single-channel image
pub fn apply_jet(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        Rgb(jet_color(gray.get_pixel(x, y).0[0]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_jet_endpoints() {
        // Cold end is dark blue, hot end is dark red
        let cold = jet_color(0);
        assert_eq!(cold[0], 0);
        assert_eq!(cold[1], 0);
        assert!(cold[2] >= 127);

        let hot = jet_color(255);
        assert!(hot[0] >= 127);
        assert_eq!(hot[1], 0);
        assert_eq!(hot[2], 0);
    }

    #[test]
    fn test_jet_midpoint_is_greenish() {
        let mid = jet_color(128);
        assert_eq!(mid[1], 255);
    }

    #[test]
    fn test_apply_jet_preserves_dimensions() {
        let gray = GrayImage::from_pixel(4, 3, Luma([0]));
        let colored = apply_jet(&gray);
        assert_eq!(colored.dimensions(), (4, 3));
        assert_eq!(colored.get_pixel(3, 2).0, jet_color(0));
    }
}
