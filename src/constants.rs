// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Sensor geometry of the thermal camera
///
/// The device delivers one buffer per cycle holding two stacked images of
/// `WIDTH` x `HEIGHT` pixels at 2 bytes per pixel: the YUYV visual image
/// followed by the raw thermal samples.
pub mod sensor {
    /// Visual/thermal image width in pixels
    pub const WIDTH: u32 = 256;

    /// Visual/thermal image height in pixels (each half)
    pub const HEIGHT: u32 = 192;

    /// Bytes per pixel in both halves
    pub const BYTES_PER_PIXEL: usize = 2;

    /// Size of one half (visual or thermal) in bytes
    pub const HALF_SIZE: usize = WIDTH as usize * HEIGHT as usize * BYTES_PER_PIXEL;

    /// Size of a complete raw frame in bytes
    pub const FRAME_SIZE: usize = HALF_SIZE * 2;

    /// Row of the temperature probe inside the thermal half
    pub const PROBE_ROW: usize = 96;

    /// Column of the temperature probe inside the thermal half
    pub const PROBE_COL: usize = 128;

    /// Raw thermal readings are in 1/64 Kelvin
    pub const RAW_UNITS_PER_KELVIN: f32 = 64.0;

    /// Offset between Kelvin and Celsius
    pub const KELVIN_OFFSET: f32 = 273.15;

    /// V4L2 node height: both halves stacked
    pub const DEVICE_HEIGHT: u32 = HEIGHT * 2;
}

/// Default image pipeline settings
pub mod pipeline {
    /// Upscale factor applied to the visual image
    pub const DEFAULT_SCALE: u32 = 3;

    /// Brightness gain (1.0 = unchanged)
    pub const DEFAULT_ALPHA: f32 = 1.0;

    /// Blur kernel size in pixels (0 = no blur)
    pub const DEFAULT_BLUR: u32 = 0;

    /// JPEG quality for the stream
    pub const DEFAULT_JPEG_QUALITY: u8 = 80;
}

/// Temperature overlay placement and style
pub mod overlay {
    /// Left edge of the text
    pub const TEXT_X: i32 = 10;

    /// Baseline of the text
    pub const TEXT_BASELINE_Y: i32 = 30;

    /// Glyph magnification (8x8 glyphs become 24x24)
    pub const GLYPH_SCALE: u32 = 3;

    /// Text color (white)
    pub const TEXT_COLOR: [u8; 3] = [255, 255, 255];
}

/// HTTP surface
pub mod http {
    use std::time::Duration;

    /// Default listen port
    pub const DEFAULT_PORT: u16 = 8000;

    /// Multipart boundary token
    pub const BOUNDARY: &str = "frame";

    /// Route of the static viewer page
    pub const INDEX_PATH: &str = "/";

    /// Route of the MJPEG stream
    pub const STREAM_PATH: &str = "/stream";

    /// Interval after which an idle stream re-sends the last frame
    pub const RESEND_INTERVAL: Duration = Duration::from_secs(1);
}

/// Quit key for the local display
pub const QUIT_KEY: char = 'q';
