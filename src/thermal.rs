// SPDX-License-Identifier: GPL-3.0-only

//! Temperature decoding from the thermal half of a raw frame
//!
//! Each thermal pixel is two bytes. The reading combines them as
//! `first + second * 256` (little-endian) in units of 1/64 Kelvin.
//! Vendor tooling labels the first byte "hi" and the second "lo", which is
//! the reverse of what the arithmetic does; the arithmetic is what matches
//! the hardware, so the labels are ignored here.

use crate::constants::sensor;

/// Combine the two bytes of a thermal pixel into a raw reading
pub fn raw_reading(first: u8, second: u8) -> u16 {
    u16::from_le_bytes([first, second])
}

/// Convert a raw reading (1/64 K) to degrees Celsius
pub fn raw_to_celsius(raw: u16) -> f32 {
    raw as f32 / sensor::RAW_UNITS_PER_KELVIN - sensor::KELVIN_OFFSET
}

/// Decode the temperature of one thermal pixel from its two bytes
pub fn decode_temperature(first: u8, second: u8) -> f32 {
    raw_to_celsius(raw_reading(first, second))
}

/// Temperature at (`row`, `col`) of a thermal half
///
/// Returns None when the coordinate lies outside `thermal`.
pub fn temperature_at(thermal: &[u8], row: usize, col: usize) -> Option<f32> {
    let offset = (row * sensor::WIDTH as usize + col) * sensor::BYTES_PER_PIXEL;
    let bytes = thermal.get(offset..offset + 2)?;
    Some(decode_temperature(bytes[0], bytes[1]))
}

/// Temperature at the fixed probe point in the middle of the sensor
pub fn probe_temperature(thermal: &[u8]) -> Option<f32> {
    temperature_at(thermal, sensor::PROBE_ROW, sensor::PROBE_COL)
}
