// SPDX-License-Identifier: GPL-3.0-only

//! Thermal camera MJPEG streamer
//!
//! Captures frames from a thermal camera whose V4L2 node delivers a YUYV
//! visual image stacked on top of raw temperature samples, turns each frame
//! into a false-color image annotated with the center temperature, and
//! serves the result to any number of browsers as a motion-JPEG stream.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────┐   ┌──────────────┐
//! │ V4L2 camera  │──▶│ FramePipeline│──▶│ FrameStore │──▶│ HTTP streams │
//! └──────────────┘   └──────────────┘   └────────────┘   └──────────────┘
//!        capture thread                        │
//!                                              └──▶ terminal display
//! ```
//!
//! - [`backends`]: camera access and the capture thread lifecycle
//! - [`thermal`]: temperature decoding
//! - [`media`]: color conversion, colormap, text overlay, JPEG
//! - [`pipelines`]: raw frame to [`AnnotatedFrame`]
//! - [`frame_store`]: latest-frame hand-off between capture and streams
//! - [`capture`]: the per-frame capture step
//! - [`server`]: HTTP routes and MJPEG framing
//! - [`terminal`]: optional local viewer

pub mod backends;
pub mod capture;
pub mod config;
pub mod constants;
pub mod errors;
pub mod frame_store;
pub mod media;
pub mod pipelines;
pub mod platform;
pub mod server;
pub mod shutdown;
pub mod terminal;
pub mod thermal;

pub use config::Config;
pub use errors::{AppError, AppResult};
pub use frame_store::{FrameStore, FrameSubscriber};
pub use pipelines::{AnnotatedFrame, FramePipeline};
