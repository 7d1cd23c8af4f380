// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing pipeline
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌────────────────┐
//! │  Raw frame   │ ──▶ │  FramePipeline    │ ──▶ │ AnnotatedFrame │
//! │ (YUYV + 16b) │     │  - YUYV→RGB, gain │     │ (RGB + temp)   │
//! │              │     │  - upscale, blur  │     │                │
//! │              │     │  - jet, label     │     │                │
//! └──────────────┘     └───────────────────┘     └────────────────┘
//! ```

pub mod annotate;

pub use annotate::{AnnotatedFrame, FramePipeline};
