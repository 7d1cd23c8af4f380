// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the thermal streamer

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Frame decoding/processing errors
    Frame(FrameError),
    /// HTTP server errors
    Stream(StreamError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// Device node could not be opened
    OpenFailed(String),
    /// Device refused the requested format
    InvalidFormat(String),
    /// Reading a frame from the device failed
    ReadFailed(String),
    /// Camera disconnected during operation
    Disconnected,
    /// No frame arrived within the read timeout
    TimedOut,
}

/// Errors for a single raw frame
///
/// These never stop the capture loop; the frame is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer shorter than the fixed sensor layout
    TooShort { expected: usize, got: usize },
    /// Image buffer could not be built from the visual half
    InvalidImage(String),
    /// JPEG encoding failed
    EncodingFailed(String),
}

/// HTTP server errors
#[derive(Debug, Clone)]
pub enum StreamError {
    /// Listen socket could not be bound
    BindFailed(String),
    /// Server stopped with an error
    ServeFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Frame(e) => write!(f, "Frame error: {}", e),
            AppError::Stream(e) => write!(f, "Stream error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::OpenFailed(msg) => write!(f, "Failed to open device: {}", msg),
            CameraError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            CameraError::ReadFailed(msg) => write!(f, "Failed to read frame: {}", msg),
            CameraError::Disconnected => write!(f, "Camera disconnected"),
            CameraError::TimedOut => write!(f, "Timed out waiting for a frame"),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::TooShort { expected, got } => {
                write!(f, "Frame too short: expected {} bytes, got {}", expected, got)
            }
            FrameError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            FrameError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::BindFailed(msg) => write!(f, "Failed to bind: {}", msg),
            StreamError::ServeFailed(msg) => write!(f, "Server failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for FrameError {}
impl std::error::Error for StreamError {}

// Conversions from sub-errors to AppError
impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<FrameError> for AppError {
    fn from(err: FrameError) -> Self {
        AppError::Frame(err)
    }
}

impl From<StreamError> for AppError {
    fn from(err: StreamError) -> Self {
        AppError::Stream(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for FrameError {
    fn from(err: image::ImageError) -> Self {
        FrameError::EncodingFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err: AppError = FrameError::TooShort {
            expected: 196_608,
            got: 10,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Frame error: Frame too short: expected 196608 bytes, got 10"
        );
    }

    #[test]
    fn test_camera_error_conversion() {
        let err: AppError = CameraError::Disconnected.into();
        assert!(matches!(err, AppError::Camera(CameraError::Disconnected)));
    }
}
