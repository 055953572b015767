// Error types for the Emotion Recorder application

use thiserror::Error;

/// Main error type for setup, capture and export failures
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Camera initialization failed: {0}")]
    CameraInit(String),

    #[error("Camera unavailable")]
    CameraUnavailable,

    #[error("Frame capture failed: {0}")]
    FrameCapture(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(String),

    #[error("OpenCV error: {0}")]
    OpenCV(String),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for Emotion Recorder operations
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Why a single frame could not be given an emotion label.
///
/// The UI collapses every variant into the same placeholder text; the variant
/// itself is kept so callers can tell a missing face from a broken backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("no face detected")]
    NoFace,

    #[error("malformed frame: {0}")]
    InvalidFrame(String),

    #[error("classifier backend error: {0}")]
    Backend(String),
}

impl From<RecorderError> for ClassifyError {
    fn from(err: RecorderError) -> Self {
        ClassifyError::Backend(err.to_string())
    }
}

// Conversion from OpenCV errors
impl From<opencv::Error> for RecorderError {
    fn from(err: opencv::Error) -> Self {
        RecorderError::OpenCV(err.to_string())
    }
}
