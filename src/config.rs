// Built-in application settings

use std::path::PathBuf;
use std::time::Duration;

/// Window geometry and title
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Emotion Detection".to_string(),
            width: 800.0,
            height: 600.0,
            resizable: false,
        }
    }
}

/// Locations and input geometry of the classifier assets
#[derive(Clone, Debug, PartialEq)]
pub struct ModelConfig {
    /// Haar cascade used to locate faces
    pub cascade_path: PathBuf,
    /// ONNX emotion model (HSEmotion layout, NCHW RGB input)
    pub model_path: PathBuf,
    /// Side length of the square model input
    pub input_size: usize,
    /// When false, frames without a detectable face are classified whole
    pub enforce_detection: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            cascade_path: PathBuf::from("assets/models/haarcascade_frontalface_default.xml"),
            model_path: PathBuf::from("assets/models/emotion.onnx"),
            input_size: 260,
            enforce_detection: false,
        }
    }
}

/// Pixel size of exported chart images
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
        }
    }
}

/// Top-level settings. There is no config file; everything is fixed here.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera_index: u32,
    /// Period of the frame-pull loop
    pub tick_interval: Duration,
    pub model: ModelConfig,
    pub chart: ChartConfig,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera_index: 0,
            tick_interval: Duration::from_millis(50),
            model: ModelConfig::default(),
            chart: ChartConfig::default(),
            log_file: PathBuf::from("emotion_detector.log"),
        }
    }
}
