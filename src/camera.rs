// Camera module for webcam capture

use crate::error::{RecorderError, Result};
use crate::models::Frame;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use tracing::{error, info};

/// Anything the controller can pull frames from, one per tick
pub trait FrameSource {
    /// Reads the next RGB frame. An error means "no frame this tick".
    fn read_frame(&mut self) -> Result<Frame>;
}

/// A camera that failed to open at startup never yields frames
impl<S: FrameSource> FrameSource for Option<S> {
    fn read_frame(&mut self) -> Result<Frame> {
        match self {
            Some(source) => source.read_frame(),
            None => Err(RecorderError::CameraUnavailable),
        }
    }
}

/// Owns the webcam for the lifetime of the application
pub struct CameraManager {
    camera: Camera,
    is_streaming: bool,
}

impl CameraManager {
    /// Opens the camera at `index` and starts its stream
    pub fn open(index: u32) -> Result<Self> {
        // Request 640x480 at 30 FPS, the closest mode the device offers wins
        let requested_format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            nokhwa::utils::CameraFormat::new(
                nokhwa::utils::Resolution::new(640, 480),
                nokhwa::utils::FrameFormat::YUYV,
                30,
            ),
        ));

        let camera = Camera::new(CameraIndex::Index(index), requested_format).map_err(|e| {
            error!("Failed to open camera {}: {}", index, e);
            RecorderError::CameraInit(format!(
                "Could not open camera {index}. Make sure:\n\
                1. A camera is connected\n\
                2. No other app is using it\n\
                3. Camera permissions are granted\n\
                Error: {e}"
            ))
        })?;

        let mut manager = Self {
            camera,
            is_streaming: false,
        };
        manager.ensure_stream_open()?;
        let (width, height) = manager.resolution();
        info!(
            "Camera opened: {} ({}x{})",
            manager.camera_info(),
            width,
            height
        );
        Ok(manager)
    }

    /// Returns the camera information
    pub fn camera_info(&self) -> String {
        self.camera.info().human_name().to_string()
    }

    /// Returns the current camera resolution
    pub fn resolution(&self) -> (u32, u32) {
        let res = self.camera.resolution();
        (res.width(), res.height())
    }

    /// Opens the camera stream if not already open
    fn ensure_stream_open(&mut self) -> Result<()> {
        if self.is_streaming {
            return Ok(());
        }

        self.camera.open_stream().map_err(|e| {
            error!("Failed to open camera stream: {}", e);
            RecorderError::CameraInit(e.to_string())
        })?;
        self.is_streaming = true;

        // Wait a moment for the camera to initialize
        std::thread::sleep(std::time::Duration::from_millis(200));
        Ok(())
    }

    /// Stops the camera stream
    pub fn stop_stream(&mut self) {
        if !self.is_streaming {
            return;
        }
        self.is_streaming = false;

        if let Err(e) = self.camera.stop_stream() {
            error!("Error stopping camera stream: {}", e);
        }
    }
}

impl FrameSource for CameraManager {
    /// Grabs the most recent frame and decodes it to RGB (blocking)
    fn read_frame(&mut self) -> Result<Frame> {
        if !self.is_streaming {
            return Err(RecorderError::CameraUnavailable);
        }

        let frame_data = self
            .camera
            .frame()
            .map_err(|e| RecorderError::FrameCapture(format!("Failed to capture frame: {e}")))?;

        let buffer = frame_data
            .decode_image::<RgbFormat>()
            .map_err(|e| RecorderError::FrameCapture(format!("Failed to decode frame: {e}")))?;

        let (width, height) = (buffer.width(), buffer.height());
        Ok(Frame::new(buffer.into_raw(), width, height))
    }
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        self.stop_stream();
    }
}
