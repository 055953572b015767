// Emotion classification: face detection plus ONNX model inference

use crate::config::ModelConfig;
use crate::error::{ClassifyError, RecorderError, Result};
use crate::models::{Emotion, Frame};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use tracing::{error, info, warn};

/// Produces the dominant emotion for a single frame
pub trait EmotionClassifier {
    fn classify(&mut self, frame: &Frame) -> std::result::Result<Emotion, ClassifyError>;
}

/// A model that failed to load reports every frame as a backend error
impl<C: EmotionClassifier> EmotionClassifier for Option<C> {
    fn classify(&mut self, frame: &Frame) -> std::result::Result<Emotion, ClassifyError> {
        match self {
            Some(classifier) => classifier.classify(frame),
            None => Err(ClassifyError::Backend("emotion model not loaded".to_string())),
        }
    }
}

/// Face detector using OpenCV Haar Cascade
pub struct FaceDetector {
    classifier: CascadeClassifier,
}

impl FaceDetector {
    /// Creates a new FaceDetector by loading the Haar Cascade classifier
    pub fn new(cascade_path: &Path) -> Result<Self> {
        let classifier =
            CascadeClassifier::new(&cascade_path.to_string_lossy()).map_err(|e| {
                error!("Failed to load Haar Cascade: {}", e);
                RecorderError::ModelLoad(format!("Haar Cascade load failed: {e}"))
            })?;

        if classifier.empty()? {
            return Err(RecorderError::ModelLoad(
                "Haar Cascade classifier is empty".to_string(),
            ));
        }

        Ok(Self { classifier })
    }

    /// Converts an RGB frame to a single-channel Mat
    fn to_grayscale(frame: &Frame) -> Result<Mat> {
        let mat = Mat::from_slice(&frame.data)
            .map_err(|e| RecorderError::OpenCV(format!("Failed to create Mat: {e}")))?;

        let mat = mat
            .reshape(3, frame.height as i32)
            .map_err(|e| RecorderError::OpenCV(format!("Failed to reshape Mat: {e}")))?;

        let mut gray = Mat::default();
        imgproc::cvt_color(
            &mat,
            &mut gray,
            imgproc::COLOR_RGB2GRAY,
            0,
            opencv::core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .map_err(|e| RecorderError::OpenCV(format!("Failed to convert to grayscale: {e}")))?;

        Ok(gray)
    }

    /// Returns the largest face in the image, if any
    fn largest_face(&mut self, gray: &Mat) -> Result<Option<Rect>> {
        let mut faces = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                gray,
                &mut faces,
                1.1,               // scale factor
                5,                 // min neighbors
                0,                 // flags
                Size::new(40, 40), // min size
                Size::new(0, 0),   // no max size
            )
            .map_err(|e| RecorderError::OpenCV(format!("Face detection failed: {e}")))?;

        Ok(faces.iter().max_by_key(|rect| rect.area()))
    }

    /// Crops a region from the grayscale image into a continuous buffer
    fn extract_region(gray: &Mat, rect: Rect) -> Result<(Vec<u8>, u32)> {
        let roi = Mat::roi(gray, rect)
            .map_err(|e| RecorderError::OpenCV(format!("Failed to crop face region: {e}")))?;

        // Clone so the Mat is continuous in memory
        let continuous = roi
            .try_clone()
            .map_err(|e| RecorderError::OpenCV(format!("Failed to clone face ROI: {e}")))?;

        let data = continuous
            .data_bytes()
            .map_err(|e| RecorderError::OpenCV(format!("Failed to get face data: {e}")))?;

        Ok((data.to_vec(), rect.height as u32))
    }
}

/// Turns a grayscale face crop into normalized HWC RGB floats of `size`x`size`
fn preprocess_face(face_data: &[u8], face_height: u32, size: usize) -> Result<Vec<f32>> {
    let face_mat = Mat::from_slice(face_data)
        .map_err(|e| RecorderError::OpenCV(format!("Failed to create face Mat: {e}")))?;

    let face_mat = face_mat
        .reshape(1, face_height as i32)
        .map_err(|e| RecorderError::OpenCV(format!("Failed to reshape face Mat: {e}")))?;

    // The model expects three channels
    let mut rgb_mat = Mat::default();
    imgproc::cvt_color_def(&face_mat, &mut rgb_mat, imgproc::COLOR_GRAY2RGB)
        .map_err(|e| RecorderError::OpenCV(format!("Failed to convert to RGB: {e}")))?;

    let mut resized = Mat::default();
    imgproc::resize(
        &rgb_mat,
        &mut resized,
        Size::new(size as i32, size as i32),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )
    .map_err(|e| RecorderError::OpenCV(format!("Failed to resize face: {e}")))?;

    let data = resized
        .data_bytes()
        .map_err(|e| RecorderError::OpenCV(format!("Failed to get resized data: {e}")))?;

    Ok(data.iter().map(|&pixel| f32::from(pixel) / 255.0).collect())
}

/// Reorders interleaved HWC pixels into planar CHW
fn hwc_to_chw(hwc: &[f32], height: usize, width: usize, channels: usize) -> Vec<f32> {
    let mut chw = vec![0.0f32; channels * height * width];
    for h in 0..height {
        for w in 0..width {
            for c in 0..channels {
                chw[c * height * width + h * width + w] = hwc[(h * width + w) * channels + c];
            }
        }
    }
    chw
}

/// Maps model output index to an emotion label.
/// Model order: 0=Angry, 1=Disgust, 2=Fear, 3=Happy, 4=Sad, 5=Surprise, 6=Neutral, 7=Contempt
fn index_to_emotion(index: usize) -> Option<Emotion> {
    match index {
        0 => Some(Emotion::Angry),
        1 => Some(Emotion::Disgust),
        2 => Some(Emotion::Fear),
        3 => Some(Emotion::Happy),
        4 => Some(Emotion::Sad),
        5 => Some(Emotion::Surprise),
        6 => Some(Emotion::Neutral),
        7 => Some(Emotion::Disgust), // contempt has no label of its own
        _ => None,
    }
}

/// Picks the highest-scoring label from raw model scores
fn dominant_emotion(scores: &[f32]) -> Option<Emotion> {
    let (index, _) = scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))?;

    let emotion = index_to_emotion(index);
    if emotion.is_none() {
        warn!("Unknown emotion index: {}", index);
    }
    emotion
}

/// Emotion model running on ONNX Runtime
pub struct OnnxEmotionModel {
    session: Session,
    input_size: usize,
}

impl OnnxEmotionModel {
    /// Loads the ONNX model from disk
    pub fn new(model_path: &Path, input_size: usize) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| {
                RecorderError::ModelLoad(format!("Failed to create session builder: {e}"))
            })?
            .commit_from_file(model_path)
            .map_err(|e| {
                error!("Failed to load ONNX model: {}", e);
                RecorderError::ModelLoad(format!("ONNX model load failed: {e}"))
            })?;

        Ok(Self {
            session,
            input_size,
        })
    }

    /// Runs inference on a preprocessed HWC face and returns the raw scores
    pub fn infer(&mut self, preprocessed_face: &[f32]) -> Result<Vec<f32>> {
        let (height, width, channels) = (self.input_size, self.input_size, 3);
        if preprocessed_face.len() != height * width * channels {
            return Err(RecorderError::OnnxRuntime(format!(
                "Expected {} input values, got {}",
                height * width * channels,
                preprocessed_face.len()
            )));
        }

        let chw_data = hwc_to_chw(preprocessed_face, height, width, channels);
        let input_array = ndarray::Array4::from_shape_vec((1, channels, height, width), chw_data)
            .map_err(|e| {
                RecorderError::OnnxRuntime(format!("Failed to create input array: {e}"))
            })?;

        let input_tensor = Value::from_array(input_array).map_err(|e| {
            RecorderError::OnnxRuntime(format!("Failed to create input tensor: {e}"))
        })?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| RecorderError::OnnxRuntime(format!("Inference failed: {e}")))?;

        let (_, output_value) = outputs
            .iter()
            .next()
            .ok_or_else(|| RecorderError::OnnxRuntime("No output from model".to_string()))?;

        let (_, scores) = output_value.try_extract_tensor::<f32>().map_err(|e| {
            RecorderError::OnnxRuntime(format!("Failed to extract output tensor: {e}"))
        })?;

        Ok(scores.to_vec())
    }
}

/// Face detection and emotion model combined behind [`EmotionClassifier`]
pub struct EmotionAnalyzer {
    face_detector: FaceDetector,
    model: OnnxEmotionModel,
    enforce_detection: bool,
}

impl EmotionAnalyzer {
    /// Loads both the cascade and the ONNX model
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let face_detector = FaceDetector::new(&config.cascade_path)?;
        let model = OnnxEmotionModel::new(&config.model_path, config.input_size)?;
        info!("Emotion model loaded from {}", config.model_path.display());

        Ok(Self {
            face_detector,
            model,
            enforce_detection: config.enforce_detection,
        })
    }
}

impl EmotionClassifier for EmotionAnalyzer {
    fn classify(&mut self, frame: &Frame) -> std::result::Result<Emotion, ClassifyError> {
        if !frame.is_well_formed() {
            return Err(ClassifyError::InvalidFrame(format!(
                "{} bytes for {}x{} RGB",
                frame.data.len(),
                frame.width,
                frame.height
            )));
        }

        let gray = FaceDetector::to_grayscale(frame)?;
        let region = match self.face_detector.largest_face(&gray)? {
            Some(rect) => rect,
            None if self.enforce_detection => return Err(ClassifyError::NoFace),
            None => Rect::new(0, 0, frame.width as i32, frame.height as i32),
        };

        let (face_data, face_height) = FaceDetector::extract_region(&gray, region)?;
        let preprocessed = preprocess_face(&face_data, face_height, self.model.input_size)?;
        let scores = self.model.infer(&preprocessed)?;

        dominant_emotion(&scores)
            .ok_or_else(|| ClassifyError::Backend("model produced no usable scores".to_string()))
    }
}
