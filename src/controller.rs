// Application controller: frame loop, classification, recording and graphing

use crate::camera::FrameSource;
use crate::chart::EmotionChart;
use crate::config::ChartConfig;
use crate::emotion::EmotionClassifier;
use crate::error::ClassifyError;
use crate::models::{Emotion, Frame};
use crate::session::Session;
use chrono::Local;
use std::path::PathBuf;
use tracing::{debug, error};

pub const NOT_DETECTED: &str = "Not detected";

/// Asks the user where to save the chart; `None` means cancelled
pub trait SavePrompt {
    fn ask_save_path(&mut self) -> Option<PathBuf>;
}

/// What the emotion label currently shows
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum EmotionStatus {
    /// Nothing classified yet
    #[default]
    Pending,
    Detected(Emotion),
    NotDetected(ClassifyError),
}

impl EmotionStatus {
    pub fn label_text(&self) -> String {
        match self {
            EmotionStatus::Pending => "Emotion: ".to_string(),
            EmotionStatus::Detected(emotion) => format!("Emotion: {emotion}"),
            EmotionStatus::NotDetected(_) => format!("Emotion: {NOT_DETECTED}"),
        }
    }
}

/// Result of a successful `show_graph` call
#[derive(Clone, Debug)]
pub struct GraphReport {
    pub chart: EmotionChart,
    /// Where the PNG landed, if the user picked a path and the save worked
    pub saved_to: Option<PathBuf>,
}

/// Owns the camera, the classifier and the recording session.
///
/// Everything runs on the caller's thread; the GUI calls [`tick`](Self::tick)
/// from its repaint loop.
pub struct AppController<S, C> {
    source: S,
    classifier: C,
    session: Session,
    status: EmotionStatus,
    chart_config: ChartConfig,
}

impl<S: FrameSource, C: EmotionClassifier> AppController<S, C> {
    pub fn new(source: S, classifier: C, chart_config: ChartConfig) -> Self {
        Self {
            source,
            classifier,
            session: Session::new(),
            status: EmotionStatus::Pending,
            chart_config,
        }
    }

    /// Pulls and classifies one frame. Returns the frame for display, or
    /// `None` when the camera had nothing usable this tick.
    pub fn tick(&mut self) -> Option<Frame> {
        let frame = match self.source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                debug!("No frame this tick: {}", e);
                return None;
            }
        };

        // A short buffer can neither be displayed nor classified
        if !frame.is_well_formed() {
            let err = ClassifyError::InvalidFrame(format!(
                "{} bytes for {}x{} RGB",
                frame.data.len(),
                frame.width,
                frame.height
            ));
            debug!("Dropping frame: {}", err);
            self.status = EmotionStatus::NotDetected(err);
            return None;
        }

        self.classify(&frame);
        Some(frame)
    }

    /// Classifies a frame, updates the label and logs the result if recording
    pub fn classify(&mut self, frame: &Frame) -> &EmotionStatus {
        self.status = match self.classifier.classify(frame) {
            Ok(emotion) => {
                self.session.record(Local::now(), emotion);
                EmotionStatus::Detected(emotion)
            }
            Err(e) => {
                debug!("Classification unavailable: {}", e);
                EmotionStatus::NotDetected(e)
            }
        };
        &self.status
    }

    pub fn start_recording(&mut self) {
        self.session.start();
    }

    pub fn stop_recording(&mut self) {
        self.session.stop();
    }

    /// Start control enablement
    pub fn can_start(&self) -> bool {
        !self.session.is_recording()
    }

    /// Stop control enablement
    pub fn can_stop(&self) -> bool {
        self.session.is_recording()
    }

    /// Builds the chart from the log, offers to save it, and hands it back
    /// for display. Does nothing, not even prompting, when the log is empty.
    pub fn show_graph(&self, prompt: &mut dyn SavePrompt) -> Option<GraphReport> {
        let chart = EmotionChart::from_log(self.session.log())?;

        let saved_to = prompt
            .ask_save_path()
            .and_then(|path| match chart.save_png(&path, self.chart_config) {
                Ok(written) => Some(written),
                Err(e) => {
                    error!("Failed to save emotion graph to {}: {}", path.display(), e);
                    None
                }
            });

        Some(GraphReport { chart, saved_to })
    }

    pub fn status(&self) -> &EmotionStatus {
        &self.status
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
