//! Integration tests for the application controller
//!
//! Drives the frame loop with scripted cameras, classifiers and save prompts,
//! covering the recording lifecycle and graph requests without a GUI.

use emotion_recorder::camera::FrameSource;
use emotion_recorder::config::ChartConfig;
use emotion_recorder::controller::{AppController, EmotionStatus, SavePrompt};
use emotion_recorder::emotion::EmotionClassifier;
use emotion_recorder::error::{ClassifyError, RecorderError, Result};
use emotion_recorder::models::{Emotion, Frame};
use std::cell::Cell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

fn test_frame() -> Frame {
    Frame::new(vec![128; 4 * 4 * 3], 4, 4)
}

/// Camera that always delivers a frame
struct SteadyCamera;

impl FrameSource for SteadyCamera {
    fn read_frame(&mut self) -> Result<Frame> {
        Ok(test_frame())
    }
}

/// Camera that plays back a fixed sequence of successes and failures
struct ScriptedCamera(VecDeque<bool>);

impl FrameSource for ScriptedCamera {
    fn read_frame(&mut self) -> Result<Frame> {
        match self.0.pop_front() {
            Some(true) => Ok(test_frame()),
            _ => Err(RecorderError::FrameCapture("device busy".to_string())),
        }
    }
}

/// Classifier with a fixed answer that counts how often it ran
struct ScriptedClassifier {
    answer: std::result::Result<Emotion, ClassifyError>,
    calls: Rc<Cell<usize>>,
}

impl ScriptedClassifier {
    fn new(answer: std::result::Result<Emotion, ClassifyError>) -> Self {
        Self {
            answer,
            calls: Rc::new(Cell::new(0)),
        }
    }
}

impl EmotionClassifier for ScriptedClassifier {
    fn classify(&mut self, _frame: &Frame) -> std::result::Result<Emotion, ClassifyError> {
        self.calls.set(self.calls.get() + 1);
        self.answer.clone()
    }
}

/// Save prompt that returns a fixed answer and records that it was asked
struct RecordingPrompt {
    answer: Option<PathBuf>,
    asked: usize,
}

impl RecordingPrompt {
    fn cancelling() -> Self {
        Self {
            answer: None,
            asked: 0,
        }
    }
}

impl SavePrompt for RecordingPrompt {
    fn ask_save_path(&mut self) -> Option<PathBuf> {
        self.asked += 1;
        self.answer.clone()
    }
}

fn controller_with(
    answer: std::result::Result<Emotion, ClassifyError>,
) -> AppController<SteadyCamera, ScriptedClassifier> {
    AppController::new(
        SteadyCamera,
        ScriptedClassifier::new(answer),
        ChartConfig::default(),
    )
}

#[test]
fn test_initial_state_is_idle() {
    let controller = controller_with(Ok(Emotion::Happy));

    assert!(controller.can_start());
    assert!(!controller.can_stop());
    assert_eq!(controller.status(), &EmotionStatus::Pending);
    assert!(controller.session().log().is_empty());
}

#[test]
fn test_three_happy_ticks_while_recording() {
    let mut controller = controller_with(Ok(Emotion::Happy));
    controller.start_recording();
    assert!(controller.session().log().is_empty());

    for expected_len in 1..=3 {
        assert!(controller.tick().is_some());
        assert_eq!(controller.session().log().len(), expected_len);
    }

    let log = controller.session().log();
    assert_eq!(log.len(), 3);
    assert!(log.iter().all(|sample| sample.emotion == Emotion::Happy));
    assert!(log.windows(2).all(|pair| pair[0].at <= pair[1].at));
    assert_eq!(controller.status().label_text(), "Emotion: happy");
}

#[test]
fn test_ticks_while_idle_update_label_without_logging() {
    let mut controller = controller_with(Ok(Emotion::Sad));

    controller.tick();
    controller.tick();

    assert_eq!(controller.status(), &EmotionStatus::Detected(Emotion::Sad));
    assert!(controller.session().log().is_empty());
}

#[test]
fn test_failing_classifier_shows_placeholder_and_never_logs() {
    let mut controller = controller_with(Err(ClassifyError::Backend("model crashed".into())));
    controller.start_recording();

    for _ in 0..5 {
        controller.tick();
    }

    assert_eq!(controller.status().label_text(), "Emotion: Not detected");
    assert!(controller.session().log().is_empty());
}

#[test]
fn test_no_face_and_backend_errors_stay_distinguishable() {
    let mut no_face = controller_with(Err(ClassifyError::NoFace));
    let mut broken = controller_with(Err(ClassifyError::Backend("bad weights".into())));

    no_face.tick();
    broken.tick();

    assert_eq!(
        no_face.status(),
        &EmotionStatus::NotDetected(ClassifyError::NoFace)
    );
    assert!(matches!(
        broken.status(),
        EmotionStatus::NotDetected(ClassifyError::Backend(_))
    ));
    assert_eq!(no_face.status().label_text(), broken.status().label_text());
}

#[test]
fn test_camera_failure_skips_classification_and_keeps_running() {
    let classifier = ScriptedClassifier::new(Ok(Emotion::Neutral));
    let calls = Rc::clone(&classifier.calls);
    let camera = ScriptedCamera(VecDeque::from([false, true, false, false, true]));
    let mut controller = AppController::new(camera, classifier, ChartConfig::default());
    controller.start_recording();

    let displayed: Vec<bool> = (0..5).map(|_| controller.tick().is_some()).collect();

    assert_eq!(displayed, [false, true, false, false, true]);
    assert_eq!(calls.get(), 2);
    assert_eq!(controller.session().log().len(), 2);
}

#[test]
fn test_absent_camera_never_displays() {
    let classifier = ScriptedClassifier::new(Ok(Emotion::Happy));
    let calls = Rc::clone(&classifier.calls);
    let mut controller =
        AppController::new(None::<SteadyCamera>, classifier, ChartConfig::default());

    for _ in 0..3 {
        assert!(controller.tick().is_none());
    }
    assert_eq!(calls.get(), 0);
    assert_eq!(controller.status(), &EmotionStatus::Pending);
}

/// Camera whose driver hands back a truncated buffer
struct TruncatingCamera;

impl FrameSource for TruncatingCamera {
    fn read_frame(&mut self) -> Result<Frame> {
        Ok(Frame::new(vec![0; 5], 2, 2))
    }
}

#[test]
fn test_malformed_frame_is_not_displayed_or_classified() {
    let classifier = ScriptedClassifier::new(Ok(Emotion::Happy));
    let calls = Rc::clone(&classifier.calls);
    let mut controller = AppController::new(TruncatingCamera, classifier, ChartConfig::default());
    controller.start_recording();

    for _ in 0..3 {
        assert!(controller.tick().is_none());
    }

    assert_eq!(calls.get(), 0);
    assert!(controller.session().log().is_empty());
    assert!(matches!(
        controller.status(),
        EmotionStatus::NotDetected(ClassifyError::InvalidFrame(_))
    ));
    assert_eq!(controller.status().label_text(), "Emotion: Not detected");
}

#[test]
fn test_start_stop_start_resets_log() {
    let mut controller = controller_with(Ok(Emotion::Angry));

    controller.start_recording();
    controller.tick();
    controller.tick();
    controller.stop_recording();
    assert!(controller.can_start());
    assert!(!controller.can_stop());
    assert_eq!(controller.session().log().len(), 2);

    controller.tick();
    assert_eq!(controller.session().log().len(), 2);

    controller.start_recording();
    assert!(!controller.can_start());
    assert!(controller.can_stop());
    assert!(controller.session().log().is_empty());

    controller.tick();
    assert_eq!(controller.session().log().len(), 1);
}

#[test]
fn test_show_graph_with_empty_log_is_a_noop() {
    let controller = controller_with(Ok(Emotion::Happy));
    let mut prompt = RecordingPrompt::cancelling();

    assert!(controller.show_graph(&mut prompt).is_none());
    assert_eq!(prompt.asked, 0);
}

#[test]
fn test_cancelled_save_still_displays_chart() {
    let mut controller = controller_with(Ok(Emotion::Fear));
    controller.start_recording();
    controller.tick();
    controller.tick();
    controller.stop_recording();

    let mut prompt = RecordingPrompt::cancelling();
    let report = controller
        .show_graph(&mut prompt)
        .expect("chart should be produced");

    assert_eq!(prompt.asked, 1);
    assert!(report.saved_to.is_none());
    assert_eq!(report.chart.series.len(), 1);
    assert_eq!(report.chart.series[0].emotion, Emotion::Fear);
    assert_eq!(report.chart.series[0].points.len(), 2);
}

#[test]
fn test_show_graph_does_not_mutate_log() {
    let mut controller = controller_with(Ok(Emotion::Surprise));
    controller.start_recording();
    controller.tick();

    let mut prompt = RecordingPrompt::cancelling();
    controller.show_graph(&mut prompt);
    controller.show_graph(&mut prompt);

    assert_eq!(prompt.asked, 2);
    assert_eq!(controller.session().log().len(), 1);
    assert!(controller.can_stop());
}

#[test]
fn test_chosen_save_path_writes_png_and_returns_chart() {
    let dir = tempfile::tempdir().unwrap();
    let mut controller = controller_with(Ok(Emotion::Happy));
    controller.start_recording();
    controller.tick();
    controller.tick();
    controller.stop_recording();

    let mut prompt = RecordingPrompt {
        answer: Some(dir.path().join("graph")),
        asked: 0,
    };
    let report = controller.show_graph(&mut prompt).unwrap();

    let expected = dir.path().join("graph.png");
    assert_eq!(prompt.asked, 1);
    assert_eq!(report.chart.series.len(), 1);
    assert_eq!(report.saved_to, Some(expected.clone()));

    let bytes = std::fs::read(&expected).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_failed_save_still_returns_chart() {
    let dir = tempfile::tempdir().unwrap();
    let mut controller = controller_with(Ok(Emotion::Sad));
    controller.start_recording();
    controller.tick();
    controller.stop_recording();

    let mut prompt = RecordingPrompt {
        answer: Some(dir.path().join("missing").join("graph.png")),
        asked: 0,
    };
    let report = controller.show_graph(&mut prompt).unwrap();

    assert_eq!(prompt.asked, 1);
    assert!(report.saved_to.is_none());
    assert_eq!(report.chart.series.len(), 1);
    assert_eq!(report.chart.series[0].emotion, Emotion::Sad);
    assert!(!dir.path().join("missing").exists());
}
