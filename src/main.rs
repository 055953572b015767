use emotion_recorder::camera::CameraManager;
use emotion_recorder::config::AppConfig;
use emotion_recorder::controller::AppController;
use emotion_recorder::emotion::EmotionAnalyzer;
use emotion_recorder::error::{RecorderError, Result};
use emotion_recorder::ui::EmotionRecorderApp;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the logging system (file only, no console output)
fn init_logging(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path).map_err(RecorderError::Io)?;

    let file_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false);

    tracing_subscriber::registry().with(file_layer).init();

    Ok(())
}

fn main() -> Result<()> {
    let config = AppConfig::default();
    init_logging(&config.log_file)?;
    info!("Starting emotion recorder");

    // Neither a missing camera nor a missing model stops the window from opening
    let camera = match CameraManager::open(config.camera_index) {
        Ok(camera) => Some(camera),
        Err(e) => {
            error!("Camera unavailable, video will stay blank: {}", e);
            None
        }
    };

    let analyzer = match EmotionAnalyzer::new(&config.model) {
        Ok(analyzer) => Some(analyzer),
        Err(e) => {
            warn!("Emotion model unavailable, every frame will read as not detected: {}", e);
            None
        }
    };

    let controller = AppController::new(camera, analyzer, config.chart);
    let tick_interval = config.tick_interval;

    let result = eframe::run_native(
        &config.window.title,
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([config.window.width, config.window.height])
                .with_resizable(config.window.resizable)
                .with_title(&config.window.title),
            ..Default::default()
        },
        Box::new(move |_cc| Ok(Box::new(EmotionRecorderApp::new(controller, tick_interval)))),
    );

    if let Err(e) = result {
        error!("Application error: {}", e);
    }

    info!("Emotion recorder exited");
    Ok(())
}
