// Emotion-over-time chart: series construction and PNG export

use crate::config::ChartConfig;
use crate::error::{RecorderError, Result};
use crate::models::{Emotion, EmotionSample};
use chrono::{DateTime, Local};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TITLE: &str = "Emotion Graph Over Time";
pub const X_LABEL: &str = "Time (s)";
pub const Y_LABEL: &str = "Emotion Presence";

/// 0/1 presence of one emotion at every logged timestamp
#[derive(Clone, Debug, PartialEq)]
pub struct EmotionSeries {
    pub emotion: Emotion,
    /// `[seconds since first sample, 0.0 or 1.0]`
    pub points: Vec<[f64; 2]>,
}

/// Plot-ready view of an emotion log
#[derive(Clone, Debug, PartialEq)]
pub struct EmotionChart {
    pub started_at: DateTime<Local>,
    pub series: Vec<EmotionSeries>,
}

impl EmotionChart {
    /// Builds one indicator series per distinct label, each sampled at the
    /// full set of log timestamps. Series appear in first-seen order.
    /// Returns `None` for an empty log.
    pub fn from_log(log: &[EmotionSample]) -> Option<Self> {
        let started_at = log.first()?.at;

        let times: Vec<f64> = log
            .iter()
            .map(|sample| (sample.at - started_at).num_milliseconds() as f64 / 1000.0)
            .collect();

        let mut emotions: Vec<Emotion> = Vec::new();
        for sample in log {
            if !emotions.contains(&sample.emotion) {
                emotions.push(sample.emotion);
            }
        }

        let series = emotions
            .into_iter()
            .map(|emotion| EmotionSeries {
                emotion,
                points: log
                    .iter()
                    .zip(&times)
                    .map(|(sample, &t)| [t, if sample.emotion == emotion { 1.0 } else { 0.0 }])
                    .collect(),
            })
            .collect();

        Some(Self { started_at, series })
    }

    /// Title with the wall-clock start of the log, so absolute time survives export
    pub fn caption(&self) -> String {
        format!("{TITLE} (from {})", self.started_at.format("%Y-%m-%d %H:%M:%S"))
    }

    /// Seconds between the first and last sample
    pub fn duration_secs(&self) -> f64 {
        self.series
            .first()
            .and_then(|s| s.points.last())
            .map_or(0.0, |p| p[0])
    }

    /// Draws the chart and writes it as PNG. Returns the path written.
    pub fn save_png(&self, path: &Path, config: ChartConfig) -> Result<PathBuf> {
        let path = with_png_extension(path);
        let (width, height) = (config.width, config.height);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;

            let x_max = self.duration_secs().max(1.0);
            let mut chart = ChartBuilder::on(&root)
                .caption(self.caption(), ("sans-serif", 22))
                .margin(16)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(0f64..x_max, -0.05f64..1.05f64)
                .map_err(chart_err)?;

            chart
                .configure_mesh()
                .x_desc(X_LABEL)
                .y_desc(Y_LABEL)
                .draw()
                .map_err(chart_err)?;

            for (idx, series) in self.series.iter().enumerate() {
                let color = Palette99::pick(idx).to_rgba();
                chart
                    .draw_series(LineSeries::new(
                        series.points.iter().map(|p| (p[0], p[1])),
                        &color,
                    ))
                    .map_err(chart_err)?
                    .label(series.emotion.label())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(chart_err)?;

            root.present().map_err(chart_err)?;
        }

        image::save_buffer_with_format(
            &path,
            &buffer,
            width,
            height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )?;
        info!("Emotion graph saved to {}", path.display());
        Ok(path)
    }
}

fn chart_err<E: std::fmt::Display>(err: E) -> RecorderError {
    RecorderError::Chart(err.to_string())
}

/// Appends `.png` when the chosen file name has no extension
pub fn with_png_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("png")
    }
}
