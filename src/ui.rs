// UI module for the emotion recorder application

use crate::camera::FrameSource;
use crate::chart::{self, EmotionChart};
use crate::controller::{AppController, SavePrompt};
use crate::emotion::EmotionClassifier;
use crate::models::Frame;
use egui::{Color32, RichText};
use egui_plot::{Legend, Line, Plot, PlotPoints};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const BACKGROUND: Color32 = Color32::from_rgb(0x2c, 0x3e, 0x50);
const VIDEO_PANE: Color32 = Color32::from_rgb(0x34, 0x49, 0x5e);
const LABEL_TEXT: Color32 = Color32::from_rgb(0xec, 0xf0, 0xf1);
const START_FILL: Color32 = Color32::from_rgb(0x27, 0xae, 0x60);
const STOP_FILL: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);
const GRAPH_FILL: Color32 = Color32::from_rgb(0xf1, 0xc4, 0x0f);
const QUIT_FILL: Color32 = Color32::from_rgb(0xc0, 0x39, 0x2b);

/// Largest size of the video pane inside the fixed window
const VIDEO_MAX: egui::Vec2 = egui::vec2(640.0, 400.0);

/// Native save dialog restricted to PNG by default
pub struct FileDialogPrompt;

impl SavePrompt for FileDialogPrompt {
    fn ask_save_path(&mut self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Save emotion graph")
            .add_filter("PNG files", &["png"])
            .add_filter("All Files", &["*"])
            .set_file_name("emotion_graph.png")
            .save_file()
    }
}

/// Main application UI
pub struct EmotionRecorderApp<S, C> {
    controller: AppController<S, C>,
    tick_interval: Duration,
    last_tick: Option<Instant>,
    camera_texture: Option<egui::TextureHandle>,
    graph: Option<EmotionChart>,
}

impl<S: FrameSource, C: EmotionClassifier> EmotionRecorderApp<S, C> {
    /// Creates a new EmotionRecorderApp
    pub fn new(controller: AppController<S, C>, tick_interval: Duration) -> Self {
        Self {
            controller,
            tick_interval,
            last_tick: None,
            camera_texture: None,
            graph: None,
        }
    }

    /// Runs the frame loop at the configured period and re-arms the repaint timer
    fn drive_ticks(&mut self, ctx: &egui::Context) {
        let due = self
            .last_tick
            .map_or(true, |last| last.elapsed() >= self.tick_interval);

        if due {
            self.last_tick = Some(Instant::now());
            if let Some(frame) = self.controller.tick() {
                self.update_camera_texture(ctx, &frame);
            }
        }

        let next = self
            .last_tick
            .map_or(Duration::ZERO, |last| {
                self.tick_interval.saturating_sub(last.elapsed())
            });
        ctx.request_repaint_after(next);
    }

    /// Updates camera texture from the latest frame
    fn update_camera_texture(&mut self, ctx: &egui::Context, frame: &Frame) {
        let color_image =
            egui::ColorImage::from_rgb([frame.width as usize, frame.height as usize], &frame.data);

        match &mut self.camera_texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.camera_texture =
                    Some(ctx.load_texture("camera", color_image, egui::TextureOptions::LINEAR));
            }
        }
    }

    /// Renders the video pane scaled to fit while keeping its aspect ratio
    fn render_video(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(VIDEO_PANE)
            .inner_margin(10.0)
            .show(ui, |ui| {
                let Some(texture) = &self.camera_texture else {
                    ui.allocate_space(VIDEO_MAX);
                    return;
                };

                let texture_size = texture.size_vec2();
                let scale = (VIDEO_MAX.x / texture_size.x).min(VIDEO_MAX.y / texture_size.y);
                ui.add(egui::Image::new(texture).fit_to_exact_size(texture_size * scale));
            });
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let start = styled_button("Start Recording", START_FILL, Color32::WHITE);
            if ui.add_enabled(self.controller.can_start(), start).clicked() {
                self.controller.start_recording();
            }

            let stop = styled_button("Stop Recording", STOP_FILL, Color32::WHITE);
            if ui.add_enabled(self.controller.can_stop(), stop).clicked() {
                self.controller.stop_recording();
            }

            let graph = styled_button("Show Emotion Graph", GRAPH_FILL, Color32::BLACK);
            if ui.add(graph).clicked() {
                if let Some(report) = self.controller.show_graph(&mut FileDialogPrompt) {
                    self.graph = Some(report.chart);
                }
            }
        });
    }

    /// Shows the last requested chart until its window is closed
    fn render_graph_window(&mut self, ctx: &egui::Context) {
        let Some(chart) = &self.graph else {
            return;
        };

        let mut open = true;
        egui::Window::new(chart.caption())
            .id(egui::Id::new("emotion_graph_window"))
            .open(&mut open)
            .default_size([700.0, 380.0])
            .show(ctx, |ui| {
                Plot::new("emotion_graph")
                    .legend(Legend::default())
                    .x_axis_label(chart::X_LABEL)
                    .y_axis_label(chart::Y_LABEL)
                    .include_y(0.0)
                    .include_y(1.0)
                    .show(ui, |plot_ui| {
                        for series in &chart.series {
                            plot_ui.line(
                                Line::new(PlotPoints::from(series.points.clone()))
                                    .name(series.emotion.label()),
                            );
                        }
                    });
            });

        if !open {
            self.graph = None;
        }
    }
}

fn styled_button(text: &str, fill: Color32, text_color: Color32) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).size(14.0).strong().color(text_color))
        .fill(fill)
        .min_size(egui::vec2(0.0, 30.0))
}

impl<S, C> eframe::App for EmotionRecorderApp<S, C>
where
    S: FrameSource,
    C: EmotionClassifier,
{
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drive_ticks(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND).inner_margin(20.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    self.render_video(ui);
                    ui.add_space(10.0);
                    self.render_controls(ui);
                    ui.add_space(10.0);
                    ui.label(
                        RichText::new(self.controller.status().label_text())
                            .size(18.0)
                            .strong()
                            .color(LABEL_TEXT),
                    );
                    ui.add_space(10.0);
                    if ui
                        .add(styled_button("Quit", QUIT_FILL, Color32::WHITE))
                        .clicked()
                    {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });

        self.render_graph_window(ctx);
    }
}
