//! GUI controller: owns every application slot and maps UI events to the
//! source drivers, the annotator and the display surface.

use egui_macroquad::egui;
use macroquad::prelude::*;

use crate::annotate::{Annotator, FrameCounts};
use crate::config::Args;
use crate::display::{DisplaySurface, CANVAS_WIDTH};
use crate::graph::GraphViewer;
use crate::input::{read_image, VideoPoll, VideoSession, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::models::{DetectorConfig, ModelKind, YOLOv8};
use crate::ort_backend::OrtEP;
use crate::settings::ViewerSettings;
use crate::status::{Severity, StatusLine};

const CANVAS_TOP: f32 = 10.0;

pub struct App {
    args: Args,
    settings: ViewerSettings,
    annotator: Annotator,

    // the two process-lifetime model slots
    crowd: Option<YOLOv8>,
    weapon: Option<YOLOv8>,

    display: DisplaySurface,
    video: Option<VideoSession>,
    graph: Option<GraphViewer>,

    status: StatusLine,
    counts: FrameCounts,

    is_mouse_over_ui: bool,
}

impl App {
    pub fn new(args: Args) -> Self {
        let settings = ViewerSettings::load(&args.settings);
        Self {
            args,
            settings,
            annotator: Annotator::new(),
            crowd: None,
            weapon: None,
            display: DisplaySurface::new(),
            video: None,
            graph: None,
            status: StatusLine::new(),
            counts: FrameCounts::default(),
            is_mouse_over_ui: false,
        }
    }

    fn canvas_origin(&self) -> (f32, f32) {
        (
            ((screen_width() - CANVAS_WIDTH as f32) / 2.0).max(0.0),
            CANVAS_TOP,
        )
    }

    fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            ep: if self.args.cuda {
                OrtEP::Cuda(self.args.device_id)
            } else {
                OrtEP::Cpu
            },
            imgsz: self.args.imgsz,
            conf_threshold: self.settings.conf_threshold,
            iou_threshold: self.settings.iou_threshold,
            profile: self.args.profile,
        }
    }

    /// Load one model slot from its configured path. A failed load leaves
    /// the slot exactly as it was.
    pub fn load_model(&mut self, kind: ModelKind) {
        let path = match kind {
            ModelKind::Crowd => self.args.crowd_model.clone(),
            ModelKind::Weapon => self.args.weapon_model.clone(),
        };

        match YOLOv8::new(&path, &self.detector_config()) {
            Ok(model) => {
                match kind {
                    ModelKind::Crowd => self.crowd = Some(model),
                    ModelKind::Weapon => self.weapon = Some(model),
                }
                self.status
                    .set_success(format!("{} Model Loaded", kind.display_name()));
                log::info!("{} model loaded from {}", kind.display_name(), path);
            }
            Err(e) => {
                self.status.set_error(format!("Error: {e:#}"));
                log::error!("failed to load {} model: {e:#}", kind.display_name());
            }
        }
    }

    fn open_image(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Image files", IMAGE_EXTENSIONS)
            .set_directory("images")
            .pick_file();
        let Some(path) = picked else {
            // cancelled: prior status stays
            return;
        };

        let mut frame = match read_image(&path) {
            Ok(frame) => frame,
            Err(e) => {
                self.status.set_error(format!("{e:#}"));
                return;
            }
        };

        match self
            .annotator
            .annotate(&mut frame, self.crowd.as_mut(), self.weapon.as_mut())
        {
            Ok(counts) => {
                self.counts = counts;
                self.display.show(&frame);
            }
            Err(e) => self.status.set_error(format!("{e:#}")),
        }
    }

    fn open_video(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Video files", VIDEO_EXTENSIONS)
            .set_directory("video")
            .pick_file();
        let Some(path) = picked else {
            self.status.set_notice("Video selection cancelled.");
            return;
        };

        // a new selection replaces any running session
        self.video = None;

        match VideoSession::open(&path.to_string_lossy()) {
            Ok(session) => {
                self.video = Some(session);
                log::info!("playing {}", path.display());
            }
            Err(e) => {
                self.status.set_error("Unable to open video file.");
                log::error!("{e:#}");
            }
        }
    }

    fn view_graph(&mut self) {
        match GraphViewer::open(&self.args.results_chart) {
            Ok(viewer) => self.graph = Some(viewer),
            Err(e) => {
                self.status.set_error(format!("{e:#}"));
                log::error!("{e:#}");
            }
        }
    }

    pub fn handle_input(&mut self) {
        if self.graph.is_some() {
            // modal: any key closes it, everything else is inert
            if get_last_key_pressed().is_some() {
                self.graph = None;
            }
            return;
        }

        if is_mouse_button_pressed(MouseButton::Left) && !self.is_mouse_over_ui {
            let (x, y) = mouse_position();
            if self.display.dismiss_hit(x, y, self.canvas_origin()) {
                self.display.clear();
                // dismissing the canvas also stops a running playback
                if let Some(mut session) = self.video.take() {
                    session.stop();
                }
            }
        }
    }

    /// One cooperative pump per rendered frame: consume at most one decoded
    /// video frame, annotate it and hand it to the display surface.
    pub fn update(&mut self) {
        if self.graph.is_some() {
            // the chart is modal-blocking: playback holds until it closes
            // (the decode tap blocks on the full queue meanwhile)
            return;
        }

        let Some(session) = self.video.as_mut() else {
            return;
        };

        match session.poll() {
            VideoPoll::Frame(mut frame) => {
                match self
                    .annotator
                    .annotate(&mut frame, self.crowd.as_mut(), self.weapon.as_mut())
                {
                    Ok(counts) => {
                        self.counts = counts;
                        self.display.show(&frame);
                    }
                    Err(e) => {
                        self.status.set_error(format!("{e:#}"));
                        self.video = None;
                    }
                }
            }
            VideoPoll::Pending => {}
            VideoPoll::Finished => {
                log::info!("video playback finished");
                self.video = None;
            }
        }
    }

    pub fn draw(&mut self) {
        // the original's light blue backdrop
        clear_background(Color::from_rgba(0xe6, 0xf2, 0xff, 0xff));

        self.display.draw(self.canvas_origin());

        if let Some(graph) = &mut self.graph {
            graph.draw();
        }
    }

    pub fn draw_ui(&mut self) {
        let graph_open = self.graph.is_some();

        egui_macroquad::ui(|egui_ctx| {
            self.is_mouse_over_ui = egui_ctx.wants_pointer_input();

            egui::Window::new("controls")
                .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -16.0))
                .title_bar(false)
                .resizable(false)
                .collapsible(false)
                .show(egui_ctx, |ui| {
                    ui.add_enabled_ui(!graph_open, |ui| {
                        ui.horizontal(|ui| {
                            if ui.button("Load Crowd Model").clicked() {
                                self.load_model(ModelKind::Crowd);
                            }
                            if ui.button("Load Weapon Model").clicked() {
                                self.load_model(ModelKind::Weapon);
                            }
                            if ui.button("Upload Image").clicked() {
                                self.open_image();
                            }
                            if ui.button("Upload Video").clicked() {
                                self.open_video();
                            }
                            if ui.button("View Graph").clicked() {
                                self.view_graph();
                            }
                        });

                        ui.separator();

                        ui.horizontal(|ui| {
                            if !self.status.is_empty() {
                                ui.colored_label(
                                    status_color(self.status.severity()),
                                    self.status.text(),
                                );
                            }
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    ui.label(format!("Weapons: {}", self.counts.weapons));
                                    ui.separator();
                                    ui.label(format!("Persons: {}", self.counts.persons));
                                },
                            );
                        });

                        egui::CollapsingHeader::new("Detection settings")
                            .default_open(false)
                            .show(ui, |ui| {
                                let mut changed = false;
                                changed |= ui
                                    .add(
                                        egui::Slider::new(
                                            &mut self.settings.conf_threshold,
                                            0.0..=1.0,
                                        )
                                        .text("confidence"),
                                    )
                                    .changed();
                                changed |= ui
                                    .add(
                                        egui::Slider::new(
                                            &mut self.settings.iou_threshold,
                                            0.0..=1.0,
                                        )
                                        .text("IoU"),
                                    )
                                    .changed();

                                if changed {
                                    let (conf, iou) = (
                                        self.settings.conf_threshold,
                                        self.settings.iou_threshold,
                                    );
                                    for model in
                                        [self.crowd.as_mut(), self.weapon.as_mut()]
                                            .into_iter()
                                            .flatten()
                                    {
                                        model.set_conf(conf);
                                        model.set_iou(iou);
                                    }
                                    self.settings.save(&self.args.settings);
                                }
                            });
                    });
                });
        });

        egui_macroquad::draw();
    }
}

fn status_color(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::Success => egui::Color32::GREEN,
        Severity::Error => egui::Color32::RED,
        Severity::Notice => egui::Color32::from_rgb(255, 165, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args() -> Args {
        Args::parse_from(["vigil", "--settings", "/dev/null"])
    }

    #[test]
    fn test_failed_model_load_leaves_slot_unset() {
        let mut app = App::new(args());
        assert!(app.crowd.is_none());

        app.load_model(ModelKind::Crowd); // default path does not exist here

        assert!(app.crowd.is_none());
        assert!(app.weapon.is_none());
        assert_eq!(app.status.severity(), Severity::Error);
        assert!(app.status.text().starts_with("Error:"));
    }

    #[test]
    fn test_failed_graph_load_reports_error_status() {
        let mut app = App::new(args());
        app.view_graph();

        assert!(app.graph.is_none());
        assert_eq!(app.status.severity(), Severity::Error);
    }

    #[test]
    fn test_status_colors_follow_convention() {
        assert_eq!(status_color(Severity::Success), egui::Color32::GREEN);
        assert_eq!(status_color(Severity::Error), egui::Color32::RED);
        assert_ne!(
            status_color(Severity::Notice),
            status_color(Severity::Error)
        );
    }
}
