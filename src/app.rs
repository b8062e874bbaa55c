// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It forwards user input to the annotation
//! session, decodes recordings in the background and drives the
//! cursor-sync ticks through repaint scheduling.

use crate::audio::backend::CpalBackend;
use crate::audio::spectrogram;
use crate::config::AppConfig;
use crate::error::AnnotatorError;
use crate::io::{media, serialization};
use crate::models::{annotation::AnnotationStore, queue::Navigation, recording::Recording, viewport::Direction};
use crate::playback::clock::SystemClock;
use crate::session::Session;
use crate::ui::{canvas, properties, timeline, toolbar};
use crate::util::display::short_path;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;

type AppSession = Session<CpalBackend, SystemClock>;

/// Result of background decoding.
struct LoadedRecording {
    recording: Recording,
    image: image::RgbaImage,
    max_frequency: f64,
    time_extent: (f64, f64),
}

/// Message shown in the status bar.
struct StatusMessage {
    text: String,
    is_error: bool,
}

/// Main application state.
pub struct AnnotatorApp {
    config: AppConfig,

    session: AppSession,

    /// Text in the transcription field
    transcript: String,

    /// Spectrogram texture of the active recording
    spectrogram_texture: Option<egui::TextureHandle>,

    /// Raster behind the texture, kept for PNG export
    spectrogram_image: Option<image::RgbaImage>,

    /// Top of the frequency axis in Hz
    max_frequency: f64,

    /// Seconds spanned by the spectrogram columns
    time_extent: (f64, f64),

    /// Receiver for background decoding
    loader: Option<Receiver<Result<LoadedRecording, AnnotatorError>>>,

    /// Start playback once the pending decode finishes
    play_when_loaded: bool,

    /// Loading state message
    loading_message: Option<String>,

    status: Option<StatusMessage>,
}

impl AnnotatorApp {
    /// Create the application, optionally opening `folder` right away.
    pub fn new(config: AppConfig, store: AnnotationStore, folder: Option<PathBuf>) -> Self {
        let session = Session::new(
            store,
            CpalBackend,
            SystemClock,
            config.playback.sync_period(),
        );
        let mut app = Self {
            config,
            session,
            transcript: String::new(),
            spectrogram_texture: None,
            spectrogram_image: None,
            max_frequency: 0.0,
            time_extent: (0.0, 0.0),
            loader: None,
            play_when_loaded: false,
            loading_message: None,
            status: None,
        };
        if let Some(folder) = folder {
            app.open_folder(&folder);
        }
        app
    }

    fn info(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{}", text);
        self.status = Some(StatusMessage { text, is_error: false });
    }

    fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.status = Some(StatusMessage { text, is_error: true });
    }

    fn open_folder(&mut self, folder: &Path) {
        match self.session.open_folder(folder) {
            Ok(summary) => {
                let mut message = format!("Number of audio files found: {}", summary.found);
                if summary.already_annotated > 0 {
                    message.push_str(&format!(", already annotated: {}", summary.already_annotated));
                }
                self.info(message);
                self.load_current_file(false);
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    /// Decode the current file and its spectrogram in the background.
    fn load_current_file(&mut self, play_when_loaded: bool) {
        self.spectrogram_texture = None;
        self.spectrogram_image = None;
        self.transcript = self.session.current_transcript();

        let Some(path) = self.session.current_file().map(Path::to_path_buf) else {
            self.loader = None;
            self.loading_message = None;
            if !self.session.queue().all_files().is_empty() {
                self.info("All files in this folder are already annotated");
            }
            return;
        };

        let (sender, receiver) = channel();
        self.loader = Some(receiver);
        self.play_when_loaded = play_when_loaded;
        self.loading_message = Some(format!("Loading {}...", short_path(&path)));

        let params = self.config.spectrogram;
        std::thread::spawn(move || {
            let result = media::load_recording(&path).map(|recording| {
                let spec = spectrogram::compute(
                    &recording.first_channel(),
                    recording.sample_rate(),
                    params.window_size,
                    params.overlap,
                );
                let image = spectrogram::render(&spec, spectrogram::MAX_IMAGE_COLUMNS);
                LoadedRecording {
                    max_frequency: spec.max_frequency(),
                    time_extent: spec.time_extent(),
                    recording,
                    image,
                }
            });
            let _ = sender.send(result);
        });
    }

    fn finish_loading(&mut self, ctx: &egui::Context, result: Result<LoadedRecording, AnnotatorError>) {
        self.loader = None;
        self.loading_message = None;

        match result {
            Ok(loaded) => {
                if !self.session.attach_recording(loaded.recording) {
                    return;
                }
                let size = [loaded.image.width() as usize, loaded.image.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, loaded.image.as_raw());
                self.spectrogram_texture = Some(ctx.load_texture(
                    "spectrogram",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
                self.spectrogram_image = Some(loaded.image);
                self.max_frequency = loaded.max_frequency;
                self.time_extent = loaded.time_extent;

                if std::mem::take(&mut self.play_when_loaded) {
                    self.play();
                }
            }
            Err(e) => {
                self.session.detach_recording();
                self.error(e.to_string());
            }
        }
    }

    fn play(&mut self) {
        if let Err(e) = self.session.play(None) {
            self.error(e.to_string());
        }
    }

    fn submit(&mut self) {
        match self.session.submit(&self.transcript) {
            Ok(()) => {
                self.transcript = self.transcript.trim().to_string();
                self.info(format!("Saved to {}", self.session.store().path().display()));
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    fn next(&mut self, autoplay: bool) {
        match self.session.advance(&self.transcript) {
            Ok(Navigation::Moved(_)) => {
                self.status = None;
                self.load_current_file(autoplay);
            }
            Ok(Navigation::AtLast) => {
                self.transcript = self.transcript.trim().to_string();
                self.info("Saved. No more files in the folder.");
            }
            Ok(Navigation::AtFirst) | Ok(Navigation::Empty) => {}
            Err(e) => self.error(e.to_string()),
        }
    }

    fn previous(&mut self) {
        match self.session.retreat() {
            Navigation::Moved(_) => {
                self.status = None;
                self.load_current_file(false);
            }
            Navigation::AtFirst => self.info("This is the first file."),
            Navigation::AtLast | Navigation::Empty => {}
        }
    }

    fn choose_annotation_folder(&mut self) {
        let Some(folder) = rfd::FileDialog::new().pick_folder() else {
            return;
        };
        let file_name = self
            .session
            .store()
            .path()
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("transcriptions.csv"));
        let path = folder.join(file_name);
        match self.session.retarget_store(path.clone()) {
            Ok(()) => {
                self.transcript = self.session.current_transcript();
                self.info(format!("Annotations will be saved at: {}", path.display()));
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    fn export_annotations(&mut self, path: PathBuf) {
        let records = self.session.store().records();
        let extension = path.extension().and_then(|s| s.to_str());
        let result = match extension {
            Some("yaml") | Some("yml") => serialization::export_yaml(records, &path),
            Some("json") => serialization::export_json(records, &path),
            _ => {
                self.error(format!("Unsupported file extension: {:?}", extension));
                return;
            }
        };

        match result {
            Ok(()) => self.info(format!("Exported annotations to {}", path.display())),
            Err(e) => self.error(format!("Failed to export annotations: {:#}", e)),
        }
    }

    fn save_spectrogram(&mut self, path: PathBuf) {
        let Some(image) = &self.spectrogram_image else {
            return;
        };
        match image.save(&path) {
            Ok(()) => self.info(format!("Saved spectrogram to {}", path.display())),
            Err(e) => self.error(format!("Failed to save spectrogram: {}", e)),
        }
    }

    fn handle_toolbar(&mut self, action: toolbar::ToolbarAction) {
        use toolbar::ToolbarAction;
        match action {
            ToolbarAction::Previous => self.previous(),
            ToolbarAction::Next => self.next(self.config.playback.auto_play),
            ToolbarAction::Play => self.play(),
            ToolbarAction::Stop => self.session.stop_playback(),
            ToolbarAction::ZoomIn => {
                self.session.zoom_in();
            }
            ToolbarAction::ZoomOut => {
                self.session.zoom_out();
            }
            ToolbarAction::ShiftLeft => {
                self.session.shift(Direction::Left);
            }
            ToolbarAction::ShiftRight => {
                self.session.shift(Direction::Right);
            }
            ToolbarAction::None => {}
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.session.recording().is_none() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            if let Err(e) = self.session.toggle_playback() {
                self.error(e.to_string());
            }
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals)) {
            self.session.zoom_in();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Minus)) {
            self.session.zoom_out();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.session.shift(Direction::Left);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.session.shift(Direction::Right);
        }
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed decoding
        let received = self.loader.as_ref().and_then(|receiver| receiver.try_recv().ok());
        if let Some(result) = received {
            self.finish_loading(ctx, result);
        }

        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        self.session.sync_tick();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Audio Folder...").clicked() {
                        if let Some(folder) = rfd::FileDialog::new().pick_folder() {
                            self.open_folder(&folder);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Annotations Folder...").clicked() {
                        self.choose_annotation_folder();
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("Export Annotations", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("annotations.yaml")
                                .save_file()
                            {
                                self.export_annotations(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("annotations.json")
                                .save_file()
                            {
                                self.export_annotations(path);
                            }
                            ui.close_menu();
                        }
                    });
                    let has_image = self.spectrogram_image.is_some();
                    if ui.add_enabled(has_image, egui::Button::new("Save Spectrogram Image...")).clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("PNG", &["png"])
                            .set_file_name("spectrogram.png")
                            .save_file()
                        {
                            self.save_spectrogram(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        self.session.stop_playback();
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let has_recording = self.session.recording().is_some();
                    if ui.add_enabled(has_recording, egui::Button::new("Zoom In (+)")).clicked() {
                        self.session.zoom_in();
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_recording, egui::Button::new("Zoom Out (-)")).clicked() {
                        self.session.zoom_out();
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let has_recording = self.session.recording().is_some();
        let is_playing = self.session.is_playing();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(ui, &self.config.buttons_params, has_recording, is_playing)
            })
            .inner;
        self.handle_toolbar(toolbar_action);

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| match &self.status {
                Some(status) if status.is_error => {
                    ui.colored_label(egui::Color32::from_rgb(230, 80, 80), &status.text);
                }
                Some(status) => {
                    ui.label(&status.text);
                }
                None => {
                    ui.label(egui::RichText::new("Ready").weak());
                }
            });
        });

        // Transcription panel
        let info = properties::PanelInfo {
            file_label: self.session.current_file().map(short_path),
            position: self.session.queue().current_index(),
            remaining: self.session.queue().remaining().len(),
            annotated: self.session.store().len(),
        };
        let panel_action = egui::TopBottomPanel::bottom("transcription")
            .show(ctx, |ui| {
                ui.add_space(6.0);
                let action = properties::show(ui, &info, &mut self.transcript);
                ui.add_space(6.0);
                action
            })
            .inner;
        match panel_action {
            properties::PanelAction::Submit => self.submit(),
            properties::PanelAction::SubmitAndNext => self.next(self.config.playback.auto_play),
            properties::PanelAction::None => {}
        }

        self.handle_shortcuts(ctx);

        // Spectrogram (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    return canvas::CanvasAction::None;
                }

                let plot = match (&self.spectrogram_texture, self.session.recording()) {
                    (Some(texture), Some(_)) => Some(canvas::PlotData {
                        texture,
                        viewport: self.session.viewport(),
                        cursor: self.session.cursor(),
                        max_frequency: self.max_frequency,
                        time_extent: self.time_extent,
                    }),
                    _ => None,
                };
                let has_plot = plot.is_some();
                let has_folder = self.session.current_file().is_some();
                let action = canvas::show(ui, plot, has_folder);
                if has_plot {
                    timeline::show_overview(ui, self.session.viewport(), self.session.cursor());
                }
                action
            })
            .inner;

        if let canvas::CanvasAction::Click(time) = canvas_action {
            if let Err(e) = self.session.click(time) {
                self.error(e.to_string());
            }
        }

        // Re-arm the cursor sync
        if let Some(due) = self.session.next_sync_due() {
            ctx.request_repaint_after(due.saturating_duration_since(Instant::now()));
        }
    }
}
