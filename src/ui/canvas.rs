// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Spectrogram plot.
//!
//! This module draws the visible part of the spectrogram, the frequency
//! and time axes and the cursor mark, and turns clicks on the plot into
//! times in seconds.

use crate::models::viewport::ViewportModel;
use crate::ui::timeline;
use crate::util::geometry::{pixel_to_time, time_to_pixel, visible_uv};

/// Space reserved left of the plot for frequency labels.
const FREQ_AXIS_WIDTH: f32 = 56.0;
/// Space reserved below the plot for the time axis.
const TIME_AXIS_HEIGHT: f32 = 22.0;

const CURSOR_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 255, 0);

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// Click inside the plot at this time.
    Click(f64),
}

/// What the canvas needs to draw a recording.
pub struct PlotData<'a> {
    pub texture: &'a egui::TextureHandle,
    pub viewport: &'a ViewportModel,
    pub cursor: Option<f64>,
    pub max_frequency: f64,
    /// Seconds spanned by the texture's columns.
    pub time_extent: (f64, f64),
}

/// Display the spectrogram canvas and handle clicks.
pub fn show(ui: &mut egui::Ui, plot: Option<PlotData<'_>>, has_folder: bool) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let Some(plot) = plot else {
            show_placeholder(ui, has_folder);
            return;
        };

        let outer = ui.max_rect();
        let plot_rect = egui::Rect::from_min_max(
            outer.min + egui::vec2(FREQ_AXIS_WIDTH, 4.0),
            outer.max - egui::vec2(8.0, TIME_AXIS_HEIGHT),
        );
        let response = ui.allocate_rect(plot_rect, egui::Sense::click());
        let painter = ui.painter();

        let viewport = plot.viewport;
        let (u_min, u_max) = visible_uv(viewport.start(), viewport.end(), plot.time_extent);
        painter.image(
            plot.texture.id(),
            plot_rect,
            egui::Rect::from_min_max(egui::pos2(u_min, 0.0), egui::pos2(u_max, 1.0)),
            egui::Color32::WHITE,
        );

        draw_frequency_axis(painter, plot_rect, plot.max_frequency);
        let axis_rect = egui::Rect::from_min_max(
            egui::pos2(plot_rect.min.x, plot_rect.max.y),
            egui::pos2(plot_rect.max.x, outer.max.y),
        );
        timeline::draw_time_axis(painter, axis_rect, viewport);

        if let Some(time) = plot.cursor.filter(|t| viewport.contains(*t)) {
            let x = plot_rect.min.x
                + time_to_pixel(time, plot_rect.width() as f64, viewport.start(), viewport.end()) as f32;
            painter.extend(egui::Shape::dashed_line(
                &[egui::pos2(x, plot_rect.min.y), egui::pos2(x, plot_rect.max.y)],
                egui::Stroke::new(2.0, CURSOR_COLOR),
                6.0,
                4.0,
            ));
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if plot_rect.contains(pos) {
                    let time = pixel_to_time(
                        (pos.x - plot_rect.min.x) as f64,
                        plot_rect.width() as f64,
                        viewport.start(),
                        viewport.end(),
                    );
                    action = CanvasAction::Click(time);
                }
            }
        }
    });

    action
}

fn draw_frequency_axis(painter: &egui::Painter, plot_rect: egui::Rect, max_frequency: f64) {
    let color = egui::Color32::from_gray(200);
    for fraction in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let y = plot_rect.max.y - fraction * plot_rect.height();
        painter.line_segment(
            [egui::pos2(plot_rect.min.x - 4.0, y), egui::pos2(plot_rect.min.x, y)],
            egui::Stroke::new(1.0, color),
        );
        painter.text(
            egui::pos2(plot_rect.min.x - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            format!("{:.0}", max_frequency * fraction as f64),
            egui::FontId::proportional(11.0),
            color,
        );
    }
    painter.text(
        egui::pos2(plot_rect.min.x - 6.0, plot_rect.min.y - 2.0),
        egui::Align2::RIGHT_BOTTOM,
        "Hz",
        egui::FontId::proportional(10.0),
        color,
    );
}

fn show_placeholder(ui: &mut egui::Ui, has_folder: bool) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Speech Transcription Tool")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            let hint = if has_folder {
                "No recording loaded"
            } else {
                "Open a folder of recordings to begin annotating"
            };
            ui.label(egui::RichText::new(hint).color(egui::Color32::from_gray(180)));
            if !has_folder {
                ui.add_space(10.0);
                ui.label(
                    egui::RichText::new("File → Open Audio Folder...")
                        .weak()
                        .color(egui::Color32::from_gray(130)),
                );
            }
        });
    });
}
