// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Time axis and viewport overview.
//!
//! The time axis labels the visible window under the spectrogram; the
//! overview strip shows where that window sits in the whole recording.

use crate::models::viewport::ViewportModel;
use crate::util::display::format_time;
use crate::util::geometry::{tick_step, time_to_pixel};

/// Draw ticks and labels for the visible window along the top of `rect`.
pub fn draw_time_axis(painter: &egui::Painter, rect: egui::Rect, viewport: &ViewportModel) {
    let color = egui::Color32::from_gray(200);
    let (start, end) = (viewport.start(), viewport.end());
    let step = tick_step(end - start, 8);

    let mut tick = (start / step).ceil() * step;
    while tick <= end + step * 1e-6 {
        let x = rect.min.x + time_to_pixel(tick, rect.width() as f64, start, end) as f32;
        painter.line_segment(
            [egui::pos2(x, rect.min.y), egui::pos2(x, rect.min.y + 4.0)],
            egui::Stroke::new(1.0, color),
        );
        painter.text(
            egui::pos2(x, rect.min.y + 5.0),
            egui::Align2::CENTER_TOP,
            format!("{:.2}", tick),
            egui::FontId::proportional(11.0),
            color,
        );
        tick += step;
    }
}

/// Thin strip showing the visible window within the full duration.
pub fn show_overview(ui: &mut egui::Ui, viewport: &ViewportModel, cursor: Option<f64>) {
    let width = ui.available_width();
    let (rect, _response) = ui.allocate_exact_size(egui::vec2(width, 10.0), egui::Sense::hover());
    let painter = ui.painter();
    let duration = viewport.duration();

    painter.rect_filled(rect, 2.0, egui::Color32::from_gray(60));
    let x0 = rect.min.x + time_to_pixel(viewport.start(), rect.width() as f64, 0.0, duration) as f32;
    let x1 = rect.min.x + time_to_pixel(viewport.end(), rect.width() as f64, 0.0, duration) as f32;
    painter.rect_filled(
        egui::Rect::from_min_max(egui::pos2(x0, rect.min.y), egui::pos2(x1, rect.max.y)),
        2.0,
        egui::Color32::from_rgb(0, 120, 215),
    );
    if let Some(time) = cursor {
        let x = rect.min.x + time_to_pixel(time, rect.width() as f64, 0.0, duration) as f32;
        painter.line_segment(
            [egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)],
            egui::Stroke::new(2.0, egui::Color32::from_rgb(0, 255, 0)),
        );
    }

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!(
                "{} – {} of {}",
                format_time(viewport.start()),
                format_time(viewport.end()),
                format_time(duration)
            ))
            .weak(),
        );
        ui.separator();
        ui.label(egui::RichText::new(format!("Zoom {:.0}%", viewport.zoom() * 100.0)).weak());
    });
}
