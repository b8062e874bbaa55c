// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transport and navigation toolbar.
//!
//! This module provides the buttons for moving between files, playing
//! and stopping audio, and zooming or panning the spectrogram.

use crate::config::ButtonsParams;

/// Button pressed in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Previous,
    Next,
    Play,
    Stop,
    ZoomIn,
    ZoomOut,
    ShiftLeft,
    ShiftRight,
}

/// Display the toolbar.
pub fn show(
    ui: &mut egui::Ui,
    buttons: &ButtonsParams,
    has_recording: bool,
    is_playing: bool,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let nav_size = egui::vec2(buttons.width, buttons.height);
    let nav_color = egui::Color32::from_rgb(0, 128, 0);

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let previous = egui::Button::new(egui::RichText::new(" << Previous ").color(nav_color))
            .min_size(nav_size);
        if ui.add(previous).clicked() {
            action = ToolbarAction::Previous;
        }

        ui.separator();

        if ui
            .add_enabled(has_recording && !is_playing, egui::Button::new("▶ Play Audio"))
            .clicked()
        {
            action = ToolbarAction::Play;
        }
        if ui
            .add_enabled(is_playing, egui::Button::new("■ Stop Audio"))
            .clicked()
        {
            action = ToolbarAction::Stop;
        }

        ui.separator();

        if ui.add_enabled(has_recording, egui::Button::new("◀")).on_hover_text("Pan left").clicked() {
            action = ToolbarAction::ShiftLeft;
        }
        if ui.add_enabled(has_recording, egui::Button::new("➕")).on_hover_text("Zoom in").clicked() {
            action = ToolbarAction::ZoomIn;
        }
        if ui.add_enabled(has_recording, egui::Button::new("➖")).on_hover_text("Zoom out").clicked() {
            action = ToolbarAction::ZoomOut;
        }
        if ui.add_enabled(has_recording, egui::Button::new("▶")).on_hover_text("Pan right").clicked() {
            action = ToolbarAction::ShiftRight;
        }

        ui.separator();

        let next = egui::Button::new(egui::RichText::new(" Next >> ").color(nav_color))
            .min_size(nav_size);
        if ui.add(next).on_hover_text("Save the transcription and go to the next file").clicked() {
            action = ToolbarAction::Next;
        }

        ui.separator();

        let hint = if is_playing {
            "Click the green line to stop"
        } else {
            "Click the spectrogram to place a start point, click it again to play"
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
