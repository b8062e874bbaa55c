// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transcription panel.
//!
//! This module provides the panel showing the current file and its
//! progress in the queue, and the text entry for its transcription.

/// Request from the transcription panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    None,
    Submit,
    /// Enter pressed in the text field.
    SubmitAndNext,
}

/// Queue position shown above the text entry.
pub struct PanelInfo {
    pub file_label: Option<String>,
    pub position: usize,
    pub remaining: usize,
    pub annotated: usize,
}

/// Display the transcription panel.
pub fn show(ui: &mut egui::Ui, info: &PanelInfo, transcript: &mut String) -> PanelAction {
    let mut action = PanelAction::None;

    ui.horizontal(|ui| {
        match &info.file_label {
            Some(label) => {
                ui.label(egui::RichText::new(label).strong());
                ui.separator();
                ui.label(format!("File {} of {}", info.position + 1, info.remaining));
            }
            None => {
                ui.label(egui::RichText::new("No file selected").weak());
            }
        }
        ui.separator();
        ui.label(format!("{} annotated", info.annotated));
    });

    ui.add_space(4.0);
    ui.label(egui::RichText::new("Transcription:").size(14.0));

    ui.horizontal(|ui| {
        let enabled = info.file_label.is_some();
        let submit_width = 140.0;
        let edit = egui::TextEdit::singleline(transcript)
            .font(egui::TextStyle::Body)
            .hint_text("Type what you hear, Enter saves and moves on")
            .desired_width(ui.available_width() - submit_width);
        let response = ui.add_enabled(enabled, edit);
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            action = PanelAction::SubmitAndNext;
        }

        if ui
            .add_enabled(enabled, egui::Button::new("Submit to Save").min_size(egui::vec2(submit_width - 8.0, 0.0)))
            .clicked()
        {
            action = PanelAction::Submit;
        }
    });

    action
}
