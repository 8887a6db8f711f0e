// src/ui/history.rs
use eframe::egui;

use crate::state::{Action, AppState};

pub fn show_history(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<Action>) {
    ui.horizontal(|ui| {
        ui.heading("History");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.add_enabled(!state.history.is_empty(), egui::Button::new("Clear History")).clicked() {
                actions.push(Action::ClearHistory);
            }
        });
    });
    ui.add_space(4.0);

    if state.history.is_empty() {
        ui.weak("No queries yet");
        return;
    }

    egui::ScrollArea::vertical()
        .id_source("history_scroll")
        .show(ui, |ui| {
            for (index, query) in state.history.entries().iter().enumerate() {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    let response = ui.selectable_label(false, query.summary())
                        .on_hover_text("Run this query again");
                    if response.clicked() {
                        actions.push(Action::ReplayHistory(index));
                    }
                    ui.small(format!(
                        "{} / {}",
                        query.database1.join(", "),
                        query.database2.join(", ")
                    ));
                });
                ui.add_space(2.0);
            }
        });
}
