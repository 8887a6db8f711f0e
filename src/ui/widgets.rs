// src/ui/widgets.rs
use eframe::egui;

const MAX_NAMES_SHOWN: usize = 2;

pub struct DropdownResponse {
    /// The full new selection, when a box was toggled this frame
    pub changed: Option<Vec<String>>,
    pub open: bool,
}

pub fn selection_text(selected: &[String]) -> String {
    match selected.len() {
        0 => "Select...".to_string(),
        n if n <= MAX_NAMES_SHOWN => selected.join(", "),
        n => format!("{} (+{})", selected[..MAX_NAMES_SHOWN].join(", "), n - MAX_NAMES_SHOWN),
    }
}

/// Checkbox list in a menu, which stays open while the user toggles entries
pub fn multi_select(ui: &mut egui::Ui, options: &[String], selected: &[String]) -> DropdownResponse {
    let mut changed = None;
    let response = ui.menu_button(selection_text(selected), |ui| {
        if options.is_empty() {
            ui.weak("No options");
            return;
        }
        egui::ScrollArea::vertical()
            .max_height(300.0)
            .show(ui, |ui| {
                for option in options {
                    let mut checked = selected.contains(option);
                    if ui.checkbox(&mut checked, option).changed() {
                        let mut next: Vec<String> = selected.iter()
                            .filter(|s| *s != option)
                            .cloned()
                            .collect();
                        if checked {
                            next.push(option.clone());
                        }
                        changed = Some(next);
                    }
                }
            });
    });

    DropdownResponse {
        changed,
        open: response.inner.is_some(),
    }
}

pub fn single_select(ui: &mut egui::Ui, id: &str, options: &[String], selected: Option<&String>) -> Option<String> {
    let mut picked = None;
    egui::ComboBox::from_id_source(id)
        .width(220.0)
        .selected_text(selected.map_or("Select...", |s| s.as_str()))
        .show_ui(ui, |ui| {
            for option in options {
                if ui.selectable_label(selected == Some(option), option).clicked() {
                    picked = Some(option.clone());
                }
            }
        });
    picked
}
