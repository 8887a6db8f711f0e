// src/ui/query_form.rs
use eframe::egui;

use crate::config::Side;
use crate::state::query_state::Dropdown;
use crate::state::{Action, AppState};
use crate::ui::widgets::{multi_select, single_select};

pub fn show_query_form(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<Action>) {
    ui.heading("Query");
    ui.add_space(4.0);

    egui::Grid::new("query_form_grid")
        .num_columns(3)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("");
            ui.strong("Feature 1");
            ui.strong("Feature 2");
            ui.end_row();

            ui.label("Category");
            for side in [Side::Primary, Side::Secondary] {
                watched_select(ui, state, Dropdown::Category(side), &state.form.category_options, actions);
            }
            ui.end_row();

            ui.label("Subcategory");
            for side in [Side::Primary, Side::Secondary] {
                let options = &state.form.side(side).subcategory_options;
                watched_select(ui, state, Dropdown::Subcategory(side), options, actions);
            }
            ui.end_row();

            ui.label("Feature");
            let primary = state.form.side(Side::Primary);
            if let Some(feature) = single_select(ui, "feature1_select", &primary.feature_options, primary.features.first()) {
                actions.push(Action::SetFeatures(Side::Primary, vec![feature]));
            }
            let secondary = state.form.side(Side::Secondary);
            if let Some(features) = multi_select(ui, &secondary.feature_options, &secondary.features).changed {
                actions.push(Action::SetFeatures(Side::Secondary, features));
            }
            ui.end_row();
        });

    ui.add_space(8.0);

    let mut min_correlation = state.form.min_correlation;
    if ui.add(egui::Slider::new(&mut min_correlation, -1.0..=1.0).text("Min |correlation|")).changed() {
        actions.push(Action::SetMinCorrelation(min_correlation));
    }
    let mut max_p_value = state.form.max_p_value;
    if ui.add(egui::Slider::new(&mut max_p_value, 0.0..=1.0).text("Max p-value")).changed() {
        actions.push(Action::SetMaxPValue(max_p_value));
    }

    ui.add_space(8.0);
    if ui.add_enabled(state.form.can_submit(), egui::Button::new("Submit")).clicked() {
        actions.push(Action::Submit);
    }
}

/// Multi-select that reports its open and close transitions so option lists
/// are fetched once per interaction
fn watched_select(ui: &mut egui::Ui, state: &AppState, dropdown: Dropdown, options: &[String], actions: &mut Vec<Action>) {
    let selected = match dropdown {
        Dropdown::Category(side) => &state.form.side(side).categories,
        Dropdown::Subcategory(side) => &state.form.side(side).subcategories,
    };

    let response = multi_select(ui, options, selected);
    if let Some(selection) = response.changed {
        actions.push(match dropdown {
            Dropdown::Category(side) => Action::SetCategories(side, selection),
            Dropdown::Subcategory(side) => Action::SetSubcategories(side, selection),
        });
    }

    let was_open = state.form.is_open(dropdown);
    if response.open && !was_open {
        actions.push(Action::DropdownOpened(dropdown));
    } else if !response.open && was_open {
        actions.push(Action::DropdownClosed(dropdown));
    }
}
