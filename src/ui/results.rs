// src/ui/results.rs
use eframe::egui;
use egui::{Color32, RichText};
use egui_extras::{Column, TableBuilder};

use crate::analysis::format::format_cell;
use crate::analysis::results::row_number;
use crate::analysis::{MetricSchema, PairRequest, ResultRow};
use crate::config::TestKind;
use crate::state::{Action, AppState};

const ROW_HEIGHT: f32 = 22.0;
const HIGHLIGHT: Color32 = Color32::from_rgb(255, 243, 176);

pub fn correlation_color(value: f64) -> Color32 {
    if value > 0.75 {
        Color32::from_rgb(178, 24, 43)
    } else if value > 0.5 {
        Color32::from_rgb(214, 96, 77)
    } else if value > 0.25 {
        Color32::from_rgb(244, 165, 130)
    } else if value > -0.25 {
        Color32::GRAY
    } else if value > -0.5 {
        Color32::from_rgb(146, 197, 222)
    } else {
        Color32::from_rgb(33, 102, 172)
    }
}

pub fn p_value_color(value: f64) -> Color32 {
    if value < 0.01 {
        Color32::from_rgb(27, 120, 55)
    } else if value < 0.05 {
        Color32::from_rgb(90, 174, 97)
    } else {
        Color32::GRAY
    }
}

pub fn show_results(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<Action>) {
    show_status(ui, state, actions);

    let Some(committed) = state.results.committed() else {
        ui.weak("Submit a query to see correlations");
        return;
    };

    ui.horizontal(|ui| {
        ui.heading(format!("Results for {}", committed.query.feature1));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let exportable = !state.results.table.order().is_empty();
            if ui.add_enabled(exportable, egui::Button::new("⬇ Export CSV")).clicked() {
                actions.push(Action::ExportTable);
            }
        });
    });

    ui.horizontal(|ui| {
        for kind in TestKind::ALL {
            let label = format!("{} ({})", kind.display_name(), state.results.tab_len(kind));
            if ui.selectable_label(state.results.selected_tab() == kind, label).clicked() {
                actions.push(Action::SelectTab(kind));
            }
        }
    });
    ui.separator();

    let Some(schema) = state.results.schema() else {
        ui.label("No results");
        return;
    };
    if state.results.table.order().is_empty() {
        ui.label("No rows pass the current thresholds");
        return;
    }

    show_table(ui, state, schema, actions);
    show_footer(ui, state, actions);
}

fn show_status(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<Action>) {
    if let Some(elapsed) = state.requests.elapsed() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(format!("Running query... {}s", elapsed.as_secs()));
            if ui.button("Cancel").clicked() {
                actions.push(Action::CancelQuery);
            }
        });
    }

    if let Some(error) = &state.query_error {
        ui.horizontal(|ui| {
            ui.colored_label(Color32::RED, format!("⚠ {}", error));
            if ui.small_button("✖").clicked() {
                actions.push(Action::DismissQueryError);
            }
        });
    }

    if let Some(request) = &state.plot.requested {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(format!("Loading plot for {} vs {}", request.feature1, request.feature2));
        });
    }
}

fn show_table(ui: &mut egui::Ui, state: &AppState, schema: &MetricSchema, actions: &mut Vec<Action>) {
    let tab = state.results.selected_tab();
    let columns: Vec<String> = state.results.active_rows()
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    let sort = state.results.table.sort.as_ref();

    let mut table = TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center));
    for _ in &columns {
        table = table.column(Column::auto().resizable(true));
    }
    table = table.column(Column::remainder());

    table
        .header(ROW_HEIGHT, |mut header| {
            for key in &columns {
                header.col(|ui| {
                    let arrow = match sort {
                        Some(spec) if spec.key == *key => spec.direction.arrow(),
                        _ => "",
                    };
                    if ui.button(RichText::new(format!("{} {}", key, arrow)).strong()).clicked() {
                        actions.push(Action::SortBy(key.clone()));
                    }
                });
            }
            header.col(|ui| {
                ui.strong("Actions");
            });
        })
        .body(|mut body| {
            for row in state.results.visible_rows() {
                let highlighted = state.results.is_highlighted(row);
                body.row(ROW_HEIGHT, |mut table_row| {
                    for key in &columns {
                        table_row.col(|ui| {
                            show_cell(ui, row, key, schema, highlighted, actions);
                        });
                    }
                    table_row.col(|ui| {
                        let Some(request) = PairRequest::from_row(row, tab) else {
                            return;
                        };
                        if ui.link(tab.plot_label()).clicked() {
                            actions.push(Action::ViewPlot(request.clone()));
                        }
                        if ui.small_button("⬇ Data").on_hover_text("Download the raw values as CSV").clicked() {
                            actions.push(Action::DownloadRow(request));
                        }
                    });
                });
            }
        });
}

fn show_cell(
    ui: &mut egui::Ui,
    row: &ResultRow,
    key: &str,
    schema: &MetricSchema,
    highlighted: bool,
    actions: &mut Vec<Action>,
) {
    let mut text = RichText::new(format_cell(row.get(key)));
    if highlighted {
        text = text.strong().background_color(HIGHLIGHT);
    }

    if key == "feature_2" {
        if ui.link(text).on_hover_text("Query with this feature").clicked() {
            actions.push(Action::Requery(row.clone()));
        }
        return;
    }

    let color = match row_number(row, key) {
        Some(value) if schema.correlation_field() == Some(key) => Some(correlation_color(value)),
        Some(value) if schema.p_value_field() == key => Some(p_value_color(value)),
        _ => None,
    };
    match color {
        Some(color) => ui.label(text.color(color)),
        None => ui.label(text),
    };
}

fn show_footer(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<Action>) {
    let table = &state.results.table;
    if !table.has_more() {
        return;
    }

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.button("Back to Top").clicked() {
            actions.push(Action::ScrollToTop);
        }
        if ui.button("Load More").clicked() {
            actions.push(Action::LoadMore);
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(format!("Showing {} of {} rows", table.visible().len(), table.order().len()));
        });
    });
}
