// src/app.rs
use eframe::egui;
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiWorker, CellLineApi};
use crate::config::Query;
use crate::file::history::HistoryFileHandler;
use crate::file::{export, FileHandler};
use crate::state::{Action, AppState, Effect};
use crate::ui;

pub struct ExplorerApp {
    state: AppState,
    worker: ApiWorker,
    history_path: Option<PathBuf>,
    history_handler: HistoryFileHandler,
    scroll_to_top: bool,
}

impl ExplorerApp {
    pub fn new(
        ctx: &egui::Context,
        api: Arc<dyn CellLineApi>,
        state: AppState,
        history_path: Option<PathBuf>,
    ) -> Self {
        let mut app = Self {
            state,
            worker: ApiWorker::new(api).with_repaint(ctx.clone()),
            history_path,
            history_handler: HistoryFileHandler::new(),
            scroll_to_top: false,
        };
        let effects = app.state.init();
        app.run_effects(effects);
        app
    }

    fn dispatch(&mut self, action: Action) {
        let effects = self.state.apply(action);
        self.run_effects(effects);
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchCategories => self.worker.fetch_categories(),
                Effect::FetchSubcategories { side, categories } => {
                    self.worker.fetch_subcategories(side, categories)
                }
                Effect::FetchFeatures { side, categories, subcategories } => {
                    self.worker.fetch_features(side, categories, subcategories)
                }
                Effect::FetchCorrelations { token, request } => {
                    log::debug!("Requesting correlations for {}", request.feature1);
                    self.worker.fetch_correlations(token, request)
                }
                Effect::FetchPlotData(request) => self.worker.fetch_plot_data(request),
                Effect::FetchRowData(request) => self.worker.fetch_row_data(request),
                Effect::PersistHistory(entries) => self.persist_history(&entries),
                Effect::SaveCsv { file_name, contents } => self.save_csv(&file_name, &contents),
                Effect::ScrollToTop => self.scroll_to_top = true,
            }
        }
    }

    fn persist_history(&self, entries: &Vec<Query>) {
        let Some(path) = &self.history_path else {
            return;
        };
        if let Err(e) = self.history_handler.save(entries, path) {
            log::warn!("Failed to save query history: {:#}", e);
        }
    }

    fn save_csv(&mut self, file_name: &str, contents: &str) {
        let file_dialog = FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .set_title("Save CSV")
            .set_file_name(file_name);

        if let Some(path) = file_dialog.save_file() {
            match export::write_csv(&path, contents) {
                Ok(()) => log::info!("Saved {}", path.display()),
                Err(e) => {
                    log::error!("Failed to save CSV: {:#}", e);
                    self.state.error_message = Some(format!("Failed to save {}: {}", path.display(), e));
                }
            }
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for event in self.worker.poll() {
            self.dispatch(Action::Api(event));
        }

        let mut actions = Vec::new();

        egui::SidePanel::left("query_panel")
            .resizable(true)
            .default_width(520.0)
            .show(ctx, |ui| {
                ui::query_form::show_query_form(ui, &self.state, &mut actions);
                ui.add_space(8.0);
                ui.separator();
                ui::history::show_history(ui, &self.state, &mut actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut scroll = egui::ScrollArea::both().id_source("results_scroll");
            if std::mem::take(&mut self.scroll_to_top) {
                scroll = scroll.vertical_scroll_offset(0.0);
            }
            scroll.show(ui, |ui| {
                ui::results::show_results(ui, &self.state, &mut actions);
            });
        });

        ui::plot::show_plot_window(ctx, &self.state, &mut actions);

        // Show error modal if needed
        if let Some(error) = &self.state.error_message {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(error);
                    if ui.button("OK").clicked() {
                        actions.push(Action::DismissError);
                    }
                });
        }

        for action in actions {
            self.dispatch(action);
        }

        if self.state.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
