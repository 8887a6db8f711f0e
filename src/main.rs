// src/main.rs
use anyhow::Result;
use eframe::egui;
use std::sync::Arc;

mod analysis;
mod api;
mod app;
mod config;
mod file;
mod state;
mod ui;

use api::HttpApi;
use app::ExplorerApp;
use config::Settings;
use file::history::HistoryFileHandler;
use file::FileHandler;
use state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load()?;
    log::info!("Using API at {}", settings.api_root);

    let history_path = settings.history_file();
    let history = match &history_path {
        Some(path) => HistoryFileHandler::new().load(path).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable query history: {:#}", e);
            Vec::new()
        }),
        None => Vec::new(),
    };

    let api = Arc::new(HttpApi::new(&settings.api_root)?);
    let state = AppState::new(&settings, history);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Cell Line Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "Cell Line Explorer",
        options,
        Box::new(move |cc| {
            Box::new(ExplorerApp::new(&cc.egui_ctx, api, state, history_path))
        }),
    ).map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))
}
