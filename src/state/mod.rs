// src/state/mod.rs
use chrono::Utc;

use crate::analysis::results::row_text;
use crate::analysis::{CorrelationResultSet, PairRequest, ResultRow, ScatterData};
use crate::api::{ApiEvent, ApiResult, RequestToken};
use crate::config::{CorrelationRequest, Query, Settings, Side, TestKind};
use crate::file::export;

pub mod history_state;
pub mod plot_state;
pub mod query_state;
pub mod request_state;
pub mod results_state;
pub mod table_state;

use history_state::HistoryState;
use plot_state::PlotState;
use query_state::{Dropdown, OptionRequest, QueryForm};
use request_state::RequestCoordinator;
use results_state::ResultsState;

// Everything the user can do, plus API completions
#[derive(Debug)]
pub enum Action {
    SetCategories(Side, Vec<String>),
    SetSubcategories(Side, Vec<String>),
    SetFeatures(Side, Vec<String>),
    SetMinCorrelation(f64),
    SetMaxPValue(f64),
    DropdownOpened(Dropdown),
    DropdownClosed(Dropdown),
    Submit,
    ReplayHistory(usize),
    ClearHistory,
    CancelQuery,
    /// Query again with the clicked row's `feature_2` as the primary feature
    Requery(ResultRow),
    SelectTab(TestKind),
    SortBy(String),
    LoadMore,
    ScrollToTop,
    ViewPlot(PairRequest),
    ClosePlot,
    DownloadRow(PairRequest),
    ExportTable,
    Api(ApiEvent),
    DismissError,
    DismissQueryError,
}

// Work the app shell performs on the reducer's behalf
#[derive(Debug)]
pub enum Effect {
    FetchCategories,
    FetchSubcategories {
        side: Side,
        categories: Vec<String>,
    },
    FetchFeatures {
        side: Side,
        categories: Vec<String>,
        subcategories: Vec<String>,
    },
    FetchCorrelations {
        token: RequestToken,
        request: CorrelationRequest,
    },
    FetchPlotData(PairRequest),
    FetchRowData(PairRequest),
    PersistHistory(Vec<Query>),
    SaveCsv {
        file_name: String,
        contents: String,
    },
    ScrollToTop,
}

impl From<OptionRequest> for Effect {
    fn from(request: OptionRequest) -> Self {
        match request {
            OptionRequest::Subcategories { side, categories } => {
                Effect::FetchSubcategories { side, categories }
            }
            OptionRequest::Features { side, categories, subcategories } => {
                Effect::FetchFeatures { side, categories, subcategories }
            }
        }
    }
}

// Core application state
#[derive(Debug)]
pub struct AppState {
    pub form: QueryForm,
    pub history: HistoryState,
    pub requests: RequestCoordinator,
    pub results: ResultsState,
    pub plot: PlotState,

    /// Blocking alert for failed user actions
    pub error_message: Option<String>,
    /// Last correlation query failure; results stay as they were
    pub query_error: Option<String>,

    categorical_threshold: usize,
    pending_highlight: Option<String>,
}

impl AppState {
    pub fn new(settings: &Settings, history: Vec<Query>) -> Self {
        Self {
            form: QueryForm::default(),
            history: HistoryState::new(history),
            requests: RequestCoordinator::default(),
            results: ResultsState::new(settings.results_increment),
            plot: PlotState::default(),
            error_message: None,
            query_error: None,
            categorical_threshold: settings.categorical_threshold,
            pending_highlight: None,
        }
    }

    /// Startup work: the category list, and the form filled from the newest
    /// history entry
    pub fn init(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::FetchCategories];
        if let Some(newest) = self.history.newest().cloned() {
            effects.extend(self.form.prefill(&newest).into_iter().map(Effect::from));
        }
        effects
    }

    pub fn is_loading(&self) -> bool {
        self.requests.is_loading()
    }

    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::SetCategories(side, categories) => {
                self.form.set_categories(side, categories);
                Vec::new()
            }
            Action::SetSubcategories(side, subcategories) => {
                self.form.set_subcategories(side, subcategories);
                Vec::new()
            }
            Action::SetFeatures(side, features) => {
                self.form.set_features(side, features);
                Vec::new()
            }
            Action::SetMinCorrelation(value) => {
                self.form.set_min_correlation(value);
                Vec::new()
            }
            Action::SetMaxPValue(value) => {
                self.form.set_max_p_value(value);
                Vec::new()
            }
            Action::DropdownOpened(dropdown) => {
                self.form.dropdown_opened(dropdown);
                Vec::new()
            }
            Action::DropdownClosed(dropdown) => {
                self.form.dropdown_closed(dropdown).map(Effect::from).into_iter().collect()
            }
            Action::Submit => match self.form.to_query() {
                Some(query) => self.submit_query(query, None),
                None => Vec::new(),
            },
            Action::ReplayHistory(index) => self.replay(index),
            Action::ClearHistory => {
                self.history.clear();
                vec![Effect::PersistHistory(Vec::new())]
            }
            Action::CancelQuery => {
                if self.requests.cancel_current() {
                    log::info!("Correlation query cancelled by user");
                }
                Vec::new()
            }
            Action::Requery(row) => self.requery(&row),
            Action::SelectTab(kind) => {
                self.results.select_tab(kind);
                Vec::new()
            }
            Action::SortBy(key) => {
                self.results.sort_by(&key);
                Vec::new()
            }
            Action::LoadMore => {
                self.results.table.load_more();
                Vec::new()
            }
            Action::ScrollToTop => vec![Effect::ScrollToTop],
            Action::ViewPlot(request) => {
                self.plot.request(request.clone());
                vec![Effect::FetchPlotData(request)]
            }
            Action::ClosePlot => {
                self.plot.close();
                Vec::new()
            }
            Action::DownloadRow(request) => vec![Effect::FetchRowData(request)],
            Action::ExportTable => self.export_table(),
            Action::Api(event) => self.on_api_event(event),
            Action::DismissError => {
                self.error_message = None;
                Vec::new()
            }
            Action::DismissQueryError => {
                self.query_error = None;
                Vec::new()
            }
        }
    }

    fn submit_query(&mut self, query: Query, highlight: Option<String>) -> Vec<Effect> {
        log::debug!("Submitting correlation query: {}", query.summary());
        self.history.record(query.clone());
        self.query_error = None;
        self.pending_highlight = highlight;

        let request = query.to_request();
        let token = self.requests.begin(query);
        vec![
            Effect::PersistHistory(self.history.entries().to_vec()),
            Effect::FetchCorrelations { token, request },
            Effect::ScrollToTop,
        ]
    }

    fn replay(&mut self, index: usize) -> Vec<Effect> {
        let Some(query) = self.history.get(index).cloned() else {
            return Vec::new();
        };
        let mut effects: Vec<Effect> = self.form.prefill(&query).into_iter().map(Effect::from).collect();
        effects.extend(self.submit_query(query, None));
        effects
    }

    fn requery(&mut self, row: &ResultRow) -> Vec<Effect> {
        let Some(current) = self.results.query().cloned() else {
            return Vec::new();
        };
        let (Some(feature), Some(database)) = (row_text(row, "feature_2"), row_text(row, "database_2")) else {
            return Vec::new();
        };
        let subcategory1 = row_text(row, "subcategory_2")
            .map(|s| vec![s])
            .unwrap_or_else(|| current.subcategory2.clone());

        let query = Query::new(
            feature,
            current.feature2.clone(),
            vec![database],
            current.database2.clone(),
            subcategory1,
            current.subcategory2.clone(),
            current.min_correlation,
            current.max_p_value,
        );

        let mut effects: Vec<Effect> = self.form.prefill(&query).into_iter().map(Effect::from).collect();
        effects.extend(self.submit_query(query, Some(current.feature1)));
        effects
    }

    fn export_table(&mut self) -> Vec<Effect> {
        let Some(query) = self.results.query() else {
            return Vec::new();
        };
        if self.results.table.order().is_empty() {
            self.error_message = Some("There are no rows to export".to_string());
            return Vec::new();
        }

        let file_name = export::results_file_name(&query.feature1, self.results.selected_tab(), Utc::now());
        match export::results_to_csv(self.results.ordered_rows()) {
            Ok(contents) => vec![Effect::SaveCsv { file_name, contents }],
            Err(e) => {
                log::error!("Failed to build results CSV: {:#}", e);
                self.error_message = Some(format!("Failed to export results: {}", e));
                Vec::new()
            }
        }
    }

    fn on_api_event(&mut self, event: ApiEvent) -> Vec<Effect> {
        match event {
            ApiEvent::Categories(result) => match result {
                Ok(categories) => self.form.apply_categories(categories),
                Err(e) => log::error!("Failed to load categories: {}", e),
            },
            ApiEvent::Subcategories { side, categories, result } => match result {
                Ok(options) => {
                    if !self.form.apply_subcategory_options(side, &categories, options) {
                        log::debug!("Dropping subcategories for stale selection {:?}", categories);
                    }
                }
                Err(e) => log::error!("Failed to load subcategories: {}", e),
            },
            ApiEvent::Features { side, categories, subcategories, result } => match result {
                Ok(options) => {
                    if !self.form.apply_feature_options(side, &categories, &subcategories, options) {
                        log::debug!("Dropping features for stale selection {:?}", subcategories);
                    }
                }
                Err(e) => log::error!("Failed to load features: {}", e),
            },
            ApiEvent::Correlations { token, result } => self.on_correlations(&token, result),
            ApiEvent::PlotData { request, result } => match result {
                Ok(data) => {
                    if self.plot.show(&request, data, self.categorical_threshold).is_none() {
                        self.error_message = Some(no_data_message(&request));
                    }
                }
                Err(e) => {
                    log::error!("Failed to load plot data: {}", e);
                    self.plot.failed(&request);
                    self.error_message = Some(format!("Failed to load plot data: {}", e));
                }
            },
            ApiEvent::RowData { request, result } => return self.on_row_data(request, result),
        }
        Vec::new()
    }

    fn on_correlations(&mut self, token: &RequestToken, result: ApiResult<CorrelationResultSet>) {
        let Some(query) = self.requests.complete(token) else {
            log::info!("Ignoring response for superseded request {}", token.id());
            return;
        };

        match result {
            Ok(set) => {
                log::info!("Received {} correlation rows for {}", set.total_rows(), query.feature1);
                let highlight = self.pending_highlight.take();
                self.results.commit(query, set, highlight);
            }
            Err(e) if e.is_cancellation() => {
                log::info!("Correlation request for {} was cancelled", query.feature1);
            }
            Err(e) => {
                log::error!("Correlation query failed: {}", e);
                self.query_error = Some(format!("Correlation query failed: {}", e));
            }
        }
    }

    fn on_row_data(&mut self, request: PairRequest, result: ApiResult<ScatterData>) -> Vec<Effect> {
        let data = match result {
            Ok(data) => data,
            Err(e) => {
                log::error!("Failed to load row data: {}", e);
                self.error_message = Some(format!("Failed to download data: {}", e));
                return Vec::new();
            }
        };
        if data.rows.is_empty() {
            self.error_message = Some(no_data_message(&request));
            return Vec::new();
        }

        match export::row_data_to_csv(&data.rows) {
            Ok(contents) => vec![Effect::SaveCsv {
                file_name: export::row_data_file_name(
                    &request.feature1,
                    &request.feature2,
                    request.plot_type,
                    Utc::now(),
                ),
                contents,
            }],
            Err(e) => {
                log::error!("Failed to build row data CSV: {:#}", e);
                self.error_message = Some(format!("Failed to download data: {}", e));
                Vec::new()
            }
        }
    }
}

fn no_data_message(request: &PairRequest) -> String {
    format!("No data returned for {} vs {}", request.feature1, request.feature2)
}
