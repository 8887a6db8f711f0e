// src/api/worker.rs
use eframe::egui;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
#[cfg(test)]
use std::time::Duration;

use super::{ApiError, ApiResult, CellLineApi, RequestToken};
use crate::analysis::{CorrelationResultSet, PairRequest, ScatterData};
use crate::config::{CorrelationRequest, Side};

/// A finished API call, delivered back to the UI thread
#[derive(Debug)]
pub enum ApiEvent {
    Categories(ApiResult<Vec<String>>),
    Subcategories {
        side: Side,
        categories: Vec<String>,
        result: ApiResult<Vec<String>>,
    },
    Features {
        side: Side,
        categories: Vec<String>,
        subcategories: Vec<String>,
        result: ApiResult<Vec<String>>,
    },
    Correlations {
        token: RequestToken,
        result: ApiResult<CorrelationResultSet>,
    },
    PlotData {
        request: PairRequest,
        result: ApiResult<ScatterData>,
    },
    RowData {
        request: PairRequest,
        result: ApiResult<ScatterData>,
    },
}

/// Runs each API call on its own thread and queues the outcome for `poll`
pub struct ApiWorker {
    api: Arc<dyn CellLineApi>,
    sender: Sender<ApiEvent>,
    receiver: Receiver<ApiEvent>,
    repaint: Option<egui::Context>,
}

impl ApiWorker {
    pub fn new(api: Arc<dyn CellLineApi>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            api,
            sender,
            receiver,
            repaint: None,
        }
    }

    /// Wake the UI whenever an event arrives
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&dyn CellLineApi) -> ApiEvent + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        let repaint = self.repaint.clone();

        let spawned = thread::Builder::new()
            .name("api-request".to_string())
            .spawn(move || {
                let event = job(api.as_ref());
                // The receiver only goes away when the app is shutting down
                if sender.send(event).is_ok() {
                    if let Some(ctx) = repaint {
                        ctx.request_repaint();
                    }
                }
            });

        if let Err(e) = spawned {
            log::error!("Failed to start API request thread: {}", e);
        }
    }

    pub fn fetch_categories(&self) {
        self.spawn(|api| ApiEvent::Categories(api.categories()));
    }

    pub fn fetch_subcategories(&self, side: Side, categories: Vec<String>) {
        self.spawn(move |api| {
            let result = api.subcategories(&categories);
            ApiEvent::Subcategories { side, categories, result }
        });
    }

    pub fn fetch_features(&self, side: Side, categories: Vec<String>, subcategories: Vec<String>) {
        self.spawn(move |api| {
            let result = api.features(&categories, &subcategories);
            ApiEvent::Features { side, categories, subcategories, result }
        });
    }

    /// The token is checked before and after the call; a cancelled request
    /// reports `ApiError::Cancelled` whatever the server answered.
    pub fn fetch_correlations(&self, token: RequestToken, request: CorrelationRequest) {
        self.spawn(move |api| {
            let result = if token.is_cancelled() {
                Err(ApiError::Cancelled)
            } else {
                match api.correlations(&request) {
                    _ if token.is_cancelled() => Err(ApiError::Cancelled),
                    result => result,
                }
            };
            ApiEvent::Correlations { token, result }
        });
    }

    pub fn fetch_plot_data(&self, request: PairRequest) {
        self.spawn(move |api| {
            let result = api.scatter(&request);
            ApiEvent::PlotData { request, result }
        });
    }

    pub fn fetch_row_data(&self, request: PairRequest) {
        self.spawn(move |api| {
            let result = api.scatter(&request);
            ApiEvent::RowData { request, result }
        });
    }

    /// Every event that has arrived since the last poll
    pub fn poll(&self) -> Vec<ApiEvent> {
        self.receiver.try_iter().collect()
    }

    #[cfg(test)]
    pub fn wait(&self, timeout: Duration) -> Option<ApiEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TestKind;
    use serde_json::json;
    use std::sync::Mutex;

    /// Signals when a correlation call starts, then holds it until released
    struct Gate {
        started: Sender<()>,
        release: Receiver<()>,
    }

    /// In-memory backend. Correlation calls wait on the gate when one is set.
    #[derive(Default)]
    struct FakeApi {
        correlations: Mutex<Vec<CorrelationResultSet>>,
        gate: Mutex<Option<Gate>>,
        scatter_rows: Mutex<Vec<serde_json::Value>>,
        fail_scatter: bool,
    }

    impl CellLineApi for FakeApi {
        fn categories(&self) -> ApiResult<Vec<String>> {
            Ok(vec!["Nuclear".into(), "Drug".into()])
        }

        fn subcategories(&self, categories: &[String]) -> ApiResult<Vec<String>> {
            Ok(categories.iter().map(|c| format!("{}-sub", c)).collect())
        }

        fn features(&self, _databases: &[String], subcategories: &[String]) -> ApiResult<Vec<String>> {
            Ok(subcategories.iter().map(|s| format!("{}_F1", s)).collect())
        }

        fn correlations(&self, _request: &CorrelationRequest) -> ApiResult<CorrelationResultSet> {
            if let Some(gate) = self.gate.lock().unwrap().as_ref() {
                gate.started.send(()).unwrap();
                gate.release.recv().unwrap();
            }
            let mut queued = self.correlations.lock().unwrap();
            if queued.is_empty() {
                Ok(CorrelationResultSet::default())
            } else {
                Ok(queued.remove(0))
            }
        }

        fn scatter(&self, _request: &PairRequest) -> ApiResult<ScatterData> {
            if self.fail_scatter {
                return Err(ApiError::Status { endpoint: "scatter/".into(), status: 500 });
            }
            let rows = self.scatter_rows.lock().unwrap().iter()
                .map(|v| v.as_object().cloned().unwrap())
                .collect();
            Ok(ScatterData { rows, ..Default::default() })
        }
    }

    fn request() -> CorrelationRequest {
        CorrelationRequest {
            feature1: "X".into(),
            feature2: vec!["Y".into()],
            database1: vec!["Nuclear".into()],
            database2: vec!["Nuclear".into()],
        }
    }

    const WAIT: Duration = Duration::from_secs(5);

    fn pair() -> PairRequest {
        PairRequest {
            feature1: "X".into(),
            feature2: "Y".into(),
            database1: "Nuclear".into(),
            database2: "Nuclear".into(),
            plot_type: TestKind::Spearman,
        }
    }

    #[test]
    fn delivers_option_lists() {
        let worker = ApiWorker::new(Arc::new(FakeApi::default()));
        worker.fetch_subcategories(Side::Secondary, vec!["Drug".into()]);
        match worker.wait(WAIT) {
            Some(ApiEvent::Subcategories { side, categories, result }) => {
                assert_eq!(side, Side::Secondary);
                assert_eq!(categories, vec!["Drug".to_string()]);
                assert_eq!(result.unwrap(), vec!["Drug-sub".to_string()]);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn cancelled_token_reports_cancellation() {
        let worker = ApiWorker::new(Arc::new(FakeApi::default()));
        let token = RequestToken::new();
        token.cancel();
        worker.fetch_correlations(token.clone(), request());
        match worker.wait(WAIT) {
            Some(ApiEvent::Correlations { token: got, result }) => {
                assert_eq!(got, token);
                assert!(result.unwrap_err().is_cancellation());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn live_token_delivers_results() {
        let api = FakeApi::default();
        let mut set = CorrelationResultSet::default();
        set.anova.push(json!({"anova_pvalue": 0.1}).as_object().cloned().unwrap());
        api.correlations.lock().unwrap().push(set.clone());

        let worker = ApiWorker::new(Arc::new(api));
        worker.fetch_correlations(RequestToken::new(), request());
        match worker.wait(WAIT) {
            Some(ApiEvent::Correlations { result, .. }) => assert_eq!(result.unwrap(), set),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn cancel_during_the_call_discards_the_answer() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let api = FakeApi::default();
        let mut set = CorrelationResultSet::default();
        set.spearman.push(json!({"spearman_pvalue": 0.1}).as_object().cloned().unwrap());
        api.correlations.lock().unwrap().push(set);
        *api.gate.lock().unwrap() = Some(Gate { started: started_tx, release: release_rx });

        let worker = ApiWorker::new(Arc::new(api));
        let token = RequestToken::new();
        worker.fetch_correlations(token.clone(), request());

        started_rx.recv_timeout(WAIT).unwrap();
        token.cancel();
        release_tx.send(()).unwrap();

        match worker.wait(WAIT) {
            Some(ApiEvent::Correlations { token: got, result }) => {
                assert_eq!(got, token);
                assert!(result.unwrap_err().is_cancellation());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn plot_and_row_requests_are_independent() {
        let api = FakeApi::default();
        api.scatter_rows.lock().unwrap().push(json!({"cell_lines": "ACH-000001", "X": 1.0, "Y": 2.0}));
        let worker = ApiWorker::new(Arc::new(api));
        worker.fetch_plot_data(pair());
        worker.fetch_row_data(pair());

        let mut plots = 0;
        let mut rows = 0;
        for _ in 0..2 {
            match worker.wait(WAIT) {
                Some(ApiEvent::PlotData { result, .. }) => {
                    assert_eq!(result.unwrap().rows.len(), 1);
                    plots += 1;
                }
                Some(ApiEvent::RowData { result, .. }) => {
                    assert_eq!(result.unwrap().rows[0]["cell_lines"], "ACH-000001");
                    rows += 1;
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!((plots, rows), (1, 1));
        assert!(worker.poll().is_empty());
    }

    #[test]
    fn scatter_failures_reach_both_consumers() {
        let api = FakeApi { fail_scatter: true, ..Default::default() };
        let worker = ApiWorker::new(Arc::new(api));
        worker.fetch_plot_data(pair());
        worker.fetch_row_data(pair());

        for _ in 0..2 {
            match worker.wait(WAIT) {
                Some(ApiEvent::PlotData { request, result }) | Some(ApiEvent::RowData { request, result }) => {
                    assert_eq!(request, pair());
                    assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }
}
