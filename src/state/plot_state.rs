// src/state/plot_state.rs
use crate::analysis::{PairRequest, PlotData, PlotSeries, ScatterData};

/// A plot on screen: the raw series and its reshaped chart data
#[derive(Debug, Clone)]
pub struct ActivePlot {
    pub series: PlotSeries,
    pub data: PlotData,
}

#[derive(Debug, Clone, Default)]
pub struct PlotState {
    pub requested: Option<PairRequest>,
    pub active: Option<ActivePlot>,
}

impl PlotState {
    pub fn request(&mut self, request: PairRequest) {
        self.requested = Some(request);
    }

    /// Replaces whatever is shown. `None` when the response has nothing plottable.
    pub fn show(&mut self, request: &PairRequest, data: ScatterData, categorical_threshold: usize) -> Option<&ActivePlot> {
        if self.requested.as_ref() == Some(request) {
            self.requested = None;
        }
        let series = PlotSeries::from_data(request, data)?;
        let data = series.reshape(categorical_threshold);
        self.active = Some(ActivePlot { series, data });
        self.active.as_ref()
    }

    pub fn failed(&mut self, request: &PairRequest) {
        if self.requested.as_ref() == Some(request) {
            self.requested = None;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.requested.is_some()
    }

    /// Nothing is retained once the plot is closed
    pub fn close(&mut self) {
        self.requested = None;
        self.active = None;
    }
}
