// src/analysis/mod.rs
pub mod format;
pub mod plot;
pub mod results;
pub mod schema;
pub mod table;

// Re-export commonly used types
pub use plot::{PlotData, PlotSeries};
pub use results::{
    CorrelationResultSet,
    PairRequest,
    ResultRow,
    ScatterData,
};
pub use schema::MetricSchema;
pub use table::{SortDirection, SortSpec, Thresholds};
