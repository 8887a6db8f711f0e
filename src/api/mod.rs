// src/api/mod.rs
//! Client side of the cell line feature database REST API.
//!
//! `CellLineApi` is the seam between the application and the backend:
//! `HttpApi` talks to the real server, tests substitute their own
//! implementation. Calls are blocking and are run off the UI thread by
//! `ApiWorker`.

use thiserror::Error;

use crate::analysis::{CorrelationResultSet, PairRequest, ScatterData};
use crate::config::CorrelationRequest;

pub mod client;
pub mod token;
pub mod worker;

pub use client::HttpApi;
pub use token::RequestToken;
pub use worker::{ApiEvent, ApiWorker};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Superseded or abandoned by the user; not a failure
    #[error("request cancelled")]
    Cancelled,

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("could not decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },
}

impl ApiError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub trait CellLineApi: Send + Sync {
    fn categories(&self) -> ApiResult<Vec<String>>;
    fn subcategories(&self, categories: &[String]) -> ApiResult<Vec<String>>;
    fn features(&self, databases: &[String], subcategories: &[String]) -> ApiResult<Vec<String>>;
    fn correlations(&self, request: &CorrelationRequest) -> ApiResult<CorrelationResultSet>;
    fn scatter(&self, request: &PairRequest) -> ApiResult<ScatterData>;
}
