// src/api/client.rs
use anyhow::Context;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, CellLineApi};
use crate::analysis::results::CorrelationsResponse;
use crate::analysis::{CorrelationResultSet, PairRequest, ScatterData};
use crate::config::CorrelationRequest;

const CATEGORIES_PATH: &str = "features/categories";
const SUBCATEGORIES_PATH: &str = "features/subcategories/";
const FEATURES_PATH: &str = "features/";
const CORRELATIONS_PATH: &str = "correlations/";
const SCATTER_PATH: &str = "scatter/";

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SubcategoriesResponse {
    #[serde(default)]
    subcategories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FeatureEntry {
    name: String,
}

/// Blocking HTTP client for the backend rooted at `api_root`
#[derive(Debug, Clone)]
pub struct HttpApi {
    root: String,
    client: Client,
}

impl HttpApi {
    pub fn new(api_root: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cellline-explorer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let mut root = api_root.to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        Ok(Self { root, client })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    fn send<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> ApiResult<T> {
        log::debug!("Requesting {}", endpoint);
        let response = request.send().map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> ApiResult<T> {
        self.send(path, self.client.get(self.url(path)).query(params))
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(path, self.client.post(self.url(path)).json(body))
    }
}

/// One `(key, value)` pair per value, i.e. `key=a&key=b`
fn repeated<'a>(key: &'a str, values: &'a [String]) -> impl Iterator<Item = (&'a str, &'a str)> {
    values.iter().map(move |value| (key, value.as_str()))
}

impl CellLineApi for HttpApi {
    fn categories(&self) -> ApiResult<Vec<String>> {
        let response: CategoriesResponse = self.get(CATEGORIES_PATH, &[])?;
        Ok(response.categories)
    }

    fn subcategories(&self, categories: &[String]) -> ApiResult<Vec<String>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }
        let params: Vec<_> = repeated("categories", categories).collect();
        let response: SubcategoriesResponse = self.get(SUBCATEGORIES_PATH, &params)?;
        Ok(response.subcategories)
    }

    fn features(&self, databases: &[String], subcategories: &[String]) -> ApiResult<Vec<String>> {
        if databases.is_empty() || subcategories.is_empty() {
            return Ok(Vec::new());
        }
        let params: Vec<_> = repeated("databaseList", databases)
            .chain(repeated("subCategoryList", subcategories))
            .collect();
        let features: Vec<FeatureEntry> = self.get(FEATURES_PATH, &params)?;
        Ok(features.into_iter().map(|f| f.name).collect())
    }

    fn correlations(&self, request: &CorrelationRequest) -> ApiResult<CorrelationResultSet> {
        let response: CorrelationsResponse = self.post(CORRELATIONS_PATH, request)?;
        Ok(response.correlations)
    }

    fn scatter(&self, request: &PairRequest) -> ApiResult<ScatterData> {
        self.post(SCATTER_PATH, request)
    }
}
