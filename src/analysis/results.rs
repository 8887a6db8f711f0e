// src/analysis/results.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::TestKind;

/// One flat record from the backend. Field order is the server's order.
pub type ResultRow = serde_json::Map<String, Value>;

/// All three result sets produced by a single correlations response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CorrelationResultSet {
    #[serde(default)]
    pub spearman: Vec<ResultRow>,
    #[serde(default)]
    pub anova: Vec<ResultRow>,
    #[serde(default)]
    pub chisquared: Vec<ResultRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationsResponse {
    #[serde(default)]
    pub correlations: CorrelationResultSet,
}

impl CorrelationResultSet {
    pub fn rows(&self, kind: TestKind) -> &[ResultRow] {
        match kind {
            TestKind::Spearman => &self.spearman,
            TestKind::Anova => &self.anova,
            TestKind::ChiSquared => &self.chisquared,
        }
    }

    /// First tab in priority order that has rows, spearman when all are empty
    pub fn default_tab(&self) -> TestKind {
        TestKind::ALL.into_iter()
            .find(|kind| !self.rows(*kind).is_empty())
            .unwrap_or(TestKind::Spearman)
    }

    pub fn total_rows(&self) -> usize {
        TestKind::ALL.iter().map(|kind| self.rows(*kind).len()).sum()
    }
}

/// How the server classifies a plotted variable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Categorical,
    #[serde(alias = "numeric", alias = "numerical")]
    Continuous,
    #[serde(other)]
    Unknown,
}

/// Body of `POST scatter/`: the raw values behind one result row
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScatterData {
    #[serde(default, rename = "scatter_data")]
    pub rows: Vec<ResultRow>,
    #[serde(default)]
    pub feature_types: BTreeMap<String, VariableKind>,
}

/// Request for the raw data of one feature pair
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PairRequest {
    pub feature1: String,
    pub feature2: String,
    pub database1: String,
    pub database2: String,
    pub plot_type: TestKind,
}

impl PairRequest {
    pub fn from_row(row: &ResultRow, kind: TestKind) -> Option<Self> {
        Some(Self {
            feature1: row_text(row, "feature_1")?,
            feature2: row_text(row, "feature_2")?,
            database1: row_text(row, "database_1")?,
            database2: row_text(row, "database_2")?,
            plot_type: kind,
        })
    }
}

/// Field as text; numbers and booleans are rendered, null and nested values are not
pub fn row_text(row: &ResultRow, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Field as a number; numeric strings are accepted
pub fn row_number(row: &ResultRow, key: &str) -> Option<f64> {
    value_number(row.get(key)?)
}

pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
