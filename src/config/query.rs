// src/config/query.rs
use serde::{Deserialize, Deserializer, Serialize};

/// Which of the two query features a selection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Primary,
    Secondary,
}

/// A submitted correlation query. Built once by the query form and never
/// edited afterwards; a changed query is a new value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub feature1: String,
    #[serde(deserialize_with = "one_or_many")]
    pub feature2: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub database1: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub database2: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub subcategory1: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub subcategory2: Vec<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub min_correlation: f64,
    #[serde(default = "default_max_p_value", deserialize_with = "lenient_number_or_one")]
    pub max_p_value: f64,
}

fn default_max_p_value() -> f64 {
    1.0
}

/// Body of `POST correlations/`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorrelationRequest {
    pub feature1: String,
    pub feature2: Vec<String>,
    pub database1: Vec<String>,
    pub database2: Vec<String>,
}

impl Query {
    pub fn new(
        feature1: impl Into<String>,
        feature2: Vec<String>,
        database1: Vec<String>,
        database2: Vec<String>,
        subcategory1: Vec<String>,
        subcategory2: Vec<String>,
        min_correlation: f64,
        max_p_value: f64,
    ) -> Self {
        Self {
            feature1: feature1.into(),
            feature2,
            database1,
            database2,
            subcategory1,
            subcategory2,
            min_correlation,
            max_p_value,
        }
        .normalized()
    }

    /// Drops duplicate set members (first occurrence wins) and clamps the
    /// thresholds into their valid ranges.
    pub fn normalized(mut self) -> Self {
        dedup_in_place(&mut self.feature2);
        dedup_in_place(&mut self.database1);
        dedup_in_place(&mut self.database2);
        dedup_in_place(&mut self.subcategory1);
        dedup_in_place(&mut self.subcategory2);
        self.min_correlation = clamp_or(self.min_correlation, -1.0, 1.0, 0.0);
        self.max_p_value = clamp_or(self.max_p_value, 0.0, 1.0, 1.0);
        self
    }

    /// Every selection populated
    pub fn is_submittable(&self) -> bool {
        !self.database1.is_empty()
            && !self.subcategory1.is_empty()
            && !self.feature1.is_empty()
            && !self.database2.is_empty()
            && !self.subcategory2.is_empty()
            && !self.feature2.is_empty()
    }

    pub fn to_request(&self) -> CorrelationRequest {
        CorrelationRequest {
            feature1: self.feature1.clone(),
            feature2: self.feature2.clone(),
            database1: self.database1.clone(),
            database2: self.database2.clone(),
        }
    }

    /// Short label used by the history list, e.g. `X vs [A, B, C, ... (+2)]`
    pub fn summary(&self) -> String {
        const MAX_TO_SHOW: usize = 3;
        let shown = self.feature2.iter()
            .take(MAX_TO_SHOW)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if self.feature2.len() > MAX_TO_SHOW {
            format!("{} vs [{}, ... (+{})]", self.feature1, shown, self.feature2.len() - MAX_TO_SHOW)
        } else {
            format!("{} vs [{}]", self.feature1, shown)
        }
    }
}

fn dedup_in_place(values: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
    Nothing(()),
}

/// Older history entries stored single selections as a bare string
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) if value.is_empty() => Vec::new(),
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
    Nothing(()),
}

fn parse_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LenientNumber::deserialize(deserializer)? {
        LenientNumber::Number(n) => Some(n),
        LenientNumber::Text(s) => s.trim().parse().ok(),
        LenientNumber::Nothing(()) => None,
    })
}

/// Thresholds were historically stored as form strings
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_lenient(deserializer)?.unwrap_or(0.0))
}

fn lenient_number_or_one<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_lenient(deserializer)?.unwrap_or(1.0))
}
