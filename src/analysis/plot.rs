// src/analysis/plot.rs
use serde_json::Value;
use statrs::statistics::{Data, Max, Median, Min, OrderStatistics};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::results::{row_number, row_text, value_number, PairRequest, ResultRow, ScatterData, VariableKind};
use crate::config::constants::{cell_line_name, CELL_LINE_COLUMN};
use crate::config::TestKind;

/// Raw rows behind one plotted feature pair, plus the columns to plot.
/// Reshaped into chart series at render time.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub kind: TestKind,
    pub title: String,
    pub id_key: String,
    pub x_key: String,
    pub y_key: String,
    pub rows: Vec<ResultRow>,
    pub feature_types: BTreeMap<String, VariableKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    pub category: String,
    pub count: usize,
    pub stats: BoxStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    /// One count per entry of the chart's `categories`
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotData {
    Scatter {
        x_label: String,
        y_label: String,
        points: Vec<ScatterPoint>,
    },
    Box {
        category_label: String,
        value_label: String,
        groups: Vec<BoxGroup>,
    },
    Bar {
        category_label: String,
        series_label: String,
        categories: Vec<String>,
        series: Vec<BarSeries>,
    },
    Invalid {
        reason: String,
    },
}

impl PlotSeries {
    /// `None` when the response holds no rows or no plottable column
    pub fn from_data(request: &PairRequest, data: ScatterData) -> Option<Self> {
        let (id_key, x_key, y_key) = infer_columns(data.rows.first()?)?;
        Some(Self {
            kind: request.plot_type,
            title: format!("{} vs {}", request.feature1, request.feature2),
            id_key,
            x_key,
            y_key,
            rows: data.rows,
            feature_types: data.feature_types,
        })
    }

    /// Server metadata wins; otherwise any non-numeric value or fewer than
    /// `threshold` distinct values makes a variable categorical.
    pub fn variable_kind(&self, key: &str, threshold: usize) -> VariableKind {
        match self.feature_types.get(key) {
            Some(kind) if *kind != VariableKind::Unknown => return *kind,
            _ => {}
        }

        let values: Vec<&Value> = self.rows.iter()
            .filter_map(|row| row.get(key))
            .filter(|value| !value.is_null())
            .collect();

        if values.iter().any(|value| value_number(value).is_none()) {
            return VariableKind::Categorical;
        }

        let distinct: HashSet<String> = values.iter().map(|value| value.to_string()).collect();
        if distinct.len() < threshold {
            VariableKind::Categorical
        } else {
            VariableKind::Continuous
        }
    }

    pub fn reshape(&self, categorical_threshold: usize) -> PlotData {
        match self.kind {
            TestKind::Spearman => self.scatter(),
            TestKind::Anova => self.grouped_box(categorical_threshold),
            TestKind::ChiSquared => self.grouped_bar(),
        }
    }

    fn scatter(&self) -> PlotData {
        let points = self.rows.iter()
            .filter_map(|row| {
                let x = row_number(row, &self.x_key)?;
                let y = row_number(row, &self.y_key)?;
                Some(ScatterPoint { x, y, label: self.hover_label(row) })
            })
            .collect();

        PlotData::Scatter {
            x_label: self.x_key.clone(),
            y_label: self.y_key.clone(),
            points,
        }
    }

    fn hover_label(&self, row: &ResultRow) -> String {
        let id = row_text(row, CELL_LINE_COLUMN)
            .or_else(|| row_text(row, &self.id_key))
            .unwrap_or_default();
        match cell_line_name(&id) {
            Some(name) => format!("{} ({})", name, id),
            None => id,
        }
    }

    fn grouped_box(&self, threshold: usize) -> PlotData {
        let x_kind = self.variable_kind(&self.x_key, threshold);
        let y_kind = self.variable_kind(&self.y_key, threshold);

        let (category_key, value_key) = match (x_kind, y_kind) {
            (VariableKind::Categorical, VariableKind::Continuous) => (&self.x_key, &self.y_key),
            (VariableKind::Continuous, VariableKind::Categorical) => (&self.y_key, &self.x_key),
            _ => {
                return PlotData::Invalid {
                    reason: "A box plot needs exactly one categorical and one numeric variable".to_string(),
                };
            }
        };

        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in &self.rows {
            if let (Some(category), Some(value)) = (row_text(row, category_key), row_number(row, value_key)) {
                grouped.entry(category).or_default().push(value);
            }
        }

        let groups = grouped.into_iter()
            .map(|(category, values)| BoxGroup {
                category,
                count: values.len(),
                stats: box_stats(values),
            })
            .collect();

        PlotData::Box {
            category_label: category_key.clone(),
            value_label: value_key.clone(),
            groups,
        }
    }

    fn grouped_bar(&self) -> PlotData {
        let pairs: Vec<(String, String)> = self.rows.iter()
            .filter_map(|row| Some((row_text(row, &self.x_key)?, row_text(row, &self.y_key)?)))
            .collect();

        let categories: Vec<String> = pairs.iter()
            .map(|(c, _)| c.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let series_names: BTreeSet<String> = pairs.iter().map(|(_, s)| s.clone()).collect();

        let series = series_names.into_iter()
            .map(|name| {
                let counts = categories.iter()
                    .map(|category| pairs.iter().filter(|(c, s)| c == category && *s == name).count())
                    .collect();
                BarSeries { name, counts }
            })
            .collect();

        PlotData::Bar {
            category_label: self.x_key.clone(),
            series_label: self.y_key.clone(),
            categories,
            series,
        }
    }
}

/// First key is the sample identifier; the next two are the plotted
/// variables. A single variable is plotted against itself.
fn infer_columns(row: &ResultRow) -> Option<(String, String, String)> {
    let mut keys = row.keys();
    let id_key = keys.next()?.clone();
    let variables: Vec<&String> = keys.take(2).collect();
    match variables.as_slice() {
        [] => None,
        [only] => Some((id_key, (*only).clone(), (*only).clone())),
        [x, y, ..] => Some((id_key, (*x).clone(), (*y).clone())),
    }
}

fn box_stats(values: Vec<f64>) -> BoxStats {
    let mut data = Data::new(values);
    BoxStats {
        min: data.min(),
        lower_quartile: data.lower_quartile(),
        median: data.median(),
        upper_quartile: data.upper_quartile(),
        max: data.max(),
    }
}
