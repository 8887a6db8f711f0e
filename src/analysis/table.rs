// src/analysis/table.rs
use serde_json::Value;
use std::cmp::Ordering;

use super::results::{row_number, ResultRow};
use super::schema::MetricSchema;
use crate::config::Query;

/// Column used to break ties between rows with equal sort keys
pub const TIE_BREAK_COLUMN: &str = "feature_2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self { key: key.into(), direction }
    }

    /// Strongest correlation first when there is one, otherwise most significant first
    pub fn default_for(schema: &MetricSchema) -> Self {
        match schema.correlation_field() {
            Some(field) => SortSpec::new(field, SortDirection::Descending),
            None => SortSpec::new(schema.p_value_field(), SortDirection::Ascending),
        }
    }

    /// Header click: same column flips direction, a new column starts ascending
    pub fn clicked(current: Option<&SortSpec>, key: &str) -> SortSpec {
        match current {
            Some(spec) if spec.key == key => SortSpec::new(key, spec.direction.toggled()),
            _ => SortSpec::new(key, SortDirection::Ascending),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_correlation: f64,
    pub max_p_value: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_correlation: 0.0,
            max_p_value: 1.0,
        }
    }
}

impl Thresholds {
    pub fn from_query(query: &Query) -> Self {
        Self {
            min_correlation: query.min_correlation,
            max_p_value: query.max_p_value,
        }
    }
}

/// Row passes when its p-value is at most `max_p_value` and, for tests with a
/// correlation, `|correlation| >= min_correlation`.
pub fn passes(row: &ResultRow, schema: &MetricSchema, thresholds: &Thresholds) -> bool {
    let p_ok = row_number(row, schema.p_value_field())
        .map_or(false, |p| p <= thresholds.max_p_value);
    if !p_ok {
        return false;
    }

    match schema.correlation_field() {
        Some(field) => row_number(row, field)
            .map_or(thresholds.min_correlation <= 0.0, |c| c.abs() >= thresholds.min_correlation),
        None => true,
    }
}

/// Indices of the rows that pass the thresholds, in input order
pub fn filter_rows(rows: &[ResultRow], schema: Option<&MetricSchema>, thresholds: &Thresholds) -> Vec<usize> {
    let Some(schema) = schema else {
        return Vec::new();
    };
    rows.iter()
        .enumerate()
        .filter(|(_, row)| passes(row, schema, thresholds))
        .map(|(idx, _)| idx)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
    Missing,
}

fn sort_value(row: &ResultRow, key: &str, by_magnitude: bool) -> SortValue {
    match row.get(key) {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if by_magnitude => SortValue::Number(v.abs()),
            Some(v) => SortValue::Number(v),
            None => SortValue::Missing,
        },
        Some(Value::String(s)) => SortValue::Text(s.to_lowercase()),
        Some(Value::Bool(b)) => SortValue::Text(b.to_string()),
        _ => SortValue::Missing,
    }
}

/// Missing values always sort last regardless of direction
fn compare_values(a: &SortValue, b: &SortValue, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (SortValue::Missing, SortValue::Missing) => return Ordering::Equal,
        (SortValue::Missing, _) => return Ordering::Greater,
        (_, SortValue::Missing) => return Ordering::Less,
        (SortValue::Number(x), SortValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
        (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
        (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Stable sort of `indices` by `spec`. The correlation column ranks by
/// magnitude; ties fall back to `feature_2` ascending.
pub fn sort_indices(rows: &[ResultRow], indices: &mut [usize], spec: &SortSpec, schema: Option<&MetricSchema>) {
    let by_magnitude = schema
        .and_then(|s| s.correlation_field())
        .map_or(false, |field| field == spec.key);

    indices.sort_by(|&a, &b| {
        let primary = compare_values(
            &sort_value(&rows[a], &spec.key, by_magnitude),
            &sort_value(&rows[b], &spec.key, by_magnitude),
            spec.direction,
        );
        primary.then_with(|| compare_values(
            &sort_value(&rows[a], TIE_BREAK_COLUMN, false),
            &sort_value(&rows[b], TIE_BREAK_COLUMN, false),
            SortDirection::Ascending,
        ))
    });
}

/// filter -> sort, as row indices into `rows`
pub fn derive_order(
    rows: &[ResultRow],
    schema: Option<&MetricSchema>,
    thresholds: &Thresholds,
    sort: Option<&SortSpec>,
) -> Vec<usize> {
    let mut order = filter_rows(rows, schema, thresholds);
    if let Some(spec) = sort {
        sort_indices(rows, &mut order, spec, schema);
    }
    order
}

/// Number of rows to render out of `total`
pub fn visible_len(total: usize, visible_count: usize) -> usize {
    total.min(visible_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TestKind;
    use serde_json::json;

    fn rows(value: Value) -> Vec<ResultRow> {
        value.as_array().unwrap().iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn spearman_rows() -> Vec<ResultRow> {
        rows(json!([
            {"feature_2": "A", "count": 10, "spearman_correlation": 0.9, "spearman_pvalue": 0.001},
            {"feature_2": "B", "count": 12, "spearman_correlation": -0.6, "spearman_pvalue": 0.2},
            {"feature_2": "C", "count": 8, "spearman_correlation": 0.3, "spearman_pvalue": 0.04},
        ]))
    }

    fn spearman_schema(r: &[ResultRow]) -> MetricSchema {
        MetricSchema::resolve(TestKind::Spearman, r).unwrap()
    }

    #[test]
    fn permissive_thresholds_keep_every_row_with_a_p_value() {
        let mut r = spearman_rows();
        r.push(rows(json!([{"feature_2": "D", "count": 1, "spearman_correlation": 0.1}])).remove(0));
        let schema = spearman_schema(&r);
        let kept = filter_rows(&r, Some(&schema), &Thresholds::default());
        assert_eq!(kept, vec![0, 1, 2]);
    }

    #[test]
    fn correlation_threshold_uses_magnitude() {
        let r = spearman_rows();
        let schema = spearman_schema(&r);
        let thresholds = Thresholds { min_correlation: 0.5, max_p_value: 1.0 };
        assert_eq!(filter_rows(&r, Some(&schema), &thresholds), vec![0, 1]);
    }

    #[test]
    fn example_query_leaves_exactly_one_row() {
        let r = spearman_rows();
        let schema = spearman_schema(&r);
        let thresholds = Thresholds { min_correlation: 0.5, max_p_value: 0.05 };
        let sort = SortSpec::default_for(&schema);
        let order = derive_order(&r, Some(&schema), &thresholds, Some(&sort));
        assert_eq!(order, vec![0]);
    }

    #[test]
    fn no_schema_means_nothing_passes() {
        let r = spearman_rows();
        assert!(filter_rows(&r, None, &Thresholds::default()).is_empty());
    }

    #[test]
    fn missing_correlation_only_passes_a_zero_threshold() {
        let r = rows(json!([
            {"feature_2": "A", "spearman_correlation": 0.7, "spearman_pvalue": 0.01},
            {"feature_2": "B", "spearman_pvalue": 0.01},
        ]));
        let schema = spearman_schema(&r);
        assert_eq!(filter_rows(&r, Some(&schema), &Thresholds::default()), vec![0, 1]);
        let strict = Thresholds { min_correlation: 0.2, max_p_value: 1.0 };
        assert_eq!(filter_rows(&r, Some(&schema), &strict), vec![0]);
    }

    #[test]
    fn anova_filters_on_p_value_only() {
        let r = rows(json!([
            {"feature_2": "A", "anova_pvalue": 0.01},
            {"feature_2": "B", "anova_pvalue": 0.5},
        ]));
        let schema = MetricSchema::resolve(TestKind::Anova, &r).unwrap();
        let thresholds = Thresholds { min_correlation: 0.9, max_p_value: 0.05 };
        assert_eq!(filter_rows(&r, Some(&schema), &thresholds), vec![0]);
    }

    #[test]
    fn descending_correlation_ranks_by_strength() {
        let r = rows(json!([
            {"feature_2": "pos", "spearman_correlation": 0.5, "spearman_pvalue": 0.01},
            {"feature_2": "neg", "spearman_correlation": -0.9, "spearman_pvalue": 0.01},
        ]));
        let schema = spearman_schema(&r);
        let mut order = vec![0, 1];
        sort_indices(&r, &mut order, &SortSpec::default_for(&schema), Some(&schema));
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn non_correlation_numbers_keep_their_sign() {
        let r = rows(json!([
            {"feature_2": "a", "count": -5},
            {"feature_2": "b", "count": 2},
        ]));
        let mut order = vec![0, 1];
        sort_indices(&r, &mut order, &SortSpec::new("count", SortDirection::Descending), None);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn text_sorts_case_insensitively() {
        let r = rows(json!([
            {"feature_2": "beta"},
            {"feature_2": "Alpha"},
            {"feature_2": "gamma"},
        ]));
        let mut order = vec![0, 1, 2];
        sort_indices(&r, &mut order, &SortSpec::new("feature_2", SortDirection::Ascending), None);
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn ties_break_on_feature_2() {
        let r = rows(json!([
            {"feature_2": "zeta", "count": 3},
            {"feature_2": "alpha", "count": 3},
            {"feature_2": "mid", "count": 1},
        ]));
        let mut order = vec![0, 1, 2];
        sort_indices(&r, &mut order, &SortSpec::new("count", SortDirection::Descending), None);
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn missing_values_sort_last_in_both_directions() {
        let r = rows(json!([
            {"feature_2": "a"},
            {"feature_2": "b", "count": 1},
            {"feature_2": "c", "count": 2},
        ]));
        let mut asc = vec![0, 1, 2];
        sort_indices(&r, &mut asc, &SortSpec::new("count", SortDirection::Ascending), None);
        assert_eq!(asc, vec![1, 2, 0]);
        let mut desc = vec![0, 1, 2];
        sort_indices(&r, &mut desc, &SortSpec::new("count", SortDirection::Descending), None);
        assert_eq!(desc, vec![2, 1, 0]);
    }

    #[test]
    fn header_clicks_toggle_or_reset() {
        let current = SortSpec::new("count", SortDirection::Ascending);
        assert_eq!(SortSpec::clicked(Some(&current), "count").direction, SortDirection::Descending);

        let flipped = SortSpec::new("count", SortDirection::Descending);
        assert_eq!(SortSpec::clicked(Some(&flipped), "count").direction, SortDirection::Ascending);

        let other = SortSpec::clicked(Some(&flipped), "feature_2");
        assert_eq!(other, SortSpec::new("feature_2", SortDirection::Ascending));
    }

    #[test]
    fn default_sort_depends_on_schema() {
        let spearman = MetricSchema::Spearman {
            correlation_field: "spearman_correlation".into(),
            p_value_field: "spearman_pvalue".into(),
        };
        assert_eq!(SortSpec::default_for(&spearman), SortSpec::new("spearman_correlation", SortDirection::Descending));

        let anova = MetricSchema::Anova { p_value_field: "anova_pvalue".into() };
        assert_eq!(SortSpec::default_for(&anova), SortSpec::new("anova_pvalue", SortDirection::Ascending));
    }

    #[test]
    fn visible_len_caps_at_total() {
        assert_eq!(visible_len(30, 100), 30);
        assert_eq!(visible_len(250, 100), 100);
    }
}
