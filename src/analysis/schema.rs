// src/analysis/schema.rs
use super::results::ResultRow;
use crate::config::TestKind;

const CORRELATION_SUFFIX: &str = "_correlation";
const P_VALUE_SUFFIX: &str = "pvalue";

/// Which fields of a result set carry its metrics. Resolved once per active
/// row set from the first row's keys; different tests name their fields
/// differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSchema {
    Spearman { correlation_field: String, p_value_field: String },
    Anova { p_value_field: String },
    ChiSquared { p_value_field: String },
}

impl MetricSchema {
    /// `None` is the "no results" state: no rows, or no usable metric fields
    pub fn resolve(kind: TestKind, rows: &[ResultRow]) -> Option<Self> {
        let first = rows.first()?;
        let p_value_field = first.keys()
            .find(|key| key.to_lowercase().ends_with(P_VALUE_SUFFIX))?
            .clone();

        match kind {
            TestKind::Spearman => {
                let correlation_field = first.keys()
                    .find(|key| key.ends_with(CORRELATION_SUFFIX))?
                    .clone();
                Some(MetricSchema::Spearman { correlation_field, p_value_field })
            }
            TestKind::Anova => Some(MetricSchema::Anova { p_value_field }),
            TestKind::ChiSquared => Some(MetricSchema::ChiSquared { p_value_field }),
        }
    }

    pub fn correlation_field(&self) -> Option<&str> {
        match self {
            MetricSchema::Spearman { correlation_field, .. } => Some(correlation_field),
            _ => None,
        }
    }

    pub fn p_value_field(&self) -> &str {
        match self {
            MetricSchema::Spearman { p_value_field, .. }
            | MetricSchema::Anova { p_value_field }
            | MetricSchema::ChiSquared { p_value_field } => p_value_field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<ResultRow> {
        value.as_array().unwrap().iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn empty_rows_have_no_schema() {
        assert_eq!(MetricSchema::resolve(TestKind::Spearman, &[]), None);
    }

    #[test]
    fn spearman_discovers_both_fields() {
        let r = rows(json!([{"feature_1": "A", "count": 5, "spearman_correlation": 0.8, "spearman_pvalue": 0.01}]));
        let schema = MetricSchema::resolve(TestKind::Spearman, &r).unwrap();
        assert_eq!(schema.correlation_field(), Some("spearman_correlation"));
        assert_eq!(schema.p_value_field(), "spearman_pvalue");
    }

    #[test]
    fn p_value_suffix_is_case_insensitive() {
        let r = rows(json!([{"count": 3, "Chisq_PValue": 0.2}]));
        let schema = MetricSchema::resolve(TestKind::ChiSquared, &r).unwrap();
        assert_eq!(schema.p_value_field(), "Chisq_PValue");
        assert_eq!(schema.correlation_field(), None);
    }

    #[test]
    fn anova_ignores_stray_correlation_field() {
        let r = rows(json!([{"x_correlation": 0.1, "anova_pvalue": 0.2}]));
        let schema = MetricSchema::resolve(TestKind::Anova, &r).unwrap();
        assert_eq!(schema, MetricSchema::Anova { p_value_field: "anova_pvalue".into() });
    }

    #[test]
    fn rows_without_metrics_resolve_to_empty_state() {
        let r = rows(json!([{"feature_1": "A", "count": 5}]));
        assert_eq!(MetricSchema::resolve(TestKind::Anova, &r), None);

        let no_corr = rows(json!([{"spearman_pvalue": 0.1}]));
        assert_eq!(MetricSchema::resolve(TestKind::Spearman, &no_corr), None);
    }
}
