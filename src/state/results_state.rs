// src/state/results_state.rs
use crate::analysis::results::{row_text, ResultRow};
use crate::analysis::{CorrelationResultSet, MetricSchema, Thresholds};
use crate::config::{Query, TestKind};
use crate::state::table_state::TableView;

/// A response together with the query it answered
#[derive(Debug, Clone)]
pub struct CommittedResults {
    pub query: Query,
    pub set: CorrelationResultSet,
}

/// The committed result set and everything derived from it for display
#[derive(Debug, Clone)]
pub struct ResultsState {
    committed: Option<CommittedResults>,
    selected_tab: TestKind,
    schema: Option<MetricSchema>,
    pub table: TableView,
    /// `feature_2` value of the row to draw highlighted
    pub highlighted: Option<String>,
}

impl ResultsState {
    pub fn new(increment: usize) -> Self {
        Self {
            committed: None,
            selected_tab: TestKind::default(),
            schema: None,
            table: TableView::new(increment),
            highlighted: None,
        }
    }

    /// Replace everything with a fresh response; the first non-empty tab is selected
    pub fn commit(&mut self, query: Query, set: CorrelationResultSet, highlighted: Option<String>) {
        self.selected_tab = set.default_tab();
        self.committed = Some(CommittedResults { query, set });
        self.highlighted = highlighted;
        self.refresh();
    }

    pub fn select_tab(&mut self, kind: TestKind) {
        if self.selected_tab != kind {
            self.selected_tab = kind;
            self.refresh();
        }
    }

    pub fn sort_by(&mut self, key: &str) {
        let thresholds = self.thresholds();
        let rows = self.committed.as_ref()
            .map(|c| c.set.rows(self.selected_tab))
            .unwrap_or_default();
        self.table.sort_by(key, rows, self.schema.as_ref(), &thresholds);
    }

    fn refresh(&mut self) {
        let thresholds = self.thresholds();
        let rows = self.committed.as_ref()
            .map(|c| c.set.rows(self.selected_tab))
            .unwrap_or_default();
        self.schema = MetricSchema::resolve(self.selected_tab, rows);
        self.table.reset(rows, self.schema.as_ref(), &thresholds);
    }

    pub fn committed(&self) -> Option<&CommittedResults> {
        self.committed.as_ref()
    }

    pub fn query(&self) -> Option<&Query> {
        self.committed.as_ref().map(|c| &c.query)
    }

    pub fn selected_tab(&self) -> TestKind {
        self.selected_tab
    }

    pub fn schema(&self) -> Option<&MetricSchema> {
        self.schema.as_ref()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.query().map(Thresholds::from_query).unwrap_or_default()
    }

    pub fn active_rows(&self) -> &[ResultRow] {
        self.committed.as_ref()
            .map(|c| c.set.rows(self.selected_tab))
            .unwrap_or_default()
    }

    pub fn tab_len(&self, kind: TestKind) -> usize {
        self.committed.as_ref().map_or(0, |c| c.set.rows(kind).len())
    }

    /// Rows to render, in display order
    pub fn visible_rows(&self) -> impl Iterator<Item = &ResultRow> + '_ {
        let rows = self.active_rows();
        self.table.visible().iter().map(move |&idx| &rows[idx])
    }

    /// Every filtered row in display order, paging ignored
    pub fn ordered_rows(&self) -> impl Iterator<Item = &ResultRow> + '_ {
        let rows = self.active_rows();
        self.table.order().iter().map(move |&idx| &rows[idx])
    }

    pub fn is_highlighted(&self, row: &ResultRow) -> bool {
        match (&self.highlighted, row_text(row, "feature_2")) {
            (Some(highlighted), Some(feature)) => *highlighted == feature,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rows(value: Value) -> Vec<ResultRow> {
        value.as_array().unwrap().iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn query(min_correlation: f64, max_p_value: f64) -> Query {
        Query::new(
            "X",
            vec!["Y".into(), "Z".into()],
            vec!["Nuclear".into()],
            vec!["Nuclear".into()],
            vec!["A".into()],
            vec!["B".into()],
            min_correlation,
            max_p_value,
        )
    }

    #[test]
    fn thresholds_come_from_the_committed_query() {
        let mut results = ResultsState::new(100);
        assert_eq!(results.thresholds(), Thresholds::default());

        let set = CorrelationResultSet {
            spearman: rows(json!([
                {"feature_2": "a", "spearman_correlation": 0.9, "spearman_pvalue": 0.001},
                {"feature_2": "b", "spearman_correlation": -0.6, "spearman_pvalue": 0.2},
                {"feature_2": "c", "spearman_correlation": 0.3, "spearman_pvalue": 0.04},
            ])),
            ..Default::default()
        };
        results.commit(query(0.5, 0.05), set, None);

        let visible: Vec<&ResultRow> = results.visible_rows().collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0]["feature_2"], "a");
    }

    #[test]
    fn commit_selects_first_populated_tab() {
        let mut results = ResultsState::new(100);
        let set = CorrelationResultSet {
            chisquared: rows(json!([{"feature_2": "a", "chisq_pvalue": 0.01}])),
            ..Default::default()
        };
        results.commit(query(0.0, 1.0), set, None);

        assert_eq!(results.selected_tab(), TestKind::ChiSquared);
        assert_eq!(results.schema().unwrap().p_value_field(), "chisq_pvalue");
        assert_eq!(results.ordered_rows().count(), 1);
    }

    #[test]
    fn switching_to_an_empty_tab_is_the_empty_state() {
        let mut results = ResultsState::new(100);
        let set = CorrelationResultSet {
            spearman: rows(json!([{"spearman_correlation": 0.5, "spearman_pvalue": 0.01}])),
            ..Default::default()
        };
        results.commit(query(0.0, 1.0), set, None);
        results.select_tab(TestKind::Anova);

        assert!(results.schema().is_none());
        assert_eq!(results.visible_rows().count(), 0);
        assert_eq!(results.tab_len(TestKind::Spearman), 1);
    }

    #[test]
    fn highlight_matches_feature_2() {
        let mut results = ResultsState::new(100);
        let set = CorrelationResultSet {
            anova: rows(json!([
                {"feature_2": "prev", "anova_pvalue": 0.01},
                {"feature_2": "other", "anova_pvalue": 0.02},
            ])),
            ..Default::default()
        };
        results.commit(query(0.0, 1.0), set, Some("prev".into()));

        let flags: Vec<bool> = results.visible_rows().map(|row| results.is_highlighted(row)).collect();
        assert_eq!(flags, vec![true, false]);
    }
}
