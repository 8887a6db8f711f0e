// src/state/table_state.rs
use crate::analysis::results::ResultRow;
use crate::analysis::table::{derive_order, visible_len};
use crate::analysis::{MetricSchema, SortSpec, Thresholds};

/// Sort and paging state for the active tab, plus the derived row order.
/// The order is recomputed whenever one of its inputs changes, and every
/// recompute starts paging over.
#[derive(Debug, Clone)]
pub struct TableView {
    pub sort: Option<SortSpec>,
    increment: usize,
    visible_count: usize,
    order: Vec<usize>,
}

impl TableView {
    pub fn new(increment: usize) -> Self {
        let increment = increment.max(1);
        Self {
            sort: None,
            increment,
            visible_count: increment,
            order: Vec::new(),
        }
    }

    /// New rows or schema: default sort for the schema
    pub fn reset(&mut self, rows: &[ResultRow], schema: Option<&MetricSchema>, thresholds: &Thresholds) {
        self.sort = schema.map(SortSpec::default_for);
        self.recompute(rows, schema, thresholds);
    }

    pub fn sort_by(&mut self, key: &str, rows: &[ResultRow], schema: Option<&MetricSchema>, thresholds: &Thresholds) {
        self.sort = Some(SortSpec::clicked(self.sort.as_ref(), key));
        self.recompute(rows, schema, thresholds);
    }

    pub fn recompute(&mut self, rows: &[ResultRow], schema: Option<&MetricSchema>, thresholds: &Thresholds) {
        self.order = derive_order(rows, schema, thresholds, self.sort.as_ref());
        self.visible_count = self.increment;
    }

    pub fn load_more(&mut self) {
        if self.has_more() {
            self.visible_count += self.increment;
        }
    }

    /// Filtered and sorted row indices, all of them
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// The rendered prefix of `order`
    pub fn visible(&self) -> &[usize] {
        &self.order[..visible_len(self.order.len(), self.visible_count)]
    }

    pub fn has_more(&self) -> bool {
        self.visible_count < self.order.len()
    }
}
