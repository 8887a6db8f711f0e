// src/state/query_state.rs
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::constants::DEFAULT_CATEGORY;
use crate::config::{Query, Side};

/// A multi-select whose contents drive a follow-up option fetch when it closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dropdown {
    Category(Side),
    Subcategory(Side),
}

/// Selections for one of the two query features
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideSelection {
    pub categories: Vec<String>,
    pub subcategories: Vec<String>,
    pub features: Vec<String>,
    pub subcategory_options: Vec<String>,
    pub feature_options: Vec<String>,
}

impl SideSelection {
    fn clear_below_categories(&mut self) {
        self.subcategories.clear();
        self.subcategory_options.clear();
        self.clear_below_subcategories();
    }

    fn clear_below_subcategories(&mut self) {
        self.features.clear();
        self.feature_options.clear();
    }
}

/// Option fetch the form wants issued
#[derive(Debug, Clone, PartialEq)]
pub enum OptionRequest {
    Subcategories {
        side: Side,
        categories: Vec<String>,
    },
    Features {
        side: Side,
        categories: Vec<String>,
        subcategories: Vec<String>,
    },
}

/// What each open dropdown held when it opened. Menus can hand over to one
/// another within a frame, so every dropdown keeps its own snapshot.
#[derive(Debug, Clone, Default)]
struct DropdownWatch {
    open: HashMap<Dropdown, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct QueryForm {
    pub category_options: Vec<String>,
    pub primary: SideSelection,
    pub secondary: SideSelection,
    pub min_correlation: f64,
    pub max_p_value: f64,
    watch: DropdownWatch,
}

impl Default for QueryForm {
    fn default() -> Self {
        Self {
            category_options: vec![DEFAULT_CATEGORY.to_string()],
            primary: SideSelection::default(),
            secondary: SideSelection::default(),
            min_correlation: 0.0,
            max_p_value: 1.0,
            watch: DropdownWatch::default(),
        }
    }
}

impl QueryForm {
    pub fn side(&self, side: Side) -> &SideSelection {
        match side {
            Side::Primary => &self.primary,
            Side::Secondary => &self.secondary,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideSelection {
        match side {
            Side::Primary => &mut self.primary,
            Side::Secondary => &mut self.secondary,
        }
    }

    fn selection(&self, dropdown: Dropdown) -> &[String] {
        match dropdown {
            Dropdown::Category(side) => &self.side(side).categories,
            Dropdown::Subcategory(side) => &self.side(side).subcategories,
        }
    }

    /// Any category change drops every dependent selection and option list
    pub fn set_categories(&mut self, side: Side, categories: Vec<String>) {
        let selection = self.side_mut(side);
        selection.categories = categories;
        selection.clear_below_categories();
    }

    pub fn set_subcategories(&mut self, side: Side, subcategories: Vec<String>) {
        let selection = self.side_mut(side);
        selection.subcategories = subcategories;
        selection.clear_below_subcategories();
    }

    /// The primary side holds a single feature; the last one given wins
    pub fn set_features(&mut self, side: Side, mut features: Vec<String>) {
        if side == Side::Primary && features.len() > 1 {
            features = features.split_off(features.len() - 1);
        }
        self.side_mut(side).features = features;
    }

    pub fn set_min_correlation(&mut self, value: f64) {
        self.min_correlation = value.clamp(-1.0, 1.0);
    }

    pub fn set_max_p_value(&mut self, value: f64) {
        self.max_p_value = value.clamp(0.0, 1.0);
    }

    pub fn is_open(&self, dropdown: Dropdown) -> bool {
        self.watch.open.contains_key(&dropdown)
    }

    pub fn dropdown_opened(&mut self, dropdown: Dropdown) {
        let snapshot = self.selection(dropdown).to_vec();
        self.watch.open.insert(dropdown, snapshot);
    }

    /// Option list fed by `dropdown`'s selection
    fn dependent_options(&self, dropdown: Dropdown) -> &[String] {
        match dropdown {
            Dropdown::Category(side) => &self.side(side).subcategory_options,
            Dropdown::Subcategory(side) => &self.side(side).feature_options,
        }
    }

    /// Fetch to issue when `dropdown` closes with a selection different from
    /// the one it opened with, or with its dependent options emptied by an
    /// edit in between
    pub fn dropdown_closed(&mut self, dropdown: Dropdown) -> Option<OptionRequest> {
        let before = self.watch.open.remove(&dropdown)?;
        let unchanged = before.as_slice() == self.selection(dropdown);
        if unchanged && !self.dependent_options(dropdown).is_empty() {
            return None;
        }

        match dropdown {
            Dropdown::Category(side) => self.subcategory_request(side),
            Dropdown::Subcategory(side) => self.feature_request(side),
        }
    }

    fn subcategory_request(&self, side: Side) -> Option<OptionRequest> {
        let selection = self.side(side);
        if selection.categories.is_empty() {
            return None;
        }
        Some(OptionRequest::Subcategories {
            side,
            categories: selection.categories.clone(),
        })
    }

    fn feature_request(&self, side: Side) -> Option<OptionRequest> {
        let selection = self.side(side);
        if selection.categories.is_empty() || selection.subcategories.is_empty() {
            return None;
        }
        Some(OptionRequest::Features {
            side,
            categories: selection.categories.clone(),
            subcategories: selection.subcategories.clone(),
        })
    }

    /// An empty or failed category list keeps the current options
    pub fn apply_categories(&mut self, categories: Vec<String>) {
        if !categories.is_empty() {
            self.category_options = categories;
        }
    }

    /// Ignored unless `categories` is still the side's selection
    pub fn apply_subcategory_options(&mut self, side: Side, categories: &[String], options: Vec<String>) -> bool {
        let selection = self.side_mut(side);
        if selection.categories != categories {
            return false;
        }
        selection.subcategory_options = sort_subcategories(options);
        true
    }

    /// Ignored unless both parent selections are unchanged since the request
    pub fn apply_feature_options(
        &mut self,
        side: Side,
        categories: &[String],
        subcategories: &[String],
        options: Vec<String>,
    ) -> bool {
        let selection = self.side_mut(side);
        if selection.categories != categories || selection.subcategories != subcategories {
            return false;
        }
        selection.feature_options = sort_features(options);
        true
    }

    /// Load a stored query into the form, returning the option fetches that
    /// its selections need
    pub fn prefill(&mut self, query: &Query) -> Vec<OptionRequest> {
        self.primary = SideSelection {
            categories: query.database1.clone(),
            subcategories: query.subcategory1.clone(),
            features: vec![query.feature1.clone()],
            ..Default::default()
        };
        self.secondary = SideSelection {
            categories: query.database2.clone(),
            subcategories: query.subcategory2.clone(),
            features: query.feature2.clone(),
            ..Default::default()
        };
        self.min_correlation = query.min_correlation;
        self.max_p_value = query.max_p_value;
        self.watch = DropdownWatch::default();

        [Side::Primary, Side::Secondary]
            .into_iter()
            .flat_map(|side| [self.subcategory_request(side), self.feature_request(side)])
            .flatten()
            .collect()
    }

    /// The normalized query, when every selection is populated
    pub fn to_query(&self) -> Option<Query> {
        let query = Query::new(
            self.primary.features.first().cloned().unwrap_or_default(),
            self.secondary.features.clone(),
            self.primary.categories.clone(),
            self.secondary.categories.clone(),
            self.primary.subcategories.clone(),
            self.secondary.subcategories.clone(),
            self.min_correlation,
            self.max_p_value,
        );
        query.is_submittable().then_some(query)
    }

    pub fn can_submit(&self) -> bool {
        self.to_query().is_some()
    }
}

pub fn sort_subcategories(mut options: Vec<String>) -> Vec<String> {
    options.sort();
    options
}

/// `<name>_F<n>` with a one or two digit `n`
fn feature_rank(name: &str) -> Option<u32> {
    let (_, digits) = name.rsplit_once("_F")?;
    if (1..=2).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Ranked `_F<n>` features first by `n`, then the rest by name
pub fn sort_features(mut options: Vec<String>) -> Vec<String> {
    options.sort_by(|a, b| match (feature_rank(a), feature_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    });
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn filled_form() -> QueryForm {
        let mut form = QueryForm::default();
        form.set_categories(Side::Primary, strings(&["Nuclear"]));
        form.set_subcategories(Side::Primary, strings(&["Histone"]));
        form.set_features(Side::Primary, strings(&["X"]));
        form.set_categories(Side::Secondary, strings(&["Nuclear"]));
        form.set_subcategories(Side::Secondary, strings(&["Histone"]));
        form.set_features(Side::Secondary, strings(&["Y", "Z"]));
        form
    }

    #[test]
    fn category_change_clears_dependents() {
        let mut form = filled_form();
        form.primary.subcategory_options = strings(&["Histone"]);
        form.primary.feature_options = strings(&["X"]);

        form.set_categories(Side::Primary, strings(&["Nuclear"]));

        assert!(form.primary.subcategories.is_empty());
        assert!(form.primary.features.is_empty());
        assert!(form.primary.subcategory_options.is_empty());
        assert!(form.primary.feature_options.is_empty());
        assert_eq!(form.secondary.features, strings(&["Y", "Z"]));
    }

    #[test]
    fn subcategory_change_clears_features_only() {
        let mut form = filled_form();
        form.set_subcategories(Side::Secondary, strings(&["Other"]));
        assert!(form.secondary.features.is_empty());
        assert_eq!(form.secondary.categories, strings(&["Nuclear"]));
    }

    #[test]
    fn every_field_is_required() {
        assert!(filled_form().can_submit());

        let clears: [fn(&mut QueryForm); 6] = [
            |f| f.primary.categories.clear(),
            |f| f.primary.subcategories.clear(),
            |f| f.primary.features.clear(),
            |f| f.secondary.categories.clear(),
            |f| f.secondary.subcategories.clear(),
            |f| f.secondary.features.clear(),
        ];
        for clear in clears {
            let mut form = filled_form();
            clear(&mut form);
            assert!(!form.can_submit());
        }
    }

    #[test]
    fn primary_feature_is_single_valued() {
        let mut form = QueryForm::default();
        form.set_features(Side::Primary, strings(&["A", "B"]));
        assert_eq!(form.primary.features, strings(&["B"]));
    }

    #[test]
    fn fetch_only_when_closed_with_a_change() {
        let mut form = QueryForm::default();
        let dropdown = Dropdown::Category(Side::Primary);

        form.dropdown_opened(dropdown);
        assert_eq!(form.dropdown_closed(dropdown), None);

        form.dropdown_opened(dropdown);
        form.set_categories(Side::Primary, strings(&["Nuclear"]));
        form.set_categories(Side::Primary, strings(&["Nuclear", "Drug"]));
        assert_eq!(
            form.dropdown_closed(dropdown),
            Some(OptionRequest::Subcategories {
                side: Side::Primary,
                categories: strings(&["Nuclear", "Drug"]),
            })
        );

        // Emptied selection has nothing to fetch
        form.dropdown_opened(dropdown);
        form.set_categories(Side::Primary, Vec::new());
        assert_eq!(form.dropdown_closed(dropdown), None);
    }

    #[test]
    fn untouched_dropdown_does_not_refetch() {
        let mut form = QueryForm::default();
        form.set_categories(Side::Primary, strings(&["Nuclear"]));
        form.apply_subcategory_options(Side::Primary, &strings(&["Nuclear"]), strings(&["Histone"]));

        let dropdown = Dropdown::Category(Side::Primary);
        form.dropdown_opened(dropdown);
        assert_eq!(form.dropdown_closed(dropdown), None);
        assert_eq!(form.primary.subcategory_options, strings(&["Histone"]));
    }

    #[test]
    fn recheck_of_same_category_refetches_cleared_options() {
        let mut form = QueryForm::default();
        form.set_categories(Side::Primary, strings(&["Nuclear"]));
        form.apply_subcategory_options(Side::Primary, &strings(&["Nuclear"]), strings(&["Histone"]));

        let dropdown = Dropdown::Category(Side::Primary);
        form.dropdown_opened(dropdown);
        form.set_categories(Side::Primary, Vec::new());
        form.set_categories(Side::Primary, strings(&["Nuclear"]));
        assert_eq!(
            form.dropdown_closed(dropdown),
            Some(OptionRequest::Subcategories {
                side: Side::Primary,
                categories: strings(&["Nuclear"]),
            })
        );
    }

    #[test]
    fn switching_menus_keeps_each_snapshot() {
        let mut form = QueryForm::default();
        let secondary = Dropdown::Category(Side::Secondary);
        let primary = Dropdown::Category(Side::Primary);

        form.dropdown_opened(secondary);
        form.set_categories(Side::Secondary, strings(&["Drug"]));
        form.dropdown_opened(primary);
        assert!(form.is_open(secondary));

        assert_eq!(
            form.dropdown_closed(secondary),
            Some(OptionRequest::Subcategories {
                side: Side::Secondary,
                categories: strings(&["Drug"]),
            })
        );
        assert!(!form.is_open(secondary));
        assert!(form.is_open(primary));
    }

    #[test]
    fn subcategory_close_requests_features() {
        let mut form = QueryForm::default();
        form.set_categories(Side::Secondary, strings(&["Drug"]));
        let dropdown = Dropdown::Subcategory(Side::Secondary);
        form.dropdown_opened(dropdown);
        form.set_subcategories(Side::Secondary, strings(&["Kinase"]));
        assert_eq!(
            form.dropdown_closed(dropdown),
            Some(OptionRequest::Features {
                side: Side::Secondary,
                categories: strings(&["Drug"]),
                subcategories: strings(&["Kinase"]),
            })
        );
    }

    #[test]
    fn stale_option_lists_are_dropped() {
        let mut form = QueryForm::default();
        form.set_categories(Side::Primary, strings(&["Drug"]));
        assert!(!form.apply_subcategory_options(Side::Primary, &strings(&["Nuclear"]), strings(&["a"])));
        assert!(form.primary.subcategory_options.is_empty());

        assert!(form.apply_subcategory_options(Side::Primary, &strings(&["Drug"]), strings(&["b", "a"])));
        assert_eq!(form.primary.subcategory_options, strings(&["a", "b"]));
    }

    #[test]
    fn category_list_falls_back_to_default() {
        let mut form = QueryForm::default();
        assert_eq!(form.category_options, strings(&[DEFAULT_CATEGORY]));
        form.apply_categories(Vec::new());
        assert_eq!(form.category_options, strings(&[DEFAULT_CATEGORY]));
        form.apply_categories(strings(&["Drug", "Nuclear"]));
        assert_eq!(form.category_options, strings(&["Drug", "Nuclear"]));
    }

    #[test]
    fn ranked_features_come_first() {
        let sorted = sort_features(strings(&["beta", "G_F10", "alpha", "G_F2", "H_F123", "A_F2"]));
        assert_eq!(sorted, strings(&["A_F2", "G_F2", "G_F10", "H_F123", "alpha", "beta"]));
    }

    #[test]
    fn prefill_restores_selections_and_requests_options() {
        let query = filled_form().to_query().unwrap();
        let mut form = QueryForm::default();
        let requests = form.prefill(&query);

        assert_eq!(form.to_query(), Some(query));
        assert_eq!(requests.len(), 4);
        assert!(requests.contains(&OptionRequest::Features {
            side: Side::Secondary,
            categories: strings(&["Nuclear"]),
            subcategories: strings(&["Histone"]),
        }));
    }
}
