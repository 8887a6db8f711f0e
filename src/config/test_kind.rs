// src/config/test_kind.rs
use serde::{Serialize, Deserialize};

/// Statistical test a result set was produced by. The serialized form is the
/// exact key the correlations endpoint uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Spearman,
    Anova,
    #[serde(rename = "chisquared")]
    ChiSquared,
}

impl Default for TestKind {
    fn default() -> Self {
        TestKind::Spearman
    }
}

impl TestKind {
    /// Tab priority order
    pub const ALL: [TestKind; 3] = [TestKind::Spearman, TestKind::Anova, TestKind::ChiSquared];

    pub fn key(&self) -> &'static str {
        match self {
            TestKind::Spearman => "spearman",
            TestKind::Anova => "anova",
            TestKind::ChiSquared => "chisquared",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TestKind::Spearman => "Spearman",
            TestKind::Anova => "ANOVA",
            TestKind::ChiSquared => "Chi-Square",
        }
    }

    pub fn plot_label(&self) -> &'static str {
        match self {
            TestKind::Spearman => "View Scatterplot",
            TestKind::Anova => "View Boxplot",
            TestKind::ChiSquared => "View Barplot",
        }
    }
}
