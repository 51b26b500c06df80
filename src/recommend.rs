//! Segment-to-product recommendation mapping.
//!
//! Once customers are segmented, each segment maps to a recommended product
//! through a [`RuleTable`]: a static lookup keyed by segment label. Lookup
//! misses are an expected condition, not an error — a label without a rule
//! (noise included) yields the [`Recommendation::unmatched`] sentinel, so a
//! freshly extended segmentation never crashes the recommendation stage.
//!
//! The table is process-wide configuration: callers may override the
//! built-in five entries at construction time, and the table is immutable
//! for the duration of a run.

use crate::cluster::Assignment;
use crate::error::{Error, Result};
use crate::features::{FeatureMatrix, Record};
use tracing::info;

/// One recommendation rule: the product offered to a segment and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRule {
    /// Product name.
    pub product: String,
    /// Product category, matched case-insensitively by filters.
    pub category: String,
    /// Textual justification shown alongside the product.
    pub reason: String,
}

impl RecommendationRule {
    /// Convenience constructor.
    pub fn new(
        product: impl Into<String>,
        category: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            category: category.into(),
            reason: reason.into(),
        }
    }
}

/// Lookup table from segment label to recommendation rule.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    entries: Vec<(i32, RecommendationRule)>,
}

impl RuleTable {
    /// An empty table; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in five-segment table used when the caller supplies none.
    pub fn builtin() -> Self {
        Self::empty()
            .with_rule(
                0,
                RecommendationRule::new(
                    "long-term savings",
                    "savings",
                    "stable balances with low activity favor a savings horizon",
                ),
            )
            .with_rule(
                1,
                RecommendationRule::new(
                    "micro business loan",
                    "credit",
                    "frequent transactions at modest balances suggest working capital needs",
                ),
            )
            .with_rule(
                2,
                RecommendationRule::new(
                    "mutual fund investment",
                    "investment",
                    "high balances with long engagement can carry market exposure",
                ),
            )
            .with_rule(
                3,
                RecommendationRule::new(
                    "term deposit",
                    "deposit",
                    "steady surplus funds fit a fixed-term commitment",
                ),
            )
            .with_rule(
                4,
                RecommendationRule::new(
                    "premium credit card",
                    "credit",
                    "high spend frequency benefits from card rewards",
                ),
            )
    }

    /// Add or replace the rule for `label`.
    pub fn with_rule(mut self, label: i32, rule: RecommendationRule) -> Self {
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = rule,
            None => self.entries.push((label, rule)),
        }
        self
    }

    /// Look up the rule for `label`.
    pub fn get(&self, label: i32) -> Option<&RecommendationRule> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, rule)| rule)
    }

    /// Number of configured rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A per-row recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// Matrix row index.
    pub row: usize,
    /// Segment label the row carried.
    pub label: i32,
    /// Recommended product, or the sentinel for unmapped labels.
    pub product: String,
    /// Product category.
    pub category: String,
    /// Justification.
    pub reason: String,
}

impl Recommendation {
    /// Sentinel product name for labels without a configured rule.
    pub const NONE_PRODUCT: &'static str = "no recommendation";
    /// Sentinel category for labels without a configured rule.
    pub const NONE_CATEGORY: &'static str = "none";

    fn matched(row: usize, label: i32, rule: &RecommendationRule) -> Self {
        Self {
            row,
            label,
            product: rule.product.clone(),
            category: rule.category.clone(),
            reason: rule.reason.clone(),
        }
    }

    /// The "no recommendation" triple for a label absent from the table.
    pub fn unmatched(row: usize, label: i32) -> Self {
        Self {
            row,
            label,
            product: Self::NONE_PRODUCT.into(),
            category: Self::NONE_CATEGORY.into(),
            reason: "no rule configured for this segment".into(),
        }
    }

    /// Whether this is the sentinel triple.
    pub fn is_unmatched(&self) -> bool {
        self.product == Self::NONE_PRODUCT
    }
}

/// Map every row of an assignment to its recommendation.
///
/// Labels absent from `rules` — noise among them — map to the sentinel
/// triple; this never fails.
pub fn recommend(assignment: &Assignment, rules: &RuleTable) -> Vec<Recommendation> {
    let recommendations: Vec<Recommendation> = assignment
        .labels()
        .iter()
        .enumerate()
        .map(|(row, &label)| match rules.get(label) {
            Some(rule) => Recommendation::matched(row, label, rule),
            None => Recommendation::unmatched(row, label),
        })
        .collect();
    info!(
        rows = recommendations.len(),
        unmatched = recommendations.iter().filter(|r| r.is_unmatched()).count(),
        "recommendations generated"
    );
    recommendations
}

/// Keep only recommendations whose category matches, case-insensitively.
///
/// An empty input is a precondition failure ([`Error::NotReady`]:
/// recommendations have not been computed), while a filter that matches
/// nothing is the recoverable [`Error::EmptyResult`].
pub fn filter_by_category<'a>(
    recommendations: &'a [Recommendation],
    category: &str,
) -> Result<Vec<&'a Recommendation>> {
    if recommendations.is_empty() {
        return Err(Error::NotReady("recommendations have not been generated"));
    }
    let matches: Vec<&Recommendation> = recommendations
        .iter()
        .filter(|r| r.category.eq_ignore_ascii_case(category))
        .collect();
    if matches.is_empty() {
        return Err(Error::EmptyResult(format!(
            "no recommendations in category '{category}'"
        )));
    }
    Ok(matches)
}

/// Project the segmentation and its recommendations back onto the caller's
/// records: each surviving source row gains a `segment` column and the
/// product/category/reason triple. The augmented rows are returned for an
/// external exporter; this crate writes no files.
pub fn augment(
    records: &[Record],
    matrix: &FeatureMatrix,
    assignment: &Assignment,
    recommendations: &[Recommendation],
) -> Result<Vec<Record>> {
    if assignment.len() != matrix.n_rows() {
        return Err(Error::DimensionMismatch {
            expected: matrix.n_rows(),
            found: assignment.len(),
        });
    }
    if recommendations.len() != matrix.n_rows() {
        return Err(Error::DimensionMismatch {
            expected: matrix.n_rows(),
            found: recommendations.len(),
        });
    }

    matrix
        .source_rows()
        .iter()
        .enumerate()
        .map(|(row, &source)| {
            let record = records.get(source).ok_or(Error::DimensionMismatch {
                expected: source + 1,
                found: records.len(),
            })?;
            let rec = &recommendations[row];
            Ok(record
                .clone()
                .with("segment", i64::from(assignment.label(row)))
                .with("product", rec.product.as_str())
                .with("category", rec.category.as_str())
                .with("reason", rec.reason.as_str()))
        })
        .collect()
}
