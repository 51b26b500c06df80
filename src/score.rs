//! Rule-based scoring for individual what-if queries.
//!
//! The segment pipeline answers "which products fit my existing customers";
//! this module answers "which product fits *this* prospect" without running
//! any clustering. A [`ScoringRule`] ladder is evaluated top to bottom over
//! the raw inputs and the first matching rule wins, so rule order is part of
//! the contract.
//!
//! The scorer also keeps a process-lifetime feedback log: callers report how
//! a recommendation landed, and obviously invalid feedback is rejected
//! quietly (logged, `false` returned) rather than raised — the surrounding
//! application treats feedback as best-effort.

use tracing::warn;

/// A recommended product with its fit score out of 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductScore {
    /// Product name.
    pub product: String,
    /// Fit score in `[0, 100]`.
    pub score: u32,
}

impl ProductScore {
    fn new(product: &str, score: u32) -> Self {
        Self {
            product: product.into(),
            score,
        }
    }
}

/// One rung of the scoring ladder: a predicate over `(age,
/// transaction_count)` and the outcome it produces. `None` means the
/// prospect is ineligible for any product.
#[derive(Debug, Clone)]
pub struct ScoringRule {
    predicate: fn(u32, u32) -> bool,
    outcome: Option<ProductScore>,
}

impl ScoringRule {
    /// Build a rule.
    pub fn new(predicate: fn(u32, u32) -> bool, outcome: Option<ProductScore>) -> Self {
        Self { predicate, outcome }
    }
}

/// The default scoring ladder. Order is significant: the first matching
/// predicate wins.
pub fn default_rules() -> Vec<ScoringRule> {
    vec![
        // Minors are ineligible regardless of activity.
        ScoringRule::new(|age, _| age < 17, None),
        ScoringRule::new(
            |age, tx| age > 55 && tx < 5,
            Some(ProductScore::new("retirement product", 95)),
        ),
        ScoringRule::new(
            |age, tx| age > 40 && tx > 20,
            Some(ProductScore::new("fixed-income investment", 90)),
        ),
        ScoringRule::new(
            |age, tx| age < 30 && tx > 15,
            Some(ProductScore::new("youth credit product", 88)),
        ),
        ScoringRule::new(
            |_, tx| tx > 10,
            Some(ProductScore::new("digital savings", 85)),
        ),
        ScoringRule::new(|_, _| true, Some(ProductScore::new("regular savings", 70))),
    ]
}

/// A recorded piece of user feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Product the feedback concerns.
    pub product: String,
    /// Rating, 1-based; zero is rejected before reaching the log.
    pub rating: u32,
}

/// Stateless rule evaluator with an in-memory feedback log.
#[derive(Debug, Clone)]
pub struct IndividualScorer {
    rules: Vec<ScoringRule>,
    feedback: Vec<Feedback>,
}

impl Default for IndividualScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl IndividualScorer {
    /// A scorer over [`default_rules`].
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// A scorer over a caller-supplied ladder.
    pub fn with_rules(rules: Vec<ScoringRule>) -> Self {
        Self {
            rules,
            feedback: Vec::new(),
        }
    }

    /// Score one prospect. Returns `None` when the first matching rule marks
    /// the prospect ineligible (or, for a custom ladder, when no rule
    /// matches at all).
    pub fn score(&self, age: u32, transaction_count: u32) -> Option<ProductScore> {
        self.rules
            .iter()
            .find(|rule| (rule.predicate)(age, transaction_count))
            .and_then(|rule| rule.outcome.clone())
    }

    /// Append feedback to the log. Returns `false` — with a logged warning,
    /// never an error — when the product is empty or the rating is zero.
    pub fn record_feedback(&mut self, product: &str, rating: u32) -> bool {
        if product.is_empty() || rating == 0 {
            warn!(product, rating, "rejected invalid feedback");
            return false;
        }
        self.feedback.push(Feedback {
            product: product.into(),
            rating,
        });
        true
    }

    /// The feedback recorded so far, in arrival order.
    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }
}
