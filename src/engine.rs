//! End-to-end segmentation runs.
//!
//! [`SegmentationEngine`] ties the pipeline together for callers that want
//! the whole flow — cluster, evaluate, recommend — behind one value: it owns
//! a built [`FeatureMatrix`] and a [`RuleTable`], runs a caller-chosen
//! [`Algorithm`], and keeps the latest [`RunOutcome`] for inspection.
//!
//! Ordering is enforced: anything that needs a completed run returns
//! [`Error::NotReady`] until `run` has succeeded, and a re-run (same or
//! different algorithm) replaces the previous outcome wholesale — an
//! assignment never outlives the parameters that produced it. One engine
//! instance serves one run at a time; concurrent runs get their own engines
//! over the same shared matrix.

use crate::cluster::{Assignment, Clustering, Dbscan, Kmeans};
use crate::error::{Error, Result};
use crate::features::{FeatureMatrix, Record};
use crate::metrics::{evaluate, Evaluation};
use crate::recommend::{augment, recommend, Recommendation, RuleTable};
use tracing::info;

/// The caller's algorithm choice, parameters included.
#[derive(Debug, Clone)]
pub enum Algorithm {
    /// K-means partitioning: every row gets one of `k` labels.
    Partitioning(Kmeans),
    /// DBSCAN density clustering: cluster count is discovered, sparse rows
    /// become noise.
    Density(Dbscan),
}

impl Algorithm {
    fn fit(&self, matrix: &FeatureMatrix) -> Result<Assignment> {
        match self {
            Algorithm::Partitioning(kmeans) => kmeans.fit(matrix),
            Algorithm::Density(dbscan) => dbscan.fit(matrix),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Algorithm::Partitioning(_) => "k-means",
            Algorithm::Density(_) => "dbscan",
        }
    }
}

/// The product of one successful segmentation run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Per-row segment labels.
    pub assignment: Assignment,
    /// Quality coefficient and per-segment profiles.
    pub evaluation: Evaluation,
}

/// Owns one matrix and the latest run over it.
#[derive(Debug, Clone)]
pub struct SegmentationEngine {
    matrix: FeatureMatrix,
    rules: RuleTable,
    outcome: Option<RunOutcome>,
}

impl SegmentationEngine {
    /// Create an engine over a built matrix with the built-in rule table.
    pub fn new(matrix: FeatureMatrix) -> Self {
        Self {
            matrix,
            rules: RuleTable::builtin(),
            outcome: None,
        }
    }

    /// Replace the recommendation rules. The table is fixed for the lifetime
    /// of each subsequent run.
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    /// The matrix this engine segments.
    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    /// Cluster and evaluate, replacing any previous outcome.
    pub fn run(&mut self, algorithm: &Algorithm) -> Result<&RunOutcome> {
        let assignment = algorithm.fit(&self.matrix)?;
        let evaluation = evaluate(&self.matrix, &assignment)?;
        info!(
            algorithm = algorithm.name(),
            segments = assignment.segments().len(),
            noise = assignment.noise_count(),
            coefficient = evaluation.coefficient,
            "segmentation run complete"
        );
        self.outcome = Some(RunOutcome {
            assignment,
            evaluation,
        });
        self.outcome
            .as_ref()
            .ok_or(Error::NotReady("segmentation"))
    }

    /// The latest outcome, or [`Error::NotReady`] before the first
    /// successful run.
    pub fn outcome(&self) -> Result<&RunOutcome> {
        self.outcome
            .as_ref()
            .ok_or(Error::NotReady("segmentation has not been run"))
    }

    /// Member rows of one segment. An absent label is the recoverable
    /// [`Error::EmptyResult`], not a precondition failure.
    pub fn segment_members(&self, label: i32) -> Result<Vec<usize>> {
        let outcome = self.outcome()?;
        let members = outcome.assignment.members(label);
        if members.is_empty() {
            return Err(Error::EmptyResult(format!("segment {label} not found")));
        }
        Ok(members)
    }

    /// Per-row recommendations for the latest run.
    pub fn recommendations(&self) -> Result<Vec<Recommendation>> {
        Ok(recommend(&self.outcome()?.assignment, &self.rules))
    }

    /// The caller's surviving records augmented with segment and
    /// recommendation columns, ready for an external exporter.
    pub fn augmented(&self, records: &[Record]) -> Result<Vec<Record>> {
        let outcome = self.outcome()?;
        let recommendations = recommend(&outcome.assignment, &self.rules);
        augment(records, &self.matrix, &outcome.assignment, &recommendations)
    }
}
