//! # cohort
//!
//! Customer segmentation and product recommendation over tabular data.
//!
//! The pipeline: raw records → [`FeatureMatrixBuilder`] (validation,
//! imputation, outlier trimming, scaling, one-hot encoding) → a clustering
//! algorithm ([`Kmeans`] or [`Dbscan`]) → [`evaluate`] (silhouette-style
//! quality coefficient plus per-segment profiles) → [`recommend`]
//! (label-keyed product lookup). [`SegmentationEngine`] wraps the whole flow
//! behind one value; [`IndividualScorer`] answers single-prospect what-if
//! queries through an independent rule ladder, no clustering required.
//!
//! All components are synchronous and deterministic: clustering takes an
//! explicit seed, every stage returns a new value instead of mutating its
//! input, and errors come back as [`Error`] variants rather than panics.
//!
//! ```rust
//! use cohort::{
//!     Algorithm, FeatureMatrixBuilder, Kmeans, Record, SegmentationEngine,
//! };
//!
//! let records: Vec<Record> = [1200.0_f64, 1350.0, 980.0, 56_000.0, 58_500.0, 61_000.0]
//!     .iter()
//!     .map(|&balance| Record::new().with("balance", balance))
//!     .collect();
//!
//! let matrix = FeatureMatrixBuilder::new(["balance"]).build(&records)?;
//! let mut engine = SegmentationEngine::new(matrix);
//! let outcome = engine.run(&Algorithm::Partitioning(Kmeans::new(2).with_seed(42)))?;
//!
//! assert_eq!(outcome.assignment.segments().len(), 2);
//! # Ok::<(), cohort::Error>(())
//! ```
//!
//! The optional `parallel` feature runs k-means restarts on the rayon pool;
//! results are identical to the serial build.

pub mod cluster;
pub mod engine;
/// Error types used across `cohort`.
pub mod error;
pub mod features;
pub mod metrics;
pub mod recommend;
pub mod score;

pub use cluster::{Assignment, Clustering, Dbscan, Kmeans, KmeansFit, NOISE};
pub use engine::{Algorithm, RunOutcome, SegmentationEngine};
pub use error::{Error, Result};
pub use features::{
    FeatureMatrix, FeatureMatrixBuilder, MissingValuePolicy, OutlierPolicy, Record,
    ScalingPolicy, Value,
};
pub use metrics::{evaluate, Evaluation, SegmentProfile};
pub use recommend::{
    augment, filter_by_category, recommend, Recommendation, RecommendationRule, RuleTable,
};
pub use score::{default_rules, Feedback, IndividualScorer, ProductScore, ScoringRule};
