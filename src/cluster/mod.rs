//! Clustering algorithms for grouping similar customers.
//!
//! Two complementary algorithms operate on a [`FeatureMatrix`]:
//!
//! ## K-means (partitioning)
//!
//! Assigns every row to one of exactly `k` centroids by minimizing the
//! within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**: roughly spherical clusters of similar size, and a known
//! `k`. Every row gets a label; there is no noise.
//!
//! ## DBSCAN (density)
//!
//! Grows clusters from dense neighborhoods. Discovers the cluster count
//! itself, finds non-convex shapes, and marks sparse rows as noise
//! ([`NOISE`], label −1) rather than forcing them into a segment.
//!
//! ## Usage
//!
//! ```rust
//! use cohort::{Clustering, Dbscan, FeatureMatrixBuilder, Kmeans, Record};
//!
//! let records: Vec<Record> = [0.0_f64, 0.1, 10.0, 10.1]
//!     .iter()
//!     .map(|&v| Record::new().with("balance", v))
//!     .collect();
//! let matrix = FeatureMatrixBuilder::new(["balance"]).build(&records).unwrap();
//!
//! let labels = Kmeans::new(2).with_seed(42).fit(&matrix).unwrap();
//! assert_eq!(labels.label(0), labels.label(1));
//! assert_ne!(labels.label(0), labels.label(2));
//!
//! let labels = Dbscan::new(0.5, 2).fit(&matrix).unwrap();
//! assert_eq!(labels.len(), matrix.n_rows());
//! ```
//!
//! [`FeatureMatrix`]: crate::features::FeatureMatrix

mod assignment;
mod dbscan;
mod kmeans;
mod traits;

pub use assignment::{Assignment, NOISE};
pub use dbscan::Dbscan;
pub use kmeans::{Kmeans, KmeansFit};
pub use traits::Clustering;
