//! Clustering traits.

use super::assignment::Assignment;
use crate::error::Result;
use crate::features::FeatureMatrix;

/// Trait for clustering algorithms.
///
/// Implementations read the matrix through a shared reference and never
/// mutate it; each call produces a fresh [`Assignment`].
pub trait Clustering {
    /// Cluster the matrix rows and return one label per row.
    fn fit(&self, matrix: &FeatureMatrix) -> Result<Assignment>;
}
