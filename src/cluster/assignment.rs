//! Cluster assignments.

/// Label reserved for rows that belong to no cluster.
///
/// Only the density clusterer produces it; the partitioning clusterer labels
/// every row. Noise is never a recommendable segment.
pub const NOISE: i32 = -1;

/// A mapping from matrix row index to segment label.
///
/// Labels are small non-negative integers; [`NOISE`] marks density-clustering
/// noise. An assignment is owned by the run that produced it and is invalid
/// for any other matrix, algorithm or parameter set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    labels: Vec<i32>,
}

impl Assignment {
    /// Wrap per-row labels.
    pub fn new(labels: Vec<i32>) -> Self {
        Self { labels }
    }

    /// Per-row labels, in matrix row order.
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Number of rows covered.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the assignment covers no rows.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The label of one row.
    pub fn label(&self, row: usize) -> i32 {
        self.labels[row]
    }

    /// Sorted distinct non-noise labels.
    pub fn segments(&self) -> Vec<i32> {
        let mut seen: Vec<i32> = self
            .labels
            .iter()
            .copied()
            .filter(|&l| l != NOISE)
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen
    }

    /// Row indices carrying `label`.
    pub fn members(&self, label: i32) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of rows labeled as noise.
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_exclude_noise_and_deduplicate() {
        let assignment = Assignment::new(vec![2, 0, NOISE, 0, 1, NOISE]);
        assert_eq!(assignment.segments(), vec![0, 1, 2]);
        assert_eq!(assignment.noise_count(), 2);
    }

    #[test]
    fn members_are_positional() {
        let assignment = Assignment::new(vec![1, 0, 1]);
        assert_eq!(assignment.members(1), vec![0, 2]);
        assert_eq!(assignment.members(5), Vec::<usize>::new());
    }
}
