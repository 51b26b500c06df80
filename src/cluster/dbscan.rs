//! DBSCAN: density-based clustering with noise.
//!
//! Groups rows by neighborhood density instead of partitioning around
//! centroids. Unlike k-means it discovers the number of clusters itself,
//! handles non-convex shapes, and leaves sparse rows unassigned.
//!
//! # Core concepts
//!
//! - **Epsilon (ε)**: neighborhood radius. A row's neighborhood is every row
//!   (itself included) within Euclidean distance ε.
//! - **Core point**: a row whose neighborhood holds at least `min_samples`
//!   rows.
//! - **Border point**: inside a core point's neighborhood but not core
//!   itself; it joins the cluster but does not extend it.
//! - **Noise**: reached from no core point; labeled [`NOISE`].
//!
//! Clusters are the maximal sets connected through chains of core points
//! with overlapping neighborhoods. Growth is breadth-first from each
//! unvisited core point; labels follow that visitation order, starting at 0.
//! A run may legitimately find zero clusters (all rows noise).

use super::assignment::{Assignment, NOISE};
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::features::FeatureMatrix;
use std::collections::VecDeque;
use tracing::info;

/// DBSCAN parameter bundle.
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Neighborhood radius.
    eps: f64,
    /// Minimum neighborhood size (the row itself included) for a core point.
    min_samples: usize,
}

impl Dbscan {
    /// Create a DBSCAN clusterer.
    ///
    /// `min_samples` counts the row itself, so `min_samples = 1` makes every
    /// row core and nothing noise.
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self { eps, min_samples }
    }

    /// Every row within `eps` of `row`, itself included.
    fn neighborhood(&self, matrix: &FeatureMatrix, row: usize) -> Vec<usize> {
        let point = matrix.row(row);
        (0..matrix.n_rows())
            .filter(|&other| {
                let dist: f64 = point
                    .iter()
                    .zip(matrix.row(other).iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                dist.sqrt() <= self.eps
            })
            .collect()
    }
}

impl Clustering for Dbscan {
    fn fit(&self, matrix: &FeatureMatrix) -> Result<Assignment> {
        let n = matrix.n_rows();
        if n == 0 || matrix.n_columns() == 0 {
            return Err(Error::EmptyInput);
        }
        if self.eps <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "eps",
                message: "must be positive",
            });
        }
        if self.min_samples < 1 {
            return Err(Error::InvalidParameter {
                name: "min_samples",
                message: "must be at least 1",
            });
        }

        let neighborhoods: Vec<Vec<usize>> =
            (0..n).map(|row| self.neighborhood(matrix, row)).collect();
        let core: Vec<bool> = neighborhoods
            .iter()
            .map(|nb| nb.len() >= self.min_samples)
            .collect();

        let mut labels = vec![NOISE; n];
        let mut cluster_id = 0;

        for row in 0..n {
            if !core[row] || labels[row] != NOISE {
                continue;
            }

            // Breadth-first absorption from this core point. Border points
            // join the cluster but their neighborhoods are not expanded.
            labels[row] = cluster_id;
            let mut frontier: VecDeque<usize> = neighborhoods[row].iter().copied().collect();
            while let Some(next) = frontier.pop_front() {
                if labels[next] != NOISE {
                    continue;
                }
                labels[next] = cluster_id;
                if core[next] {
                    frontier.extend(neighborhoods[next].iter().copied());
                }
            }
            cluster_id += 1;
        }

        let noise = labels.iter().filter(|&&l| l == NOISE).count();
        info!(
            clusters = cluster_id,
            noise,
            eps = self.eps,
            min_samples = self.min_samples,
            "dbscan fit complete"
        );

        Ok(Assignment::new(labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureMatrixBuilder, Record, ScalingPolicy};

    fn matrix_from_rows(rows: &[[f64; 2]]) -> FeatureMatrix {
        let records: Vec<Record> = rows
            .iter()
            .map(|r| Record::new().with("x", r[0]).with("y", r[1]))
            .collect();
        FeatureMatrixBuilder::new(["x", "y"])
            .with_scaling(ScalingPolicy::MinMax)
            .build(&records)
            .unwrap()
    }

    /// One-dimensional matrix; min-max maps the coordinates onto [0, 1], so
    /// encoded spacing is raw spacing divided by the raw range.
    fn matrix_from_line(xs: &[f64]) -> FeatureMatrix {
        let records: Vec<Record> = xs
            .iter()
            .map(|&x| Record::new().with("x", x))
            .collect();
        FeatureMatrixBuilder::new(["x"])
            .with_scaling(ScalingPolicy::MinMax)
            .build(&records)
            .unwrap()
    }

    #[test]
    fn two_dense_groups_get_distinct_labels() {
        let matrix = matrix_from_rows(&[
            [0.00, 0.00],
            [0.01, 0.00],
            [0.00, 0.01],
            [0.01, 0.01],
            [1.00, 1.00],
            [1.01, 1.00],
            [1.00, 1.01],
            [1.01, 1.01],
        ]);
        let labels = Dbscan::new(0.05, 3).fit(&matrix).unwrap();
        assert_eq!(labels.segments(), vec![0, 1]);
        assert!(labels.labels()[..4].iter().all(|&l| l == 0));
        assert!(labels.labels()[4..].iter().all(|&l| l == 1));
        assert_eq!(labels.noise_count(), 0);
    }

    #[test]
    fn isolated_row_is_noise() {
        let matrix = matrix_from_rows(&[
            [0.00, 0.00],
            [0.01, 0.00],
            [0.00, 0.01],
            [0.50, 0.50],
            [1.00, 1.00],
            [1.01, 1.00],
            [1.00, 1.01],
        ]);
        let labels = Dbscan::new(0.05, 3).fit(&matrix).unwrap();
        assert_eq!(labels.label(3), NOISE);
        assert_eq!(labels.segments(), vec![0, 1]);
    }

    #[test]
    fn pair_beyond_eps_is_all_noise() {
        // Two rows 0.1 apart with eps 0.05: neither neighborhood reaches the
        // other, neither is core, both stay noise.
        let records = vec![
            Record::new().with("x", 0.0),
            Record::new().with("x", 0.1),
        ];
        let matrix = FeatureMatrixBuilder::new(["x"])
            .with_scaling(ScalingPolicy::MinMax)
            .build(&records)
            .unwrap();
        // Min-max maps the pair to 0 and 1; use raw distance via eps scaled
        // to the encoded coordinates: encoded distance is 1.0, eps 0.5.
        let labels = Dbscan::new(0.5, 2).fit(&matrix).unwrap();
        assert_eq!(labels.labels(), &[NOISE, NOISE]);
        assert_eq!(labels.segments(), Vec::<i32>::new());
    }

    #[test]
    fn min_samples_one_makes_every_row_core() {
        let matrix = matrix_from_rows(&[[0.0, 0.0], [1.0, 1.0]]);
        let labels = Dbscan::new(0.1, 1).fit(&matrix).unwrap();
        assert_eq!(labels.labels(), &[0, 1]);
    }

    #[test]
    fn chain_of_core_points_connects_into_one_cluster() {
        let matrix = matrix_from_line(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        // Encoded spacing is 1/9 per step. With eps covering one step, every
        // interior row is core (both neighbors plus itself) and the chain is
        // density-connected end to end; the two endpoints join as borders.
        let labels = Dbscan::new(0.12, 3).fit(&matrix).unwrap();
        assert!(labels.labels().iter().all(|&l| l == 0));
    }

    #[test]
    fn labels_follow_core_visitation_order() {
        // The first cluster encountered in row order gets label 0.
        let matrix = matrix_from_rows(&[
            [1.00, 1.00],
            [1.01, 1.00],
            [1.00, 1.01],
            [0.00, 0.00],
            [0.01, 0.00],
            [0.00, 0.01],
        ]);
        let labels = Dbscan::new(0.05, 3).fit(&matrix).unwrap();
        assert_eq!(labels.label(0), 0);
        assert_eq!(labels.label(3), 1);
    }

    #[test]
    fn border_points_do_not_bridge_clusters() {
        // Encoded coordinates: [0, 1/9, 2/9, 1/2, 7/9, 8/9, 1]. Row 3 is
        // within eps of a core point on each side but is not core itself
        // (neighborhood of 3 < min_samples 4): it joins the cluster that
        // absorbs it first and must not merge the two.
        let matrix = matrix_from_line(&[0.0, 1.0, 2.0, 4.5, 7.0, 8.0, 9.0]);
        let labels = Dbscan::new(0.28, 4).fit(&matrix).unwrap();
        assert_eq!(labels.segments(), vec![0, 1]);
        assert_eq!(labels.labels(), &[0, 0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn invalid_parameters_rejected() {
        let matrix = matrix_from_rows(&[[0.0, 0.0]]);
        assert!(matches!(
            Dbscan::new(0.0, 3).fit(&matrix).unwrap_err(),
            Error::InvalidParameter { name: "eps", .. }
        ));
        assert!(matches!(
            Dbscan::new(-1.0, 3).fit(&matrix).unwrap_err(),
            Error::InvalidParameter { name: "eps", .. }
        ));
        assert!(matches!(
            Dbscan::new(0.5, 0).fit(&matrix).unwrap_err(),
            Error::InvalidParameter { name: "min_samples", .. }
        ));
    }

    #[test]
    fn core_points_are_never_noise() {
        let matrix = matrix_from_rows(&[
            [0.00, 0.00],
            [0.01, 0.00],
            [0.00, 0.01],
            [0.90, 0.90],
        ]);
        let dbscan = Dbscan::new(0.05, 3);
        let labels = dbscan.fit(&matrix).unwrap();
        for row in 0..matrix.n_rows() {
            if dbscan.neighborhood(&matrix, row).len() >= 3 {
                assert_ne!(labels.label(row), NOISE);
            }
        }
    }
}
