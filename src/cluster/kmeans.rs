//! K-means clustering.
//!
//! Partitions rows into k segments by minimizing within-cluster sum of
//! squares (inertia). This is Lloyd's algorithm with k-means++ seeding:
//!
//! 1. Initialize k centroids via k-means++ weighted sampling
//! 2. **Assign**: each row goes to its nearest centroid by squared Euclidean
//!    distance, ties broken by lowest centroid index
//! 3. **Update**: each centroid moves to the mean of its assigned rows; a
//!    centroid with no rows keeps its previous position
//! 4. Repeat until the summed squared centroid shift falls below the
//!    tolerance, or the iteration cap is reached
//!
//! Lloyd's algorithm only finds a local minimum, so the whole run is repeated
//! `restarts` times with seeds `seed, seed+1, …` and the restart with the
//! lowest inertia wins. Restarts are independent; with the `parallel` feature
//! they run on the rayon pool, and the reduction breaks inertia ties by
//! restart index so both builds stay byte-identical.
//!
//! Everything downstream of the seed is deterministic: the same matrix, k and
//! seed always produce the same assignment.

use super::assignment::Assignment;
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::features::FeatureMatrix;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::prelude::*;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// K-means parameter bundle.
///
/// Immutable once constructed; `fit` can be called any number of times.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Base random seed; restart `r` uses `seed + r`.
    seed: u64,
    /// Number of independent restarts; the lowest-inertia run wins.
    restarts: usize,
    /// Maximum Lloyd iterations per restart.
    max_iter: usize,
    /// Convergence tolerance on the summed squared centroid shift.
    tol: f64,
}

/// Outcome of a k-means fit: the assignment plus the fitted model state.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Per-row segment labels in `[0, k)`.
    pub assignment: Assignment,
    /// Final centroid positions, one row per cluster.
    pub centroids: Array2<f64>,
    /// Total within-cluster sum of squared distances.
    pub inertia: f64,
    /// Lloyd iterations used by the winning restart.
    pub iterations: usize,
}

impl Kmeans {
    /// Create a k-means clusterer with `k` clusters and default parameters
    /// (seed 42, 10 restarts, 300 iterations, tolerance 1e-4).
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seed: 42,
            restarts: 10,
            max_iter: 300,
            tol: 1e-4,
        }
    }

    /// Set the base random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of restarts.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the iteration cap per restart.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Run the full best-of-restarts fit, returning centroids and inertia
    /// along with the assignment.
    pub fn fit_full(&self, matrix: &FeatureMatrix) -> Result<KmeansFit> {
        let data = matrix.data();
        let n = data.nrows();
        if n == 0 || data.ncols() == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k < 1 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_rows: n,
            });
        }
        if self.restarts < 1 {
            return Err(Error::InvalidParameter {
                name: "restarts",
                message: "must be at least 1",
            });
        }
        if self.tol < 0.0 {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be non-negative",
            });
        }

        #[cfg(feature = "parallel")]
        let runs: Vec<SingleRun> = (0..self.restarts)
            .into_par_iter()
            .map(|r| self.run_single(&data.view(), self.seed.wrapping_add(r as u64)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let runs: Vec<SingleRun> = (0..self.restarts)
            .map(|r| self.run_single(&data.view(), self.seed.wrapping_add(r as u64)))
            .collect();

        // Inertia ties go to the earliest restart, so the winner does not
        // depend on scheduling.
        let winner = runs
            .into_iter()
            .enumerate()
            .min_by(|a, b| a.1.inertia.total_cmp(&b.1.inertia).then(a.0.cmp(&b.0)))
            .map(|(_, run)| run)
            .ok_or(Error::EmptyInput)?;

        info!(
            k = self.k,
            inertia = winner.inertia,
            iterations = winner.iterations,
            restarts = self.restarts,
            "k-means fit complete"
        );

        Ok(KmeansFit {
            assignment: Assignment::new(winner.labels.iter().map(|&l| l as i32).collect()),
            centroids: winner.centroids,
            inertia: winner.inertia,
            iterations: winner.iterations,
        })
    }

    /// One seeded Lloyd run.
    fn run_single(&self, data: &ArrayView2<'_, f64>, seed: u64) -> SingleRun {
        let n = data.nrows();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut centroids = self.init_centroids(data, &mut rng);
        let mut labels = vec![0usize; n];
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            iterations = iter + 1;

            for (i, label) in labels.iter_mut().enumerate() {
                *label = nearest(&data.row(i), &centroids.view()).0;
            }

            let mut new_centroids = Array2::zeros(centroids.raw_dim());
            let mut counts = vec![0usize; self.k];
            for (i, &label) in labels.iter().enumerate() {
                counts[label] += 1;
                for (j, &v) in data.row(i).iter().enumerate() {
                    new_centroids[[label, j]] += v;
                }
            }
            for c in 0..self.k {
                if counts[c] > 0 {
                    for j in 0..new_centroids.ncols() {
                        new_centroids[[c, j]] /= counts[c] as f64;
                    }
                } else {
                    // An empty cluster keeps its previous position; its label
                    // will simply be absent from the output.
                    warn!(centroid = c, seed, "centroid lost all members; keeping previous position");
                    new_centroids.row_mut(c).assign(&centroids.row(c));
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            centroids = new_centroids;

            if shift < self.tol {
                break;
            }
        }

        // Final assignment pass so labels and inertia agree with the final
        // centroid positions.
        let mut inertia = 0.0;
        for (i, label) in labels.iter_mut().enumerate() {
            let (c, dist) = nearest(&data.row(i), &centroids.view());
            *label = c;
            inertia += dist;
        }

        debug!(seed, inertia, iterations, "k-means restart finished");
        SingleRun {
            labels,
            centroids,
            inertia,
            iterations,
        }
    }

    /// k-means++ initialization: the first centroid is a uniformly random
    /// row, each later one is sampled with probability proportional to its
    /// squared distance from the nearest already-chosen centroid.
    fn init_centroids(&self, data: &ArrayView2<'_, f64>, rng: &mut StdRng) -> Array2<f64> {
        let n = data.nrows();
        let mut centroids = Array2::zeros((self.k, data.ncols()));

        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        for i in 1..self.k {
            let distances: Vec<f64> = (0..n)
                .map(|j| {
                    (0..i)
                        .map(|c| squared_distance(&data.row(j), &centroids.row(c)))
                        .fold(f64::MAX, f64::min)
                })
                .collect();

            let total: f64 = distances.iter().sum();
            if total == 0.0 {
                // Every row coincides with a chosen centroid; any row does.
                let idx = rng.random_range(0..n);
                centroids.row_mut(i).assign(&data.row(idx));
                continue;
            }

            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = n - 1;
            for (j, &dist) in distances.iter().enumerate() {
                cumsum += dist;
                if cumsum >= threshold {
                    selected = j;
                    break;
                }
            }
            centroids.row_mut(i).assign(&data.row(selected));
        }

        centroids
    }
}

impl Clustering for Kmeans {
    fn fit(&self, matrix: &FeatureMatrix) -> Result<Assignment> {
        Ok(self.fit_full(matrix)?.assignment)
    }
}

struct SingleRun {
    labels: Vec<usize>,
    centroids: Array2<f64>,
    inertia: f64,
    iterations: usize,
}

/// Index and squared distance of the nearest centroid. The strict comparison
/// keeps the lowest index on exact ties.
fn nearest(point: &ArrayView1<'_, f64>, centroids: &ArrayView2<'_, f64>) -> (usize, f64) {
    let mut best = 0;
    let mut best_dist = f64::MAX;
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = squared_distance(point, &centroid);
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    (best, best_dist)
}

/// Squared Euclidean distance.
#[inline]
fn squared_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
