//! Segmentation quality evaluation.
//!
//! Clustering here is unsupervised: there is no ground truth to compare
//! against, so quality is judged from the geometry alone.
//!
//! | Measure | Range | Meaning |
//! |---------|-------|---------|
//! | [`Evaluation::coefficient`] | [-1, 1] | cohesion vs. separation, higher is better |
//! | [`SegmentProfile`] | — | member count and column-wise means per segment |
//!
//! The coefficient is the silhouette: for each row, the mean distance to its
//! own segment (`intra`) is compared with the mean distance to the nearest
//! other segment (`inter`), giving `(inter − intra) / max(intra, inter)`.
//! Noise rows are excluded, and when fewer than two real segments exist the
//! coefficient is `None` — quality is undefined there, and forcing a number
//! would let a caller mistake a degenerate run for a scored one.
//!
//! Evaluation is read-only: neither the matrix nor the assignment changes.

use crate::cluster::{Assignment, NOISE};
use crate::error::{Error, Result};
use crate::features::FeatureMatrix;

/// Summary of one segment: its members and their column-wise mean.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentProfile {
    /// Segment label; [`NOISE`] for the noise profile.
    pub label: i32,
    /// Member row indices, in matrix row order.
    pub members: Vec<usize>,
    /// Member count.
    pub count: usize,
    /// Column-wise mean over the member rows.
    pub mean: Vec<f64>,
}

/// Result of evaluating an assignment against its matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Mean silhouette over non-noise rows; `None` when fewer than two
    /// non-noise segments exist.
    pub coefficient: Option<f64>,
    /// One profile per present label, non-noise segments in ascending label
    /// order, the noise profile (if any) last.
    pub profiles: Vec<SegmentProfile>,
}

/// Evaluate a completed clustering run.
///
/// Fails with [`Error::DimensionMismatch`] if the assignment does not cover
/// exactly the matrix rows.
pub fn evaluate(matrix: &FeatureMatrix, assignment: &Assignment) -> Result<Evaluation> {
    if assignment.len() != matrix.n_rows() {
        return Err(Error::DimensionMismatch {
            expected: matrix.n_rows(),
            found: assignment.len(),
        });
    }
    if assignment.is_empty() {
        return Err(Error::EmptyInput);
    }

    let segments = assignment.segments();
    let mut profiles: Vec<SegmentProfile> = segments
        .iter()
        .map(|&label| profile(matrix, assignment, label))
        .collect();
    if assignment.noise_count() > 0 {
        profiles.push(profile(matrix, assignment, NOISE));
    }

    let coefficient = if segments.len() >= 2 {
        Some(silhouette(matrix, assignment, &segments))
    } else {
        None
    };

    Ok(Evaluation {
        coefficient,
        profiles,
    })
}

fn profile(matrix: &FeatureMatrix, assignment: &Assignment, label: i32) -> SegmentProfile {
    let members = assignment.members(label);
    let mut mean = vec![0.0; matrix.n_columns()];
    for &row in &members {
        for (j, &v) in matrix.row(row).iter().enumerate() {
            mean[j] += v;
        }
    }
    for v in &mut mean {
        *v /= members.len() as f64;
    }
    SegmentProfile {
        label,
        count: members.len(),
        members,
        mean,
    }
}

fn silhouette(matrix: &FeatureMatrix, assignment: &Assignment, segments: &[i32]) -> f64 {
    let members: Vec<Vec<usize>> = segments
        .iter()
        .map(|&label| assignment.members(label))
        .collect();

    let mut total = 0.0;
    let mut eligible = 0usize;

    for (s, own) in members.iter().enumerate() {
        for &row in own {
            // Mean distance to the other members of the row's own segment;
            // a singleton has nothing to cohere with, so intra is 0.
            let intra = if own.len() > 1 {
                own.iter()
                    .filter(|&&other| other != row)
                    .map(|&other| distance(matrix, row, other))
                    .sum::<f64>()
                    / (own.len() - 1) as f64
            } else {
                0.0
            };

            // Minimum over other segments of the mean distance to them.
            let inter = members
                .iter()
                .enumerate()
                .filter(|(t, _)| *t != s)
                .map(|(_, other)| {
                    other
                        .iter()
                        .map(|&o| distance(matrix, row, o))
                        .sum::<f64>()
                        / other.len() as f64
                })
                .fold(f64::MAX, f64::min);

            let denom = intra.max(inter);
            total += if denom == 0.0 {
                0.0
            } else {
                (inter - intra) / denom
            };
            eligible += 1;
        }
    }

    total / eligible as f64
}

fn distance(matrix: &FeatureMatrix, a: usize, b: usize) -> f64 {
    matrix
        .row(a)
        .iter()
        .zip(matrix.row(b).iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
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

    #[test]
    fn single_segment_has_no_coefficient() {
        let matrix = matrix_from_rows(&[[0.0, 0.0], [0.1, 0.1], [0.2, 0.2]]);
        let evaluation = evaluate(&matrix, &Assignment::new(vec![0, 0, 0])).unwrap();
        assert_eq!(evaluation.coefficient, None);
        assert_eq!(evaluation.profiles.len(), 1);
        assert_eq!(evaluation.profiles[0].count, 3);
    }

    #[test]
    fn noise_only_assignment_has_no_coefficient() {
        let matrix = matrix_from_rows(&[[0.0, 0.0], [1.0, 1.0]]);
        let evaluation = evaluate(&matrix, &Assignment::new(vec![NOISE, NOISE])).unwrap();
        assert_eq!(evaluation.coefficient, None);
        assert_eq!(evaluation.profiles.len(), 1);
        assert_eq!(evaluation.profiles[0].label, NOISE);
    }

    #[test]
    fn one_segment_plus_noise_has_no_coefficient() {
        let matrix = matrix_from_rows(&[[0.0, 0.0], [0.1, 0.0], [1.0, 1.0]]);
        let evaluation = evaluate(&matrix, &Assignment::new(vec![0, 0, NOISE])).unwrap();
        assert_eq!(evaluation.coefficient, None);
    }

    #[test]
    fn well_separated_segments_score_near_one() {
        let matrix = matrix_from_rows(&[
            [0.00, 0.00],
            [0.01, 0.01],
            [1.00, 1.00],
            [1.01, 1.01],
        ]);
        let evaluation = evaluate(&matrix, &Assignment::new(vec![0, 0, 1, 1])).unwrap();
        let coefficient = evaluation.coefficient.unwrap();
        assert!(coefficient > 0.9, "got {coefficient}");
        assert!(coefficient <= 1.0);
    }

    #[test]
    fn coefficient_stays_in_bounds_for_bad_split() {
        // Deliberately mismatched labels: each "segment" straddles both blobs.
        let matrix = matrix_from_rows(&[
            [0.00, 0.00],
            [1.00, 1.00],
            [0.01, 0.01],
            [1.01, 1.01],
        ]);
        let evaluation = evaluate(&matrix, &Assignment::new(vec![0, 0, 1, 1])).unwrap();
        let coefficient = evaluation.coefficient.unwrap();
        assert!((-1.0..=1.0).contains(&coefficient));
        assert!(coefficient < 0.0, "bad split should score negative");
    }

    #[test]
    fn singleton_segment_gets_zero_intra() {
        let matrix = matrix_from_rows(&[[0.0, 0.0], [0.1, 0.1], [1.0, 1.0]]);
        // Segment 1 is a singleton: its silhouette is (inter - 0) / inter = 1.
        let evaluation = evaluate(&matrix, &Assignment::new(vec![0, 0, 1])).unwrap();
        assert!(evaluation.coefficient.unwrap() > 0.0);
    }

    #[test]
    fn profiles_cover_noise_separately_and_last() {
        let matrix = matrix_from_rows(&[
            [0.0, 0.0],
            [0.2, 0.2],
            [1.0, 1.0],
            [0.5, 0.5],
        ]);
        let evaluation =
            evaluate(&matrix, &Assignment::new(vec![0, 0, 1, NOISE])).unwrap();
        let labels: Vec<i32> = evaluation.profiles.iter().map(|p| p.label).collect();
        assert_eq!(labels, vec![0, 1, NOISE]);
        assert_eq!(evaluation.profiles[0].members, vec![0, 1]);
        assert_eq!(evaluation.profiles[2].count, 1);
    }

    #[test]
    fn profile_means_are_column_wise() {
        let records = vec![
            Record::new().with("x", 0.0),
            Record::new().with("x", 1.0),
        ];
        let matrix = FeatureMatrixBuilder::new(["x"])
            .with_scaling(ScalingPolicy::MinMax)
            .build(&records)
            .unwrap();
        let evaluation = evaluate(&matrix, &Assignment::new(vec![0, 0])).unwrap();
        assert_eq!(evaluation.profiles[0].mean, vec![0.5]);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let matrix = matrix_from_rows(&[[0.0, 0.0], [1.0, 1.0]]);
        let err = evaluate(&matrix, &Assignment::new(vec![0])).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }
}
