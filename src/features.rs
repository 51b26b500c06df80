//! Feature matrix construction from raw tabular records.
//!
//! Clustering operates on a rectangular, purely numeric matrix. Real customer
//! tables are not that: they mix numeric and categorical attributes, carry
//! missing values, and contain outliers that dominate Euclidean distances.
//! This module owns the deterministic contract that bridges the two:
//!
//! 1. **Validation** — every required column must exist, or the build fails
//!    with [`Error::MissingColumns`] naming all absentees at once.
//! 2. **Missing values** — drop incomplete rows, or impute (mean for numeric
//!    columns, most frequent value for categorical ones).
//! 3. **Outliers** — optional IQR trimming with 1.5·IQR fences, applied
//!    column by column in the caller's column order. The filtering is
//!    *sequential*: a row removed by an earlier column no longer participates
//!    in later columns' quantile computation.
//! 4. **Scaling** — z-score (population std) or min-max per numeric column.
//! 5. **Encoding** — one-hot with the first category dropped; the stored
//!    category lists also drive [`FeatureMatrix::encode`] for single records,
//!    where an unseen category maps to the all-zero indicator row.
//!
//! The builder never mutates the caller's records; every stage produces new
//! values, and the resulting [`FeatureMatrix`] is the exclusive property of
//! the pipeline invocation that built it.

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1};
use tracing::{debug, info};

/// A single cell value in a raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Numeric attribute.
    Number(f64),
    /// Categorical attribute.
    Text(String),
    /// Explicitly missing.
    Missing,
}

impl Value {
    /// Whether this cell carries no usable value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Categorical form of the value. Numbers coerce through their display
    /// representation, matching how mixed columns behave in loosely typed
    /// source tables.
    fn as_category(&self) -> Option<String> {
        match self {
            Value::Number(v) => Some(format!("{v}")),
            Value::Text(s) => Some(s.clone()),
            Value::Missing => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One raw input row: an ordered mapping from attribute names to values.
///
/// Identity is positional; no primary key is assumed. Missing attributes may
/// be expressed either by omitting the field or by [`Value::Missing`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append or replace a field, preserving insertion order.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }
}

/// How rows with missing values in required columns are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValuePolicy {
    /// Remove any row with a missing value in a required column.
    DropRows,
    /// Fill numeric columns with the column mean (computed after dropping
    /// rows whose numeric values are all missing) and categorical columns
    /// with the most frequent value, ties broken by first encounter.
    #[default]
    ImputeMeanMode,
}

/// How numeric outliers are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlierPolicy {
    /// Leave all rows in place.
    #[default]
    Keep,
    /// Drop rows outside `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]` per numeric column,
    /// filtering sequentially in required-column order.
    IqrTrim,
}

/// How numeric columns are scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingPolicy {
    /// Subtract the mean, divide by the population standard deviation.
    #[default]
    ZScore,
    /// Map to `[0, 1]`.
    MinMax,
}

/// Parameter bundle for feature matrix construction.
///
/// ```rust
/// use cohort::{FeatureMatrixBuilder, MissingValuePolicy, OutlierPolicy, Record};
///
/// let records = vec![
///     Record::new().with("age", 34.0).with("balance", 1200.0),
///     Record::new().with("age", 51.0).with("balance", 9800.0),
///     Record::new().with("age", 29.0).with("balance", 300.0),
/// ];
///
/// let matrix = FeatureMatrixBuilder::new(["age", "balance"])
///     .with_missing_values(MissingValuePolicy::DropRows)
///     .with_outliers(OutlierPolicy::IqrTrim)
///     .build(&records)
///     .unwrap();
///
/// assert_eq!(matrix.n_rows(), 3);
/// assert_eq!(matrix.columns(), ["age", "balance"]);
/// ```
#[derive(Debug, Clone)]
pub struct FeatureMatrixBuilder {
    required_columns: Vec<String>,
    missing_values: MissingValuePolicy,
    outliers: OutlierPolicy,
    scaling: ScalingPolicy,
}

impl FeatureMatrixBuilder {
    /// Create a builder over the named required columns. Column order is
    /// significant: it fixes output column order and IQR filtering order.
    pub fn new<I, S>(required_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_columns: required_columns.into_iter().map(Into::into).collect(),
            missing_values: MissingValuePolicy::default(),
            outliers: OutlierPolicy::default(),
            scaling: ScalingPolicy::default(),
        }
    }

    /// Set the missing-value policy.
    pub fn with_missing_values(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_values = policy;
        self
    }

    /// Set the outlier policy.
    pub fn with_outliers(mut self, policy: OutlierPolicy) -> Self {
        self.outliers = policy;
        self
    }

    /// Set the scaling policy.
    pub fn with_scaling(mut self, policy: ScalingPolicy) -> Self {
        self.scaling = policy;
        self
    }

    /// Validate, clean, scale and encode `records` into a [`FeatureMatrix`].
    ///
    /// The caller's records are read but never mutated.
    pub fn build(&self, records: &[Record]) -> Result<FeatureMatrix> {
        if records.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.required_columns.is_empty() {
            return Err(Error::InvalidParameter {
                name: "required_columns",
                message: "must name at least one column",
            });
        }

        // A column is present if any record carries it; a record-level gap is
        // a missing value, not a schema violation.
        let missing: Vec<String> = self
            .required_columns
            .iter()
            .filter(|col| !records.iter().any(|r| r.get(col).is_some()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        let columns = self.collect_columns(records);

        let mut alive: Vec<usize> = (0..records.len()).collect();
        self.apply_missing_policy(&columns, &mut alive);
        let columns = fill_columns(&columns, &alive);

        if self.outliers == OutlierPolicy::IqrTrim {
            self.trim_outliers(&columns, &mut alive);
        }
        if alive.is_empty() {
            return Err(Error::EmptyResult(
                "all rows were removed during cleaning".into(),
            ));
        }

        let matrix = self.assemble(&columns, &alive)?;
        info!(
            rows_in = records.len(),
            rows_out = matrix.n_rows(),
            columns_out = matrix.n_columns(),
            "feature matrix built"
        );
        Ok(matrix)
    }

    /// Read every required column out of the records, deciding its kind.
    /// Any non-numeric, non-missing value makes the whole column categorical.
    fn collect_columns(&self, records: &[Record]) -> Vec<RawColumn> {
        self.required_columns
            .iter()
            .map(|name| {
                let cells: Vec<Option<&Value>> = records
                    .iter()
                    .map(|r| r.get(name).filter(|v| !v.is_missing()))
                    .collect();
                let is_numeric = cells
                    .iter()
                    .all(|c| c.is_none_or(|v| matches!(v, Value::Number(_))));
                if is_numeric {
                    RawColumn::Numeric {
                        name: name.clone(),
                        values: cells.iter().map(|c| c.and_then(|v| v.as_number())).collect(),
                    }
                } else {
                    RawColumn::Categorical {
                        name: name.clone(),
                        values: cells
                            .iter()
                            .map(|c| c.and_then(|v| v.as_category()))
                            .collect(),
                    }
                }
            })
            .collect()
    }

    fn apply_missing_policy(&self, columns: &[RawColumn], alive: &mut Vec<usize>) {
        let before = alive.len();
        match self.missing_values {
            MissingValuePolicy::DropRows => {
                alive.retain(|&row| columns.iter().all(|c| c.has_value(row)));
            }
            MissingValuePolicy::ImputeMeanMode => {
                // Rows whose numeric values are all missing are dropped before
                // any mean is computed; they would otherwise be pure invention.
                let has_numeric = columns
                    .iter()
                    .any(|c| matches!(c, RawColumn::Numeric { .. }));
                if has_numeric {
                    alive.retain(|&row| {
                        columns.iter().any(|c| match c {
                            RawColumn::Numeric { values, .. } => values[row].is_some(),
                            RawColumn::Categorical { .. } => false,
                        })
                    });
                }
            }
        }
        if alive.len() < before {
            debug!(
                dropped = before - alive.len(),
                policy = ?self.missing_values,
                "rows removed by missing-value policy"
            );
        }
    }

    /// Sequential IQR trim: each column's quantiles are computed over the
    /// rows still alive after earlier columns' trims, in required-column
    /// order. Not simultaneous multi-column filtering; the two produce
    /// different row counts.
    fn trim_outliers(&self, columns: &[FilledColumn], alive: &mut Vec<usize>) {
        for column in columns {
            let FilledColumn::Numeric { name, values, .. } = column else {
                continue;
            };
            if alive.len() < 2 {
                break;
            }
            let mut sorted: Vec<f64> = alive.iter().map(|&row| values[row]).collect();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let q1 = quantile(&sorted, 0.25);
            let q3 = quantile(&sorted, 0.75);
            let iqr = q3 - q1;
            let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
            let before = alive.len();
            alive.retain(|&row| values[row] >= lo && values[row] <= hi);
            if alive.len() < before {
                debug!(
                    column = name.as_str(),
                    dropped = before - alive.len(),
                    "rows trimmed as outliers"
                );
            }
        }
    }

    /// Scale numeric columns, one-hot encode categorical ones, and assemble
    /// the final matrix together with the per-column transform specs.
    fn assemble(&self, columns: &[FilledColumn], alive: &[usize]) -> Result<FeatureMatrix> {
        let mut specs = Vec::with_capacity(columns.len());
        let mut names = Vec::new();
        let mut encoded: Vec<Vec<f64>> = Vec::new();

        for column in columns {
            match column {
                FilledColumn::Numeric { name, values } => {
                    let observed: Vec<f64> = alive.iter().map(|&row| values[row]).collect();
                    let (center, spread) = match self.scaling {
                        ScalingPolicy::ZScore => {
                            let mean = observed.iter().sum::<f64>() / observed.len() as f64;
                            let var = observed
                                .iter()
                                .map(|v| (v - mean) * (v - mean))
                                .sum::<f64>()
                                / observed.len() as f64;
                            (mean, var.sqrt())
                        }
                        ScalingPolicy::MinMax => {
                            let min = observed.iter().cloned().fold(f64::INFINITY, f64::min);
                            let max = observed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                            (min, max - min)
                        }
                    };
                    let spec = NumericSpec {
                        name: name.clone(),
                        center,
                        spread,
                    };
                    names.push(name.clone());
                    encoded.push(observed.iter().map(|&v| spec.apply(v)).collect());
                    specs.push(ColumnSpec::Numeric(spec));
                }
                FilledColumn::Categorical { name, values } => {
                    // Category order is first encounter among surviving rows;
                    // the first category is dropped to avoid collinearity.
                    let mut categories: Vec<String> = Vec::new();
                    for &row in alive {
                        if !categories.contains(&values[row]) {
                            categories.push(values[row].clone());
                        }
                    }
                    for cat in categories.iter().skip(1) {
                        names.push(format!("{name}_{cat}"));
                        encoded.push(
                            alive
                                .iter()
                                .map(|&row| if values[row] == *cat { 1.0 } else { 0.0 })
                                .collect(),
                        );
                    }
                    specs.push(ColumnSpec::Categorical {
                        name: name.clone(),
                        categories,
                    });
                }
            }
        }

        let n_rows = alive.len();
        let n_cols = encoded.len();
        let mut data = Array2::zeros((n_rows, n_cols));
        for (c, column) in encoded.iter().enumerate() {
            for (r, &v) in column.iter().enumerate() {
                data[[r, c]] = v;
            }
        }

        Ok(FeatureMatrix {
            data,
            columns: names,
            source_rows: alive.to_vec(),
            specs,
        })
    }
}

/// A column as read from the records, values possibly missing.
enum RawColumn {
    Numeric {
        name: String,
        values: Vec<Option<f64>>,
    },
    Categorical {
        name: String,
        values: Vec<Option<String>>,
    },
}

impl RawColumn {
    fn has_value(&self, row: usize) -> bool {
        match self {
            RawColumn::Numeric { values, .. } => values[row].is_some(),
            RawColumn::Categorical { values, .. } => values[row].is_some(),
        }
    }
}

/// A column with every surviving row holding a concrete value.
enum FilledColumn {
    Numeric { name: String, values: Vec<f64> },
    Categorical { name: String, values: Vec<String> },
}

/// Resolve remaining missing values over the surviving rows: column mean for
/// numeric, most frequent value (first-encounter tie-break) for categorical.
/// Under `DropRows` no missing values survive and the fills are identities.
fn fill_columns(columns: &[RawColumn], alive: &[usize]) -> Vec<FilledColumn> {
    columns
        .iter()
        .map(|column| match column {
            RawColumn::Numeric { name, values } => {
                let observed: Vec<f64> = alive.iter().filter_map(|&row| values[row]).collect();
                let mean = if observed.is_empty() {
                    0.0
                } else {
                    observed.iter().sum::<f64>() / observed.len() as f64
                };
                FilledColumn::Numeric {
                    name: name.clone(),
                    values: values.iter().map(|v| v.unwrap_or(mean)).collect(),
                }
            }
            RawColumn::Categorical { name, values } => {
                let mode = most_frequent(values, alive).unwrap_or_default();
                FilledColumn::Categorical {
                    name: name.clone(),
                    values: values
                        .iter()
                        .map(|v| v.clone().unwrap_or_else(|| mode.clone()))
                        .collect(),
                }
            }
        })
        .collect()
}

/// Most frequent value among alive rows, ties broken by first encounter.
fn most_frequent(values: &[Option<String>], alive: &[usize]) -> Option<String> {
    let mut order: Vec<&String> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    for &row in alive {
        let Some(value) = &values[row] else { continue };
        match order.iter().position(|v| *v == value) {
            Some(i) => counts[i] += 1,
            None => {
                order.push(value);
                counts.push(1);
            }
        }
    }
    let best = counts.iter().enumerate().max_by(|a, b| {
        // Strict comparison keeps the earliest candidate on ties.
        a.1.cmp(b.1).then(b.0.cmp(&a.0))
    })?;
    Some(order[best.0].clone())
}

/// Quantile by linear interpolation over a sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Per-column transform retained for encoding fresh records.
#[derive(Debug, Clone)]
enum ColumnSpec {
    Numeric(NumericSpec),
    Categorical { name: String, categories: Vec<String> },
}

#[derive(Debug, Clone)]
struct NumericSpec {
    name: String,
    center: f64,
    spread: f64,
}

impl NumericSpec {
    fn apply(&self, v: f64) -> f64 {
        // Zero-spread columns carry no information; they become all zeros.
        if self.spread == 0.0 {
            0.0
        } else {
            (v - self.center) / self.spread
        }
    }
}

/// The model-ready numeric matrix.
///
/// Invariants: rectangular, no missing entries, column count and order fixed
/// at build time. Clusterers receive it by shared reference and never mutate
/// it; assignments derived from it are invalidated if it is rebuilt.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    data: Array2<f64>,
    columns: Vec<String>,
    source_rows: Vec<usize>,
    specs: Vec<ColumnSpec>,
}

impl FeatureMatrix {
    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of encoded columns.
    pub fn n_columns(&self) -> usize {
        self.data.ncols()
    }

    /// The numeric data.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Encoded column names, one-hot columns expanded as `column_category`.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Indices of the source records that survived cleaning, in matrix row
    /// order. Maps assignments back onto the caller's table.
    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    /// One matrix row.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    /// Encode a fresh record through the transforms fitted at build time.
    ///
    /// Every required column must carry a concrete value; offenders are
    /// reported together via [`Error::MissingColumns`]. An unseen category
    /// maps to the all-zero indicator row.
    pub fn encode(&self, record: &Record) -> Result<Array1<f64>> {
        let mut missing: Vec<String> = Vec::new();
        let mut out: Vec<f64> = Vec::with_capacity(self.n_columns());

        for spec in &self.specs {
            match spec {
                ColumnSpec::Numeric(spec) => {
                    match record.get(&spec.name).and_then(Value::as_number) {
                        Some(v) => out.push(spec.apply(v)),
                        None => missing.push(spec.name.clone()),
                    }
                }
                ColumnSpec::Categorical { name, categories } => {
                    match record.get(name).and_then(Value::as_category) {
                        Some(value) => {
                            let hit = categories.iter().position(|c| *c == value);
                            for i in 1..categories.len() {
                                out.push(if hit == Some(i) { 1.0 } else { 0.0 });
                            }
                        }
                        None => missing.push(name.clone()),
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }
        Ok(Array1::from_vec(out))
    }

    /// Shape and per-column descriptive statistics, for callers rendering a
    /// data preview.
    pub fn summary(&self) -> MatrixSummary {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let col = self.data.column(i);
                let n = col.len() as f64;
                ColumnSummary {
                    name: name.clone(),
                    min: col.iter().cloned().fold(f64::INFINITY, f64::min),
                    max: col.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                    mean: col.sum() / n,
                }
            })
            .collect();
        MatrixSummary {
            n_rows: self.n_rows(),
            n_columns: self.n_columns(),
            columns,
        }
    }
}

/// Descriptive statistics for a built matrix.
#[derive(Debug, Clone)]
pub struct MatrixSummary {
    /// Row count.
    pub n_rows: usize,
    /// Encoded column count.
    pub n_columns: usize,
    /// Per-column statistics in column order.
    pub columns: Vec<ColumnSummary>,
}

/// Min/max/mean of one encoded column.
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    /// Encoded column name.
    pub name: String,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Mean value.
    pub mean: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_records(values: &[&[f64]], names: &[&str]) -> Vec<Record> {
        values
            .iter()
            .map(|row| {
                let mut record = Record::new();
                for (name, &v) in names.iter().zip(row.iter()) {
                    record.set(*name, v);
                }
                record
            })
            .collect()
    }

    #[test]
    fn missing_columns_reported_together() {
        let records = vec![Record::new().with("age", 30.0)];
        let err = FeatureMatrixBuilder::new(["age", "balance", "duration"])
            .build(&records)
            .unwrap_err();
        assert_eq!(
            err,
            Error::MissingColumns(vec!["balance".into(), "duration".into()])
        );
    }

    #[test]
    fn empty_input_rejected() {
        let err = FeatureMatrixBuilder::new(["age"]).build(&[]).unwrap_err();
        assert_eq!(err, Error::EmptyInput);
    }

    #[test]
    fn drop_rows_removes_incomplete_rows() {
        let records = vec![
            Record::new().with("age", 30.0).with("balance", 100.0),
            Record::new().with("age", Value::Missing).with("balance", 200.0),
            Record::new().with("age", 50.0), // balance absent entirely
            Record::new().with("age", 40.0).with("balance", 300.0),
        ];
        let matrix = FeatureMatrixBuilder::new(["age", "balance"])
            .with_missing_values(MissingValuePolicy::DropRows)
            .build(&records)
            .unwrap();
        assert_eq!(matrix.source_rows(), &[0, 3]);
    }

    #[test]
    fn impute_fills_numeric_mean() {
        let records = vec![
            Record::new().with("age", 10.0).with("balance", 1.0),
            Record::new().with("age", Value::Missing).with("balance", 2.0),
            Record::new().with("age", 30.0).with("balance", 3.0),
        ];
        let matrix = FeatureMatrixBuilder::new(["age", "balance"])
            .build(&records)
            .unwrap();
        // Mean of observed ages is 20; after z-scoring, the imputed cell sits
        // exactly on the column mean.
        assert_eq!(matrix.source_rows(), &[0, 1, 2]);
        assert!(matrix.data()[[1, 0]].abs() < 1e-12);
    }

    #[test]
    fn impute_drops_rows_with_all_numeric_missing() {
        let records = vec![
            Record::new().with("age", 10.0).with("balance", 1.0),
            Record::new()
                .with("age", Value::Missing)
                .with("balance", Value::Missing),
            Record::new().with("age", 30.0).with("balance", 3.0),
        ];
        let matrix = FeatureMatrixBuilder::new(["age", "balance"])
            .build(&records)
            .unwrap();
        assert_eq!(matrix.source_rows(), &[0, 2]);
    }

    #[test]
    fn impute_mode_tie_breaks_on_first_encounter() {
        let records = vec![
            Record::new().with("age", 1.0).with("job", "teacher"),
            Record::new().with("age", 2.0).with("job", "nurse"),
            Record::new().with("age", 3.0).with("job", Value::Missing),
        ];
        let matrix = FeatureMatrixBuilder::new(["age", "job"])
            .build(&records)
            .unwrap();
        // Categories by first encounter: [teacher, nurse]; drop-first leaves
        // one indicator, job_nurse. The tie between teacher and nurse resolves
        // to teacher, so the imputed row encodes as 0.
        assert_eq!(matrix.columns(), ["age", "job_nurse"]);
        let job = matrix.data().column(1).to_vec();
        assert_eq!(job, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn iqr_trim_drops_the_far_value() {
        // Q1=2, Q3=4, IQR=2, fences [-1, 7]: 100 is outside.
        let records = numeric_records(
            &[&[1.0], &[2.0], &[3.0], &[4.0], &[100.0]],
            &["balance"],
        );
        let matrix = FeatureMatrixBuilder::new(["balance"])
            .with_outliers(OutlierPolicy::IqrTrim)
            .build(&records)
            .unwrap();
        assert_eq!(matrix.source_rows(), &[0, 1, 2, 3]);
    }

    #[test]
    fn iqr_trim_is_sequential_and_order_dependent() {
        let rows: &[&[f64]] = &[
            &[10.0, 5.0],
            &[11.0, 5.0],
            &[12.0, 5.0],
            &[13.0, 5.0],
            &[14.0, 5.0],
            &[1000.0, 60.0],
            &[12.0, 30.0],
        ];
        let records = numeric_records(rows, &["x", "y"]);

        // x first: row 5 goes with x; over the survivors y's IQR collapses to
        // zero and row 6 goes too.
        let matrix = FeatureMatrixBuilder::new(["x", "y"])
            .with_outliers(OutlierPolicy::IqrTrim)
            .build(&records)
            .unwrap();
        assert_eq!(matrix.source_rows(), &[0, 1, 2, 3, 4]);

        // y first: only row 5 is a y-outlier on the full column, and x no
        // longer flags anything afterwards. Same data, different survivors.
        let matrix = FeatureMatrixBuilder::new(["y", "x"])
            .with_outliers(OutlierPolicy::IqrTrim)
            .build(&records)
            .unwrap();
        assert_eq!(matrix.source_rows(), &[0, 1, 2, 3, 4, 6]);
    }

    #[test]
    fn zscore_zero_variance_column_becomes_zeros() {
        let records = numeric_records(&[&[5.0], &[5.0], &[5.0]], &["flat"]);
        let matrix = FeatureMatrixBuilder::new(["flat"]).build(&records).unwrap();
        assert!(matrix.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn minmax_maps_to_unit_interval() {
        let records = numeric_records(&[&[0.0], &[5.0], &[10.0]], &["v"]);
        let matrix = FeatureMatrixBuilder::new(["v"])
            .with_scaling(ScalingPolicy::MinMax)
            .build(&records)
            .unwrap();
        let col = matrix.data().column(0).to_vec();
        assert_eq!(col, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn one_hot_drops_first_category() {
        let records = vec![
            Record::new().with("job", "admin"),
            Record::new().with("job", "technician"),
            Record::new().with("job", "services"),
            Record::new().with("job", "admin"),
        ];
        let matrix = FeatureMatrixBuilder::new(["job"]).build(&records).unwrap();
        assert_eq!(matrix.columns(), ["job_technician", "job_services"]);
        // First-encountered category encodes as the all-zero row.
        assert_eq!(matrix.row(0).to_vec(), vec![0.0, 0.0]);
        assert_eq!(matrix.row(1).to_vec(), vec![1.0, 0.0]);
        assert_eq!(matrix.row(2).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn encode_maps_unseen_category_to_zeros() {
        let records = vec![
            Record::new().with("age", 20.0).with("job", "admin"),
            Record::new().with("age", 40.0).with("job", "technician"),
        ];
        let matrix = FeatureMatrixBuilder::new(["age", "job"])
            .build(&records)
            .unwrap();
        let encoded = matrix
            .encode(&Record::new().with("age", 30.0).with("job", "astronaut"))
            .unwrap();
        // age 30 z-scores to 0 (mean 30); the unseen job contributes zeros.
        assert_eq!(encoded.to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn encode_reports_missing_fields() {
        let records = vec![
            Record::new().with("age", 20.0).with("job", "admin"),
            Record::new().with("age", 40.0).with("job", "technician"),
        ];
        let matrix = FeatureMatrixBuilder::new(["age", "job"])
            .build(&records)
            .unwrap();
        let err = matrix.encode(&Record::new().with("age", 30.0)).unwrap_err();
        assert_eq!(err, Error::MissingColumns(vec!["job".into()]));
    }

    #[test]
    fn summary_reflects_shape_and_stats() {
        let records = numeric_records(&[&[0.0], &[10.0]], &["v"]);
        let matrix = FeatureMatrixBuilder::new(["v"])
            .with_scaling(ScalingPolicy::MinMax)
            .build(&records)
            .unwrap();
        let summary = matrix.summary();
        assert_eq!(summary.n_rows, 2);
        assert_eq!(summary.n_columns, 1);
        assert_eq!(summary.columns[0].min, 0.0);
        assert_eq!(summary.columns[0].max, 1.0);
        assert_eq!(summary.columns[0].mean, 0.5);
    }

    #[test]
    fn builder_leaves_caller_records_untouched() {
        let records = vec![
            Record::new().with("age", 1.0),
            Record::new().with("age", Value::Missing),
            Record::new().with("age", 3.0),
        ];
        let snapshot = records.clone();
        let _ = FeatureMatrixBuilder::new(["age"]).build(&records);
        assert_eq!(records, snapshot);
    }
}
