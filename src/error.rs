use thiserror::Error;

/// Result alias for `cohort`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the segmentation and recommendation engine.
///
/// Nothing in this crate retries automatically: clustering is deterministic
/// given its seed, so a retry with identical inputs cannot succeed where the
/// first call failed. Callers decide whether to retry with other parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Input table or matrix was empty.
    #[error("empty input")]
    EmptyInput,

    /// Required columns are absent from the input. Carries every offending
    /// column name so the caller can surface them verbatim.
    #[error("required columns missing: {0:?}")]
    MissingColumns(Vec<String>),

    /// Invalid algorithm parameter, checked before any computation starts.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("cannot create {requested} clusters from {n_rows} rows")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of rows in the matrix.
        n_rows: usize,
    },

    /// Row counts or dimensionality disagree between two inputs.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// A filter or lookup legitimately matched nothing. Recoverable: the
    /// caller may treat this as an empty state or retry with another filter.
    #[error("no results matched: {0}")]
    EmptyResult(String),

    /// An operation that requires a prior successful run was invoked out of
    /// order. Fatal to that call only.
    #[error("operation requires a completed segmentation run: {0}")]
    NotReady(&'static str),
}
