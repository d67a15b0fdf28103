use thiserror::Error;

/// Errors from the statistical operations.
///
/// These are the failures callers are expected to match on; everything
/// else (I/O, parsing) is reported through [`anyhow`] at the application
/// layer.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A statistical operation received a sample too small to be defined.
    #[error("sample of size {len} is too small (need at least 2 values)")]
    InsufficientSample { len: usize },

    /// An explicitly requested group has no matching records.
    #[error("group {key:?} has no matching records")]
    EmptyGroup { key: String },

    /// The dataset is missing required columns.
    #[error("dataset is missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A distribution parameter was out of range.
    #[error("invalid distribution parameter: {0}")]
    Distribution(String),
}
