//! Descriptive and inferential statistics over a retail transaction table.
//!
//! The dataset is loaded once into memory ([`dataset::Dataset`]); every
//! analysis is a pure function of it returning plain serializable values,
//! so any presentation layer can render the results. The bundled binary
//! renders them as JSON.

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
pub mod report;
pub mod stats;

pub use analysis::{
    Aggregate, ConfidenceInterval, OutlierReport, OutlierSeverity, SamplingDistribution,
    TestResult, clt_simulation, confidence_interval, group_aggregate, group_aggregates,
    group_aggregates_of, intervals_overlap, outlier_bounds, t_test,
};
pub use dataset::{Dataset, GroupField, NumericField};
pub use error::StatsError;
pub use stats::SampleSummary;
