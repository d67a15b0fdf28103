//! Derived statistics over the loaded table.
//!
//! Group aggregates, IQR outlier bounds, the two-sample t-test,
//! confidence intervals and the central-limit-theorem resampling
//! demonstration. Every function is a pure function of its inputs and
//! returns a plain serializable value.

use crate::dataset::{Dataset, GroupField, NumericField};
use crate::error::StatsError;
use crate::stats::{SampleSummary, compute_mean, compute_percentile, compute_var};
use rand::Rng;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;

/// Fixed significance level for the hypothesis test.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Per-group {mean, sum, count} of the purchase amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub mean: f64,
    pub sum: f64,
    pub count: usize,
}

/// Aggregate purchase amounts grouped by one or two categorical fields.
///
/// Keys are canonical labels (two-field keys joined with `" / "`), in
/// ascending lexical order. Groups with zero members are omitted.
pub fn group_aggregates(
    dataset: &Dataset,
    fields: &[GroupField],
) -> BTreeMap<String, Aggregate> {
    group_aggregates_of(dataset, fields, NumericField::Purchase)
}

/// Like [`group_aggregates`], but over an explicitly chosen numeric field.
pub fn group_aggregates_of(
    dataset: &Dataset,
    fields: &[GroupField],
    numeric: NumericField,
) -> BTreeMap<String, Aggregate> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    let values = numeric.values(dataset);
    for (record, value) in dataset.records().iter().zip(values) {
        let key = fields
            .iter()
            .map(|field| field.key_of(record))
            .collect::<Vec<_>>()
            .join(" / ");
        let entry = sums.entry(key).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(key, (sum, count))| {
            let aggregate = Aggregate {
                mean: sum / count as f64,
                sum,
                count,
            };
            (key, aggregate)
        })
        .collect()
}

/// Aggregate for a single explicitly requested group.
///
/// Unlike [`group_aggregates`], which silently omits empty groups, a
/// direct query for a group with no records fails loudly.
pub fn group_aggregate(
    dataset: &Dataset,
    field: GroupField,
    key: &str,
) -> Result<Aggregate, StatsError> {
    group_aggregates(dataset, &[field])
        .remove(key)
        .ok_or_else(|| StatsError::EmptyGroup {
            key: format!("{}={key}", field.name()),
        })
}

/// Severity of an outlier fraction, used by the automated recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierSeverity {
    Low,
    Moderate,
    High,
}

impl OutlierSeverity {
    /// Classify an outlier percentage: <1% low, 1-5% moderate, >5% high.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 1.0 {
            Self::Low
        } else if percentage < 5.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

/// IQR outlier bounds for one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    pub outlier_count: usize,
    pub total_count: usize,
    /// Outlier fraction in percent, rounded to 2 decimal places.
    pub percentage: f64,
    pub severity: OutlierSeverity,
}

/// Compute IQR outlier bounds for a numeric column.
///
/// Quartiles use linear interpolation on the sorted values; a value
/// strictly outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]` counts as an outlier.
pub fn outlier_bounds(values: &[f64]) -> Result<OutlierReport, StatsError> {
    if values.len() < 2 {
        return Err(StatsError::InsufficientSample { len: values.len() });
    }

    let q1 = compute_percentile(values, 25.0);
    let q3 = compute_percentile(values, 75.0);
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;

    let outlier_count = values.iter().filter(|&&v| v < lower || v > upper).count();
    let raw_percentage = outlier_count as f64 / values.len() as f64 * 100.0;

    Ok(OutlierReport {
        q1,
        q3,
        iqr,
        lower,
        upper,
        outlier_count,
        total_count: values.len(),
        percentage: (raw_percentage * 100.0).round() / 100.0,
        severity: OutlierSeverity::from_percentage(raw_percentage),
    })
}

/// Result of the two-sample hypothesis test.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    /// Null hypothesis of equal means rejected at the 0.05 level.
    pub reject: bool,
}

/// Independent two-sample t-test with pooled (equal) variance.
///
/// The pooled Student's form matches the source system's library default;
/// Welch's test would report different p-values.
///
/// Zero pooled variance is handled without NaN: identical constant
/// samples give p = 1.0, constant samples with distinct means give p = 0.
pub fn t_test(sample_a: &[f64], sample_b: &[f64]) -> Result<TestResult, StatsError> {
    if sample_a.len() < 2 {
        return Err(StatsError::InsufficientSample { len: sample_a.len() });
    }
    if sample_b.len() < 2 {
        return Err(StatsError::InsufficientSample { len: sample_b.len() });
    }

    let n_a = sample_a.len() as f64;
    let n_b = sample_b.len() as f64;
    let mean_a = compute_mean(sample_a);
    let mean_b = compute_mean(sample_b);
    let var_a = compute_var(sample_a);
    let var_b = compute_var(sample_b);

    let df = n_a + n_b - 2.0;
    let pooled_var = ((n_a - 1.0) * var_a + (n_b - 1.0) * var_b) / df;
    let std_err = (pooled_var * (1.0 / n_a + 1.0 / n_b)).sqrt();

    if std_err == 0.0 {
        // Both samples are constant: no detectable difference when the
        // means agree, certain difference otherwise.
        return Ok(if mean_a == mean_b {
            TestResult {
                statistic: 0.0,
                p_value: 1.0,
                reject: false,
            }
        } else {
            TestResult {
                statistic: (mean_a - mean_b).signum() * f64::INFINITY,
                p_value: 0.0,
                reject: true,
            }
        });
    }

    let statistic = (mean_a - mean_b) / std_err;
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|err| StatsError::Distribution(err.to_string()))?;
    let p_value = 2.0 * dist.cdf(-statistic.abs());

    Ok(TestResult {
        statistic,
        p_value,
        reject: p_value < SIGNIFICANCE_LEVEL,
    })
}

/// Confidence interval for a population mean.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
}

/// Interval for the mean of the summarized sample at the given level.
///
/// Takes a precomputed [`SampleSummary`] so that several levels reuse
/// the same mean and standard error.
pub fn confidence_interval(
    summary: &SampleSummary,
    level: f64,
) -> Result<ConfidenceInterval, StatsError> {
    if !(0.0..1.0).contains(&level) || level == 0.0 {
        return Err(StatsError::Distribution(format!(
            "confidence level must be in (0, 1), but is {level}"
        )));
    }

    let df = (summary.count - 1) as f64;
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|err| StatsError::Distribution(err.to_string()))?;
    let quantile = dist.inverse_cdf(1.0 - (1.0 - level) / 2.0);
    let margin = quantile * summary.stderr;

    Ok(ConfidenceInterval {
        lower: summary.mean - margin,
        upper: summary.mean + margin,
        level,
    })
}

/// Two intervals overlap iff neither lies entirely below the other.
pub fn intervals_overlap(a: &ConfidenceInterval, b: &ConfidenceInterval) -> bool {
    !(a.upper < b.lower || b.upper < a.lower)
}

/// Distribution of resampled means for one sample size.
#[derive(Debug, Clone, Serialize)]
pub struct SamplingDistribution {
    pub sample_size: usize,
    /// The full sequence of resampled means, for histogram rendering.
    pub means: Vec<f64>,
    pub mean_of_means: f64,
    pub std_dev_of_means: f64,
}

/// Central-limit-theorem resampling demonstration.
///
/// For each sample size, draws `repetitions` samples of that size with
/// replacement and records the mean of each draw. The generator is
/// supplied by the caller so runs are reproducible.
pub fn clt_simulation<R: Rng>(
    sample: &[f64],
    sample_sizes: &[usize],
    repetitions: usize,
    rng: &mut R,
) -> Result<Vec<SamplingDistribution>, StatsError> {
    if sample.len() < 2 {
        return Err(StatsError::InsufficientSample { len: sample.len() });
    }
    if repetitions < 2 {
        return Err(StatsError::InsufficientSample { len: repetitions });
    }

    let mut distributions = Vec::with_capacity(sample_sizes.len());
    for &size in sample_sizes {
        if size == 0 {
            return Err(StatsError::InsufficientSample { len: 0 });
        }

        let mut means = Vec::with_capacity(repetitions);
        for _ in 0..repetitions {
            let sum: f64 = (0..size)
                .map(|_| sample[rng.random_range(0..sample.len())])
                .sum();
            means.push(sum / size as f64);
        }

        distributions.push(SamplingDistribution {
            sample_size: size,
            mean_of_means: compute_mean(&means),
            std_dev_of_means: compute_var(&means).sqrt(),
            means,
        });
    }

    Ok(distributions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn severity_thresholds() {
        assert_eq!(OutlierSeverity::from_percentage(0.99), OutlierSeverity::Low);
        assert_eq!(OutlierSeverity::from_percentage(1.0), OutlierSeverity::Moderate);
        assert_eq!(OutlierSeverity::from_percentage(4.99), OutlierSeverity::Moderate);
        assert_eq!(OutlierSeverity::from_percentage(5.01), OutlierSeverity::High);
    }

    #[test]
    fn outlier_bounds_flag_extremes() {
        let mut values: Vec<f64> = (1..=99).map(|x| x as f64).collect();
        values.push(1000.0);
        let report = outlier_bounds(&values).unwrap();

        assert_eq!(report.outlier_count, 1);
        assert_eq!(report.total_count, 100);
        assert!((report.percentage - 1.0).abs() < 1e-12);
        assert_eq!(report.severity, OutlierSeverity::Moderate);
    }

    #[test]
    fn t_test_rejects_small_samples() {
        assert!(matches!(
            t_test(&[1.0], &[1.0, 2.0]),
            Err(StatsError::InsufficientSample { len: 1 })
        ));
        assert!(matches!(
            t_test(&[1.0, 2.0], &[]),
            Err(StatsError::InsufficientSample { len: 0 })
        ));
    }

    #[test]
    fn t_test_zero_variance_identical() {
        let sample = vec![5.0; 10];
        let result = t_test(&sample, &sample).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert!(!result.reject);
    }

    #[test]
    fn t_test_zero_variance_distinct() {
        let a = vec![100.0; 10];
        let b = vec![200.0; 10];
        let result = t_test(&a, &b).unwrap();
        assert_eq!(result.p_value, 0.0);
        assert!(result.reject);
    }

    #[test]
    fn interval_rejects_bad_level() {
        let summary = SampleSummary::from_sample(&[1.0, 2.0, 3.0]).unwrap();
        assert!(confidence_interval(&summary, 0.0).is_err());
        assert!(confidence_interval(&summary, 1.0).is_err());
        assert!(confidence_interval(&summary, 0.95).is_ok());
    }

    #[test]
    fn clt_simulation_is_reproducible() {
        let sample: Vec<f64> = (1..=50).map(|x| x as f64).collect();
        let sizes = [10, 30];

        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let first = clt_simulation(&sample, &sizes, 100, &mut rng).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let second = clt_simulation(&sample, &sizes, 100, &mut rng).unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].means, second[0].means);
        assert_eq!(first[1].means, second[1].means);
    }
}
