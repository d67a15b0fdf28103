use crate::error::StatsError;
use serde::Serialize;

pub fn compute_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with `n - 1` degrees of freedom.
pub fn compute_var(values: &[f64]) -> f64 {
    let n_vals = values.len();
    if n_vals < 2 {
        return f64::NAN;
    }
    let mean = compute_mean(values);
    values.iter().map(|&val| (val - mean).powi(2)).sum::<f64>() / (n_vals - 1) as f64
}

/// Skewness (adjusted Fisher-Pearson, matching pandas `skew`).
pub fn compute_skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }
    let mean = compute_mean(values);
    let std_dev = compute_var(values).sqrt();
    if std_dev == 0.0 {
        return 0.0;
    }
    let n = n as f64;
    let m3 = values
        .iter()
        .map(|&val| ((val - mean) / std_dev).powi(3))
        .sum::<f64>();
    m3 * n / ((n - 1.0) * (n - 2.0))
}

/// Percentile via linear interpolation between nearest ranks.
///
/// `percentile` is in `[0, 100]`. Matches the interpolation used by the
/// usual quantile implementations, so Q1/Q3 line up with reference values.
pub fn compute_percentile(values: &[f64], percentile: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    if values.len() == 1 {
        return values[0];
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(sorted.len() - 1);
    let fraction = rank - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}

/// Summary of one numeric sample.
///
/// Mean and standard error are computed once so that callers deriving
/// several confidence intervals from the same sample reuse them.
#[derive(Debug, Clone, Serialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub stderr: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleSummary {
    pub fn from_sample(values: &[f64]) -> Result<Self, StatsError> {
        let count = values.len();
        if count < 2 {
            return Err(StatsError::InsufficientSample { len: count });
        }

        let mean = compute_mean(values);
        let std_dev = compute_var(values).sqrt();
        let stderr = std_dev / (count as f64).sqrt();

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            count,
            mean,
            std_dev,
            stderr,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_var() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((compute_mean(&values) - 30.0).abs() < 1e-12);
        assert!((compute_var(&values) - 250.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_sizes() {
        assert!(compute_mean(&[]).is_nan());
        assert!(compute_var(&[1.0]).is_nan());
        assert!(matches!(
            SampleSummary::from_sample(&[1.0]),
            Err(StatsError::InsufficientSample { len: 1 })
        ));
    }

    #[test]
    fn percentile_interpolates() {
        let values: Vec<f64> = (1..=5).map(|x| x as f64).collect();
        assert!((compute_percentile(&values, 50.0) - 3.0).abs() < 1e-12);
        assert!((compute_percentile(&values, 25.0) - 2.0).abs() < 1e-12);
        assert!((compute_percentile(&values, 10.0) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn summary_reuses_moments() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        let summary = SampleSummary::from_sample(&values).unwrap();
        assert_eq!(summary.count, 5);
        assert!((summary.mean - 30.0).abs() < 1e-12);
        assert!((summary.stderr - (250.0f64.sqrt() / 5.0f64.sqrt())).abs() < 1e-12);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 50.0);
    }

    #[test]
    fn skewness_of_symmetric_sample_is_zero() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(compute_skewness(&values).abs() < 1e-12);
    }
}
