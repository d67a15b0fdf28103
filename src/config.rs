use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Analysis configuration parameters.
///
/// Loaded from a TOML file and validated before use; every field has a
/// default so the file is optional. See [`Config::from_file`] for loading.
///
/// The significance level of the hypothesis test is a fixed constant,
/// not a configuration parameter.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Confidence levels for the interval estimates.
    pub confidence_levels: Vec<f64>,

    /// Central-limit-theorem demonstration parameters.
    pub clt: CltConfig,
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CltConfig {
    /// Resample sizes, in the order they are reported.
    pub sample_sizes: Vec<usize>,
    /// Number of resamples drawn per sample size.
    pub repetitions: usize,
    /// Seed for the resampling generator; drawn from OS entropy when unset.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confidence_levels: vec![0.90, 0.95, 0.99],
            clt: CltConfig::default(),
        }
    }
}

impl Default for CltConfig {
    fn default() -> Self {
        Self {
            sample_sizes: vec![10, 30, 50, 100, 200, 500],
            repetitions: 1000,
            seed: None,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config =
            toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.confidence_levels.is_empty() {
            bail!("at least one confidence level is required");
        }
        for &level in &self.confidence_levels {
            check_num(level, 0.5..1.0).context("invalid confidence level")?;
        }

        if self.clt.sample_sizes.is_empty() {
            bail!("at least one CLT sample size is required");
        }
        for &size in &self.clt.sample_sizes {
            check_num(size, 1..1_000_000).context("invalid CLT sample size")?;
        }
        check_num(self.clt.repetitions, 2..1_000_000)
            .context("invalid number of CLT repetitions")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_levels() {
        let config = Config {
            confidence_levels: vec![1.5],
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            confidence_levels: Vec::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_clt_parameters() {
        let mut config = Config::default();
        config.clt.repetitions = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.clt.sample_sizes = vec![0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            "confidence_levels = [0.95]\n\n[clt]\nrepetitions = 200\nseed = 42\n",
        )
        .unwrap();
        assert_eq!(config.confidence_levels, vec![0.95]);
        assert_eq!(config.clt.repetitions, 200);
        assert_eq!(config.clt.seed, Some(42));
        assert_eq!(config.clt.sample_sizes, CltConfig::default().sample_sizes);
    }
}
