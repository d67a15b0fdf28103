//! Report rendering.
//!
//! The dashboard's section selection is an explicit [`View`] value chosen
//! by the caller; [`render`] is a pure function from the loaded table,
//! the configuration and that view to a JSON report. There is no ambient
//! current-section state.

use crate::analysis::{
    self, OutlierSeverity, SIGNIFICANCE_LEVEL, clt_simulation, confidence_interval,
    group_aggregates, intervals_overlap, outlier_bounds, t_test,
};
use crate::config::Config;
use crate::dataset::{Dataset, GroupField, NumericField};
use crate::error::StatsError;
use crate::model::{AgeBracket, Gender};
use crate::stats::{SampleSummary, compute_percentile, compute_skewness};
use anyhow::{Context, Result};
use rand::Rng;
use serde_json::{Value, json};

/// One section of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    DataQuality,
    Gender,
    Age,
    City,
    Occupation,
    Statistics,
    Recommendations,
}

/// Render one view of the dataset as a JSON report.
///
/// The generator is only consumed by the statistical-analysis view (for
/// the CLT resampling demonstration); passing a seeded generator makes
/// the whole report deterministic.
pub fn render<R: Rng>(
    view: View,
    dataset: &Dataset,
    config: &Config,
    rng: &mut R,
) -> Result<Value> {
    if dataset.len() < 2 {
        return Err(StatsError::InsufficientSample { len: dataset.len() }.into());
    }

    match view {
        View::Overview => render_overview(dataset),
        View::DataQuality => render_data_quality(dataset),
        View::Gender => render_gender(dataset),
        View::Age => Ok(render_age(dataset)),
        View::City => Ok(render_city(dataset)),
        View::Occupation => Ok(render_occupation(dataset)),
        View::Statistics => render_statistics(dataset, config, rng),
        View::Recommendations => render_recommendations(dataset),
    }
}

fn render_overview(dataset: &Dataset) -> Result<Value> {
    let purchases = dataset.purchases();
    let summary = SampleSummary::from_sample(&purchases)?;
    let by_gender = group_aggregates(dataset, &[GroupField::Gender]);

    Ok(json!({
        "section": "overview",
        "records": dataset.len(),
        "total_purchase": purchases.iter().sum::<f64>(),
        "mean_purchase": summary.mean,
        "distinct_customers": dataset.distinct_customers(),
        "distinct_products": dataset.distinct_products(),
        "records_by_gender": by_gender,
        "preview": dataset.records().iter().take(5).collect::<Vec<_>>(),
    }))
}

fn skewness_label(skew: f64) -> &'static str {
    if skew.abs() < 0.5 {
        "normal"
    } else if skew.abs() < 1.0 {
        "moderately skewed"
    } else {
        "highly skewed"
    }
}

fn render_data_quality(dataset: &Dataset) -> Result<Value> {
    let mut columns = Vec::new();
    for field in NumericField::ALL {
        let values = field.values(dataset);
        let summary = SampleSummary::from_sample(&values)
            .with_context(|| format!("failed to summarize column {}", field.name()))?;
        let outliers = outlier_bounds(&values)
            .with_context(|| format!("failed to screen column {}", field.name()))?;
        let skew = compute_skewness(&values);

        columns.push(json!({
            "column": field.name(),
            "summary": {
                "mean": summary.mean,
                "median": compute_percentile(&values, 50.0),
                "std_dev": summary.std_dev,
                "min": summary.min,
                "max": summary.max,
                "skewness": skew,
                "skewness_label": skewness_label(skew),
            },
            "outliers": outliers,
        }))
    }

    Ok(json!({
        "section": "data_quality",
        "columns": columns,
    }))
}

fn render_gender(dataset: &Dataset) -> Result<Value> {
    let by_gender = group_aggregates(dataset, &[GroupField::Gender]);

    let difference_percent = match (
        by_gender.get(&Gender::Female.to_string()),
        by_gender.get(&Gender::Male.to_string()),
    ) {
        (Some(female), Some(male)) => {
            Some((female.mean - male.mean) / male.mean * 100.0)
        }
        _ => None,
    };

    Ok(json!({
        "section": "gender",
        "by_gender": by_gender,
        "female_vs_male_mean_percent": difference_percent,
        "by_age_and_gender": group_aggregates(dataset, &[GroupField::Age, GroupField::Gender]),
        "by_city_and_gender": group_aggregates(dataset, &[GroupField::City, GroupField::Gender]),
    }))
}

fn render_age(dataset: &Dataset) -> Value {
    let by_age = group_aggregates(dataset, &[GroupField::Age]);
    let life_stages: Vec<Value> = AgeBracket::ALL
        .iter()
        .filter_map(|age| {
            by_age.get(&age.to_string()).map(|aggregate| {
                json!({
                    "bracket": age.to_string(),
                    "life_stage": age.life_stage(),
                    "aggregate": aggregate,
                })
            })
        })
        .collect();

    json!({
        "section": "age",
        "by_age": by_age,
        "life_stages": life_stages,
    })
}

fn render_city(dataset: &Dataset) -> Value {
    json!({
        "section": "city",
        "by_city": group_aggregates(dataset, &[GroupField::City]),
        "by_stay_years": group_aggregates(dataset, &[GroupField::StayYears]),
        "by_city_and_stay_years":
            group_aggregates(dataset, &[GroupField::City, GroupField::StayYears]),
    })
}

fn render_occupation(dataset: &Dataset) -> Value {
    let by_occupation = group_aggregates(dataset, &[GroupField::Occupation]);

    // Top occupations by mean spend, ties broken by the ascending key.
    let mut ranked: Vec<(&String, &analysis::Aggregate)> = by_occupation.iter().collect();
    ranked.sort_by(|a, b| b.1.mean.total_cmp(&a.1.mean).then(a.0.cmp(b.0)));
    let top: Vec<Value> = ranked
        .into_iter()
        .take(10)
        .map(|(key, aggregate)| json!({ "occupation": key, "aggregate": aggregate }))
        .collect();

    json!({
        "section": "occupation",
        "by_occupation": by_occupation,
        "top_by_mean": top,
    })
}

fn comparison_report(
    label_a: &str,
    sample_a: &[f64],
    label_b: &str,
    sample_b: &[f64],
    levels: &[f64],
) -> Result<Value> {
    let summary_a = SampleSummary::from_sample(sample_a)?;
    let summary_b = SampleSummary::from_sample(sample_b)?;
    let test = t_test(sample_a, sample_b)?;

    let mut intervals = Vec::new();
    for &level in levels {
        intervals.push(json!({
            "level": level,
            label_a: confidence_interval(&summary_a, level)?,
            label_b: confidence_interval(&summary_b, level)?,
        }));
    }

    // The interval heuristic may disagree with the test; both verdicts
    // are reported as-is.
    let ci_a = confidence_interval(&summary_a, 0.95)?;
    let ci_b = confidence_interval(&summary_b, 0.95)?;

    Ok(json!({
        "groups": { label_a: summary_a, label_b: summary_b },
        "t_test": test,
        "significance_level": SIGNIFICANCE_LEVEL,
        "confidence_intervals": intervals,
        "intervals_overlap_95": intervals_overlap(&ci_a, &ci_b),
    }))
}

fn render_statistics<R: Rng>(dataset: &Dataset, config: &Config, rng: &mut R) -> Result<Value> {
    let male = dataset.purchases_by_gender(Gender::Male);
    let female = dataset.purchases_by_gender(Gender::Female);
    let married = dataset.purchases_by_marital(true);
    let unmarried = dataset.purchases_by_marital(false);

    let gender = comparison_report("male", &male, "female", &female, &config.confidence_levels)
        .context("failed to compare gender samples")?;
    let marital = comparison_report("married", &married, "unmarried", &unmarried, &[0.95])
        .context("failed to compare marital-status samples")?;

    let mut age_intervals = Vec::new();
    for age in AgeBracket::ALL {
        let purchases = dataset.purchases_by_age(age);
        // Brackets absent from the dataset are omitted rather than
        // reported with degenerate statistics.
        if purchases.len() < 2 {
            continue;
        }
        let summary = SampleSummary::from_sample(&purchases)?;
        age_intervals.push(json!({
            "bracket": age.to_string(),
            "life_stage": age.life_stage(),
            "summary": summary,
            "interval_95": confidence_interval(&summary, 0.95)?,
        }));
    }

    let clt = json!({
        "repetitions": config.clt.repetitions,
        "male": clt_simulation(&male, &config.clt.sample_sizes, config.clt.repetitions, rng)
            .context("failed to resample male purchases")?,
        "female": clt_simulation(&female, &config.clt.sample_sizes, config.clt.repetitions, rng)
            .context("failed to resample female purchases")?,
    });

    Ok(json!({
        "section": "statistics",
        "gender": gender,
        "marital_status": marital,
        "age_intervals": age_intervals,
        "clt": clt,
    }))
}

fn render_recommendations(dataset: &Dataset) -> Result<Value> {
    let by_gender = group_aggregates(dataset, &[GroupField::Gender]);
    let by_marital = group_aggregates(dataset, &[GroupField::MaritalStatus]);
    let by_age = group_aggregates(dataset, &[GroupField::Age]);

    let mut recommendations = Vec::new();

    if let Some((key, aggregate)) = best_by_mean(&by_gender) {
        recommendations.push(format!(
            "Target {} customers: higher spending potential (average ${:.2} per purchase).",
            key.to_lowercase(),
            aggregate.mean
        ));
    }

    if let Some((key, aggregate)) = best_by_mean(&by_marital) {
        recommendations.push(format!(
            "Target {} customers with dedicated promotions (average ${:.2} per purchase).",
            key.to_lowercase(),
            aggregate.mean
        ));
    }

    if let Some((key, aggregate)) = best_by_mean(&by_age) {
        let life_stage = AgeBracket::ALL
            .iter()
            .find(|age| age.to_string() == *key)
            .map(|age| age.life_stage())
            .unwrap_or("Unknown");
        recommendations.push(format!(
            "Develop products for the {key} age group ({life_stage}), the highest-spending bracket at ${:.2} on average.",
            aggregate.mean
        ));
    }

    let purchases = dataset.purchases();
    let outliers = outlier_bounds(&purchases)?;
    match outliers.severity {
        OutlierSeverity::Low => {}
        OutlierSeverity::Moderate => recommendations.push(format!(
            "Review purchase outliers ({:.2}% of records outside the IQR bounds) before drawing pricing conclusions.",
            outliers.percentage
        )),
        OutlierSeverity::High => recommendations.push(format!(
            "High purchase outlier rate ({:.2}% of records): segment premium transactions separately.",
            outliers.percentage
        )),
    }

    Ok(json!({
        "section": "recommendations",
        "recommendations": recommendations,
        "purchase_outliers": outliers,
    }))
}

fn best_by_mean(
    aggregates: &std::collections::BTreeMap<String, analysis::Aggregate>,
) -> Option<(&String, &analysis::Aggregate)> {
    aggregates
        .iter()
        .max_by(|a, b| a.1.mean.total_cmp(&b.1.mean).then(b.0.cmp(a.0)))
}
