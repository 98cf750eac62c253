use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{round_to_tenth, validate_scores, SchoolLevel};
use super::error::{AssessmentError, ProfileConfigError};
use super::store::ProfileStore;

/// Shared per-factor variance (SD = 10) for every type.
const FACTOR_VARIANCE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeProbability {
    pub type_name: String,
    /// Posterior probability as a percentage.
    pub probability: f64,
}

/// Posterior over the latent types of one school level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub school_level: SchoolLevel,
    pub predicted_type: String,
    pub confidence: f64,
    pub probabilities: BTreeMap<String, f64>,
    pub rank: Vec<TypeProbability>,
}

/// Classify a score vector against every type configured for `level`.
///
/// Each factor is treated as an independent Gaussian around the type mean
/// with variance 100; the prior is added in log space and the posteriors are
/// normalised with log-sum-exp. Exact ties keep the store's type order.
///
/// Fails with a config error if any type of the level lacks a complete mean
/// vector, rather than comparing types backed by unequal evidence.
pub fn classify(
    store: &ProfileStore,
    level: SchoolLevel,
    scores: &[f64],
) -> Result<Classification, AssessmentError> {
    validate_scores(scores)?;
    let types = store.types(level)?;
    if types.is_empty() {
        return Err(ProfileConfigError::NoTypes(level).into());
    }

    let mut log_posteriors = Vec::with_capacity(types.len());
    for profile in types {
        let means = profile
            .complete_means()
            .ok_or_else(|| ProfileConfigError::IncompleteMeans {
                level,
                type_name: profile.name.clone(),
            })?;

        if !(profile.prior.is_finite() && profile.prior > 0.0) {
            return Err(ProfileConfigError::InvalidPrior {
                level,
                type_name: profile.name.clone(),
                prior: profile.prior,
            }
            .into());
        }

        log_posteriors.push(log_likelihood(scores, means) + profile.prior.ln());
    }

    let mut rank: Vec<TypeProbability> = types
        .iter()
        .zip(normalize_to_percentages(&log_posteriors))
        .map(|(profile, probability)| TypeProbability {
            type_name: profile.name.clone(),
            probability,
        })
        .collect();

    // sort_by is stable: equal probabilities stay in store order.
    rank.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
    });

    let top = rank
        .first()
        .cloned()
        .ok_or(ProfileConfigError::NoTypes(level))?;
    let probabilities = rank
        .iter()
        .map(|entry| (entry.type_name.clone(), entry.probability))
        .collect();

    debug!(
        %level,
        predicted_type = %top.type_name,
        probability = top.probability,
        "classified score vector"
    );

    Ok(Classification {
        school_level: level,
        predicted_type: top.type_name,
        confidence: round_to_tenth(top.probability),
        probabilities,
        rank,
    })
}

pub(crate) fn log_likelihood(scores: &[f64], means: &[f64]) -> f64 {
    let normalizer = (2.0 * PI * FACTOR_VARIANCE).ln();
    scores
        .iter()
        .zip(means)
        .map(|(score, mean)| -0.5 * ((score - mean).powi(2) / FACTOR_VARIANCE + normalizer))
        .sum()
}

fn normalize_to_percentages(log_values: &[f64]) -> Vec<f64> {
    let max = log_values
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let exponentiated: Vec<f64> = log_values.iter().map(|value| (value - max).exp()).collect();
    let total: f64 = exponentiated.iter().sum();

    exponentiated
        .into_iter()
        .map(|value| value / total * 100.0)
        .collect()
}
