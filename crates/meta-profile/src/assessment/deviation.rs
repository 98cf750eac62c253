use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::catalog::{FactorCatalog, FACTOR_COUNT};
use super::domain::{round_to_tenth, validate_scores, SchoolLevel};
use super::error::{AssessmentError, InputError};
use super::store::ProfileStore;

pub const DEFAULT_TOP_N: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationDirection {
    Favorable,
    Unfavorable,
}

impl DeviationDirection {
    pub fn label(self) -> &'static str {
        match self {
            DeviationDirection::Favorable => "양호",
            DeviationDirection::Unfavorable => "주의",
        }
    }
}

/// How far one factor sits from the assigned type's mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorDeviation {
    pub index: usize,
    pub factor: String,
    pub score: f64,
    pub type_mean: f64,
    pub diff: f64,
    pub abs_diff: f64,
    pub direction: DeviationDirection,
}

/// The `top_n` factors where the student differs most from `type_name`'s mean.
pub fn analyze_deviations(
    catalog: &FactorCatalog,
    store: &ProfileStore,
    level: SchoolLevel,
    type_name: &str,
    scores: &[f64],
    top_n: usize,
) -> Result<Vec<FactorDeviation>, AssessmentError> {
    validate_scores(scores)?;
    let profile = store.find_type(level, type_name)?;
    let means = profile
        .complete_means()
        .ok_or_else(|| InputError::TypeMeansUnavailable {
            type_name: profile.name.clone(),
        })?;

    Ok(deviations_against(catalog, scores, means, top_n))
}

pub(crate) fn deviations_against(
    catalog: &FactorCatalog,
    scores: &[f64],
    means: &[f64],
    top_n: usize,
) -> Vec<FactorDeviation> {
    let mut entries: Vec<(f64, FactorDeviation)> = catalog
        .factors()
        .iter()
        .zip(scores.iter().zip(means))
        .map(|(factor, (&score, &mean))| {
            let raw = score - mean;
            let direction = if factor.polarity.is_favorable(raw) {
                DeviationDirection::Favorable
            } else {
                DeviationDirection::Unfavorable
            };

            let deviation = FactorDeviation {
                index: factor.index,
                factor: factor.name.to_string(),
                score,
                type_mean: round_to_tenth(mean),
                diff: round_to_tenth(raw),
                abs_diff: round_to_tenth(raw.abs()),
                direction,
            };
            (raw.abs(), deviation)
        })
        .collect();

    entries.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    entries
        .into_iter()
        .take(top_n.min(FACTOR_COUNT))
        .map(|(_, deviation)| deviation)
        .collect()
}
