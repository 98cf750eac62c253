use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::catalog::FactorCatalog;
use super::domain::{validate_scores, SchoolLevel};
use super::error::AssessmentError;
use super::store::{InterventionTemplate, ProfileStore, TypeProfile};

/// Largest possible gap from the ideal for T-scores in 20..=80.
const NEED_GAP_CEILING: f64 = 30.0;
const DEVIATION_CEILING: f64 = 15.0;
const UNFAVORABLE_WEIGHT: f64 = 1.5;
const FAVORABLE_WEIGHT: f64 = 0.5;

pub const BASELINE_REASON: &str = "개인화 신호 없음 (유형 기본 전략)";
pub const UNPERSONALIZED_REASON: &str = "점수 정보 없음: 개인화 미적용 (유형 기본 순서)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvolvedFactor {
    pub index: usize,
    pub name: String,
    pub score: Option<f64>,
    pub type_mean: Option<f64>,
}

/// An intervention template with its personalised relevance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedIntervention {
    pub template: InterventionTemplate,
    pub relevance_score: u8,
    pub relevance_reason: String,
    pub involved_factors: Vec<InvolvedFactor>,
}

/// Order `type_name`'s interventions by relevance to the student's scores.
///
/// Missing or malformed scores are not an error: the templates come back in
/// authored order with a strictly decreasing synthetic score.
pub fn rank_interventions(
    catalog: &FactorCatalog,
    store: &ProfileStore,
    level: SchoolLevel,
    type_name: &str,
    scores: Option<&[f64]>,
) -> Result<Vec<RankedIntervention>, AssessmentError> {
    let profile = store.find_type(level, type_name)?;

    let Some(scores) = scores.filter(|scores| validate_scores(scores).is_ok()) else {
        warn!(
            %level,
            type_name,
            "score vector unavailable; returning unpersonalized intervention order"
        );
        return Ok(unpersonalized(catalog, profile));
    };

    let mut ranked: Vec<RankedIntervention> = profile
        .interventions
        .iter()
        .map(|template| score_template(catalog, profile, template, scores))
        .collect();

    ranked.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

    debug!(
        %level,
        type_name,
        templates = ranked.len(),
        top_score = ranked.first().map(|entry| entry.relevance_score),
        "ranked interventions"
    );

    Ok(ranked)
}

fn score_template(
    catalog: &FactorCatalog,
    profile: &TypeProfile,
    template: &InterventionTemplate,
    scores: &[f64],
) -> RankedIntervention {
    let means = profile.complete_means();
    let resolved: Vec<usize> = template
        .factor_indices()
        .into_iter()
        .filter(|index| catalog.get(*index).is_some())
        .collect();

    let need = need_score(catalog, &resolved, scores);
    let deviation = means.map(|means| deviation_score(catalog, &resolved, scores, means));
    let beta = beta_boost(template.beta);

    let relevance = match deviation {
        Some(deviation) => need * 0.5 + deviation * 0.3 + beta * 0.2,
        None => need * 0.65 + beta * 0.35,
    };

    RankedIntervention {
        template: template.clone(),
        relevance_score: relevance.round().clamp(0.0, 100.0) as u8,
        relevance_reason: relevance_reason(catalog, &resolved, scores),
        involved_factors: involved_factors(catalog, &resolved, Some(scores), means),
    }
}

fn need_score(catalog: &FactorCatalog, resolved: &[usize], scores: &[f64]) -> f64 {
    let gaps: Vec<f64> = resolved
        .iter()
        .filter_map(|&index| {
            let factor = catalog.get(index)?;
            Some(factor.polarity.gap_from_ideal(scores[index]))
        })
        .collect();

    (mean(&gaps) * 100.0 / NEED_GAP_CEILING).min(100.0)
}

fn deviation_score(
    catalog: &FactorCatalog,
    resolved: &[usize],
    scores: &[f64],
    means: &[f64],
) -> f64 {
    let weighted: Vec<f64> = resolved
        .iter()
        .filter_map(|&index| {
            let factor = catalog.get(index)?;
            let diff = scores[index] - means[index];
            let weight = if factor.polarity.is_favorable(diff) {
                FAVORABLE_WEIGHT
            } else {
                UNFAVORABLE_WEIGHT
            };
            Some(diff.abs() * weight)
        })
        .collect();

    (mean(&weighted) * 100.0 / DEVIATION_CEILING).min(100.0)
}

fn beta_boost(beta: Option<f64>) -> f64 {
    beta.map(|beta| (beta.abs() * 200.0).min(100.0))
        .unwrap_or(0.0)
}

fn relevance_reason(catalog: &FactorCatalog, resolved: &[usize], scores: &[f64]) -> String {
    let mut flagged: Vec<(f64, &str, f64)> = resolved
        .iter()
        .filter_map(|&index| {
            let factor = catalog.get(index)?;
            let gap = factor.polarity.gap_from_ideal(scores[index]);
            (gap > 0.0).then_some((gap, factor.name, scores[index]))
        })
        .collect();

    if flagged.is_empty() {
        return BASELINE_REASON.to_string();
    }

    flagged.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    let named = flagged
        .iter()
        .take(2)
        .map(|(_, name, score)| format!("{name}(T={score:.0})"))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{named} 관리 필요")
}

fn involved_factors(
    catalog: &FactorCatalog,
    resolved: &[usize],
    scores: Option<&[f64]>,
    means: Option<&[f64]>,
) -> Vec<InvolvedFactor> {
    resolved
        .iter()
        .filter_map(|&index| {
            let factor = catalog.get(index)?;
            Some(InvolvedFactor {
                index,
                name: factor.name.to_string(),
                score: scores.and_then(|scores| scores.get(index).copied()),
                type_mean: means.and_then(|means| means.get(index).copied()),
            })
        })
        .collect()
}

fn unpersonalized(catalog: &FactorCatalog, profile: &TypeProfile) -> Vec<RankedIntervention> {
    let means = profile.complete_means();
    let count = profile.interventions.len();
    let step = fallback_step(count);

    profile
        .interventions
        .iter()
        .enumerate()
        .map(|(position, template)| {
            let resolved: Vec<usize> = template
                .factor_indices()
                .into_iter()
                .filter(|index| catalog.get(*index).is_some())
                .collect();
            let score = 100usize.saturating_sub(position * step);

            RankedIntervention {
                template: template.clone(),
                relevance_score: score as u8,
                relevance_reason: UNPERSONALIZED_REASON.to_string(),
                involved_factors: involved_factors(catalog, &resolved, None, means),
            }
        })
        .collect()
}

/// Step 10 from 100; shrinks for long lists so scores stay within 0..=100.
/// Strictly decreasing for up to `MAX_INTERVENTIONS_PER_TYPE` templates,
/// which `ProfileStore::validate` enforces.
fn fallback_step(count: usize) -> usize {
    if count <= 11 {
        10
    } else {
        (100 / (count - 1)).max(1)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::store::MAX_INTERVENTIONS_PER_TYPE;

    #[test]
    fn beta_boost_scales_and_caps() {
        assert_eq!(beta_boost(None), 0.0);
        assert!((beta_boost(Some(-0.3)) - 60.0).abs() < 1e-9);
        assert_eq!(beta_boost(Some(0.9)), 100.0);
    }

    #[test]
    fn fallback_step_keeps_scores_in_range() {
        assert_eq!(fallback_step(4), 10);
        assert_eq!(fallback_step(11), 10);
        assert_eq!(fallback_step(21), 5);
        assert_eq!(fallback_step(300), 1);
    }

    #[test]
    fn fallback_scores_strictly_decrease_up_to_the_store_cap() {
        let count = MAX_INTERVENTIONS_PER_TYPE;
        let step = fallback_step(count);
        let scores: Vec<usize> = (0..count)
            .map(|position| 100usize.saturating_sub(position * step))
            .collect();

        assert_eq!(scores.first(), Some(&100));
        assert_eq!(scores.last(), Some(&0));
        assert!(scores.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
