use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, warn};

use super::catalog::{Factor, FactorCatalog, Polarity, SubCategory};
use super::domain::{round_to_tenth, Assessment, StudentRecord};

/// Neutral T-score substituted for a missing factor score.
const NEUTRAL_T: f64 = 50.0;
const HIGHLIGHT_COUNT: usize = 3;

/// One sub-category selected as a class strength or weakness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProfileItem {
    pub sub_category: SubCategory,
    pub label: &'static str,
    pub avg_t: f64,
    pub is_positive: bool,
    pub merit_score: f64,
    pub top_factor: &'static str,
    pub top_factor_avg_t: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProfile {
    pub round: u32,
    pub student_count: usize,
    pub reliable_count: usize,
    /// Every assessment carried a warning, so the unfiltered set was used.
    pub used_unfiltered_fallback: bool,
    pub strengths: Vec<ClassProfileItem>,
    pub weaknesses: Vec<ClassProfileItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassAnalysis {
    NoData { round: u32 },
    Profile(ClassProfile),
}

impl ClassAnalysis {
    pub fn profile(&self) -> Option<&ClassProfile> {
        match self {
            ClassAnalysis::Profile(profile) => Some(profile),
            ClassAnalysis::NoData { .. } => None,
        }
    }
}

struct SubCategoryStanding<'a> {
    sub_category: SubCategory,
    avg_t: f64,
    merit: f64,
    members: Vec<(&'a Factor, f64)>,
}

/// Rank the class's sub-categories for `round` into strengths and weaknesses.
///
/// Reliable assessments are preferred; if none are reliable the full set is
/// used instead of returning an empty analysis. A missing factor score counts
/// as the neutral T of 50.
pub fn aggregate_class(
    catalog: &FactorCatalog,
    students: &[StudentRecord],
    round: u32,
) -> ClassAnalysis {
    let in_round: Vec<&Assessment> = students
        .iter()
        .filter_map(|student| student.assessment_for(round))
        .collect();

    if in_round.is_empty() {
        debug!(round, "no assessments recorded for round");
        return ClassAnalysis::NoData { round };
    }

    let reliable: Vec<&Assessment> = in_round
        .iter()
        .copied()
        .filter(|assessment| assessment.is_reliable())
        .collect();
    let reliable_count = reliable.len();

    let (valid, used_unfiltered_fallback) = if reliable.is_empty() {
        warn!(
            round,
            students = in_round.len(),
            "every assessment carries a reliability warning; using unfiltered set"
        );
        (in_round.clone(), true)
    } else {
        (reliable, false)
    };

    let factor_averages = factor_averages(catalog, &valid);

    let mut standings: Vec<SubCategoryStanding> = SubCategory::ordered()
        .into_iter()
        .filter_map(|sub_category| standing(catalog, sub_category, &factor_averages))
        .collect();

    // Stable: equal merit keeps catalog order.
    standings.sort_by(|a, b| b.merit.partial_cmp(&a.merit).unwrap_or(Ordering::Equal));

    let strength_count = HIGHLIGHT_COUNT.min(standings.len());
    let (top, rest) = standings.split_at(strength_count);

    let strengths = top
        .iter()
        .map(|standing| profile_item(standing, Selection::Strength))
        .collect();
    let weaknesses = rest
        .iter()
        .rev()
        .take(HIGHLIGHT_COUNT)
        .map(|standing| profile_item(standing, Selection::Weakness))
        .collect();

    ClassAnalysis::Profile(ClassProfile {
        round,
        student_count: valid.len(),
        reliable_count,
        used_unfiltered_fallback,
        strengths,
        weaknesses,
    })
}

fn factor_averages(catalog: &FactorCatalog, assessments: &[&Assessment]) -> Vec<f64> {
    let count = assessments.len() as f64;
    catalog
        .factors()
        .iter()
        .map(|factor| {
            let total: f64 = assessments
                .iter()
                .map(|assessment| assessment.score(factor.index).unwrap_or(NEUTRAL_T))
                .sum();
            total / count
        })
        .collect()
}

fn standing<'a>(
    catalog: &'a FactorCatalog,
    sub_category: SubCategory,
    factor_averages: &[f64],
) -> Option<SubCategoryStanding<'a>> {
    let members: Vec<(&Factor, f64)> = catalog
        .members(sub_category)
        .filter_map(|factor| {
            factor_averages
                .get(factor.index)
                .map(|average| (factor, *average))
        })
        .collect();

    if members.is_empty() {
        return None;
    }

    let avg_t = members.iter().map(|(_, average)| average).sum::<f64>() / members.len() as f64;

    Some(SubCategoryStanding {
        sub_category,
        avg_t,
        merit: sub_category.polarity().merit(avg_t),
        members,
    })
}

#[derive(Clone, Copy)]
enum Selection {
    Strength,
    Weakness,
}

fn profile_item(standing: &SubCategoryStanding<'_>, selection: Selection) -> ClassProfileItem {
    let polarity: Polarity = standing.sub_category.polarity();
    let (top_factor, top_average) = standing
        .members
        .iter()
        .copied()
        .reduce(|best, candidate| {
            let best_merit = polarity.merit(best.1);
            let candidate_merit = polarity.merit(candidate.1);
            let better = match selection {
                Selection::Strength => candidate_merit > best_merit,
                Selection::Weakness => candidate_merit < best_merit,
            };
            if better {
                candidate
            } else {
                best
            }
        })
        .map(|(factor, average)| (factor.name, average))
        .unwrap_or(("", standing.avg_t));

    ClassProfileItem {
        sub_category: standing.sub_category,
        label: standing.sub_category.label(),
        avg_t: round_to_tenth(standing.avg_t),
        is_positive: polarity.is_positive(),
        merit_score: round_to_tenth(standing.merit),
        top_factor,
        top_factor_avg_t: round_to_tenth(top_average),
    }
}
