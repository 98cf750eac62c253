use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::FACTOR_COUNT;
use super::deviation::FactorDeviation;
use super::error::InputError;

/// School level keying the profile store; each level has its own type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolLevel {
    #[serde(alias = "초등학교")]
    Elementary,
    #[serde(alias = "중학교")]
    Middle,
    #[serde(alias = "고등학교")]
    High,
}

impl SchoolLevel {
    pub fn ordered() -> [SchoolLevel; 3] {
        [SchoolLevel::Elementary, SchoolLevel::Middle, SchoolLevel::High]
    }

    pub fn label(self) -> &'static str {
        match self {
            SchoolLevel::Elementary => "초등학교",
            SchoolLevel::Middle => "중학교",
            SchoolLevel::High => "고등학교",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            SchoolLevel::Elementary => "elementary",
            SchoolLevel::Middle => "middle",
            SchoolLevel::High => "high",
        }
    }
}

impl fmt::Display for SchoolLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SchoolLevel {
    type Err = InputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "elementary" | "primary" | "초" | "초등" | "초등학교" => Ok(SchoolLevel::Elementary),
            "middle" | "중" | "중등" | "중학교" => Ok(SchoolLevel::Middle),
            "high" | "고" | "고등" | "고등학교" => Ok(SchoolLevel::High),
            _ => Err(InputError::UnparsedSchoolLevel(value.to_string())),
        }
    }
}

/// Identifier wrapper for students.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response-quality flag raised by the test-scoring collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityWarning {
    InconsistentResponding,
    CarelessResponding,
    SociallyDesirableResponding,
    IncompleteResponses,
}

impl ReliabilityWarning {
    pub fn code(self) -> &'static str {
        match self {
            ReliabilityWarning::InconsistentResponding => "inconsistent_responding",
            ReliabilityWarning::CarelessResponding => "careless_responding",
            ReliabilityWarning::SociallyDesirableResponding => "socially_desirable_responding",
            ReliabilityWarning::IncompleteResponses => "incomplete_responses",
        }
    }
}

impl FromStr for ReliabilityWarning {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inconsistent_responding" | "inconsistent" => {
                Ok(ReliabilityWarning::InconsistentResponding)
            }
            "careless_responding" | "careless" => Ok(ReliabilityWarning::CarelessResponding),
            "socially_desirable_responding" | "socially_desirable" => {
                Ok(ReliabilityWarning::SociallyDesirableResponding)
            }
            "incomplete_responses" | "incomplete" => Ok(ReliabilityWarning::IncompleteResponses),
            other => Err(format!("unknown reliability warning '{other}'")),
        }
    }
}

/// Classification outcome stored alongside an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResult {
    pub predicted_type: String,
    pub confidence: f64,
    pub probabilities: BTreeMap<String, f64>,
    pub deviations: Vec<FactorDeviation>,
}

/// One student's results for one test round. Re-scoring creates a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub student_id: StudentId,
    pub round: u32,
    #[serde(default)]
    pub assessed_on: Option<NaiveDate>,
    pub t_scores: Vec<Option<f64>>,
    #[serde(default)]
    pub warnings: Vec<ReliabilityWarning>,
    #[serde(default)]
    pub result: Option<ProfileResult>,
}

impl Assessment {
    pub fn is_reliable(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Score for a factor, `None` when absent or not a finite number.
    pub fn score(&self, index: usize) -> Option<f64> {
        self.t_scores
            .get(index)
            .copied()
            .flatten()
            .filter(|value| value.is_finite())
    }

    /// The full vector when every factor has a usable score.
    pub fn complete_scores(&self) -> Option<Vec<f64>> {
        if self.t_scores.len() != FACTOR_COUNT {
            return None;
        }
        (0..FACTOR_COUNT).map(|index| self.score(index)).collect()
    }
}

/// Student entry as supplied by the roster, owning its assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: StudentId,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
}

impl StudentRecord {
    /// Latest assessment for `round`; later entries are re-scores.
    pub fn assessment_for(&self, round: u32) -> Option<&Assessment> {
        self.assessments
            .iter()
            .rev()
            .find(|assessment| assessment.round == round)
    }
}

/// Accepted T-score range: five standard deviations either side of 50.
pub const T_SCORE_RANGE: RangeInclusive<f64> = 0.0..=100.0;

pub(crate) fn validate_scores(scores: &[f64]) -> Result<(), InputError> {
    if scores.len() != FACTOR_COUNT {
        return Err(InputError::ScoreLength {
            actual: scores.len(),
        });
    }

    if let Some(index) = scores.iter().position(|score| !score.is_finite()) {
        return Err(InputError::NonFiniteScore { index });
    }

    match scores
        .iter()
        .position(|score| !T_SCORE_RANGE.contains(score))
    {
        Some(index) => Err(InputError::ScoreOutOfRange {
            index,
            score: scores[index],
        }),
        None => Ok(()),
    }
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
