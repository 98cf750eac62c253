use super::domain::SchoolLevel;

/// Malformed caller input. Retrying the same call cannot succeed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("score vector must contain 38 entries, got {actual}")]
    ScoreLength { actual: usize },
    #[error("score for factor {index} is not a finite number")]
    NonFiniteScore { index: usize },
    #[error("score {score} for factor {index} is outside the T-score range 0..=100")]
    ScoreOutOfRange { index: usize, score: f64 },
    #[error("school level '{0}' is not recognised")]
    UnparsedSchoolLevel(String),
    #[error("no profiles are configured for school level {0}")]
    UnknownSchoolLevel(SchoolLevel),
    #[error("type '{type_name}' is not defined for school level {level}")]
    UnknownType {
        level: SchoolLevel,
        type_name: String,
    },
    #[error("type '{type_name}' has no complete mean vector to compare against")]
    TypeMeansUnavailable { type_name: String },
}

/// Malformed reference data in the profile store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileConfigError {
    #[error("school level {0} has no type profiles")]
    NoTypes(SchoolLevel),
    #[error("type '{type_name}' ({level}) lacks a complete 38-entry mean vector")]
    IncompleteMeans {
        level: SchoolLevel,
        type_name: String,
    },
    #[error("type '{type_name}' ({level}) has an invalid prior {prior}")]
    InvalidPrior {
        level: SchoolLevel,
        type_name: String,
        prior: f64,
    },
}

/// Error surfaced by the classification and ranking pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] ProfileConfigError),
}
