//! Latent-profile classification and intervention ranking for META results.
//!
//! Pipeline: a 38-factor T-score vector is classified against the types of
//! its school level, explained by its largest deviations from the assigned
//! type, and matched to that type's intervention templates. Independently,
//! a class's assessments for a round are aggregated into sub-category
//! strengths and weaknesses.

pub(crate) mod aggregate;
pub mod catalog;
pub(crate) mod classifier;
pub(crate) mod deviation;
pub mod domain;
pub(crate) mod engine;
pub mod error;
pub mod import;
pub(crate) mod ranking;
pub mod router;
pub mod store;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate_class, ClassAnalysis, ClassProfile, ClassProfileItem};
pub use catalog::{Domain, Factor, FactorCatalog, FactorKind, Polarity, SubCategory, FACTOR_COUNT};
pub use classifier::{classify, Classification, TypeProbability};
pub use deviation::{analyze_deviations, DeviationDirection, FactorDeviation, DEFAULT_TOP_N};
pub use domain::{
    Assessment, ProfileResult, ReliabilityWarning, SchoolLevel, StudentId, StudentRecord,
    T_SCORE_RANGE,
};
pub use engine::{AssessmentReport, AssessmentRequest, ProfilingEngine};
pub use error::{AssessmentError, InputError, ProfileConfigError};
pub use import::{RosterImportError, RosterImporter};
pub use ranking::{
    rank_interventions, InvolvedFactor, RankedIntervention, BASELINE_REASON,
    UNPERSONALIZED_REASON,
};
pub use router::assessment_router;
pub use store::{
    EffectType, EvidenceSource, FactorRef, InterventionTemplate, ProfileStore, ProfileStoreError,
    TypeProfile, MAX_INTERVENTIONS_PER_TYPE,
};
