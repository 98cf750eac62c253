use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aggregate::{aggregate_class, ClassAnalysis};
use super::catalog::FactorCatalog;
use super::classifier::{classify, Classification};
use super::deviation::{analyze_deviations, FactorDeviation, DEFAULT_TOP_N};
use super::domain::{
    Assessment, ProfileResult, ReliabilityWarning, SchoolLevel, StudentId, StudentRecord,
};
use super::error::AssessmentError;
use super::ranking::{rank_interventions, RankedIntervention};
use super::store::ProfileStore;

/// Stateless facade over the reference data and the scoring components.
///
/// Holds the catalog and store behind `Arc`s so one engine can be shared
/// across request handlers; every call works on borrowed inputs and returns
/// fresh values.
#[derive(Debug, Clone)]
pub struct ProfilingEngine {
    catalog: Arc<FactorCatalog>,
    store: Arc<ProfileStore>,
    deviation_top_n: usize,
}

/// Input for scoring one student's test round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub student_id: StudentId,
    pub round: u32,
    pub school_level: SchoolLevel,
    pub scores: Vec<f64>,
    #[serde(default)]
    pub warnings: Vec<ReliabilityWarning>,
    #[serde(default)]
    pub assessed_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub assessment: Assessment,
    pub classification: Classification,
    pub interventions: Vec<RankedIntervention>,
}

impl ProfilingEngine {
    pub fn new(catalog: Arc<FactorCatalog>, store: Arc<ProfileStore>) -> Self {
        Self {
            catalog,
            store,
            deviation_top_n: DEFAULT_TOP_N,
        }
    }

    pub fn standard() -> Self {
        Self::new(
            Arc::new(FactorCatalog::standard()),
            Arc::new(ProfileStore::standard()),
        )
    }

    pub fn with_deviation_top_n(mut self, top_n: usize) -> Self {
        self.deviation_top_n = top_n;
        self
    }

    pub fn catalog(&self) -> &FactorCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn deviation_top_n(&self) -> usize {
        self.deviation_top_n
    }

    pub fn classify(
        &self,
        level: SchoolLevel,
        scores: &[f64],
    ) -> Result<Classification, AssessmentError> {
        classify(&self.store, level, scores)
    }

    /// Deviations from `type_name`; `top_n` falls back to the configured default.
    pub fn deviations(
        &self,
        level: SchoolLevel,
        type_name: &str,
        scores: &[f64],
        top_n: Option<usize>,
    ) -> Result<Vec<FactorDeviation>, AssessmentError> {
        analyze_deviations(
            &self.catalog,
            &self.store,
            level,
            type_name,
            scores,
            top_n.unwrap_or(self.deviation_top_n),
        )
    }

    pub fn rank_interventions(
        &self,
        level: SchoolLevel,
        type_name: &str,
        scores: Option<&[f64]>,
    ) -> Result<Vec<RankedIntervention>, AssessmentError> {
        rank_interventions(&self.catalog, &self.store, level, type_name, scores)
    }

    /// Score a full test round: classify, explain deviations from the
    /// predicted type and rank its interventions.
    pub fn assess(&self, request: AssessmentRequest) -> Result<AssessmentReport, AssessmentError> {
        let AssessmentRequest {
            student_id,
            round,
            school_level,
            scores,
            warnings,
            assessed_on,
        } = request;

        let classification = self.classify(school_level, &scores)?;
        let deviations = self.deviations(
            school_level,
            &classification.predicted_type,
            &scores,
            None,
        )?;
        let interventions =
            self.rank_interventions(school_level, &classification.predicted_type, Some(&scores))?;

        let assessment = Assessment {
            student_id,
            round,
            assessed_on,
            t_scores: scores.into_iter().map(Some).collect(),
            warnings,
            result: Some(ProfileResult {
                predicted_type: classification.predicted_type.clone(),
                confidence: classification.confidence,
                probabilities: classification.probabilities.clone(),
                deviations,
            }),
        };

        Ok(AssessmentReport {
            assessment,
            classification,
            interventions,
        })
    }

    pub fn class_profile(&self, students: &[StudentRecord], round: u32) -> ClassAnalysis {
        aggregate_class(&self.catalog, students, round)
    }
}

impl Default for ProfilingEngine {
    fn default() -> Self {
        Self::standard()
    }
}
