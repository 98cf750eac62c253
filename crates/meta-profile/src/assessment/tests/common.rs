use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::assessment::catalog::{FactorCatalog, FactorKind, FACTOR_COUNT};
use crate::assessment::domain::{
    Assessment, ReliabilityWarning, SchoolLevel, StudentId, StudentRecord,
};
use crate::assessment::engine::ProfilingEngine;
use crate::assessment::store::{
    EffectType, EvidenceSource, FactorRef, InterventionTemplate, ProfileStore, TypeProfile,
};

pub(super) const BALANCED: &str = "균형형";
pub(super) const ELEVATED: &str = "상승형";
pub(super) const PARTIAL: &str = "부분형";

pub(super) fn catalog() -> FactorCatalog {
    FactorCatalog::standard()
}

pub(super) fn neutral_scores() -> Vec<f64> {
    vec![50.0; FACTOR_COUNT]
}

pub(super) fn scores_with(overrides: &[(FactorKind, f64)]) -> Vec<f64> {
    let mut scores = neutral_scores();
    for (kind, value) in overrides {
        scores[kind.index()] = *value;
    }
    scores
}

pub(super) fn template(
    x: &[FactorKind],
    z: Option<&[FactorKind]>,
    beta: Option<f64>,
) -> InterventionTemplate {
    let factor_ref = |kinds: &[FactorKind]| FactorRef {
        label: kinds
            .iter()
            .map(|kind| kind.label())
            .collect::<Vec<_>>()
            .join("·"),
        factors: kinds.iter().map(|kind| kind.index()).collect(),
    };

    InterventionTemplate {
        x: factor_ref(x),
        z: z.map(factor_ref),
        y: "학교적응".to_string(),
        effect_type: if z.is_some() {
            EffectType::Moderation
        } else {
            EffectType::Direct
        },
        beta,
        source: EvidenceSource::Kg,
        interpretation: "test template".to_string(),
        strategies: vec!["담임 체크인".to_string()],
    }
}

pub(super) fn type_profile(
    name: &str,
    means: Option<Vec<f64>>,
    prior: f64,
    interventions: Vec<InterventionTemplate>,
) -> TypeProfile {
    TypeProfile {
        name: name.to_string(),
        description: String::new(),
        means,
        prior,
        interventions,
    }
}

/// Middle school: two complete types (all-50 and all-60 means).
/// High school: a single type without a mean vector.
pub(super) fn synthetic_store() -> ProfileStore {
    let balanced_interventions = vec![
        template(&[FactorKind::SelfEsteem], None, None),
        template(
            &[FactorKind::Depression, FactorKind::Anxiety],
            Some(&[FactorKind::TeacherSupport]),
            Some(-0.4),
        ),
        template(&[FactorKind::CareerGoals], None, Some(0.05)),
    ];

    let mut levels = BTreeMap::new();
    levels.insert(
        SchoolLevel::Middle,
        vec![
            type_profile(BALANCED, Some(vec![50.0; FACTOR_COUNT]), 0.5, balanced_interventions),
            type_profile(
                ELEVATED,
                Some(vec![60.0; FACTOR_COUNT]),
                0.5,
                vec![template(&[FactorKind::Stress], None, Some(0.3))],
            ),
        ],
    );
    levels.insert(
        SchoolLevel::High,
        vec![type_profile(
            PARTIAL,
            None,
            1.0,
            vec![
                template(&[FactorKind::SelfEsteem], None, Some(0.1)),
                template(&[FactorKind::Loneliness], None, None),
            ],
        )],
    );

    ProfileStore {
        version: "synthetic".to_string(),
        levels,
    }
}

pub(super) fn synthetic_engine() -> ProfilingEngine {
    ProfilingEngine::new(Arc::new(catalog()), Arc::new(synthetic_store()))
}

pub(super) fn assessment(
    student: &str,
    round: u32,
    scores: Vec<Option<f64>>,
    warnings: Vec<ReliabilityWarning>,
) -> Assessment {
    Assessment {
        student_id: StudentId(student.to_string()),
        round,
        assessed_on: None,
        t_scores: scores,
        warnings,
        result: None,
    }
}

pub(super) fn student(id: &str, assessments: Vec<Assessment>) -> StudentRecord {
    StudentRecord {
        student_id: StudentId(id.to_string()),
        assessments,
    }
}

pub(super) fn complete(scores: Vec<f64>) -> Vec<Option<f64>> {
    scores.into_iter().map(Some).collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
