use std::collections::HashSet;

use super::common::*;
use crate::assessment::aggregate::{aggregate_class, ClassAnalysis};
use crate::assessment::catalog::{FactorKind, SubCategory, FACTOR_COUNT};
use crate::assessment::domain::ReliabilityWarning;

fn burnout_scores() -> Vec<f64> {
    scores_with(&[
        (FactorKind::EmotionalExhaustion, 70.0),
        (FactorKind::AcademicCynicism, 65.0),
        (FactorKind::AcademicInefficacy, 60.0),
    ])
}

#[test]
fn empty_round_reports_no_data() {
    let students = vec![student(
        "s-01",
        vec![assessment("s-01", 1, complete(neutral_scores()), Vec::new())],
    )];

    let analysis = aggregate_class(&catalog(), &students, 2);

    assert_eq!(analysis, ClassAnalysis::NoData { round: 2 });
    assert!(aggregate_class(&catalog(), &[], 1).profile().is_none());
}

#[test]
fn unreliable_assessments_are_excluded_when_reliable_ones_exist() {
    let mut students = Vec::new();
    for n in 0..6 {
        let id = format!("s-{n:02}");
        students.push(student(
            &id,
            vec![assessment(&id, 1, complete(burnout_scores()), Vec::new())],
        ));
    }
    for n in 6..10 {
        let id = format!("s-{n:02}");
        let noisy = scores_with(&[
            (FactorKind::EmotionalExhaustion, 25.0),
            (FactorKind::SelfEsteem, 80.0),
        ]);
        students.push(student(
            &id,
            vec![assessment(
                &id,
                1,
                complete(noisy),
                vec![ReliabilityWarning::CarelessResponding],
            )],
        ));
    }

    let analysis = aggregate_class(&catalog(), &students, 1);
    let profile = analysis.profile().expect("profile");

    assert_eq!(profile.student_count, 6);
    assert_eq!(profile.reliable_count, 6);
    assert!(!profile.used_unfiltered_fallback);

    let burnout = &profile.weaknesses[0];
    assert_eq!(burnout.sub_category, SubCategory::AcademicBurnout);
    assert_eq!(burnout.label, "학업소진");
    assert_eq!(burnout.avg_t, 65.0);
    assert_eq!(burnout.merit_score, 35.0);
    assert!(!burnout.is_positive);
    assert_eq!(burnout.top_factor, "정서적 탈진");
    assert_eq!(burnout.top_factor_avg_t, 70.0);

    let weaknesses: Vec<SubCategory> = profile
        .weaknesses
        .iter()
        .map(|item| item.sub_category)
        .collect();
    assert_eq!(
        weaknesses,
        vec![
            SubCategory::AcademicBurnout,
            SubCategory::FamilyRisk,
            SubCategory::FamilyRelations
        ]
    );

    let strengths: Vec<SubCategory> = profile
        .strengths
        .iter()
        .map(|item| item.sub_category)
        .collect();
    assert_eq!(
        strengths,
        vec![
            SubCategory::SelfPerception,
            SubCategory::EmotionalDistress,
            SubCategory::RiskBehavior
        ]
    );
}

#[test]
fn strengths_and_weaknesses_never_overlap() {
    let varied: Vec<f64> = (0..FACTOR_COUNT)
        .map(|index| 30.0 + (index * 7 % 40) as f64)
        .collect();
    let students = vec![
        student("a", vec![assessment("a", 1, complete(varied), Vec::new())]),
        student("b", vec![assessment("b", 1, complete(burnout_scores()), Vec::new())]),
    ];

    let analysis = aggregate_class(&catalog(), &students, 1);
    let profile = analysis.profile().expect("profile");

    assert_eq!(profile.strengths.len(), 3);
    assert_eq!(profile.weaknesses.len(), 3);
    let strengths: HashSet<SubCategory> = profile
        .strengths
        .iter()
        .map(|item| item.sub_category)
        .collect();
    assert!(profile
        .weaknesses
        .iter()
        .all(|item| !strengths.contains(&item.sub_category)));
    assert!(profile
        .strengths
        .windows(2)
        .all(|pair| pair[0].merit_score >= pair[1].merit_score));
    assert!(profile
        .weaknesses
        .windows(2)
        .all(|pair| pair[0].merit_score <= pair[1].merit_score));
}

#[test]
fn falls_back_to_unfiltered_set_when_every_assessment_is_flagged() {
    let flagged = vec![ReliabilityWarning::InconsistentResponding];
    let students = vec![
        student(
            "a",
            vec![assessment("a", 1, complete(burnout_scores()), flagged.clone())],
        ),
        student(
            "b",
            vec![assessment("b", 1, complete(burnout_scores()), flagged)],
        ),
    ];

    let analysis = aggregate_class(&catalog(), &students, 1);
    let profile = analysis.profile().expect("fallback still profiles");

    assert!(profile.used_unfiltered_fallback);
    assert_eq!(profile.student_count, 2);
    assert_eq!(profile.reliable_count, 0);
    assert_eq!(profile.weaknesses[0].sub_category, SubCategory::AcademicBurnout);
}

#[test]
fn missing_scores_count_as_neutral() {
    let mut strong = neutral_scores();
    let mut sparse: Vec<Option<f64>> = complete(neutral_scores());
    for kind in FactorKind::ALL {
        if kind.sub_category() == SubCategory::SelfPerception {
            strong[kind.index()] = 80.0;
            sparse[kind.index()] = None;
        }
    }
    let students = vec![
        student("a", vec![assessment("a", 1, complete(strong), Vec::new())]),
        student("b", vec![assessment("b", 1, sparse, Vec::new())]),
    ];

    let analysis = aggregate_class(&catalog(), &students, 1);
    let top = &analysis.profile().expect("profile").strengths[0];

    assert_eq!(top.sub_category, SubCategory::SelfPerception);
    assert_eq!(top.avg_t, 65.0);
    assert_eq!(top.merit_score, 65.0);
}

#[test]
fn strength_names_its_best_member_factor() {
    let scores = scores_with(&[
        (FactorKind::SelfEsteem, 60.0),
        (FactorKind::SelfEfficacy, 75.0),
        (FactorKind::SelfRegulation, 60.0),
        (FactorKind::Resilience, 60.0),
        (FactorKind::Mindfulness, 60.0),
    ]);
    let students = vec![student(
        "a",
        vec![assessment("a", 1, complete(scores), Vec::new())],
    )];

    let analysis = aggregate_class(&catalog(), &students, 1);
    let top = &analysis.profile().expect("profile").strengths[0];

    assert_eq!(top.sub_category, SubCategory::SelfPerception);
    assert!(top.is_positive);
    assert_eq!(top.avg_t, 63.0);
    assert_eq!(top.top_factor, "자기효능감");
    assert_eq!(top.top_factor_avg_t, 75.0);
}

#[test]
fn latest_rescore_for_the_round_is_used() {
    let rescored = scores_with(&[(FactorKind::FamilyConflict, 80.0)]);
    let students = vec![student(
        "a",
        vec![
            assessment("a", 1, complete(neutral_scores()), Vec::new()),
            assessment("a", 2, complete(burnout_scores()), Vec::new()),
            assessment("a", 1, complete(rescored), Vec::new()),
        ],
    )];

    let analysis = aggregate_class(&catalog(), &students, 1);
    let profile = analysis.profile().expect("profile");

    assert_eq!(profile.student_count, 1);
    let worst = &profile.weaknesses[0];
    assert_eq!(worst.sub_category, SubCategory::FamilyRisk);
    assert_eq!(worst.avg_t, 60.0);
    assert_eq!(worst.merit_score, 40.0);
    assert_eq!(worst.top_factor, "가정불화");
}
